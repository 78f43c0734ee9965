//! Line-oriented front end for the dashboard.
//!
//! Plain text is searched right away; lines starting with `:` are commands.

use crate::bookmarks::Tile;
use crate::config;
use crate::context_menu::MenuState;
use crate::dashboard::{ClockFormat, ImageSlot, ImageSource};
use crate::page::{Action, ClickTarget, Effect, Key, Layer, Page};
use chrono::Timelike;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

const HELP: &str = "\
Type a query and press Enter to search (`!ddg cats`, `cats /y`).
Commands:
  :type TEXT         put TEXT in the query box without submitting
  :enter :up :down   keys for the query box and engine list
  :esc               close the menu, dialog, or engine list
  :submit            search for what is in the query box
  :key KEY           press a key: a character, ctrl+K, esc, enter, up, down
  :click WHERE       click on search, menu, or out (anywhere else)
  :engines           open or close the engine list
  :pick N            choose engine N
  :add NAME URL      add a bookmark
  :edit N NAME URL   change bookmark N
  :rm N              remove bookmark N
  :move FROM TO      drag bookmark FROM onto bookmark TO
  :drag N  :drop N   the same, one step at a time
  :menu N X Y        open the menu for bookmark N at X,Y
  :filter [TEXT]     show only bookmarks whose names contain TEXT
  :icons             look up bookmark icons
  :clock             switch between 24h and 12h
  :theme NAME        system, light, or dark
  :name NAME         set your name
  :avatar SRC        image URL, file path, or `none`
  :background SRC    image URL, file path, or `none`
  :settings          open the settings dialog
  :close ID          close the dialog with this id
  :size W H          the window is now W by H pixels
  :help :quit";

/// Opens search results outside the dashboard
pub trait Navigator {
    fn open(&mut self, url: &Url) -> io::Result<()>;
}

/// Hands URLs to the desktop's default browser
#[derive(Debug, Default)]
pub struct DesktopNavigator;

impl Navigator for DesktopNavigator {
    fn open(&mut self, url: &Url) -> io::Result<()> {
        let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
        std::process::Command::new(opener).arg(url.as_str()).spawn()?;
        log::info!("Opened {} with {}", url, opener);
        Ok(())
    }
}

/// What a line of input asks for
enum Step {
    Run(Vec<Action>),
    Icons,
    Help,
    Quit,
}

fn parse_key(name: &str) -> Result<Key, String> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "esc" | "escape" => Key::Escape,
        "enter" => Key::Enter,
        "up" => Key::ArrowUp,
        "down" => Key::ArrowDown,
        _ => {
            let modified = lower
                .strip_prefix("ctrl+")
                .or_else(|| lower.strip_prefix("cmd+"));
            let text = modified.unwrap_or(name);
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if modified.is_some() => Key::Ctrl(c),
                (Some(c), None) => Key::Char(c),
                _ => return Err(format!("Unknown key: {}", name)),
            }
        }
    };
    Ok(key)
}

fn parse_number(value: &str) -> Result<i32, String> {
    value.parse().map_err(|_| format!("Not a number: {}", value))
}

fn image_action(slot: ImageSlot, source: &str) -> Result<Action, String> {
    let source = source.trim();
    if source.is_empty() {
        return Err("Expected an image URL, a file path, or `none`".to_string());
    }
    if source.eq_ignore_ascii_case("none") {
        return Ok(Action::RemoveImage(slot));
    }

    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(Action::SetImageUrl {
            slot,
            url: source.to_string(),
        });
    }

    let path = Path::new(source);
    let bytes = std::fs::read(path).map_err(|e| format!("Could not read {}: {}", source, e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| source.to_string());
    Ok(Action::SetImageFile {
        slot,
        file_name,
        bytes,
    })
}

pub struct Shell<N: Navigator> {
    page: Page,
    navigator: N,
    prefers_dark: bool,
}

impl<N: Navigator> Shell<N> {
    pub fn new(page: Page, navigator: N) -> Self {
        // GNOME exposes dark mode as e.g. `Adwaita:dark`
        let prefers_dark = std::env::var("GTK_THEME")
            .map(|t| t.ends_with(":dark"))
            .unwrap_or(false);
        Self {
            page,
            navigator,
            prefers_dark,
        }
    }

    /// Read lines until `:quit` or end of input
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        self.render(&mut output)?;
        for line in input.lines() {
            let line = line?;
            if !self.handle_line(&line, &mut output)? {
                break;
            }
        }
        self.finish_downloads()
    }

    /// Let downloads started by the last commands land in the profile
    fn finish_downloads(&mut self) -> io::Result<()> {
        let deadline = Instant::now() + Duration::from_secs(config::HTTP_TIMEOUT_SECS + 1);
        while self.page.pending_fetches() > 0 && Instant::now() < deadline {
            self.page.dispatch(Action::Tick);
            thread::sleep(Duration::from_millis(20));
        }
        if self.page.pending_fetches() > 0 {
            log::warn!("Giving up on {} download(s)", self.page.pending_fetches());
        }
        Ok(())
    }

    /// Nothing fades here, so every hide that started is over at once
    fn end_transitions(&mut self) -> bool {
        let mut layers = Vec::new();
        if self.page.context_menu().state() == MenuState::Hiding {
            layers.push(Layer::ContextMenu);
        }
        layers.extend(
            self.page
                .modals()
                .closing()
                .map(|id| Layer::Modal(id.to_string())),
        );

        let mut changed = false;
        for layer in layers {
            changed |= !self.page.dispatch(Action::TransitionEnd(layer)).is_empty();
        }
        changed
    }

    /// Returns false once the user asked to quit
    fn handle_line(&mut self, line: &str, output: &mut impl Write) -> io::Result<bool> {
        let step = match self.parse(line) {
            Ok(step) => step,
            Err(message) => {
                writeln!(output, "! {}", message)?;
                return Ok(true);
            }
        };

        // Pick up downloads that finished while waiting for input
        let mut render = false;
        for effect in self.page.dispatch(Action::Tick) {
            render |= self.apply(effect, output)?;
        }

        match step {
            Step::Quit => return Ok(false),
            Step::Help => writeln!(output, "{}", HELP)?,
            Step::Icons => self.print_icons(output)?,
            Step::Run(actions) => {
                for action in actions {
                    for effect in self.page.dispatch(action) {
                        render |= self.apply(effect, output)?;
                    }
                }
                render |= self.end_transitions();
            }
        }
        if render {
            self.render(output)?;
        }
        Ok(true)
    }

    /// Carry out an effect; returns whether the screen should be redrawn
    fn apply(&mut self, effect: Effect, output: &mut impl Write) -> io::Result<bool> {
        match effect {
            Effect::Navigate(url) => {
                writeln!(output, "-> {}", url)?;
                if let Err(e) = self.navigator.open(&url) {
                    log::error!("Failed to open {}: {}", url, e);
                    writeln!(output, "! Could not open the browser: {}", e)?;
                }
                Ok(false)
            }
            Effect::Notice(message) => {
                writeln!(output, "! {}", message)?;
                Ok(false)
            }
            Effect::FocusQuery => Ok(true),
            Effect::Render(_) => Ok(true),
        }
    }

    fn bookmark_id(&self, number: &str) -> Result<String, String> {
        let index: usize = number
            .parse()
            .map_err(|_| format!("Not a bookmark number: {}", number))?;
        index
            .checked_sub(1)
            .and_then(|i| self.page.bookmarks().items().get(i))
            .map(|b| b.id.clone())
            .ok_or_else(|| format!("No bookmark {}", number))
    }

    fn parse(&self, line: &str) -> Result<Step, String> {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            if trimmed.is_empty() {
                return Ok(Step::Run(Vec::new()));
            }
            return Ok(Step::Run(vec![
                Action::QueryInput(trimmed.to_string()),
                Action::Key(Key::Enter),
            ]));
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let actions = match name {
            "quit" | "q" => return Ok(Step::Quit),
            "help" | "h" => return Ok(Step::Help),
            "icons" => return Ok(Step::Icons),
            "type" => vec![Action::QueryInput(rest.to_string())],
            "enter" => vec![Action::Key(Key::Enter)],
            "up" => vec![Action::Key(Key::ArrowUp)],
            "down" => vec![Action::Key(Key::ArrowDown)],
            "esc" => vec![Action::Key(Key::Escape)],
            "submit" => vec![Action::SubmitSearch],
            "key" => vec![Action::Key(parse_key(rest)?)],
            "click" => {
                let target = match rest {
                    "search" => ClickTarget::SearchControl,
                    "menu" => ClickTarget::ContextMenu,
                    "out" => ClickTarget::Elsewhere,
                    _ => return Err("Usage: :click search|menu|out".to_string()),
                };
                vec![Action::Click(target)]
            }
            "engines" => vec![Action::ToggleEngineMenu],
            "pick" => {
                let number: usize = rest
                    .parse()
                    .map_err(|_| format!("Not an engine number: {}", rest))?;
                let index = number
                    .checked_sub(1)
                    .filter(|i| *i < self.page.registry().len())
                    .ok_or_else(|| format!("No engine {}", number))?;
                vec![Action::PickEngine(index)]
            }
            "add" => {
                // The URL is the last word; everything before it is the name
                let (name, url) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or("Usage: :add NAME URL")?;
                vec![
                    Action::ShowAddBookmark,
                    Action::AddBookmark {
                        name: name.trim().to_string(),
                        url: url.to_string(),
                    },
                ]
            }
            "edit" => {
                let (number, rest) = rest.split_once(char::is_whitespace).ok_or("Usage: :edit N NAME URL")?;
                let (name, url) = rest
                    .trim()
                    .rsplit_once(char::is_whitespace)
                    .ok_or("Usage: :edit N NAME URL")?;
                let id = self.bookmark_id(number)?;
                vec![
                    Action::OpenContextMenu {
                        bookmark_id: id.clone(),
                        x: 0,
                        y: 0,
                    },
                    Action::EditFromMenu,
                    Action::SaveEdit {
                        id,
                        name: name.trim().to_string(),
                        url: url.to_string(),
                    },
                ]
            }
            "rm" => {
                let id = self.bookmark_id(rest)?;
                vec![
                    Action::OpenContextMenu {
                        bookmark_id: id,
                        x: 0,
                        y: 0,
                    },
                    Action::RemoveFromMenu,
                ]
            }
            "move" => {
                let [from, to] = args.as_slice() else {
                    return Err("Usage: :move FROM TO".to_string());
                };
                vec![
                    Action::DragStart(self.bookmark_id(from)?),
                    Action::DropOn(self.bookmark_id(to)?),
                    Action::DragEnd,
                ]
            }
            "drag" => vec![Action::DragStart(self.bookmark_id(rest)?)],
            "drop" => vec![Action::DropOn(self.bookmark_id(rest)?), Action::DragEnd],
            "menu" => {
                let [number, x, y] = args.as_slice() else {
                    return Err("Usage: :menu N X Y".to_string());
                };
                vec![Action::OpenContextMenu {
                    bookmark_id: self.bookmark_id(number)?,
                    x: parse_number(x)?,
                    y: parse_number(y)?,
                }]
            }
            "filter" => vec![Action::FilterBookmarks(rest.to_string())],
            "clock" => vec![Action::ToggleClock],
            "theme" => vec![Action::SetTheme(rest.parse()?)],
            "name" => vec![Action::SetUsername(rest.to_string())],
            "avatar" => vec![image_action(ImageSlot::Avatar, rest)?],
            "background" => vec![image_action(ImageSlot::Background, rest)?],
            "settings" => vec![Action::OpenSettings],
            "close" if !rest.is_empty() => vec![Action::CloseModal(rest.to_string())],
            "close" => return Err("Usage: :close ID".to_string()),
            "size" => {
                let [width, height] = args.as_slice() else {
                    return Err("Usage: :size W H".to_string());
                };
                vec![Action::Resize {
                    width: parse_number(width)?,
                    height: parse_number(height)?,
                }]
            }
            other => return Err(format!("Unknown command :{} (try :help)", other)),
        };
        Ok(Step::Run(actions))
    }

    fn print_icons(&mut self, output: &mut impl Write) -> io::Result<()> {
        let ids: Vec<String> = self.page.bookmarks().items().iter().map(|b| b.id.clone()).collect();
        for (i, id) in ids.iter().enumerate() {
            if let Some(icon) = self.page.favicon(id) {
                writeln!(output, "{:>2}. {:?}", i + 1, icon)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, output: &mut impl Write) -> io::Result<()> {
        let now = chrono::Local::now();
        let dashboard = self.page.dashboard();
        let (clock, greeting) = dashboard.clock_line(now.hour(), now.minute());
        let theme = dashboard.theme().css_class(self.prefers_dark);
        let username = dashboard.username().to_string();

        writeln!(output)?;
        writeln!(output, "{}  {} {}  [{}]", clock, greeting, username, theme)?;

        let avatar = self.page.image_source(ImageSlot::Avatar);
        match self.page.dashboard().avatar_url(&avatar) {
            Some(url) => writeln!(output, "avatar: {}", url)?,
            None => writeln!(output, "avatar: cached image")?,
        }
        match self.page.image_source(ImageSlot::Background) {
            ImageSource::Blob(bytes) => writeln!(output, "background: cached image ({} bytes)", bytes.len())?,
            ImageSource::Url(url) => writeln!(output, "background: {}", url)?,
            ImageSource::Default => {}
        }

        let page = &self.page;
        let search = page.search();
        let cursor = if page.is_query_focused() { "> " } else { "  " };
        if search.query().is_empty() {
            writeln!(output, "{}[ {} ]", cursor, search.placeholder(page.registry()))?;
        } else {
            writeln!(output, "{}[ {} ]", cursor, search.query())?;
        }

        for (i, row) in search
            .dropdown()
            .rows(page.registry(), search.selected_engine_id())
            .iter()
            .enumerate()
        {
            let marker = match (row.highlighted, row.selected) {
                (true, _) => '>',
                (false, true) => '*',
                (false, false) => ' ',
            };
            writeln!(
                output,
                " {} {}. {} (!{})",
                marker,
                i + 1,
                row.engine.name,
                row.engine.shortcut
            )?;
        }

        if !page.bookmark_filter().is_empty() {
            writeln!(output, "bookmarks matching '{}':", page.bookmark_filter())?;
        }
        if page.bookmarks().is_empty() {
            writeln!(output, "no bookmarks yet")?;
        }
        let items = page.bookmarks().items();
        for tile in page.tiles() {
            match tile {
                Tile::Bookmark(bookmark) => {
                    let number = items.iter().position(|b| b.id == bookmark.id).unwrap_or(0) + 1;
                    let held = if page.dragging() == Some(bookmark.id.as_str()) {
                        " (dragging)"
                    } else {
                        ""
                    };
                    writeln!(output, "{:>2}. {} <{}>{}", number, bookmark.name, bookmark.url, held)?;
                }
                Tile::AddNew => writeln!(output, " +  Add New")?,
            }
        }

        if page.context_menu().state() == MenuState::Shown {
            if let Some(number) = page
                .context_menu()
                .target()
                .and_then(|id| items.iter().position(|b| b.id == id))
            {
                let at = page.context_menu().anchor();
                writeln!(output, "(menu for bookmark {} at {},{}: edit, remove)", number + 1, at.x, at.y)?;
            }
        }
        if page.modals().is_open("settings") {
            let clock = match page.dashboard().clock_format() {
                ClockFormat::H24 => "24h",
                ClockFormat::H12 => "12h",
            };
            writeln!(
                output,
                "settings: clock {}, theme {}, name '{}'",
                clock,
                page.dashboard().theme().css_class(self.prefers_dark),
                page.dashboard().username()
            )?;
        }
        if let Some(modal) = page.modals().top() {
            writeln!(output, "(dialog: {})", modal.id())?;
        }
        Ok(())
    }
}
