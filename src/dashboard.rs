//! Clock, greeting, theme, and the user's name, avatar, and background.

use crate::config;
use crate::storage::{BlobStore, SettingsStore, StorageError};
use serde::{Deserialize, Serialize};

pub const CLOCK_FORMAT_KEY: &str = "clockFormat";
pub const THEME_KEY: &str = "theme";
pub const USERNAME_KEY: &str = "username";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockFormat {
    #[default]
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "12h")]
    H12,
}

impl ClockFormat {
    pub fn toggled(self) -> Self {
        match self {
            ClockFormat::H24 => ClockFormat::H12,
            ClockFormat::H12 => ClockFormat::H24,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    /// CSS class for the page body; `System` follows the OS preference
    pub fn css_class(self, prefers_dark: bool) -> &'static str {
        match self {
            Theme::Light => "light-theme",
            Theme::Dark => "dark-theme",
            Theme::System if prefers_dark => "dark-theme",
            Theme::System => "light-theme",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Theme::System),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// `HH:MM` or `H:MM AM/PM`
pub fn format_clock(hour: u32, minute: u32, format: ClockFormat) -> String {
    match format {
        ClockFormat::H24 => format!("{:02}:{:02}", hour, minute),
        ClockFormat::H12 => {
            let suffix = if hour >= 12 { "PM" } else { "AM" };
            let hour = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{}:{:02} {}", hour, minute, suffix)
        }
    }
}

pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning,"
    } else if hour < 18 {
        "Good afternoon,"
    } else {
        "Good evening,"
    }
}

/// Placeholder avatar showing the first letter of the username
pub fn default_avatar(username: &str) -> String {
    let letter = username
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "U".to_string());
    config::DEFAULT_AVATAR_URL.replace("{}", &letter)
}

/// The two user-provided images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Avatar,
    Background,
}

impl ImageSlot {
    /// Settings key holding the image source; also the blob key
    pub fn key(self) -> &'static str {
        match self {
            ImageSlot::Avatar => "userIcon",
            ImageSlot::Background => "background",
        }
    }

    fn url_key(self) -> &'static str {
        match self {
            ImageSlot::Avatar => "userIconUrl",
            ImageSlot::Background => "backgroundUrl",
        }
    }

    fn file_name_key(self) -> &'static str {
        match self {
            ImageSlot::Avatar => "userIconFileName",
            ImageSlot::Background => "backgroundFileName",
        }
    }
}

/// Where to draw an image from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Bytes cached in the blob store
    Blob(Vec<u8>),
    /// Remote image used directly
    Url(String),
    /// Placeholder avatar, or no background
    Default,
}

fn save<T: Serialize + ?Sized>(settings: &mut SettingsStore, key: &str, value: &T) {
    if let Err(e) = settings.set(key, value) {
        log::warn!("Failed to save setting '{}': {}", key, e);
    }
}

/// User-facing dashboard preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    clock_format: ClockFormat,
    theme: Theme,
    username: String,
}

impl Dashboard {
    pub fn load(settings: &SettingsStore) -> Self {
        Self {
            clock_format: settings.get(CLOCK_FORMAT_KEY, ClockFormat::default()),
            theme: settings.get(THEME_KEY, Theme::default()),
            username: settings.get_string(USERNAME_KEY, config::DEFAULT_USERNAME),
        }
    }

    pub fn clock_format(&self) -> ClockFormat {
        self.clock_format
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Switch between the 24-hour and 12-hour clock
    pub fn toggle_clock(&mut self, settings: &mut SettingsStore) {
        self.clock_format = self.clock_format.toggled();
        save(settings, CLOCK_FORMAT_KEY, &self.clock_format);
    }

    pub fn set_theme(&mut self, theme: Theme, settings: &mut SettingsStore) {
        self.theme = theme;
        save(settings, THEME_KEY, &theme);
    }

    pub fn set_username(&mut self, username: &str, settings: &mut SettingsStore) {
        self.username = username.trim().to_string();
        save(settings, USERNAME_KEY, &self.username);
    }

    /// Clock and greeting for a wall-clock time
    pub fn clock_line(&self, hour: u32, minute: u32) -> (String, &'static str) {
        (format_clock(hour, minute, self.clock_format), greeting(hour))
    }

    /// Resolve what an image slot currently shows.
    /// A cached image that cannot be read falls back to the default.
    pub fn image_source(
        &self,
        slot: ImageSlot,
        settings: &SettingsStore,
        blobs: &mut BlobStore,
    ) -> ImageSource {
        let value = settings.get_string(slot.key(), "");
        if value.is_empty() {
            return ImageSource::Default;
        }
        if value != config::BLOB_IMAGE_MARKER {
            return ImageSource::Url(value);
        }

        match blobs.get(slot.key()) {
            Ok(Some(bytes)) => ImageSource::Blob(bytes),
            Ok(None) => ImageSource::Default,
            Err(e) => {
                log::warn!("Failed to load cached {} image: {}", slot.key(), e);
                ImageSource::Default
            }
        }
    }

    /// URL to draw the avatar with when it is not a cached blob
    pub fn avatar_url(&self, source: &ImageSource) -> Option<String> {
        match source {
            ImageSource::Blob(_) => None,
            ImageSource::Url(url) => Some(url.clone()),
            ImageSource::Default => Some(default_avatar(&self.username)),
        }
    }

    /// Use a remote image straight from its URL.
    ///
    /// The page downloads it in the background and hands the bytes to
    /// `store_fetched_image`; until then, or if the download fails, the URL
    /// itself is what the slot shows.
    pub fn set_image_url(&self, slot: ImageSlot, url: &str, settings: &mut SettingsStore) -> ImageSource {
        let url = url.trim();
        save(settings, slot.key(), url);
        save(settings, slot.url_key(), url);
        save(settings, slot.file_name_key(), "");
        ImageSource::Url(url.to_string())
    }

    /// Cache a downloaded image for a slot that still shows `url`.
    /// Returns `None` if the slot changed meanwhile or the cache write failed.
    pub fn store_fetched_image(
        &self,
        slot: ImageSlot,
        url: &str,
        bytes: Vec<u8>,
        settings: &mut SettingsStore,
        blobs: &mut BlobStore,
    ) -> Option<ImageSource> {
        if settings.get_string(slot.key(), "") != url {
            log::debug!("Dropping stale {} image from {}", slot.key(), url);
            return None;
        }

        if let Err(e) = blobs.put(slot.key(), &bytes) {
            log::warn!("Failed to cache {} image: {}", slot.key(), e);
            return None;
        }
        save(settings, slot.key(), config::BLOB_IMAGE_MARKER);
        Some(ImageSource::Blob(bytes))
    }

    /// Use a local file's bytes
    pub fn set_image_from_file(
        &self,
        slot: ImageSlot,
        file_name: &str,
        bytes: &[u8],
        settings: &mut SettingsStore,
        blobs: &mut BlobStore,
    ) -> Result<ImageSource, StorageError> {
        blobs.put(slot.key(), bytes)?;

        save(settings, slot.key(), config::BLOB_IMAGE_MARKER);
        save(settings, slot.url_key(), "");
        save(settings, slot.file_name_key(), file_name);

        Ok(ImageSource::Blob(bytes.to_vec()))
    }

    /// Go back to the placeholder avatar or no background
    pub fn remove_image(&self, slot: ImageSlot, settings: &mut SettingsStore) {
        save(settings, slot.key(), "");
        save(settings, slot.url_key(), "");
        save(settings, slot.file_name_key(), "");
    }
}
