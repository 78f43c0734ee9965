mod bookmarks;
mod config;
mod context_menu;
mod dashboard;
mod fetch;
mod modal;
mod page;
mod profile;
mod search;
mod shell;
mod storage;
mod transition;

use std::error::Error;
use std::io;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", config::APP_NAME, config::APP_VERSION);

    // An explicit directory is handy for trying things out without touching
    // the real profile
    let profile = match std::env::args_os().nth(1) {
        Some(path) => profile::Profile::open(path.into())?,
        None => profile::Profile::open_default()?,
    };
    log::info!("Using profile at {}", profile.path().display());

    let fetcher = fetch::HttpFetcher::new()?;
    let page = page::Page::open(profile, Arc::new(fetcher));

    let mut shell = shell::Shell::new(page, shell::DesktopNavigator);
    shell.run(io::stdin().lock(), io::stdout().lock())?;

    log::info!("Bye");
    Ok(())
}
