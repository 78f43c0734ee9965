/// Application name
pub const APP_NAME: &str = "newtab";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent string for image and favicon requests
pub const USER_AGENT: &str = concat!("newtab/", env!("CARGO_PKG_VERSION"));

/// Settings store filename
pub const SETTINGS_FILE: &str = "settings.json";

/// Image blob database filename
pub const IMAGES_DB: &str = "images.db";

/// Optional engine list override filename
pub const ENGINES_FILE: &str = "engines.toml";

/// Timeout for remote image and favicon requests (seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Search Engines
// ============================================================================

/// Engine selected when nothing has been persisted yet
pub const DEFAULT_ENGINE: &str = "google";

/// Built-in search engines: (id, display_name, url_template, icon_url, shortcut)
/// The query is percent-encoded and appended to the template.
pub const SEARCH_ENGINES: &[(&str, &str, &str, &str, &str)] = &[
    (
        "google",
        "Google",
        "https://www.google.com/search?q=",
        "https://www.google.com/favicon.ico",
        "g",
    ),
    (
        "brave",
        "Brave",
        "https://search.brave.com/search?q=",
        "https://brave.com/static-assets/images/brave-favicon.png",
        "br",
    ),
    (
        "duckduckgo",
        "DuckDuckGo",
        "https://duckduckgo.com/?q=",
        "https://duckduckgo.com/favicon.ico",
        "ddg",
    ),
    (
        "bing",
        "Bing",
        "https://www.bing.com/search?q=",
        "https://www.bing.com/favicon.ico",
        "bi",
    ),
    (
        "yahoo",
        "Yahoo",
        "https://search.yahoo.com/search?p=",
        "https://search.yahoo.com/favicon.ico",
        "y",
    ),
    (
        "startpage",
        "Startpage",
        "https://www.startpage.com/sp/search?query=",
        "https://www.startpage.com/sp/cdn/favicons/favicon-96x96.png",
        "sp",
    ),
    (
        "ecosia",
        "Ecosia",
        "https://www.ecosia.org/search?q=",
        "https://cdn-static.ecosia.org/static/icons/favicon.ico",
        "e",
    ),
];

// ============================================================================
// Bookmarks
// ============================================================================

/// Maximum number of bookmarks on the grid
pub const MAX_BOOKMARKS: usize = 12;

/// Favicon service URL template, {} is replaced with the bookmark host
pub const FAVICON_SERVICE_URL: &str = "https://icons.duckduckgo.com/ip3/{}.ico";

/// Badge colors for bookmarks whose favicon could not be loaded
pub const FALLBACK_PALETTE: &[&str] = &[
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57",
    "#FF9FF3", "#54A0FF", "#5F27CD", "#00D2D3", "#FF9F43",
];

// ============================================================================
// Context menu and modals
// ============================================================================

/// Context menu size used for viewport clamping (pixels)
pub const CONTEXT_MENU_WIDTH: i32 = 180;
pub const CONTEXT_MENU_HEIGHT: i32 = 120;

/// Distance between the cursor and the context menu corner (pixels)
pub const CONTEXT_MENU_OFFSET: i32 = 5;

/// Fade-out duration for the context menu and modals (milliseconds)
pub const HIDE_ANIMATION_MS: u64 = 200;

/// Extra time allowed for the transition-end notification before a forced hide
pub const HIDE_GRACE_MS: u64 = 50;

// ============================================================================
// Dashboard
// ============================================================================

/// Username shown before the user sets one
pub const DEFAULT_USERNAME: &str = "User";

/// Placeholder avatar URL template, {} is replaced with the username initial
pub const DEFAULT_AVATAR_URL: &str = "https://placehold.co/40x40/cba6f7/1e1e2e?text={}";

/// Setting value meaning "the image lives in the blob store"
pub const BLOB_IMAGE_MARKER: &str = "fromIndexedDB";
