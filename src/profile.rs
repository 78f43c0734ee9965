use crate::search::EngineRegistry;
use crate::storage::{BlobStore, SettingsStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for profile operations
#[derive(Debug)]
pub enum ProfileError {
    Io(std::io::Error),
    NoDataDir,
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "IO error: {}", e),
            ProfileError::NoDataDir => write!(f, "Could not determine a data directory"),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<std::io::Error> for ProfileError {
    fn from(e: std::io::Error) -> Self {
        ProfileError::Io(e)
    }
}

/// The data directory holding settings, cached images, and engine overrides
pub struct Profile {
    path: PathBuf,
    pub settings: SettingsStore,
    pub blobs: BlobStore,
    pub engines: EngineRegistry,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("path", &self.path)
            .field("engines", &self.engines.len())
            .finish_non_exhaustive()
    }
}

impl Profile {
    /// Open the profile in the platform data directory
    pub fn open_default() -> Result<Self, ProfileError> {
        let path = directories::ProjectDirs::from("dev", "myyc", crate::config::APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ProfileError::NoDataDir)?;
        Self::open(path)
    }

    /// Create or open a profile at the given path
    pub fn open(path: PathBuf) -> Result<Self, ProfileError> {
        fs::create_dir_all(&path)?;

        let settings = SettingsStore::open(&path);
        // Opened lazily on first image access
        let blobs = BlobStore::new(&path);
        let engines = EngineRegistry::load(&path);

        log::info!(
            "Profile opened at {:?} with {} search engines",
            path,
            engines.len()
        );

        Ok(Self {
            path,
            settings,
            blobs,
            engines,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
