//! Map access token store
//!
//! Persists the single map-provider access token under a fixed file in the
//! XDG config directory. Absence of the token gates the whole map feature
//! behind the token-entry prompt.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Fixed file name the token is stored under
const TOKEN_FILE: &str = "map_token";

/// Reads and writes the stored map access token
///
/// The token lives in `~/.config/roadcast/map_token` on Linux, or the
/// equivalent XDG path on other platforms.
#[derive(Debug, Clone)]
pub struct TokenStore {
    /// Directory where the token file is stored
    config_dir: PathBuf,
}

impl TokenStore {
    /// Creates a new TokenStore using the XDG-compliant config directory
    ///
    /// Returns `None` if the config directory cannot be determined (e.g. no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "roadcast")?;
        Some(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    /// Creates a TokenStore with a custom directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the path of the token file
    fn token_path(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE)
    }

    /// Loads the stored token, if one exists and is non-empty
    pub fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(self.token_path()).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Stores the token, creating the config directory if needed
    pub fn save(&self, token: &str) -> io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::write(self.token_path(), token.trim())
    }

    /// Removes the stored token, if any
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(self.token_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
