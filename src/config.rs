use std::path::PathBuf;

use crate::storage::FileStorage;

pub const DEFAULT_FILE: &str = "todo.json";
pub const DEFAULT_WEB_PORT: u16 = 8080;
pub const DEFAULT_API_PORT: u16 = 8081;
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Process-wide settings, built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    pub web_port: u16,
    pub api_port: u16,
    pub static_dir: PathBuf,
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: PathBuf::from(DEFAULT_FILE),
            web_port: DEFAULT_WEB_PORT,
            api_port: DEFAULT_API_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            pretty: false,
        }
    }
}

impl Config {
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.file).pretty(self.pretty)
    }

    pub fn bind_address(&self, api: bool) -> String {
        let port = if api { self.api_port } else { self.web_port };
        format!("127.0.0.1:{port}")
    }
}
