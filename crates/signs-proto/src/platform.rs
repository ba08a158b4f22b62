//! Where the kiosk keeps its files.
//!
//! Unix: `~/.config/signs/` for `config.toml`, `~/.local/share/signs/` for
//! the log. Windows: a `config.toml` or `data/` beside the executable wins,
//! so a kiosk can run from a USB stick; otherwise the usual roaming dirs.

use std::path::PathBuf;

const APP_DIR: &str = "signs";

#[cfg(unix)]
fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(windows)]
fn beside_exe(entry: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?;
    dir.join(entry).exists().then(|| dir.to_path_buf())
}

pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    {
        home().join(".local").join("share").join(APP_DIR)
    }
    #[cfg(windows)]
    {
        if let Some(dir) = beside_exe("data") {
            return dir.join("data");
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        home().join(".config").join(APP_DIR)
    }
    #[cfg(windows)]
    {
        if let Some(dir) = beside_exe("config.toml") {
            return dir;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}
