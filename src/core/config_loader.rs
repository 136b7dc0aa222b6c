// /src/core/config_loader.rs

use directories::BaseDirs;
use std::path::{Path, PathBuf};

pub fn config_paths() -> (PathBuf, PathBuf) {
    // 1. System default: directory of the binary
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    let mut system_default = exe_dir.join("default.conf");

    // **Fallback for development**
    // If the system default isn't there, use the project's
    // `config/default.conf` via CARGO_MANIFEST_DIR
    if !system_default.exists() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
        let fallback = manifest.join("config").join("default.conf");
        if fallback.exists() {
            system_default = fallback;
        }
    }

    // 2. User override in XDG_CONFIG_HOME/statusline-rs/config
    let user_config = BaseDirs::new()
        .map(|d| d.config_dir().join("statusline-rs").join("config"))
        .unwrap_or_else(|| PathBuf::from("config/config"));

    (system_default, user_config)
}
