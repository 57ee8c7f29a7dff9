//! Static assets: serves the chat UI from a directory on disk

use std::path::{Path, PathBuf};

use tower_http::services::ServeDir;
use tracing::debug;

const DEFAULT_STATIC_DIR: &str = "./static";

/// Pick the directory to serve.
///
/// An explicit directory wins. Otherwise `./static` is used when present, falling back
/// to `static/` next to the directory holding the executable.
pub fn resolve_static_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }

    let local = PathBuf::from(DEFAULT_STATIC_DIR);
    if local.exists() {
        return local;
    }

    match std::env::current_exe() {
        Ok(exe) => {
            let beside = exe
                .parent()
                .map(|dir| dir.join("..").join("static"))
                .unwrap_or_else(|| local.clone());
            debug!("./static not found, trying {}", beside.display());
            beside
        }
        Err(_) => local,
    }
}

/// File service used as the router fallback
pub fn static_service(dir: &Path) -> ServeDir {
    ServeDir::new(dir).append_index_html_on_directories(true)
}
