use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory (HOME/APPDATA unset)")]
    NoHome,
    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn platform_home() -> Option<PathBuf> {
    #[cfg(windows)]
    let var = "APPDATA";
    #[cfg(not(windows))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Resolve the application home directory into an absolute path.
///
/// - `None` resolves to `<platform home>/<default_subdir>`.
/// - A leading `~` is expanded to the platform home.
/// - Relative paths are anchored at the current working directory.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured {
        None => platform_home()
            .ok_or(HomeDirError::NoHome)?
            .join(default_subdir),
        Some(raw) => {
            if let Some(rest) = raw.strip_prefix('~') {
                let rest = rest.trim_start_matches(['/', '\\']);
                platform_home().ok_or(HomeDirError::NoHome)?.join(rest)
            } else {
                let p = PathBuf::from(raw);
                if p.is_absolute() {
                    p
                } else {
                    std::env::current_dir()
                        .map_err(HomeDirError::CurrentDir)?
                        .join(p)
                }
            }
        }
    };

    if create {
        std::fs::create_dir_all(&path).map_err(|source| HomeDirError::Create {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
    }
    Ok(path)
}
