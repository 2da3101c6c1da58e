use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("could not determine the user home directory")]
    NoHome,
    #[error("failed to create home directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the application home directory to an absolute path.
///
/// - `None` (or blank) falls back to `<user home>/<default_subdir>`.
/// - A leading `~` is expanded to the user home.
/// - Relative paths are resolved against the current directory.
///
/// With `create` set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let raw = configured
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());

    let path = match raw {
        None => user_home()?.join(default_subdir),
        Some(s) => expand_tilde(&s)?,
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(|source| HomeDirError::Create {
                path: path.clone(),
                source,
            })?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path).map_err(|source| HomeDirError::Create {
            path: path.clone(),
            source,
        })?;
    }
    Ok(path)
}

fn user_home() -> Result<PathBuf, HomeDirError> {
    dirs::home_dir().ok_or(HomeDirError::NoHome)
}

fn expand_tilde(s: &str) -> Result<PathBuf, HomeDirError> {
    if s == "~" {
        return user_home();
    }
    match s.strip_prefix("~/").or_else(|| s.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(Path::new(s).to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("campus_home");

        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".campus", true)
                .unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_is_expanded() {
        let resolved = resolve_home_dir(Some("~/.campus_tilde".into()), ".campus", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".campus_tilde"));
    }

    #[test]
    fn blank_falls_back_to_default_subdir() {
        let resolved = resolve_home_dir(Some("   ".into()), ".campus", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".campus"));
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_home_dir(Some("data/home".into()), ".campus", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data/home"));
    }
}
