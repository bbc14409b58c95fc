use std::path::{Path, PathBuf};
use uzers::os::unix::UserExt;

/// Expand a leading tilde to a home directory: `~`/`~/path` for the current
/// user (via $HOME), `~username/path` for another user (via the passwd
/// database). Paths without a leading tilde pass through unchanged.
///
/// # Examples
///
/// ```
/// use a0_install::utils::path::expand_tilde;
///
/// let path = expand_tilde("~/agent-zero").unwrap();
/// assert!(path.is_absolute());
///
/// assert_eq!(expand_tilde("/tmp/a0").unwrap(), std::path::PathBuf::from("/tmp/a0"));
/// ```
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let raw = path.as_ref().to_str()?;

    let Some(rest) = raw.strip_prefix('~') else {
        return Some(PathBuf::from(raw));
    };

    // ~ or ~/...
    if rest.is_empty() || rest.starts_with('/') {
        let home = std::env::var("HOME").ok()?;
        return Some(PathBuf::from(home).join(rest.trim_start_matches('/')));
    }

    // ~username or ~username/...
    let (username, tail) = match rest.split_once('/') {
        Some((username, tail)) => (username, tail),
        None => (rest, ""),
    };
    let user = uzers::get_user_by_name(username)?;
    Some(user.home_dir().join(tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    #[serial_test::serial]
    fn test_expand_tilde_current_user() {
        let home = env::var("HOME").unwrap();

        assert_eq!(expand_tilde("~").unwrap(), PathBuf::from(&home));
        assert_eq!(
            expand_tilde("~/agent-zero").unwrap(),
            PathBuf::from(format!("{}/agent-zero", home))
        );
        assert_eq!(
            expand_tilde("~/data/a0").unwrap(),
            PathBuf::from(format!("{}/data/a0", home))
        );
    }

    #[test]
    fn test_expand_tilde_other_user() {
        // root should exist on any host this installer targets
        if let Some(path) = expand_tilde("~root/.bashrc") {
            assert!(path.is_absolute());
            assert!(path.ends_with(".bashrc"));
        }
    }

    #[test]
    fn test_expand_tilde_nonexistent_user() {
        assert!(expand_tilde("~nonexistentuser12345/file").is_none());
    }

    #[test]
    fn test_expand_tilde_no_tilde() {
        assert_eq!(
            expand_tilde("/absolute/path").unwrap(),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            expand_tilde("relative/path").unwrap(),
            PathBuf::from("relative/path")
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_expand_tilde_no_home_env() {
        let original_home = env::var("HOME").ok();
        env::remove_var("HOME");

        assert!(expand_tilde("~/file").is_none());

        if let Some(home) = original_home {
            env::set_var("HOME", home);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_expand_tilde_edge_cases() {
        // Tilde not at the start is literal
        assert_eq!(
            expand_tilde("/path/~user/file").unwrap(),
            PathBuf::from("/path/~user/file")
        );

        // Only the first tilde is considered
        let home = env::var("HOME").unwrap();
        assert_eq!(
            expand_tilde("~/~file").unwrap(),
            PathBuf::from(format!("{}/~file", home))
        );
    }
}
