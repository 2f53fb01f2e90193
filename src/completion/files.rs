use crate::error::ShellError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Names of executables in `dirs` starting with `prefix`, first directory wins.
///
/// Unreadable directories and entries are skipped.
pub fn path_executables(dirs: &[PathBuf], prefix: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for dir in dirs.iter().filter(|d| !d.as_os_str().is_empty()) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), "skipping PATH entry: {e}");
                continue;
            }
        };
        for entry in entries.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.starts_with(prefix) || seen.contains(&name) {
                continue;
            }
            if is_executable(&entry.path()) {
                seen.insert(name.clone());
                names.push(name);
            }
        }
    }
    names
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// How directory listings are filtered.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub case_insensitive: bool,
    pub show_hidden: bool,
    pub home: Option<PathBuf>,
}

/// Entries matching `word`, each spelled with the directory part as typed.
///
/// The word is split at its last `/`. A leading `~/` in the directory part
/// is read from the home directory but kept literally in the candidates.
/// Directories get a trailing `/`. A bare `~` completes to `~/`.
pub fn file_candidates(word: &str, options: &FileOptions) -> Result<Vec<String>, ShellError> {
    if word == "~" {
        return match options.home {
            Some(_) => Ok(vec!["~/".to_string()]),
            None => Err(ShellError::HomeDirectoryUnresolvable),
        };
    }
    let (dir_part, name_prefix) = match word.rfind('/') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    };
    let dir = resolve_dir(dir_part, options)?;

    let entries = fs::read_dir(&dir).map_err(|source| ShellError::DirectoryRead {
        path: dir.clone(),
        source,
    })?;

    let lowered_prefix = name_prefix.to_lowercase();
    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !options.show_hidden && name.starts_with('.') {
            continue;
        }
        let matches = if options.case_insensitive {
            name.to_lowercase().starts_with(&lowered_prefix)
        } else {
            name.starts_with(name_prefix)
        };
        if !matches {
            continue;
        }
        let slash = if entry.path().is_dir() { "/" } else { "" };
        candidates.push(format!("{dir_part}{name}{slash}"));
    }
    candidates.sort();
    Ok(candidates)
}

fn resolve_dir(dir_part: &str, options: &FileOptions) -> Result<PathBuf, ShellError> {
    if dir_part.is_empty() {
        return Ok(PathBuf::from("."));
    }
    match dir_part.strip_prefix("~/") {
        Some(rest) => {
            let home = options
                .home
                .clone()
                .ok_or(ShellError::HomeDirectoryUnresolvable)?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(dir_part)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_path_scan_requires_execute_bit_and_dedups() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [first.path(), second.path()] {
            touch(dir, "mytool");
            make_executable(&dir.join("mytool"));
        }
        touch(first.path(), "mydata");
        fs::create_dir(first.path().join("mydir")).unwrap();
        touch(second.path(), "other");
        make_executable(&second.path().join("other"));

        let dirs = vec![
            first.path().to_path_buf(),
            PathBuf::new(),
            PathBuf::from("/definitely/not/here"),
            second.path().to_path_buf(),
        ];
        assert_eq!(path_executables(&dirs, "my"), vec!["mytool"]);
        let mut all = path_executables(&dirs, "");
        all.sort();
        assert_eq!(all, vec!["mytool", "other"]);
    }

    fn sample_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "alpha.txt");
        touch(dir.path(), "Apple.md");
        touch(dir.path(), ".hidden");
        fs::create_dir(dir.path().join("assets")).unwrap();
        dir
    }

    #[test]
    fn test_bare_tilde_becomes_home_prefix() {
        let with_home = FileOptions {
            home: Some(PathBuf::from("/home/someone")),
            ..FileOptions::default()
        };
        assert_eq!(file_candidates("~", &with_home).unwrap(), vec!["~/"]);
        assert!(matches!(
            file_candidates("~", &FileOptions::default()),
            Err(ShellError::HomeDirectoryUnresolvable)
        ));
    }

    #[test]
    fn test_directory_part_is_kept_and_dirs_get_slash() {
        let dir = sample_dir();
        let base = format!("{}/", dir.path().display());
        let opts = FileOptions::default();
        assert_eq!(
            file_candidates(&format!("{base}a"), &opts).unwrap(),
            vec![format!("{base}alpha.txt"), format!("{base}assets/")]
        );
    }

    #[test]
    fn test_case_insensitive_matching() {
        let dir = sample_dir();
        let base = format!("{}/", dir.path().display());
        let opts = FileOptions {
            case_insensitive: true,
            ..FileOptions::default()
        };
        assert_eq!(
            file_candidates(&format!("{base}ap"), &opts).unwrap(),
            vec![format!("{base}Apple.md")]
        );
        let strict = FileOptions::default();
        assert!(file_candidates(&format!("{base}ap"), &strict).unwrap().is_empty());
    }

    #[test]
    fn test_hidden_files_follow_configuration() {
        let dir = sample_dir();
        let base = format!("{}/", dir.path().display());

        let hidden_off = file_candidates(&base, &FileOptions::default()).unwrap();
        assert!(!hidden_off.is_empty());
        assert!(hidden_off.iter().all(|c| !c[base.len()..].starts_with('.')));

        let opts = FileOptions {
            show_hidden: true,
            ..FileOptions::default()
        };
        let hidden_on = file_candidates(&base, &opts).unwrap();
        assert!(hidden_on.contains(&format!("{base}.hidden")));
    }

    #[test]
    fn test_tilde_slash_reads_home() {
        let home = sample_dir();
        let opts = FileOptions {
            home: Some(home.path().to_path_buf()),
            ..FileOptions::default()
        };
        assert_eq!(
            file_candidates("~/al", &opts).unwrap(),
            vec!["~/alpha.txt".to_string()]
        );
        assert!(matches!(
            file_candidates("~/al", &FileOptions::default()),
            Err(ShellError::HomeDirectoryUnresolvable)
        ));
    }

    #[test]
    fn test_unreadable_directory_is_an_error() {
        let res = file_candidates("/definitely/not/here/x", &FileOptions::default());
        assert!(matches!(
            res,
            Err(ShellError::DirectoryRead { path, .. }) if path == Path::new("/definitely/not/here/")
        ));
    }
}
