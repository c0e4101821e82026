use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;

/// True if anything (file, directory or dangling symlink) sits at `path`
pub fn path_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Rename `src` to `dst`, refusing to replace an existing `dst`.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] when the destination is taken.
/// The check and the rename are separate steps, so a file created in between
/// by another process can still be replaced.
pub fn rename_no_clobber(src: &Path, dst: &Path) -> io::Result<()> {
    if path_present(dst) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination already exists: {}", dst.display()),
        ));
    }

    trace!(from = ?src, to = ?dst, "Renaming");
    fs::rename(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename_moves_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "content").unwrap();

        rename_no_clobber(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "content");
    }

    #[test]
    fn test_refuses_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        let err = rename_no_clobber(&src, &dst).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
        assert!(src.exists());
    }

    #[test]
    fn test_missing_source_errors() {
        let dir = tempdir().unwrap();
        let err = rename_no_clobber(&dir.path().join("gone"), &dir.path().join("b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_present() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        assert!(path_present(&link));
        assert!(!link.exists());
    }
}
