//! Filesystem operations
//!
//! Handles file and directory operations.

use std::fs::Permissions;
use std::io::Write;
use std::path::Path;

use crate::config::defaults::{DIR_MODE, FILE_MODE};
use crate::error::FilesystemError;

/// Create a directory and all parent directories, owner-writable
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    #[cfg(not(unix))]
    let _ = DIR_MODE;

    builder.create(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write content to a file in one step
///
/// Content goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers see either the old or the new file.
/// The file ends up with [`FILE_MODE`] permissions.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<(), FilesystemError> {
    #[cfg(unix)]
    let permissions = {
        use std::os::unix::fs::PermissionsExt;
        Some(Permissions::from_mode(FILE_MODE))
    };
    #[cfg(not(unix))]
    let permissions = None;

    write_atomic(path, content, permissions)
}

/// Like [`write_file_atomic`], but the file takes the permissions of `template`
pub fn write_file_atomic_as(
    path: &Path,
    content: &str,
    template: &Path,
) -> Result<(), FilesystemError> {
    let permissions = std::fs::metadata(template)
        .map_err(|e| FilesystemError::ReadFile {
            path: template.to_path_buf(),
            error: e.to_string(),
        })?
        .permissions();
    write_atomic(path, content, Some(permissions))
}

fn write_atomic(
    path: &Path,
    content: &str,
    permissions: Option<Permissions>,
) -> Result<(), FilesystemError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    create_dir_all(parent)?;

    let write_err = |e: std::io::Error| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    // Temporary files are created owner-only
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions).map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Rename a file
pub fn rename(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    std::fs::rename(from, to).map_err(|e| FilesystemError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_dir_all_nested() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_dir_all_uses_owner_writable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("prefix");
        create_dir_all(&dir).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_ne!(mode & 0o700, 0);
    }

    #[test]
    fn test_write_file_atomic_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("record");
        write_file_atomic(&path, "first").unwrap();
        write_file_atomic(&path, "second").unwrap();
        assert_eq!(read_file(&path).unwrap(), "second");

        // No temporary files left behind
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_atomic_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("phpbuild.variants");
        write_file_atomic(&path, "x = 1\n").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, FILE_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_atomic_as_copies_template_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("template");
        std::fs::write(&template, "").unwrap();
        std::fs::set_permissions(&template, Permissions::from_mode(0o640)).unwrap();

        let path = tmp.path().join("target");
        write_file_atomic_as(&path, "content", &template).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = read_file(&tmp.path().join("missing"));
        assert!(matches!(result, Err(FilesystemError::ReadFile { .. })));
    }
}
