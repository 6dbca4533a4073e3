use crate::error::{ApplyError, Phase};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// What a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory { empty: bool },
}

/// Synchronous filesystem primitives consumed by the engine
///
/// Every method is a single blocking call. Implementations provide no
/// locking; callers serialize access to a given path.
pub trait FileSystem {
    /// Read a whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    /// Replace a whole file, creating it if needed
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    /// Inspect a path without following a final symlink; `Ok(None)` when
    /// nothing exists there
    fn stat(&self, path: &Path) -> io::Result<Option<EntryKind>>;
    /// Remove a file or an empty directory
    fn remove(&self, path: &Path) -> io::Result<()>;
    /// Remove a path and everything under it; a missing path is not an error
    fn remove_all(&self, path: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write(path, contents)
    }

    fn stat(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        (**self).stat(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        (**self).remove_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).rename(from, to)
    }
}

/// The local filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsFileSystem {
    /// Permission bits for files this filesystem creates (Unix only)
    pub file_mode: u32,
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self { file_mode: 0o644 }
    }
}

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.file_mode);
        }
        let mut file = options.open(path)?;
        file.write_all(contents)?;
        file.flush()
    }

    fn stat(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        // Symlinks are not followed; a link reports as a file, like `remove` treats it
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        if metadata.is_dir() {
            let empty = fs::read_dir(path)?.next().is_none();
            Ok(Some(EntryKind::Directory { empty }))
        } else {
            Ok(Some(EntryKind::File))
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// Content of a file read into memory
#[derive(Debug, Clone)]
pub struct FileContent {
    pub path: PathBuf,
    /// File content as valid UTF-8 string
    pub content: String,
    /// BLAKE3 hash of the content (hex-encoded)
    pub checksum: String,
}

/// BLAKE3 hash of `content`, hex-encoded
pub fn checksum(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Read a file with UTF-8 validation
///
/// # Returns
/// * `Ok(FileContent)` - File content with its checksum
/// * `Err(ApplyError)` - I/O failure (phase `read`) or invalid UTF-8
pub fn read_file<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<FileContent, ApplyError> {
    let bytes = fs
        .read(path)
        .map_err(|e| ApplyError::io(Phase::Read, path, e))?;

    let content = String::from_utf8(bytes).map_err(|_| ApplyError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;

    let checksum = checksum(&content);
    Ok(FileContent {
        path: path.to_path_buf(),
        content,
        checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_valid_utf8() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("valid.txt");
        let content = "Hello, world!\nThis is a test file.";
        std::fs::write(&file_path, content).unwrap();

        let file_content = read_file(&OsFileSystem::default(), &file_path).unwrap();

        assert_eq!(file_content.content, content);
        assert_eq!(file_content.path, file_path);
        assert_eq!(file_content.checksum, checksum(content));
        assert_eq!(file_content.checksum.len(), 64);
        assert!(file_content.checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_read_file_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("invalid.txt");
        std::fs::write(&file_path, [0xFF, 0xFE, 0xFD]).unwrap();

        match read_file(&OsFileSystem::default(), &file_path) {
            Err(ApplyError::InvalidUtf8 { path }) => assert_eq!(path, file_path),
            other => panic!("Expected ApplyError::InvalidUtf8, got {:?}", other),
        }
    }

    #[test]
    fn test_read_file_not_found() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("missing.txt");

        let err = read_file(&OsFileSystem::default(), &file_path).unwrap_err();

        assert_eq!(err.class(), ErrorClass::Io);
        match err {
            ApplyError::Io { phase, source, .. } => {
                assert_eq!(phase, Phase::Read);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("Expected ApplyError::Io, got {:?}", other),
        }
    }

    #[test]
    fn test_stat() {
        let dir = TempDir::new().unwrap();
        let fs = OsFileSystem::default();
        let file = dir.path().join("file.txt");
        let sub = dir.path().join("sub");

        assert_eq!(fs.stat(&file).unwrap(), None);
        std::fs::write(&file, "x").unwrap();
        assert_eq!(fs.stat(&file).unwrap(), Some(EntryKind::File));

        std::fs::create_dir(&sub).unwrap();
        assert_eq!(fs.stat(&sub).unwrap(), Some(EntryKind::Directory { empty: true }));
        std::fs::write(sub.join("inner"), "y").unwrap();
        assert_eq!(fs.stat(&sub).unwrap(), Some(EntryKind::Directory { empty: false }));
    }

    #[test]
    fn test_remove_and_remove_all() {
        let dir = TempDir::new().unwrap();
        let fs = OsFileSystem::default();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("inner"), "y").unwrap();

        assert!(fs.remove(&sub).is_err());
        assert!(sub.join("inner").exists());

        fs.remove_all(&sub).unwrap();
        assert!(!sub.exists());
        fs.remove_all(&sub).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_stat_does_not_follow_symlinks() {
        let dir = TempDir::new().unwrap();
        let fs = OsFileSystem::default();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        let dangling = dir.path().join("dangling");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("inner"), "y").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), &dangling).unwrap();

        assert_eq!(fs.stat(&link).unwrap(), Some(EntryKind::File));
        assert_eq!(fs.stat(&dangling).unwrap(), Some(EntryKind::File));

        fs.remove(&link).unwrap();
        assert!(!link.exists());
        assert!(real.join("inner").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_uses_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mode.txt");
        let fs = OsFileSystem { file_mode: 0o600 };

        fs.write(&file, b"secret").unwrap();

        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read(&file).unwrap(), b"secret");
    }
}
