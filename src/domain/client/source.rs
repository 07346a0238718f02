//! Content sources accepted by upload operations

use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;

use crate::domain::error::PulpError;

/// Default read size when draining an upload source
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Where uploaded content comes from
#[derive(Debug)]
pub enum UploadSource {
    /// A file on disk, opened when the upload runs
    Path(PathBuf),

    /// An already opened file
    File(tokio::fs::File),

    /// Content held in memory
    Bytes(Bytes),
}

impl UploadSource {
    /// Final path component for sources backed by a path
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            _ => None,
        }
    }

    /// Read the whole source, `chunk_size` bytes at a time
    pub async fn read_all(self, chunk_size: usize) -> Result<Bytes, PulpError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Path(path) => {
                let file = tokio::fs::File::open(&path).await?;
                read_chunked(file, chunk_size).await
            }
            Self::File(file) => read_chunked(file, chunk_size).await,
        }
    }
}

async fn read_chunked(mut file: tokio::fs::File, chunk_size: usize) -> Result<Bytes, PulpError> {
    let chunk_size = chunk_size.max(1);
    let mut content = BytesMut::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        let read = file.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        content.extend_from_slice(&chunk[..read]);
    }

    Ok(content.freeze())
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<tokio::fs::File> for UploadSource {
    fn from(file: tokio::fs::File) -> Self {
        Self::File(file)
    }
}

impl From<Bytes> for UploadSource {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_bytes() {
        let source = UploadSource::from(b"hello".to_vec());
        assert!(source.file_name().is_none());
        assert_eq!(source.read_all(2).await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_read_path_in_small_chunks() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"some file content").unwrap();

        let source = UploadSource::from(tmp.path());
        assert!(source.file_name().is_some());
        let content = source.read_all(3).await.unwrap();
        assert_eq!(&content[..], b"some file content");
    }

    #[tokio::test]
    async fn test_read_open_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abc").unwrap();

        let file = tokio::fs::File::open(tmp.path()).await.unwrap();
        let content = UploadSource::from(file).read_all(DEFAULT_CHUNK_SIZE).await.unwrap();
        assert_eq!(&content[..], b"abc");
    }

    #[tokio::test]
    async fn test_missing_path_is_io_error() {
        let source = UploadSource::from(PathBuf::from("/nonexistent/walrus.rpm"));
        let err = source.read_all(DEFAULT_CHUNK_SIZE).await.unwrap_err();
        assert!(matches!(err, PulpError::Io(_)));
    }
}
