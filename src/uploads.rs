//! Files attached to the session.
//!
//! Bytes are kept as received and never parsed; the console only names
//! and counts them.

use std::path::{Path, PathBuf};

/// Errors from attaching a file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a file name")]
    NoFileName(PathBuf),
}

/// One attached file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Attached files in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uploads {
    files: Vec<UploadedFile>,
}

impl Uploads {
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> &UploadedFile {
        self.files.push(UploadedFile::new(name, bytes));
        &self.files[self.files.len() - 1]
    }

    /// Read a file from disk and attach it under its final path component.
    pub async fn load(&mut self, path: &Path) -> Result<&UploadedFile, UploadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::NoFileName(path.to_path_buf()))?;
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(file = %name, bytes = bytes.len(), "file attached");
        Ok(self.add(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UploadedFile> {
        self.files.iter()
    }

    /// "Uploaded N file(s)", or nothing when no file is attached.
    pub fn summary(&self) -> Option<String> {
        if self.files.is_empty() {
            None
        } else {
            Some(format!("Uploaded {} file(s)", self.files.len()))
        }
    }

    /// One "Filename: <name>" line per file.
    pub fn listing(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| format!("Filename: {}", f.name))
            .collect()
    }

    /// Summary followed by the listing, or a hint when empty.
    pub fn report(&self) -> String {
        match self.summary() {
            Some(summary) => {
                let mut lines = vec![summary];
                lines.extend(self.listing());
                lines.join("\n")
            }
            None => "No files uploaded. Use /upload <path> to attach one.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn summary_counts_files() {
        let mut uploads = Uploads::default();
        assert!(uploads.summary().is_none());
        uploads.add("a.txt", b"alpha".to_vec());
        uploads.add("b.pdf", vec![0, 1, 2]);
        uploads.add("c.csv", Vec::new());
        assert_eq!(uploads.summary().as_deref(), Some("Uploaded 3 file(s)"));
        assert_eq!(
            uploads.listing(),
            ["Filename: a.txt", "Filename: b.pdf", "Filename: c.csv"]
        );
    }

    #[test]
    fn report_when_empty() {
        assert!(Uploads::default().report().contains("/upload"));
    }

    #[tokio::test]
    async fn load_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# notes").unwrap();

        let mut uploads = Uploads::default();
        let file = uploads.load(&path).await.unwrap();
        assert_eq!(file.name(), "notes.md");
        assert_eq!(file.size(), 7);
        assert_eq!(uploads.len(), 1);
    }

    #[tokio::test]
    async fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut uploads = Uploads::default();
        let err = uploads.load(&dir.path().join("gone.txt")).await.unwrap_err();
        assert!(matches!(err, UploadError::Read { .. }));
        assert!(uploads.is_empty());
    }
}
