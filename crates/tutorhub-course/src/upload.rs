//! In-memory file attachments for multipart endpoints

use std::path::Path;

use tutorhub_http::FormData;

use crate::error::{CourseError, CourseResult};

/// A file ready to be sent as a multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> CourseResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| CourseError::invalid(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub(crate) fn attach(self, form: FormData, field: &str) -> FormData {
        form.file(field, self.file_name, self.mime_type, self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();

        let upload = Upload::from_path(&pdf).unwrap();
        assert_eq!(upload.file_name, "notes.pdf");
        assert_eq!(upload.mime_type, "application/pdf");
        assert_eq!(upload.bytes, b"%PDF-1.7");

        let raw = dir.path().join("README");
        std::fs::write(&raw, b"x").unwrap();
        assert_eq!(Upload::from_path(&raw).unwrap().mime_type, "application/octet-stream");
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let err = Upload::from_path("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, CourseError::Invalid(_)));
    }
}
