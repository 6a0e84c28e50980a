//! Multipart intake rules.
//!
//! The HTTP layer streams the multipart body; this module decides what it
//! may accept. Files are held in memory only.

use bytes::Bytes;

use super::error::IntakeError;

/// Default maximum file size: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Default multipart field carrying the image.
pub const DEFAULT_FIELD_NAME: &str = "image";

const IMAGE_TYPE_PREFIX: &str = "image/";

/// Limits applied to an incoming upload.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    max_file_size: usize,
    field_name: String,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakePolicy {
    /// Policy with the default size limit and field name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            field_name: DEFAULT_FIELD_NAME.to_string(),
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set the multipart field name.
    #[must_use]
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Maximum file size in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Field the file must arrive in.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Check a part's declared content type, returning the normalized MIME type.
    ///
    /// Parameters such as `; charset=...` are dropped and case is ignored.
    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<String, IntakeError> {
        let raw = content_type.unwrap_or_default();
        let normalized = raw
            .split(';')
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_ascii_lowercase();

        if normalized.len() > IMAGE_TYPE_PREFIX.len() && normalized.starts_with(IMAGE_TYPE_PREFIX)
        {
            Ok(normalized)
        } else {
            Err(IntakeError::UnsupportedMediaType {
                mime_type: raw.to_string(),
            })
        }
    }

    /// Check a running or final byte count against the limit.
    pub fn check_size(&self, size: usize) -> Result<(), IntakeError> {
        if size > self.max_file_size {
            return Err(IntakeError::PayloadTooLarge {
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Validate a fully buffered file.
    pub fn accept(
        &self,
        buffer: Bytes,
        content_type: Option<&str>,
        file_name: Option<String>,
    ) -> Result<IncomingFile, IntakeError> {
        let mime_type = self.check_content_type(content_type)?;
        self.check_size(buffer.len())?;
        if buffer.is_empty() {
            return Err(IntakeError::EmptyFile);
        }

        Ok(IncomingFile {
            declared_size: buffer.len(),
            buffer,
            mime_type,
            file_name,
        })
    }
}

/// A validated image held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    buffer: Bytes,
    mime_type: String,
    declared_size: usize,
    file_name: Option<String>,
}

impl IncomingFile {
    /// Raw bytes.
    #[must_use]
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Normalized MIME type, always `image/*`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes.
    #[must_use]
    pub fn declared_size(&self) -> usize {
        self.declared_size
    }

    /// Client-supplied file name, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Consume the file, yielding its bytes.
    #[must_use]
    pub fn into_buffer(self) -> Bytes {
        self.buffer
    }
}
