//! Optional document field extraction.
//!
//! When an attachment is uploaded, a [`DocumentExtractor`] may be asked to
//! pull structured fields out of it (vendor, amount, items). Results are
//! advisory: they are returned to the caller and never written back to the
//! request. Extraction failures never block the upload.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored file handed to an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Original file name.
    pub file_name: String,
    /// Key under which the file is stored.
    pub storage_key: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
}

impl FileHandle {
    /// Lowercased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// An item line found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Item name as printed.
    pub name: String,
    /// Unit price, if printed.
    pub price: Option<Decimal>,
    /// Quantity, if printed.
    pub quantity: Option<i32>,
}

/// Fields recovered from a document. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Vendor name.
    pub vendor_name: Option<String>,
    /// Total amount.
    pub amount: Option<Decimal>,
    /// Item lines.
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
}

impl ExtractedFields {
    /// Returns true if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendor_name.is_none() && self.amount.is_none() && self.items.is_empty()
    }
}

/// Extraction failures.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The extractor does not handle this kind of file.
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    /// The file could not be read.
    #[error("Failed to read document: {0}")]
    Read(String),

    /// The extraction backend failed.
    #[error("Extraction backend error: {0}")]
    Backend(String),
}

/// Pluggable document extraction hook.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts fields from a stored file.
    async fn extract(&self, file: &FileHandle) -> Result<ExtractedFields, ExtractionError>;
}

/// Extractor that recognizes nothing. Used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

#[async_trait]
impl DocumentExtractor for NoopExtractor {
    async fn extract(&self, _file: &FileHandle) -> Result<ExtractedFields, ExtractionError> {
        Ok(ExtractedFields::default())
    }
}
