use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format of a batch generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Pdf,
    Png,
    Jpg,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Pdf => "pdf",
            FileFormat::Png => "png",
            FileFormat::Jpg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Pdf => "application/pdf",
            FileFormat::Png => "image/png",
            FileFormat::Jpg => "image/jpeg",
        }
    }
}

/// One rendered invitation document for one recipient.
///
/// Created once per (recipient, format) pair during batch generation and
/// never mutated afterwards. The bytes are held in memory for the duration
/// of the session only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub id: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub file_type: FileFormat,
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}
