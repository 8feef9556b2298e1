use serde::{Deserialize, Serialize};

/// Reference to an image blob held by an image store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub uri: String,
}

/// An accepted image upload waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: &'static str,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}
