use axum::body::Bytes;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::preview::PreviewHandle;

/// A file as received from the client, before wizard checks
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl IncomingFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Only images and videos are accepted as hazard media
    pub fn is_image_or_video(&self) -> bool {
        self.content_type.starts_with("image/") || self.content_type.starts_with("video/")
    }
}

/// An accepted attachment, paired with its preview
#[derive(Debug)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
    preview: PreviewHandle,
}

impl MediaFile {
    pub fn new(file: IncomingFile, preview: PreviewHandle) -> Self {
        Self {
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
            preview,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn preview_id(&self) -> Uuid {
        self.preview.id()
    }

    pub fn summary(&self, index: usize) -> MediaSummary {
        MediaSummary {
            index,
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.size(),
            preview_url: format!("/api/hazards/previews/{}", self.preview_id()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MediaSummary {
    pub index: usize,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    pub preview_url: String,
}
