//! Binary resources referenced by pictures and media shapes.

use serde::{Deserialize, Serialize};

/// Type of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Image (PNG, JPEG, GIF, BMP, TIFF, WMF, EMF, SVG)
    Image,
    /// Audio file
    Audio,
    /// Video file
    Video,
    /// Other binary data
    Other,
}

impl ResourceType {
    /// Determine resource type from MIME type.
    pub fn from_mime_type(mime: &str) -> Self {
        let mime_lower = mime.to_lowercase();
        if mime_lower.starts_with("image/") {
            ResourceType::Image
        } else if mime_lower.starts_with("audio/") {
            ResourceType::Audio
        } else if mime_lower.starts_with("video/") {
            ResourceType::Video
        } else {
            ResourceType::Other
        }
    }
}

/// A binary part of the package (image, audio or video).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type
    pub resource_type: ResourceType,

    /// Part path inside the package, e.g. `ppt/media/image1.png`
    pub part_path: String,

    /// MIME type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Binary data
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Size in bytes
    pub size: usize,
}

impl Resource {
    /// Create a resource for a package part, deriving the MIME type from its extension.
    pub fn from_part(part_path: impl Into<String>, data: Vec<u8>) -> Self {
        let part_path = part_path.into();
        let mime_type = Self::mime_from_filename(&part_path);
        let resource_type = mime_type
            .as_deref()
            .map(ResourceType::from_mime_type)
            .unwrap_or(ResourceType::Other);
        Self {
            resource_type,
            size: data.len(),
            part_path,
            mime_type,
            data,
        }
    }

    /// File name component of the part path.
    pub fn file_name(&self) -> &str {
        self.part_path
            .rsplit('/')
            .next()
            .unwrap_or(self.part_path.as_str())
    }

    /// Determine MIME type from filename.
    pub fn mime_from_filename(filename: &str) -> Option<String> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" | "tif" => "image/tiff",
            "svg" => "image/svg+xml",
            "wmf" => "image/x-wmf",
            "emf" => "image/x-emf",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "m4a" => "audio/mp4",
            "wma" => "audio/x-ms-wma",
            "mp4" => "video/mp4",
            "avi" => "video/x-msvideo",
            "mov" => "video/quicktime",
            "wmv" => "video/x-ms-wmv",
            "webm" => "video/webm",
            _ => return None,
        };
        Some(mime.to_string())
    }

    /// Save resource data to a file.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        std::fs::write(path, &self.data)
    }
}
