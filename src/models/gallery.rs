use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::uploads::{extension_of, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GalleryMedia {
    Image { source: String },
    Video { source: String },
    /// Ordered frames for the client-side 360° spin viewer.
    Rotation { frames: Vec<String> },
}

impl GalleryMedia {
    pub fn sources(&self) -> Vec<&str> {
        match self {
            GalleryMedia::Image { source } | GalleryMedia::Video { source } => vec![source],
            GalleryMedia::Rotation { frames } => frames.iter().map(String::as_str).collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GalleryMedia::Image { .. } => "image",
            GalleryMedia::Video { .. } => "video",
            GalleryMedia::Rotation { .. } => "rotation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(flatten)]
    pub media: GalleryMedia,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Names of the files saved for this item. Only these are removed with it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploads: Vec<String>,
}

impl GalleryItem {
    pub fn new(media: GalleryMedia, title: Option<&str>, description: Option<&str>) -> Self {
        let clean = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        GalleryItem {
            media,
            title: clean(title),
            description: clean(description),
            created_at: Some(Utc::now()),
            uploads: Vec::new(),
        }
    }

    /// Record which of `saved` (upload names from the creating request) the
    /// media actually uses. A `/uploads/` URL typed by hand never counts.
    pub fn with_uploads(mut self, saved: &[String]) -> Self {
        let sources = self.media.sources();
        self.uploads = saved
            .iter()
            .filter(|name| sources.contains(&format!("/uploads/{}", name).as_str()))
            .cloned()
            .collect();
        self
    }

    /// Upload names this item owns.
    pub fn owned_uploads(&self) -> Vec<String> {
        self.uploads.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

/// Kind of a source by extension. For absolute URLs only the path counts,
/// so `photo.jpg?w=600` is still an image.
pub fn media_kind(source: &str) -> MediaKind {
    let path = match url::Url::parse(source) {
        Ok(u) => u.path().to_string(),
        Err(_) => source
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    match extension_of(&path) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Image,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
        _ => MediaKind::Unknown,
    }
}

#[derive(Debug, PartialEq)]
pub struct Classified {
    pub media: GalleryMedia,
    /// Sources that were ignored (unknown type, or videos next to a rotation).
    pub dropped: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum ClassifyError {
    NoSource { dropped: Vec<String> },
    Mixed { images: usize, videos: usize },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::NoSource { dropped } if dropped.is_empty() => {
                write!(f, "No image or video was provided")
            }
            ClassifyError::NoSource { dropped } => {
                write!(f, "Unsupported media: {}", dropped.join(", "))
            }
            ClassifyError::Mixed { images, videos } => write!(
                f,
                "Cannot combine {} image(s) with {} video(s) in one gallery item",
                images, videos
            ),
        }
    }
}

/// Decide what kind of gallery item a submission becomes.
///
/// `uploads` are the `/uploads/...` paths of files saved for this submission,
/// `urls_raw` is the comma-separated URL field. Sources keep submission order,
/// uploads first. Two or more images make a rotation; a lone image or a lone
/// video make a single item; everything else is rejected.
pub fn classify(uploads: &[String], urls_raw: &str) -> Result<Classified, ClassifyError> {
    let urls = urls_raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut images = Vec::new();
    let mut videos = Vec::new();
    let mut dropped = Vec::new();
    for source in uploads.iter().cloned().chain(urls) {
        match media_kind(&source) {
            MediaKind::Image => images.push(source),
            MediaKind::Video => videos.push(source),
            MediaKind::Unknown => dropped.push(source),
        }
    }

    match (images.len(), videos.len()) {
        (0, 0) => Err(ClassifyError::NoSource { dropped }),
        (n, _) if n >= 2 => {
            dropped.extend(videos);
            Ok(Classified {
                media: GalleryMedia::Rotation { frames: images },
                dropped,
            })
        }
        (1, 0) => Ok(Classified {
            media: GalleryMedia::Image {
                source: images.remove(0),
            },
            dropped,
        }),
        (0, 1) => Ok(Classified {
            media: GalleryMedia::Video {
                source: videos.remove(0),
            },
            dropped,
        }),
        (images, videos) => Err(ClassifyError::Mixed { images, videos }),
    }
}
