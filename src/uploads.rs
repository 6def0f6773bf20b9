use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{info, warn};
use rocket::fs::TempFile;
use zip::write::SimpleFileOptions;

pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv",
];
pub const CAD_EXTENSIONS: &[&str] = &["dwg", "dxf", "rvt", "rfa", "ifc", "skp"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv"];

/// What an upload is for; each purpose has its own extension allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPurpose {
    /// Contact-form and portfolio attachments.
    Attachment,
    /// Homepage slides: images or a PDF.
    Carousel,
    /// Gallery media: images or videos.
    Gallery,
    /// Pictures only (portfolio images, profile photo).
    Photo,
}

impl UploadPurpose {
    pub fn allows(self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();
        match self {
            UploadPurpose::Attachment => {
                DOCUMENT_EXTENSIONS.contains(&ext)
                    || CAD_EXTENSIONS.contains(&ext)
                    || IMAGE_EXTENSIONS.contains(&ext)
                    || ARCHIVE_EXTENSIONS.contains(&ext)
                    || VIDEO_EXTENSIONS.contains(&ext)
            }
            UploadPurpose::Carousel => ext == "pdf" || IMAGE_EXTENSIONS.contains(&ext),
            UploadPurpose::Gallery => {
                IMAGE_EXTENSIONS.contains(&ext) || VIDEO_EXTENSIONS.contains(&ext)
            }
            UploadPurpose::Photo => IMAGE_EXTENSIONS.contains(&ext),
        }
    }

    /// `accept` attribute for the matching file input.
    pub fn accept_attr(self) -> String {
        let lists: &[&[&str]] = match self {
            UploadPurpose::Attachment => &[
                DOCUMENT_EXTENSIONS,
                CAD_EXTENSIONS,
                IMAGE_EXTENSIONS,
                ARCHIVE_EXTENSIONS,
                VIDEO_EXTENSIONS,
            ],
            UploadPurpose::Carousel => &[IMAGE_EXTENSIONS, &["pdf"]],
            UploadPurpose::Gallery => &[IMAGE_EXTENSIONS, VIDEO_EXTENSIONS],
            UploadPurpose::Photo => &[IMAGE_EXTENSIONS],
        };
        lists
            .iter()
            .flat_map(|l| l.iter())
            .map(|e| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Lower-cased extension after the last dot, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let base = base_name(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn base_name(name: &str) -> &str {
    name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name)
}

/// Reduce a client-supplied file name to something safe to store:
/// directory parts dropped, stem slugified to ASCII, extension kept lower-cased.
pub fn secure_filename(raw: &str) -> String {
    let base = base_name(raw).trim().trim_start_matches('.');
    let (stem, ext) = match base.rsplit_once('.') {
        Some((s, e)) if !e.is_empty() => (s, Some(e)),
        _ => (base, None),
    };
    let mut stem = slug::slugify(stem);
    if stem.is_empty() {
        stem = "file".to_string();
    }
    let ext: Option<String> = ext
        .map(|e| {
            e.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|e| !e.is_empty());
    match ext {
        Some(e) => format!("{}.{}", stem, e),
        None => stem,
    }
}

/// Timestamped storage name: `20250101_120000_123_plan-rdc.dwg`.
pub fn stored_name(raw: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.format("%Y%m%d_%H%M%S_%3f"), secure_filename(raw))
}

/// First free name in `dir`, appending `_1`, `_2`, … before the extension.
fn unique_destination(dir: &Path, name: &str) -> (PathBuf, String) {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return (candidate, name.to_string());
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) => (s.to_string(), format!(".{}", e)),
        None => (name.to_string(), String::new()),
    };
    let mut n = 1u32;
    loop {
        let alt = format!("{}_{}{}", stem, n, ext);
        let path = dir.join(&alt);
        if !path.exists() {
            return (path, alt);
        }
        n += 1;
    }
}

/// Client-side name of a multipart file, as sent by the browser.
pub fn raw_name(file: &TempFile<'_>) -> Option<String> {
    file.raw_name()
        .map(|rn| rn.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .filter(|s| !s.trim().is_empty())
}

/// Persist an uploaded file into `dir` under a timestamped, sanitised name.
/// Files outside the purpose's allow-list are never written.
pub async fn save_upload(
    file: &mut TempFile<'_>,
    dir: &Path,
    purpose: UploadPurpose,
) -> Result<String, String> {
    let raw = raw_name(file).ok_or_else(|| "Missing file name".to_string())?;
    if file.len() == 0 {
        return Err(format!("{}: empty file", raw));
    }
    let ext = extension_of(&raw).unwrap_or_default();
    if !purpose.allows(&ext) {
        return Err(format!("{}: file type not allowed", raw));
    }

    std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let (dest, name) = unique_destination(dir, &stored_name(&raw, Utc::now()));
    file.persist_to(&dest)
        .await
        .map_err(|e| format!("{}: {}", raw, e))?;
    info!("Stored upload {} ({} bytes)", name, file.len());
    Ok(name)
}

/// Resolve a stored upload name inside `dir`. Names with path components are refused.
pub fn resolve(dir: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() || name != base_name(name) || name.starts_with('.') {
        return None;
    }
    let path = dir.join(name);
    path.is_file().then_some(path)
}

/// Delete a stored upload. Failures are logged and otherwise ignored so a
/// missing file never blocks removing the entry that referenced it.
pub fn remove_upload(dir: &Path, name: &str) {
    match resolve(dir, name) {
        Some(path) => {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Could not remove upload {}: {}", name, e);
            }
        }
        None => warn!("Upload {} not found, nothing to remove", name),
    }
}

/// Zip a set of stored uploads plus extra in-memory entries.
/// Missing uploads are skipped.
pub fn zip_bundle(dir: &Path, names: &[String], extra: &[(&str, &[u8])]) -> Result<Vec<u8>, String> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (entry, bytes) in extra {
        zip.start_file(*entry, options).map_err(|e| e.to_string())?;
        zip.write_all(bytes).map_err(|e| e.to_string())?;
    }
    for name in names {
        let path = match resolve(dir, name) {
            Some(p) => p,
            None => {
                warn!("Skipping missing upload {} in archive", name);
                continue;
            }
        };
        let bytes = std::fs::read(&path).map_err(|e| format!("{}: {}", name, e))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| e.to_string())?;
        zip.write_all(&bytes).map_err(|e| e.to_string())?;
    }

    let cursor = zip.finish().map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

/// Zip every regular file of the upload folder.
pub fn zip_directory(dir: &Path) -> Result<Vec<u8>, String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| e.to_string())?
        .flatten()
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    zip_bundle(dir, &names, &[])
}
