use rocket::http::{ContentType, Header};
use rocket::request::FlashMessage;
use rocket::response::{self, Responder, Response};
use rocket::Request;
use serde_json::{json, Value};
use std::io::Cursor;

pub mod admin;
pub mod public;
pub mod security;

/// One page of a list, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub current: usize,
    pub total_pages: usize,
    /// Slice bounds into the list being paged.
    pub start: usize,
    pub end: usize,
}

/// Clamp `page` into range and compute the slice for it.
/// An empty list still has one (empty) page.
pub fn paginate(len: usize, page: Option<usize>, per_page: usize) -> Page {
    let per_page = per_page.max(1);
    let total_pages = len.div_ceil(per_page).max(1);
    let current = page.unwrap_or(1).clamp(1, total_pages);
    let start = (current - 1) * per_page;
    let end = (start + per_page).min(len);
    Page {
        current,
        total_pages,
        start: start.min(len),
        end,
    }
}

impl Page {
    pub fn context(&self) -> Value {
        json!({
            "current_page": self.current,
            "total_pages": self.total_pages,
            "has_prev": self.current > 1,
            "has_next": self.current < self.total_pages,
        })
    }
}

/// `{kind, message}` for templates, or null.
pub fn flash_context(flash: Option<FlashMessage<'_>>) -> Value {
    match flash {
        Some(f) => json!({ "kind": f.kind(), "message": f.message() }),
        None => Value::Null,
    }
}

/// File download with a `Content-Disposition: attachment` header.
pub struct Attachment {
    pub filename: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn zip(filename: String, bytes: Vec<u8>) -> Self {
        Attachment { filename, content_type: ContentType::ZIP, bytes }
    }

    pub fn json(filename: String, bytes: Vec<u8>) -> Self {
        Attachment { filename, content_type: ContentType::JSON, bytes }
    }
}

impl<'r> Responder<'r, 'static> for Attachment {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(self.content_type)
            .header(Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename.replace('"', "")),
            ))
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}
