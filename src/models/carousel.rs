use serde::{Deserialize, Serialize};

/// Homepage rotator cap, enforced on insert.
pub const MAX_CAROUSEL_ITEMS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselKind {
    Image,
    Pdf,
}

impl CarouselKind {
    pub fn from_filename(name: &str) -> Option<CarouselKind> {
        let ext = crate::uploads::extension_of(name)?;
        if ext == "pdf" {
            Some(CarouselKind::Pdf)
        } else if crate::uploads::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(CarouselKind::Image)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselItem {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: CarouselKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Swap the entry at `idx` with its neighbour. Moving past either end is a no-op
/// that still reports success; an out-of-range index is an error.
pub fn swap_with_neighbour<T>(items: &mut [T], idx: usize, dir: Direction) -> Result<(), String> {
    if idx >= items.len() {
        return Err(format!("No entry at position {}", idx));
    }
    match dir {
        Direction::Up if idx > 0 => items.swap(idx, idx - 1),
        Direction::Down if idx + 1 < items.len() => items.swap(idx, idx + 1),
        _ => {}
    }
    Ok(())
}
