use serde::{Deserialize, Serialize};

use super::Bilingual;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PortfolioItem {
    pub titre: Bilingual,
    pub desc: Bilingual,
    /// Image URLs, either absolute or `/uploads/<name>`.
    #[serde(default)]
    pub imgs: Vec<String>,
    /// Stored upload names offered for download.
    #[serde(default)]
    pub fichiers: Vec<String>,
    /// Names of images uploaded for this item, as opposed to typed URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub img_uploads: Vec<String>,
}

impl PortfolioItem {
    /// Stored upload names this item owns: its files and the images it
    /// uploaded that are still listed.
    pub fn owned_uploads(&self) -> Vec<String> {
        let mut names = self.fichiers.clone();
        names.extend(self.img_uploads.iter().cloned());
        names
    }

    /// Forget uploaded images that are no longer listed in `imgs` and
    /// return their names.
    pub fn release_unlisted_images(&mut self) -> Vec<String> {
        let imgs = &self.imgs;
        let (kept, released): (Vec<String>, Vec<String>) = self
            .img_uploads
            .drain(..)
            .partition(|name| imgs.iter().any(|img| img == &format!("/uploads/{}", name)));
        self.img_uploads = kept;
        released
    }
}

/// Split the comma-separated image URL field, dropping blanks.
pub fn parse_image_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn default_portfolio() -> Vec<PortfolioItem> {
    vec![PortfolioItem {
        titre: Bilingual::new(
            "Résidence de standing (Niamey)",
            "Premium Residence (Niamey)",
        ),
        desc: Bilingual::new(
            "Plans de coffrage et ferraillage, modélisation Revit, synthèse et quantitatifs.",
            "Formwork and rebar plans, Revit modeling, syntheses and BOQs.",
        ),
        imgs: vec![
            "https://images.unsplash.com/photo-1506744038136-46273834b3fb?auto=format&fit=crop&w=600&q=80"
                .to_string(),
        ],
        fichiers: Vec::new(),
        img_uploads: Vec::new(),
    }]
}
