use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

pub mod analytics;
pub mod carousel;
pub mod gallery;
pub mod message;
pub mod portfolio;
pub mod service;
pub mod settings;

/// A piece of text kept in both site languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    #[serde(default)]
    pub fr: String,
    #[serde(default)]
    pub en: String,
}

impl Bilingual {
    pub fn new(fr: &str, en: &str) -> Self {
        Bilingual {
            fr: fr.to_string(),
            en: en.to_string(),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Fr => &self.fr,
            Lang::En => &self.en,
        }
    }

    /// Both halves are required; blank input on either side yields `None`.
    pub fn from_form(fr: Option<&str>, en: Option<&str>) -> Option<Self> {
        let fr = fr.map(str::trim).filter(|s| !s.is_empty())?;
        let en = en.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Bilingual::new(fr, en))
    }
}

/// "Why me" argument shown on `/pourquoi`. Stored as a bare `{fr, en}` pair.
pub type Atout = Bilingual;

pub fn default_atouts() -> Vec<Atout> {
    vec![
        Bilingual::new(
            "7 ans d’expérience sur des projets variés en Afrique et à l’international.",
            "7 years of experience with varied projects in Africa and abroad.",
        ),
        Bilingual::new(
            "Maîtrise avancée de Revit, AutoCAD, Robot Structural Analysis.",
            "Advanced skills in Revit, AutoCAD, Robot Structural Analysis.",
        ),
        Bilingual::new(
            "Réactivité : réponse à toutes demandes en moins de 24h.",
            "Responsive: answers to all requests in less than 24h.",
        ),
        Bilingual::new(
            "Travail 100% à distance, process sécurisé, confidentialité garantie.",
            "100% remote work, secured process, guaranteed confidentiality.",
        ),
        Bilingual::new(
            "Respect total des délais et adaptation à vos besoins spécifiques.",
            "Strict respect for deadlines, adaptable to your needs.",
        ),
        Bilingual::new(
            "Conseils gratuits avant devis : je vous oriente même sans plans précis.",
            "Free advice before any quote, even if you don’t have precise plans.",
        ),
    ]
}
