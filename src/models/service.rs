use serde::{Deserialize, Serialize};

use super::Bilingual;

pub const DEFAULT_ICON: &str = "bi-star";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub titre: Bilingual,
    pub desc: Bilingual,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl Service {
    /// Build a service from admin form fields. All four texts are required;
    /// a blank icon falls back to `bi-star`.
    pub fn from_form(
        titre_fr: Option<&str>,
        titre_en: Option<&str>,
        desc_fr: Option<&str>,
        desc_en: Option<&str>,
        icon: Option<&str>,
    ) -> Option<Service> {
        let titre = Bilingual::from_form(titre_fr, titre_en)?;
        let desc = Bilingual::from_form(desc_fr, desc_en)?;
        let icon = icon
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ICON)
            .to_string();
        Some(Service { titre, desc, icon })
    }
}

pub fn default_services() -> Vec<Service> {
    let s = |tfr: &str, ten: &str, dfr: &str, den: &str, icon: &str| Service {
        titre: Bilingual::new(tfr, ten),
        desc: Bilingual::new(dfr, den),
        icon: icon.to_string(),
    };
    vec![
        s(
            "Plans d’armatures Revit",
            "Rebar plans (Revit)",
            "Plans d’armatures clairs et complets pour béton armé.",
            "Clear, complete rebar plans for reinforced concrete.",
            "bi-diagram-3",
        ),
        s(
            "Études et plans métalliques",
            "Steel structure studies & plans",
            "Calculs et plans pour charpentes, hangars, structures métalliques.",
            "Design & drawings for steel frames, hangars, metal structures.",
            "bi-building",
        ),
        s(
            "Modélisation BIM complète",
            "Complete BIM modeling",
            "Maquettes numériques, familles paramétriques, coordination.",
            "Digital models, parametric families, project coordination.",
            "bi-boxes",
        ),
        s(
            "Audit et optimisation",
            "Audit & optimization",
            "Vérification, corrections et conseils pour réduire coûts/risques.",
            "Checks, corrections, advice to reduce cost & risks.",
            "bi-search",
        ),
        s(
            "Formation/Accompagnement",
            "Training/Support",
            "Formation Revit ou support ponctuel pour vos équipes.",
            "Revit training or support for your team.",
            "bi-person-video3",
        ),
    ]
}
