use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Bilingual;

/// Site identity, contact channels and theme. Persisted as `config.json`.
/// Keys missing from the file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub nom: String,
    pub titre: Bilingual,
    pub slogan: Bilingual,
    pub adresse: Bilingual,
    pub horaires: Bilingual,
    pub photo: String,
    pub email: String,
    pub tel: String,
    pub whatsapp: String,
    pub linkedin: String,
    pub couleur: String,
    pub couleur_secondaire: String,
    pub couleur_accent: String,
    pub font: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            nom: "Issoufou Abdou Chefou".to_string(),
            titre: Bilingual::new(
                "Ingénieur en Génie Civil & BIM | Freelance",
                "Civil Engineer & BIM Specialist | Freelancer",
            ),
            slogan: Bilingual::new(
                "Vous avez un projet ? Confiez-le à un professionnel passionné.",
                "Have a project? Entrust it to a passionate professional.",
            ),
            adresse: Bilingual::new(
                "Niamey, Niger (disponible à l'international)",
                "Niamey, Niger (available internationally)",
            ),
            horaires: Bilingual::new(
                "Lundi-Samedi : 8h – 19h (GMT+1)",
                "Monday–Saturday: 8AM – 7PM (GMT+1)",
            ),
            photo: "https://randomuser.me/api/portraits/men/75.jpg".to_string(),
            email: "contact@example.com".to_string(),
            tel: "+227 90 00 00 00".to_string(),
            whatsapp: "+227 90 00 00 00".to_string(),
            linkedin: "https://www.linkedin.com/".to_string(),
            couleur: "#1f87e0".to_string(),
            couleur_secondaire: "#43e3ff".to_string(),
            couleur_accent: "#ffd600".to_string(),
            font: "Montserrat".to_string(),
        }
    }
}

/// Single-valued fields editable from the settings form.
pub const PLAIN_KEYS: &[&str] = &[
    "nom",
    "photo",
    "email",
    "tel",
    "whatsapp",
    "linkedin",
    "couleur",
    "couleur_secondaire",
    "couleur_accent",
    "font",
];

/// Bilingual fields, submitted as `<key>_fr` / `<key>_en`.
pub const TRANSLATED_KEYS: &[&str] = &["titre", "slogan", "adresse", "horaires"];

impl SiteConfig {
    /// Apply a settings form. Blank plain fields keep their current value;
    /// a translated field only changes when both languages are filled in.
    /// Returns the number of fields that changed.
    pub fn apply_form(&mut self, form: &HashMap<String, String>) -> usize {
        let mut changed = 0;
        for key in PLAIN_KEYS {
            let value = match form.get(*key).map(|v| v.trim()) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => continue,
            };
            if let Some(slot) = self.plain_field_mut(key) {
                if *slot != value {
                    *slot = value;
                    changed += 1;
                }
            }
        }
        for key in TRANSLATED_KEYS {
            let fr = form.get(&format!("{}_fr", key)).map(String::as_str);
            let en = form.get(&format!("{}_en", key)).map(String::as_str);
            let value = match Bilingual::from_form(fr, en) {
                Some(v) => v,
                None => continue,
            };
            if let Some(slot) = self.translated_field_mut(key) {
                if *slot != value {
                    *slot = value;
                    changed += 1;
                }
            }
        }
        changed
    }

    fn plain_field_mut(&mut self, key: &str) -> Option<&mut String> {
        Some(match key {
            "nom" => &mut self.nom,
            "photo" => &mut self.photo,
            "email" => &mut self.email,
            "tel" => &mut self.tel,
            "whatsapp" => &mut self.whatsapp,
            "linkedin" => &mut self.linkedin,
            "couleur" => &mut self.couleur,
            "couleur_secondaire" => &mut self.couleur_secondaire,
            "couleur_accent" => &mut self.couleur_accent,
            "font" => &mut self.font,
            _ => return None,
        })
    }

    fn translated_field_mut(&mut self, key: &str) -> Option<&mut Bilingual> {
        Some(match key {
            "titre" => &mut self.titre,
            "slogan" => &mut self.slogan,
            "adresse" => &mut self.adresse,
            "horaires" => &mut self.horaires,
            _ => return None,
        })
    }

    /// Digits-only WhatsApp number for `https://wa.me/<n>` links.
    pub fn whatsapp_digits(&self) -> String {
        self.whatsapp.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Google Fonts family parameter (`Open Sans` → `Open+Sans`).
    pub fn font_query(&self) -> String {
        self.font.trim().replace(' ', "+")
    }
}
