use serde::Serialize;

/// Languages offered by the site selector, in display order.
pub const LANGS: &[(&str, &str)] = &[("fr", "Français"), ("en", "English")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Fr,
    En,
}

impl Lang {
    /// Unknown codes are rejected so `/set_lang` can ignore them.
    pub fn from_code(code: &str) -> Option<Lang> {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" => Some(Lang::Fr),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::Fr => "fr",
            Lang::En => "en",
        }
    }

    /// Pick between the French and English variant of a UI string.
    pub fn pick<'a>(self, fr: &'a str, en: &'a str) -> &'a str {
        match self {
            Lang::Fr => fr,
            Lang::En => en,
        }
    }
}

pub fn langs_context() -> Vec<serde_json::Value> {
    LANGS
        .iter()
        .map(|(code, name)| serde_json::json!({ "code": code, "name": name }))
        .collect()
}

/// Interface labels for the public templates, keyed by identifier.
const UI: &[(&str, &str, &str)] = &[
    ("nav_home", "Accueil", "Home"),
    ("nav_services", "Services", "Services"),
    ("nav_portfolio", "Réalisations", "Portfolio"),
    ("nav_gallery", "Galerie", "Gallery"),
    ("nav_why", "Pourquoi moi ?", "Why me?"),
    ("nav_contact", "Contact", "Contact"),
    ("dark_mode", "Mode sombre", "Dark mode"),
    ("light_mode", "Mode clair", "Light mode"),
    ("cta_quote", "Demander un devis", "Request a quote"),
    ("cta_portfolio", "Voir mes réalisations", "See my work"),
    ("services_title", "Mes services", "My services"),
    ("services_more", "Tous les services", "All services"),
    ("portfolio_title", "Réalisations", "Portfolio"),
    ("portfolio_files", "Documents", "Documents"),
    ("gallery_title", "Galerie", "Gallery"),
    ("gallery_empty", "Aucun média pour le moment.", "No media yet."),
    ("gallery_rotate", "Faites glisser pour pivoter", "Drag to rotate"),
    ("why_title", "Pourquoi me choisir ?", "Why choose me?"),
    ("contact_title", "Me contacter", "Contact me"),
    ("contact_intro", "Décrivez votre projet, je vous réponds sous 24h.", "Describe your project, I answer within 24h."),
    ("form_name", "Nom", "Name"),
    ("form_email", "E-mail", "E-mail"),
    ("form_subject", "Sujet", "Subject"),
    ("form_message", "Votre projet", "Your project"),
    ("form_files", "Pièces jointes (plans, DWG, PDF…)", "Attachments (plans, DWG, PDF…)"),
    ("form_send", "Envoyer", "Send"),
    ("address", "Adresse", "Address"),
    ("hours", "Horaires", "Hours"),
    ("phone", "Téléphone", "Phone"),
    ("empty", "Rien à afficher pour le moment.", "Nothing to show yet."),
];

pub fn ui_strings(lang: Lang) -> serde_json::Map<String, serde_json::Value> {
    UI.iter()
        .map(|(key, fr, en)| (key.to_string(), serde_json::Value::from(lang.pick(fr, en))))
        .collect()
}
