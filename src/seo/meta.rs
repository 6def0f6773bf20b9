use crate::i18n::{Lang, LANGS};
use crate::models::settings::SiteConfig;

use super::html_escape;

/// Build the `<title>`, description, canonical and Open Graph tags for a page.
pub fn build_meta(
    site: &SiteConfig,
    site_url: &str,
    lang: Lang,
    title: Option<&str>,
    path: &str,
) -> String {
    let site_name = site.nom.as_str();
    let page_title = match title {
        Some(t) => format!("{} — {}", t, site_name),
        None => format!("{} — {}", site_name, site.titre.get(lang)),
    };
    let page_desc = site.slogan.get(lang);
    let canonical = format!("{}{}", site_url.trim_end_matches('/'), path);

    let mut meta = format!(
        r#"<title>{}</title>
<meta name="description" content="{}">
<link rel="canonical" href="{}">"#,
        html_escape(&page_title),
        html_escape(page_desc),
        html_escape(&canonical),
    );

    meta.push_str(&format!(
        r#"
<meta property="og:title" content="{}">
<meta property="og:description" content="{}">
<meta property="og:url" content="{}">
<meta property="og:site_name" content="{}">
<meta property="og:type" content="website">
<meta property="og:locale" content="{}">"#,
        html_escape(&page_title),
        html_escape(page_desc),
        html_escape(&canonical),
        html_escape(site_name),
        match lang {
            Lang::Fr => "fr_FR",
            Lang::En => "en_US",
        },
    ));

    if site.photo.starts_with("http") {
        meta.push_str(&format!(
            "\n<meta property=\"og:image\" content=\"{}\">",
            html_escape(&site.photo)
        ));
    }

    for (code, _) in LANGS {
        meta.push_str(&format!(
            "\n<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\">",
            code,
            html_escape(&canonical)
        ));
    }

    meta
}
