use super::html_escape;

/// Public pages, with their sitemap priority.
pub const PUBLIC_PAGES: &[(&str, &str)] = &[
    ("/", "1.0"),
    ("/services", "0.8"),
    ("/portfolio", "0.8"),
    ("/galerie", "0.7"),
    ("/pourquoi", "0.6"),
    ("/contact", "0.9"),
];

/// Generate sitemap.xml content. The admin mount is never listed.
pub fn generate_sitemap(site_url: &str) -> String {
    let base = site_url.trim_end_matches('/');
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );

    for (path, priority) in PUBLIC_PAGES {
        let loc = if *path == "/" {
            base.to_string()
        } else {
            format!("{}{}", base, path)
        };
        xml.push_str(&format!(
            "  <url><loc>{}</loc><changefreq>weekly</changefreq><priority>{}</priority></url>\n",
            html_escape(&loc),
            priority
        ));
    }

    xml.push_str("</urlset>");
    xml
}

/// Generate robots.txt content with the sitemap URL.
pub fn generate_robots(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /uploads/\n\nSitemap: {}/sitemap.xml\n",
        site_url.trim_end_matches('/')
    )
}
