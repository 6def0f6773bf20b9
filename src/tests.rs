#![cfg(test)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

use crate::analytics::should_log;
use crate::config::{normalize_slug, SiteEnv};
use crate::models::analytics::{overview, TrafficEntry};
use crate::models::carousel::{swap_with_neighbour, CarouselItem, CarouselKind, Direction, MAX_CAROUSEL_ITEMS};
use crate::models::gallery::{classify, media_kind, ClassifyError, GalleryMedia, MediaKind};
use crate::models::message::{ContactMessage, MessageStatus};
use crate::models::portfolio::{parse_image_urls, PortfolioItem};
use crate::models::service::Service;
use crate::models::settings::SiteConfig;
use crate::models::Bilingual;
use crate::rate_limit::RateLimiter;
use crate::routes::paginate;
use crate::routes::public::back_path;
use crate::security::auth::AdminCredentials;
use crate::seo;
use crate::store::json_file::{load_json_file, save_json_file, Shape};
use crate::store::{JsonStore, Store, StorePaths};
use crate::uploads::{self, extension_of, secure_filename, stored_name, UploadPurpose};

/// Atomic counter for unique scratch directories so parallel tests don't collide.
static TEST_DIR_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Fresh, empty directory under the system temp dir.
fn scratch_dir() -> PathBuf {
    let id = TEST_DIR_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("bimfolio_test_{}_{}", std::process::id(), id));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_store(dir: &Path) -> JsonStore {
    JsonStore::open(StorePaths::in_dir(&dir.join("data")), 0).unwrap()
}

fn service(n: usize) -> Service {
    Service::from_form(
        Some(&format!("Titre {}", n)),
        Some(&format!("Title {}", n)),
        Some("desc"),
        Some("desc"),
        None,
    )
    .unwrap()
}

fn portfolio_item(name: &str, fichiers: Vec<String>) -> PortfolioItem {
    PortfolioItem {
        titre: Bilingual::new(name, name),
        desc: Bilingual::new("d", "d"),
        imgs: Vec::new(),
        fichiers,
        img_uploads: Vec::new(),
    }
}

fn entry(day: u32, path: &str, ip: &str, referrer: Option<&str>) -> TrafficEntry {
    TrafficEntry {
        timestamp: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
        path: path.to_string(),
        method: "GET".to_string(),
        remote_addr: ip.to_string(),
        referrer: referrer.map(str::to_string),
        user_agent: None,
    }
}

// ═══════════════════════════════════════════════════════════
// JSON files
// ═══════════════════════════════════════════════════════════

#[test]
fn json_save_then_load_returns_same_value() {
    let dir = scratch_dir();
    let path = dir.join("nested").join("services.json");
    let services = vec![service(1), service(2)];
    save_json_file(&path, &services).unwrap();
    let back: Vec<Service> = load_json_file(&path, Shape::Array).unwrap();
    assert_eq!(back, services);
    assert!(!dir.join("nested").join("services.json.tmp").exists());
}

#[test]
fn json_missing_file_is_created_with_default() {
    let dir = scratch_dir();
    let path = dir.join("messages.json");
    let loaded: Vec<ContactMessage> = load_json_file(&path, Shape::Array).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
}

#[test]
fn json_wrong_shape_is_reset_and_quarantined() {
    let dir = scratch_dir();
    let path = dir.join("gallery.json");
    std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();

    let loaded: Vec<crate::models::gallery::GalleryItem> = load_json_file(&path, Shape::Array).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");

    let backups: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with("gallery.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        r#"{"not": "a list"}"#
    );
}

#[test]
fn json_invalid_config_falls_back_to_defaults() {
    let dir = scratch_dir();
    let path = dir.join("config.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();
    let site: SiteConfig = load_json_file(&path, Shape::Object).unwrap();
    assert_eq!(site, SiteConfig::default());
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
}

#[test]
fn json_partial_config_keeps_missing_keys_at_default() {
    let dir = scratch_dir();
    let path = dir.join("config.json");
    std::fs::write(&path, r##"{"nom": "Jane Doe", "couleur": "#000000"}"##).unwrap();
    let site: SiteConfig = load_json_file(&path, Shape::Object).unwrap();
    assert_eq!(site.nom, "Jane Doe");
    assert_eq!(site.couleur, "#000000");
    assert_eq!(site.font, SiteConfig::default().font);
}

#[test]
fn legacy_message_field_projet_is_read() {
    let json = r#"[{"nom":"A","email":"a@b.c","projet":"Plans R+2","timestamp":"2024-05-01T10:00:00Z"}]"#;
    let msgs: Vec<ContactMessage> = serde_json::from_str(json).unwrap();
    assert_eq!(msgs[0].message, "Plans R+2");
    assert_eq!(msgs[0].status, MessageStatus::New);
    assert!(msgs[0].fichiers.is_empty());
}

// ═══════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════

#[test]
fn store_seeds_content_collections_once() {
    let dir = scratch_dir();
    let store = test_store(&dir);
    assert_eq!(store.service_list().len(), 5);
    assert_eq!(store.portfolio_list().len(), 1);
    assert_eq!(store.atout_list().len(), 6);
    assert!(store.message_list().is_empty());

    store.service_delete(0).unwrap();
    drop(store);
    let reopened = test_store(&dir);
    assert_eq!(reopened.service_list().len(), 4);
}

#[test]
fn store_delete_shifts_later_entries_down() {
    let dir = scratch_dir();
    let store = test_store(&dir);
    while !store.service_list().is_empty() {
        store.service_delete(0).unwrap();
    }
    for n in 0..3 {
        store.service_add(service(n)).unwrap();
    }
    let removed = store.service_delete(1).unwrap();
    assert_eq!(removed.titre.en, "Title 1");
    let titles: Vec<_> = store.service_list().into_iter().map(|s| s.titre.en).collect();
    assert_eq!(titles, vec!["Title 0", "Title 2"]);
}

#[test]
fn store_out_of_range_index_is_an_error() {
    let dir = scratch_dir();
    let store = test_store(&dir);
    let len = store.atout_list().len();
    assert!(store.atout_delete(len).is_err());
    assert!(store.atout_update(len + 3, Bilingual::new("a", "b")).is_err());
    assert!(store.message_set_status(0, MessageStatus::Read).is_err());
    assert!(store.gallery_delete(0).is_err());
    assert_eq!(store.atout_list().len(), len);
}

#[test]
fn store_persists_every_mutation() {
    let dir = scratch_dir();
    let store = test_store(&dir);
    store
        .message_add(ContactMessage::new("Awa", "awa@example.com", None, "Bonjour", Vec::new()))
        .unwrap();
    store.message_set_status(0, MessageStatus::Read).unwrap();
    drop(store);

    let reopened = test_store(&dir);
    let msgs = reopened.message_list();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].status, MessageStatus::Read);
    assert_eq!(reopened.message_count(Some(MessageStatus::New)), 0);
}

#[test]
fn carousel_rejects_seventh_item_without_change() {
    let dir = scratch_dir();
    let store = test_store(&dir);
    for n in 0..MAX_CAROUSEL_ITEMS {
        store
            .carousel_add(CarouselItem { filename: format!("s{}.jpg", n), kind: CarouselKind::Image })
            .unwrap();
    }
    let before = store.carousel_list();
    let result = store.carousel_add(CarouselItem { filename: "extra.pdf".into(), kind: CarouselKind::Pdf });
    assert!(result.is_err());
    assert_eq!(store.carousel_list(), before);
}

#[test]
fn carousel_move_swaps_neighbours() {
    let dir = scratch_dir();
    let store = test_store(&dir);
    for name in ["a.jpg", "b.jpg", "c.pdf"] {
        store
            .carousel_add(CarouselItem {
                filename: name.into(),
                kind: CarouselKind::from_filename(name).unwrap(),
            })
            .unwrap();
    }
    store.carousel_move(2, Direction::Up).unwrap();
    store.carousel_move(0, Direction::Up).unwrap();
    let names: Vec<_> = store.carousel_list().into_iter().map(|c| c.filename).collect();
    assert_eq!(names, vec!["a.jpg", "c.pdf", "b.jpg"]);
    assert!(store.carousel_move(9, Direction::Down).is_err());
}

#[test]
fn swap_at_edges_is_noop() {
    let mut v = vec![1, 2, 3];
    swap_with_neighbour(&mut v, 0, Direction::Up).unwrap();
    swap_with_neighbour(&mut v, 2, Direction::Down).unwrap();
    assert_eq!(v, vec![1, 2, 3]);
    swap_with_neighbour(&mut v, 0, Direction::Down).unwrap();
    assert_eq!(v, vec![2, 1, 3]);
}

#[test]
fn traffic_cap_drops_oldest_entries() {
    let dir = scratch_dir();
    let store = JsonStore::open(StorePaths::in_dir(&dir), 3).unwrap();
    for day in 1..=5 {
        store.traffic_record(entry(day, &format!("/p{}", day), "1.1.1.1", None)).unwrap();
    }
    let paths: Vec<_> = store.traffic_list().into_iter().map(|e| e.path).collect();
    assert_eq!(paths, vec!["/p3", "/p4", "/p5"]);
    store.traffic_clear().unwrap();
    assert_eq!(store.traffic_count(), 0);
}

// ═══════════════════════════════════════════════════════════
// Uploads
// ═══════════════════════════════════════════════════════════

#[test]
fn secure_filename_strips_paths_and_odd_characters() {
    assert_eq!(secure_filename("../../etc/passwd"), "passwd");
    assert_eq!(secure_filename("C:\\plans\\Plan RDC.DWG"), "plan-rdc.dwg");
    assert_eq!(secure_filename("Étude béton.pdf"), "etude-beton.pdf");
    assert_eq!(secure_filename(".bashrc"), "bashrc");
    assert_eq!(secure_filename("???.png"), "file.png");
    assert_eq!(secure_filename(""), "file");
}

#[test]
fn stored_name_is_timestamp_prefixed() {
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(stored_name("Maison.IFC", now), "20250102_030405_000_maison.ifc");
}

#[test]
fn extension_rules() {
    assert_eq!(extension_of("plan.DWG").as_deref(), Some("dwg"));
    assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
    assert_eq!(extension_of("README"), None);
    assert_eq!(extension_of(".env"), None);
    assert_eq!(extension_of("trailing."), None);
}

#[test]
fn upload_purposes_have_their_own_allow_lists() {
    assert!(UploadPurpose::Attachment.allows("rvt"));
    assert!(UploadPurpose::Attachment.allows("ZIP"));
    assert!(!UploadPurpose::Attachment.allows("exe"));
    assert!(UploadPurpose::Carousel.allows("pdf"));
    assert!(!UploadPurpose::Carousel.allows("mp4"));
    assert!(UploadPurpose::Gallery.allows("webm"));
    assert!(!UploadPurpose::Gallery.allows("pdf"));
    assert!(UploadPurpose::Photo.allows("jpeg"));
    assert!(!UploadPurpose::Photo.allows("svgz"));
    assert!(UploadPurpose::Photo.accept_attr().contains(".png"));
}

#[test]
fn resolve_refuses_traversal() {
    let dir = scratch_dir();
    std::fs::write(dir.join("ok.pdf"), b"x").unwrap();
    assert!(uploads::resolve(&dir, "ok.pdf").is_some());
    assert!(uploads::resolve(&dir, "../ok.pdf").is_none());
    assert!(uploads::resolve(&dir, ".hidden").is_none());
    assert!(uploads::resolve(&dir, "missing.pdf").is_none());
}

#[test]
fn zip_bundle_contains_text_and_files() {
    let dir = scratch_dir();
    std::fs::write(dir.join("plan.pdf"), b"%PDF-1.4").unwrap();
    let bytes = uploads::zip_bundle(
        &dir,
        &["plan.pdf".to_string(), "gone.dwg".to_string()],
        &[("message.txt", &b"hello"[..])],
    )
    .unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["message.txt", "plan.pdf"]);
}

// ═══════════════════════════════════════════════════════════
// Gallery classification
// ═══════════════════════════════════════════════════════════

#[test]
fn two_image_urls_make_a_rotation_in_order() {
    let c = classify(&[], "https://x.test/a.jpg, https://x.test/b.png").unwrap();
    assert_eq!(
        c.media,
        GalleryMedia::Rotation {
            frames: vec!["https://x.test/a.jpg".into(), "https://x.test/b.png".into()]
        }
    );
    assert!(c.dropped.is_empty());
}

#[test]
fn one_image_url_makes_an_image() {
    let c = classify(&[], "  https://x.test/photo.webp?w=600 ").unwrap();
    assert_eq!(c.media, GalleryMedia::Image { source: "https://x.test/photo.webp?w=600".into() });
}

#[test]
fn one_video_makes_a_video() {
    let c = classify(&["/uploads/20250101_000000_000_tour.mp4".to_string()], "").unwrap();
    assert_eq!(c.media.kind(), "video");
}

#[test]
fn uploads_come_before_urls_in_rotation() {
    let uploads = vec!["/uploads/f1.jpg".to_string()];
    let c = classify(&uploads, "https://x.test/f2.jpg,https://x.test/clip.mp4").unwrap();
    assert_eq!(c.media.sources(), vec!["/uploads/f1.jpg", "https://x.test/f2.jpg"]);
    assert_eq!(c.dropped, vec!["https://x.test/clip.mp4".to_string()]);
}

#[test]
fn unknown_or_empty_submission_is_rejected() {
    assert_eq!(
        classify(&[], "https://x.test/page.html"),
        Err(ClassifyError::NoSource { dropped: vec!["https://x.test/page.html".into()] })
    );
    assert_eq!(classify(&[], " , "), Err(ClassifyError::NoSource { dropped: vec![] }));
}

#[test]
fn image_plus_video_or_two_videos_are_rejected() {
    assert_eq!(
        classify(&[], "https://x.test/a.jpg,https://x.test/b.mp4"),
        Err(ClassifyError::Mixed { images: 1, videos: 1 })
    );
    assert_eq!(
        classify(&[], "https://x.test/a.mov,https://x.test/b.mp4"),
        Err(ClassifyError::Mixed { images: 0, videos: 2 })
    );
}

#[test]
fn media_kind_ignores_query_and_fragment() {
    assert_eq!(media_kind("/uploads/a.JPG#x"), MediaKind::Image);
    assert_eq!(media_kind("https://cdn.test/v.mp4?token=a.jpg"), MediaKind::Video);
    assert_eq!(media_kind("https://cdn.test/watch?v=abc"), MediaKind::Unknown);
}

// ═══════════════════════════════════════════════════════════
// Models & helpers
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_form_keeps_blank_fields() {
    let mut site = SiteConfig::default();
    let mut form = HashMap::new();
    form.insert("nom".to_string(), "  Jane Doe ".to_string());
    form.insert("email".to_string(), "   ".to_string());
    form.insert("titre_fr".to_string(), "Ingénieure".to_string());
    form.insert("slogan_fr".to_string(), "Nouveau".to_string());
    form.insert("slogan_en".to_string(), "New".to_string());

    let changed = site.apply_form(&form);
    assert_eq!(changed, 2);
    assert_eq!(site.nom, "Jane Doe");
    assert_eq!(site.email, SiteConfig::default().email);
    assert_eq!(site.titre, SiteConfig::default().titre);
    assert_eq!(site.slogan, Bilingual::new("Nouveau", "New"));
}

#[test]
fn site_helpers() {
    let mut site = SiteConfig::default();
    site.whatsapp = "+227 90-12 34 56".into();
    site.font = "Open Sans".into();
    assert_eq!(site.whatsapp_digits(), "22790123456");
    assert_eq!(site.font_query(), "Open+Sans");
}

#[test]
fn portfolio_owns_only_images_it_uploaded() {
    let mut item = portfolio_item("p", vec!["doc.pdf".into()]);
    item.imgs = parse_image_urls("https://x.test/a.jpg, /uploads/b.png, /uploads/other.png,,");
    item.img_uploads = vec!["b.png".into()];
    assert_eq!(item.imgs.len(), 3);
    assert_eq!(item.owned_uploads(), vec!["doc.pdf".to_string(), "b.png".to_string()]);

    item.imgs.retain(|img| img != "/uploads/b.png");
    assert_eq!(item.release_unlisted_images(), vec!["b.png".to_string()]);
    assert!(item.img_uploads.is_empty());
    assert_eq!(item.owned_uploads(), vec!["doc.pdf".to_string()]);
}

#[test]
fn gallery_item_owns_only_saved_sources() {
    let media = GalleryMedia::Rotation {
        frames: vec!["/uploads/a.jpg".into(), "/uploads/typed.jpg".into(), "https://x.test/c.jpg".into()],
    };
    let item = crate::models::gallery::GalleryItem::new(media, None, None)
        .with_uploads(&["a.jpg".to_string(), "clip.mp4".to_string()]);
    assert_eq!(item.owned_uploads(), vec!["a.jpg".to_string()]);
}

#[test]
fn service_form_requires_both_languages() {
    assert!(Service::from_form(Some("A"), Some(" "), Some("d"), Some("d"), None).is_none());
    let s = Service::from_form(Some("A"), Some("B"), Some("d"), Some("e"), Some("  ")).unwrap();
    assert_eq!(s.icon, "bi-star");
}

#[test]
fn overview_counts_days_pages_and_referrers() {
    let entries = vec![
        entry(1, "/", "1.1.1.1", Some("google.com")),
        entry(3, "/", "2.2.2.2", None),
        entry(3, "/contact", "1.1.1.1", Some("google.com")),
        entry(3, "/services", "3.3.3.3", Some("bing.com")),
    ];
    let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let stats = overview(&entries, today, 3, 2);
    assert_eq!(stats.total_views, 4);
    assert_eq!(stats.unique_visitors, 3);
    assert_eq!(stats.views_today, 3);
    let daily: Vec<_> = stats.daily.iter().map(|d| (d.date.as_str(), d.count)).collect();
    assert_eq!(daily, vec![("2025-03-01", 1), ("2025-03-02", 0), ("2025-03-03", 3)]);
    assert_eq!(stats.top_pages[0].label, "/");
    assert_eq!(stats.top_pages.len(), 2);
    assert_eq!(stats.top_referrers[0].label, "google.com");
    assert_eq!(stats.top_referrers[0].count, 2);
}

#[test]
fn rate_limiter_blocks_after_max_attempts() {
    let limiter = RateLimiter::new();
    let window = Duration::from_secs(60);
    for _ in 0..3 {
        assert!(limiter.check_and_record("login:9.9.9.9", 3, window));
    }
    assert!(!limiter.check_and_record("login:9.9.9.9", 3, window));
    assert!(limiter.check_and_record("login:8.8.8.8", 3, window));
    limiter.reset("login:9.9.9.9");
    assert!(limiter.check_and_record("login:9.9.9.9", 3, window));
}

#[test]
fn credentials_plain_and_bcrypt() {
    let plain = AdminCredentials { user: "admin".into(), pass: "s3cret".into(), pass_hash: None };
    assert!(plain.verify(" admin ", "s3cret"));
    assert!(!plain.verify("admin", "S3cret"));
    assert!(!plain.verify("root", "s3cret"));

    let hashed = AdminCredentials {
        user: "admin".into(),
        pass: "ignored".into(),
        pass_hash: Some(bcrypt::hash("hunter2", 4).unwrap()),
    };
    assert!(hashed.verify("admin", "hunter2"));
    assert!(!hashed.verify("admin", "ignored"));
}

#[test]
fn pagination_clamps_pages() {
    let p = paginate(45, Some(3), 20);
    assert_eq!((p.current, p.total_pages, p.start, p.end), (3, 3, 40, 45));
    let p = paginate(45, Some(99), 20);
    assert_eq!(p.current, 3);
    let p = paginate(0, Some(0), 20);
    assert_eq!((p.current, p.total_pages, p.start, p.end), (1, 1, 0, 0));
}

#[test]
fn traffic_filter_skips_admin_and_assets() {
    assert!(should_log("/", "/bureau"));
    assert!(should_log("/bureau-public", "/bureau"));
    assert!(!should_log("/bureau", "/bureau"));
    assert!(!should_log("/bureau/messages", "/bureau"));
    assert!(!should_log("/static/css/site.css", "/bureau"));
    assert!(!should_log("/uploads/a.jpg", "/bureau"));
    assert!(!should_log("/favicon.ico", "/bureau"));
}

#[test]
fn back_path_stays_on_site() {
    assert_eq!(back_path(Some("https://example.com/services?x=1")), "/services?x=1");
    assert_eq!(back_path(Some("not a url")), "/");
    assert_eq!(back_path(None), "/");
}

#[test]
fn slug_normalisation() {
    assert_eq!(normalize_slug("/secret-office/"), "secret-office");
    assert_eq!(normalize_slug("  "), "admin");
}

#[test]
fn sitemap_lists_public_pages_only() {
    let xml = seo::generate_sitemap("https://bim.example/");
    assert!(xml.contains("<loc>https://bim.example</loc>"));
    assert!(xml.contains("<loc>https://bim.example/galerie</loc>"));
    assert!(!xml.contains("admin"));
    let robots = seo::generate_robots("https://bim.example");
    assert!(robots.contains("Disallow: /uploads/"));
    assert!(robots.contains("Sitemap: https://bim.example/sitemap.xml"));
}

// ═══════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════

const SLUG: &str = "bureau-7f3a";
const BOUNDARY: &str = "X-BIMFOLIO-BOUNDARY";

fn test_env(dir: &Path) -> SiteEnv {
    SiteEnv {
        upload_dir: dir.join("uploads"),
        store_paths: StorePaths::in_dir(&dir.join("data")),
        admin_user: "admin".into(),
        admin_pass: "correct horse".into(),
        admin_pass_hash: None,
        admin_slug: SLUG.into(),
        secret_key: "test secret key material".into(),
        log_file: None,
        port: 5000,
        debug: false,
        site_url: "https://bim.example".into(),
        traffic_max_entries: 0,
        mail: None,
    }
}

fn client(dir: &Path) -> Client {
    std::fs::create_dir_all(dir.join("uploads")).unwrap();
    let rocket = crate::build_rocket(test_env(dir)).unwrap();
    Client::tracked(rocket).unwrap()
}

fn store_of(client: &Client) -> &Arc<dyn Store> {
    client.rocket().state::<Arc<dyn Store>>().unwrap()
}

fn login(client: &Client) {
    let resp = client
        .post(format!("/{}/login", SLUG))
        .header(ContentType::Form)
        .body("username=admin&password=correct%20horse")
        .dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(resp.headers().get_one("Location"), Some(format!("/{}", SLUG).as_str()));
}

/// Hand-built multipart body: text fields, then `(field, filename, bytes)` files.
fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (ContentType, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    let ct = ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
    (ct, body)
}

fn upload_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.join("uploads"))
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn admin_routes_redirect_to_login_without_session() {
    let dir = scratch_dir();
    let client = client(&dir);
    let login_url = format!("/{}/login", SLUG);

    for path in ["", "/messages", "/settings", "/messages/download/0", "/anything/else"] {
        let resp = client.get(format!("/{}{}", SLUG, path)).dispatch();
        assert_eq!(resp.status(), Status::SeeOther, "GET {}", path);
        assert_eq!(resp.headers().get_one("Location"), Some(login_url.as_str()));
    }

    let before = store_of(&client).service_list().len();
    let resp = client.post(format!("/{}/services/0/delete", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(resp.headers().get_one("Location"), Some(login_url.as_str()));
    assert_eq!(store_of(&client).service_list().len(), before);
}

#[test]
fn login_rejects_bad_password_and_accepts_good_one() {
    let dir = scratch_dir();
    let client = client(&dir);

    let resp = client
        .post(format!("/{}/login", SLUG))
        .header(ContentType::Form)
        .body("username=admin&password=nope")
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp.into_string().unwrap().contains("Invalid credentials"));

    login(&client);
    let resp = client.get(format!("/{}", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp.headers().get_one("Cache-Control").unwrap().contains("no-store"));

    client.get(format!("/{}/logout", SLUG)).dispatch();
    let resp = client.get(format!("/{}", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
}

#[test]
fn every_admin_page_renders_when_logged_in() {
    let dir = scratch_dir();
    let client = client(&dir);
    store_of(&client)
        .message_add(ContactMessage::new("Awa", "awa@example.com", Some("Devis"), "Bonjour", Vec::new()))
        .unwrap();
    store_of(&client)
        .gallery_add(crate::models::gallery::GalleryItem::new(
            GalleryMedia::Rotation { frames: vec!["https://x.test/a.jpg".into(), "https://x.test/b.jpg".into()] },
            Some("Tour"),
            None,
        ))
        .unwrap();
    login(&client);

    for path in [
        "", "/services", "/portfolio", "/atouts", "/messages", "/messages?page=4",
        "/carousel", "/gallery", "/analytics", "/traffic", "/settings",
    ] {
        let resp = client.get(format!("/{}{}", SLUG, path)).dispatch();
        assert_eq!(resp.status(), Status::Ok, "GET {}", path);
    }
}

#[test]
fn public_pages_render_and_are_logged() {
    let dir = scratch_dir();
    let client = client(&dir);

    for path in ["/", "/services", "/portfolio", "/galerie", "/pourquoi", "/contact"] {
        let resp = client.get(path).dispatch();
        assert_eq!(resp.status(), Status::Ok, "GET {}", path);
    }
    client.get(format!("/{}/login", SLUG)).dispatch();
    client.get("/uploads/nothing.jpg").dispatch();

    let logged: Vec<_> = store_of(&client).traffic_list().into_iter().map(|e| e.path).collect();
    assert_eq!(logged, vec!["/", "/services", "/portfolio", "/galerie", "/pourquoi", "/contact"]);
}

#[test]
fn language_and_dark_mode_cookies() {
    let dir = scratch_dir();
    let client = client(&dir);

    let resp = client.get("/services").dispatch();
    assert!(resp.into_string().unwrap().contains("Mes services"));

    let resp = client
        .post("/set_lang")
        .header(ContentType::Form)
        .header(rocket::http::Header::new("Referer", "https://bim.example/services"))
        .body("lang=en")
        .dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(resp.headers().get_one("Location"), Some("/services"));

    let html = client.get("/services").dispatch().into_string().unwrap();
    assert!(html.contains("My services"));
    assert!(html.contains("lang=\"en\""));

    client.get("/toggle_dark").dispatch();
    let html = client.get("/").dispatch().into_string().unwrap();
    assert!(html.contains("data-bs-theme=\"dark\""));
}

#[test]
fn contact_form_stores_message_and_filters_attachments() {
    let dir = scratch_dir();
    let client = client(&dir);

    let (ct, body) = multipart(
        &[("nom", "Moussa"), ("email", "moussa@example.com"), ("sujet", "Villa R+1"), ("message", "Plans de ferraillage")],
        &[("fichier", "Plan RDC.dwg", b"AC1027"), ("fichier", "setup.exe", b"MZ")],
    );
    let resp = client.post("/contact").header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);

    let msgs = store_of(&client).message_list();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].status, MessageStatus::New);
    assert_eq!(msgs[0].sujet.as_deref(), Some("Villa R+1"));
    assert_eq!(msgs[0].fichiers.len(), 1);
    assert!(msgs[0].fichiers[0].ends_with("_plan-rdc.dwg"));
    assert_eq!(upload_names(&dir), msgs[0].fichiers);
}

#[test]
fn contact_honeypot_discards_silently() {
    let dir = scratch_dir();
    let client = client(&dir);

    let (ct, body) = multipart(
        &[("nom", "Bot"), ("email", "bot@spam.test"), ("message", "cheap pills"), ("website", "http://spam.test")],
        &[("fichier", "payload.pdf", b"%PDF")],
    );
    let resp = client.post("/contact").header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert!(store_of(&client).message_list().is_empty());
    assert!(upload_names(&dir).is_empty());
}

#[test]
fn contact_requires_name_email_and_message() {
    let dir = scratch_dir();
    let client = client(&dir);
    let (ct, body) = multipart(&[("nom", "A"), ("email", "not-an-email"), ("message", "x")], &[]);
    let resp = client.post("/contact").header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert!(store_of(&client).message_list().is_empty());
}

#[test]
fn portfolio_delete_removes_item_and_its_files() {
    let dir = scratch_dir();
    let client = client(&dir);
    let store = store_of(&client);
    while !store.portfolio_list().is_empty() {
        store.portfolio_delete(0).unwrap();
    }
    std::fs::write(dir.join("uploads").join("a.pdf"), b"a").unwrap();
    std::fs::write(dir.join("uploads").join("b.pdf"), b"b").unwrap();
    store.portfolio_add(portfolio_item("first", vec!["a.pdf".into()])).unwrap();
    store.portfolio_add(portfolio_item("second", vec!["b.pdf".into()])).unwrap();

    login(&client);
    let resp = client.post(format!("/{}/portfolio/0/delete", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);

    let items = store.portfolio_list();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].titre.fr, "second");
    assert_eq!(upload_names(&dir), vec!["b.pdf".to_string()]);

    // Position 1 no longer exists: flash, not a crash.
    let resp = client.post(format!("/{}/portfolio/1/delete", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(store.portfolio_list().len(), 1);
}

#[test]
fn gallery_submission_with_two_urls_creates_rotation() {
    let dir = scratch_dir();
    let client = client(&dir);
    login(&client);

    let (ct, body) = multipart(
        &[("title", "Villa 360"), ("urls", "https://x.test/1.jpg, https://x.test/2.jpg")],
        &[],
    );
    let resp = client.post(format!("/{}/gallery", SLUG)).header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);

    let items = store_of(&client).gallery_list();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].media,
        GalleryMedia::Rotation { frames: vec!["https://x.test/1.jpg".into(), "https://x.test/2.jpg".into()] }
    );
    assert_eq!(items[0].title.as_deref(), Some("Villa 360"));
}

#[test]
fn gallery_rejected_submission_keeps_no_files() {
    let dir = scratch_dir();
    let client = client(&dir);
    login(&client);

    let (ct, body) = multipart(
        &[("urls", "https://x.test/clip.mp4")],
        &[("files", "photo.jpg", b"\xFF\xD8\xFF")],
    );
    client.post(format!("/{}/gallery", SLUG)).header(ct).body(body).dispatch();
    assert!(store_of(&client).gallery_list().is_empty());
    assert!(upload_names(&dir).is_empty());
}

#[test]
fn gallery_never_deletes_uploads_it_did_not_save() {
    let dir = scratch_dir();
    let client = client(&dir);
    login(&client);

    let (ct, body) = multipart(&[], &[("files", "clip.mp4", b"....")]);
    client.post(format!("/{}/gallery", SLUG)).header(ct).body(body).dispatch();
    let items = store_of(&client).gallery_list();
    assert_eq!(items.len(), 1);
    let clip = upload_names(&dir);
    assert_eq!(clip.len(), 1);
    assert_eq!(items[0].media, GalleryMedia::Video { source: format!("/uploads/{}", clip[0]) });

    // A typed URL to that file is set aside next to a rotation, but stays on disk.
    let urls = format!("https://x.test/1.jpg, https://x.test/2.jpg, /uploads/{}", clip[0]);
    let (ct, body) = multipart(&[("urls", urls.as_str())], &[]);
    client.post(format!("/{}/gallery", SLUG)).header(ct).body(body).dispatch();
    assert_eq!(store_of(&client).gallery_list().len(), 2);
    assert_eq!(upload_names(&dir), clip);

    // A single video item that merely links the file does not own it either.
    let (ct, body) = multipart(&[("urls", format!("/uploads/{}", clip[0]).as_str())], &[]);
    client.post(format!("/{}/gallery", SLUG)).header(ct).body(body).dispatch();
    assert_eq!(store_of(&client).gallery_list().len(), 3);
    client.post(format!("/{}/gallery/2/delete", SLUG)).dispatch();
    client.post(format!("/{}/gallery/1/delete", SLUG)).dispatch();
    assert_eq!(store_of(&client).gallery_list().len(), 1);
    assert_eq!(upload_names(&dir), clip);

    // Deleting the item that uploaded it removes the file.
    let resp = client.post(format!("/{}/gallery/0/delete", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert!(store_of(&client).gallery_list().is_empty());
    assert!(upload_names(&dir).is_empty());
}

#[test]
fn gallery_delete_removes_uploaded_rotation_frames() {
    let dir = scratch_dir();
    let client = client(&dir);
    login(&client);

    let (ct, body) = multipart(
        &[("urls", "https://x.test/3.jpg")],
        &[("files", "face-1.jpg", b"\xFF\xD8\xFF"), ("files", "face-2.jpg", b"\xFF\xD8\xFF")],
    );
    client.post(format!("/{}/gallery", SLUG)).header(ct).body(body).dispatch();
    let items = store_of(&client).gallery_list();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].media.sources().len(), 3);
    assert_eq!(upload_names(&dir).len(), 2);

    client.post(format!("/{}/gallery/0/delete", SLUG)).dispatch();
    assert!(store_of(&client).gallery_list().is_empty());
    assert!(upload_names(&dir).is_empty());
}

#[test]
fn portfolio_delete_keeps_images_owned_by_another_project() {
    let dir = scratch_dir();
    let client = client(&dir);
    let store = store_of(&client);
    while !store.portfolio_list().is_empty() {
        store.portfolio_delete(0).unwrap();
    }
    std::fs::write(dir.join("uploads").join("shared.jpg"), b"img").unwrap();
    let mut owner = portfolio_item("owner", Vec::new());
    owner.imgs = vec!["/uploads/shared.jpg".into()];
    owner.img_uploads = vec!["shared.jpg".into()];
    let mut borrower = portfolio_item("borrower", Vec::new());
    borrower.imgs = vec!["/uploads/shared.jpg".into()];
    store.portfolio_add(owner).unwrap();
    store.portfolio_add(borrower).unwrap();

    login(&client);
    client.post(format!("/{}/portfolio/1/delete", SLUG)).dispatch();
    assert_eq!(store.portfolio_list().len(), 1);
    assert_eq!(upload_names(&dir), vec!["shared.jpg".to_string()]);

    client.post(format!("/{}/portfolio/0/delete", SLUG)).dispatch();
    assert!(store.portfolio_list().is_empty());
    assert!(upload_names(&dir).is_empty());
}

#[test]
fn portfolio_update_removes_images_dropped_from_the_list() {
    let dir = scratch_dir();
    let client = client(&dir);
    let store = store_of(&client);
    while !store.portfolio_list().is_empty() {
        store.portfolio_delete(0).unwrap();
    }
    login(&client);

    let (ct, body) = multipart(
        &[("titre_fr", "Pont"), ("titre_en", "Bridge"), ("desc_fr", "d"), ("desc_en", "d"), ("imgs", "https://x.test/a.jpg")],
        &[("img_files", "coupe.png", b"\x89PNG")],
    );
    client.post(format!("/{}/portfolio", SLUG)).header(ct).body(body).dispatch();
    let items = store.portfolio_list();
    assert_eq!(items.len(), 1);
    let uploaded = upload_names(&dir);
    assert_eq!(uploaded.len(), 1);
    assert_eq!(items[0].img_uploads, uploaded);
    assert_eq!(items[0].imgs.len(), 2);

    let (ct, body) = multipart(&[("imgs", "https://x.test/a.jpg")], &[]);
    let resp = client.post(format!("/{}/portfolio/0/edit", SLUG)).header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    let items = store.portfolio_list();
    assert_eq!(items[0].imgs, vec!["https://x.test/a.jpg".to_string()]);
    assert_eq!(items[0].titre.en, "Bridge");
    assert!(items[0].img_uploads.is_empty());
    assert!(upload_names(&dir).is_empty());
}

#[test]
fn portfolio_update_failure_removes_new_uploads() {
    let dir = scratch_dir();
    let client = client(&dir);
    assert_eq!(store_of(&client).portfolio_list().len(), 1);
    login(&client);

    // A directory in place of the collection file makes the write fail.
    let file = dir.join("data").join("portfolio.json");
    std::fs::remove_file(&file).unwrap();
    std::fs::create_dir_all(file.join("blocker")).unwrap();

    let (ct, body) = multipart(&[], &[("img_files", "vue.png", b"\x89PNG"), ("fichiers", "note.pdf", b"%PDF")]);
    let resp = client.post(format!("/{}/portfolio/0/edit", SLUG)).header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert!(upload_names(&dir).is_empty());
    assert!(store_of(&client).portfolio_list()[0].fichiers.is_empty());
}

#[test]
fn carousel_upload_refuses_disallowed_type() {
    let dir = scratch_dir();
    let client = client(&dir);
    login(&client);

    let (ct, body) = multipart(&[], &[("file", "clip.mp4", b"....")]);
    client.post(format!("/{}/carousel", SLUG)).header(ct).body(body).dispatch();
    assert!(store_of(&client).carousel_list().is_empty());
    assert!(upload_names(&dir).is_empty());

    let (ct, body) = multipart(&[], &[("file", "Affiche.PDF", b"%PDF-1.4")]);
    client.post(format!("/{}/carousel", SLUG)).header(ct).body(body).dispatch();
    let slides = store_of(&client).carousel_list();
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].kind, CarouselKind::Pdf);
}

#[test]
fn message_view_marks_read_and_download_is_zip() {
    let dir = scratch_dir();
    let client = client(&dir);
    std::fs::write(dir.join("uploads").join("plan.pdf"), b"%PDF").unwrap();
    store_of(&client)
        .message_add(ContactMessage::new("Awa", "awa@example.com", None, "Bonjour", vec!["plan.pdf".into()]))
        .unwrap();
    login(&client);

    let resp = client.get(format!("/{}/messages/view/0", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(store_of(&client).message_list()[0].status, MessageStatus::Read);

    let resp = client.get(format!("/{}/messages/download/0", SLUG)).dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.content_type(), Some(ContentType::ZIP));
    assert!(resp
        .headers()
        .get_one("Content-Disposition")
        .unwrap()
        .starts_with("attachment;"));
    let bytes = resp.into_bytes().unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let resp = client.get(format!("/{}/messages/export", SLUG)).dispatch();
    let exported: Vec<ContactMessage> = serde_json::from_slice(&resp.into_bytes().unwrap()).unwrap();
    assert_eq!(exported.len(), 1);
}

#[test]
fn settings_form_updates_site() {
    let dir = scratch_dir();
    let client = client(&dir);
    login(&client);

    let (ct, body) = multipart(
        &[("fields[nom]", "Jane Doe"), ("fields[slogan_fr]", "Bâtir juste"), ("fields[slogan_en]", "Build right"), ("fields[email]", "")],
        &[],
    );
    let resp = client.post(format!("/{}/settings", SLUG)).header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::SeeOther);

    let site = store_of(&client).site_get();
    assert_eq!(site.nom, "Jane Doe");
    assert_eq!(site.slogan, Bilingual::new("Bâtir juste", "Build right"));
    assert_eq!(site.email, SiteConfig::default().email);
}

#[test]
fn sitemap_and_robots_routes() {
    let dir = scratch_dir();
    let client = client(&dir);
    let xml = client.get("/sitemap.xml").dispatch().into_string().unwrap();
    assert!(xml.contains("https://bim.example/services"));
    assert!(!xml.contains(SLUG));
    let robots = client.get("/robots.txt").dispatch().into_string().unwrap();
    assert!(robots.contains("Disallow: /uploads/"));
}

#[test]
fn uploaded_files_are_served_by_name() {
    let dir = scratch_dir();
    let client = client(&dir);
    std::fs::write(dir.join("uploads").join("note.txt"), b"hello").unwrap();
    let resp = client.get("/uploads/note.txt").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.into_string().unwrap(), "hello");
    assert_eq!(client.get("/uploads/missing.txt").dispatch().status(), Status::NotFound);
}

#[test]
fn notification_message_builds_from_contact() {
    let msg = ContactMessage::new("Awa", "awa@example.com", Some("Devis"), "Bonjour", vec!["plan.pdf".into()]);
    let text = msg.to_text();
    assert!(text.contains("Subject: Devis"));
    assert!(text.contains("  - plan.pdf"));
    assert!(crate::email::build_message("site@example.com", "owner@example.com", "Devis", &text).is_ok());
    assert!(crate::email::build_message("not an address", "owner@example.com", "Devis", &text).is_err());
}

#[test]
fn boot_check_creates_directories() {
    let dir = scratch_dir();
    let env = test_env(&dir);
    let report = crate::boot::check(&env);
    assert_eq!(report.errors, 0);
    assert!(env.upload_dir.is_dir());
    assert!(dir.join("data").is_dir());
    assert!(!dir.join("uploads").join(".write_test").exists());
}
