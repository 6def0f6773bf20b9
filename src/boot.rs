use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use crate::config::SiteEnv;

pub const TEMPLATE_DIR: &str = "website/templates";
pub const STATIC_DIR: &str = "website/static";

/// Critical template files: the site cannot render without these
const CRITICAL_TEMPLATES: &[&str] = &[
    "public/base.html.tera",
    "public/index.html.tera",
    "public/contact.html.tera",
    "admin/base.html.tera",
    "admin/login.html.tera",
    "admin/dashboard.html.tera",
];

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, warns about missing files, and
/// aborts if critical dependencies are absent.
pub fn run(env: &SiteEnv) {
    info!("bimfolio boot check starting...");

    let report = check(env);

    if report.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        process::exit(1);
    }

    if report.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            report.warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    pub warnings: u32,
    pub errors: u32,
}

/// The checks behind [`run`], without exiting the process.
pub fn check(env: &SiteEnv) -> BootReport {
    let mut report = BootReport::default();

    // ── 1. Directories ─────────────────────────────────
    let mut dirs: Vec<PathBuf> = vec![env.upload_dir.clone()];
    for file in env.store_paths.all() {
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !dirs.iter().any(|d| d == parent) {
                dirs.push(parent.to_path_buf());
            }
        }
    }
    for dir in &dirs {
        if !dir.exists() {
            match fs::create_dir_all(dir) {
                Ok(_) => info!("  Created directory: {}", dir.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir.display(), e);
                    report.errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        let path = Path::new(TEMPLATE_DIR).join(file);
        if !path.exists() {
            error!("  MISSING critical template: {}", path.display());
            report.errors += 1;
        }
    }

    // ── 3. Static assets ───────────────────────────────
    if !Path::new(STATIC_DIR).join("css/site.css").exists() {
        warn!("  Missing static asset: {}/css/site.css (pages will use CDN styles only)", STATIC_DIR);
        report.warnings += 1;
    }

    // ── 4. Data and upload directories writable ────────
    for dir in &dirs {
        if !dir.exists() {
            continue;
        }
        let test_file = dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Directory {} not writable: {}", dir.display(), e);
                report.errors += 1;
            }
        }
    }

    report
}
