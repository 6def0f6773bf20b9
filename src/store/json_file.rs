use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Expected top-level JSON shape of a store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    pub fn empty(self) -> Value {
        match self {
            Shape::Object => Value::Object(Default::default()),
            Shape::Array => Value::Array(Vec::new()),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

/// Load a store file. A missing, unreadable, unparsable or wrong-shaped file is
/// replaced on disk by the empty default (`{}` / `[]`) and the default is
/// returned. Whatever bytes were there are kept next to it as
/// `<name>.corrupt-<timestamp>` first.
pub fn load_json_file<T: DeserializeOwned>(path: &Path, shape: Shape) -> Result<T, String> {
    let problem = match fs::read(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => Some(format!("unreadable ({})", e)),
        Ok(bytes) => {
            let problem = match serde_json::from_slice::<Value>(&bytes) {
                Err(e) => format!("invalid JSON ({})", e),
                Ok(v) if !shape.matches(&v) => format!("expected a JSON {:?}", shape),
                Ok(v) => match serde_json::from_value::<T>(v) {
                    Ok(data) => return Ok(data),
                    Err(e) => format!("unexpected content ({})", e),
                },
            };
            quarantine(path, &bytes);
            Some(problem)
        }
    };

    match problem {
        Some(why) => warn!("{}: {}; resetting to empty default", path.display(), why),
        None => info!("{} not found; creating it", path.display()),
    }

    let default = shape.empty();
    if let Err(e) = save_json_file(path, &default) {
        warn!("Could not write default to {}: {}", path.display(), e);
    }
    serde_json::from_value(default).map_err(|e| format!("{}: {}", path.display(), e))
}

fn quarantine(path: &Path, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    let backup = sibling(path, &format!("corrupt-{}", Utc::now().format("%Y%m%d%H%M%S")));
    match fs::write(&backup, bytes) {
        Ok(_) => warn!("Previous content kept in {}", backup.display()),
        Err(e) => warn!("Could not back up {}: {}", path.display(), e),
    }
}

/// `<dir>/<file>.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "store.json".to_string());
    path.with_file_name(format!("{}.{}", name, suffix))
}

/// Write pretty-printed JSON, creating parent directories. The data goes to a
/// temporary sibling first and is renamed over the target, so readers never
/// see a half-written file.
pub fn save_json_file<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {}", parent.display(), e))?;
    }
    let json = serde_json::to_vec_pretty(data).map_err(|e| e.to_string())?;
    let tmp = sibling(path, "tmp");
    fs::write(&tmp, json).map_err(|e| format!("{}: {}", tmp.display(), e))?;
    fs::rename(&tmp, path).map_err(|e| format!("{}: {}", path.display(), e))
}
