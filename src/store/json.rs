use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::json_file::{load_json_file, save_json_file, Shape};
use super::Store;
use crate::models::analytics::TrafficEntry;
use crate::models::carousel::{swap_with_neighbour, CarouselItem, Direction, MAX_CAROUSEL_ITEMS};
use crate::models::gallery::GalleryItem;
use crate::models::message::{ContactMessage, MessageStatus};
use crate::models::portfolio::{default_portfolio, PortfolioItem};
use crate::models::service::{default_services, Service};
use crate::models::settings::SiteConfig;
use crate::models::{default_atouts, Atout};

/// Location of every store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub messages: PathBuf,
    pub traffic: PathBuf,
    pub rotator: PathBuf,
    pub config: PathBuf,
    pub gallery: PathBuf,
    pub services: PathBuf,
    pub portfolio: PathBuf,
    pub atouts: PathBuf,
}

impl StorePaths {
    /// Default file names inside one data directory.
    pub fn in_dir(dir: &Path) -> Self {
        StorePaths {
            messages: dir.join("messages.json"),
            traffic: dir.join("traffic.json"),
            rotator: dir.join("rotator.json"),
            config: dir.join("config.json"),
            gallery: dir.join("gallery.json"),
            services: dir.join("services.json"),
            portfolio: dir.join("portfolio.json"),
            atouts: dir.join("atouts.json"),
        }
    }

    pub fn all(&self) -> [&Path; 8] {
        [
            &self.messages,
            &self.traffic,
            &self.rotator,
            &self.config,
            &self.gallery,
            &self.services,
            &self.portfolio,
            &self.atouts,
        ]
    }
}

/// One JSON file per collection, held in memory and rewritten whole on every
/// change. Each collection has its own lock; the file is written while the
/// lock is held so two writers never interleave.
pub struct JsonStore {
    paths: StorePaths,
    traffic_cap: usize,
    site: Mutex<SiteConfig>,
    services: Mutex<Vec<Service>>,
    portfolio: Mutex<Vec<PortfolioItem>>,
    atouts: Mutex<Vec<Atout>>,
    messages: Mutex<Vec<ContactMessage>>,
    carousel: Mutex<Vec<CarouselItem>>,
    gallery: Mutex<Vec<GalleryItem>>,
    traffic: Mutex<Vec<TrafficEntry>>,
}

impl JsonStore {
    /// Load every collection. Content collections that have never been saved
    /// are seeded with the built-in entries. `traffic_cap` of 0 keeps the whole log.
    pub fn open(paths: StorePaths, traffic_cap: usize) -> Result<Self, String> {
        let site: SiteConfig = load_json_file(&paths.config, Shape::Object)?;
        let store = JsonStore {
            site: Mutex::new(site),
            services: Mutex::new(load_or_seed(&paths.services, default_services)?),
            portfolio: Mutex::new(load_or_seed(&paths.portfolio, default_portfolio)?),
            atouts: Mutex::new(load_or_seed(&paths.atouts, default_atouts)?),
            messages: Mutex::new(load_json_file(&paths.messages, Shape::Array)?),
            carousel: Mutex::new(load_json_file(&paths.rotator, Shape::Array)?),
            gallery: Mutex::new(load_json_file(&paths.gallery, Shape::Array)?),
            traffic: Mutex::new(load_json_file(&paths.traffic, Shape::Array)?),
            traffic_cap,
            paths,
        };
        info!(
            "Store loaded: {} services, {} portfolio items, {} messages, {} traffic entries",
            lock(&store.services).len(),
            lock(&store.portfolio).len(),
            lock(&store.messages).len(),
            lock(&store.traffic).len()
        );
        Ok(store)
    }
}

fn load_or_seed<T>(path: &Path, seed: fn() -> Vec<T>) -> Result<Vec<T>, String>
where
    T: Serialize + DeserializeOwned,
{
    if path.exists() {
        return load_json_file(path, Shape::Array);
    }
    let items = seed();
    save_json_file(path, &items)?;
    info!("Seeded {} with {} entries", path.display(), items.len());
    Ok(items)
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply `f` to a copy of the collection, persist the copy, then keep it.
/// A failed write leaves memory and disk untouched.
fn mutate<T, R>(
    m: &Mutex<T>,
    path: &Path,
    f: impl FnOnce(&mut T) -> Result<R, String>,
) -> Result<R, String>
where
    T: Clone + Serialize,
{
    let mut guard = lock(m);
    let mut draft = guard.clone();
    let out = f(&mut draft)?;
    save_json_file(path, &draft)?;
    *guard = draft;
    Ok(out)
}

fn check_index(len: usize, idx: usize) -> Result<(), String> {
    if idx < len {
        Ok(())
    } else {
        Err(format!("No entry at position {}", idx))
    }
}

fn push<T>(list: &mut Vec<T>, item: T) -> Result<usize, String> {
    list.push(item);
    Ok(list.len() - 1)
}

fn replace<T>(list: &mut [T], idx: usize, item: T) -> Result<(), String> {
    check_index(list.len(), idx)?;
    list[idx] = item;
    Ok(())
}

fn remove<T>(list: &mut Vec<T>, idx: usize) -> Result<T, String> {
    check_index(list.len(), idx)?;
    Ok(list.remove(idx))
}

impl Store for JsonStore {
    fn site_get(&self) -> SiteConfig {
        lock(&self.site).clone()
    }

    fn site_update(&self, site: &SiteConfig) -> Result<(), String> {
        mutate(&self.site, &self.paths.config, |current| {
            *current = site.clone();
            Ok(())
        })
    }

    fn service_list(&self) -> Vec<Service> {
        lock(&self.services).clone()
    }

    fn service_add(&self, service: Service) -> Result<usize, String> {
        mutate(&self.services, &self.paths.services, |l| push(l, service))
    }

    fn service_update(&self, idx: usize, service: Service) -> Result<(), String> {
        mutate(&self.services, &self.paths.services, |l| replace(l, idx, service))
    }

    fn service_delete(&self, idx: usize) -> Result<Service, String> {
        mutate(&self.services, &self.paths.services, |l| remove(l, idx))
    }

    fn portfolio_list(&self) -> Vec<PortfolioItem> {
        lock(&self.portfolio).clone()
    }

    fn portfolio_get(&self, idx: usize) -> Option<PortfolioItem> {
        lock(&self.portfolio).get(idx).cloned()
    }

    fn portfolio_add(&self, item: PortfolioItem) -> Result<usize, String> {
        mutate(&self.portfolio, &self.paths.portfolio, |l| push(l, item))
    }

    fn portfolio_update(&self, idx: usize, item: PortfolioItem) -> Result<(), String> {
        mutate(&self.portfolio, &self.paths.portfolio, |l| replace(l, idx, item))
    }

    fn portfolio_delete(&self, idx: usize) -> Result<PortfolioItem, String> {
        mutate(&self.portfolio, &self.paths.portfolio, |l| remove(l, idx))
    }

    fn atout_list(&self) -> Vec<Atout> {
        lock(&self.atouts).clone()
    }

    fn atout_add(&self, atout: Atout) -> Result<usize, String> {
        mutate(&self.atouts, &self.paths.atouts, |l| push(l, atout))
    }

    fn atout_update(&self, idx: usize, atout: Atout) -> Result<(), String> {
        mutate(&self.atouts, &self.paths.atouts, |l| replace(l, idx, atout))
    }

    fn atout_delete(&self, idx: usize) -> Result<Atout, String> {
        mutate(&self.atouts, &self.paths.atouts, |l| remove(l, idx))
    }

    fn message_list(&self) -> Vec<ContactMessage> {
        lock(&self.messages).clone()
    }

    fn message_get(&self, idx: usize) -> Option<ContactMessage> {
        lock(&self.messages).get(idx).cloned()
    }

    fn message_count(&self, status: Option<MessageStatus>) -> usize {
        lock(&self.messages)
            .iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .count()
    }

    fn message_add(&self, message: ContactMessage) -> Result<usize, String> {
        mutate(&self.messages, &self.paths.messages, |l| push(l, message))
    }

    fn message_set_status(&self, idx: usize, status: MessageStatus) -> Result<(), String> {
        {
            let current = lock(&self.messages);
            check_index(current.len(), idx)?;
            if current[idx].status == status {
                return Ok(());
            }
        }
        mutate(&self.messages, &self.paths.messages, |l| {
            check_index(l.len(), idx)?;
            l[idx].status = status;
            Ok(())
        })
    }

    fn message_delete(&self, idx: usize) -> Result<ContactMessage, String> {
        mutate(&self.messages, &self.paths.messages, |l| remove(l, idx))
    }

    fn carousel_list(&self) -> Vec<CarouselItem> {
        lock(&self.carousel).clone()
    }

    fn carousel_add(&self, item: CarouselItem) -> Result<usize, String> {
        mutate(&self.carousel, &self.paths.rotator, |l| {
            if l.len() >= MAX_CAROUSEL_ITEMS {
                return Err(format!(
                    "The carousel already holds {} items",
                    MAX_CAROUSEL_ITEMS
                ));
            }
            push(l, item)
        })
    }

    fn carousel_move(&self, idx: usize, dir: Direction) -> Result<(), String> {
        mutate(&self.carousel, &self.paths.rotator, |l| {
            swap_with_neighbour(l, idx, dir)
        })
    }

    fn carousel_delete(&self, idx: usize) -> Result<CarouselItem, String> {
        mutate(&self.carousel, &self.paths.rotator, |l| remove(l, idx))
    }

    fn gallery_list(&self) -> Vec<GalleryItem> {
        lock(&self.gallery).clone()
    }

    fn gallery_add(&self, item: GalleryItem) -> Result<usize, String> {
        mutate(&self.gallery, &self.paths.gallery, |l| push(l, item))
    }

    fn gallery_delete(&self, idx: usize) -> Result<GalleryItem, String> {
        mutate(&self.gallery, &self.paths.gallery, |l| remove(l, idx))
    }

    fn traffic_record(&self, entry: TrafficEntry) -> Result<(), String> {
        let cap = self.traffic_cap;
        mutate(&self.traffic, &self.paths.traffic, |l| {
            l.push(entry);
            if cap > 0 && l.len() > cap {
                let excess = l.len() - cap;
                l.drain(..excess);
            }
            Ok(())
        })
    }

    fn traffic_list(&self) -> Vec<TrafficEntry> {
        lock(&self.traffic).clone()
    }

    fn traffic_count(&self) -> usize {
        lock(&self.traffic).len()
    }

    fn traffic_clear(&self) -> Result<(), String> {
        mutate(&self.traffic, &self.paths.traffic, |l| {
            l.clear();
            Ok(())
        })
    }
}
