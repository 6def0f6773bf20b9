use crate::models::analytics::TrafficEntry;
use crate::models::carousel::{CarouselItem, Direction};
use crate::models::gallery::GalleryItem;
use crate::models::message::{ContactMessage, MessageStatus};
use crate::models::portfolio::PortfolioItem;
use crate::models::service::Service;
use crate::models::settings::SiteConfig;
use crate::models::Atout;

pub mod json;
pub mod json_file;

pub use json::{JsonStore, StorePaths};

/// Unified data-access trait. Every content read and write goes through here.
/// Entries are addressed by their position in the list; removing entry `i`
/// shifts every later entry down by one.
pub trait Store: Send + Sync {
    // ── Site settings ───────────────────────────────────────────────
    fn site_get(&self) -> SiteConfig;
    fn site_update(&self, site: &SiteConfig) -> Result<(), String>;

    // ── Services ────────────────────────────────────────────────────
    fn service_list(&self) -> Vec<Service>;
    fn service_add(&self, service: Service) -> Result<usize, String>;
    fn service_update(&self, idx: usize, service: Service) -> Result<(), String>;
    fn service_delete(&self, idx: usize) -> Result<Service, String>;

    // ── Portfolio ───────────────────────────────────────────────────
    fn portfolio_list(&self) -> Vec<PortfolioItem>;
    fn portfolio_get(&self, idx: usize) -> Option<PortfolioItem> {
        self.portfolio_list().into_iter().nth(idx)
    }
    fn portfolio_add(&self, item: PortfolioItem) -> Result<usize, String>;
    fn portfolio_update(&self, idx: usize, item: PortfolioItem) -> Result<(), String>;
    /// Returns the removed item so the caller can unlink its files.
    fn portfolio_delete(&self, idx: usize) -> Result<PortfolioItem, String>;

    // ── Atouts ("why me") ───────────────────────────────────────────
    fn atout_list(&self) -> Vec<Atout>;
    fn atout_add(&self, atout: Atout) -> Result<usize, String>;
    fn atout_update(&self, idx: usize, atout: Atout) -> Result<(), String>;
    fn atout_delete(&self, idx: usize) -> Result<Atout, String>;

    // ── Contact messages ────────────────────────────────────────────
    fn message_list(&self) -> Vec<ContactMessage>;
    fn message_get(&self, idx: usize) -> Option<ContactMessage> {
        self.message_list().into_iter().nth(idx)
    }
    fn message_count(&self, status: Option<MessageStatus>) -> usize {
        self.message_list()
            .iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .count()
    }
    fn message_add(&self, message: ContactMessage) -> Result<usize, String>;
    fn message_set_status(&self, idx: usize, status: MessageStatus) -> Result<(), String>;
    fn message_delete(&self, idx: usize) -> Result<ContactMessage, String>;

    // ── Homepage carousel ───────────────────────────────────────────
    fn carousel_list(&self) -> Vec<CarouselItem>;
    /// Fails without touching the list once the cap is reached.
    fn carousel_add(&self, item: CarouselItem) -> Result<usize, String>;
    fn carousel_move(&self, idx: usize, dir: Direction) -> Result<(), String>;
    fn carousel_delete(&self, idx: usize) -> Result<CarouselItem, String>;

    // ── Gallery ─────────────────────────────────────────────────────
    fn gallery_list(&self) -> Vec<GalleryItem>;
    fn gallery_add(&self, item: GalleryItem) -> Result<usize, String>;
    fn gallery_delete(&self, idx: usize) -> Result<GalleryItem, String>;

    // ── Traffic log ─────────────────────────────────────────────────
    fn traffic_record(&self, entry: TrafficEntry) -> Result<(), String>;
    fn traffic_list(&self) -> Vec<TrafficEntry>;
    fn traffic_count(&self) -> usize {
        self.traffic_list().len()
    }
    fn traffic_clear(&self) -> Result<(), String>;
}
