use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One logged request. Appended for every public page hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEntry {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub method: String,
    pub remote_addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CountEntry {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct OverviewStats {
    pub total_views: i64,
    pub unique_visitors: i64,
    pub views_today: i64,
    pub daily: Vec<DailyCount>,
    pub top_pages: Vec<CountEntry>,
    pub top_referrers: Vec<CountEntry>,
}

/// Aggregate the traffic log for the analytics page. `daily` covers the `days`
/// calendar days ending at `today`, oldest first, zero-filled.
pub fn overview(entries: &[TrafficEntry], today: NaiveDate, days: i64, top_n: usize) -> OverviewStats {
    let unique: HashSet<&str> = entries.iter().map(|e| e.remote_addr.as_str()).collect();

    let mut per_day: HashMap<NaiveDate, i64> = HashMap::new();
    let mut pages: HashMap<&str, i64> = HashMap::new();
    let mut referrers: HashMap<&str, i64> = HashMap::new();
    for e in entries {
        *per_day.entry(e.timestamp.date_naive()).or_default() += 1;
        *pages.entry(e.path.as_str()).or_default() += 1;
        if let Some(ref r) = e.referrer {
            *referrers.entry(r.as_str()).or_default() += 1;
        }
    }

    let daily = (0..days.max(1))
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DailyCount {
                date: date.format("%Y-%m-%d").to_string(),
                count: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect();

    OverviewStats {
        total_views: entries.len() as i64,
        unique_visitors: unique.len() as i64,
        views_today: per_day.get(&today).copied().unwrap_or(0),
        daily,
        top_pages: top_counts(pages, top_n),
        top_referrers: top_counts(referrers, top_n),
    }
}

fn top_counts(map: HashMap<&str, i64>, n: usize) -> Vec<CountEntry> {
    let mut list: Vec<CountEntry> = map
        .into_iter()
        .map(|(label, count)| CountEntry {
            label: label.to_string(),
            count,
        })
        .collect();
    // Highest first, ties broken alphabetically so the order is stable.
    list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    list.truncate(n);
    list
}
