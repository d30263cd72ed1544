//! Usage log reader
//!
//! Claude Code appends token and cost accounting to
//! `<root>/logs/usage.json`. This module reads it on demand for the
//! analytics screen: a daily series, a per-agent breakdown, and a plain-text
//! bar chart the screen can render directly. An absent or malformed log
//! reads as "no data" rather than an error.

use chrono::Local;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const BAR_WIDTH: usize = 20;

/// On-disk shape of `logs/usage.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageData {
    /// Tokens per `%Y-%m-%d` date.
    #[serde(default)]
    pub daily: HashMap<String, u64>,
    /// Cost per `%Y-%m-%d` date.
    #[serde(default)]
    pub costs: HashMap<String, f64>,
    /// Tokens per agent id.
    #[serde(default)]
    pub agents: HashMap<String, u64>,
}

/// One day of usage. Reports are oldest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyUsage {
    pub date: String,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentUsage {
    pub id: String,
    pub tokens: u64,
}

/// Reader over the usage log. Loads on every call; no caching.
pub struct UsageLog {
    path: PathBuf,
}

impl UsageLog {
    /// Usage log under a configuration root.
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join("logs").join("usage.json"),
        }
    }

    /// Raw usage data; `None` when the log is absent or unreadable.
    pub fn load(&self) -> Option<UsageData> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!("malformed usage log {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Usage for the last `days` calendar days, oldest first. Days missing
    /// from the log report zero tokens and zero cost.
    pub fn daily(&self, days: u32) -> Vec<DailyUsage> {
        let Some(data) = self.load() else {
            return Vec::new();
        };
        let today = Local::now().date_naive();
        let mut series = Vec::with_capacity(days as usize);
        for offset in (0..i64::from(days)).rev() {
            let date = (today - chrono::Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string();
            series.push(DailyUsage {
                tokens: data.daily.get(&date).copied().unwrap_or(0),
                cost: data.costs.get(&date).copied().unwrap_or(0.0),
                date,
            });
        }
        series
    }

    /// Token totals per agent, sorted by agent id.
    pub fn agent_breakdown(&self) -> Vec<AgentUsage> {
        let Some(data) = self.load() else {
            return Vec::new();
        };
        let mut agents: Vec<AgentUsage> = data
            .agents
            .into_iter()
            .map(|(id, tokens)| AgentUsage { id, tokens })
            .collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        agents
    }

    /// Total cost over the last `days` days.
    pub fn total_cost(&self, days: u32) -> f64 {
        self.daily(days).iter().map(|d| d.cost).sum()
    }
}

/// Render a labelled horizontal bar chart, [`BAR_WIDTH`] characters at full
/// scale, with thousands abbreviated as `k`.
pub fn render_bar_chart(values: &[u64], labels: &[&str]) -> String {
    if values.is_empty() {
        return "No data available".to_string();
    }
    let max = values.iter().copied().max().unwrap_or(0).max(1);

    let mut lines = Vec::with_capacity(values.len());
    for (label, value) in labels.iter().zip(values) {
        let bar_len = ((*value as f64 / max as f64) * BAR_WIDTH as f64) as usize;
        let bar = "█".repeat(bar_len);
        let value_str = if *value >= 1000 {
            format!("{}k", value / 1000)
        } else {
            value.to_string()
        };
        lines.push(format!("{label:<10} {bar:<20} {value_str:>6}"));
    }
    lines.join("\n")
}
