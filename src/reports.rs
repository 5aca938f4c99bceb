// Grouped aggregation over a filtered view, plus the ordering/collapsing
// policies and the channel recommendation.
//
// Every function here is a pure transform of the view it is handed. Rows
// whose value is blank for the grouping dimension are skipped by that
// grouping only; they still count toward the raw totals in `kpis`.
use crate::errors::EngineError;
use crate::types::LeadRecord;
use crate::util::{div_opt, mean, pct, pct_opt};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Fixed logical ordering of the company-size domain. Sizes are a business
/// scale, not an alphabetical one, so grouped output follows this order.
pub const COMPANY_SIZE_ORDER: [&str; 4] = ["1-10", "10-50", "50-100", "100-500"];

static SIZE_RANK: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    COMPANY_SIZE_ORDER
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i))
        .collect()
});

/// How many regions to show individually before collapsing the tail.
pub const TOP_REGIONS: usize = 5;

/// Thresholds for flagging a percentage metric in the channel summary.
pub const SIGNAL_HIGH: f64 = 2.5;
pub const SIGNAL_LOW: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    High,
    Low,
    Neutral,
}

impl Signal {
    pub fn label(self) -> &'static str {
        match self {
            Signal::High => "strong",
            Signal::Low => "weak",
            Signal::Neutral => "",
        }
    }
}

/// Classify a percentage metric against the fixed thresholds. The renderer
/// decides how a signal looks; this only decides what it is.
pub fn classify(value: f64) -> Signal {
    if value > SIGNAL_HIGH {
        Signal::High
    } else if value < SIGNAL_LOW {
        Signal::Low
    } else {
        Signal::Neutral
    }
}

/// Per-channel campaign statistics. The derived ratios are `None` when
/// their denominator is zero ("undefined", rendered as `n/a`), never a NaN
/// or a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStats {
    pub channel: String,
    pub leads: usize,
    pub mean_clicks: f64,
    pub mean_impressions: f64,
    pub mean_conversions: f64,
    pub mean_cost: f64,
    /// mean clicks / mean impressions, %.
    pub ctr: Option<f64>,
    /// mean conversions / mean clicks, %.
    pub conversion_rate: Option<f64>,
    /// mean cost / mean conversions.
    pub cost_per_conversion: Option<f64>,
}

pub fn channel_performance(view: &[LeadRecord]) -> Vec<ChannelStats> {
    #[derive(Default)]
    struct Acc {
        clicks: Vec<f64>,
        impressions: Vec<f64>,
        conversions: Vec<f64>,
        costs: Vec<f64>,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in view {
        if r.channel.is_empty() {
            continue;
        }
        let e = map.entry(r.channel.clone()).or_default();
        e.clicks.push(r.clicks as f64);
        e.impressions.push(r.impressions as f64);
        e.conversions.push(r.conversions as f64);
        e.costs.push(r.cost);
    }
    let mut stats: Vec<ChannelStats> = map
        .into_iter()
        .map(|(channel, acc)| {
            let mean_clicks = mean(&acc.clicks);
            let mean_impressions = mean(&acc.impressions);
            let mean_conversions = mean(&acc.conversions);
            let mean_cost = mean(&acc.costs);
            ChannelStats {
                channel,
                leads: acc.clicks.len(),
                mean_clicks,
                mean_impressions,
                mean_conversions,
                mean_cost,
                ctr: pct_opt(mean_clicks, mean_impressions),
                conversion_rate: pct_opt(mean_conversions, mean_clicks),
                cost_per_conversion: div_opt(mean_cost, mean_conversions),
            }
        })
        .collect();
    stats.sort_by(|a, b| a.channel.cmp(&b.channel));
    stats
}

/// One row of the status × channel cross-tab: the share of the channel's
/// leads sitting in each funnel stage, normalized per channel (not
/// globally), so a channel's shares sum to 100 up to rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMix {
    pub channel: String,
    pub mql_pct: f64,
    pub sql_pct: f64,
    pub client_pct: f64,
}

pub fn status_mix(view: &[LeadRecord]) -> Vec<StatusMix> {
    struct Acc {
        total: usize,
        mql: usize,
        sql: usize,
        client: usize,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in view {
        if r.channel.is_empty() {
            continue;
        }
        let e = map.entry(r.channel.clone()).or_insert(Acc {
            total: 0,
            mql: 0,
            sql: 0,
            client: 0,
        });
        e.total += 1;
        match r.status.as_str() {
            "MQL" => e.mql += 1,
            "SQL" => e.sql += 1,
            "Client" => e.client += 1,
            _ => {}
        }
    }
    let mut mix: Vec<StatusMix> = map
        .into_iter()
        .map(|(channel, acc)| {
            let total = acc.total as f64;
            StatusMix {
                channel,
                mql_pct: pct(acc.mql as f64, total),
                sql_pct: pct(acc.sql as f64, total),
                client_pct: pct(acc.client as f64, total),
            }
        })
        .collect();
    mix.sort_by(|a, b| a.channel.cmp(&b.channel));
    mix
}

/// Lead-count/client-count conversion statistics for one categorical group
/// (company size or sector).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConversion {
    pub label: String,
    pub leads: usize,
    pub clients: usize,
    /// clients / leads, %. Zero-guarded.
    pub conversion_rate: f64,
}

fn group_conversion<F>(view: &[LeadRecord], value_of: F) -> Vec<GroupConversion>
where
    F: Fn(&LeadRecord) -> &str,
{
    let mut map: HashMap<String, (usize, usize)> = HashMap::new();
    for r in view {
        let value = value_of(r);
        if value.is_empty() {
            continue;
        }
        let e = map.entry(value.to_string()).or_insert((0, 0));
        e.0 += 1;
        if r.status == "Client" {
            e.1 += 1;
        }
    }
    map.into_iter()
        .map(|(label, (leads, clients))| GroupConversion {
            label,
            leads,
            clients,
            conversion_rate: pct(clients as f64, leads as f64),
        })
        .collect()
}

/// Conversion by company size, in the fixed domain order. Sizes absent from
/// the view are omitted (never zero-filled); values outside the known
/// domain sort after it, alphabetically.
pub fn size_conversion(view: &[LeadRecord]) -> Vec<GroupConversion> {
    let mut groups = group_conversion(view, |r| &r.company_size);
    groups.sort_by(|a, b| {
        let ra = SIZE_RANK.get(a.label.as_str()).copied().unwrap_or(usize::MAX);
        let rb = SIZE_RANK.get(b.label.as_str()).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb).then_with(|| a.label.cmp(&b.label))
    });
    groups
}

/// Conversion by sector, best first; ties broken by sector name so the
/// ordering is deterministic.
pub fn sector_performance(view: &[LeadRecord]) -> Vec<GroupConversion> {
    let mut groups = group_conversion(view, |r| &r.sector);
    groups.sort_by(|a, b| {
        b.conversion_rate
            .partial_cmp(&a.conversion_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    groups
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCount {
    pub region: String,
    pub leads: usize,
}

/// Lead frequency by region, most frequent first, ties by region name.
pub fn region_counts(view: &[LeadRecord]) -> Vec<RegionCount> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for r in view {
        if r.region.is_empty() {
            continue;
        }
        *map.entry(r.region.clone()).or_insert(0) += 1;
    }
    let mut counts: Vec<RegionCount> = map
        .into_iter()
        .map(|(region, leads)| RegionCount { region, leads })
        .collect();
    counts.sort_by(|a, b| b.leads.cmp(&a.leads).then_with(|| a.region.cmp(&b.region)));
    counts
}

/// Keep the top `top_n` regions and sum the remainder into a trailing
/// `"Other"` entry. An empty remainder produces no entry at all — a
/// labeled zero would read as a real region with no leads.
pub fn collapse_regions(counts: &[RegionCount], top_n: usize) -> Vec<RegionCount> {
    let mut collapsed: Vec<RegionCount> = counts.iter().take(top_n).cloned().collect();
    let rest: usize = counts.iter().skip(top_n).map(|c| c.leads).sum();
    if rest > 0 {
        collapsed.push(RegionCount {
            region: "Other".to_string(),
            leads: rest,
        });
    }
    collapsed
}

/// Pick the channel with the best conversion rate. First occurrence wins a
/// tie, so the result is deterministic given the sorted stats; an undefined
/// rate loses to any defined one. "Best of nothing" has no answer, hence
/// the explicit error on empty input.
pub fn best_channel(stats: &[ChannelStats]) -> Result<&str, EngineError> {
    let mut best: Option<&ChannelStats> = None;
    for s in stats {
        match best {
            None => best = Some(s),
            Some(b) => {
                let current = s.conversion_rate.unwrap_or(f64::NEG_INFINITY);
                let incumbent = b.conversion_rate.unwrap_or(f64::NEG_INFINITY);
                if current > incumbent {
                    best = Some(s);
                }
            }
        }
    }
    best.map(|s| s.channel.as_str()).ok_or(EngineError::EmptyInput)
}
