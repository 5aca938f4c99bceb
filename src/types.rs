use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::kpis::Kpis;
use crate::reports::{ChannelStats, GroupConversion, RegionCount, Signal, StatusMix};
use crate::util::{format_number, format_opt};

/// One raw line of `df_selected.csv`, everything optional so a damaged row
/// never aborts the whole read.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub lead_id: Option<String>,
    pub channel: Option<String>,
    pub company_size: Option<String>,
    pub sector: Option<String>,
    pub status: Option<String>,
    pub region: Option<String>,
    pub clicks: Option<String>,
    pub impressions: Option<String>,
    pub conversions: Option<String>,
    pub cost: Option<String>,
}

/// A typed lead. Categorical fields are trimmed strings; an empty string
/// means the value was missing in the source and the row is skipped by any
/// grouping over that dimension (but still counts toward raw totals).
///
/// Serializes back to the exact source column layout so a filtered view can
/// be exported verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct LeadRecord {
    pub lead_id: String,
    pub channel: String,
    pub company_size: String,
    pub sector: String,
    pub status: String,
    pub region: String,
    pub clicks: u64,
    pub impressions: u64,
    pub conversions: u64,
    pub cost: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChannelPerformanceRow {
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Leads")]
    #[tabled(rename = "Leads")]
    pub leads: usize,
    #[serde(rename = "AvgClicks")]
    #[tabled(rename = "AvgClicks")]
    pub avg_clicks: String,
    #[serde(rename = "AvgImpressions")]
    #[tabled(rename = "AvgImpressions")]
    pub avg_impressions: String,
    #[serde(rename = "AvgCost")]
    #[tabled(rename = "AvgCost")]
    pub avg_cost: String,
    #[serde(rename = "CTR")]
    #[tabled(rename = "CTR (%)")]
    pub ctr: String,
    #[serde(rename = "ConversionRate")]
    #[tabled(rename = "Conversion (%)")]
    pub conversion_rate: String,
    #[serde(rename = "CostPerConversion")]
    #[tabled(rename = "Cost/Conv.")]
    pub cost_per_conversion: String,
}

impl ChannelPerformanceRow {
    pub fn from_stats(s: &ChannelStats) -> Self {
        ChannelPerformanceRow {
            channel: s.channel.clone(),
            leads: s.leads,
            avg_clicks: format_number(s.mean_clicks, 2),
            avg_impressions: format_number(s.mean_impressions, 2),
            avg_cost: format_number(s.mean_cost, 2),
            ctr: format_opt(s.ctr, 2),
            conversion_rate: format_opt(s.conversion_rate, 1),
            cost_per_conversion: format_opt(s.cost_per_conversion, 2),
        }
    }
}

/// The channel synthesis table: headline ratios plus a performance signal
/// column the renderer derives from `classify`.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChannelSummaryRow {
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "CTR")]
    #[tabled(rename = "CTR (%)")]
    pub ctr: String,
    #[serde(rename = "ConversionRate")]
    #[tabled(rename = "Conversion (%)")]
    pub conversion_rate: String,
    #[serde(rename = "CostPerConversion")]
    #[tabled(rename = "Cost/Conv.")]
    pub cost_per_conversion: String,
    #[serde(rename = "Signal")]
    #[tabled(rename = "Signal")]
    pub signal: String,
}

impl ChannelSummaryRow {
    pub fn from_stats(s: &ChannelStats, signal: Signal) -> Self {
        ChannelSummaryRow {
            channel: s.channel.clone(),
            ctr: format_opt(s.ctr, 2),
            conversion_rate: format_opt(s.conversion_rate, 1),
            cost_per_conversion: format_opt(s.cost_per_conversion, 2),
            signal: signal.label().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StatusMixRow {
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "MQL")]
    #[tabled(rename = "MQL (%)")]
    pub mql: String,
    #[serde(rename = "SQL")]
    #[tabled(rename = "SQL (%)")]
    pub sql: String,
    #[serde(rename = "Client")]
    #[tabled(rename = "Client (%)")]
    pub client: String,
}

impl StatusMixRow {
    pub fn from_mix(m: &StatusMix) -> Self {
        StatusMixRow {
            channel: m.channel.clone(),
            mql: format_number(m.mql_pct, 1),
            sql: format_number(m.sql_pct, 1),
            client: format_number(m.client_pct, 1),
        }
    }
}

/// Shared presentation shape for the company-size and sector conversion
/// tables; only the first column header differs.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ConversionRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Leads")]
    #[tabled(rename = "Leads")]
    pub leads: usize,
    #[serde(rename = "Clients")]
    #[tabled(rename = "Clients")]
    pub clients: usize,
    #[serde(rename = "ConversionRate")]
    #[tabled(rename = "Conversion (%)")]
    pub conversion_rate: String,
}

impl ConversionRow {
    pub fn from_group(g: &GroupConversion) -> Self {
        ConversionRow {
            group: g.label.clone(),
            leads: g.leads,
            clients: g.clients,
            conversion_rate: format_number(g.conversion_rate, 1),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionShareRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Leads")]
    #[tabled(rename = "Leads")]
    pub leads: usize,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share (%)")]
    pub share: String,
}

impl RegionShareRow {
    pub fn from_count(c: &RegionCount, total_leads: usize) -> Self {
        RegionShareRow {
            region: c.region.clone(),
            leads: c.leads,
            share: format_number(crate::util::pct(c.leads as f64, total_leads as f64), 1),
        }
    }
}

/// The JSON export of the headline KPI block, stamped with the generation
/// time. Values are the raw (unrounded) engine outputs.
#[derive(Debug, Serialize)]
pub struct KpiSummary {
    pub total_leads: usize,
    pub mql: usize,
    pub sql: usize,
    pub clients: usize,
    pub conversion_rate: f64,
    pub progression_rate: f64,
    pub weighted_ctr: f64,
    pub total_cost: f64,
    pub cost_per_lead: f64,
    pub cost_per_client: f64,
    pub cost_replication_factor: usize,
    pub generated_at: DateTime<Utc>,
}

impl KpiSummary {
    pub fn new(k: &Kpis, replication_factor: usize) -> Self {
        KpiSummary {
            total_leads: k.total_leads,
            mql: k.mql,
            sql: k.sql,
            clients: k.clients,
            conversion_rate: k.conversion_rate,
            progression_rate: k.progression_rate,
            weighted_ctr: k.weighted_ctr,
            total_cost: k.total_cost,
            cost_per_lead: k.cost_per_lead,
            cost_per_client: k.cost_per_client,
            cost_replication_factor: replication_factor,
            generated_at: Utc::now(),
        }
    }
}
