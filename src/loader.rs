use crate::types::{LeadRecord, RawRow};
use crate::util::{clean_text, parse_f64_safe, parse_u64_safe};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::error::Error;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub blank_categoricals: usize,
}

/// How replicated cost rows are shared back out when summing.
///
/// In the source export every lead row repeats the full cost of its channel
/// for the period, so a naive `sum(cost)` overcounts by the number of
/// distinct cost-bearing channels. That divisor is a property of how the
/// dataset was constructed, so it is derived from the unfiltered data at
/// load time rather than hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    pub replication_factor: usize,
}

impl CostModel {
    /// Derive the replication factor: distinct channels among cost-bearing
    /// rows of the full dataset. Falls back to 1 when no row carries cost so
    /// the divisor is never zero.
    pub fn from_rows(rows: &[LeadRecord]) -> Self {
        let channels: HashSet<&str> = rows
            .iter()
            .filter(|r| r.cost > 0.0 && !r.channel.is_empty())
            .map(|r| r.channel.as_str())
            .collect();
        CostModel {
            replication_factor: channels.len().max(1),
        }
    }

    /// Deflate a summed cost column back to the real period spend.
    pub fn shared_cost(&self, summed: f64) -> f64 {
        summed / self.replication_factor as f64
    }
}

/// The loaded dataset plus its cost model, owned by the interactive session
/// and treated as read-only; all downstream computation works on filtered
/// copies of `rows`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<LeadRecord>,
    pub cost_model: CostModel,
}

pub fn load_and_clean(path: &str) -> Result<(Dataset, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut blank_categoricals = 0usize;
    let mut rows: Vec<LeadRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        // A lead without an identifier or with an unparseable numeric field
        // cannot be typed at all and is dropped. Blank categoricals are
        // kept: such rows still count toward raw totals and are only
        // excluded from groupings over the missing dimension.
        let lead_id = clean_text(row.lead_id.as_deref());
        if lead_id.is_empty() {
            parse_errors += 1;
            continue;
        }
        let clicks = match parse_u64_safe(row.clicks.as_deref()) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let impressions = match parse_u64_safe(row.impressions.as_deref()) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let conversions = match parse_u64_safe(row.conversions.as_deref()) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let cost = match parse_f64_safe(row.cost.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let channel = clean_text(row.channel.as_deref());
        let company_size = clean_text(row.company_size.as_deref());
        let sector = clean_text(row.sector.as_deref());
        let status = clean_text(row.status.as_deref());
        let region = clean_text(row.region.as_deref());
        if channel.is_empty()
            || company_size.is_empty()
            || sector.is_empty()
            || status.is_empty()
            || region.is_empty()
        {
            blank_categoricals += 1;
        }

        rows.push(LeadRecord {
            lead_id,
            channel,
            company_size,
            sector,
            status,
            region,
            clicks,
            impressions,
            conversions,
            cost,
        });
    }

    let cost_model = CostModel::from_rows(&rows);
    let report = LoadReport {
        total_rows,
        loaded_rows: rows.len(),
        parse_errors,
        blank_categoricals,
    };
    Ok((Dataset { rows, cost_model }, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: &str, channel: &str, cost: f64) -> LeadRecord {
        LeadRecord {
            lead_id: id.to_string(),
            channel: channel.to_string(),
            company_size: "1-10".to_string(),
            sector: "Tech".to_string(),
            status: "MQL".to_string(),
            region: "North".to_string(),
            clicks: 10,
            impressions: 100,
            conversions: 1,
            cost,
        }
    }

    #[test]
    fn replication_factor_counts_distinct_cost_channels() {
        let rows = vec![
            lead("1", "Email", 900.0),
            lead("2", "Email", 900.0),
            lead("3", "Social", 600.0),
            lead("4", "Search", 450.0),
        ];
        let model = CostModel::from_rows(&rows);
        assert_eq!(model.replication_factor, 3);
        assert!((model.shared_cost(900.0 * 2.0 + 600.0 + 450.0) - 950.0).abs() < 1e-9);
    }

    #[test]
    fn replication_factor_ignores_zero_cost_and_blank_channels() {
        let rows = vec![
            lead("1", "Email", 900.0),
            lead("2", "", 600.0),
            lead("3", "Social", 0.0),
        ];
        let model = CostModel::from_rows(&rows);
        assert_eq!(model.replication_factor, 1);
    }

    #[test]
    fn replication_factor_never_zero() {
        let model = CostModel::from_rows(&[]);
        assert_eq!(model.replication_factor, 1);
        assert_eq!(model.shared_cost(0.0), 0.0);
    }
}
