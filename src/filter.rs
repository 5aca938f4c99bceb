// The filter engine: a conjunction of per-dimension value sets applied to
// the lead table. Pure; the source rows are never mutated.
use crate::types::LeadRecord;
use std::collections::BTreeSet;

/// The four filterable dimensions of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Channel,
    CompanySize,
    Sector,
    Status,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Channel,
        Dimension::CompanySize,
        Dimension::Sector,
        Dimension::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Channel => "channel",
            Dimension::CompanySize => "company_size",
            Dimension::Sector => "sector",
            Dimension::Status => "status",
        }
    }

    pub fn value_of(self, r: &LeadRecord) -> &str {
        match self {
            Dimension::Channel => &r.channel,
            Dimension::CompanySize => &r.company_size,
            Dimension::Sector => &r.sector,
            Dimension::Status => &r.status,
        }
    }
}

/// One value set per dimension. An empty set means "no restriction on this
/// dimension", NOT "exclude everything" — matching how a cleared
/// multi-select behaves in the report UI. Sets are `BTreeSet` so the
/// current selection always displays in a stable order.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    channel: BTreeSet<String>,
    company_size: BTreeSet<String>,
    sector: BTreeSet<String>,
    status: BTreeSet<String>,
}

impl FilterSelection {
    pub fn set(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Channel => &self.channel,
            Dimension::CompanySize => &self.company_size,
            Dimension::Sector => &self.sector,
            Dimension::Status => &self.status,
        }
    }

    pub fn set_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Channel => &mut self.channel,
            Dimension::CompanySize => &mut self.company_size,
            Dimension::Sector => &mut self.sector,
            Dimension::Status => &mut self.status,
        }
    }

    pub fn clear(&mut self) {
        for dim in Dimension::ALL {
            self.set_mut(dim).clear();
        }
    }

    /// AND across dimensions; an empty set passes every row through. A row
    /// whose value is blank for a restricted dimension cannot be a member
    /// of the allowed set and is excluded.
    pub fn matches(&self, r: &LeadRecord) -> bool {
        Dimension::ALL.iter().all(|dim| {
            let allowed = self.set(*dim);
            allowed.is_empty() || allowed.contains(dim.value_of(r))
        })
    }

    /// One-line description of the current selection for the console menu.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for dim in Dimension::ALL {
            let set = self.set(dim);
            if !set.is_empty() {
                let values: Vec<&str> = set.iter().map(String::as_str).collect();
                parts.push(format!("{} in [{}]", dim.label(), values.join(", ")));
            }
        }
        if parts.is_empty() {
            "(no filters — full dataset)".to_string()
        } else {
            parts.join(" AND ")
        }
    }
}

/// Apply the selection to the dataset, producing an order-preserving
/// filtered view. Pure function of its inputs.
pub fn apply(rows: &[LeadRecord], selection: &FilterSelection) -> Vec<LeadRecord> {
    rows.iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect()
}

/// Distinct non-blank values of a dimension, sorted, for the filter menus.
pub fn distinct_values(rows: &[LeadRecord], dim: Dimension) -> Vec<String> {
    let set: BTreeSet<&str> = rows
        .iter()
        .map(|r| dim.value_of(r))
        .filter(|v| !v.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: &str, channel: &str, size: &str, sector: &str, status: &str) -> LeadRecord {
        LeadRecord {
            lead_id: id.to_string(),
            channel: channel.to_string(),
            company_size: size.to_string(),
            sector: sector.to_string(),
            status: status.to_string(),
            region: "North".to_string(),
            clicks: 10,
            impressions: 100,
            conversions: 1,
            cost: 500.0,
        }
    }

    fn sample() -> Vec<LeadRecord> {
        vec![
            lead("1", "Email", "1-10", "Tech", "MQL"),
            lead("2", "Email", "10-50", "Retail", "Client"),
            lead("3", "Social", "1-10", "Tech", "SQL"),
            lead("4", "Social", "100-500", "Finance", "Client"),
            lead("5", "Search", "50-100", "Retail", "MQL"),
        ]
    }

    fn ids(rows: &[LeadRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.lead_id.as_str()).collect()
    }

    #[test]
    fn empty_selection_passes_everything_through() {
        let rows = sample();
        let view = apply(&rows, &FilterSelection::default());
        assert_eq!(view.len(), rows.len());
        assert_eq!(ids(&view), ids(&rows));
    }

    #[test]
    fn filters_compose_by_conjunction() {
        let rows = sample();
        let mut sel = FilterSelection::default();
        sel.set_mut(Dimension::Channel).insert("Email".to_string());
        sel.set_mut(Dimension::Status).insert("Client".to_string());
        let view = apply(&rows, &sel);
        assert_eq!(ids(&view), vec!["2"]);
    }

    #[test]
    fn filtering_preserves_row_order() {
        let rows = sample();
        let mut sel = FilterSelection::default();
        sel.set_mut(Dimension::Sector).insert("Tech".to_string());
        sel.set_mut(Dimension::Sector).insert("Retail".to_string());
        let view = apply(&rows, &sel);
        assert_eq!(ids(&view), vec!["1", "2", "3", "5"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let rows = sample();
        let mut sel = FilterSelection::default();
        sel.set_mut(Dimension::Channel).insert("Social".to_string());
        let once = apply(&rows, &sel);
        let twice = apply(&once, &sel);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn filtering_is_order_independent_across_dimensions() {
        let rows = sample();
        let mut channel_only = FilterSelection::default();
        channel_only
            .set_mut(Dimension::Channel)
            .insert("Email".to_string());
        let mut status_only = FilterSelection::default();
        status_only
            .set_mut(Dimension::Status)
            .insert("Client".to_string());

        let a = apply(&apply(&rows, &channel_only), &status_only);
        let b = apply(&apply(&rows, &status_only), &channel_only);
        assert_eq!(ids(&a), ids(&b));

        let mut both = FilterSelection::default();
        both.set_mut(Dimension::Channel).insert("Email".to_string());
        both.set_mut(Dimension::Status).insert("Client".to_string());
        assert_eq!(ids(&apply(&rows, &both)), ids(&a));
    }

    #[test]
    fn blank_value_fails_a_restricted_dimension() {
        let mut rows = sample();
        rows[0].sector = String::new();
        let mut sel = FilterSelection::default();
        sel.set_mut(Dimension::Sector).insert("Tech".to_string());
        let view = apply(&rows, &sel);
        assert_eq!(ids(&view), vec!["3"]);
    }

    #[test]
    fn distinct_values_are_sorted_and_skip_blanks() {
        let mut rows = sample();
        rows[4].channel = String::new();
        assert_eq!(
            distinct_values(&rows, Dimension::Channel),
            vec!["Email", "Social"]
        );
    }
}
