// Headline KPI block computed over a filtered view.
use crate::loader::CostModel;
use crate::types::LeadRecord;
use crate::util::{div_or_zero, pct};

/// Hypothetical prior-period CTR the dashboard compares against.
pub const REFERENCE_CTR: f64 = 2.5;

/// Scalar KPIs for one filtered view. Ratios are stored unrounded; fixed
/// precision is applied only when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_leads: usize,
    pub mql: usize,
    pub sql: usize,
    pub clients: usize,
    /// Clients / total leads, as a percentage. 0 for an empty view.
    pub conversion_rate: f64,
    /// SQLs / total leads, as a percentage. 0 for an empty view.
    pub progression_rate: f64,
    /// sum(clicks) / sum(impressions), as a percentage. 0 when the view has
    /// no impressions.
    pub weighted_ctr: f64,
    /// Summed cost deflated by the cost model's replication factor.
    pub total_cost: f64,
    pub cost_per_lead: f64,
    pub cost_per_client: f64,
}

pub fn compute_kpis(view: &[LeadRecord], cost_model: &CostModel) -> Kpis {
    let total_leads = view.len();
    let mql = view.iter().filter(|r| r.status == "MQL").count();
    let sql = view.iter().filter(|r| r.status == "SQL").count();
    let clients = view.iter().filter(|r| r.status == "Client").count();

    let clicks: u64 = view.iter().map(|r| r.clicks).sum();
    let impressions: u64 = view.iter().map(|r| r.impressions).sum();
    let total_cost = cost_model.shared_cost(view.iter().map(|r| r.cost).sum());

    Kpis {
        total_leads,
        mql,
        sql,
        clients,
        conversion_rate: pct(clients as f64, total_leads as f64),
        progression_rate: pct(sql as f64, total_leads as f64),
        weighted_ctr: pct(clicks as f64, impressions as f64),
        total_cost,
        cost_per_lead: div_or_zero(total_cost, total_leads as f64),
        cost_per_client: div_or_zero(total_cost, clients as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(channel: &str, status: &str, clicks: u64, impressions: u64, cost: f64) -> LeadRecord {
        LeadRecord {
            lead_id: format!("{}-{}-{}", channel, status, clicks),
            channel: channel.to_string(),
            company_size: "1-10".to_string(),
            sector: "Tech".to_string(),
            status: status.to_string(),
            region: "North".to_string(),
            clicks,
            impressions,
            conversions: 0,
            cost,
        }
    }

    fn model(factor: usize) -> CostModel {
        CostModel {
            replication_factor: factor,
        }
    }

    // The worked example: 10 leads, 4 Email (2 Client, 1 SQL, 1 MQL) and
    // 6 Social (1 Client, 2 SQL, 3 MQL), no status restriction.
    fn example_view() -> Vec<LeadRecord> {
        let mut v = vec![
            lead("Email", "Client", 10, 200, 300.0),
            lead("Email", "Client", 11, 210, 300.0),
            lead("Email", "SQL", 12, 220, 300.0),
            lead("Email", "MQL", 13, 230, 300.0),
        ];
        for (i, status) in ["Client", "SQL", "SQL", "MQL", "MQL", "MQL"]
            .iter()
            .enumerate()
        {
            v.push(lead("Social", status, 20 + i as u64, 400, 150.0));
        }
        v
    }

    #[test]
    fn example_scenario_matches_expected_kpis() {
        let k = compute_kpis(&example_view(), &model(2));
        assert_eq!(k.total_leads, 10);
        assert_eq!(k.clients, 3);
        assert_eq!(k.sql, 3);
        assert_eq!(k.mql, 4);
        assert!((k.conversion_rate - 30.0).abs() < 1e-9);
        assert!((k.progression_rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn status_counts_partition_the_view() {
        let k = compute_kpis(&example_view(), &model(2));
        assert_eq!(k.total_leads, k.mql + k.sql + k.clients);
    }

    #[test]
    fn rates_stay_in_range() {
        let k = compute_kpis(&example_view(), &model(2));
        assert!((0.0..=100.0).contains(&k.conversion_rate));
        assert!((0.0..=100.0).contains(&k.progression_rate));
        assert!((0.0..=100.0).contains(&k.weighted_ctr));
    }

    #[test]
    fn empty_view_degrades_to_zero_everywhere() {
        let k = compute_kpis(&[], &model(3));
        assert_eq!(k.total_leads, 0);
        assert_eq!(k.conversion_rate, 0.0);
        assert_eq!(k.progression_rate, 0.0);
        assert_eq!(k.weighted_ctr, 0.0);
        assert_eq!(k.total_cost, 0.0);
        assert_eq!(k.cost_per_lead, 0.0);
        assert_eq!(k.cost_per_client, 0.0);
    }

    #[test]
    fn zero_impressions_give_zero_ctr_without_fault() {
        let view = vec![
            lead("Email", "MQL", 0, 0, 100.0),
            lead("Email", "SQL", 0, 0, 100.0),
        ];
        let k = compute_kpis(&view, &model(1));
        assert_eq!(k.weighted_ctr, 0.0);
    }

    #[test]
    fn total_cost_is_deflated_by_the_replication_factor() {
        let view = vec![
            lead("Email", "Client", 5, 50, 300.0),
            lead("Email", "MQL", 5, 50, 300.0),
            lead("Social", "MQL", 5, 50, 600.0),
        ];
        let k = compute_kpis(&view, &model(3));
        assert!((k.total_cost - 400.0).abs() < 1e-9);
        assert!((k.cost_per_lead - 400.0 / 3.0).abs() < 1e-9);
        assert!((k.cost_per_client - 400.0).abs() < 1e-9);
    }
}
