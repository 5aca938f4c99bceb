// Entry point and high-level CLI flow.
//
// The binary renders the NovaRetail marketing lead report for one period
// (October 2025):
// - Option [1] loads and cleans the CSV, printing diagnostics.
// - Option [2] edits the per-dimension filter selection.
// - Option [3] recomputes everything over the filtered view and renders the
//   KPI block, the grouped report tables, and the channel recommendation,
//   exporting each table as CSV plus a JSON KPI summary.
// - Option [4] exports the filtered leads verbatim as CSV.
//
// The session owns all state (dataset handle + current filters); the engine
// modules are pure functions over that state.
mod errors;
mod filter;
mod kpis;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use std::io::{self, Write};

use filter::{Dimension, FilterSelection};
use loader::Dataset;
use types::{
    ChannelPerformanceRow, ChannelSummaryRow, ConversionRow, KpiSummary, RegionShareRow,
    StatusMixRow,
};
use util::{format_int, format_number};

struct Session {
    dataset: Option<Dataset>,
    filters: FilterSelection,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for the main menu and the filter submenus.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: load and clean the CSV file.
///
/// On success the dataset (rows + derived cost model) replaces whatever the
/// session held before, and any existing filter selection is kept.
fn handle_load(session: &mut Session) {
    let path = "df_selected.csv";
    match loader::load_and_clean(path) {
        Ok((dataset, load_report)) => {
            println!(
                "Processing dataset... ({} rows read, {} leads loaded)",
                format_int(load_report.total_rows as i64),
                format_int(load_report.loaded_rows as i64)
            );
            println!(
                "Note: {} rows skipped due to parse/validation errors.",
                format_int(load_report.parse_errors as i64)
            );
            if load_report.blank_categoricals > 0 {
                println!(
                    "Info: {} leads have a blank category value and are skipped by that grouping.",
                    format_int(load_report.blank_categoricals as i64)
                );
            }
            println!(
                "Cost model: {} distinct cost-bearing channel(s); summed cost is divided accordingly.\n",
                format_int(dataset.cost_model.replication_factor as i64)
            );
            session.dataset = Some(dataset);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: interactive multi-select per dimension.
///
/// Entering an empty value list clears the dimension, which means "no
/// restriction", never "exclude all".
fn handle_filters(session: &mut Session) {
    let Some(dataset) = session.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    loop {
        println!("Current filters: {}", session.filters.describe());
        println!("[1] channel");
        println!("[2] company_size");
        println!("[3] sector");
        println!("[4] status");
        println!("[5] Clear all filters");
        println!("[6] Done\n");
        let dim = match read_choice().as_str() {
            "1" => Dimension::Channel,
            "2" => Dimension::CompanySize,
            "3" => Dimension::Sector,
            "4" => Dimension::Status,
            "5" => {
                session.filters.clear();
                println!("All filters cleared.\n");
                continue;
            }
            "6" => {
                println!("");
                return;
            }
            _ => {
                println!("Invalid choice. Please enter 1-6.\n");
                continue;
            }
        };

        let values = filter::distinct_values(&dataset.rows, dim);
        if values.is_empty() {
            println!("No values available for {}.\n", dim.label());
            continue;
        }
        println!("Values for {}:", dim.label());
        for (i, v) in values.iter().enumerate() {
            println!("  [{}] {}", i + 1, v);
        }
        let input = read_line("Enter value numbers separated by commas (empty = no restriction): ");
        let set = session.filters.set_mut(dim);
        set.clear();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.parse::<usize>() {
                Ok(n) if (1..=values.len()).contains(&n) => {
                    set.insert(values[n - 1].clone());
                }
                _ => println!("Ignoring invalid value number: {}", part),
            }
        }
        println!("");
    }
}

/// Handle option [3]: recompute the full report over the filtered view.
///
/// This function is intentionally side-effectful:
/// - writes one CSV per report table,
/// - writes a JSON KPI summary,
/// - and prints markdown previews of each table to the console.
fn handle_reports(session: &Session) {
    let Some(dataset) = session.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let view = filter::apply(&dataset.rows, &session.filters);

    println!("NovaRetail Marketing Report — October 2025");
    println!("Filters: {}\n", session.filters.describe());

    let k = kpis::compute_kpis(&view, &dataset.cost_model);
    println!("Key Performance Indicators\n");
    println!(
        "  Total leads:      {} ({} clients)",
        format_int(k.total_leads as i64),
        format_int(k.clients as i64)
    );
    println!(
        "  Conversion rate:  {}% ({}% progressing as SQL)",
        format_number(k.conversion_rate, 1),
        format_number(k.progression_rate, 1)
    );
    println!(
        "  Weighted CTR:     {}% ({}% vs {} reference)",
        format_number(k.weighted_ctr, 2),
        format_number(k.weighted_ctr - kpis::REFERENCE_CTR, 2),
        format_number(kpis::REFERENCE_CTR, 1)
    );
    println!(
        "  Cost per client:  {} ({} per lead, {} total)\n",
        format_number(k.cost_per_client, 2),
        format_number(k.cost_per_lead, 2),
        format_number(k.total_cost, 2)
    );

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let channel_stats = reports::channel_performance(&view);
    let r1: Vec<ChannelPerformanceRow> = channel_stats
        .iter()
        .map(ChannelPerformanceRow::from_stats)
        .collect();
    let file1 = "report1_channel_performance.csv";
    if let Err(e) = output::write_csv(file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Channel Performance (CTR and Conversion)\n");
    output::preview_table(&r1);
    println!("(Full table exported to {})\n", file1);

    let mix = reports::status_mix(&view);
    let r2: Vec<StatusMixRow> = mix.iter().map(StatusMixRow::from_mix).collect();
    let file2 = "report2_status_mix.csv";
    if let Err(e) = output::write_csv(file2, &r2) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Status Mix by Channel (row-normalized %)\n");
    output::preview_table(&r2);
    println!("(Full table exported to {})\n", file2);

    let sizes = reports::size_conversion(&view);
    let r3: Vec<ConversionRow> = sizes.iter().map(ConversionRow::from_group).collect();
    let file3 = "report3_size_conversion.csv";
    if let Err(e) = output::write_csv(file3, &r3) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Conversion by Company Size\n");
    output::preview_table(&r3);
    println!("(Full table exported to {})\n", file3);

    let sectors = reports::sector_performance(&view);
    let r4: Vec<ConversionRow> = sectors.iter().map(ConversionRow::from_group).collect();
    let file4 = "report4_sector_performance.csv";
    if let Err(e) = output::write_csv(file4, &r4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Performance by Sector\n");
    output::preview_table(&r4);
    println!("(Full table exported to {})\n", file4);

    let regions = reports::collapse_regions(&reports::region_counts(&view), reports::TOP_REGIONS);
    let r5: Vec<RegionShareRow> = regions
        .iter()
        .map(|c| RegionShareRow::from_count(c, k.total_leads))
        .collect();
    let file5 = "report5_region_share.csv";
    if let Err(e) = output::write_csv(file5, &r5) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Report 5: Leads by Region (top {} + Other)\n",
        reports::TOP_REGIONS
    );
    output::preview_table(&r5);
    println!("(Full table exported to {})\n", file5);

    // Synthesis table: headline channel ratios flagged against the fixed
    // thresholds. The signal is computed here, at the presentation boundary.
    let summary_rows: Vec<ChannelSummaryRow> = channel_stats
        .iter()
        .map(|s| {
            let signal = s
                .conversion_rate
                .map(reports::classify)
                .unwrap_or(reports::Signal::Neutral);
            ChannelSummaryRow::from_stats(s, signal)
        })
        .collect();
    println!("Channel Summary\n");
    output::preview_table(&summary_rows);

    match reports::best_channel(&channel_stats) {
        Ok(best) => println!(
            "Recommendation: prioritize the \"{}\" channel, which shows the best conversion rate.\n",
            best
        ),
        Err(e) => println!("Recommendation unavailable: {}\n", e),
    }

    let summary = KpiSummary::new(&k, dataset.cost_model.replication_factor);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("KPI summary exported to summary.json\n");

    println!("Methodology:");
    println!("- CTR: clicks / impressions x 100");
    println!("- Conversion: conversions / clicks (campaign) or clients / leads (CRM)");
    println!("- Cost figures divided by the cost replication factor derived at load time");
    println!("- Period: October 2025 only, no intra-month segmentation\n");
}

/// Handle option [4]: export the filtered view verbatim as CSV.
fn handle_export(session: &Session) {
    let Some(dataset) = session.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let view = filter::apply(&dataset.rows, &session.filters);
    let path = "nova_retail_filtered.csv";
    match output::write_csv(path, &view) {
        Ok(()) => println!(
            "Exported {} filtered lead(s) to {}.\n",
            format_int(view.len() as i64),
            path
        ),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

fn main() {
    let mut session = Session {
        dataset: None,
        filters: FilterSelection::default(),
    };
    loop {
        println!("NovaRetail Lead Report:");
        println!("[1] Load the dataset");
        println!("[2] Edit filters");
        println!("[3] Generate dashboard reports");
        println!("[4] Export filtered leads (CSV)");
        println!("[5] Exit\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&mut session);
            }
            "2" => {
                println!("");
                handle_filters(&mut session);
            }
            "3" => {
                println!("");
                handle_reports(&session);
            }
            "4" => {
                handle_export(&session);
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 1-5.\n");
            }
        }
    }
}
