use comfy_table::presets::UTF8_NO_BORDERS;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::results::{AttackResults, DefenseResults, Entry, WoundsResults};

pub trait ReportExt {
    fn table(&self) -> String;

    fn print_table(&self) {
        print!("{}", self.table());
    }
}

fn stddev(distribution: &[Entry], mean: f64) -> f64 {
    distribution
        .iter()
        .map(|e| (f64::from(e.total) - mean).powi(2) * e.probability)
        .sum::<f64>()
        .sqrt()
}

fn render(summary: String, distribution: &[Entry], cumulative: &[Entry]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_NO_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Total"),
            Cell::new("Probability"),
            Cell::new("At least"),
        ]);
    for (entry, at_least) in distribution.iter().zip(cumulative) {
        table.add_row(vec![
            Cell::new(entry.total).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:6.2}%", entry.probability * 100.0)),
            Cell::new(format!("{:6.2}%", at_least.probability * 100.0)),
        ]);
    }

    format!("{summary}\n\n{table}\n")
}

impl ReportExt for AttackResults {
    fn table(&self) -> String {
        let sd = stddev(&self.distribution, self.expected_total);
        let summary = format!(
            "Successes: {:.3}±{sd:.3} | Hits: {:.3} | Crits: {:.3}",
            self.expected_total, self.expected_hits, self.expected_crits
        );
        render(summary, &self.distribution, &self.cumulative)
    }
}

impl ReportExt for DefenseResults {
    fn table(&self) -> String {
        let sd = stddev(&self.distribution, self.expected_blocks);
        let summary = format!("Blocks: {:.3}±{sd:.3}", self.expected_blocks);
        render(summary, &self.distribution, &self.cumulative)
    }
}

impl ReportExt for WoundsResults {
    fn table(&self) -> String {
        let sd = stddev(&self.distribution, self.expected_wounds);
        let summary = format!("Wounds: {:.3}±{sd:.3}", self.expected_wounds);
        render(summary, &self.distribution, &self.cumulative)
    }
}
