use crate::cmd::simulate::SimulationResult;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use glideforge::gesture::ideal::VariantKind;
use glideforge::ScoredCandidate;
use strum::IntoEnumIterator;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_suggestions(source: &str, ranked: &[ScoredCandidate]) {
    println!("\nSuggestions for {}", source);
    if ranked.is_empty() {
        println!("(no candidates)");
        return;
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Word").add_attribute(Attribute::Bold),
        Cell::new("Confidence").fg(Color::Cyan),
        Cell::new("Shape"),
        Cell::new("Location"),
        Cell::new("Variant"),
    ]);

    for (i, c) in ranked.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&c.word).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.3}", c.confidence)).fg(Color::Cyan),
            Cell::new(format!("{:.2}", c.shape_distance)),
            Cell::new(format!("{:.2}", c.location_distance)),
            Cell::new(c.variant.to_string()),
        ]);
    }
    align_right(&mut table, 2..=4);
    println!("{}", table);
}

pub fn print_simulation_report(results: &[SimulationResult], k: usize) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Word").add_attribute(Attribute::Bold),
        Cell::new("Points"),
        Cell::new("Rank"),
        Cell::new("Top guess"),
    ]);

    for r in results {
        let rank = match r.rank {
            Some(1) => Cell::new(1).fg(Color::Green),
            Some(n) => Cell::new(n).fg(Color::Yellow),
            None => Cell::new("-").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&r.word).add_attribute(Attribute::Bold),
            Cell::new(r.points),
            rank,
            Cell::new(r.top.as_deref().unwrap_or("-")),
        ]);
    }
    align_right(&mut table, 1..=2);
    println!("\n{}", table);

    let total = results.len();
    let top1 = results.iter().filter(|r| r.rank == Some(1)).count();
    let topk = results.iter().filter(|r| r.rank.is_some()).count();
    let pct = |n: usize| {
        if total == 0 {
            0.0
        } else {
            n as f64 * 100.0 / total as f64
        }
    };
    println!(
        "Top-1: {}/{} ({:.1}%)  Top-{}: {}/{} ({:.1}%)",
        top1,
        total,
        pct(top1),
        k,
        topk,
        total,
        pct(topk)
    );

    let by_variant: Vec<String> = VariantKind::iter()
        .map(|kind| {
            let n = results.iter().filter(|r| r.variant == Some(kind)).count();
            format!("{}: {}", kind, n)
        })
        .collect();
    println!("Matched via {}", by_variant.join(", "));
}
