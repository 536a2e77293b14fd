use crate::command::{GroupsOutput, PageData, SpeciesListOutput, ValuesOutput};
use console::{measure_text_width, style};
use flora_protocol::Advisory;
use flora_search::{CompareOutput, FindOutput, ViewOutput};

const COLUMN_GAP: &str = "  ";

/// Left-aligned plain-text table. Missing cells render empty.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (position, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(position) {
                *width = (*width).max(measure_text_width(cell));
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (position, (cell, width)) in cells.zip(widths).enumerate() {
        if position > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        let pad = width.saturating_sub(measure_text_width(cell));
        line.push_str(&" ".repeat(pad));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn cell_text(cell: &Option<String>) -> String {
    cell.clone().unwrap_or_default()
}

pub fn render_view(out: &ViewOutput) -> String {
    let mut text = String::new();
    for (index, profile) in out.species.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        text.push_str(&format!("{}\n", style(&profile.species).bold()));
        if profile.groups.is_empty() {
            text.push_str("  (no grouped traits recorded)\n");
        }
        for section in &profile.groups {
            text.push_str(&format!("\n  {}\n", style(&section.group).underlined()));
            let rows: Vec<Vec<String>> = section
                .traits
                .iter()
                .map(|t| vec![t.trait_name.clone(), t.value.clone()])
                .collect();
            for line in render_table(&["Trait", "Value"], &rows).lines() {
                text.push_str("  ");
                text.push_str(line);
                text.push('\n');
            }
        }
    }
    text
}

pub fn render_find(out: &FindOutput) -> String {
    let mut headers = vec![out.species_column.as_str()];
    headers.extend(out.columns.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = out
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![cell_text(&row.species)];
            cells.extend(row.values.iter().map(cell_text));
            cells
        })
        .collect();
    format!(
        "{} ({})\n\n{}",
        style("Matching species").bold(),
        out.rows.len(),
        render_table(&headers, &rows)
    )
}

/// Side by side: one row per column of the table, one column per species row.
pub fn render_compare(out: &CompareOutput) -> String {
    let mut headers = vec![out.species_column.as_str()];
    headers.extend(out.rows.iter().map(|row| row.species.as_str()));
    let rows: Vec<Vec<String>> = out
        .columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            let mut cells = vec![column.clone()];
            cells.extend(out.rows.iter().map(|row| cell_text(&row.values[position])));
            cells
        })
        .collect();
    render_table(&headers, &rows)
}

pub fn render_species(out: &SpeciesListOutput) -> String {
    out.species.iter().map(|s| format!("{s}\n")).collect()
}

pub fn render_groups(out: &GroupsOutput, with_traits: bool) -> String {
    let mut text = String::new();
    for group in &out.groups {
        text.push_str(&group.name);
        text.push('\n');
        if with_traits {
            for trait_name in &group.traits {
                text.push_str(&format!("  {trait_name}\n"));
            }
        }
    }
    text
}

pub fn render_values(out: &ValuesOutput) -> String {
    out.values.iter().map(|v| format!("{v}\n")).collect()
}

pub fn render_page(page: &PageData, with_group_traits: bool) -> String {
    match page {
        PageData::View(out) => render_view(out),
        PageData::Find(out) => render_find(out),
        PageData::Compare(out) => render_compare(out),
        PageData::Species(out) => render_species(out),
        PageData::Groups(out) => render_groups(out, with_group_traits),
        PageData::Values(out) => render_values(out),
    }
}

pub fn render_advisory(advisory: &Advisory) -> String {
    if advisory.kind.is_warning() {
        format!("{} {}\n", style("warning:").yellow().bold(), advisory.message)
    } else {
        format!("{} {}\n", style("info:").cyan().bold(), advisory.message)
    }
}
