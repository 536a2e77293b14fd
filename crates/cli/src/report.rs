use crate::command::PageData;
use flora_protocol::Advisory;
use flora_search::{CompareOutput, FindOutput, ViewOutput};
use std::path::Path;

pub const REPORT_TITLE: &str = "Species Trait Viewer";

/// Markdown rendering of one page, or of the advisory shown in its place.
pub fn render_page_report(dataset: &Path, title: &str, page: Option<&PageData>, advisory: Option<&Advisory>) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {REPORT_TITLE}: {title}\n\n"));
    md.push_str(&format!("- Dataset: `{}`\n\n", dataset.display()));

    if let Some(advisory) = advisory {
        md.push_str(&format!("> {}\n", advisory.message));
        return md;
    }

    match page {
        Some(PageData::View(out)) => push_view(&mut md, out),
        Some(PageData::Find(out)) => push_find(&mut md, out),
        Some(PageData::Compare(out)) => push_compare(&mut md, out),
        Some(PageData::Species(out)) => {
            for species in &out.species {
                md.push_str(&format!("- {}\n", escape_cell(species)));
            }
        }
        Some(PageData::Groups(out)) => {
            for group in &out.groups {
                md.push_str(&format!("- **{}**: {}\n", group.name, group.traits.join(", ")));
            }
        }
        Some(PageData::Values(out)) => {
            md.push_str(&format!("## `{}`\n\n", out.trait_name));
            for value in &out.values {
                md.push_str(&format!("- {}\n", escape_cell(value)));
            }
        }
        None => {}
    }
    md
}

fn push_view(md: &mut String, out: &ViewOutput) {
    for profile in &out.species {
        md.push_str(&format!("## {}\n\n", escape_cell(&profile.species)));
        for section in &profile.groups {
            md.push_str(&format!("### {}\n\n", section.group));
            md.push_str("| Trait | Value |\n|---|---|\n");
            for value in &section.traits {
                md.push_str(&format!(
                    "| `{}` | {} |\n",
                    value.trait_name,
                    escape_cell(&value.value)
                ));
            }
            md.push('\n');
        }
    }
}

fn push_find(md: &mut String, out: &FindOutput) {
    md.push_str(&format!("## Matching species ({})\n\n", out.rows.len()));
    let mut headers = vec![out.species_column.clone()];
    headers.extend(out.columns.iter().cloned());
    push_header(md, &headers);
    for row in &out.rows {
        let mut cells = vec![row.species.clone()];
        cells.extend(row.values.iter().cloned());
        push_row(md, &cells);
    }
}

fn push_compare(md: &mut String, out: &CompareOutput) {
    let mut headers = vec![out.species_column.clone()];
    headers.extend(out.columns.iter().cloned());
    push_header(md, &headers);
    for row in &out.rows {
        let mut cells = vec![Some(row.species.clone())];
        cells.extend(row.values.iter().cloned());
        push_row(md, &cells);
    }
}

fn push_header(md: &mut String, headers: &[String]) {
    md.push('|');
    for header in headers {
        md.push_str(&format!(" `{header}` |"));
    }
    md.push_str("\n|");
    md.push_str(&"---|".repeat(headers.len()));
    md.push('\n');
}

fn push_row(md: &mut String, cells: &[Option<String>]) {
    md.push('|');
    for cell in cells {
        md.push_str(&format!(" {} |", escape_cell(cell.as_deref().unwrap_or(""))));
    }
    md.push('\n');
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flora_search::FindRow;

    #[test]
    fn advisory_replaces_the_table() {
        let md = render_page_report(
            Path::new("traits.csv"),
            "Find Flowers by Trait",
            None,
            Some(&Advisory::no_filter_selected()),
        );
        assert!(md.starts_with("# Species Trait Viewer: Find Flowers by Trait\n"));
        assert!(md.contains("> Please select at least one trait and value."));
        assert!(!md.contains('|'));
    }

    #[test]
    fn find_table_escapes_pipes() {
        let page = PageData::Find(FindOutput {
            species_column: "species_name".to_string(),
            columns: vec!["flower_colour".to_string()],
            rows: vec![FindRow {
                species: Some("A".to_string()),
                values: vec![Some("red|white".to_string())],
            }],
        });
        let md = render_page_report(Path::new("t.csv"), "Find", Some(&page), None);
        assert!(md.contains("| `species_name` | `flower_colour` |\n|---|---|\n"));
        assert!(md.contains("| A | red\\|white |"));
    }
}
