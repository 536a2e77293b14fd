use crate::error::{DatasetError, Result};
use crate::table::{Cell, TraitTable};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_PATH: &str = "final Traits summary.csv";
pub const DEFAULT_SPECIES_COLUMN: &str = "species_name";

const UTF8_BOM: char = '\u{feff}';

/// Where and how to read the trait table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Path to the delimited file
    pub path: PathBuf,

    /// Field delimiter; inferred from the extension when unset
    pub delimiter: Option<u8>,

    /// Column holding the species name
    pub species_column: String,

    /// Extra field values read as missing (an empty field always is)
    pub na_values: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            delimiter: None,
            species_column: DEFAULT_SPECIES_COLUMN.to_string(),
            na_values: Vec::new(),
        }
    }
}

impl LoadOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Tab for `.tsv`/`.tab`, comma otherwise.
    pub fn effective_delimiter(&self) -> u8 {
        if let Some(delimiter) = self.delimiter {
            return delimiter;
        }
        match self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("tsv") | Some("tab") => b'\t',
            _ => b',',
        }
    }

    fn cell(&self, field: &str) -> Cell {
        if field.is_empty() || self.na_values.iter().any(|na| na == field) {
            None
        } else {
            Some(field.to_string())
        }
    }
}

/// Read the whole table. Any failure yields no table at all.
pub fn load_table(options: &LoadOptions) -> Result<TraitTable> {
    let path = options.path.as_path();
    let file = File::open(path).map_err(|err| DatasetError::io(path, err))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.effective_delimiter())
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let columns = read_header(&mut reader, path)?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| DatasetError::csv(path, err))?;
        rows.push(record.iter().map(|field| options.cell(field)).collect());
    }

    let table = TraitTable::new(columns, rows, &options.species_column)?;
    log::info!(
        "Loaded {} rows x {} columns ({} species) from {}",
        table.len(),
        table.columns().len(),
        table.species_list().len(),
        path.display()
    );
    Ok(table)
}

fn read_header<R: std::io::Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<Vec<String>> {
    let headers = reader
        .headers()
        .map_err(|err| DatasetError::csv(path, err))?;
    Ok(headers
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let name = if position == 0 {
                name.trim_start_matches(UTF8_BOM)
            } else {
                name
            };
            name.to_string()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(LoadOptions::new("traits.csv").effective_delimiter(), b',');
        assert_eq!(LoadOptions::new("traits.TSV").effective_delimiter(), b'\t');
        assert_eq!(LoadOptions::new("traits").effective_delimiter(), b',');
    }

    #[test]
    fn explicit_delimiter_wins() {
        let options = LoadOptions {
            delimiter: Some(b';'),
            ..LoadOptions::new("traits.tsv")
        };
        assert_eq!(options.effective_delimiter(), b';');
    }

    #[test]
    fn empty_and_sentinel_fields_are_missing() {
        let options = LoadOptions {
            na_values: vec!["NA".to_string()],
            ..Default::default()
        };
        assert_eq!(options.cell(""), None);
        assert_eq!(options.cell("NA"), None);
        assert_eq!(options.cell("na"), Some("na".to_string()));
        assert_eq!(options.cell(" "), Some(" ".to_string()));
    }
}
