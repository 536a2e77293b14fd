use crate::error::{DatasetError, Result};
use crate::normalize::normalize_cell;
use std::collections::{BTreeSet, HashMap};

/// One table cell. `None` means no data was recorded.
pub type Cell = Option<String>;

/// In-memory species trait table.
///
/// Immutable once built; every cell has been normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    species_column: usize,
    rows: Vec<Vec<Cell>>,
    species: Vec<String>,
}

impl TraitTable {
    /// Build a table from raw cells.
    ///
    /// Short rows are padded with missing cells. Rows wider than the header,
    /// repeated header names and a missing species column are rejected.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>, species_column: &str) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(DatasetError::DuplicateColumn {
                    column: name.clone(),
                });
            }
        }

        let species_idx =
            *index
                .get(species_column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: species_column.to_string(),
                })?;

        let width = columns.len();
        let mut normalized = Vec::with_capacity(rows.len());
        for (row_number, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(DatasetError::RaggedRow {
                    row: row_number + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            let mut cells: Vec<Cell> = row
                .iter()
                .map(|cell| normalize_cell(cell.as_deref()))
                .collect();
            cells.resize(width, None);
            normalized.push(cells);
        }

        let species = normalized
            .iter()
            .filter_map(|row| row[species_idx].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self {
            columns,
            index,
            species_column: species_idx,
            rows: normalized,
            species,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn species_column(&self) -> &str {
        &self.columns[self.species_column]
    }

    /// Every column except the species key, in header order.
    pub fn trait_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(position, _)| *position != self.species_column)
            .map(|(_, name)| name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, duplicate-free, non-missing species names.
    pub fn species_list(&self) -> &[String] {
        &self.species
    }

    pub fn contains_species(&self, name: &str) -> bool {
        self.species.binary_search_by(|s| s.as_str().cmp(name)).is_ok()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> + '_ {
        (0..self.rows.len()).map(move |position| RowRef {
            table: self,
            position,
        })
    }

    /// Every row whose species equals `name`, in table order.
    pub fn rows_for_species<'a>(&'a self, name: &'a str) -> impl Iterator<Item = RowRef<'a>> + 'a {
        self.rows().filter(move |row| row.species() == Some(name))
    }

    /// First row for `name`. Later duplicates are ignored.
    pub fn first_row_for_species(&self, name: &str) -> Option<RowRef<'_>> {
        self.rows().find(|row| row.species() == Some(name))
    }

    /// Non-missing values of a column, in table order.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let position = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| position.and_then(|p| row[p].as_deref()))
    }
}

/// Borrowed view of a single row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a TraitTable,
    position: usize,
}

impl<'a> RowRef<'a> {
    /// Zero-based position in the table.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn species(&self) -> Option<&'a str> {
        self.cell(self.table.species_column)
    }

    pub fn cell(&self, column: usize) -> Option<&'a str> {
        self.table.rows[self.position]
            .get(column)
            .and_then(|cell| cell.as_deref())
    }

    /// Value under a named column; unknown columns read as missing.
    pub fn value(&self, column: &str) -> Option<&'a str> {
        self.table
            .column_index(column)
            .and_then(|position| self.cell(position))
    }

    pub fn cells(&self) -> &'a [Cell] {
        &self.table.rows[self.position]
    }
}
