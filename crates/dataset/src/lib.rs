//! # Flora Dataset
//!
//! Read-only access to the species trait table.
//!
//! ```text
//! delimited file ──> csv reader ──> missing-cell detection ──> normalize_cell ──> TraitTable
//!                                                                                   │
//!                                              DatasetHandle (load once, share Arc) ┘
//! ```
//!
//! Every cell goes through [`normalize_cell`] exactly once, inside
//! [`TraitTable::new`], so nothing downstream ever sees a trailing
//! parenthetical annotation.
//!
//! ## Example
//!
//! ```rust
//! use flora_dataset::TraitTable;
//!
//! let table = TraitTable::new(
//!     vec!["species_name".to_string(), "flower_colour".to_string()],
//!     vec![vec![Some("Acacia dealbata (silver wattle)".to_string()), Some("Yellow".to_string())]],
//!     "species_name",
//! )
//! .unwrap();
//!
//! assert_eq!(table.species_list(), ["Acacia dealbata"]);
//! ```

mod error;
mod handle;
mod loader;
mod normalize;
mod table;

pub use error::{DatasetError, Result};
pub use handle::DatasetHandle;
pub use loader::{load_table, LoadOptions, DEFAULT_DATA_PATH, DEFAULT_SPECIES_COLUMN};
pub use normalize::{normalize_cell, normalize_value};
pub use table::{Cell, RowRef, TraitTable};
