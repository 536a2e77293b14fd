//! # Flora Search
//!
//! Trait tokenization, the static trait taxonomy and the three page
//! behaviors of the viewer.
//!
//! ```text
//! TraitTable ──┐
//!              ├──> QueryEngine ──> view_traits      ──> ViewOutput    | Advisory
//! Taxonomy ────┘         │      ──> find_by_traits   ──> FindOutput    | Advisory
//!                        │      ──> compare_species  ──> CompareOutput | Advisory
//!                        └──> tokenize (find only)
//! ```

mod engine;
mod error;
mod taxonomy;
mod tokenizer;

pub use engine::{
    CompareOutput, CompareRow, FindOutput, FindRequest, FindRow, GroupSection, QueryEngine,
    QueryOutcome, SpeciesProfile, TraitFilter, TraitValue, ViewOutput,
};
pub use error::{Result, SearchError};
pub use taxonomy::{TraitGroup, TraitTaxonomy};
pub use tokenizer::{tokenize, tokenize_all};
