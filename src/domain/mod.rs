//! Domain layer: dates, TLD extraction and the balanced frequency tree
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod date;
pub mod error;
pub mod observation;
pub mod tld;
pub mod tree_traits;

pub use arena::{PostOrderIterator, TldCount, TldEntry, TldTree, TreeIterator};
pub use date::Date;
pub use error::{DomainError, DomainResult};
pub use observation::Observation;
pub use tld::{extract_tld, NoSeparatorPolicy, TldExtractor, DEFAULT_SEPARATOR};
pub use tree_traits::TreeDisplay;
