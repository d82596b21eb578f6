//! Boolean retrieval index: per-term document presence, document vectors,
//! document-frequency pruning, snapshots and merging of independently built
//! indexes.

pub mod error;
pub mod index;
pub mod merge;
pub mod persist;
pub mod tokenizer;

pub use error::{IndexError, Result};
pub use index::{BooleanIndex, DocId, IndexSnapshot, Postings, Presence, Term, Vocabulary, ABSENT, PRESENT};
pub use merge::{merge, merge_with, MergeMode};
