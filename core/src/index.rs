use crate::error::{IndexError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

pub type Term = String;
pub type DocId = u32;

/// Presence of a term in a document: [`ABSENT`] or [`PRESENT`]. Only a
/// [`crate::MergeMode::LegacySum`] merge can produce larger values.
pub type Presence = u32;

pub const ABSENT: Presence = 0;
pub const PRESENT: Presence = 1;

/// Documents containing a single term, in the order they were first seen.
pub type Postings<D = DocId> = IndexMap<D, Presence>;

/// Whether `add_term_occurrence` may grow the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Vocabulary {
    #[default]
    Open,
    Frozen,
}

/// Structural export of an index: the document registry and the term map,
/// exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot<D: Hash + Eq = DocId> {
    pub documents: IndexMap<D, Presence>,
    pub terms: IndexMap<Term, Postings<D>>,
}

impl<D: Hash + Eq> Default for IndexSnapshot<D> {
    fn default() -> Self {
        Self { documents: IndexMap::new(), terms: IndexMap::new() }
    }
}

/// Boolean retrieval index: which documents each term occurs in.
///
/// Both mappings iterate in insertion order, so [`BooleanIndex::terms`],
/// [`BooleanIndex::documents`] and the generated vectors are stable as long as
/// no new term is inserted between calls.
///
/// There is no internal locking; share it across threads behind a mutex.
#[derive(Debug, Clone)]
pub struct BooleanIndex<D: Hash + Eq = DocId> {
    pub(crate) documents: IndexMap<D, Presence>,
    pub(crate) terms: IndexMap<Term, Postings<D>>,
    vocabulary: Vocabulary,
}

impl<D: Hash + Eq> Default for BooleanIndex<D> {
    fn default() -> Self {
        Self { documents: IndexMap::new(), terms: IndexMap::new(), vocabulary: Vocabulary::Open }
    }
}

impl<D: Hash + Eq + Clone> BooleanIndex<D> {
    pub fn new() -> Self { Self::default() }

    /// Creates an index whose vocabulary is seeded with `initial_terms`, each
    /// mapped to empty postings. No documents are registered.
    pub fn with_terms<I, T>(initial_terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let mut index = Self::new();
        for term in initial_terms {
            index.terms.insert(term.into(), Postings::new());
        }
        index
    }

    pub(crate) fn from_parts(documents: IndexMap<D, Presence>, terms: IndexMap<Term, Postings<D>>) -> Self {
        Self { documents, terms, vocabulary: Vocabulary::Open }
    }

    /// Drops every term and document. The vocabulary state is kept.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.documents.clear();
    }

    pub fn freeze(&mut self) { self.vocabulary = Vocabulary::Frozen; }

    pub fn unfreeze(&mut self) { self.vocabulary = Vocabulary::Open; }

    pub fn is_frozen(&self) -> bool { self.vocabulary == Vocabulary::Frozen }

    pub fn vocabulary(&self) -> Vocabulary { self.vocabulary }

    /// Records that `term` occurs in `document`.
    ///
    /// The document is always registered. While frozen, an unknown term is
    /// dropped and the document stays registered with whatever flag it had.
    pub fn add_term_occurrence(&mut self, term: &str, document: D) {
        self.documents.entry(document.clone()).or_insert(ABSENT);

        if !self.terms.contains_key(term) {
            if self.is_frozen() {
                return;
            }
            self.terms.insert(term.to_owned(), Postings::new());
        }

        self.documents.insert(document.clone(), PRESENT);
        if let Some(postings) = self.terms.get_mut(term) {
            postings.insert(document, PRESENT);
        }
    }

    pub fn contains_term(&self, term: &str) -> bool { self.terms.contains_key(term) }

    pub fn contains_document(&self, document: &D) -> bool { self.documents.contains_key(document) }

    /// Presence of `term` in `document`; [`ABSENT`] when the term is known but
    /// does not occur there.
    pub fn get_term_exists(&self, term: &str, document: &D) -> Result<Presence> {
        if !self.documents.contains_key(document) {
            return Err(IndexError::UnknownDocument);
        }
        let postings = self.terms.get(term).ok_or(IndexError::UnknownTerm)?;
        Ok(postings.get(document).copied().unwrap_or(ABSENT))
    }

    /// Number of documents `term` appears in.
    pub fn get_document_frequency(&self, term: &str) -> Result<usize> {
        self.get_documents(term).map(|postings| postings.len())
    }

    /// The document's presence flag. This is not a term count.
    pub fn get_document_length(&self, document: &D) -> Result<Presence> {
        self.documents.get(document).copied().ok_or(IndexError::UnknownDocument)
    }

    pub fn get_documents(&self, term: &str) -> Result<&Postings<D>> {
        self.terms.get(term).ok_or(IndexError::UnknownTerm)
    }

    pub fn terms(&self) -> Vec<Term> { self.terms.keys().cloned().collect() }

    pub fn documents(&self) -> Vec<D> { self.documents.keys().cloned().collect() }

    pub fn items(&self) -> &IndexMap<Term, Postings<D>> { &self.terms }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    pub fn num_documents(&self) -> usize { self.documents.len() }

    /// One presence flag per vocabulary term, in vocabulary order. Fails as a
    /// whole if the document is unknown.
    pub fn generate_document_vector(&self, document: &D) -> Result<Vec<Presence>> {
        if !self.documents.contains_key(document) {
            return Err(IndexError::UnknownDocument);
        }
        self.terms.keys().map(|term| self.get_term_exists(term, document)).collect()
    }

    /// |documents| x |terms| presence matrix, rows in document order.
    pub fn generate_feature_matrix(&self) -> Result<Vec<Vec<Presence>>> {
        self.documents.keys().map(|doc| self.generate_document_vector(doc)).collect()
    }

    /// Feature matrix with a caller-supplied weight for every (term, document)
    /// cell, e.g. a tf-idf scheme layered on top of the presence flags.
    pub fn generate_feature_matrix_with<F>(&self, weight: F) -> Result<Vec<Vec<f64>>>
    where
        F: Fn(&Self, &str, &D) -> Result<f64>,
    {
        self.documents
            .keys()
            .map(|doc| self.terms.keys().map(|term| weight(self, term, doc)).collect())
            .collect()
    }

    /// Removes every term whose document frequency is below `min_value` or
    /// above `max_value`. With `use_percentile` the frequency is divided by the
    /// number of registered documents first. Documents are never removed.
    ///
    /// Returns the number of terms removed.
    pub fn prune(&mut self, min_value: Option<f64>, max_value: Option<f64>, use_percentile: bool) -> usize {
        let n_documents = self.documents.len();

        // Frequencies are fixed before anything is removed.
        let doomed: Vec<bool> = self
            .terms
            .values()
            .map(|postings| {
                let mut freq = postings.len() as f64;
                if use_percentile {
                    freq = if n_documents == 0 { 0.0 } else { freq / n_documents as f64 };
                }
                min_value.is_some_and(|min| freq < min) || max_value.is_some_and(|max| freq > max)
            })
            .collect();

        let before = self.terms.len();
        let mut verdicts = doomed.into_iter();
        self.terms.retain(|_, _| !verdicts.next().unwrap_or(false));
        let removed = before - self.terms.len();

        tracing::debug!(removed, remaining = self.terms.len(), ?min_value, ?max_value, use_percentile, "pruned vocabulary");
        removed
    }

    pub fn to_dict(&self) -> IndexSnapshot<D> {
        IndexSnapshot { documents: self.documents.clone(), terms: self.terms.clone() }
    }

    /// Replaces all terms and documents with `data`. The vocabulary state is kept.
    pub fn from_dict(&mut self, data: IndexSnapshot<D>) {
        self.documents = data.documents;
        self.terms = data.terms;
    }
}

impl<D: Hash + Eq + Clone> From<IndexSnapshot<D>> for BooleanIndex<D> {
    fn from(data: IndexSnapshot<D>) -> Self {
        Self::from_parts(data.documents, data.terms)
    }
}

impl<D: Hash + Eq> PartialEq for BooleanIndex<D> {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms && self.documents == other.documents
    }
}

impl<D: Hash + Eq> fmt::Display for BooleanIndex<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<BooleanIndex: {} terms, {} documents>", self.terms.len(), self.documents.len())
    }
}
