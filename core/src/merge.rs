use crate::index::{BooleanIndex, Postings, Presence, Term, ABSENT, PRESENT};
use indexmap::IndexMap;
use std::hash::Hash;

/// How presence values from two indexes are combined for the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Logical OR. Values stay in {0, 1}.
    #[default]
    Or,
    /// Counter arithmetic: values are summed and non-positive sums are
    /// dropped. A document present on both sides ends up with 2, so the
    /// result is no longer a boolean index. Kept for compatibility with
    /// indexes merged by older tooling.
    LegacySum,
}

/// Union of `indexes` with [`MergeMode::Or`].
pub fn merge<'a, D, I>(indexes: I) -> BooleanIndex<D>
where
    D: Hash + Eq + Clone + 'a,
    I: IntoIterator<Item = &'a BooleanIndex<D>>,
{
    merge_with(indexes, MergeMode::Or)
}

/// Folds `indexes` left to right into a fresh index. Inputs are only read.
///
/// Each step walks the terms of the next index: a term already in the
/// accumulator has its postings combined, a new term is copied over. Terms the
/// next index lacks are carried forward untouched. Document registries are
/// combined the same way.
pub fn merge_with<'a, D, I>(indexes: I, mode: MergeMode) -> BooleanIndex<D>
where
    D: Hash + Eq + Clone + 'a,
    I: IntoIterator<Item = &'a BooleanIndex<D>>,
{
    let mut documents: IndexMap<D, Presence> = IndexMap::new();
    let mut terms: IndexMap<Term, Postings<D>> = IndexMap::new();
    let mut inputs = 0usize;

    for index in indexes {
        inputs += 1;
        for (term, postings) in index.terms.iter() {
            match terms.get_mut(term.as_str()) {
                Some(acc) => combine(acc, postings, mode),
                None => {
                    let copied = match mode {
                        MergeMode::Or => postings.iter().map(|(doc, &flag)| (doc.clone(), clamp(flag))).collect(),
                        MergeMode::LegacySum => postings.clone(),
                    };
                    terms.insert(term.clone(), copied);
                }
            }
        }
        combine(&mut documents, &index.documents, mode);
    }

    tracing::debug!(inputs, terms = terms.len(), documents = documents.len(), ?mode, "merged indexes");
    BooleanIndex::from_parts(documents, terms)
}

fn clamp(flag: Presence) -> Presence {
    if flag > ABSENT { PRESENT } else { ABSENT }
}

fn combine<D: Hash + Eq + Clone>(acc: &mut IndexMap<D, Presence>, other: &IndexMap<D, Presence>, mode: MergeMode) {
    match mode {
        MergeMode::Or => {
            for (doc, &flag) in other {
                let slot = acc.entry(doc.clone()).or_insert(ABSENT);
                *slot = clamp(*slot | flag);
            }
            for slot in acc.values_mut() {
                *slot = clamp(*slot);
            }
        }
        MergeMode::LegacySum => {
            let mut summed = IndexMap::with_capacity(acc.len() + other.len());
            for (doc, &count) in acc.iter() {
                let total = count + other.get(doc).copied().unwrap_or(ABSENT);
                if total > ABSENT {
                    summed.insert(doc.clone(), total);
                }
            }
            for (doc, &count) in other {
                if !acc.contains_key(doc) && count > ABSENT {
                    summed.insert(doc.clone(), count);
                }
            }
            *acc = summed;
        }
    }
}
