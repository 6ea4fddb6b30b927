pub mod builder;
pub mod compare;
pub mod related;
pub mod token;

use std::hash::Hash;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::ComparisonConfig,
    dataset::Dataset,
    error::Result,
    vectorizer::token::TokenFrequency,
};

/// Term count vectors of every record over one shared vocabulary.
///
/// `columns` is the vocabulary in first-seen order; every vector in `vectors`
/// has exactly `columns.len()` entries, position `i` counting `columns[i]`.
/// `signature` is the record count the space was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSpace<K>
where
    K: Eq + Hash,
{
    pub signature: usize,
    pub columns: Vec<String>,
    pub vectors: IndexMap<K, Vec<u32>>,
}

impl<K> VectorSpace<K>
where
    K: Eq + Hash,
{
    pub fn empty() -> Self {
        Self {
            signature: 0,
            columns: Vec::new(),
            vectors: IndexMap::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn vectors(&self) -> &IndexMap<K, Vec<u32>> {
        &self.vectors
    }

    pub fn vector(&self, key: &K) -> Option<&[u32]> {
        self.vectors.get(key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocab_size(&self) -> usize {
        self.columns.len()
    }
}

impl<K> VectorSpace<K>
where
    K: Clone + Eq + Hash + Ord + Send + Sync,
{
    /// Related records of `key`, see [`related::compute_related`].
    pub fn related(&self, key: &K) -> Result<Vec<K>> {
        related::compute_related(key, &self.vectors)
    }
}

/// Build the vocabulary and the per-record term count vectors.
///
/// A term is kept iff `f_min < occurrences / records < f_max`. The ratio uses
/// the raw occurrence count over every record, not the number of records
/// containing the term.
pub fn build_vector_space<K>(dataset: &Dataset<K>, config: &ComparisonConfig) -> VectorSpace<K>
where
    K: Clone + Eq + Hash + Send + Sync,
{
    if dataset.is_empty() {
        return VectorSpace::empty();
    }

    // per-record counting in parallel, indexed collect keeps record order
    let data: Vec<(K, TokenFrequency)> = dataset
        .par_iter()
        .map(|(key, text)| {
            let mut freq = TokenFrequency::new();
            freq.add_text(text);
            (key.clone(), freq)
        })
        .collect();

    // merged in record order so the global table sees tokens in first-seen order
    let mut words_total = TokenFrequency::new();
    for (_, freq) in &data {
        words_total.merge(freq);
    }

    let record_num = data.len() as f64;
    let columns: Vec<String> = words_total
        .iter()
        .filter(|&(_, count)| config.keeps(count as f64 / record_num))
        .map(|(word, _)| word.to_string())
        .collect();

    let vectors: IndexMap<K, Vec<u32>> = data
        .par_iter()
        .map(|(key, freq)| (key.clone(), freq.project(&columns)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    debug!(
        records = vectors.len(),
        tokens = words_total.token_num(),
        vocab = columns.len(),
        "built vector space"
    );

    VectorSpace {
        signature: vectors.len(),
        columns,
        vectors,
    }
}
