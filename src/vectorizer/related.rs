use std::hash::Hash;

use indexmap::IndexMap;
use num::Num;
use rayon::prelude::*;

use crate::{
    error::Result,
    vectorizer::compare::{Compare, PearsonCompare},
};

/// Ids related to `target`, ordered by ascending Pearson score.
///
/// The target itself and records scoring exactly `0.0` are left out.
/// Ties are broken by ascending id. An unknown target or a target with an
/// empty vector yields an empty list.
pub fn compute_related<K, N>(target: &K, vectors: &IndexMap<K, Vec<N>>) -> Result<Vec<K>>
where
    K: Clone + Eq + Hash + Ord + Send + Sync,
    N: Num + Copy + Into<f64> + Send + Sync,
{
    compute_related_with::<K, N, PearsonCompare>(target, vectors)
}

/// [`compute_related`] with a custom scoring algorithm.
pub fn compute_related_with<K, N, C>(target: &K, vectors: &IndexMap<K, Vec<N>>) -> Result<Vec<K>>
where
    K: Clone + Eq + Hash + Ord + Send + Sync,
    N: Num + Copy + Send + Sync,
    C: Compare<N>,
{
    Ok(related_scores::<K, N, C>(target, vectors)?
        .into_iter()
        .map(|(key, _)| key)
        .collect())
}

/// Ranked `(id, score)` pairs behind [`compute_related_with`].
pub fn related_scores<K, N, C>(target: &K, vectors: &IndexMap<K, Vec<N>>) -> Result<Vec<(K, f64)>>
where
    K: Clone + Eq + Hash + Ord + Send + Sync,
    N: Num + Copy + Send + Sync,
    C: Compare<N>,
{
    let object_vector = match vectors.get(target) {
        Some(vec) if !vec.is_empty() => vec,
        _ => return Ok(Vec::new()),
    };

    let mut related: Vec<(K, f64)> = vectors
        .par_iter()
        .filter(|(key, _)| *key != target)
        .map(|(key, vec)| C::score(object_vector, vec).map(|score| (key.clone(), score)))
        .collect::<Result<Vec<_>>>()?;

    related.retain(|(_, score)| *score != 0.0);
    related.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(related)
}
