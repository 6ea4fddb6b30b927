//! This crate is a related content engine built on a bag-of-words vector space.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod vectorizer;

/// Vector Builder
/// The top-level struct of this crate. It wraps a record source and a field
/// projector, and keeps the vector space built from them up to date.
///
/// Internally, it holds:
/// - The record source and its projector (`ClusteredModel`)
/// - The vocabulary pruning thresholds (`ComparisonConfig`)
/// - The record count of the last build (the signature)
/// - The last built `VectorSpace`
///
/// On every access the current record count is compared with the stored
/// signature. A mismatch rebuilds the whole space; a match returns the cached
/// one without scanning any record. Edits that keep the record count unchanged
/// are not detected.
pub use vectorizer::builder::VectorBuilder;

/// Vector Space
/// The vocabulary (`columns`, first-seen order) and one term count vector per
/// record over it, together with the signature it was built from.
///
/// # Serialization
/// Supported.
/// `cache::store_vector_space` / `cache::load_vector_space` keep it in a
/// `CacheStore` as CBOR.
pub use vectorizer::{build_vector_space, VectorSpace};

/// Record Source and Field Projection
/// `RecordSource` is the abstract collection the engine reads: one pass over
/// `(id, record)` pairs and a cheap count. `FieldProjector` turns a record into
/// the ordered text of its compared fields. Any `Fn(&R) -> Vec<String>` is a
/// projector, and `FieldList` projects by name for records implementing
/// `FieldAccess`.
pub use dataset::{
    extract_dataset, ClusteredModel, Dataset, FieldAccess, FieldList, FieldProjector, RecordSource,
};

/// Similarity Scoring
/// `pearson_score` computes the Pearson correlation of two equal-length
/// vectors, returning exactly `1.0` when either has zero variance.
/// The `Compare` trait lets the ranker use another scoring algorithm.
pub use vectorizer::compare::{pearson_score, Compare, PearsonCompare};

/// Related-Item Ranking
/// Scores every other record against a target and returns their ids ordered
/// by ascending `(score, id)`. Zero scores are left out.
pub use vectorizer::related::{compute_related, compute_related_with, related_scores};

/// Token Frequency structure
/// Counts lowercased whitespace-separated tokens, keeping first-seen order.
pub use vectorizer::token::TokenFrequency;

/// Cache store collaborator
/// `CacheStore` is a keyed byte store; `MemoryCache` is the in-process one.
/// `cached_related` serves ranked lists keyed by target and signature.
pub use cache::{cached_related, CacheStore, MemoryCache};

pub use config::ComparisonConfig;
pub use error::{ComparisonError, Result};
