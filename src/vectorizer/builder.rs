use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    config::ComparisonConfig,
    dataset::{ClusteredModel, FieldProjector, RecordSource},
    error::Result,
    vectorizer::{build_vector_space, related::compute_related, VectorSpace},
};

/// Memoized vector space over a record source.
///
/// Every access recomputes the source's record count and compares it with
/// the count the cached space was built from. On mismatch the whole space
/// is rebuilt from scratch; otherwise the cached vocabulary and vectors are
/// returned as is. Edits that keep the count unchanged are not detected.
///
/// The check-and-rebuild sequence is not synchronized; callers sharing one
/// builder across threads wrap it in a lock.
pub struct VectorBuilder<S, P>
where
    S: RecordSource,
{
    model: ClusteredModel<S, P>,
    config: ComparisonConfig,
    /// record count of the last build, `None` until the first one
    key: Option<usize>,
    space: VectorSpace<S::Key>,
}

impl<S, P> VectorBuilder<S, P>
where
    S: RecordSource,
    S::Key: Send + Sync,
    P: FieldProjector<S::Record>,
{
    pub fn new(source: S, projector: P, config: ComparisonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model: ClusteredModel::new(source, projector),
            config,
            key: None,
            space: VectorSpace::empty(),
        })
    }

    /// Signature of the current source.
    pub fn generate_key(&self) -> usize {
        self.model.count()
    }

    /// Signature of the cached space, `None` before the first build.
    pub fn key(&self) -> Option<usize> {
        self.key
    }

    /// Rebuild unconditionally.
    /// On error the previous space is kept untouched.
    pub fn build_dataset(&mut self) -> Result<()> {
        let signature = self.generate_key();
        let dataset = self.model.dataset()?;
        let mut space = build_vector_space(&dataset, &self.config);
        space.signature = signature;
        debug!(
            previous = ?self.key,
            signature,
            records = space.len(),
            vocab = space.vocab_size(),
            "rebuilt vector space"
        );
        self.space = space;
        self.key = Some(signature);
        Ok(())
    }

    /// Rebuild if the signature changed, then return the space.
    pub fn flush(&mut self) -> Result<&VectorSpace<S::Key>> {
        let current = self.generate_key();
        if self.key != Some(current) {
            self.build_dataset()?;
        } else {
            trace!(signature = current, "vector space up to date");
        }
        Ok(&self.space)
    }

    /// Vocabulary of the up to date space.
    pub fn columns(&mut self) -> Result<&[String]> {
        Ok(self.flush()?.columns())
    }

    /// Term count vectors of the up to date space.
    pub fn dataset(&mut self) -> Result<&IndexMap<S::Key, Vec<u32>>> {
        Ok(self.flush()?.vectors())
    }

    /// Related ids of `target` in ascending score order, truncated to `limit`.
    pub fn related(&mut self, target: &S::Key, limit: Option<usize>) -> Result<Vec<S::Key>> {
        let mut related = compute_related(target, self.dataset()?)?;
        if let Some(limit) = limit {
            related.truncate(limit);
        }
        Ok(related)
    }

    /// Last built space without any staleness check.
    pub fn snapshot(&self) -> Option<&VectorSpace<S::Key>> {
        self.key.map(|_| &self.space)
    }

    /// Adopt a previously built space; its signature becomes the cached key.
    pub fn restore(&mut self, space: VectorSpace<S::Key>) {
        debug!(signature = space.signature, records = space.len(), "restored vector space");
        self.key = Some(space.signature);
        self.space = space;
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        self.model.source()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.model.source_mut()
    }
}
