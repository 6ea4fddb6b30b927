use std::{collections::{BTreeMap, HashMap}, fmt::Display, hash::Hash};

use indexmap::IndexMap;

use crate::error::{ComparisonError, Result};

/// Record id -> flattened text blob, in source iteration order.
pub type Dataset<K> = IndexMap<K, String>;

/// Abstract collection of records ("queryset").
///
/// The engine only needs one pass over the records and a cheap count.
/// It never mutates the source.
pub trait RecordSource {
    type Key: Clone + Eq + Hash + Ord;
    type Record;

    /// Number of records currently in scope.
    fn count(&self) -> usize;

    /// Visit every record once, in a stable order.
    /// Stops at the first error returned by `visit`.
    fn try_for_each_record(
        &self,
        visit: &mut dyn FnMut(&Self::Key, &Self::Record) -> Result<()>,
    ) -> Result<()>;
}

impl<S> RecordSource for &S
where
    S: RecordSource + ?Sized,
{
    type Key = S::Key;
    type Record = S::Record;

    fn count(&self) -> usize {
        (**self).count()
    }

    fn try_for_each_record(
        &self,
        visit: &mut dyn FnMut(&Self::Key, &Self::Record) -> Result<()>,
    ) -> Result<()> {
        (**self).try_for_each_record(visit)
    }
}

impl<K, R> RecordSource for [(K, R)]
where
    K: Clone + Eq + Hash + Ord,
{
    type Key = K;
    type Record = R;

    fn count(&self) -> usize {
        self.len()
    }

    fn try_for_each_record(&self, visit: &mut dyn FnMut(&K, &R) -> Result<()>) -> Result<()> {
        self.iter().try_for_each(|(key, record)| visit(key, record))
    }
}

impl<K, R> RecordSource for Vec<(K, R)>
where
    K: Clone + Eq + Hash + Ord,
{
    type Key = K;
    type Record = R;

    fn count(&self) -> usize {
        self.len()
    }

    fn try_for_each_record(&self, visit: &mut dyn FnMut(&K, &R) -> Result<()>) -> Result<()> {
        self.as_slice().try_for_each_record(visit)
    }
}

impl<K, R> RecordSource for IndexMap<K, R>
where
    K: Clone + Eq + Hash + Ord,
{
    type Key = K;
    type Record = R;

    fn count(&self) -> usize {
        self.len()
    }

    fn try_for_each_record(&self, visit: &mut dyn FnMut(&K, &R) -> Result<()>) -> Result<()> {
        self.iter().try_for_each(|(key, record)| visit(key, record))
    }
}

impl<K, R> RecordSource for BTreeMap<K, R>
where
    K: Clone + Eq + Hash + Ord,
{
    type Key = K;
    type Record = R;

    fn count(&self) -> usize {
        self.len()
    }

    fn try_for_each_record(&self, visit: &mut dyn FnMut(&K, &R) -> Result<()>) -> Result<()> {
        self.iter().try_for_each(|(key, record)| visit(key, record))
    }
}

/// Turns one record into the ordered text of its compared fields.
///
/// Any `Fn(&R) -> Vec<String>` closure is a projector; `FieldList`
/// projects by field name for records implementing `FieldAccess`.
pub trait FieldProjector<R> {
    fn project(&self, record: &R) -> Result<Vec<String>>;
}

impl<R, F> FieldProjector<R> for F
where
    F: Fn(&R) -> Vec<String>,
{
    #[inline]
    fn project(&self, record: &R) -> Result<Vec<String>> {
        Ok(self(record))
    }
}

/// Named field lookup, already converted to text.
pub trait FieldAccess {
    fn field(&self, name: &str) -> Option<String>;
}

impl<V: Display> FieldAccess for HashMap<String, V> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }
}

impl<V: Display> FieldAccess for BTreeMap<String, V> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }
}

/// Ordered list of field names to compare on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    names: Vec<String>,
}

impl FieldList {
    pub fn new<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<R: FieldAccess> FieldProjector<R> for FieldList {
    fn project(&self, record: &R) -> Result<Vec<String>> {
        self.names
            .iter()
            .map(|name| {
                record.field(name).ok_or_else(|| ComparisonError::UnknownField {
                    field: name.clone(),
                })
            })
            .collect()
    }
}

/// Flatten every record of `source` into one space-joined text blob.
///
/// Single pass, no filtering and no tokenization.
pub fn extract_dataset<S, P>(source: &S, projector: &P) -> Result<Dataset<S::Key>>
where
    S: RecordSource + ?Sized,
    P: FieldProjector<S::Record> + ?Sized,
{
    let mut dataset = Dataset::with_capacity(source.count());
    source.try_for_each_record(&mut |key: &S::Key, record: &S::Record| {
        let fields = projector.project(record)?;
        dataset.insert(key.clone(), fields.join(" "));
        Ok(())
    })?;
    Ok(dataset)
}

/// A record source paired with the projector of its compared fields.
#[derive(Debug, Clone)]
pub struct ClusteredModel<S, P> {
    source: S,
    projector: P,
}

impl<S, P> ClusteredModel<S, P>
where
    S: RecordSource,
    P: FieldProjector<S::Record>,
{
    pub fn new(source: S, projector: P) -> Self {
        Self { source, projector }
    }

    /// Build a fresh dataset from the current content of the source.
    pub fn dataset(&self) -> Result<Dataset<S::Key>> {
        extract_dataset(&self.source, &self.projector)
    }

    pub fn count(&self) -> usize {
        self.source.count()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry {
        title: &'static str,
        content: &'static str,
        rating: u32,
    }

    impl FieldAccess for Entry {
        fn field(&self, name: &str) -> Option<String> {
            match name {
                "title" => Some(self.title.to_string()),
                "content" => Some(self.content.to_string()),
                "rating" => Some(self.rating.to_string()),
                _ => None,
            }
        }
    }

    fn entries() -> Vec<(u32, Entry)> {
        vec![
            (3, Entry { title: "Rust", content: "fast and safe", rating: 5 }),
            (1, Entry { title: "Python", content: "dynamic", rating: 4 }),
        ]
    }

    #[test]
    fn joins_fields_with_single_space_in_source_order() {
        let source = entries();
        let fields = FieldList::new(["title", "content", "rating"]);
        assert_eq!(fields.names(), &["title", "content", "rating"]);
        let dataset = extract_dataset(&source, &fields).unwrap();
        let keys: Vec<u32> = dataset.keys().copied().collect();
        assert_eq!(keys, vec![3, 1]);
        assert_eq!(dataset[&3], "Rust fast and safe 5");
        assert_eq!(dataset[&1], "Python dynamic 4");
    }

    #[test]
    fn closure_projector_converts_values_to_text() {
        let source = entries();
        let projector = |e: &Entry| vec![e.rating.to_string(), e.title.to_string()];
        let dataset = extract_dataset(&source, &projector).unwrap();
        assert_eq!(dataset[&1], "4 Python");
    }

    #[test]
    fn unknown_field_is_reported() {
        let source = entries();
        let err = extract_dataset(&source, &FieldList::new(["title", "slug"])).unwrap_err();
        assert!(matches!(err, ComparisonError::UnknownField { ref field } if field == "slug"));
    }

    #[test]
    fn empty_source_gives_empty_dataset() {
        let source: Vec<(u32, Entry)> = Vec::new();
        let dataset = extract_dataset(&source, &FieldList::new(["title"])).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn map_records_expose_fields_by_name() {
        let mut record = BTreeMap::new();
        record.insert("title".to_string(), "hello".to_string());
        record.insert("body".to_string(), "world".to_string());
        let source = vec![("a".to_string(), record)];
        let model = ClusteredModel::new(source, FieldList::new(["body", "title"]));
        assert_eq!(model.count(), 1);
        assert_eq!(model.dataset().unwrap()["a"], "world hello");
    }
}
