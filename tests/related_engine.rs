use std::cell::Cell;

use related_content::{
    build_vector_space, cached_related, compute_related, extract_dataset, pearson_score,
    ComparisonConfig, ComparisonError, Dataset, FieldAccess, FieldList, MemoryCache, RecordSource,
    Result, VectorBuilder,
};

struct Entry {
    title: String,
    content: String,
    tags: String,
}

impl FieldAccess for Entry {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            "content" => Some(self.content.clone()),
            "tags" => Some(self.tags.clone()),
            _ => None,
        }
    }
}

/// weblog entries keyed by primary key, counting full passes
struct Entries {
    rows: Vec<(u64, Entry)>,
    passes: Cell<usize>,
}

impl Entries {
    fn new() -> Self {
        Self { rows: Vec::new(), passes: Cell::new(0) }
    }

    fn push(&mut self, pk: u64, title: &str, content: &str, tags: &str) {
        self.rows.push((
            pk,
            Entry {
                title: title.to_string(),
                content: content.to_string(),
                tags: tags.to_string(),
            },
        ));
    }
}

impl RecordSource for Entries {
    type Key = u64;
    type Record = Entry;

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn try_for_each_record(&self, visit: &mut dyn FnMut(&u64, &Entry) -> Result<()>) -> Result<()> {
        self.passes.set(self.passes.get() + 1);
        self.rows.try_for_each_record(visit)
    }
}

fn weblog() -> Entries {
    let mut entries = Entries::new();
    entries.push(1, "Rust ownership", "borrow checker and lifetimes", "rust memory");
    entries.push(2, "Rust traits", "generic code with traits", "rust generics");
    entries.push(3, "Baking bread", "flour water salt yeast", "kitchen");
    entries.push(4, "Rust async", "futures and executors", "rust async");
    entries.push(5, "Sourdough", "yeast starter and flour", "kitchen bread");
    entries
}

fn fields() -> FieldList {
    FieldList::new(["title", "content", "tags"])
}

#[test]
fn vocabulary_respects_the_frequency_band() {
    let entries = weblog();
    let dataset = extract_dataset(&entries, &fields()).unwrap();
    let config = ComparisonConfig::new(0.2, 0.9).unwrap();
    let space = build_vector_space(&dataset, &config);

    let records = dataset.len() as f64;
    for (i, term) in space.columns().iter().enumerate() {
        let occurrences: u32 = space.vectors().values().map(|v| v[i]).sum();
        let f = occurrences as f64 / records;
        assert!(f > 0.2 && f < 0.9, "{term}: {f}");
    }
    // "rust" occurs 6 times over 5 entries -> 1.2, outside the band
    assert!(!space.columns().iter().any(|t| t == "rust"));
    assert!(space.columns().iter().any(|t| t == "kitchen"));
    assert!(space.vectors().values().all(|v| v.len() == space.vocab_size()));
}

#[test]
fn builder_reuses_space_until_the_count_changes() {
    let config = ComparisonConfig::new(0.1, 1.0).unwrap();
    let mut vb = VectorBuilder::new(weblog(), fields(), config).unwrap();

    let first = vb.columns().unwrap().to_vec();
    assert_eq!(vb.columns().unwrap(), first.as_slice());
    assert_eq!(vb.source().passes.get(), 1);

    vb.source_mut().push(6, "Rust macros", "declarative macros", "rust");
    let second = vb.columns().unwrap().to_vec();
    assert_eq!(vb.source().passes.get(), 2);
    assert_eq!(vb.key(), Some(6));
    assert!(second.iter().any(|t| t == "macros"));
    assert!(vb.dataset().unwrap().values().all(|v| v.len() == second.len()));
}

#[test]
fn related_entries_exclude_the_target() {
    let config = ComparisonConfig::new(0.1, 1.0).unwrap();
    let mut vb = VectorBuilder::new(weblog(), fields(), config).unwrap();
    for pk in 1..=5u64 {
        let related = vb.related(&pk, None).unwrap();
        assert!(!related.contains(&pk));
    }
    assert!(vb.related(&404, None).unwrap().is_empty());
}

#[test]
fn related_entries_are_in_ascending_score_order() {
    let config = ComparisonConfig::new(0.1, 1.0).unwrap();
    let mut vb = VectorBuilder::new(weblog(), fields(), config).unwrap();
    let vectors = vb.dataset().unwrap().clone();
    let target = &vectors[&1];

    let related = compute_related(&1, &vectors).unwrap();
    let scores: Vec<f64> = related
        .iter()
        .map(|pk| pearson_score(target, &vectors[pk]).unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{scores:?}");
    assert!(scores.iter().all(|s| *s != 0.0));
}

#[test]
fn three_record_ordering_is_low_score_first() {
    // target a, b strongly correlated with a, c weakly
    let vectors: indexmap::IndexMap<&str, Vec<u32>> = [
        ("a", vec![1, 2, 3, 4, 5]),
        ("b", vec![1, 2, 3, 5, 4]),
        ("c", vec![2, 1, 3, 5, 1]),
    ]
    .into_iter()
    .collect();
    let sb = pearson_score(&vectors["a"], &vectors["b"]).unwrap();
    let sc = pearson_score(&vectors["a"], &vectors["c"]).unwrap();
    assert!(sb > sc && sc != 0.0);
    assert_eq!(compute_related(&"a", &vectors).unwrap(), vec!["c", "b"]);
}

#[test]
fn empty_source_is_not_an_error() {
    let entries = Entries::new();
    let dataset: Dataset<u64> = extract_dataset(&entries, &fields()).unwrap();
    assert!(dataset.is_empty());

    let space = build_vector_space(&dataset, &ComparisonConfig::default());
    assert!(space.columns().is_empty());
    assert!(space.vectors().is_empty());

    let mut vb = VectorBuilder::new(entries, fields(), ComparisonConfig::default()).unwrap();
    assert!(vb.related(&1, None).unwrap().is_empty());
}

#[test]
fn unknown_field_surfaces_from_the_builder() {
    let mut vb = VectorBuilder::new(
        weblog(),
        FieldList::new(["title", "excerpt"]),
        ComparisonConfig::default(),
    )
    .unwrap();
    assert!(matches!(vb.flush(), Err(ComparisonError::UnknownField { .. })));
}

#[test]
fn cached_related_matches_direct_ranking() {
    let cache = MemoryCache::new();
    let config = ComparisonConfig::new(0.1, 1.0).unwrap();
    let mut vb = VectorBuilder::new(weblog(), fields(), config).unwrap();

    let direct = vb.related(&3, None).unwrap();
    let cached = cached_related(&cache, &mut vb, &3, None).unwrap();
    assert_eq!(cached, direct);
    let again = cached_related(&cache, &mut vb, &3, Some(2)).unwrap();
    assert_eq!(again, direct.iter().copied().take(2).collect::<Vec<_>>());
    assert_eq!(vb.source().passes.get(), 1);
}
