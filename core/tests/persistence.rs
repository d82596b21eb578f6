use boolcore::persist::{load_index, load_snapshot, save_index, IndexPaths, SnapshotFormat};
use boolcore::{merge_with, BooleanIndex, MergeMode};
use tempfile::tempdir;

fn sample() -> BooleanIndex {
    let mut idx = BooleanIndex::new();
    for (term, doc) in [("zebra", 5), ("apple", 3), ("zebra", 3), ("mango", 10)] {
        idx.add_term_occurrence(term, doc);
    }
    idx
}

fn round_trip(format: SnapshotFormat) {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let idx = sample();
    save_index(&paths, &idx, format, "2024-01-01T00:00:00Z".into()).unwrap();

    let back: BooleanIndex = load_index(&paths).unwrap();
    // Insertion order survives, not sorted order.
    assert_eq!(back.terms(), vec!["zebra", "apple", "mango"]);
    assert_eq!(back.documents(), vec![5, 3, 10]);
    assert_eq!(back.generate_feature_matrix(), idx.generate_feature_matrix());
    assert_eq!(back, idx);
}

#[test]
fn json_round_trip() {
    round_trip(SnapshotFormat::Json);
}

#[test]
fn bincode_round_trip() {
    round_trip(SnapshotFormat::Bincode);
}

#[test]
fn summed_values_survive_snapshot() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let idx = sample();
    let merged = merge_with([&idx, &idx], MergeMode::LegacySum);
    save_index(&paths, &merged, SnapshotFormat::Json, String::new()).unwrap();

    let (snapshot, meta) = load_snapshot::<u32>(&paths).unwrap();
    assert_eq!(meta.num_docs, 3);
    assert_eq!(meta.num_terms, 3);
    assert_eq!(snapshot.terms["zebra"][&3u32], 2);
    assert_eq!(snapshot.documents[&10u32], 2);
}

#[test]
fn string_document_ids_round_trip() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut idx: BooleanIndex<String> = BooleanIndex::new();
    idx.add_term_occurrence("hello", "b.txt".into());
    idx.add_term_occurrence("hello", "a.txt".into());
    save_index(&paths, &idx, SnapshotFormat::Json, String::new()).unwrap();

    let back: BooleanIndex<String> = load_index(&paths).unwrap();
    assert_eq!(back.documents(), vec!["b.txt", "a.txt"]);
}
