use super::*;
use crate::vector_store::Payload;

fn point(vector: Vec<f32>, label: &str) -> PointStruct {
    let mut payload = Payload::new();
    payload.insert("label".to_string(), Value::String(label.to_string()));
    PointStruct::new(vector, payload)
}

fn label(point: &ScoredPoint) -> &str {
    point
        .payload
        .as_ref()
        .and_then(|p| p.get("label"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[test]
fn collection_lifecycle() {
    let backend = MemoryBackend::new();
    assert!(
        backend
            .describe_collection("docs")
            .expect("describe should work")
            .is_none()
    );

    backend
        .create_collection("docs", &VectorParams::cosine(2))
        .expect("create should work");
    let info = backend
        .describe_collection("docs")
        .expect("describe should work")
        .expect("collection exists");
    assert_eq!(info.vector_params(), VectorParams::cosine(2));
    assert_eq!(info.points_count, Some(0));

    backend.delete_collection("docs").expect("delete should work");
    backend
        .delete_collection("docs")
        .expect("deleting twice is fine");
    assert!(
        backend
            .collection_names()
            .expect("names should list")
            .is_empty()
    );
}

#[test]
fn create_twice_fails() {
    let backend = MemoryBackend::new();
    backend
        .create_collection("docs", &VectorParams::cosine(2))
        .expect("create should work");
    assert!(
        backend
            .create_collection("docs", &VectorParams::cosine(2))
            .is_err()
    );
}

#[test]
fn search_orders_by_cosine_similarity() {
    let backend = MemoryBackend::new();
    backend
        .create_collection("docs", &VectorParams::cosine(2))
        .expect("create should work");
    backend
        .upsert_points(
            "docs",
            &[
                point(vec![0.0, 1.0], "up"),
                point(vec![1.0, 0.0], "right"),
                point(vec![1.0, 1.0], "diagonal"),
            ],
        )
        .expect("upsert should work");

    let results = backend
        .search_points("docs", &[1.0, 0.1], 2)
        .expect("search should work");

    assert_eq!(results.len(), 2);
    assert_eq!(label(&results[0]), "right");
    assert_eq!(label(&results[1]), "diagonal");
    assert!(results[0].score > results[1].score);
}

#[test]
fn upsert_replaces_points_with_same_id() {
    let backend = MemoryBackend::new();
    backend
        .create_collection("docs", &VectorParams::cosine(2))
        .expect("create should work");

    let mut first = point(vec![1.0, 0.0], "old");
    backend
        .upsert_points("docs", std::slice::from_ref(&first))
        .expect("upsert should work");
    first.payload.insert("label".to_string(), Value::String("new".to_string()));
    backend
        .upsert_points("docs", &[first])
        .expect("upsert should work");

    assert_eq!(backend.count_points("docs").expect("count should work"), 1);
    let results = backend
        .search_points("docs", &[1.0, 0.0], 4)
        .expect("search should work");
    assert_eq!(label(&results[0]), "new");
}

#[test]
fn wrong_dimension_writes_nothing() {
    let backend = MemoryBackend::new();
    backend
        .create_collection("docs", &VectorParams::cosine(2))
        .expect("create should work");

    let result = backend.upsert_points(
        "docs",
        &[point(vec![1.0, 0.0], "ok"), point(vec![1.0, 0.0, 0.0], "bad")],
    );
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
    assert_eq!(backend.count_points("docs").expect("count should work"), 0);
}

#[test]
fn missing_collection_operations_fail() {
    let backend = MemoryBackend::new();
    assert!(backend.count_points("nope").is_err());
    assert!(backend.search_points("nope", &[1.0], 1).is_err());
    assert!(backend.upsert_points("nope", &[]).is_err());
}

#[test]
fn distance_scores_prefer_closer_vectors() {
    let near = [1.0, 1.0];
    let far = [5.0, 5.0];
    let query = [1.0, 1.5];

    for distance in [Distance::Euclid, Distance::Manhattan] {
        assert!(score(distance, &query, &near) > score(distance, &query, &far));
    }
    assert!(score(Distance::Dot, &query, &far) > score(Distance::Dot, &query, &near));
    assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
}
