//! Document store integration tests against in-memory SQLite.

use docsql::{DocError, DocumentIndexKind, DocumentStore, Field, SqlParam, SqliteClient, query};
use serde::{Deserialize, Serialize};

const TABLE: &str = "test_table";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SubDoc {
    #[serde(rename = "Foo")]
    foo: String,
    #[serde(rename = "Bar")]
    bar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestDoc {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "NumValue")]
    num_value: i64,
    #[serde(rename = "Sub", skip_serializing_if = "Option::is_none")]
    sub: Option<SubDoc>,
}

impl TestDoc {
    fn new(id: &str, value: &str, num_value: i64, sub: Option<SubDoc>) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
            num_value,
            sub,
        }
    }
}

fn test_docs() -> Vec<TestDoc> {
    vec![
        TestDoc::new("one", "FIRST!", 0, None),
        TestDoc::new(
            "two",
            "another",
            10,
            Some(SubDoc {
                foo: "green".into(),
                bar: "blue".into(),
            }),
        ),
        TestDoc::new("three", "", 4, None),
        TestDoc::new(
            "four",
            "purple",
            17,
            Some(SubDoc {
                foo: "green".into(),
                bar: "red".into(),
            }),
        ),
        TestDoc::new("five", "purple", 18, None),
    ]
}

async fn store_with_docs() -> DocumentStore<SqliteClient> {
    let store = DocumentStore::new(SqliteClient::open_in_memory().expect("open sqlite"));
    store.ensure_table(TABLE).await.expect("ensure table");
    for doc in test_docs() {
        store.insert(TABLE, &doc).await.expect("insert");
    }
    store
}

#[tokio::test]
async fn ensure_table_is_idempotent() {
    let store = DocumentStore::new(SqliteClient::open_in_memory().unwrap());
    store.ensure_table(TABLE).await.expect("first");
    store.ensure_table(TABLE).await.expect("second");
    assert_eq!(store.count_all(TABLE).await.unwrap(), 0);
}

#[tokio::test]
async fn ensure_field_index_is_idempotent() {
    let store = store_with_docs().await;
    store
        .ensure_field_index(TABLE, "idx_test_value", &["Value"])
        .await
        .expect("first");
    store
        .ensure_field_index(TABLE, "idx_test_value", &["Value"])
        .await
        .expect("second");
}

#[tokio::test]
async fn document_index_is_unsupported() {
    let store = store_with_docs().await;
    let err = store
        .ensure_document_index(TABLE, DocumentIndexKind::Full)
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[tokio::test]
async fn insert_then_find_by_id_round_trips() {
    let store = store_with_docs().await;
    let found: Option<TestDoc> = store.find_by_id(TABLE, "two").await.unwrap();
    assert_eq!(found, Some(test_docs()[1].clone()));
}

#[tokio::test]
async fn insert_duplicate_id_propagates_backend_error() {
    let store = store_with_docs().await;
    let err = store
        .insert(TABLE, &TestDoc::new("one", "again", 0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DocError::Sqlite(_)));
}

#[tokio::test]
async fn save_is_idempotent_keeping_last_content() {
    let store = DocumentStore::new(SqliteClient::open_in_memory().unwrap());
    store.ensure_table(TABLE).await.unwrap();

    store
        .save(TABLE, &TestDoc::new("one", "first", 1, None))
        .await
        .unwrap();
    store
        .save(TABLE, &TestDoc::new("one", "second", 2, None))
        .await
        .unwrap();

    assert_eq!(store.count_all(TABLE).await.unwrap(), 1);
    let found: Option<TestDoc> = store.find_by_id(TABLE, "one").await.unwrap();
    assert_eq!(found.unwrap().value, "second");
}

#[tokio::test]
async fn find_all_returns_every_document() {
    let store = store_with_docs().await;
    let mut all: Vec<TestDoc> = store.find_all(TABLE).await.unwrap();
    all.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(all.len(), 5);
    let mut expected = test_docs();
    expected.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(all, expected);
}

#[tokio::test]
async fn find_by_field_equality() {
    let store = store_with_docs().await;
    let purple: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::eq("Value", "purple").unwrap())
        .await
        .unwrap();
    assert_eq!(purple.len(), 2);
    assert!(purple.iter().all(|d| d.value == "purple"));
}

#[tokio::test]
async fn find_by_field_numeric_comparison() {
    let store = store_with_docs().await;
    let over_ten: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::gt("NumValue", 10).unwrap())
        .await
        .unwrap();
    assert_eq!(over_ten.len(), 2);
    assert!(over_ten.iter().all(|d| d.num_value > 10));
}

#[tokio::test]
async fn find_by_field_between() {
    let store = store_with_docs().await;
    let mid: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::between("NumValue", 4, 10).unwrap())
        .await
        .unwrap();
    let mut ids: Vec<&str> = mid.iter().map(|d| d.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["three", "two"]);
}

#[tokio::test]
async fn find_by_field_in_list() {
    let store = store_with_docs().await;
    let some: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::in_list("Id", ["one", "five", "nope"]).unwrap())
        .await
        .unwrap();
    assert_eq!(some.len(), 2);
}

#[tokio::test]
async fn find_by_field_nested_path() {
    let store = store_with_docs().await;
    let green: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::eq("Sub.Foo", "green").unwrap())
        .await
        .unwrap();
    assert_eq!(green.len(), 2);
}

#[tokio::test]
async fn find_by_field_existence() {
    let store = store_with_docs().await;
    let with_sub: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::exists("Sub").unwrap())
        .await
        .unwrap();
    assert_eq!(with_sub.len(), 2);

    let without_sub: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::not_exists("Sub").unwrap())
        .await
        .unwrap();
    assert_eq!(without_sub.len(), 3);
}

#[tokio::test]
async fn find_first_by_field_surfaces_one_of_many() {
    let store = store_with_docs().await;
    let first: Option<TestDoc> = store
        .find_first_by_field(TABLE, &Field::eq("Value", "purple").unwrap())
        .await
        .unwrap();
    assert_eq!(first.unwrap().value, "purple");

    let none: Option<TestDoc> = store
        .find_first_by_field(TABLE, &Field::eq("Value", "absent").unwrap())
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn count_then_delete_by_field_scenario() {
    let store = store_with_docs().await;
    let purple = Field::eq("Value", "purple").unwrap();

    assert_eq!(store.count_by_field(TABLE, &purple).await.unwrap(), 2);
    assert_eq!(store.delete_by_field(TABLE, &purple).await.unwrap(), 2);
    assert_eq!(store.count_all(TABLE).await.unwrap(), 3);
}

#[tokio::test]
async fn exists_by_id_lifecycle() {
    let store = store_with_docs().await;
    assert!(store.exists_by_id(TABLE, "three").await.unwrap());
    assert_eq!(store.count_by_id(TABLE, "three").await.unwrap(), 1);
    store.delete_by_id(TABLE, "three").await.unwrap();
    assert!(!store.exists_by_id(TABLE, "three").await.unwrap());
    assert_eq!(store.count_by_id(TABLE, "three").await.unwrap(), 0);
}

#[tokio::test]
async fn uuid_keys_round_trip() {
    let store = DocumentStore::new(SqliteClient::open_in_memory().unwrap());
    store.ensure_table(TABLE).await.unwrap();

    let id = uuid::Uuid::new_v4().to_string();
    store
        .insert(TABLE, &TestDoc::new(&id, "ephemeral", 1, None))
        .await
        .unwrap();

    assert!(store.exists_by_id(TABLE, &id).await.unwrap());
    let found: Option<TestDoc> = store.find_by_id(TABLE, &id).await.unwrap();
    assert_eq!(found.unwrap().id, id);
}

#[tokio::test]
async fn exists_by_field() {
    let store = store_with_docs().await;
    assert!(
        store
            .exists_by_field(TABLE, &Field::gte("NumValue", 18).unwrap())
            .await
            .unwrap()
    );
    assert!(
        !store
            .exists_by_field(TABLE, &Field::gt("NumValue", 100).unwrap())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn update_by_id_replaces_whole_document() {
    let store = store_with_docs().await;
    let replacement = TestDoc::new("one", "replaced", 99, None);
    assert_eq!(
        store.update_by_id(TABLE, "one", &replacement).await.unwrap(),
        1
    );
    let found: Option<TestDoc> = store.find_by_id(TABLE, "one").await.unwrap();
    assert_eq!(found, Some(replacement));
}

#[tokio::test]
async fn update_by_id_missing_document_affects_nothing() {
    let store = store_with_docs().await;
    let doc = TestDoc::new("nope", "x", 0, None);
    assert_eq!(store.update_by_id(TABLE, "nope", &doc).await.unwrap(), 0);
    assert_eq!(store.count_all(TABLE).await.unwrap(), 5);
}

#[tokio::test]
async fn patch_by_id_changes_only_named_fields() {
    let store = store_with_docs().await;
    store
        .patch_by_id(TABLE, "four", &serde_json::json!({"NumValue": 44}))
        .await
        .unwrap();

    let patched: TestDoc = store.find_by_id(TABLE, "four").await.unwrap().unwrap();
    let mut expected = test_docs()[3].clone();
    expected.num_value = 44;
    assert_eq!(patched, expected);
}

#[tokio::test]
async fn patch_by_field_touches_every_match() {
    let store = store_with_docs().await;
    let purple = Field::eq("Value", "purple").unwrap();
    assert_eq!(
        store
            .patch_by_field(TABLE, &purple, &serde_json::json!({"NumValue": 77}))
            .await
            .unwrap(),
        2
    );
    let updated: Vec<TestDoc> = store
        .find_by_field(TABLE, &Field::eq("NumValue", 77).unwrap())
        .await
        .unwrap();
    assert_eq!(updated.len(), 2);
}

#[tokio::test]
async fn remove_fields_by_id() {
    let store = store_with_docs().await;
    store
        .remove_fields_by_id(TABLE, "two", &["Sub", "Value"])
        .await
        .unwrap();

    let slim: serde_json::Value = store
        .find_by_id::<serde_json::Value, _>(TABLE, "two")
        .await
        .unwrap()
        .unwrap();
    assert!(slim.get("Sub").is_none());
    assert!(slim.get("Value").is_none());
    assert_eq!(slim.get("NumValue"), Some(&serde_json::json!(10)));
}

#[tokio::test]
async fn remove_absent_field_is_not_an_error() {
    let store = store_with_docs().await;
    assert_eq!(
        store
            .remove_fields_by_id(TABLE, "one", &["AWayOutThere"])
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn remove_fields_by_field() {
    let store = store_with_docs().await;
    let purple = Field::eq("Value", "purple").unwrap();
    assert_eq!(
        store
            .remove_fields_by_field(TABLE, &purple, &["Sub"])
            .await
            .unwrap(),
        2
    );
    let four: serde_json::Value = store
        .find_by_id::<serde_json::Value, _>(TABLE, "four")
        .await
        .unwrap()
        .unwrap();
    assert!(four.get("Sub").is_none());
}

#[tokio::test]
async fn remove_fields_rejects_nested_names() {
    let store = store_with_docs().await;
    let err = store
        .remove_fields_by_id(TABLE, "two", &["Sub.Foo"])
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn delete_by_id_removes_one_row() {
    let store = store_with_docs().await;
    assert_eq!(store.delete_by_id(TABLE, "four").await.unwrap(), 1);
    assert_eq!(store.count_all(TABLE).await.unwrap(), 4);
    assert_eq!(store.delete_by_id(TABLE, "four").await.unwrap(), 0);
}

#[tokio::test]
async fn json_queries_are_unsupported() {
    let store = store_with_docs().await;
    let err = store
        .find_by_contains::<TestDoc, _>(TABLE, &serde_json::json!({"Value": "purple"}))
        .await
        .unwrap_err();
    assert!(err.is_unsupported());

    let err = store
        .count_by_json_path(TABLE, "$.NumValue ? (@ > 5)")
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[tokio::test]
async fn raw_sql_shares_the_typed_pipeline() {
    let store = store_with_docs().await;
    let purple: Vec<TestDoc> = query("SELECT data FROM test_table WHERE json_extract(data, '$.Value') = ?1")
        .bind(SqlParam::Text("purple".into()))
        .fetch_all_as(store.client())
        .await
        .unwrap();
    assert_eq!(purple.len(), 2);

    let count: i64 = query("SELECT COUNT(*) FROM test_table")
        .fetch_scalar_or_default(store.client())
        .await
        .unwrap();
    assert_eq!(count, 5);
}

#[tokio::test]
async fn numeric_document_ids_match_after_string_coercion() {
    let store = DocumentStore::new(SqliteClient::open_in_memory().unwrap());
    store.ensure_table(TABLE).await.unwrap();
    store
        .insert(TABLE, &serde_json::json!({"Id": 18, "Value": "numeric"}))
        .await
        .unwrap();

    assert!(store.exists_by_id(TABLE, 18).await.unwrap());
    let found: Option<serde_json::Value> = store.find_by_id(TABLE, "18").await.unwrap();
    assert_eq!(found.unwrap()["Value"], "numeric");
}
