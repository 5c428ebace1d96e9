//! Example demonstrating the document store over in-memory SQLite.
//!
//! Run with:
//!   cargo run --example sqlite_quickstart -p docsql

use docsql::{DocResult, DocumentStore, Field, SqliteClient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Person {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Age")]
    age: i64,
}

#[tokio::main]
async fn main() -> DocResult<()> {
    let store = DocumentStore::new(SqliteClient::open_in_memory()?);
    store.ensure_table("people").await?;

    for (id, name, age) in [("one", "Alice", 34), ("two", "Bob", 27), ("three", "Cleo", 41)] {
        store
            .insert(
                "people",
                &Person {
                    id: id.into(),
                    name: name.into(),
                    age,
                },
            )
            .await?;
    }

    let over_30: Vec<Person> = store
        .find_by_field("people", &Field::gt("Age", 30)?)
        .await?;
    println!("over 30: {over_30:?}");

    store
        .patch_by_id("people", "two", &serde_json::json!({"Age": 28}))
        .await?;
    let bob: Option<Person> = store.find_by_id("people", "two").await?;
    println!("after birthday: {bob:?}");

    store.delete_by_id("people", "three").await?;
    println!("remaining: {}", store.count_all("people").await?);

    Ok(())
}
