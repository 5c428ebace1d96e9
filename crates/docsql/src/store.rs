//! The typed document store API.
//!
//! [`DocumentStore`] ties the query builders, the parameter binder, and the
//! execution pipeline together, one statement per operation. Configuration
//! is an explicit value owned by the store; there is no process-global
//! state to establish before use.

use crate::builder;
use crate::builder::DocumentIndexKind;
use crate::client::DocumentClient;
use crate::dialect::Dialect;
use crate::error::DocResult;
use crate::field::Field;
use crate::param::{doc_param, field_params, id_param, json_path_param, remove_fields_params};
use crate::query::Query;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// The document field carrying the key. Defaults to `"Id"`.
    pub key_field: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_field: "Id".to_string(),
        }
    }
}

/// A document store over one [`DocumentClient`].
///
/// The client may be an owned connection, a borrowed one (`&Client`), or a
/// pool wrapper; the store issues exactly one statement per operation and
/// imposes no transaction or locking discipline of its own.
///
/// # Example
/// ```ignore
/// let store = DocumentStore::new(SqliteClient::open_in_memory()?);
/// store.ensure_table("people").await?;
/// store.insert("people", &person).await?;
/// let found: Option<Person> = store.find_by_id("people", "one").await?;
/// ```
pub struct DocumentStore<C> {
    client: C,
    config: StoreConfig,
}

impl<C: DocumentClient> DocumentStore<C> {
    /// Create a store with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, StoreConfig::default())
    }

    /// Create a store with an explicit configuration.
    pub fn with_config(client: C, config: StoreConfig) -> Self {
        Self { client, config }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn dialect(&self) -> Dialect {
        self.client.dialect()
    }

    fn key(&self) -> &str {
        &self.config.key_field
    }

    // ==================== Definition ====================

    /// Create the document table and its unique key index if absent.
    ///
    /// Idempotent: re-invocation after the objects exist is a no-op.
    pub async fn ensure_table(&self, table: &str) -> DocResult<()> {
        Query::new(builder::table_ddl(self.dialect(), table))
            .execute(&self.client)
            .await?;
        Query::new(builder::key_index_ddl(self.dialect(), table, self.key())?)
            .execute(&self.client)
            .await?;
        Ok(())
    }

    /// Create an index over the given field paths if absent.
    pub async fn ensure_field_index(
        &self,
        table: &str,
        index_name: &str,
        paths: &[&str],
    ) -> DocResult<()> {
        Query::new(builder::field_index_ddl(
            self.dialect(),
            table,
            index_name,
            paths,
        )?)
        .execute(&self.client)
        .await?;
        Ok(())
    }

    /// Create a GIN document index if absent. PostgreSQL only.
    pub async fn ensure_document_index(
        &self,
        table: &str,
        kind: DocumentIndexKind,
    ) -> DocResult<()> {
        Query::new(builder::document_index_ddl(self.dialect(), table, kind)?)
            .execute(&self.client)
            .await?;
        Ok(())
    }

    // ==================== Writes ====================

    /// Insert a new document.
    ///
    /// A document whose key already exists fails with the backend's own
    /// unique-constraint error, propagated verbatim.
    pub async fn insert<T: Serialize + Sync>(&self, table: &str, doc: &T) -> DocResult<()> {
        Query::new(builder::insert(self.dialect(), table))
            .bind(doc_param(doc)?)
            .execute(&self.client)
            .await?;
        Ok(())
    }

    /// Insert or replace a document, keyed by its key field.
    pub async fn save<T: Serialize + Sync>(&self, table: &str, doc: &T) -> DocResult<()> {
        Query::new(builder::save(self.dialect(), table, self.key())?)
            .bind(doc_param(doc)?)
            .execute(&self.client)
            .await?;
        Ok(())
    }

    /// Replace the full payload of the document with the given ID.
    ///
    /// Returns the affected-row count (0 when no such document exists).
    pub async fn update_by_id<T: Serialize + Sync, K: ToString + Send>(
        &self,
        table: &str,
        id: K,
        doc: &T,
    ) -> DocResult<u64> {
        Query::new(builder::update_by_id(self.dialect(), table, self.key())?)
            .bind(doc_param(doc)?)
            .bind(id_param(id))
            .execute(&self.client)
            .await
    }

    /// Merge-patch the document with the given ID.
    ///
    /// Only the fields present in `patch` change; siblings are untouched.
    pub async fn patch_by_id<P: Serialize + Sync, K: ToString + Send>(
        &self,
        table: &str,
        id: K,
        patch: &P,
    ) -> DocResult<u64> {
        Query::new(builder::patch_by_id(self.dialect(), table, self.key())?)
            .bind(doc_param(patch)?)
            .bind(id_param(id))
            .execute(&self.client)
            .await
    }

    /// Merge-patch every document matching a field predicate.
    pub async fn patch_by_field<P: Serialize + Sync>(
        &self,
        table: &str,
        field: &Field,
        patch: &P,
    ) -> DocResult<u64> {
        Query::new(builder::patch_by_field(self.dialect(), table, field)?)
            .bind(doc_param(patch)?)
            .bind_all(field_params(self.dialect(), field))
            .execute(&self.client)
            .await
    }

    /// Remove top-level fields from the document with the given ID.
    ///
    /// Removing a field that is already absent is not an error.
    pub async fn remove_fields_by_id<K: ToString + Send>(
        &self,
        table: &str,
        id: K,
        field_names: &[&str],
    ) -> DocResult<u64> {
        let params = remove_fields_params(self.dialect(), field_names)?;
        Query::new(builder::remove_fields_by_id(
            self.dialect(),
            table,
            self.key(),
            field_names.len(),
        )?)
        .bind_all(params)
        .bind(id_param(id))
        .execute(&self.client)
        .await
    }

    /// Remove top-level fields from every document matching a predicate.
    pub async fn remove_fields_by_field(
        &self,
        table: &str,
        field: &Field,
        field_names: &[&str],
    ) -> DocResult<u64> {
        let params = remove_fields_params(self.dialect(), field_names)?;
        Query::new(builder::remove_fields_by_field(
            self.dialect(),
            table,
            field,
            field_names.len(),
        )?)
        .bind_all(params)
        .bind_all(field_params(self.dialect(), field))
        .execute(&self.client)
        .await
    }

    // ==================== Counts / existence ====================

    /// Count every document in the table.
    pub async fn count_all(&self, table: &str) -> DocResult<i64> {
        Query::new(builder::count_all(table))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Count documents with the given ID (0 or 1 under the unique key index).
    pub async fn count_by_id<K: ToString + Send>(&self, table: &str, id: K) -> DocResult<i64> {
        Query::new(builder::count_by_id(self.dialect(), table, self.key())?)
            .bind(id_param(id))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Count documents matching a field predicate.
    pub async fn count_by_field(&self, table: &str, field: &Field) -> DocResult<i64> {
        Query::new(builder::count_by_field(self.dialect(), table, field)?)
            .bind_all(field_params(self.dialect(), field))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Count documents containing the given partial shape. PostgreSQL only.
    pub async fn count_by_contains<V: Serialize + Sync>(
        &self,
        table: &str,
        criteria: &V,
    ) -> DocResult<i64> {
        Query::new(builder::count_by_contains(self.dialect(), table)?)
            .bind(doc_param(criteria)?)
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Count documents matching a JSON path. PostgreSQL only.
    pub async fn count_by_json_path(&self, table: &str, path: &str) -> DocResult<i64> {
        Query::new(builder::count_by_json_path(self.dialect(), table)?)
            .bind(json_path_param(path))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Whether a document with the given ID exists.
    pub async fn exists_by_id<K: ToString + Send>(&self, table: &str, id: K) -> DocResult<bool> {
        Query::new(builder::exists_by_id(self.dialect(), table, self.key())?)
            .bind(id_param(id))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Whether any document matches a field predicate.
    pub async fn exists_by_field(&self, table: &str, field: &Field) -> DocResult<bool> {
        Query::new(builder::exists_by_field(self.dialect(), table, field)?)
            .bind_all(field_params(self.dialect(), field))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Whether any document contains the given shape. PostgreSQL only.
    pub async fn exists_by_contains<V: Serialize + Sync>(
        &self,
        table: &str,
        criteria: &V,
    ) -> DocResult<bool> {
        Query::new(builder::exists_by_contains(self.dialect(), table)?)
            .bind(doc_param(criteria)?)
            .fetch_scalar_or_default(&self.client)
            .await
    }

    /// Whether any document matches a JSON path. PostgreSQL only.
    pub async fn exists_by_json_path(&self, table: &str, path: &str) -> DocResult<bool> {
        Query::new(builder::exists_by_json_path(self.dialect(), table)?)
            .bind(json_path_param(path))
            .fetch_scalar_or_default(&self.client)
            .await
    }

    // ==================== Reads ====================

    /// Fetch every document in the table, in row order.
    pub async fn find_all<T: DeserializeOwned>(&self, table: &str) -> DocResult<Vec<T>> {
        Query::new(builder::select_all(table))
            .fetch_all_as(&self.client)
            .await
    }

    /// Fetch the document with the given ID, if any.
    pub async fn find_by_id<T: DeserializeOwned, K: ToString + Send>(
        &self,
        table: &str,
        id: K,
    ) -> DocResult<Option<T>> {
        Query::new(builder::select_by_id(self.dialect(), table, self.key())?)
            .bind(id_param(id))
            .fetch_opt_as(&self.client)
            .await
    }

    /// Fetch every document matching a field predicate.
    pub async fn find_by_field<T: DeserializeOwned>(
        &self,
        table: &str,
        field: &Field,
    ) -> DocResult<Vec<T>> {
        Query::new(builder::select_by_field(self.dialect(), table, field)?)
            .bind_all(field_params(self.dialect(), field))
            .fetch_all_as(&self.client)
            .await
    }

    /// Fetch the first document matching a field predicate, if any.
    ///
    /// Multiple matches are not an error; only the first row is surfaced.
    pub async fn find_first_by_field<T: DeserializeOwned>(
        &self,
        table: &str,
        field: &Field,
    ) -> DocResult<Option<T>> {
        Query::new(builder::select_by_field(self.dialect(), table, field)?)
            .bind_all(field_params(self.dialect(), field))
            .fetch_opt_as(&self.client)
            .await
    }

    /// Fetch every document containing the given shape. PostgreSQL only.
    pub async fn find_by_contains<T: DeserializeOwned, V: Serialize + Sync>(
        &self,
        table: &str,
        criteria: &V,
    ) -> DocResult<Vec<T>> {
        Query::new(builder::select_by_contains(self.dialect(), table)?)
            .bind(doc_param(criteria)?)
            .fetch_all_as(&self.client)
            .await
    }

    /// Fetch every document matching a JSON path. PostgreSQL only.
    pub async fn find_by_json_path<T: DeserializeOwned>(
        &self,
        table: &str,
        path: &str,
    ) -> DocResult<Vec<T>> {
        Query::new(builder::select_by_json_path(self.dialect(), table)?)
            .bind(json_path_param(path))
            .fetch_all_as(&self.client)
            .await
    }

    // ==================== Deletes ====================

    /// Delete the document with the given ID.
    pub async fn delete_by_id<K: ToString + Send>(&self, table: &str, id: K) -> DocResult<u64> {
        Query::new(builder::delete_by_id(self.dialect(), table, self.key())?)
            .bind(id_param(id))
            .execute(&self.client)
            .await
    }

    /// Delete every document matching a field predicate.
    pub async fn delete_by_field(&self, table: &str, field: &Field) -> DocResult<u64> {
        Query::new(builder::delete_by_field(self.dialect(), table, field)?)
            .bind_all(field_params(self.dialect(), field))
            .execute(&self.client)
            .await
    }

    /// Delete every document containing the given shape. PostgreSQL only.
    pub async fn delete_by_contains<V: Serialize + Sync>(
        &self,
        table: &str,
        criteria: &V,
    ) -> DocResult<u64> {
        Query::new(builder::delete_by_contains(self.dialect(), table)?)
            .bind(doc_param(criteria)?)
            .execute(&self.client)
            .await
    }

    /// Delete every document matching a JSON path. PostgreSQL only.
    pub async fn delete_by_json_path(&self, table: &str, path: &str) -> DocResult<u64> {
        Query::new(builder::delete_by_json_path(self.dialect(), table)?)
            .bind(json_path_param(path))
            .execute(&self.client)
            .await
    }
}
