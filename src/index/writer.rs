//! Document writes through the admin client

use super::accessor::{administratable_index, IndexHandle};
use super::attributes::{configure_attributes_and_index_if_needed, set_filterable_attributes};
use crate::credentials::SearchClients;
use crate::documents::{stringify, IndexableDocument, Searchable, SearchableType, OBJECT_CLASS_FIELD};
use crate::engines::{IndexStats, TaskInfo};
use crate::error::{Result, SearchError};
use std::time::Instant;
use tracing::{debug, info};

/// Documents submitted per write call during a reindex
pub const REINDEX_BATCH_SIZE: usize = 100;

/// Check that every document names its type and carries the index primary key
pub fn validate_documents(documents: &[IndexableDocument], primary_key: &str) -> Result<()> {
    for (position, doc) in documents.iter().enumerate() {
        if doc.object_class().map_or(true, str::is_empty) {
            return Err(SearchError::MalformedDocument(format!(
                "document {} has no `{}`",
                position, OBJECT_CLASS_FIELD
            )));
        }
        if doc.get(primary_key).map_or(true, |v| v.is_null()) {
            return Err(SearchError::MalformedDocument(format!(
                "document {} has no `{}`",
                position, primary_key
            )));
        }
    }
    Ok(())
}

/// Writes records of [`Searchable`] types to their indexes
#[derive(Debug, Clone)]
pub struct Indexer {
    clients: SearchClients,
}

impl Indexer {
    pub fn new(clients: SearchClients) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &SearchClients {
        &self.clients
    }

    /// Admin-bound index of `ty`
    pub fn index(&self, ty: &SearchableType) -> Result<IndexHandle> {
        administratable_index(&self.clients, ty)
    }

    /// Index one record, creating and configuring its index first if needed
    pub async fn add_record<T: Searchable>(&self, record: &T) -> Result<TaskInfo> {
        let ty = T::searchable_type();
        let index = self.index(&ty)?;
        configure_attributes_and_index_if_needed(&index, &ty).await?;
        index.add_documents(&[record.to_indexable_document()]).await
    }

    pub async fn add_record_and_wait<T: Searchable>(&self, record: &T) -> Result<TaskInfo> {
        let task = self.add_record(record).await?;
        self.index(&T::searchable_type())?.wait(task).await
    }

    /// Replace the indexed fields of one record
    pub async fn update_record<T: Searchable>(&self, record: &T) -> Result<TaskInfo> {
        let index = self.index(&T::searchable_type())?;
        index
            .update_documents(&[record.to_indexable_document()])
            .await
    }

    pub async fn update_record_and_wait<T: Searchable>(&self, record: &T) -> Result<TaskInfo> {
        let index = self.index(&T::searchable_type())?;
        index
            .update_documents_and_wait(&[record.to_indexable_document()])
            .await
    }

    /// Remove one record's document, found by its indexed primary key value
    pub async fn remove_record<T: Searchable>(&self, record: &T) -> Result<TaskInfo> {
        let index = self.index(&T::searchable_type())?;
        index.delete_document(&document_key(&index, record)).await
    }

    pub async fn remove_record_and_wait<T: Searchable>(&self, record: &T) -> Result<TaskInfo> {
        let index = self.index(&T::searchable_type())?;
        index
            .delete_document_and_wait(&document_key(&index, record))
            .await
    }

    /// Add prebuilt documents to the index of `ty`. Nothing is sent if any
    /// document is malformed.
    pub async fn add_documents(
        &self,
        ty: &SearchableType,
        documents: &[IndexableDocument],
    ) -> Result<TaskInfo> {
        let index = self.index(ty)?;
        validate_documents(documents, index.primary_key())?;
        index.add_documents(documents).await
    }

    pub async fn add_documents_and_wait(
        &self,
        ty: &SearchableType,
        documents: &[IndexableDocument],
    ) -> Result<TaskInfo> {
        let task = self.add_documents(ty, documents).await?;
        self.index(ty)?.wait(task).await
    }

    pub async fn update_documents(
        &self,
        ty: &SearchableType,
        documents: &[IndexableDocument],
    ) -> Result<TaskInfo> {
        let index = self.index(ty)?;
        validate_documents(documents, index.primary_key())?;
        index.update_documents(documents).await
    }

    pub async fn update_documents_and_wait(
        &self,
        ty: &SearchableType,
        documents: &[IndexableDocument],
    ) -> Result<TaskInfo> {
        let task = self.update_documents(ty, documents).await?;
        self.index(ty)?.wait(task).await
    }

    /// Replace the whole content of `T`'s index with `records`.
    ///
    /// Clears the index, submits documents in batches of
    /// [`REINDEX_BATCH_SIZE`] and pushes filterable attributes last. Batch
    /// tasks are returned without waiting; a failure leaves earlier batches
    /// in place and the call can simply be repeated.
    pub async fn reindex<T: Searchable>(&self, records: &[T]) -> Result<Vec<TaskInfo>> {
        self.reindex_inner(records, false).await
    }

    /// Like [`Indexer::reindex`] but waits for every batch to be processed
    pub async fn reindex_and_wait<T: Searchable>(&self, records: &[T]) -> Result<Vec<TaskInfo>> {
        self.reindex_inner(records, true).await
    }

    async fn reindex_inner<T: Searchable>(&self, records: &[T], wait: bool) -> Result<Vec<TaskInfo>> {
        let start = Instant::now();
        let ty = T::searchable_type();
        let index = self.index(&ty)?;

        match index.delete_all_documents_and_wait().await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!("Index {} does not exist yet", index.uid()),
            Err(e) => return Err(e),
        }

        let mut tasks = Vec::with_capacity(records.len().div_ceil(REINDEX_BATCH_SIZE));
        for batch in records.chunks(REINDEX_BATCH_SIZE) {
            let documents: Vec<_> = batch.iter().map(T::to_indexable_document).collect();
            let task = index.add_documents(&documents).await?;
            let task = if wait { index.wait(task).await? } else { task };
            tasks.push(task);
        }

        let task = set_filterable_attributes(&index, &ty).await?;
        if wait {
            index.wait(task).await?;
        }

        info!(
            "Reindexed {} {} record(s) into {} in {} batch(es) ({:?})",
            records.len(),
            ty.object_class(),
            index.uid(),
            tasks.len(),
            start.elapsed()
        );
        Ok(tasks)
    }

    pub async fn delete_all_documents(&self, ty: &SearchableType) -> Result<TaskInfo> {
        self.index(ty)?.delete_all_documents().await
    }

    pub async fn delete_all_documents_and_wait(&self, ty: &SearchableType) -> Result<TaskInfo> {
        self.index(ty)?.delete_all_documents_and_wait().await
    }

    /// Drop the index of `ty` together with its settings
    pub async fn delete_index(&self, ty: &SearchableType) -> Result<TaskInfo> {
        self.index(ty)?.delete().await
    }

    pub async fn stats(&self, ty: &SearchableType) -> Result<IndexStats> {
        self.index(ty)?.stats().await
    }
}

fn document_key<T: Searchable>(index: &IndexHandle, record: &T) -> String {
    record
        .to_indexable_document()
        .get(index.primary_key())
        .map(stringify)
        .unwrap_or_else(|| record.primary_key())
}
