//! Keeps an index's filterable and sortable settings in line with its type

use super::accessor::IndexHandle;
use crate::documents::{SearchableType, OBJECT_CLASS_FIELD};
use crate::engines::TaskInfo;
use crate::error::Result;
use std::collections::HashSet;
use tracing::{debug, info};

/// Filterable attributes the index of `ty` should have.
///
/// An explicit list is intersected with the searchable attributes, keeping its
/// order. Without one, every searchable attribute is filterable unless the
/// type is unfilterable. `object_class` is always included.
pub fn filterable_attributes(ty: &SearchableType) -> Vec<String> {
    let attributes = match ty.config().filterable_attributes {
        Some(ref explicit) => restrict_to_searchable(ty, explicit),
        None if ty.is_unfilterable() => Vec::new(),
        None => ty.searchable_attributes(),
    };
    with_object_class(attributes)
}

/// Sortable attributes: an explicit list is intersected with the searchable
/// attributes and gets `object_class` like the filterable set does; without
/// one, the filterable set is used.
pub fn sortable_attributes(ty: &SearchableType) -> Vec<String> {
    match ty.config().sortable_attributes {
        Some(ref explicit) => with_object_class(restrict_to_searchable(ty, explicit)),
        None => filterable_attributes(ty),
    }
}

fn restrict_to_searchable(ty: &SearchableType, explicit: &[String]) -> Vec<String> {
    let searchable = ty.searchable_attributes();
    explicit
        .iter()
        .filter(|name| searchable.contains(name))
        .cloned()
        .collect()
}

fn with_object_class(mut attributes: Vec<String>) -> Vec<String> {
    if !attributes.iter().any(|name| name == OBJECT_CLASS_FIELD) {
        attributes.push(OBJECT_CLASS_FIELD.to_string());
    }
    attributes
}

pub async fn set_filterable_attributes(index: &IndexHandle, ty: &SearchableType) -> Result<TaskInfo> {
    index
        .update_filterable_attributes(&filterable_attributes(ty))
        .await
}

pub async fn set_filterable_attributes_and_wait(
    index: &IndexHandle,
    ty: &SearchableType,
) -> Result<TaskInfo> {
    let task = set_filterable_attributes(index, ty).await?;
    index.wait(task).await
}

pub async fn set_sortable_attributes(index: &IndexHandle, ty: &SearchableType) -> Result<TaskInfo> {
    index
        .update_sortable_attributes(&sortable_attributes(ty))
        .await
}

pub async fn set_sortable_attributes_and_wait(
    index: &IndexHandle,
    ty: &SearchableType,
) -> Result<TaskInfo> {
    let task = set_sortable_attributes(index, ty).await?;
    index.wait(task).await
}

/// What [`configure_attributes_and_index_if_needed`] did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub created_index: bool,
    pub filterable_task: Option<TaskInfo>,
    pub sortable_task: Option<TaskInfo>,
    pub ranking_task: Option<TaskInfo>,
}

impl ReconcileOutcome {
    /// True when the index already matched and nothing was submitted
    pub fn is_noop(&self) -> bool {
        !self.created_index
            && self.filterable_task.is_none()
            && self.sortable_task.is_none()
            && self.ranking_task.is_none()
    }
}

/// Create the index if it doesn't exist and push filterable and sortable
/// attributes when the index's filterable set differs from the desired one.
///
/// Ranking rules are only pushed to a freshly created index, and only when
/// the type configures them. Settings updates are submitted, not awaited.
pub async fn configure_attributes_and_index_if_needed(
    index: &IndexHandle,
    ty: &SearchableType,
) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();

    let current = match index.get_filterable_attributes().await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => {
            info!("Creating index {} for {}", index.uid(), ty.object_class());
            let task = index.create().await?;
            index.wait(task).await?;
            outcome.created_index = true;
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let desired = filterable_attributes(ty);
    let current: HashSet<&str> = current.iter().map(String::as_str).collect();
    let wanted: HashSet<&str> = desired.iter().map(String::as_str).collect();

    if current != wanted {
        debug!(
            "Updating filterable/sortable attributes of {} to {:?}",
            index.uid(),
            desired
        );
        outcome.filterable_task = Some(index.update_filterable_attributes(&desired).await?);
        outcome.sortable_task = Some(
            index
                .update_sortable_attributes(&sortable_attributes(ty))
                .await?,
        );
    }

    if outcome.created_index && ty.config().ranking_rules.is_some() {
        outcome.ranking_task = Some(index.update_ranking_rules(&ty.ranking_rules()).await?);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::SearchConfig;
    use crate::engines::{Meilisearch, SearchEngine, TaskStatus};
    use crate::error::SearchError;
    use crate::testing::FakeEngine;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handle(engine: &Arc<FakeEngine>, ty: &SearchableType) -> IndexHandle {
        IndexHandle::for_type(ty, engine.clone() as Arc<dyn SearchEngine>).unwrap()
    }

    #[test]
    fn test_default_attributes() {
        let ty = SearchableType::new("BasicTestModel", ["name", "description", "age"], SearchConfig::default());
        assert_eq!(
            filterable_attributes(&ty),
            vec!["name", "description", "age", "object_class"]
        );
        assert_eq!(sortable_attributes(&ty), filterable_attributes(&ty));
    }

    #[test]
    fn test_unfilterable_type() {
        let ty = SearchableType::new("Note", ["name", "body"], SearchConfig::new().unfilterable(true));
        assert_eq!(filterable_attributes(&ty), vec!["object_class"]);
    }

    #[test]
    fn test_explicit_lists_are_limited_to_searchable() {
        let config = SearchConfig::new()
            .searchable_attributes(["name", "age"])
            .filterable_attributes(["age", "secret"])
            .sortable_attributes(["age", "description"]);
        let ty = SearchableType::new("Extended", ["name", "description", "age"], config);

        assert_eq!(filterable_attributes(&ty), vec!["age", "object_class"]);
        assert_eq!(sortable_attributes(&ty), vec!["age", "object_class"]);
    }

    #[test]
    fn test_explicit_sortable_list_keeps_object_class_once() {
        let config = SearchConfig::new().sortable_attributes(["object_class", "name"]);
        let ty = SearchableType::new("Note", ["name", "object_class"], config);
        assert_eq!(sortable_attributes(&ty), vec!["object_class", "name"]);

        let unfilterable = SearchableType::new(
            "Note",
            ["name"],
            SearchConfig::new().unfilterable(true).sortable_attributes(["name"]),
        );
        assert_eq!(filterable_attributes(&unfilterable), vec!["object_class"]);
        assert_eq!(sortable_attributes(&unfilterable), vec!["name", "object_class"]);
    }

    #[tokio::test]
    async fn test_set_attributes_push_computed_sets() {
        let engine = Arc::new(FakeEngine::new());
        let config = SearchConfig::new()
            .filterable_attributes(["name"])
            .sortable_attributes(["body"]);
        let ty = SearchableType::new("Note", ["name", "body"], config);
        let index = handle(&engine, &ty);

        set_filterable_attributes(&index, &ty).await.unwrap();
        set_sortable_attributes(&index, &ty).await.unwrap();
        assert_eq!(
            engine.get_filterable_attributes("note").await.unwrap(),
            vec!["name", "object_class"]
        );
        assert_eq!(engine.sortable_attributes("note"), vec!["body", "object_class"]);

        let filterable = set_filterable_attributes_and_wait(&index, &ty).await.unwrap();
        let sortable = set_sortable_attributes_and_wait(&index, &ty).await.unwrap();
        assert_eq!(filterable.status, TaskStatus::Succeeded);
        assert_eq!(sortable.status, TaskStatus::Succeeded);
        assert_eq!(engine.call_count("update_filterable_attributes"), 2);
        assert_eq!(engine.call_count("update_sortable_attributes"), 2);
    }

    #[tokio::test]
    async fn test_blocking_set_reports_failed_task() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/indexes/note/settings/filterable-attributes"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "taskUid": 7, "indexUid": "note", "status": "enqueued"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/indexes/note/settings/sortable-attributes"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "taskUid": 8, "indexUid": "note", "status": "enqueued"
            })))
            .expect(1)
            .mount(&server)
            .await;
        for uid in [7, 8] {
            Mock::given(method("GET"))
                .and(path(format!("/tasks/{}", uid)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "uid": uid, "status": "processing"
                })))
                .up_to_n_times(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(format!("/tasks/{}", uid)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "uid": uid,
                    "status": "failed",
                    "error": {"message": "Attribute `body` is invalid", "code": "invalid_settings"}
                })))
                .mount(&server)
                .await;
        }

        let engine = Meilisearch::new(&server.uri(), "key", Duration::from_secs(2), 0)
            .unwrap()
            .with_task_poll_interval(Duration::from_millis(5));
        let ty = SearchableType::new("Note", ["name", "body"], SearchConfig::default());
        let index = IndexHandle::for_type(&ty, Arc::new(engine)).unwrap();

        let err = set_filterable_attributes_and_wait(&index, &ty).await.unwrap_err();
        assert!(matches!(err, SearchError::TaskFailed { uid: 7, .. }));
        let err = set_sortable_attributes_and_wait(&index, &ty).await.unwrap_err();
        match err {
            SearchError::TaskFailed { uid, message } => {
                assert_eq!(uid, 8);
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_created_and_configured() {
        let engine = Arc::new(FakeEngine::new());
        let ty = SearchableType::new(
            "Note",
            ["name"],
            SearchConfig::new().ranking_rules(["words", "exactness"]),
        );

        let outcome = configure_attributes_and_index_if_needed(&handle(&engine, &ty), &ty)
            .await
            .unwrap();

        assert!(outcome.created_index);
        assert!(outcome.filterable_task.is_some());
        assert!(outcome.sortable_task.is_some());
        assert!(outcome.ranking_task.is_some());
        assert_eq!(engine.call_count("create_index"), 1);
        assert_eq!(engine.ranking_rules("note"), vec!["words", "exactness"]);
        assert_eq!(engine.sortable_attributes("note"), vec!["name", "object_class"]);
        assert_eq!(
            engine.get_filterable_attributes("note").await.unwrap(),
            vec!["name", "object_class"]
        );
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let engine = Arc::new(FakeEngine::new());
        let ty = SearchableType::new("Note", ["name", "body"], SearchConfig::default());
        let index = handle(&engine, &ty);

        let first = configure_attributes_and_index_if_needed(&index, &ty).await.unwrap();
        assert!(!first.is_noop());
        assert!(first.ranking_task.is_none());

        let second = configure_attributes_and_index_if_needed(&index, &ty).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(engine.call_count("create_index"), 1);
        assert_eq!(engine.call_count("update_filterable_attributes"), 1);
        assert_eq!(engine.call_count("update_sortable_attributes"), 1);
    }

    #[tokio::test]
    async fn test_order_differences_are_not_drift() {
        let engine = Arc::new(FakeEngine::new());
        let ty = SearchableType::new("Note", ["name", "body"], SearchConfig::default());
        let index = handle(&engine, &ty);
        index.create().await.unwrap();
        index
            .update_filterable_attributes(&[
                "object_class".to_string(),
                "body".to_string(),
                "name".to_string(),
            ])
            .await
            .unwrap();

        let outcome = configure_attributes_and_index_if_needed(&index, &ty).await.unwrap();
        assert!(outcome.is_noop());
    }
}
