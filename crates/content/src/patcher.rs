use std::{collections::BTreeSet, sync::Arc};

use json_patch::{ContentPatchRequest, JsonPathEvaluator};
use json_path::{extract_culture, extract_cultures, extract_segment, extract_segments, JsonPath};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    Attempt, ContentService, ContentUpdateModel, PatchError, PatchStatus, UpdateModelFactory,
};

/// Applies JSONPath patch requests to content items.
///
/// The patcher never writes to the content store. It loads the item, renders
/// it as the update model a client would have sent in full, applies the
/// operations to that document and hands the result back for the caller to
/// save.
pub struct DocumentPatcher {
    content_service: Arc<dyn ContentService>,
    factory: Arc<dyn UpdateModelFactory>,
    evaluator: JsonPathEvaluator,
}

impl DocumentPatcher {
    pub fn new(
        content_service: Arc<dyn ContentService>,
        factory: Arc<dyn UpdateModelFactory>,
    ) -> Self {
        Self {
            content_service,
            factory,
            evaluator: JsonPathEvaluator,
        }
    }

    pub async fn apply_patch(
        &self,
        content_key: Uuid,
        request: &ContentPatchRequest,
        acting_user: Uuid,
    ) -> Attempt<ContentUpdateModel, PatchStatus> {
        match self.try_apply_patch(content_key, request, acting_user).await {
            Ok(model) => Attempt::succeed(PatchStatus::Success, model),
            Err(err) => {
                tracing::debug!(
                    content_key = %content_key,
                    acting_user = %acting_user,
                    error = %err,
                    "patch rejected"
                );
                Attempt::fail(err.status())
            }
        }
    }

    /// Same as [`apply_patch`](Self::apply_patch), with the reason for a failure.
    pub async fn try_apply_patch(
        &self,
        content_key: Uuid,
        request: &ContentPatchRequest,
        acting_user: Uuid,
    ) -> Result<ContentUpdateModel, PatchError> {
        tracing::debug!(
            content_key = %content_key,
            acting_user = %acting_user,
            operation_count = request.operations.len(),
            "patch"
        );

        let paths = self.validate(request)?;

        let content = self
            .content_service
            .get(content_key)
            .await
            .ok_or(PatchError::NotFound { key: content_key })?;
        let model = self.factory.create_update_request_model(&content).await;
        let mut document = serde_json::to_value(&model).map_err(PatchError::Serialize)?;

        let guarded = !request.cultures.is_empty() || !request.segments.is_empty();
        for (index, (operation, path)) in request.operations.iter().zip(&paths).enumerate() {
            let before = guarded.then(|| document.clone());
            self.evaluator
                .apply_parsed(&mut document, operation.kind(), path, operation.value())
                .map_err(|source| PatchError::Inapplicable {
                    index,
                    kind: operation.kind(),
                    source,
                })?;
            if let Some(before) = before {
                check_declared_changes(request, index, &before, &document)?;
            }
        }

        serde_json::from_value(document).map_err(PatchError::Deserialize)
    }

    /// The `(culture, segment)` pairs the request's operations address.
    /// `None` stands for culture (segment) agnostic operations.
    pub fn affected_variants(
        request: &ContentPatchRequest,
    ) -> BTreeSet<(Option<String>, Option<String>)> {
        request
            .operations
            .iter()
            .map(|operation| {
                (
                    extract_culture(operation.path()),
                    extract_segment(operation.path()),
                )
            })
            .collect()
    }

    fn validate(&self, request: &ContentPatchRequest) -> Result<Vec<JsonPath>, PatchError> {
        let mut paths = Vec::with_capacity(request.operations.len());

        for (index, operation) in request.operations.iter().enumerate() {
            let path = operation
                .path()
                .parse::<JsonPath>()
                .map_err(|source| PatchError::InvalidPath {
                    index,
                    path: operation.path().to_string(),
                    source,
                })?;

            if operation.requires_value() && operation.value().is_none() {
                return Err(PatchError::MissingValue {
                    index,
                    kind: operation.kind(),
                });
            }

            if !request.cultures.is_empty() {
                if let Some(culture) = extract_cultures(&path)
                    .into_iter()
                    .find(|culture| !request.cultures.contains(culture))
                {
                    return Err(PatchError::UndeclaredCulture { index, culture });
                }
            }

            if !request.segments.is_empty() {
                if let Some(segment) = extract_segments(&path)
                    .into_iter()
                    .find(|segment| !request.segments.contains(segment))
                {
                    return Err(PatchError::UndeclaredSegment { index, segment });
                }
            }

            paths.push(path);
        }

        Ok(paths)
    }
}

/// A path without a culture filter (`$.values[*].value`) can still reach
/// variant values, so the declared cultures and segments are also enforced on
/// what an operation actually changed.
fn check_declared_changes(
    request: &ContentPatchRequest,
    index: usize,
    before: &Value,
    after: &Value,
) -> Result<(), PatchError> {
    for (field, declared) in [("culture", &request.cultures), ("segment", &request.segments)] {
        if declared.is_empty() {
            continue;
        }
        if let Some(value) = undeclared_change(before, after, field, declared) {
            return Err(PatchError::UndeclaredChange {
                index,
                field,
                value,
            });
        }
    }
    Ok(())
}

fn undeclared_change(
    before: &Value,
    after: &Value,
    field: &str,
    declared: &[String],
) -> Option<String> {
    const VARIANT_LISTS: [&str; 2] = ["values", "variants"];

    let entries = |document: &Value, list: &str| -> Vec<Value> {
        document
            .get(list)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    for list in VARIANT_LISTS {
        let old = entries(before, list);
        let new = entries(after, list);

        // an entry that is not found unchanged on the other side was added,
        // removed or modified
        for (side, other) in [(&new, &old), (&old, &new)] {
            for entry in side {
                if let Some(value) = entry.get(field).and_then(Value::as_str) {
                    if !declared.iter().any(|d| d == value) && !other.contains(entry) {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use json_patch::PatchOperation;
    use serde_json::json;

    use super::*;
    use crate::{
        Content, ContentPresentationFactory, ContentVariant, MemoryContentStore, Property,
        PropertyValue,
    };

    const TITLE: &str = "$.values[?(@.alias=='title')].value";

    struct CountingService {
        inner: MemoryContentStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentService for CountingService {
        async fn get(&self, key: Uuid) -> Option<Content> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key).await
        }
    }

    fn value(culture: Option<&str>, value: &str) -> PropertyValue {
        PropertyValue {
            culture: culture.map(ToString::to_string),
            segment: None,
            value: json!(value),
        }
    }

    fn content() -> Content {
        Content {
            key: Uuid::new_v4(),
            content_type: "page".to_string(),
            template: None,
            variants: vec![
                ContentVariant {
                    culture: Some("en-US".to_string()),
                    segment: None,
                    name: "Home".to_string(),
                },
                ContentVariant {
                    culture: Some("da-DK".to_string()),
                    segment: None,
                    name: "Hjem".to_string(),
                },
            ],
            properties: vec![
                Property {
                    alias: "title".to_string(),
                    values: vec![value(None, "Old Title")],
                },
                Property {
                    alias: "body".to_string(),
                    values: vec![
                        value(Some("en-US"), "Hello"),
                        value(Some("da-DK"), "Hej"),
                    ],
                },
            ],
        }
    }

    fn setup() -> (Uuid, Arc<CountingService>, DocumentPatcher) {
        let content = content();
        let key = content.key;
        let service = Arc::new(CountingService {
            inner: MemoryContentStore::new([content]),
            calls: AtomicUsize::new(0),
        });
        let patcher = DocumentPatcher::new(service.clone(), Arc::new(ContentPresentationFactory));
        (key, service, patcher)
    }

    async fn baseline() -> ContentUpdateModel {
        ContentPresentationFactory
            .create_update_request_model(&content())
            .await
    }

    fn title(model: &ContentUpdateModel) -> &serde_json::Value {
        &model
            .values
            .iter()
            .find(|value| value.alias == "title")
            .unwrap()
            .value
    }

    #[tokio::test]
    async fn replace_title() {
        let (key, _, patcher) = setup();
        let request = ContentPatchRequest::new(vec![PatchOperation::replace(TITLE, "New Title")]);

        let attempt = patcher.apply_patch(key, &request, Uuid::new_v4()).await;
        assert!(attempt.is_success());
        assert_eq!(attempt.status(), &PatchStatus::Success);

        let model = attempt.into_result().unwrap();
        assert_eq!(title(&model), &json!("New Title"));

        let mut expected = baseline().await;
        expected.values[0].value = json!("New Title");
        assert_eq!(model, expected);
    }

    #[tokio::test]
    async fn add_to_missing_alias_is_invalid() {
        let (key, _, patcher) = setup();
        let request = ContentPatchRequest::new(vec![PatchOperation::add(
            "$.values[?(@.alias=='missingAlias')].value",
            "x",
        )]);

        let attempt = patcher.apply_patch(key, &request, Uuid::new_v4()).await;
        assert!(!attempt.is_success());
        assert_eq!(attempt.status(), &PatchStatus::InvalidOperation);
        assert!(attempt.result().is_none());
    }

    #[tokio::test]
    async fn invalid_path_fails_before_loading() {
        let (key, service, patcher) = setup();
        let request = ContentPatchRequest::new(vec![
            PatchOperation::replace(TITLE, "A"),
            PatchOperation::replace("$.values[?(@.alias=='title'", "B"),
            PatchOperation::replace(TITLE, "C"),
        ]);

        let err = patcher
            .try_apply_patch(key, &request, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath { index: 1, .. }));
        assert!(err.is_validation_error());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_value_fails_before_loading() {
        let (key, service, patcher) = setup();
        let request = ContentPatchRequest::new(vec![PatchOperation::Replace {
            path: TITLE.to_string(),
            value: None,
        }]);

        let attempt = patcher.apply_patch(key, &request, Uuid::new_v4()).await;
        assert_eq!(attempt.status(), &PatchStatus::InvalidOperation);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn operations_apply_in_order() {
        let (key, _, patcher) = setup();
        let first = PatchOperation::replace(TITLE, "A");
        let second = PatchOperation::replace(TITLE, "B");

        let forward = patcher
            .try_apply_patch(
                key,
                &ContentPatchRequest::new(vec![first.clone(), second.clone()]),
                Uuid::nil(),
            )
            .await
            .unwrap();
        let backward = patcher
            .try_apply_patch(
                key,
                &ContentPatchRequest::new(vec![second, first]),
                Uuid::nil(),
            )
            .await
            .unwrap();

        assert_eq!(title(&forward), &json!("B"));
        assert_eq!(title(&backward), &json!("A"));
    }

    #[tokio::test]
    async fn inapplicable_operation_short_circuits() {
        let (key, _, patcher) = setup();
        let request = ContentPatchRequest::new(vec![
            PatchOperation::replace(TITLE, "A"),
            PatchOperation::test(TITLE, "not A"),
            PatchOperation::replace("$.variants[0].name", "Changed"),
        ]);

        let err = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::Inapplicable { index: 1, .. }));
        assert_eq!(err.status(), PatchStatus::InvalidOperation);
    }

    #[tokio::test]
    async fn empty_patch_returns_baseline() {
        let (key, _, patcher) = setup();
        let model = patcher
            .apply_patch(key, &ContentPatchRequest::default(), Uuid::nil())
            .await
            .into_result()
            .unwrap();
        assert_eq!(model, baseline().await);
    }

    #[tokio::test]
    async fn unknown_content() {
        let (_, service, patcher) = setup();
        let request = ContentPatchRequest::new(vec![PatchOperation::replace(TITLE, "A")]);
        let attempt = patcher.apply_patch(Uuid::new_v4(), &request, Uuid::nil()).await;
        assert_eq!(attempt.status(), &PatchStatus::NotFound);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn removing_required_field_is_invalid() {
        let (key, _, patcher) = setup();
        let request = ContentPatchRequest::new(vec![PatchOperation::remove("$.values")]);
        let err = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::Deserialize(_)));
        assert_eq!(err.status(), PatchStatus::InvalidOperation);
    }

    #[tokio::test]
    async fn culture_must_be_declared() {
        let (key, service, patcher) = setup();
        let path = "$.values[?(@.alias == 'body' && @.culture == 'da-DK')].value";

        let request = ContentPatchRequest::new(vec![PatchOperation::replace(path, "Hejsa")])
            .cultures(["en-US"]);
        let err = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::UndeclaredCulture { ref culture, .. } if culture == "da-DK"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        let request = ContentPatchRequest::new(vec![
            PatchOperation::replace(path, "Hejsa"),
            PatchOperation::replace(TITLE, "Invariant"),
        ])
        .cultures(["en-US", "da-DK"]);
        let model = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap();
        assert_eq!(model.values[2].value, json!("Hejsa"));
        assert_eq!(model.values[1].value, json!("Hello"));
    }

    #[tokio::test]
    async fn culture_check_covers_every_branch() {
        let (key, service, patcher) = setup();
        let request = ContentPatchRequest::new(vec![PatchOperation::replace(
            "$.values[?(@.alias == 'body' && (@.culture == 'en-US' || @.culture == 'da-DK'))].value",
            "X",
        )])
        .cultures(["en-US"]);

        let err = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::UndeclaredCulture { index: 0, ref culture } if culture == "da-DK"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unfiltered_path_cannot_touch_undeclared_culture() {
        let (key, _, patcher) = setup();
        let request = ContentPatchRequest::new(vec![
            PatchOperation::replace(TITLE, "Invariant"),
            PatchOperation::replace("$.values[*].value", "X"),
        ])
        .cultures(["en-US"]);

        let err = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::UndeclaredChange { index: 1, field: "culture", ref value } if value == "da-DK"
        ));
        assert_eq!(err.status(), PatchStatus::InvalidOperation);

        let request = ContentPatchRequest::new(vec![PatchOperation::remove("$.variants[1]")])
            .cultures(["en-US"]);
        let err = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, PatchError::UndeclaredChange { index: 0, .. }));

        // touching only declared and invariant entries is fine
        let request = ContentPatchRequest::new(vec![
            PatchOperation::replace("$.values[?(@.culture != 'da-DK')].value", "Y"),
            PatchOperation::replace("$.variants[0].name", "Start"),
        ])
        .cultures(["en-US"]);
        let model = patcher
            .try_apply_patch(key, &request, Uuid::nil())
            .await
            .unwrap();
        assert_eq!(model.values[0].value, json!("Y"));
        assert_eq!(model.values[1].value, json!("Y"));
        assert_eq!(model.values[2].value, json!("Hej"));
    }

    #[test]
    fn affected_variants() {
        let request = ContentPatchRequest::new(vec![
            PatchOperation::replace(TITLE, "A"),
            PatchOperation::replace(
                "$.values[?(@.alias == 'body' && @.culture == 'da-DK' && @.segment == 'vip')].value",
                "B",
            ),
            PatchOperation::replace("$.variants[?(@.culture == 'da-DK')].name", "C"),
        ]);

        let variants = DocumentPatcher::affected_variants(&request);
        assert_eq!(
            variants.into_iter().collect::<Vec<_>>(),
            vec![
                (None, None),
                (Some("da-DK".to_string()), None),
                (Some("da-DK".to_string()), Some("vip".to_string())),
            ]
        );
    }
}
