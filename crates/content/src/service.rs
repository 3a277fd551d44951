use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{Content, ContentUpdateModel, ReferenceById, ValueModel, VariantModel};

/// Loads content items by key.
#[async_trait]
pub trait ContentService: Send + Sync {
    async fn get(&self, key: Uuid) -> Option<Content>;
}

/// Produces the full-payload update model for a content item.
#[async_trait]
pub trait UpdateModelFactory: Send + Sync {
    async fn create_update_request_model(&self, content: &Content) -> ContentUpdateModel;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct ContentPresentationFactory;

#[async_trait]
impl UpdateModelFactory for ContentPresentationFactory {
    async fn create_update_request_model(&self, content: &Content) -> ContentUpdateModel {
        ContentUpdateModel {
            template: content.template.map(|id| ReferenceById { id }),
            values: content
                .properties
                .iter()
                .flat_map(|property| {
                    property.values.iter().map(move |value| ValueModel {
                        alias: property.alias.clone(),
                        culture: value.culture.clone(),
                        segment: value.segment.clone(),
                        value: value.value.clone(),
                    })
                })
                .collect(),
            variants: content
                .variants
                .iter()
                .map(|variant| VariantModel {
                    culture: variant.culture.clone(),
                    segment: variant.segment.clone(),
                    name: variant.name.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    items: RwLock<HashMap<Uuid, Content>>,
}

impl MemoryContentStore {
    pub fn new(items: impl IntoIterator<Item = Content>) -> Self {
        Self {
            items: RwLock::new(
                items
                    .into_iter()
                    .map(|content| (content.key, content))
                    .collect(),
            ),
        }
    }

    pub fn insert(&self, content: Content) {
        self.items.write().insert(content.key, content);
    }

    /// Applies `model` to the stored item, returning `false` if there is no such item.
    pub fn save(&self, key: Uuid, model: &ContentUpdateModel) -> bool {
        match self.items.write().get_mut(&key) {
            Some(content) => {
                content.apply_update(model);
                tracing::debug!(key = %key, "content saved");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl ContentService for MemoryContentStore {
    async fn get(&self, key: Uuid) -> Option<Content> {
        self.items.read().get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ContentVariant, Property, PropertyValue};

    fn content() -> Content {
        Content {
            key: Uuid::new_v4(),
            content_type: "page".to_string(),
            template: None,
            variants: vec![ContentVariant {
                culture: None,
                segment: None,
                name: "Home".to_string(),
            }],
            properties: vec![Property {
                alias: "title".to_string(),
                values: vec![PropertyValue {
                    culture: None,
                    segment: None,
                    value: json!("Old Title"),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn factory_round_trips_through_save() {
        let content = content();
        let store = MemoryContentStore::new([content.clone()]);

        let mut model = ContentPresentationFactory
            .create_update_request_model(&content)
            .await;
        assert_eq!(model.values.len(), 1);
        assert_eq!(model.variants[0].name, "Home");

        model.values[0].value = json!("New Title");
        assert!(store.save(content.key, &model));

        let saved = store.get(content.key).await.unwrap();
        assert_eq!(
            saved.property("title").unwrap().values[0].value,
            json!("New Title")
        );
        assert!(!store.save(Uuid::new_v4(), &model));
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }
}
