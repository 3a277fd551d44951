use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub key: Uuid,
    pub content_type: String,
    #[serde(default)]
    pub template: Option<Uuid>,
    #[serde(default)]
    pub variants: Vec<ContentVariant>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentVariant {
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub alias: String,
    #[serde(default)]
    pub values: Vec<PropertyValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    pub value: Value,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ReferenceById {
    pub id: Uuid,
}

/// The full-payload form of a content update, as a client would send it.
///
/// `culture` and `segment` are always serialized (as `null` when invariant)
/// so that patch paths can filter on them.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentUpdateModel {
    pub template: Option<ReferenceById>,
    pub values: Vec<ValueModel>,
    pub variants: Vec<VariantModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueModel {
    pub alias: String,
    pub culture: Option<String>,
    pub segment: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariantModel {
    pub culture: Option<String>,
    pub segment: Option<String>,
    pub name: String,
}

impl Content {
    pub fn property(&self, alias: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.alias == alias)
    }

    /// Replaces template, variants and property values with those of `model`.
    ///
    /// Properties keep the order in which their aliases first appear in the model.
    pub fn apply_update(&mut self, model: &ContentUpdateModel) {
        self.template = model.template.map(|template| template.id);
        self.variants = model
            .variants
            .iter()
            .map(|variant| ContentVariant {
                culture: variant.culture.clone(),
                segment: variant.segment.clone(),
                name: variant.name.clone(),
            })
            .collect();

        let mut properties: Vec<Property> = Vec::new();
        for value in &model.values {
            let property_value = PropertyValue {
                culture: value.culture.clone(),
                segment: value.segment.clone(),
                value: value.value.clone(),
            };
            match properties
                .iter_mut()
                .find(|property| property.alias == value.alias)
            {
                Some(property) => property.values.push(property_value),
                None => properties.push(Property {
                    alias: value.alias.clone(),
                    values: vec![property_value],
                }),
            }
        }
        self.properties = properties;
    }
}
