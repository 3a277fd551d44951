use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Add,
    Replace,
    Remove,
    Test,
}

impl Display for PatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatchKind::Add => "add",
            PatchKind::Replace => "replace",
            PatchKind::Remove => "remove",
            PatchKind::Test => "test",
        })
    }
}

/// One requested mutation.
///
/// Paths are kept as raw text so that a syntactically invalid path can be
/// reported as a failed operation instead of a malformed request.
/// A JSON `null` value reads as no value.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    Replace {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    Remove {
        path: String,
    },
    Test {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        PatchOperation::Add {
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        PatchOperation::Replace {
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        PatchOperation::Remove { path: path.into() }
    }

    pub fn test(path: impl Into<String>, value: impl Into<Value>) -> Self {
        PatchOperation::Test {
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn kind(&self) -> PatchKind {
        match self {
            PatchOperation::Add { .. } => PatchKind::Add,
            PatchOperation::Replace { .. } => PatchKind::Replace,
            PatchOperation::Remove { .. } => PatchKind::Remove,
            PatchOperation::Test { .. } => PatchKind::Test,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Test { path, .. } => path,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOperation::Add { value, .. }
            | PatchOperation::Replace { value, .. }
            | PatchOperation::Test { value, .. } => value.as_ref(),
            PatchOperation::Remove { .. } => None,
        }
    }

    /// `add` and `replace` are meaningless without a value.
    pub fn requires_value(&self) -> bool {
        matches!(self.kind(), PatchKind::Add | PatchKind::Replace)
    }
}

/// An ordered list of operations against one content item, plus the
/// cultures and segments the caller declares as affected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatchRequest {
    pub operations: Vec<PatchOperation>,
    #[serde(default)]
    pub cultures: Vec<String>,
    #[serde(default)]
    pub segments: Vec<String>,
}

impl ContentPatchRequest {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            operations,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn cultures<I, T>(self, cultures: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            cultures: cultures.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    #[must_use]
    pub fn segments<I, T>(self, segments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize() {
        let request: ContentPatchRequest = serde_json::from_value(json!({
            "operations": [
                { "op": "replace", "path": "$.values[0].value", "value": "New" },
                { "op": "add", "path": "$.values[0].value", "value": null },
                { "op": "remove", "path": "$.values[1]" },
                { "op": "test", "path": "$.template" }
            ],
            "cultures": ["en-US"]
        }))
        .unwrap();

        assert_eq!(
            request.operations,
            vec![
                PatchOperation::replace("$.values[0].value", "New"),
                PatchOperation::Add {
                    path: "$.values[0].value".to_string(),
                    value: None,
                },
                PatchOperation::remove("$.values[1]"),
                PatchOperation::Test {
                    path: "$.template".to_string(),
                    value: None,
                },
            ]
        );
        assert_eq!(request.cultures, vec!["en-US".to_string()]);
        assert!(request.segments.is_empty());

        assert!(request.operations[0].requires_value());
        assert!(!request.operations[3].requires_value());
        assert_eq!(request.operations[2].kind(), PatchKind::Remove);
        assert_eq!(request.operations[2].value(), None);
    }

    #[test]
    fn unknown_op_is_rejected() {
        assert!(serde_json::from_value::<PatchOperation>(
            json!({ "op": "move", "from": "$.a", "path": "$.b" })
        )
        .is_err());
    }
}
