use json_path::{JsonPath, JsonPathRef, JsonPointer, PointerSegment, Segment, ValueExt};
use serde_json::Value;

use crate::{ApplyError, PatchKind, PatchOperation};

/// Validates JSONPath expressions and applies single patch operations.
#[derive(Debug, Default, Copy, Clone)]
pub struct JsonPathEvaluator;

impl JsonPathEvaluator {
    pub fn is_valid_expression(&self, path: &str) -> bool {
        path.parse::<JsonPath>().is_ok()
    }

    /// Applies one operation to a document in text form and returns the new text.
    pub fn apply_operation(
        &self,
        json_text: &str,
        operation: &PatchOperation,
    ) -> Result<String, ApplyError> {
        let mut root: Value = serde_json::from_str(json_text)?;
        self.apply(&mut root, operation)?;
        Ok(serde_json::to_string(&root)?)
    }

    pub fn apply(&self, root: &mut Value, operation: &PatchOperation) -> Result<(), ApplyError> {
        let path = operation.path().parse::<JsonPath>()?;
        self.apply_parsed(root, operation.kind(), &path, operation.value())
    }

    /// Applies one operation whose path has already been parsed.
    ///
    /// On error `root` is left untouched.
    pub fn apply_parsed(
        &self,
        root: &mut Value,
        kind: PatchKind,
        path: &JsonPath,
        value: Option<&Value>,
    ) -> Result<(), ApplyError> {
        match kind {
            PatchKind::Add => apply_add(root, path, value.ok_or(ApplyError::MissingValue)?),
            PatchKind::Replace => {
                apply_replace(root, path, value.ok_or(ApplyError::MissingValue)?)
            }
            PatchKind::Remove => apply_remove(root, path),
            PatchKind::Test => apply_test(root, path, value.unwrap_or(&Value::Null)),
        }
    }
}

fn single(
    mut pointers: Vec<JsonPointer>,
    path: JsonPathRef<'_>,
) -> Result<JsonPointer, ApplyError> {
    if pointers.len() > 1 {
        return Err(ApplyError::Ambiguous {
            path: path.to_owned(),
            count: pointers.len(),
        });
    }
    pointers.pop().ok_or_else(|| ApplyError::NoMatch {
        path: path.to_owned(),
    })
}

fn apply_add(root: &mut Value, path: &JsonPath, value: &Value) -> Result<(), ApplyError> {
    let (parent_path, last) = match path.split_last() {
        Some(split) => split,
        None => {
            *root = value.clone();
            return Ok(());
        }
    };

    match last {
        Segment::Child(_) | Segment::Index(_) => {
            let parent = single(parent_path.select(root), parent_path)?;
            let container = root
                .locate_mut(&parent)
                .ok_or_else(|| ApplyError::NoMatch {
                    path: parent_path.to_owned(),
                })?;

            match (container, last) {
                (Value::Object(obj), Segment::Child(key)) => {
                    obj.insert(key.clone(), value.clone());
                }
                (Value::Array(array), Segment::Index(index)) => {
                    if *index > array.len() {
                        return Err(ApplyError::InvalidIndex {
                            path: parent,
                            index: *index,
                        });
                    }
                    array.insert(*index, value.clone());
                }
                _ => return Err(ApplyError::NotAContainer { path: parent }),
            }
        }
        Segment::Wildcard | Segment::Filter(_) => {
            let target = single(path.select(root), path.as_ref())?;
            if let Some(slot) = root.locate_mut(&target) {
                *slot = value.clone();
            }
        }
    }

    Ok(())
}

fn apply_replace(root: &mut Value, path: &JsonPath, value: &Value) -> Result<(), ApplyError> {
    let targets = path.select(root);
    if targets.is_empty() {
        return Err(ApplyError::NoMatch { path: path.clone() });
    }

    for target in targets {
        if let Some(slot) = root.locate_mut(&target) {
            *slot = value.clone();
        }
    }
    Ok(())
}

fn apply_remove(root: &mut Value, path: &JsonPath) -> Result<(), ApplyError> {
    let targets = path.select(root);
    if targets.is_empty() {
        return Err(ApplyError::NoMatch { path: path.clone() });
    }
    if targets.iter().any(JsonPointer::is_root) {
        return Err(ApplyError::RemoveRoot);
    }

    // matches are in document order, so removing back to front keeps sibling indexes valid
    for target in targets.iter().rev() {
        let (parent_path, last) = match target.split_last() {
            Some(split) => split,
            None => continue,
        };
        match (root.locate_mut(&parent_path), last) {
            (Some(Value::Object(obj)), PointerSegment::Key(key)) => {
                obj.remove(key);
            }
            (Some(Value::Array(array)), PointerSegment::Index(index)) if *index < array.len() => {
                array.remove(*index);
            }
            _ => {
                return Err(ApplyError::NotAContainer { path: parent_path });
            }
        }
    }
    Ok(())
}

fn apply_test(root: &Value, path: &JsonPath, expected: &Value) -> Result<(), ApplyError> {
    let target = single(path.select(root), path.as_ref())?;
    if !root
        .locate(&target)
        .map(|actual| actual.json_eq(expected))
        .unwrap_or_default()
    {
        return Err(ApplyError::TestFailed { path: path.clone() });
    }
    Ok(())
}
