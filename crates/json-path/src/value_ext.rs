use serde_json::Value;

use crate::{JsonPointer, PointerSegment};

pub trait ValueExt {
    fn locate(&self, pointer: &JsonPointer) -> Option<&Value>;

    fn locate_mut(&mut self, pointer: &JsonPointer) -> Option<&mut Value>;

    /// Structural equality where numbers compare by value, so `1 == 1.0`.
    fn json_eq(&self, other: &Value) -> bool;
}

impl ValueExt for Value {
    fn locate(&self, pointer: &JsonPointer) -> Option<&Value> {
        pointer
            .iter()
            .try_fold(self, |acc, segment| match (acc, segment) {
                (Value::Object(obj), PointerSegment::Key(key)) => obj.get(key),
                (Value::Array(array), PointerSegment::Index(idx)) => array.get(*idx),
                _ => None,
            })
    }

    fn locate_mut(&mut self, pointer: &JsonPointer) -> Option<&mut Value> {
        pointer
            .iter()
            .try_fold(self, |acc, segment| match (acc, segment) {
                (Value::Object(obj), PointerSegment::Key(key)) => obj.get_mut(key),
                (Value::Array(array), PointerSegment::Index(idx)) => array.get_mut(*idx),
                _ => None,
            })
    }

    fn json_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => a == b,
            },
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.json_eq(b))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, a)| b.get(key).map(|b| a.json_eq(b)).unwrap_or_default())
            }
            _ => self == other,
        }
    }
}
