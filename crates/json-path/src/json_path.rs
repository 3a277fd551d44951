use std::{
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{parser::parse_json_path, JsonPointer, ParseJsonPathError, PointerSegment, Segment};

/// A parsed JSONPath expression.
///
/// Evaluation never fails: an expression that matches nothing yields an empty
/// selection, and callers decide whether that is an error.
#[derive(Clone, PartialEq, Eq)]
pub struct JsonPath(Vec<Segment>);

/// A borrowed prefix of a [`JsonPath`].
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct JsonPathRef<'a>(&'a [Segment]);

impl Display for JsonPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.as_ref(), f)
    }
}

impl Debug for JsonPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for JsonPathRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in self.0 {
            Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl Debug for JsonPathRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

// Literals hold `serde_json::Value`, which has no `Hash`. The canonical text
// form is equal exactly when the segments are.
impl Hash for JsonPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_ref().hash(state);
    }
}

impl Hash for JsonPathRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl FromStr for JsonPath {
    type Err = ParseJsonPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_json_path(s).map(Self)
    }
}

impl Serialize for JsonPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_json_path(&String::deserialize(deserializer)?)
            .map(Self)
            .map_err(|err| D::Error::custom(err.to_string()))
    }
}

impl JsonPath {
    #[inline]
    pub fn root() -> JsonPath {
        JsonPath(Vec::new())
    }

    #[inline]
    pub fn as_ref(&self) -> JsonPathRef<'_> {
        JsonPathRef(&self.0)
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the expression can only ever address a single location.
    pub fn is_definite(&self) -> bool {
        self.0
            .iter()
            .all(|segment| matches!(segment, Segment::Child(_) | Segment::Index(_)))
    }

    pub fn split_last(&self) -> Option<(JsonPathRef<'_>, &Segment)> {
        self.as_ref().split_last()
    }

    pub fn select(&self, root: &Value) -> Vec<JsonPointer> {
        self.as_ref().select(root)
    }

    pub fn query<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        self.as_ref().query(root)
    }
}

impl<'a> JsonPathRef<'a> {
    #[inline]
    pub fn segments(&self) -> &'a [Segment] {
        self.0
    }

    pub fn to_owned(&self) -> JsonPath {
        JsonPath(self.0.to_vec())
    }

    pub fn split_last(&self) -> Option<(JsonPathRef<'a>, &'a Segment)> {
        self.0
            .split_last()
            .map(|(last, parent)| (JsonPathRef(parent), last))
    }

    /// Concrete locations of every match, in document order.
    pub fn select(&self, root: &Value) -> Vec<JsonPointer> {
        evaluate(root, self.0)
            .into_iter()
            .map(|(pointer, _)| pointer)
            .collect()
    }

    pub fn query<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        evaluate(root, self.0)
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }
}

fn evaluate<'v>(root: &'v Value, segments: &[Segment]) -> Vec<(JsonPointer, &'v Value)> {
    let mut current = vec![(JsonPointer::root(), root)];

    for segment in segments {
        let mut next = Vec::new();

        for (pointer, value) in current {
            match (segment, value) {
                (Segment::Child(name), Value::Object(obj)) => {
                    if let Some(child) = obj.get(name) {
                        next.push((pointer.child(PointerSegment::Key(name.clone())), child));
                    }
                }
                (Segment::Index(index), Value::Array(array)) => {
                    if let Some(child) = array.get(*index) {
                        next.push((pointer.child(PointerSegment::Index(*index)), child));
                    }
                }
                (Segment::Wildcard, Value::Object(obj)) => {
                    next.extend(obj.iter().map(|(key, child)| {
                        (pointer.child(PointerSegment::Key(key.clone())), child)
                    }));
                }
                (Segment::Wildcard, Value::Array(array)) => {
                    next.extend(array.iter().enumerate().map(|(index, child)| {
                        (pointer.child(PointerSegment::Index(index)), child)
                    }));
                }
                (Segment::Filter(expr), Value::Object(obj)) => {
                    next.extend(obj.iter().filter(|(_, child)| expr.matches(child)).map(
                        |(key, child)| (pointer.child(PointerSegment::Key(key.clone())), child),
                    ));
                }
                (Segment::Filter(expr), Value::Array(array)) => {
                    next.extend(
                        array
                            .iter()
                            .enumerate()
                            .filter(|(_, child)| expr.matches(child))
                            .map(|(index, child)| {
                                (pointer.child(PointerSegment::Index(index)), child)
                            }),
                    );
                }
                _ => {}
            }
        }

        current = next;
    }

    current
}
