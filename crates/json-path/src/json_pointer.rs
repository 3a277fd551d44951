use std::fmt::{self, Debug, Display, Formatter, Write};

use serde::{Serialize, Serializer};

/// One step of a concrete location inside a JSON document.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum PointerSegment {
    Key(String),
    Index(usize),
}

impl Display for PointerSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PointerSegment::Key(key) => {
                for ch in key.chars() {
                    match ch {
                        '~' => f.write_str("~0")?,
                        '/' => f.write_str("~1")?,
                        _ => f.write_char(ch)?,
                    }
                }
                Ok(())
            }
            PointerSegment::Index(index) => Display::fmt(index, f),
        }
    }
}

impl Debug for PointerSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A concrete location produced by evaluating a [`JsonPath`](crate::JsonPath).
///
/// Unlike a path expression, a pointer always addresses at most one value.
/// It is rendered in RFC 6901 form (`/values/0/value`).
#[derive(Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct JsonPointer(pub(crate) Vec<PointerSegment>);

impl Display for JsonPointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            f.write_str("/")?;
            Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl Debug for JsonPointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl FromIterator<PointerSegment> for JsonPointer {
    fn from_iter<I: IntoIterator<Item = PointerSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl JsonPointer {
    #[inline]
    pub fn root() -> JsonPointer {
        JsonPointer(Vec::new())
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointerSegment> {
        self.0.iter()
    }

    #[must_use]
    pub fn child(&self, segment: PointerSegment) -> JsonPointer {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        JsonPointer(segments)
    }

    pub fn push(&mut self, segment: PointerSegment) {
        self.0.push(segment);
    }

    pub fn split_last(&self) -> Option<(JsonPointer, &PointerSegment)> {
        self.0
            .split_last()
            .map(|(last, parent)| (JsonPointer(parent.to_vec()), last))
    }
}
