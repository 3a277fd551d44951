use serde_json::Value;

use crate::{CompareOp, FilterExpr, JsonPath, JsonPointer, Operand, PointerSegment, Segment};

/// Returns the culture a patch path targets, e.g. `en-US` for
/// `$.values[?(@.alias == 'title' && @.culture == 'en-US')].value`.
///
/// Culture-agnostic paths, `@.culture == null` and unparsable paths all yield `None`.
pub fn extract_culture(path: &str) -> Option<String> {
    extract_variant_field(path, "culture")
}

/// Same as [`extract_culture`], for `@.segment`.
pub fn extract_segment(path: &str) -> Option<String> {
    extract_variant_field(path, "segment")
}

/// Every culture literal compared with `@.culture ==` anywhere in the path's
/// filters, including those behind `||` and `!`.
pub fn extract_cultures(path: &JsonPath) -> Vec<String> {
    collect_variant_field(path, "culture")
}

pub fn extract_segments(path: &JsonPath) -> Vec<String> {
    collect_variant_field(path, "segment")
}

fn extract_variant_field(path: &str, field: &str) -> Option<String> {
    let path = path.parse::<JsonPath>().ok()?;
    path.segments().iter().find_map(|segment| match segment {
        Segment::Filter(expr) => find_equality(expr, field),
        _ => None,
    })
}

fn collect_variant_field(path: &JsonPath, field: &str) -> Vec<String> {
    let mut values = Vec::new();
    for segment in path.segments() {
        if let Segment::Filter(expr) = segment {
            collect_equalities(expr, field, &mut values);
        }
    }
    values
}

fn collect_equalities(expr: &FilterExpr, field: &str, values: &mut Vec<String>) {
    match expr {
        FilterExpr::And(left, right) | FilterExpr::Or(left, right) => {
            collect_equalities(left, field, values);
            collect_equalities(right, field, values);
        }
        FilterExpr::Not(expr) => collect_equalities(expr, field, values),
        FilterExpr::Compare { .. } => {
            if let Some(value) = find_equality(expr, field) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        FilterExpr::Exists(_) => {}
    }
}

fn find_equality(expr: &FilterExpr, field: &str) -> Option<String> {
    match expr {
        FilterExpr::And(left, right) | FilterExpr::Or(left, right) => {
            find_equality(left, field).or_else(|| find_equality(right, field))
        }
        FilterExpr::Compare {
            left,
            op: CompareOp::Eq,
            right,
        } => match (left, right) {
            (Operand::Current(pointer), Operand::Literal(Value::String(value)))
            | (Operand::Literal(Value::String(value)), Operand::Current(pointer))
                if is_field(pointer, field) =>
            {
                Some(value.clone())
            }
            _ => None,
        },
        _ => None,
    }
}

fn is_field(pointer: &JsonPointer, field: &str) -> bool {
    let mut segments = pointer.iter();
    matches!(
        (segments.next(), segments.next()),
        (Some(PointerSegment::Key(key)), None) if key == field
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn culture() {
        assert_eq!(
            extract_culture("$.values[?(@.alias == 'title' && @.culture == 'en-US')].value"),
            Some("en-US".to_string())
        );
        assert_eq!(
            extract_culture("$.variants[?(@.culture == \"da-DK\")].name"),
            Some("da-DK".to_string())
        );
        assert_eq!(
            extract_culture("$.values[?('en-US' == @.culture)].value"),
            Some("en-US".to_string())
        );
        assert_eq!(
            extract_culture("$.values[?(@.alias == 'title' && @.culture == null)].value"),
            None
        );
        assert_eq!(extract_culture("$.values[?(@.alias == 'title')].value"), None);
        assert_eq!(extract_culture("$.values[?(@.culture != 'en-US')]"), None);
        assert_eq!(extract_culture("$.values[?(!(@.culture == 'en-US'))]"), None);
        assert_eq!(extract_culture("not a path"), None);
    }

    #[test]
    fn all_cultures() {
        let cultures = |path: &str| extract_cultures(&path.parse().unwrap());
        assert_eq!(
            cultures(
                "$.values[?(@.alias == 'body' && (@.culture == 'en-US' || @.culture == 'da-DK'))].value"
            ),
            vec!["en-US".to_string(), "da-DK".to_string()]
        );
        assert_eq!(
            cultures("$.values[?(!(@.culture == 'en-US'))].value"),
            vec!["en-US".to_string()]
        );
        assert_eq!(
            cultures("$.values[?(@.culture == 'en-US' || 'en-US' == @.culture)]"),
            vec!["en-US".to_string()]
        );
        assert!(cultures("$.values[*].value").is_empty());
        assert_eq!(
            extract_segments(&"$.values[?(@.segment == 'a' || @.segment == 'b')]".parse().unwrap()),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn segment() {
        assert_eq!(
            extract_segment(
                "$.values[?(@.alias == 'title' && @.culture == 'en-US' && @.segment == 'vip')].value"
            ),
            Some("vip".to_string())
        );
        assert_eq!(
            extract_segment("$.values[?(@.alias == 'title' && @.culture == 'en-US')].value"),
            None
        );
    }
}
