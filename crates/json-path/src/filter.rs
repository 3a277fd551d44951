use std::cmp::Ordering;

use serde_json::Value;

use crate::{CompareOp, FilterExpr, Operand, ValueExt};

impl FilterExpr {
    /// Evaluates the predicate with `current` bound to `@`.
    pub fn matches(&self, current: &Value) -> bool {
        match self {
            FilterExpr::Or(left, right) => left.matches(current) || right.matches(current),
            FilterExpr::And(left, right) => left.matches(current) && right.matches(current),
            FilterExpr::Not(expr) => !expr.matches(current),
            FilterExpr::Exists(pointer) => current.locate(pointer).is_some(),
            FilterExpr::Compare { left, op, right } => {
                compare(left.resolve(current), *op, right.resolve(current))
            }
        }
    }
}

impl Operand {
    fn resolve<'a>(&'a self, current: &'a Value) -> Option<&'a Value> {
        match self {
            Operand::Current(pointer) => current.locate(pointer),
            Operand::Literal(value) => Some(value),
        }
    }
}

fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compare(left: Option<&Value>, op: CompareOp, right: Option<&Value>) -> bool {
    let equal = match (left, right) {
        (Some(a), Some(b)) => a.json_eq(b),
        (None, None) => true,
        _ => false,
    };

    match op {
        CompareOp::Eq => equal,
        CompareOp::Ne => !equal,
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ord = match (left, right) {
                (Some(a), Some(b)) => ordering(a, b),
                _ => None,
            };
            match (op, ord) {
                (CompareOp::Lt, Some(ord)) => ord == Ordering::Less,
                (CompareOp::Le, Some(ord)) => ord != Ordering::Greater,
                (CompareOp::Gt, Some(ord)) => ord == Ordering::Greater,
                (CompareOp::Ge, Some(ord)) => ord != Ordering::Less,
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{JsonPath, Segment};

    fn filter(expr: &str) -> crate::FilterExpr {
        let path: JsonPath = format!("$[?({})]", expr).parse().unwrap();
        match path.segments() {
            [Segment::Filter(expr)] => expr.clone(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn equality() {
        let value = json!({ "alias": "title", "culture": null, "count": 2 });
        assert!(filter("@.alias == 'title'").matches(&value));
        assert!(!filter("@.alias == 'body'").matches(&value));
        assert!(filter("@.culture == null").matches(&value));
        assert!(filter("@.count == 2.0").matches(&value));
        assert!(filter("@.missing != 'x'").matches(&value));
        assert!(!filter("@.missing == null").matches(&value));
        assert!(filter("@.missing == @.other").matches(&value));
    }

    #[test]
    fn ordering() {
        let value = json!({ "count": 2, "name": "b" });
        assert!(filter("@.count > 1").matches(&value));
        assert!(filter("@.count <= 2").matches(&value));
        assert!(!filter("@.count < 2").matches(&value));
        assert!(filter("@.name >= 'a'").matches(&value));
        assert!(!filter("@.name > 1").matches(&value));
        assert!(!filter("@.missing < 1").matches(&value));
    }

    #[test]
    fn logical() {
        let value = json!({ "alias": "title", "culture": "en-US" });
        assert!(filter("@.alias == 'title' && @.culture == 'en-US'").matches(&value));
        assert!(!filter("@.alias == 'title' && @.culture == 'da-DK'").matches(&value));
        assert!(filter("@.alias == 'body' || @.culture").matches(&value));
        assert!(filter("!(@.alias == 'body')").matches(&value));
        assert!(!filter("!@.culture").matches(&value));
    }

    #[test]
    fn null_member_exists() {
        let value = json!({ "culture": null });
        assert!(filter("@.culture").matches(&value));
        assert!(!filter("!@.culture").matches(&value));
        assert!(!filter("@.culture != null").matches(&value));
        assert!(!filter("@.segment").matches(&json!({ "culture": null })));
    }
}
