use std::cmp::Ordering;

use serde_json::{Map, Value as JsonValue};

use super::{CompareOp, Expr, Function, PathSegment, Query, Selection};
use crate::types::StoreItem;

/// `None` is the query language's `undefined`
type Evaluated = Option<JsonValue>;

pub(crate) fn execute<'a, I>(query: &Query, items: I) -> Vec<JsonValue>
where
    I: IntoIterator<Item = &'a StoreItem>,
{
    let mut matched: Vec<&StoreItem> = items
        .into_iter()
        .filter(|item| match &query.filter {
            Some(filter) => evaluate(filter, item) == Some(JsonValue::Bool(true)),
            None => true,
        })
        .collect();

    if let Some(order) = &query.order_by {
        // stable sort keeps storage order between equal keys
        matched.sort_by(|a, b| {
            let ordering = sort_order(&evaluate(&order.expr, a), &evaluate(&order.expr, b));
            if order.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    if let Selection::Count { expr, value } = &query.selection {
        let count = matched.iter().filter(|item| evaluate(expr, item).is_some()).count();
        let count = JsonValue::from(count as u64);
        return if *value {
            vec![count]
        } else {
            let mut row = Map::new();
            row.insert("$1".to_string(), count);
            vec![JsonValue::Object(row)]
        };
    }

    let limit = query.top.unwrap_or(usize::MAX);
    let mut results = Vec::new();
    for item in matched {
        if results.len() >= limit {
            break;
        }
        match &query.selection {
            Selection::All => results.push(JsonValue::Object(item.clone())),
            Selection::Value(expr) => {
                if let Some(value) = evaluate(expr, item) {
                    results.push(value);
                }
            }
            Selection::Fields(fields) => {
                let mut row = Map::new();
                for field in fields {
                    if let Some(value) = evaluate(&field.expr, item) {
                        row.insert(field.name.clone(), value);
                    }
                }
                results.push(JsonValue::Object(row));
            }
            Selection::Count { .. } => {}
        }
    }
    results
}

fn evaluate(expr: &Expr, item: &StoreItem) -> Evaluated {
    match expr {
        Expr::Literal(value) => Some(value.clone()),
        Expr::Path(segments) => resolve_path(item, segments),
        Expr::Compare { op, lhs, rhs } => compare(*op, evaluate(lhs, item), evaluate(rhs, item)),
        Expr::And(parts) => {
            let mut all_true = true;
            for part in parts {
                match evaluate(part, item) {
                    Some(JsonValue::Bool(false)) => return Some(JsonValue::Bool(false)),
                    Some(JsonValue::Bool(true)) => {}
                    _ => all_true = false,
                }
            }
            all_true.then_some(JsonValue::Bool(true))
        }
        Expr::Or(parts) => {
            let mut all_false = true;
            for part in parts {
                match evaluate(part, item) {
                    Some(JsonValue::Bool(true)) => return Some(JsonValue::Bool(true)),
                    Some(JsonValue::Bool(false)) => {}
                    _ => all_false = false,
                }
            }
            all_false.then_some(JsonValue::Bool(false))
        }
        Expr::Not(inner) => match evaluate(inner, item) {
            Some(JsonValue::Bool(b)) => Some(JsonValue::Bool(!b)),
            _ => None,
        },
        Expr::Call { function, args } => {
            let values: Vec<Evaluated> = args.iter().map(|arg| evaluate(arg, item)).collect();
            call(*function, &values)
        }
    }
}

fn resolve_path(item: &StoreItem, segments: &[PathSegment]) -> Evaluated {
    let Some((first, rest)) = segments.split_first() else {
        return Some(JsonValue::Object(item.clone()));
    };
    let mut current = match first {
        PathSegment::Field(name) => item.get(name)?,
        PathSegment::Index(_) => return None,
    };
    for segment in rest {
        current = match (segment, current) {
            (PathSegment::Field(name), JsonValue::Object(map)) => map.get(name)?,
            (PathSegment::Index(index), JsonValue::Array(values)) => values.get(*index)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

fn compare(op: CompareOp, lhs: Evaluated, rhs: Evaluated) -> Evaluated {
    let (lhs, rhs) = (lhs?, rhs?);
    let ordering = match (&lhs, &rhs) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?)?,
        (JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
        (JsonValue::Null, JsonValue::Null) => Ordering::Equal,
        (JsonValue::Array(_), JsonValue::Array(_)) | (JsonValue::Object(_), JsonValue::Object(_)) => {
            // structured values only support equality
            return match op {
                CompareOp::Eq => Some(JsonValue::Bool(lhs == rhs)),
                CompareOp::Ne => Some(JsonValue::Bool(lhs != rhs)),
                _ => None,
            };
        }
        _ => return None,
    };
    let result = match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    };
    Some(JsonValue::Bool(result))
}

fn call(function: Function, args: &[Evaluated]) -> Evaluated {
    let text = |index: usize| match args.get(index) {
        Some(Some(JsonValue::String(s))) => Some(s.as_str()),
        _ => None,
    };
    match function {
        Function::Lower => Some(JsonValue::String(text(0)?.to_lowercase())),
        Function::Upper => Some(JsonValue::String(text(0)?.to_uppercase())),
        Function::Length => Some(JsonValue::from(text(0)?.chars().count() as u64)),
        Function::IsDefined => Some(JsonValue::Bool(matches!(args.first(), Some(Some(_))))),
        Function::Contains | Function::StartsWith | Function::EndsWith => {
            let (haystack, needle) = (text(0)?, text(1)?);
            let ignore_case = match args.get(2) {
                None => false,
                Some(Some(JsonValue::Bool(flag))) => *flag,
                Some(_) => return None,
            };
            let (haystack, needle) = if ignore_case {
                (haystack.to_lowercase(), needle.to_lowercase())
            } else {
                (haystack.to_string(), needle.to_string())
            };
            let found = match function {
                Function::Contains => haystack.contains(&needle),
                Function::StartsWith => haystack.starts_with(&needle),
                _ => haystack.ends_with(&needle),
            };
            Some(JsonValue::Bool(found))
        }
    }
}

/// Cross-type ordering used by ORDER BY: undefined, null, booleans, numbers, strings, then arrays and objects
fn sort_order(a: &Evaluated, b: &Evaluated) -> Ordering {
    fn rank(value: &Evaluated) -> u8 {
        match value {
            None => 0,
            Some(JsonValue::Null) => 1,
            Some(JsonValue::Bool(_)) => 2,
            Some(JsonValue::Number(_)) => 3,
            Some(JsonValue::String(_)) => 4,
            Some(JsonValue::Array(_)) => 5,
            Some(JsonValue::Object(_)) => 6,
        }
    }

    match (a, b) {
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
