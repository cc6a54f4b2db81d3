//! Canonical ordering of serialized graph entries.
//!
//! [`compare`] is a total order over JSON values. Two values compare equal
//! only when they are structurally identical, so sorting a graph with it
//! yields the same output regardless of the order entries were produced in.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value as Json};

use crate::vocab::SPDX_ID_FIELD;

fn kind_rank(value: &Json) -> u8 {
    match value {
        Json::Null => 0,
        Json::Bool(_) => 1,
        Json::Number(_) => 2,
        Json::String(_) => 3,
        Json::Array(_) => 4,
        Json::Object(_) => 5,
    }
}

/// Short name of a JSON value kind, for error messages.
pub fn kind_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Orders JSON values.
///
/// - Values of different kinds order null < boolean < number < string < array < object.
/// - Arrays order by length, then element-wise after sorting both sides,
///   then element-wise in their original order.
/// - Objects without an `spdxId` precede objects with one. Objects with ids
///   order by id; ties and id-less objects compare field by field over the
///   sorted union of field names, a missing field ordering last.
pub fn compare(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Null, Json::Null) => Ordering::Equal,
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        (Json::Number(x), Json::Number(y)) => compare_numbers(x, y),
        (Json::String(x), Json::String(y)) => x.cmp(y),
        (Json::Array(x), Json::Array(y)) => compare_arrays(x, y),
        (Json::Object(x), Json::Object(y)) => compare_objects(x, y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    let by_value = match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => match (x.as_u64(), y.as_u64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let a = x.as_f64().unwrap_or(f64::NAN);
                let b = y.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
        },
    };
    // 1 and 1.0 are equal in value but not in text.
    by_value.then_with(|| x.to_string().cmp(&y.to_string()))
}

fn compare_arrays(x: &[Json], y: &[Json]) -> Ordering {
    x.len()
        .cmp(&y.len())
        .then_with(|| {
            let mut xs: Vec<&Json> = x.iter().collect();
            let mut ys: Vec<&Json> = y.iter().collect();
            xs.sort_by(|a, b| compare(a, b));
            ys.sort_by(|a, b| compare(a, b));
            compare_sequences(xs.into_iter(), ys.into_iter())
        })
        .then_with(|| compare_sequences(x.iter(), y.iter()))
}

fn compare_sequences<'a>(
    x: impl Iterator<Item = &'a Json>,
    y: impl Iterator<Item = &'a Json>,
) -> Ordering {
    for (a, b) in x.zip(y) {
        let ord = compare(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_objects(x: &Map<String, Json>, y: &Map<String, Json>) -> Ordering {
    match (x.get(SPDX_ID_FIELD), y.get(SPDX_ID_FIELD)) {
        (Some(a), Some(b)) => compare(a, b).then_with(|| compare_fields(x, y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => compare_fields(x, y),
    }
}

fn compare_fields(x: &Map<String, Json>, y: &Map<String, Json>) -> Ordering {
    let mut names: Vec<&String> = x.keys().chain(y.keys()).collect();
    names.sort();
    names.dedup();
    for name in names {
        let ord = match (x.get(name), y.get(name)) {
            (Some(a), Some(b)) => compare(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Sorts graph entries into canonical order.
pub fn sort_entries(entries: &mut [Json]) {
    entries.sort_by(compare);
}
