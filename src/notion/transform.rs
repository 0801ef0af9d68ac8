//! Property transformer: converts a resolved page tree into a flat
//! normalized record suitable for templating.
//!
//! Pure functions, no I/O. Unknown shapes degrade to `null` rather than
//! failing; the caller decides which fields are required.

use crate::domain::{PageNode, PropertyValue, ResolvedProperty, RollupValue};
use serde_json::{json, Map, Value};

/// Normalize a property name: lowercase, runs of non-word characters
/// collapsed to a single underscore.
pub fn snake_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            key.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            key.push('_');
            last_was_sep = true;
        }
    }
    key
}

/// Transform a resolved page into a normalized record. The page id is
/// kept under `id` so related records stay addressable after flattening.
pub fn transform_page(node: &PageNode) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(node.id.clone()));
    for (name, property) in &node.properties {
        record.insert(snake_key(name), transform_resolved(property));
    }
    record
}

fn transform_resolved(property: &ResolvedProperty) -> Value {
    match property {
        ResolvedProperty::Value(value) => transform_value(value),
        ResolvedProperty::Relations(nodes) => Value::Array(
            nodes
                .iter()
                .map(|node| Value::Object(transform_page(node)))
                .collect(),
        ),
    }
}

/// Transform a single property value by its type.
pub fn transform_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Title(spans) | PropertyValue::RichText(spans) => {
            Value::String(join_spans(spans))
        }

        PropertyValue::Select(option) | PropertyValue::Status(option) => option
            .as_ref()
            .map(|o| Value::String(o.name.clone()))
            .unwrap_or(Value::Null),

        PropertyValue::MultiSelect(options) => Value::Array(
            options
                .iter()
                .map(|o| Value::String(o.name.clone()))
                .collect(),
        ),

        PropertyValue::Date(range) => match range {
            Some(range) => match (&range.start, &range.end) {
                (Some(start), Some(end)) => json!({"start": start, "end": end}),
                (Some(start), None) => Value::String(start.clone()),
                _ => Value::Null,
            },
            None => Value::Null,
        },

        PropertyValue::Files(files) => Value::Array(
            files
                .iter()
                .filter_map(|f| f.url.clone())
                .map(Value::String)
                .collect(),
        ),

        PropertyValue::Formula(inner) => transform_value(inner),

        PropertyValue::Rollup(rollup) => match rollup {
            RollupValue::Array(items) => {
                Value::Array(items.iter().map(transform_value).collect())
            }
            RollupValue::Single(inner) => transform_value(inner),
        },

        // An unresolved relation only carries ids; keep them addressable.
        PropertyValue::Relation(ids) => Value::Array(
            ids.iter().map(|id| json!({"id": id})).collect(),
        ),

        PropertyValue::Other { value, .. } => value.clone(),
    }
}

fn join_spans(spans: &[String]) -> String {
    spans
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
