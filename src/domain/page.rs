//! Raw Notion page model.
//!
//! Property values arrive as JSON objects discriminated by a `type` field.
//! Parsing never fails: shapes we do not recognize fall through to the
//! `Other` variant carrying the single field named by the type tag, and
//! malformed inner shapes degrade to empty values.

use serde_json::Value;
use std::collections::BTreeMap;

/// One fetched remote page, before relation resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub id: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl RawPage {
    /// Parse a Notion page object. Pages without a `properties` map
    /// (partial responses) yield an empty property set.
    pub fn from_json(json: &Value) -> Self {
        let id = json
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut properties = BTreeMap::new();
        if let Some(props) = json.get("properties").and_then(|v| v.as_object()) {
            for (name, value) in props {
                properties.insert(name.clone(), PropertyValue::from_json(value));
            }
        }

        RawPage { id, properties }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RollupValue {
    Array(Vec<PropertyValue>),
    Single(Box<PropertyValue>),
}

/// Tagged union over Notion property payloads. Exactly one type-named
/// field of the source JSON is captured per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(Vec<String>),
    RichText(Vec<String>),
    Select(Option<SelectOption>),
    Status(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Date(Option<DateRange>),
    Files(Vec<FileRef>),
    Formula(Box<PropertyValue>),
    Rollup(RollupValue),
    /// Unresolved relation: the referenced page ids, original order.
    Relation(Vec<String>),
    /// Forward-compatible catch-all: the raw field named by the type tag.
    Other { kind: String, value: Value },
}

impl PropertyValue {
    pub fn from_json(json: &Value) -> Self {
        let kind = json.get("type").and_then(|v| v.as_str()).unwrap_or("");

        match kind {
            "title" => PropertyValue::Title(parse_plain_texts(json.get("title"))),
            "rich_text" => PropertyValue::RichText(parse_plain_texts(json.get("rich_text"))),
            "select" => PropertyValue::Select(parse_option(json.get("select"))),
            "status" => PropertyValue::Status(parse_option(json.get("status"))),
            "multi_select" => PropertyValue::MultiSelect(
                json.get("multi_select")
                    .and_then(|v| v.as_array())
                    .map(|items| items.iter().filter_map(|i| parse_option(Some(i))).collect())
                    .unwrap_or_default(),
            ),
            "date" => PropertyValue::Date(parse_date(json.get("date"))),
            "files" => PropertyValue::Files(
                json.get("files")
                    .and_then(|v| v.as_array())
                    .map(|items| items.iter().map(parse_file).collect())
                    .unwrap_or_default(),
            ),
            "formula" => PropertyValue::Formula(Box::new(PropertyValue::from_json(
                json.get("formula").unwrap_or(&Value::Null),
            ))),
            "rollup" => PropertyValue::Rollup(parse_rollup(json.get("rollup"))),
            "relation" => PropertyValue::Relation(
                json.get("relation")
                    .and_then(|v| v.as_array())
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|i| i.get("id").and_then(|v| v.as_str()))
                            .filter(|id| !id.is_empty())
                            .map(|id| id.to_string())
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            other => PropertyValue::Other {
                kind: other.to_string(),
                value: json.get(other).cloned().unwrap_or(Value::Null),
            },
        }
    }
}

fn parse_plain_texts(json: Option<&Value>) -> Vec<String> {
    json.and_then(|v| v.as_array())
        .map(|spans| {
            spans
                .iter()
                .filter_map(|s| s.get("plain_text").and_then(|v| v.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_option(json: Option<&Value>) -> Option<SelectOption> {
    let name = json?.get("name")?.as_str()?;
    Some(SelectOption {
        name: name.to_string(),
    })
}

fn parse_date(json: Option<&Value>) -> Option<DateRange> {
    let obj = json?.as_object()?;
    Some(DateRange {
        start: obj.get("start").and_then(|v| v.as_str()).map(String::from),
        end: obj.get("end").and_then(|v| v.as_str()).map(String::from),
    })
}

fn parse_file(json: &Value) -> FileRef {
    let url = match json.get("type").and_then(|v| v.as_str()) {
        Some("file") => json
            .get("file")
            .and_then(|f| f.get("url"))
            .and_then(|v| v.as_str()),
        Some("external") => json
            .get("external")
            .and_then(|f| f.get("url"))
            .and_then(|v| v.as_str()),
        _ => None,
    };
    FileRef {
        url: url.map(String::from),
    }
}

fn parse_rollup(json: Option<&Value>) -> RollupValue {
    let json = json.unwrap_or(&Value::Null);
    if json.get("type").and_then(|v| v.as_str()) == Some("array") {
        let items = json
            .get("array")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(PropertyValue::from_json).collect())
            .unwrap_or_default();
        RollupValue::Array(items)
    } else {
        RollupValue::Single(Box::new(PropertyValue::from_json(json)))
    }
}

/// A page with all relation properties recursively resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PageNode {
    pub id: String,
    pub properties: BTreeMap<String, ResolvedProperty>,
}

impl PageNode {
    /// Placeholder for a page already seen on the current resolution path.
    pub fn stub(id: String) -> Self {
        PageNode {
            id,
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedProperty {
    Value(PropertyValue),
    Relations(Vec<PageNode>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_title_property() {
        let value = PropertyValue::from_json(&json!({
            "type": "title",
            "title": [
                {"plain_text": "INV-001"},
                {"plain_text": " draft "}
            ]
        }));
        assert_eq!(
            value,
            PropertyValue::Title(vec!["INV-001".to_string(), " draft ".to_string()])
        );
    }

    #[test]
    fn test_parse_select_unset_is_none() {
        let value = PropertyValue::from_json(&json!({"type": "select", "select": null}));
        assert_eq!(value, PropertyValue::Select(None));
    }

    #[test]
    fn test_parse_relation_filters_empty_ids() {
        let value = PropertyValue::from_json(&json!({
            "type": "relation",
            "relation": [{"id": "a"}, {"id": ""}, {"name": "no id"}, {"id": "b"}]
        }));
        assert_eq!(
            value,
            PropertyValue::Relation(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_parse_files_mixed_kinds() {
        let value = PropertyValue::from_json(&json!({
            "type": "files",
            "files": [
                {"type": "file", "file": {"url": "https://hosted/a.pdf"}},
                {"type": "external", "external": {"url": "https://ext/b.pdf"}},
                {"type": "unknown"}
            ]
        }));
        let PropertyValue::Files(files) = value else {
            panic!("Expected files variant");
        };
        assert_eq!(files[0].url.as_deref(), Some("https://hosted/a.pdf"));
        assert_eq!(files[1].url.as_deref(), Some("https://ext/b.pdf"));
        assert_eq!(files[2].url, None);
    }

    #[test]
    fn test_parse_unknown_type_captures_named_field() {
        let value = PropertyValue::from_json(&json!({
            "type": "number",
            "number": 42.5
        }));
        assert_eq!(
            value,
            PropertyValue::Other {
                kind: "number".to_string(),
                value: json!(42.5),
            }
        );
    }

    #[test]
    fn test_parse_unknown_type_missing_field_is_null() {
        let value = PropertyValue::from_json(&json!({"type": "checkbox"}));
        assert_eq!(
            value,
            PropertyValue::Other {
                kind: "checkbox".to_string(),
                value: Value::Null,
            }
        );
    }

    #[test]
    fn test_parse_rollup_array() {
        let value = PropertyValue::from_json(&json!({
            "type": "rollup",
            "rollup": {
                "type": "array",
                "array": [{"type": "number", "number": 1}]
            }
        }));
        let PropertyValue::Rollup(RollupValue::Array(items)) = value else {
            panic!("Expected array rollup");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_parse_page_without_properties() {
        let page = RawPage::from_json(&json!({"id": "p1"}));
        assert_eq!(page.id, "p1");
        assert!(page.properties.is_empty());
    }
}
