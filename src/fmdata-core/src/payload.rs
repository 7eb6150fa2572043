//! JSON request bodies for create, edit and find requests

use serde_json::{Map, Value};

use crate::models::{FindCriteria, RecordField, SortCriteria};
use crate::script::ScriptParameters;

const FIELD_DATA: &str = "fieldData";
const QUERY: &str = "query";
const LIMIT: &str = "limit";
const OFFSET: &str = "offset";

/// Overlay every key of `src` onto `dst`.
///
/// Colliding keys are overwritten in place, keys only in `dst` are kept and
/// new keys are appended in `src` order.
pub fn merge_json(dst: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
    tracing::debug!("Merged {} keys, document now has {} keys", src.len(), dst.len());
}

fn field_data(fields: &[RecordField]) -> Map<String, Value> {
    let mut data = Map::new();
    for field in fields {
        tracing::debug!(
            "Field {} = {} ({:?})",
            field.name,
            field.value,
            field.field_type
        );
        data.insert(field.name.clone(), field.json_value());
    }
    data
}

/// `{"fieldData": {...}}` plus the script keys, if any
pub fn generate_payload(fields: &[RecordField], scripts: Option<&ScriptParameters>) -> Value {
    let mut doc = Map::new();
    doc.insert(FIELD_DATA.to_string(), Value::Object(field_data(fields)));
    if let Some(scripts) = scripts {
        merge_json(&mut doc, &scripts.to_json());
    }
    Value::Object(doc)
}

pub fn generate_create_payload(fields: &[RecordField]) -> Value {
    generate_payload(fields, None)
}

/// Body of a `_find` request.
///
/// Groups are ORed together. `offset` is only sent when positive.
pub fn generate_find_payload(
    groups: &[FindCriteria],
    limit: u32,
    offset: u32,
    sort: Option<&SortCriteria>,
    scripts: Option<&ScriptParameters>,
) -> Value {
    let mut doc = Map::new();
    let query = groups.iter().map(FindCriteria::to_json).collect();
    doc.insert(QUERY.to_string(), Value::Array(query));
    doc.insert(LIMIT.to_string(), Value::from(limit));
    if offset > 0 {
        doc.insert(OFFSET.to_string(), Value::from(offset));
    }
    if let Some(sort) = sort.filter(|s| !s.is_empty()) {
        merge_json(&mut doc, &sort.to_json());
    }
    if let Some(scripts) = scripts {
        merge_json(&mut doc, &scripts.to_json());
    }
    let doc = Value::Object(doc);
    tracing::debug!("Find payload: {}", doc);
    doc
}

/// A find request with its paging, sort and script options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindRequest {
    pub groups: Vec<FindCriteria>,
    pub limit: u32,
    pub offset: u32,
    pub sort: Option<SortCriteria>,
    pub scripts: Option<ScriptParameters>,
}

impl FindRequest {
    pub fn new(groups: Vec<FindCriteria>) -> Self {
        Self {
            groups,
            limit: default_limit(),
            offset: 0,
            sort: None,
            scripts: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn sort(mut self, sort: SortCriteria) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn scripts(mut self, scripts: ScriptParameters) -> Self {
        self.scripts = Some(scripts);
        self
    }

    pub fn to_payload(&self) -> Value {
        generate_find_payload(
            &self.groups,
            self.limit,
            self.offset,
            self.sort.as_ref(),
            self.scripts.as_ref(),
        )
    }
}

fn default_limit() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldType, FindCriteriaField};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_merge_overwrites_and_appends() {
        let mut dst = object(json!({"a": 1, "b": 2}));
        merge_json(&mut dst, &object(json!({"b": 3, "c": 4})));
        assert_eq!(Value::Object(dst.clone()), json!({"a": 1, "b": 3, "c": 4}));
        let keys: Vec<&String> = dst.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_empty_source_is_noop() {
        let mut dst = object(json!({"a": 1}));
        merge_json(&mut dst, &Map::new());
        assert_eq!(Value::Object(dst), json!({"a": 1}));
    }

    #[test]
    fn test_create_payload_keeps_types_and_order() {
        let fields = vec![
            RecordField::text("zeta", "last"),
            RecordField::number("count", 3),
            RecordField::new("alpha", "07", FieldType::Text),
        ];
        let payload = generate_create_payload(&fields);
        let text = payload.to_string();
        assert_eq!(
            text,
            r#"{"fieldData":{"zeta":"last","count":3,"alpha":"07"}}"#
        );

        let parsed: Value = serde_json::from_str(&text).unwrap();
        let data = parsed["fieldData"].as_object().unwrap();
        let keys: Vec<&String> = data.keys().collect();
        assert_eq!(keys, vec!["zeta", "count", "alpha"]);
        assert!(data["count"].is_number());
        assert!(data["alpha"].is_string());
    }

    #[test]
    fn test_payload_with_scripts() {
        let fields = vec![RecordField::text("label", "x")];
        let scripts = ScriptParameters::script("OnCreate", "42");
        assert_eq!(
            generate_payload(&fields, Some(&scripts)),
            json!({
                "fieldData": {"label": "x"},
                "script": "OnCreate",
                "script.param": "42"
            })
        );
    }

    #[test]
    fn test_find_payload_groups() {
        let groups = vec![
            FindCriteria::new(vec![FindCriteriaField::new("field1", "A")]),
            FindCriteria::omit(vec![FindCriteriaField::new("field1", "B")]),
        ];
        let payload = generate_find_payload(&groups, 100, 0, None, None);
        assert_eq!(
            payload,
            json!({
                "query": [{"field1": "A"}, {"field1": "B", "omit": "true"}],
                "limit": 100
            })
        );
        assert!(payload.get("offset").is_none());
    }

    #[test]
    fn test_find_request_full() {
        let request = FindRequest::new(vec![FindCriteria::default().with("city", "Basel")])
            .limit(10)
            .offset(20)
            .sort(SortCriteria::default().descend("created"))
            .scripts(ScriptParameters::default().with_presort("Prep", ""));
        let payload = request.to_payload();
        assert_eq!(
            payload,
            json!({
                "query": [{"city": "Basel"}],
                "limit": 10,
                "offset": 20,
                "sort": [{"fieldName": "created", "sortOrder": "descend"}],
                "script.presort": "Prep"
            })
        );
        let keys: Vec<&String> = payload.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["query", "limit", "offset", "sort", "script.presort"]);
    }

    #[test]
    fn test_find_request_defaults() {
        let request = FindRequest::new(Vec::new());
        assert_eq!(request.limit, 100);
        assert_eq!(request.offset, 0);
        assert_eq!(request.to_payload(), json!({"query": [], "limit": 100}));
    }
}
