use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

const DATE_FORMAT: &str = "%m/%d/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// FieldType mirrors the field types of a hosted database layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Time,
    Timestamp,
    Container,
    Function,
    Summary,
}

/// RecordField is a single name/value pair of a record.
///
/// Values are always held as text; `Number` fields are emitted unquoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    pub name: String,
    pub value: String,
    pub field_type: FieldType,
}

impl RecordField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            field_type,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, FieldType::Text)
    }

    /// Numeric field from any integer or float
    pub fn number(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(name, value.to_string(), FieldType::Number)
    }

    pub fn date(name: impl Into<String>, value: NaiveDate) -> Self {
        Self::new(name, value.format(DATE_FORMAT).to_string(), FieldType::Date)
    }

    pub fn time(name: impl Into<String>, value: NaiveTime) -> Self {
        Self::new(name, value.format(TIME_FORMAT).to_string(), FieldType::Time)
    }

    pub fn timestamp(name: impl Into<String>, value: NaiveDateTime) -> Self {
        Self::new(
            name,
            value.format(TIMESTAMP_FORMAT).to_string(),
            FieldType::Timestamp,
        )
    }

    /// JSON value as sent in `fieldData`
    pub fn json_value(&self) -> Value {
        if self.field_type != FieldType::Number {
            return Value::String(self.value.clone());
        }
        match parse_number(&self.value) {
            Some(number) => Value::Number(number),
            None => {
                tracing::warn!(
                    "Field {} is numeric but value {:?} has no exact JSON number form, sending as text",
                    self.name,
                    self.value
                );
                Value::String(self.value.clone())
            }
        }
    }
}

/// Integers beyond `u64` are rejected rather than rounded through `f64`
fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// SortOrder of a sort field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascend,
    Descend,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascend => "ascend",
            SortOrder::Descend => "descend",
        }
    }
}

/// FindCriteriaField is one field-match constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCriteriaField {
    pub name: String,
    pub value: String,
}

impl FindCriteriaField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// FindCriteria is a group of constraints ANDed together.
///
/// With `omit` set the whole group is negated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindCriteria {
    pub fields: Vec<FindCriteriaField>,
    pub omit: bool,
}

impl FindCriteria {
    pub fn new(fields: Vec<FindCriteriaField>) -> Self {
        Self {
            fields,
            omit: false,
        }
    }

    pub fn omit(fields: Vec<FindCriteriaField>) -> Self {
        Self { fields, omit: true }
    }

    /// Add a constraint to the group
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FindCriteriaField::new(name, value));
        self
    }

    pub fn to_json(&self) -> Value {
        let mut group = Map::new();
        for field in &self.fields {
            group.insert(field.name.clone(), Value::String(field.value.clone()));
        }
        if self.omit {
            group.insert("omit".to_string(), Value::String("true".to_string()));
        }
        Value::Object(group)
    }
}

/// SortCriteriaField is a field name plus direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriteriaField {
    pub field_name: String,
    pub sort_order: SortOrder,
}

impl SortCriteriaField {
    pub fn new(field_name: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            field_name: field_name.into(),
            sort_order,
        }
    }
}

/// SortCriteria lists sort fields by precedence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortCriteria {
    pub fields: Vec<SortCriteriaField>,
}

impl SortCriteria {
    pub fn new(fields: Vec<SortCriteriaField>) -> Self {
        Self { fields }
    }

    pub fn ascend(mut self, field_name: impl Into<String>) -> Self {
        self.fields
            .push(SortCriteriaField::new(field_name, SortOrder::Ascend));
        self
    }

    pub fn descend(mut self, field_name: impl Into<String>) -> Self {
        self.fields
            .push(SortCriteriaField::new(field_name, SortOrder::Descend));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `{"sort": [...]}` fragment merged into find payloads
    pub fn to_json(&self) -> Map<String, Value> {
        let mut fragment = Map::new();
        let sort = self
            .fields
            .iter()
            .map(|f| {
                let mut entry = Map::new();
                entry.insert("fieldName".to_string(), Value::String(f.field_name.clone()));
                entry.insert(
                    "sortOrder".to_string(),
                    Value::String(f.sort_order.as_str().to_string()),
                );
                Value::Object(entry)
            })
            .collect();
        fragment.insert("sort".to_string(), Value::Array(sort));
        fragment
    }
}

/// PortalRange selects a window of related records in a portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalRange {
    pub portal: String,
    pub offset: u32,
    pub limit: u32,
}

impl PortalRange {
    pub fn new(portal: impl Into<String>) -> Self {
        Self {
            portal: portal.into(),
            offset: 0,
            limit: default_portal_limit(),
        }
    }
}

fn default_portal_limit() -> u32 {
    50
}

/// RecordRange selects a window of records for GET requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRange {
    pub offset: u32,
    pub limit: u32,
}

impl RecordRange {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// Query parameters, offset omitted when zero
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(2);
        if self.offset > 0 {
            pairs.push(("_offset".to_string(), self.offset.to_string()));
        }
        pairs.push(("_limit".to_string(), self.limit.to_string()));
        pairs
    }
}

impl Default for RecordRange {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_field_is_unquoted() {
        assert_eq!(RecordField::number("n", 42).json_value(), json!(42));
        assert_eq!(RecordField::number("n", 1.5).json_value(), json!(1.5));
        assert_eq!(
            RecordField::new("n", " -7 ", FieldType::Number).json_value(),
            json!(-7)
        );
    }

    #[test]
    fn test_large_integers_keep_every_digit() {
        assert_eq!(
            RecordField::number("serial", u64::MAX).json_value(),
            json!(u64::MAX)
        );
        assert_eq!(
            RecordField::number("serial", u64::MAX).json_value().to_string(),
            "18446744073709551615"
        );
        let big = RecordField::new("big", "123456789012345678901234", FieldType::Number);
        assert_eq!(big.json_value(), json!("123456789012345678901234"));
    }

    #[test]
    fn test_invalid_number_falls_back_to_text() {
        let field = RecordField::new("n", "abc", FieldType::Number);
        assert_eq!(field.json_value(), json!("abc"));
    }

    #[test]
    fn test_non_numeric_types_are_strings() {
        assert_eq!(RecordField::text("t", "42").json_value(), json!("42"));
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let field = RecordField::date("d", date);
        assert_eq!(field.field_type, FieldType::Date);
        assert_eq!(field.json_value(), json!("03/09/2024"));

        let ts = date.and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(
            RecordField::timestamp("ts", ts).json_value(),
            json!("03/09/2024 07:05:00")
        );
        assert_eq!(
            RecordField::time("t", ts.time()).json_value(),
            json!("07:05:00")
        );
    }

    #[test]
    fn test_find_group_json() {
        let group = FindCriteria::default().with("city", "Zurich").with("age", ">30");
        assert_eq!(group.to_json(), json!({"city": "Zurich", "age": ">30"}));

        let omitted = FindCriteria::omit(vec![FindCriteriaField::new("city", "Bern")]);
        assert_eq!(omitted.to_json(), json!({"city": "Bern", "omit": "true"}));
    }

    #[test]
    fn test_sort_fragment() {
        let sort = SortCriteria::default().ascend("name").descend("created");
        assert_eq!(
            Value::Object(sort.to_json()),
            json!({"sort": [
                {"fieldName": "name", "sortOrder": "ascend"},
                {"fieldName": "created", "sortOrder": "descend"}
            ]})
        );
    }

    #[test]
    fn test_record_range_query() {
        assert_eq!(
            RecordRange::default().query_pairs(),
            vec![("_limit".to_string(), "100".to_string())]
        );
        assert_eq!(
            RecordRange::new(5, 10).query_pairs(),
            vec![
                ("_offset".to_string(), "5".to_string()),
                ("_limit".to_string(), "10".to_string())
            ]
        );
        assert_eq!(PortalRange::new("Orders").limit, 50);
    }
}
