use serde_json::{Map, Value};
use urlencoding::encode;

use crate::endpoints::HttpMethod;

const SCRIPT: &str = "script";
const SCRIPT_PARAM: &str = "script.param";
const SCRIPT_PREREQUEST: &str = "script.prerequest";
const SCRIPT_PREREQUEST_PARAM: &str = "script.prerequest.param";
const SCRIPT_PRESORT: &str = "script.presort";
const SCRIPT_PRESORT_PARAM: &str = "script.presort.param";

/// Server-side scripts to run with a request: the main script, one run
/// before the request, and one run before sorting.
///
/// Empty entries are left out of every serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptParameters {
    pub name: String,
    pub parameter: String,
    pub prerequest_name: String,
    pub prerequest_parameter: String,
    pub presort_name: String,
    pub presort_parameter: String,
}

impl ScriptParameters {
    pub fn new(
        name: impl Into<String>,
        parameter: impl Into<String>,
        prerequest_name: impl Into<String>,
        prerequest_parameter: impl Into<String>,
        presort_name: impl Into<String>,
        presort_parameter: impl Into<String>,
    ) -> Self {
        let scripts = Self {
            name: name.into(),
            parameter: parameter.into(),
            prerequest_name: prerequest_name.into(),
            prerequest_parameter: prerequest_parameter.into(),
            presort_name: presort_name.into(),
            presort_parameter: presort_parameter.into(),
        };
        tracing::debug!(?scripts, "Script parameters");
        scripts
    }

    /// Only the main script
    pub fn script(name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: parameter.into(),
            ..Default::default()
        }
    }

    pub fn with_prerequest(mut self, name: impl Into<String>, parameter: impl Into<String>) -> Self {
        self.prerequest_name = name.into();
        self.prerequest_parameter = parameter.into();
        self
    }

    pub fn with_presort(mut self, name: impl Into<String>, parameter: impl Into<String>) -> Self {
        self.presort_name = name.into();
        self.presort_parameter = parameter.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }

    fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (SCRIPT, self.name.as_str()),
            (SCRIPT_PARAM, self.parameter.as_str()),
            (SCRIPT_PREREQUEST, self.prerequest_name.as_str()),
            (SCRIPT_PREREQUEST_PARAM, self.prerequest_parameter.as_str()),
            (SCRIPT_PRESORT, self.presort_name.as_str()),
            (SCRIPT_PRESORT_PARAM, self.presort_parameter.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
    }

    /// JSON object for POST and PATCH bodies
    pub fn to_json(&self) -> Map<String, Value> {
        self.pairs()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect()
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.to_json()).to_string()
    }

    /// `?key=value&...` for GET and DELETE, or an empty string
    pub fn to_query_string(&self) -> String {
        let query = self
            .pairs()
            .map(|(key, value)| format!("{}={}", key, encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            query
        } else {
            format!("?{}", query)
        }
    }

    /// Encoding the Data API expects for the given verb
    pub fn format_parameters(&self, method: HttpMethod) -> String {
        match method {
            HttpMethod::Get | HttpMethod::Delete => self.to_query_string(),
            HttpMethod::Post | HttpMethod::Patch => self.to_json_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_present_keys_are_serialized() {
        let scripts = ScriptParameters::new("S", "1", "", "", "", "");
        assert_eq!(
            scripts.format_parameters(HttpMethod::Post),
            r#"{"script":"S","script.param":"1"}"#
        );
        assert_eq!(
            scripts.format_parameters(HttpMethod::Get),
            "?script=S&script.param=1"
        );
    }

    #[test]
    fn test_all_keys_in_fixed_order() {
        let scripts = ScriptParameters::script("main", "a")
            .with_presort("sorter", "c")
            .with_prerequest("before", "b");
        let keys: Vec<String> = scripts.to_json().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "script",
                "script.param",
                "script.prerequest",
                "script.prerequest.param",
                "script.presort",
                "script.presort.param"
            ]
        );
    }

    #[test]
    fn test_empty_scripts() {
        let scripts = ScriptParameters::default();
        assert!(scripts.is_empty());
        assert_eq!(scripts.format_parameters(HttpMethod::Delete), "");
        assert_eq!(scripts.format_parameters(HttpMethod::Patch), "{}");
    }

    #[test]
    fn test_query_values_are_encoded() {
        let scripts = ScriptParameters::script("Log Event", "a&b");
        assert_eq!(
            scripts.to_query_string(),
            "?script=Log%20Event&script.param=a%26b"
        );
    }
}
