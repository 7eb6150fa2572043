//! Data API path templates.
//!
//! Paths are relative to the configured API base path (`/fmi/data/v1`).
//! Every caller-supplied segment is percent-encoded.

use std::fmt;

use urlencoding::encode;

/// HTTP verbs used by the Data API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the verb carries a JSON body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth provider listing, served outside the Data API base path
pub const OAUTH_PROVIDERS: &str = "/fmws/oauthproviderinfo";

pub fn sessions(database: &str) -> String {
    format!("/databases/{}/sessions", encode(database))
}

pub fn session(database: &str, token: &str) -> String {
    format!("/databases/{}/sessions/{}", encode(database), encode(token))
}

pub fn records(database: &str, layout: &str) -> String {
    format!("/databases/{}/layouts/{}/records", encode(database), encode(layout))
}

pub fn record(database: &str, layout: &str, record_id: &str) -> String {
    format!(
        "/databases/{}/layouts/{}/records/{}",
        encode(database),
        encode(layout),
        encode(record_id)
    )
}

pub fn container(
    database: &str,
    layout: &str,
    record_id: &str,
    field: &str,
    repetition: u32,
) -> String {
    format!(
        "/databases/{}/layouts/{}/records/{}/containers/{}/{}",
        encode(database),
        encode(layout),
        encode(record_id),
        encode(field),
        repetition
    )
}

pub fn find(database: &str, layout: &str) -> String {
    format!("/databases/{}/layouts/{}/_find", encode(database), encode(layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_templates() {
        assert_eq!(sessions("db"), "/databases/db/sessions");
        assert_eq!(session("db", "tok"), "/databases/db/sessions/tok");
        assert_eq!(records("db", "Home"), "/databases/db/layouts/Home/records");
        assert_eq!(record("db", "Home", "7"), "/databases/db/layouts/Home/records/7");
        assert_eq!(
            container("db", "Home", "7", "photo", 1),
            "/databases/db/layouts/Home/records/7/containers/photo/1"
        );
        assert_eq!(find("db", "Home"), "/databases/db/layouts/Home/_find");
    }

    #[test]
    fn test_segments_are_encoded() {
        assert_eq!(
            records("Sales DB", "List/View"),
            "/databases/Sales%20DB/layouts/List%2FView/records"
        );
    }

    #[test]
    fn test_body_bearing_verbs() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Patch.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
