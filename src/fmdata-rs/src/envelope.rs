//! The Data API response envelope:
//! `{"response": {...}, "messages": [{"code": .., "message": ..}]}`

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{ClientError, Result};

const HTTP_OK: u16 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub response: Value,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "code_from_number_or_string")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// The service sends codes as strings (`"0"`), older versions as numbers
fn code_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(i64),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Number(n) => Ok(n),
        Code::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Envelope {
    /// Parse a body that must be a JSON object whose `messages`, when
    /// present, are objects each carrying a `code`.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        if !value.is_object() {
            return Err(ClientError::InvalidResponse(format!(
                "envelope is not a JSON object: {}",
                body
            )));
        }
        if let Some(messages) = value.get("messages") {
            let well_formed = messages.as_array().is_some_and(|list| {
                list.iter()
                    .all(|m| m.as_object().is_some_and(|m| m.contains_key("code")))
            });
            if !well_formed {
                return Err(ClientError::InvalidResponse(format!(
                    "envelope messages lack a code: {}",
                    messages
                )));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// First message with a nonzero code
    pub fn first_error(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.code != 0)
    }

    /// Session token of a login response
    pub fn token(&self) -> Option<&str> {
        self.response
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// Uniform success rule: HTTP 200, a parseable envelope, and no nonzero
/// message code.
pub fn check(status: u16, body: &str) -> Result<Envelope> {
    if status != HTTP_OK {
        return Err(ClientError::Server {
            status,
            message: body.to_string(),
        });
    }
    let envelope = Envelope::parse(body)?;
    if let Some(msg) = envelope.first_error() {
        return Err(ClientError::Api {
            code: msg.code,
            message: msg.message.clone(),
        });
    }
    Ok(envelope)
}
