//! The assembled audit message handed to sinks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A key was rejected because it is longer than the message allows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Attribute {key} exceeds the maximum key length of {max_length}")]
pub struct KeyLengthError {
    /// Offending key.
    pub key: String,
    /// Maximum key length of the message.
    pub max_length: usize,
}

/// A validated event: name plus ordered attribute values.
///
/// Rendered with [`Display`](fmt::Display) in structured-data form:
///
/// ```
/// use tessera_audit::AuditMessage;
///
/// let mut msg = AuditMessage::new("transfer", 32);
/// msg.put("toAccount", "123456").unwrap();
/// msg.put("amount", "111.55").unwrap();
/// assert_eq!(msg.to_string(), r#"[transfer amount="111.55" toAccount="123456"]"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMessage {
    event_name: String,
    max_key_length: usize,
    attributes: BTreeMap<String, String>,
}

impl AuditMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new(event_name: &str, max_key_length: usize) -> Self {
        Self {
            event_name: event_name.to_string(),
            max_key_length,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the event name.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Returns the maximum key length.
    #[must_use]
    pub const fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// Sets an attribute value.
    ///
    /// # Errors
    ///
    /// Returns [`KeyLengthError`] if `key` is longer than the maximum key length.
    pub fn put(&mut self, key: &str, value: &str) -> Result<(), KeyLengthError> {
        if key.chars().count() > self.max_key_length {
            return Err(KeyLengthError {
                key: key.to_string(),
                max_length: self.max_key_length,
            });
        }
        self.attributes.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns true if the attribute is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the attributes in key order.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Consumes the message and returns its attributes.
    #[must_use]
    pub fn into_attributes(self) -> BTreeMap<String, String> {
        self.attributes
    }

    /// Serializes the message as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        if matches!(c, '"' | '\\' | ']') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}

impl fmt::Display for AuditMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.event_name)?;
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"")?;
            write_escaped(f, value)?;
            f.write_str("\"")?;
        }
        f.write_str("]")
    }
}
