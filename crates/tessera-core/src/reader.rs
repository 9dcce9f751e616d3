//! Loading catalog documents from JSON.
//!
//! Catalog files may carry `//` line comments and `/* */` block comments;
//! they are removed before the document is parsed.

use std::path::Path;

use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::model::CatalogData;

impl CatalogData {
    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the document is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_core::CatalogData;
    ///
    /// let data = CatalogData::from_json_str(r#"{
    ///     // events only, no attributes yet
    ///     "events": [{"name": "login"}]
    /// }"#)?;
    /// assert_eq!(data.events.len(), 1);
    /// assert!(data.attributes.is_empty());
    /// # Ok::<(), tessera_core::CatalogError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(&strip_comments(json))?)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read and
    /// [`CatalogError::Parse`] if it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading catalog");
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the catalog as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Removes JavaScript style comments outside of string literals.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_strip_line_and_block_comments() {
        let input = "{ // line\n \"a\": /* block */ 1 }";
        assert_eq!(strip_comments(input), "{ \n \"a\":   1 }");
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let input = r#"{"pattern": "^https?://[a-z/*]+$", "q": "say \"//\""}"#;
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_from_json_str_full_document() {
        let json = r#"{
            "products": [{"name": "banking", "events": ["login"]}],
            "categories": [{"name": "account", "events": ["login"]}],
            "attributes": [{"name": "userId", "requestContext": true, "required": true}],
            /* login carries nothing */
            "events": [{"name": "login", "displayName": "Login"}]
        }"#;
        let data = CatalogData::from_json_str(json).unwrap();

        assert_eq!(data.products[0].events, vec!["login"]);
        assert_eq!(data.categories[0].name, "account");
        assert!(data.attributes[0].request_context);
        assert_eq!(data.events[0].display_name, "Login");
    }

    #[test]
    fn test_malformed_document() {
        let err = CatalogData::from_json_str("{\"events\": [").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"events\": [{{\"name\": \"logout\"}}]}}").unwrap();

        let data = CatalogData::from_path(file.path()).unwrap();
        assert_eq!(data.events[0].name, "logout");
    }

    #[test]
    fn test_from_missing_path() {
        let err = CatalogData::from_path("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let data = CatalogData::from_json_str(r#"{"events": [{"name": "login"}]}"#).unwrap();
        let json = data.to_json_pretty().unwrap();
        assert_eq!(CatalogData::from_json_str(&json).unwrap(), data);
    }
}
