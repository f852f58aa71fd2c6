//! Request DTOs for the inspection API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /invalidate
///
/// # Fields
/// - `cache`: Name of the registered cache
/// - `contains`: Substring selecting keys to drop; clears the cache when absent
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub cache: String,
    #[serde(default)]
    pub contains: Option<String>,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.cache.is_empty() {
            return Some("Cache name cannot be empty".to_string());
        }
        // An empty needle would match every key; clearing must be explicit.
        if matches!(self.contains.as_deref(), Some("")) {
            return Some("Substring cannot be empty; omit it to clear the cache".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_request_deserialize() {
        let json = r#"{"cache": "users", "contains": "user:42"}"#;
        let req: InvalidateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.cache, "users");
        assert_eq!(req.contains.as_deref(), Some("user:42"));
    }

    #[test]
    fn test_invalidate_request_without_substring() {
        let json = r#"{"cache": "users"}"#;
        let req: InvalidateRequest = serde_json::from_str(json).unwrap();
        assert!(req.contains.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_empty_fields() {
        let req = InvalidateRequest {
            cache: "".to_string(),
            contains: None,
        };
        assert!(req.validate().is_some());

        let req = InvalidateRequest {
            cache: "users".to_string(),
            contains: Some("".to_string()),
        };
        assert!(req.validate().is_some());
    }
}
