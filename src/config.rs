//! Conversion run configuration

use serde::{Deserialize, Serialize};

/// Options for [`ConvConfService`](crate::service::ConvConfService) runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Collect trace events
    pub trace: bool,
    /// Check source rows for declared columns before converting
    pub validate_source_data: bool,
    /// Check produced records for mandatory attributes after converting
    pub validate_result: bool,
    /// Refuse to plan when the semantic checker reports errors
    pub fail_on_semantic_errors: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            trace: false,
            validate_source_data: true,
            validate_result: true,
            fail_on_semantic_errors: true,
        }
    }
}

impl ConversionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_source_validation(mut self, enabled: bool) -> Self {
        self.validate_source_data = enabled;
        self
    }

    pub fn with_result_validation(mut self, enabled: bool) -> Self {
        self.validate_result = enabled;
        self
    }

    pub fn with_fail_on_semantic_errors(mut self, enabled: bool) -> Self {
        self.fail_on_semantic_errors = enabled;
        self
    }

    /// Disable both data validators
    pub fn without_validation(self) -> Self {
        self.with_source_validation(false).with_result_validation(false)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert!(!config.trace);
        assert!(config.validate_source_data);
        assert!(config.validate_result);
        assert!(config.fail_on_semantic_errors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ConversionConfig::new().with_trace(true).without_validation();
        assert!(config.trace);
        assert!(!config.validate_source_data);
        assert!(!config.validate_result);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ConversionConfig = serde_json::from_str(r#"{"trace": true}"#).unwrap();
        assert!(config.trace);
        assert!(config.validate_result);
    }
}
