//! # Runtime Schema Validation
//!
//! Validates plan documents against a JSON Schema definition. Schemas that
//! declare `$schema` are compiled with the draft they name; all others are
//! compiled as Draft 2020-12.
//!
//! ## Error kinds
//!
//! - [`SchemaError::Load`] / [`SchemaError::Compile`]: the schema itself is
//!   unavailable. Raised by the constructors only.
//! - [`SchemaError::ValidationFailed`]: the candidate document violates the
//!   schema. Carries one [`SchemaViolation`] per failed keyword.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Well-known location of the plan schema, relative to the working directory.
pub const DEFAULT_SCHEMA_PATH: &str = "schemas/plan.schema.json";

/// A single schema violation with diagnostic context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON Pointer to the offending field in the candidate document.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.instance_path.is_empty() {
            "/"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "path={path}: {}", self.message)
    }
}

/// Errors returned by schema loading and validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file could not be read or parsed as JSON.
    #[error("failed to load schema {source_name}: {reason}")]
    Load {
        /// Path or identifier of the schema.
        source_name: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The schema parsed as JSON but is not a valid JSON Schema.
    #[error("failed to compile schema {source_name}: {reason}")]
    Compile {
        /// Path or identifier of the schema.
        source_name: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The candidate document failed validation.
    #[error("{count} schema violation(s)")]
    ValidationFailed {
        /// Number of violations found.
        count: usize,
        /// Individual violation details.
        details: Vec<SchemaViolation>,
    },
}

impl SchemaError {
    /// Whether this error means the schema itself could not be used.
    pub fn is_schema_unavailable(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Compile { .. })
    }
}

/// A compiled plan schema.
///
/// Construct once with [`PlanSchema::load`] (or [`PlanSchema::from_value`])
/// and share behind an `Arc`; validation takes `&self` and never mutates.
pub struct PlanSchema {
    source_name: String,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for PlanSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanSchema")
            .field("source", &self.source_name)
            .finish()
    }
}

impl PlanSchema {
    /// Load and compile the schema stored at `path`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Load`] if the file cannot be read or is not JSON,
    /// [`SchemaError::Compile`] if it is not a valid JSON Schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;

        let schema: Value = serde_json::from_str(&content).map_err(|e| SchemaError::Load {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;

        let compiled = Self::compile(source_name, &schema)?;
        tracing::info!(schema = %compiled.source_name, "plan schema compiled");
        Ok(compiled)
    }

    /// Compile an in-memory schema document.
    pub fn from_value(schema: &Value) -> Result<Self, SchemaError> {
        Self::compile("<inline>".to_string(), schema)
    }

    fn compile(source_name: String, schema: &Value) -> Result<Self, SchemaError> {
        let built = if schema.get("$schema").is_some() {
            jsonschema::validator_for(schema)
        } else {
            jsonschema::options()
                .with_draft(jsonschema::Draft::Draft202012)
                .build(schema)
        };

        let validator = built.map_err(|e| SchemaError::Compile {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source_name,
            validator,
        })
    }

    /// Where the schema was loaded from (`<inline>` for in-memory schemas).
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Validate a candidate document, collecting every violation.
    pub fn validate(&self, candidate: &Value) -> Result<(), SchemaError> {
        let details: Vec<SchemaViolation> = self
            .validator
            .iter_errors(candidate)
            .map(|err| SchemaViolation {
                instance_path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();

        if details.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                count: details.len(),
                details,
            })
        }
    }

    /// Boolean form of [`PlanSchema::validate`].
    pub fn is_valid(&self, candidate: &Value) -> bool {
        self.validator.is_valid(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn repo_schema_path() -> PathBuf {
        // crates/plan-schema -> crates -> repo root
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir.join(DEFAULT_SCHEMA_PATH)
    }

    fn inline_schema() -> PlanSchema {
        PlanSchema::from_value(&json!({
            "type": "object",
            "required": ["objectId"],
            "properties": {
                "objectId": {"type": "string", "minLength": 1},
                "planType": {"type": "string"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn shipped_schema_compiles() {
        let schema = PlanSchema::load(repo_schema_path()).expect("shipped schema must compile");
        assert!(schema.source_name().ends_with("plan.schema.json"));
    }

    #[test]
    fn shipped_schema_accepts_minimal_plan() {
        let schema = PlanSchema::load(repo_schema_path()).unwrap();
        assert!(schema.is_valid(&json!({"objectId": "p1", "body": "x"})));
    }

    #[test]
    fn shipped_schema_rejects_missing_object_id() {
        let schema = PlanSchema::load(repo_schema_path()).unwrap();
        assert!(!schema.is_valid(&json!({"body": "x"})));
        assert!(!schema.is_valid(&json!({"objectId": ""})));
        assert!(!schema.is_valid(&json!({"objectId": 7})));
        assert!(!schema.is_valid(&json!(["objectId"])));
    }

    #[test]
    fn valid_document_passes() {
        let schema = inline_schema();
        assert!(schema.validate(&json!({"objectId": "p1"})).is_ok());
        assert!(schema.is_valid(&json!({"objectId": "p1", "planType": "inNetwork"})));
    }

    #[test]
    fn missing_required_field_reports_violation() {
        let schema = inline_schema();
        match schema.validate(&json!({"planType": "inNetwork"})) {
            Err(SchemaError::ValidationFailed { count, details }) => {
                assert_eq!(count, details.len());
                assert!(details.iter().any(|d| d.message.contains("objectId")));
            }
            other => panic!("expected ValidationFailed, got: {other:?}"),
        }
    }

    #[test]
    fn wrong_type_reports_instance_path() {
        let schema = inline_schema();
        match schema.validate(&json!({"objectId": "p1", "planType": 5})) {
            Err(SchemaError::ValidationFailed { details, .. }) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].instance_path, "/planType");
            }
            other => panic!("expected ValidationFailed, got: {other:?}"),
        }
    }

    #[test]
    fn multiple_violations_are_collected() {
        let schema = inline_schema();
        match schema.validate(&json!({"objectId": "", "planType": 5})) {
            Err(SchemaError::ValidationFailed { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected ValidationFailed, got: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = PlanSchema::load("/nonexistent/plan-schema-12345.json").unwrap_err();
        assert!(matches!(err, SchemaError::Load { .. }));
        assert!(err.is_schema_unavailable());
    }

    #[test]
    fn invalid_json_is_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plan.schema.json");
        std::fs::write(&path, "not json at all").unwrap();
        match PlanSchema::load(&path) {
            Err(SchemaError::Load { source_name, reason }) => {
                assert!(source_name.contains("plan.schema.json"));
                assert!(!reason.is_empty());
            }
            other => panic!("expected Load error, got: {other:?}"),
        }
    }

    #[test]
    fn invalid_schema_is_compile_error() {
        let err = PlanSchema::from_value(&json!({"type": "not-a-type"})).unwrap_err();
        assert!(matches!(err, SchemaError::Compile { .. }));
        assert!(err.is_schema_unavailable());
    }

    #[test]
    fn validation_failure_is_not_schema_unavailable() {
        let err = SchemaError::ValidationFailed {
            count: 0,
            details: vec![],
        };
        assert!(!err.is_schema_unavailable());
    }

    #[test]
    fn declared_draft_is_honored() {
        let schema = PlanSchema::from_value(&json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["objectId"]
        }))
        .unwrap();
        assert!(schema.is_valid(&json!({"objectId": "p1"})));
        assert!(!schema.is_valid(&json!({})));
    }

    #[test]
    fn violation_display_formats_root_path() {
        let v = SchemaViolation {
            instance_path: String::new(),
            message: "\"objectId\" is a required property".to_string(),
        };
        assert_eq!(v.to_string(), "path=/: \"objectId\" is a required property");
    }

    #[test]
    fn error_display_messages() {
        let err = SchemaError::Compile {
            source_name: "plan.schema.json".to_string(),
            reason: "bad keyword".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("plan.schema.json"));
        assert!(msg.contains("bad keyword"));

        let err = SchemaError::ValidationFailed {
            count: 3,
            details: vec![],
        };
        assert_eq!(err.to_string(), "3 schema violation(s)");
    }

    #[test]
    fn debug_does_not_dump_validator() {
        let schema = inline_schema();
        let dbg = format!("{schema:?}");
        assert!(dbg.contains("PlanSchema"));
        assert!(dbg.contains("<inline>"));
    }
}
