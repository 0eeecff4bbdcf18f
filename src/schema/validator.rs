//! Schema validation with detailed error reporting

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::core::identity::SchemaVersion;
use crate::entities::character::{Skill, Skills};
use crate::json::diagnostics::line_col_to_offset;
use crate::schema::collection::CHARACTERS;
use crate::schema::registry::SchemaRegistry;

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed for {collection} ({version}): {summary}")]
#[diagnostic(code(codex::schema::validation_error))]
pub struct ValidationError {
    collection: String,
    version: SchemaVersion,
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    /// JSON pointer of the offending field, e.g. `/skills/special1/attribute`
    path: String,
    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(
        path: String,
        message: String,
        hint: String,
        span: SourceSpan,
        help: Option<String>,
    ) -> Self {
        Self {
            span,
            path,
            message,
            hint,
            help,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(
        collection: &str,
        version: SchemaVersion,
        filename: &str,
        source: &str,
        violations: Vec<SchemaViolation>,
    ) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            collection: collection.to_string(),
            version,
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }

    /// Field paths of every violation, in report order
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path()).collect()
    }
}

/// Result of validation
#[derive(Debug)]
pub struct ValidationResult {
    pub valid: bool,
    pub version: SchemaVersion,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn success(version: SchemaVersion) -> Self {
        Self {
            valid: true,
            version,
            warnings: Vec::new(),
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A validation issue that does not break the schema contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

struct CompiledSchema {
    validator: JsonValidator,
    /// Kept alongside the compiled form to read `default` annotations
    document: JsonValue,
}

/// Schema validator with compiled schemas for one collection
pub struct Validator {
    collection: String,
    compiled: HashMap<SchemaVersion, CompiledSchema>,
}

impl Validator {
    /// Create a validator for the `characters` collection
    pub fn new(registry: &SchemaRegistry) -> Self {
        Self::for_collection(registry, CHARACTERS)
    }

    /// Create a validator for every registered version of a collection
    pub fn for_collection(registry: &SchemaRegistry, collection: &str) -> Self {
        let mut compiled = HashMap::new();

        for version in registry.versions(collection) {
            let Some(schema_str) = registry.get(collection, version) else {
                continue;
            };
            let document = match serde_json::from_str::<JsonValue>(schema_str) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(%collection, %version, error = %e, "schema is not valid JSON");
                    continue;
                }
            };
            match validator_for(&document) {
                Ok(validator) => {
                    compiled.insert(version, CompiledSchema { validator, document });
                }
                Err(e) => {
                    tracing::warn!(%collection, %version, error = %e, "schema failed to compile");
                }
            }
        }

        tracing::debug!(%collection, versions = compiled.len(), "compiled schemas");

        Self {
            collection: collection.to_string(),
            compiled,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn supports(&self, version: SchemaVersion) -> bool {
        self.compiled.contains_key(&version)
    }

    /// Validate JSON content, stopping at the first violation
    pub fn validate(
        &self,
        content: &str,
        filename: &str,
        version: SchemaVersion,
    ) -> Result<ValidationResult, ValidationError> {
        let json_value = self.parse(content, filename, version)?;

        let Some(schema) = self.compiled.get(&version) else {
            return Err(self.missing_schema(content, filename, version));
        };

        if let Err(error) = schema.validator.validate(&json_value) {
            let violation = error_to_violation(content, &error);
            return Err(ValidationError::new(
                &self.collection,
                version,
                filename,
                content,
                vec![violation],
            ));
        }

        Ok(self.with_warnings(&json_value, version))
    }

    /// Validate JSON content, collecting every violation
    pub fn iter_errors(
        &self,
        content: &str,
        filename: &str,
        version: SchemaVersion,
    ) -> Result<ValidationResult, ValidationError> {
        let json_value = self.parse(content, filename, version)?;
        self.check_value(&json_value, content, filename, version)?;
        Ok(self.with_warnings(&json_value, version))
    }

    /// Validate and return the record with declared defaults filled in
    pub fn resolve(
        &self,
        content: &str,
        filename: &str,
        version: SchemaVersion,
    ) -> Result<JsonValue, ValidationError> {
        let mut json_value = self.parse(content, filename, version)?;
        self.check_value(&json_value, content, filename, version)?;
        self.apply_defaults(&mut json_value, version);
        Ok(json_value)
    }

    /// Validate an in-memory value. Spans point into its pretty-printed form.
    pub fn validate_value(
        &self,
        value: &JsonValue,
        filename: &str,
        version: SchemaVersion,
    ) -> Result<ValidationResult, ValidationError> {
        let content = serde_json::to_string_pretty(value).unwrap_or_default();
        self.check_value(value, &content, filename, version)?;
        Ok(self.with_warnings(value, version))
    }

    /// Fill absent fields that declare a `default`, recursing into nested objects
    pub fn apply_defaults(&self, value: &mut JsonValue, version: SchemaVersion) {
        if let Some(schema) = self.compiled.get(&version) {
            fill_defaults(&schema.document, &schema.document, value);
        }
    }

    fn parse(
        &self,
        content: &str,
        filename: &str,
        version: SchemaVersion,
    ) -> Result<JsonValue, ValidationError> {
        serde_json::from_str(content).map_err(|e| {
            let offset = line_col_to_offset(content, e.line(), e.column());
            let rest = &content[offset.min(content.len())..];
            let len = rest.find('\n').unwrap_or(rest.len());
            let violation = SchemaViolation::new(
                String::new(),
                format!("JSON parse error: {}", e),
                "invalid JSON".to_string(),
                (offset, len).into(),
                Some("Check JSON syntax - double-quoted keys, commas between items, no trailing commas".to_string()),
            );
            ValidationError::new(&self.collection, version, filename, content, vec![violation])
        })
    }

    fn check_value(
        &self,
        value: &JsonValue,
        content: &str,
        filename: &str,
        version: SchemaVersion,
    ) -> Result<(), ValidationError> {
        let Some(schema) = self.compiled.get(&version) else {
            return Err(self.missing_schema(content, filename, version));
        };

        let violations: Vec<SchemaViolation> = schema
            .validator
            .iter_errors(value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(file = %filename, %version, count = violations.len(), "schema violations");
            Err(ValidationError::new(
                &self.collection,
                version,
                filename,
                content,
                violations,
            ))
        }
    }

    fn missing_schema(&self, content: &str, filename: &str, version: SchemaVersion) -> ValidationError {
        let violation = SchemaViolation::new(
            String::new(),
            format!("No schema registered for {} {}", self.collection, version),
            "unknown schema".to_string(),
            (0, content.find('\n').unwrap_or(content.len())).into(),
            None,
        );
        ValidationError::new(&self.collection, version, filename, content, vec![violation])
    }

    fn with_warnings(&self, value: &JsonValue, version: SchemaVersion) -> ValidationResult {
        let mut result = ValidationResult::success(version);
        if version == SchemaVersion::V2 {
            result.warnings = lint_character(value);
        }
        result
    }
}

impl Default for Validator {
    fn default() -> Self {
        let registry = SchemaRegistry::default();
        Self::new(&registry)
    }
}

/// Checks that hold on valid v2 records but sit outside the schema contract
fn lint_character(value: &JsonValue) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Some(date) = value.get("releaseDate").and_then(|d| d.as_str()) {
        if date.is_empty() {
            issues.push(ValidationIssue {
                path: "/releaseDate".to_string(),
                message: "release date is empty".to_string(),
                suggestion: Some("Use YYYY-MM-DD".to_string()),
            });
        } else if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            issues.push(ValidationIssue {
                path: "/releaseDate".to_string(),
                message: format!("'{}' is not a calendar date", date),
                suggestion: Some("Use YYYY-MM-DD".to_string()),
            });
        }
    }

    if let Some(skills) = value
        .get("skills")
        .and_then(|v| serde_json::from_value::<Skills>(v.clone()).ok())
    {
        for (slot, skill) in skills.slots().filter(|(_, s)| s.is_blank()) {
            issues.push(placeholder_issue(format!("/skills/{}", slot)));
        }
    }
    if let Some(defense) = value
        .get("defense")
        .and_then(|v| serde_json::from_value::<Skill>(v.clone()).ok())
    {
        if defense.is_blank() {
            issues.push(placeholder_issue("/defense".to_string()));
        }
    }

    if let Some(keywords) = value.get("keywords").and_then(|k| k.as_array()) {
        let mut seen = HashSet::new();
        for keyword in keywords.iter().filter_map(|k| k.as_str()) {
            if !seen.insert(keyword) {
                issues.push(ValidationIssue {
                    path: "/keywords".to_string(),
                    message: format!("keyword '{}' appears more than once", keyword),
                    suggestion: None,
                });
            }
        }
    }

    issues
}

fn placeholder_issue(path: String) -> ValidationIssue {
    ValidationIssue {
        path,
        message: "type and attribute are both empty".to_string(),
        suggestion: Some("Fill in the placeholder left by migration".to_string()),
    }
}

fn fill_defaults(root: &JsonValue, schema: &JsonValue, value: &mut JsonValue) {
    let schema = resolve_ref(root, schema);

    if let (Some(items), Some(array)) = (schema.get("items"), value.as_array_mut()) {
        for item in array {
            fill_defaults(root, items, item);
        }
        return;
    }

    let (Some(properties), Some(object)) = (
        schema.get("properties").and_then(|p| p.as_object()),
        value.as_object_mut(),
    ) else {
        return;
    };

    for (key, property) in properties {
        let property = resolve_ref(root, property);
        if let Some(child) = object.get_mut(key) {
            fill_defaults(root, property, child);
        } else if let Some(default) = property.get("default") {
            object.insert(key.clone(), default.clone());
        }
    }
}

/// Follow a local `$ref` like `#/$defs/skill`
fn resolve_ref<'a>(root: &'a JsonValue, schema: &'a JsonValue) -> &'a JsonValue {
    schema
        .get("$ref")
        .and_then(|r| r.as_str())
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(schema)
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let mut path = error.instance_path.to_string();
    if let jsonschema::error::ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            path = format!("{}/{}", path, name);
        }
    }
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);

    // Missing fields have no key of their own, so point at the parent object
    let span = find_path_span(content, error.instance_path.as_str());

    SchemaViolation::new(path, message, hint, span, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        jsonschema::error::ValidationErrorKind::Type { .. } => {
            format!("Wrong type at {}: {}", path, error)
        }
        _ => {
            format!("Validation error at {}: {}", path, error)
        }
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { .. } => {
            "required field missing".to_string()
        }
        jsonschema::error::ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        _ => "validation error".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field to the record", prop_str))
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            let path = error.instance_path.as_str();
            if path == "/affiliation" && error.instance.is_string() {
                Some(
                    "affiliation is a list since v2 - wrap it in brackets, or run `codex migrate`"
                        .to_string(),
                )
            } else {
                Some(format!("Expected value of type: {:?}", kind))
            }
        }
        _ => None,
    }
}

/// Find the span for a JSON pointer in the source text.
///
/// Walks the pointer segment by segment so nested keys that share a name
/// (`type` in every skill) resolve to the right occurrence.
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let mut from = 0;
    let mut found = None;

    for part in json_path.split('/').filter(|s| !s.is_empty()) {
        if part.parse::<usize>().is_ok() {
            continue;
        }
        let key = part.replace("~1", "/").replace("~0", "~");
        if let Some((start, len)) = find_key_span(content, &key, from) {
            from = start + len;
            found = Some((start, len));
        }
    }

    match found {
        Some(span) => span.into(),
        None => {
            let len = content.find('\n').unwrap_or(content.len()).max(1);
            (0, len).into()
        }
    }
}

/// Find `"key":` at or after `from`, returning (offset, length) of the quoted key
fn find_key_span(content: &str, key: &str, from: usize) -> Option<(usize, usize)> {
    let needle = format!("\"{}\"", key);
    let mut search = from.min(content.len());

    while let Some(pos) = content[search..].find(&needle) {
        let start = search + pos;
        let after = start + needle.len();
        if content[after..].trim_start().starts_with(':') {
            return Some((start, needle.len()));
        }
        search = after;
    }
    None
}
