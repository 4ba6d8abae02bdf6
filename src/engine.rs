//! Validation Engine
//!
//! Recursive descent over a data value and a schema node in lockstep.
//! `$ref`s are dereferenced through the [`SchemaRegistry`], leaf keywords are
//! dispatched through the evaluator table, and errors accumulate with
//! dot-joined property paths in depth-first order.

use serde_json::Value;
use tracing::trace;

use crate::error::{Result, SchemaError};
use crate::keywords::EVALUATORS;
use crate::registry::{normalize_uri, SchemaRegistry};
use crate::report::{ErrorRecord, ValidationResult};

const DEFAULT_MAX_REF_DEPTH: usize = 64;

/// The validator: a schema registry plus the descent logic
///
/// Register every auxiliary document with [`add_schema`](Self::add_schema)
/// before validating. `validate` takes `&self`, so a fully-registered
/// validator can be shared across threads.
#[derive(Debug)]
pub struct Validator {
    registry: SchemaRegistry,
    max_ref_depth: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call state: current path, accumulated errors, active ref chain
struct ValidationContext {
    path: Vec<String>,
    errors: Vec<ErrorRecord>,
    ref_chain: Vec<String>,
}

impl ValidationContext {
    fn new() -> Self {
        Self {
            path: Vec::new(),
            errors: Vec::new(),
            ref_chain: Vec::new(),
        }
    }

    fn path_str(&self) -> String {
        self.path.join(".")
    }

    fn path_for(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path_str())
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::with_registry(SchemaRegistry::new())
    }

    pub fn with_registry(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
        }
    }

    /// Cap the `$ref` chain length (cycles are caught regardless)
    pub fn max_ref_depth(mut self, limit: usize) -> Self {
        self.max_ref_depth = limit;
        self
    }

    /// Register an auxiliary schema document under `uri`
    pub fn add_schema(&mut self, doc: Value, uri: &str) {
        self.registry.add_schema(doc, uri);
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validate `data` against `schema`
    ///
    /// Data non-conformance comes back as an invalid [`ValidationResult`];
    /// an `Err` means the schema itself is broken (unresolvable or cyclic
    /// `$ref`). Identical inputs against an unchanged registry yield
    /// identical results, error order included.
    pub fn validate(&self, data: &Value, schema: &Value) -> Result<ValidationResult> {
        let current_uri = schema
            .get("id")
            .or_else(|| schema.get("$id"))
            .and_then(Value::as_str)
            .map(normalize_uri)
            .unwrap_or_default();

        let mut ctx = ValidationContext::new();
        self.validate_node(schema, data, &current_uri, &mut ctx)?;
        Ok(ValidationResult::from_errors(ctx.errors))
    }

    fn validate_node(
        &self,
        node: &Value,
        value: &Value,
        current_uri: &str,
        ctx: &mut ValidationContext,
    ) -> Result<()> {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            return self.validate_ref(reference, value, current_uri, ctx);
        }

        trace!(path = %ctx.path_str(), "validating node");
        let path = ctx.path_str();

        for (keyword, eval) in EVALUATORS {
            if let Some(args) = node.get(*keyword) {
                if let Some(error) = eval(value, args, node, &path)? {
                    ctx.errors.push(error);
                }
            }
        }

        if let Some(obj) = value.as_object() {
            if let Some(required) = node.get("required").and_then(Value::as_array) {
                for name in required.iter().filter_map(Value::as_str) {
                    if !obj.contains_key(name) {
                        let property = ctx.path_for(name);
                        ctx.errors.push(ErrorRecord::new(
                            property,
                            format!("required property '{name}' is missing"),
                            "required",
                        ));
                    }
                }
            }

            if let Some(properties) = node.get("properties").and_then(Value::as_object) {
                for (name, subschema) in properties {
                    match obj.get(name) {
                        Some(child) => {
                            ctx.path.push(name.clone());
                            self.validate_node(subschema, child, current_uri, ctx)?;
                            ctx.path.pop();
                        }
                        None => {
                            // Draft-03 puts `required: true` on the property
                            // subschema instead of listing names on the parent.
                            if subschema.get("required") == Some(&Value::Bool(true)) {
                                let property = ctx.path_for(name);
                                ctx.errors.push(ErrorRecord::new(
                                    property,
                                    format!("required property '{name}' is missing"),
                                    "required",
                                ));
                            }
                        }
                    }
                }
            }
        }

        if let Some(arr) = value.as_array() {
            if let Some(items) = node.get("items") {
                if items.is_object() {
                    for (index, element) in arr.iter().enumerate() {
                        ctx.path.push(index.to_string());
                        self.validate_node(items, element, current_uri, ctx)?;
                        ctx.path.pop();
                    }
                }
            }
        }

        Ok(())
    }

    /// Dereference a `$ref` and validate against the target node
    ///
    /// The resolved node replaces the referencing node wholesale; sibling
    /// keywords of `$ref` are not merged in.
    fn validate_ref(
        &self,
        reference: &str,
        value: &Value,
        current_uri: &str,
        ctx: &mut ValidationContext,
    ) -> Result<()> {
        let anchored = anchor(reference, current_uri);

        if ctx.ref_chain.iter().any(|r| r == &anchored) {
            return Err(SchemaError::CyclicRef {
                reference: anchored,
            });
        }
        if ctx.ref_chain.len() >= self.max_ref_depth {
            return Err(SchemaError::RefDepthExceeded {
                reference: anchored,
                limit: self.max_ref_depth,
            });
        }

        let (resolved, owner_uri) = self.registry.resolve(reference, current_uri)?;

        ctx.ref_chain.push(anchored);
        let outcome = self.validate_node(resolved, value, &owner_uri, ctx);
        ctx.ref_chain.pop();
        outcome
    }
}

/// Absolute form of a ref, for cycle tracking
///
/// Same-document refs are anchored at the current document's URI so the same
/// fragment in two different documents is tracked as two distinct refs.
fn anchor(reference: &str, current_uri: &str) -> String {
    let normalized = normalize_uri(reference);
    if normalized.starts_with('#') {
        format!("{}{normalized}", normalize_uri(current_uri))
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_level_error_has_no_prefix() {
        let validator = Validator::new();
        let schema = json!({"type": "object"});

        let result = validator.validate(&json!("not an object"), &schema).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].property, "");
        assert_eq!(result.errors[0].keyword, "type");
    }

    #[test]
    fn test_nested_path_is_dot_joined() {
        let validator = Validator::new();
        let schema = json!({
            "properties": {
                "payment": {
                    "properties": {
                        "amount": {"type": "integer"}
                    }
                }
            }
        });

        let result = validator
            .validate(&json!({"payment": {"amount": 1.2}}), &schema)
            .unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].property, "payment.amount");
    }

    #[test]
    fn test_required_missing_does_not_recurse() {
        let validator = Validator::new();
        let schema = json!({
            "required": ["payment"],
            "properties": {
                "payment": {
                    "required": ["amount"],
                    "properties": {"amount": {"type": "integer"}}
                }
            }
        });

        let result = validator.validate(&json!({}), &schema).unwrap();
        // One error for the missing root property, nothing from inside it.
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].property, "payment");
        assert_eq!(result.errors[0].keyword, "required");
    }

    #[test]
    fn test_optional_property_absent_is_valid() {
        let validator = Validator::new();
        let schema = json!({
            "properties": {"usage": {"type": "string", "maxLength": 255}}
        });

        let result = validator.validate(&json!({}), &schema).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_optional_property_wrong_type_is_invalid() {
        let validator = Validator::new();
        let schema = json!({
            "properties": {"usage": {"type": "string"}}
        });

        let result = validator.validate(&json!({"usage": null}), &schema).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].property, "usage");
    }

    #[test]
    fn test_draft03_boolean_required() {
        let validator = Validator::new();
        let schema = json!({
            "properties": {
                "amount": {"type": "integer", "required": true}
            }
        });

        let result = validator.validate(&json!({}), &schema).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].property, "amount");
        assert_eq!(result.errors[0].keyword, "required");
    }

    #[test]
    fn test_ref_replaces_sibling_keywords() {
        let mut validator = Validator::new();
        validator.add_schema(json!({"type": "integer"}), "/int.json");
        // maxLength beside $ref must be ignored.
        let schema = json!({
            "properties": {
                "n": {"$ref": "/int.json", "maxLength": 0}
            }
        });

        let result = validator.validate(&json!({"n": 5}), &schema).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_ref_resolution_carries_owner_uri() {
        let mut validator = Validator::new();
        // The target document uses a same-document ref internally; it must
        // resolve against /types.json, not the referencing document.
        validator.add_schema(
            json!({
                "definitions": {
                    "outer": {"$ref": "#/definitions/inner"},
                    "inner": {"type": "string"}
                }
            }),
            "/types.json",
        );
        let schema = json!({
            "properties": {"x": {"$ref": "/types.json#/definitions/outer"}}
        });

        let result = validator.validate(&json!({"x": 3}), &schema).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].property, "x");
        assert_eq!(result.errors[0].keyword, "type");
    }

    #[test]
    fn test_cyclic_refs_are_detected() {
        let mut validator = Validator::new();
        validator.add_schema(json!({"$ref": "/b.json"}), "/a.json");
        validator.add_schema(json!({"$ref": "/a.json"}), "/b.json");

        let schema = json!({"$ref": "/a.json"});
        let err = validator.validate(&json!(1), &schema).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicRef { .. }));
    }

    #[test]
    fn test_self_referencing_schema_is_cyclic() {
        let mut validator = Validator::new();
        validator.add_schema(json!({"$ref": "/loop.json"}), "/loop.json");

        let err = validator
            .validate(&json!(1), &json!({"$ref": "/loop.json"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::CyclicRef { .. }));
    }

    #[test]
    fn test_ref_not_found_is_fatal_not_invalid() {
        let validator = Validator::new();
        let schema = json!({"$ref": "/missing.json#/definitions/x"});

        let err = validator.validate(&json!(1), &schema).unwrap_err();
        assert!(matches!(err, SchemaError::RefNotFound { .. }));
    }

    #[test]
    fn test_ref_depth_limit() {
        let mut validator = Validator::new().max_ref_depth(2);
        // Distinct refs, so the cycle check alone would not fire.
        validator.add_schema(
            json!({"properties": {"a": {"$ref": "/c2.json"}}}),
            "/c1.json",
        );
        validator.add_schema(
            json!({"properties": {"a": {"$ref": "/c3.json"}}}),
            "/c2.json",
        );
        validator.add_schema(json!({"type": "integer"}), "/c3.json");

        let schema = json!({"$ref": "/c1.json"});
        let data = json!({"a": {"a": 1}});
        let err = validator.validate(&data, &schema).unwrap_err();
        assert!(matches!(err, SchemaError::RefDepthExceeded { .. }));
    }

    #[test]
    fn test_items_extend_path_with_index() {
        let validator = Validator::new();
        let schema = json!({
            "properties": {
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        });

        let result = validator
            .validate(&json!({"tags": ["ok", 7, "fine"]}), &schema)
            .unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].property, "tags.1");
    }

    #[test]
    fn test_unknown_keywords_are_ignored() {
        let validator = Validator::new();
        let schema = json!({"type": "string", "x-vendor-hint": {"weird": true}});

        let result = validator.validate(&json!("ok"), &schema).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_error_order_is_depth_first_declaration_order() {
        let validator = Validator::new();
        let schema = json!({
            "required": ["b"],
            "properties": {
                "a": {
                    "properties": {"inner": {"type": "integer"}}
                },
                "z": {"type": "string"}
            }
        });
        let data = json!({"a": {"inner": 1.5}, "z": 9});

        let result = validator.validate(&data, &schema).unwrap();
        let paths: Vec<&str> = result.errors.iter().map(|e| e.property.as_str()).collect();
        assert_eq!(paths, vec!["b", "a.inner", "z"]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut validator = Validator::new();
        validator.add_schema(
            json!({"definitions": {"positiveInt": {"type": "integer", "minimum": 1}}}),
            "/types.json",
        );
        let schema = json!({
            "required": ["amount", "other"],
            "properties": {
                "amount": {"$ref": "/types.json#/definitions/positiveInt"},
                "other": {"type": "string", "maxLength": 2}
            }
        });
        let data = json!({"amount": -1.2, "other": "long"});

        let first = validator.validate(&data, &schema).unwrap();
        let second = validator.validate(&data, &schema).unwrap();
        assert_eq!(first, second);
    }
}
