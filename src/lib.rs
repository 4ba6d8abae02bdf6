//! JSON Schema validation with cross-document `$ref` resolution
//!
//! A small validation engine built around an explicit schema registry:
//! auxiliary schema documents are registered under URIs, data is validated
//! against a root schema, and `$ref`s are resolved across the registered
//! documents.
//!
//! ## Features
//!
//! - **Cross-Document Refs**: `$ref: "<uri>#/<pointer>"` resolves into any
//!   registered document; same-document `#/<pointer>` forms work too
//! - **Dotted Error Paths**: every data error carries a dot-joined property
//!   path (`payment.amount`) plus the keyword that fired
//! - **Cycle Safety**: cyclic `$ref` chains are detected and reported as
//!   schema errors instead of recursing forever
//! - **Keyword Table**: evaluators are dispatched through a fixed table;
//!   unknown keywords are ignored, new ones are added as table entries
//!
//! ## Example
//!
//! ```
//! use refschema::Validator;
//! use serde_json::json;
//!
//! let mut validator = Validator::new();
//! validator.add_schema(
//!     json!({"definitions": {"positiveInt": {"type": "integer", "minimum": 1}}}),
//!     "/types.json",
//! );
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["amount"],
//!     "properties": {
//!         "amount": {"$ref": "/types.json#/definitions/positiveInt"}
//!     }
//! });
//!
//! let result = validator.validate(&json!({"amount": 0}), &schema).unwrap();
//! assert!(!result.valid);
//! assert_eq!(result.errors[0].property, "amount");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod registry;
pub mod report;

pub use engine::Validator;
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
pub use report::{ErrorRecord, ValidationResult};
