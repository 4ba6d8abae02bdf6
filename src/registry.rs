//! Schema Registry
//!
//! Stores schema documents keyed by normalized URI and resolves `$ref`
//! strings to concrete schema nodes, possibly across documents.
//!
//! Resolution tries a direct registry hit on the full ref string before
//! falling back to `<uri>#<pointer>` splitting and JSON-pointer traversal,
//! so a fragment that was also registered standalone under its dereferenced
//! URI wins over traversal into the parent document.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};

/// URI-keyed store of schema documents
///
/// Registered documents are never mutated. All registrations must complete
/// before the registry is shared across concurrent validations; `resolve`
/// takes `&self` and is safe to call from multiple threads once registration
/// is done.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    documents: HashMap<String, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `uri`
    ///
    /// The URI is normalized before keying; the last registration for a key
    /// wins. If the document carries its own `id`/`$id`, it is indexed under
    /// that URI as well.
    pub fn add_schema(&mut self, doc: Value, uri: &str) {
        if let Some(id) = doc
            .get("id")
            .or_else(|| doc.get("$id"))
            .and_then(Value::as_str)
        {
            let id_key = normalize_uri(id);
            if id_key != normalize_uri(uri) {
                self.documents.insert(id_key, doc.clone());
            }
        }
        let key = normalize_uri(uri);
        debug!(uri = %key, "registering schema");
        self.documents.insert(key, doc);
    }

    /// Look up a whole document by URI
    pub fn get(&self, uri: &str) -> Option<&Value> {
        self.documents.get(&normalize_uri(uri))
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(&normalize_uri(uri))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Resolve a `$ref` string to a schema node
    ///
    /// `current_uri` is the URI of the document being evaluated; it anchors
    /// same-document (`#/...`) refs and is the fallback when the base URI of
    /// the ref is not registered. Returns the target node together with the
    /// URI of its owning document, which becomes the anchor for refs nested
    /// inside the target.
    pub fn resolve<'a>(&'a self, reference: &str, current_uri: &str) -> Result<(&'a Value, String)> {
        let full = normalize_uri(reference);
        trace!(reference = %full, current = %current_uri, "resolving $ref");

        // Direct hit on the full ref string first.
        if let Some(doc) = self.documents.get(&full) {
            return Ok((doc, full));
        }

        let (base, pointer) = split_fragment(&full);
        let current_key = normalize_uri(current_uri);

        let (doc, owner) = if base.is_empty() {
            let doc = self.documents.get(&current_key).ok_or_else(|| {
                SchemaError::RefNotFound {
                    reference: reference.to_string(),
                }
            })?;
            (doc, current_key)
        } else if let Some(doc) = self.documents.get(base) {
            (doc, base.to_string())
        } else if let Some(doc) = self.documents.get(&current_key) {
            // Relative fragment form: the base URI is unregistered but the
            // pointer may still land inside the current document.
            (doc, current_key)
        } else {
            return Err(SchemaError::RefNotFound {
                reference: reference.to_string(),
            });
        };

        let node = resolve_pointer(doc, pointer).ok_or_else(|| SchemaError::RefNotFound {
            reference: reference.to_string(),
        })?;

        Ok((node, owner))
    }

    /// Check that every `$ref` in `doc` resolves
    ///
    /// `current_uri` anchors same-document refs, exactly as during
    /// validation.
    pub fn verify(&self, doc: &Value, current_uri: &str) -> Result<()> {
        for reference in refs_in(doc) {
            self.resolve(&reference, current_uri)?;
        }
        Ok(())
    }
}

/// Collect every `$ref` string in a document, in depth-first order
pub fn refs_in(doc: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    collect_refs(doc, &mut refs);
    refs
}

fn collect_refs(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(r) = obj.get("$ref").and_then(Value::as_str) {
                refs.push(r.to_string());
            }
            for (_, v) in obj {
                collect_refs(v, refs);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                collect_refs(v, refs);
            }
        }
        _ => {}
    }
}

/// Normalize a URI or ref string into a canonical registry key
///
/// The base (pre-`#`) portion is trailing-slash-insensitive, so
/// `http://x.org/#/p` and `http://x.org#/p` map to the same key. An empty
/// fragment is dropped (`http://x.org#` keys as `http://x.org`).
pub fn normalize_uri(uri: &str) -> String {
    let (base, fragment) = match uri.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (uri, None),
    };
    let base = if base.len() > 1 {
        base.trim_end_matches('/')
    } else {
        base
    };
    match fragment {
        Some(f) if !f.is_empty() => format!("{base}#{f}"),
        _ => base.to_string(),
    }
}

/// Split a normalized ref into base URI and JSON pointer
fn split_fragment(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((base, pointer)) => (base, pointer),
        None => (reference, ""),
    }
}

/// Walk a `/`-separated JSON pointer through a document
///
/// Supports `~0`/`~1` unescaping and numeric segments for arrays. An empty
/// pointer addresses the whole document.
fn resolve_pointer<'a>(doc: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(doc);
    }
    let mut node = doc;
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        node = match node {
            Value::Object(obj) => obj.get(&segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}
