//! # Credential Schemas
//!
//! Raw JSON Schemas are registered by id and compiled on first use. Compiled
//! validators are cached until the schema is replaced.
//!
//! Schemas are compiled as Draft 2020-12 with format assertions (`date-time`,
//! `uri`, ...) enabled. `$ref`s to other registered schemas resolve locally;
//! nothing is fetched.

use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A single schema failure.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaError {
    /// Id of the schema that failed.
    pub schema: String,

    /// JSON pointer to the failing value, e.g. `/credentialSubject/a`.
    pub instance_path: String,

    /// What failed.
    pub message: String,
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}: {}", self.schema, self.message)
        } else {
            write!(f, "{} at {}: {}", self.schema, self.instance_path, self.message)
        }
    }
}

/// Registered schemas and their compiled validators. Clones share state.
#[derive(Clone, Default)]
pub struct SchemaResolver {
    schemas: Arc<RwLock<HashMap<String, Registered>>>,
    validators: Arc<RwLock<HashMap<String, Arc<Validator>>>>,
    generation: Arc<AtomicU64>,
}

// a schema and the generation it was registered at
#[derive(Clone)]
struct Registered {
    generation: u64,
    schema: Value,
}

impl Debug for SchemaResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SchemaResolver")
            .field("schemas", &schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `id`, replacing any previous schema and its
    /// compiled validator.
    pub fn add_schema(&self, id: impl Into<String>, schema: Value) {
        let id = id.into();
        tracing::debug!(schema = %id, "registering schema");

        // lock order: validators, then schemas
        let mut validators = self.validators.write().unwrap_or_else(PoisonError::into_inner);
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        validators.remove(&id);
        schemas.insert(id, Registered { generation, schema });
    }

    /// The compiled validator for `id`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotFound`] if no schema is registered under `id`
    /// and [`Error::SchemaInvalid`] if it does not compile.
    pub fn resolve_schema(&self, id: &str) -> Result<Arc<Validator>> {
        if let Some(validator) =
            self.validators.read().unwrap_or_else(PoisonError::into_inner).get(id)
        {
            return Ok(Arc::clone(validator));
        }

        let (generation, schema, retriever) = self.snapshot(id)?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .should_validate_formats(true)
            .with_retriever(retriever)
            .build(&schema)
            .map_err(|e| Error::SchemaInvalid(format!("{id}: {e}")))?;
        tracing::debug!(schema = %id, "compiled schema");

        Ok(self.cache(id, generation, validator))
    }

    /// Validate `instance` against the schema registered under `id`,
    /// returning every failure.
    ///
    /// # Errors
    ///
    /// See [`SchemaResolver::resolve_schema`].
    pub fn validate(&self, id: &str, instance: &Value) -> Result<Vec<SchemaError>> {
        let validator = self.resolve_schema(id)?;
        let errors = validator
            .iter_errors(instance)
            .map(|e| SchemaError {
                schema: id.to_string(),
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        Ok(errors)
    }

    // the schema registered under `id`, its generation and a retriever over
    // every registered schema
    fn snapshot(&self, id: &str) -> Result<(u64, Value, StoreRetriever)> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let Some(registered) = schemas.get(id) else {
            return Err(Error::SchemaNotFound(id.to_string()));
        };
        let retriever = StoreRetriever {
            schemas: schemas.iter().map(|(id, r)| (id.clone(), r.schema.clone())).collect(),
        };
        Ok((registered.generation, registered.schema.clone(), retriever))
    }

    // Cache `validator` if `id` has not been replaced since it was read. A
    // concurrent compile of the same generation may have won; keep the first
    // so callers share one validator.
    fn cache(&self, id: &str, generation: u64, validator: Validator) -> Arc<Validator> {
        let mut validators = self.validators.write().unwrap_or_else(PoisonError::into_inner);
        let current = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|r| r.generation);
        if current != Some(generation) {
            tracing::debug!(schema = %id, "schema replaced while compiling");
            return Arc::new(validator);
        }
        Arc::clone(validators.entry(id.to_string()).or_insert_with(|| Arc::new(validator)))
    }
}

/// Resolves `$ref` URIs against the registered schemas.
struct StoreRetriever {
    schemas: HashMap<String, Value>,
}

impl Retrieve for StoreRetriever {
    fn retrieve(
        &self, uri: &Uri<&str>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        self
            .schemas
            .get(uri)
            .cloned()
            .ok_or_else(|| format!("schema {uri} is not registered").into())
    }
}
