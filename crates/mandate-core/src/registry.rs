//! Primitive registry: payload kind → validator.
//!
//! A registry is an explicit value, cloned cheaply and shared by reference
//! count. Registration is a one-time declaration per kind: a second
//! registration of the same kind fails and the first stays intact, including
//! when registrations race.
//!
//! Kinds are plain strings (`swap@1`). A deployment's kinds are usually Rust
//! types implementing [`Primitive`]; ad-hoc validators can be registered with
//! [`PrimitiveRegistry::register_fn`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{MandateError, MandateResult};
use crate::primitives::{SwapV1, TransferV1};

/// Runtime validator for one payload kind.
pub trait PayloadValidator: Send + Sync {
    /// Check the payload shape and return its normalized form.
    fn validate(&self, payload: &Value) -> Result<Value, String>;

    /// Kind-specific business rules, applied by third-party verification.
    fn check_rules(&self, _payload: &Value) -> Result<(), String> {
        Ok(())
    }
}

/// A typed payload primitive.
///
/// The serde shape is the minimal structural contract; `check_shape` adds
/// field-level constraints serde cannot express and `check_rules` adds
/// business rules (e.g. non-zero amounts).
pub trait Primitive: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Registry identifier, e.g. `swap@1`.
    const KIND: &'static str;

    fn check_shape(&self) -> Result<(), String> {
        Ok(())
    }

    fn check_rules(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Decode and shape-check a payload as `P`.
pub fn decode<P: Primitive>(payload: &Value) -> Result<P, String> {
    let typed: P = serde_json::from_value(payload.clone()).map_err(|e| e.to_string())?;
    typed.check_shape()?;
    Ok(typed)
}

/// Adapts a [`Primitive`] type into a [`PayloadValidator`].
pub struct PrimitiveValidator<P>(PhantomData<fn() -> P>);

impl<P> PrimitiveValidator<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<P> Default for PrimitiveValidator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Primitive> PayloadValidator for PrimitiveValidator<P> {
    fn validate(&self, payload: &Value) -> Result<Value, String> {
        let typed = decode::<P>(payload)?;
        serde_json::to_value(&typed).map_err(|e| e.to_string())
    }

    fn check_rules(&self, payload: &Value) -> Result<(), String> {
        decode::<P>(payload)?.check_rules()
    }
}

/// Adapts a closure into a [`PayloadValidator`].
pub struct FnValidator<F>(F);

impl<F> PayloadValidator for FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn validate(&self, payload: &Value) -> Result<Value, String> {
        (self.0)(payload)
    }
}

type Table = HashMap<String, Arc<dyn PayloadValidator>>;

/// Registry of payload primitives.
#[derive(Clone, Default)]
pub struct PrimitiveRegistry {
    inner: Arc<RwLock<Table>>,
}

impl PrimitiveRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in primitives (`swap@1`, `transfer@1`).
    pub fn with_builtins() -> Self {
        let mut table: Table = HashMap::new();
        table.insert(
            SwapV1::KIND.to_string(),
            Arc::new(PrimitiveValidator::<SwapV1>::new()),
        );
        table.insert(
            TransferV1::KIND.to_string(),
            Arc::new(PrimitiveValidator::<TransferV1>::new()),
        );
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a validator for `kind`.
    ///
    /// # Errors
    ///
    /// [`MandateError::DuplicateRegistration`] if `kind` is already present.
    pub fn register(
        &self,
        kind: impl Into<String>,
        validator: impl PayloadValidator + 'static,
    ) -> MandateResult<()> {
        let kind = kind.into();
        match self.write().entry(kind) {
            Entry::Occupied(entry) => Err(MandateError::DuplicateRegistration {
                kind: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(kind = %entry.key(), "registered primitive");
                entry.insert(Arc::new(validator));
                Ok(())
            }
        }
    }

    /// Register a typed primitive under `P::KIND`.
    pub fn register_primitive<P: Primitive>(&self) -> MandateResult<()> {
        self.register(P::KIND, PrimitiveValidator::<P>::new())
    }

    /// Register a closure validator.
    pub fn register_fn<F>(&self, kind: impl Into<String>, validator: F) -> MandateResult<()>
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(kind, FnValidator(validator))
    }

    /// Look up the validator for `kind`.
    pub fn get(&self, kind: &str) -> MandateResult<Arc<dyn PayloadValidator>> {
        self.read()
            .get(kind)
            .cloned()
            .ok_or_else(|| MandateError::UnknownPrimitive {
                kind: kind.to_string(),
            })
    }

    pub fn has(&self, kind: &str) -> bool {
        self.read().contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Validate `payload` as `kind`, returning the normalized payload.
    pub fn validate(&self, kind: &str, payload: &Value) -> MandateResult<Value> {
        let validator = self.get(kind)?;
        validator
            .validate(payload)
            .map_err(|reason| MandateError::PayloadValidation {
                kind: kind.to_string(),
                reason,
            })
    }
}

impl fmt::Debug for PrimitiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
