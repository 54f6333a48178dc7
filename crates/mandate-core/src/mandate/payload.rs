use serde_json::Value;
use tracing::debug;

use super::types::{Core, Mandate};
use crate::error::{MandateError, MandateResult};
use crate::registry::{decode, Primitive, PrimitiveRegistry};

impl Mandate {
    /// Validate `payload` as `kind` and replace the core with the result.
    ///
    /// Existing signatures are left attached; they stop verifying because the
    /// hash changes, so callers re-sign after changing the core.
    pub fn set_core(
        &mut self,
        registry: &PrimitiveRegistry,
        kind: &str,
        payload: Value,
    ) -> MandateResult<()> {
        let payload = registry.validate(kind, &payload)?;
        debug!(mandate_id = %self.mandate_id, kind, "core replaced");
        self.core = Some(Core {
            kind: kind.to_string(),
            payload,
        });
        Ok(())
    }

    /// Set a typed primitive as the core. `P::KIND` must be registered.
    pub fn set_primitive<P: Primitive>(
        &mut self,
        registry: &PrimitiveRegistry,
        primitive: &P,
    ) -> MandateResult<()> {
        let payload = serde_json::to_value(primitive).map_err(|e| MandateError::PayloadValidation {
            kind: P::KIND.to_string(),
            reason: e.to_string(),
        })?;
        self.set_core(registry, P::KIND, payload)
    }

    /// True iff the current core carries `kind`.
    pub fn is(&self, kind: &str) -> bool {
        self.core.as_ref().is_some_and(|c| c.kind == kind)
    }

    /// Re-validate the core payload through a caller-supplied validator.
    ///
    /// With `expected_kind`, the tag is checked first.
    pub fn core_as<T, F>(&self, validator: F, expected_kind: Option<&str>) -> MandateResult<T>
    where
        F: FnOnce(&Value) -> Result<T, String>,
    {
        let core = self.core.as_ref().ok_or_else(|| MandateError::CoreShapeMismatch {
            expected: expected_kind.unwrap_or("any").to_string(),
            found: "empty core".to_string(),
        })?;
        if let Some(expected) = expected_kind {
            if core.kind != expected {
                return Err(MandateError::CoreShapeMismatch {
                    expected: expected.to_string(),
                    found: core.kind.clone(),
                });
            }
        }
        validator(&core.payload).map_err(|reason| MandateError::PayloadValidation {
            kind: core.kind.clone(),
            reason,
        })
    }

    /// Like [`Mandate::core_as`], but absent on any failure.
    pub fn try_core_as<T, F>(&self, validator: F, expected_kind: Option<&str>) -> Option<T>
    where
        F: FnOnce(&Value) -> Result<T, String>,
    {
        self.core_as(validator, expected_kind).ok()
    }

    /// Re-validate the core through the registry's validator for `kind`.
    pub fn core_as_kind(&self, registry: &PrimitiveRegistry, kind: &str) -> MandateResult<Value> {
        let validator = registry.get(kind)?;
        self.core_as(|payload| validator.validate(payload), Some(kind))
    }

    /// Decode the core as a typed primitive.
    pub fn primitive<P: Primitive>(&self) -> MandateResult<P> {
        self.core_as(decode::<P>, Some(P::KIND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::SwapV1;
    use serde_json::json;

    fn mandate() -> Mandate {
        Mandate::builder()
            .client("eip155:1:0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
            .server("eip155:1:0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf")
            .deadline("2030-01-01T00:00:00Z")
            .build()
            .unwrap()
    }

    fn swap_payload() -> Value {
        json!({
            "chainId": 1,
            "tokenIn": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "tokenOut": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "amountIn": "100000000",
            "minOut": "165000",
            "recipient": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        })
    }

    #[test]
    fn test_set_core_validates() {
        let registry = PrimitiveRegistry::with_builtins();
        let mut m = mandate();

        m.set_core(&registry, "swap@1", swap_payload()).unwrap();
        assert!(m.is("swap@1"));
        assert!(!m.is("transfer@1"));

        let err = m.set_core(&registry, "swap@1", json!({"amountIn": "1"})).unwrap_err();
        assert!(matches!(err, MandateError::PayloadValidation { .. }));
        // Failed replacement leaves the previous core intact
        assert_eq!(m.core().unwrap().payload, swap_payload());

        let err = m.set_core(&registry, "lend@1", json!({})).unwrap_err();
        assert!(matches!(err, MandateError::UnknownPrimitive { .. }));
    }

    #[test]
    fn test_core_as_checks_kind_first() {
        let registry = PrimitiveRegistry::with_builtins();
        let mut m = mandate();

        let err = m.core_as(|v| Ok(v.clone()), None).unwrap_err();
        assert!(matches!(err, MandateError::CoreShapeMismatch { .. }));

        m.set_core(&registry, "swap@1", swap_payload()).unwrap();
        let err = m.core_as(|v| Ok(v.clone()), Some("transfer@1")).unwrap_err();
        assert_eq!(
            err,
            MandateError::CoreShapeMismatch {
                expected: "transfer@1".into(),
                found: "swap@1".into()
            }
        );

        let amount: String = m
            .core_as(
                |v| v["amountIn"].as_str().map(str::to_string).ok_or_else(|| "no amountIn".into()),
                Some("swap@1"),
            )
            .unwrap();
        assert_eq!(amount, "100000000");

        assert!(m.try_core_as(|_| Err::<(), _>("nope".to_string()), None).is_none());
    }

    #[test]
    fn test_typed_primitive_access() {
        let registry = PrimitiveRegistry::with_builtins();
        let mut m = mandate();
        let swap: SwapV1 = serde_json::from_value(swap_payload()).unwrap();
        m.set_primitive(&registry, &swap).unwrap();
        assert_eq!(m.primitive::<SwapV1>().unwrap(), swap);
        assert_eq!(m.core_as_kind(&registry, "swap@1").unwrap(), swap_payload());
    }

    #[test]
    fn test_core_as_kind_unregistered() {
        let registry = PrimitiveRegistry::new();
        let m = mandate();
        assert!(matches!(
            m.core_as_kind(&registry, "swap@1"),
            Err(MandateError::UnknownPrimitive { .. })
        ));
    }
}
