//! Third-party verification.
//!
//! [`verify_mandate`] takes nothing but an untrusted document and options.
//! It holds no state between calls and can run concurrently from any process
//! that has the serialized mandate.
//!
//! Steps, first failure aborts:
//!
//! 1. Re-hydrate the document.
//! 2. Verify both role signatures.
//! 3. Compare party addresses with any required addresses.
//! 4. Check the deadline against `now`.
//! 5. Check the core kind, payload shape and business rules, if a kind is expected.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{MandateError, MandateResult};
use crate::mandate::{format_timestamp, Core, Mandate, MandateVerification, Role};
use crate::registry::PrimitiveRegistry;
use crate::signing::Eip712Domain;

/// Options for [`verify_mandate`]. Every check beyond signatures and the
/// deadline is opt-in.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub require_client: Option<String>,
    pub require_server: Option<String>,
    /// Reference time (default: now).
    pub now: Option<DateTime<Utc>>,
    pub client_domain: Option<Eip712Domain>,
    pub server_domain: Option<Eip712Domain>,
    pub expect_kind: Option<String>,
}

impl VerifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_require_client(mut self, address: impl Into<String>) -> Self {
        self.require_client = Some(address.into());
        self
    }

    pub fn with_require_server(mut self, address: impl Into<String>) -> Self {
        self.require_server = Some(address.into());
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_client_domain(mut self, domain: Eip712Domain) -> Self {
        self.client_domain = Some(domain);
        self
    }

    pub fn with_server_domain(mut self, domain: Eip712Domain) -> Self {
        self.server_domain = Some(domain);
        self
    }

    pub fn with_expect_kind(mut self, kind: impl Into<String>) -> Self {
        self.expect_kind = Some(kind.into());
        self
    }
}

/// Plain party addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parties {
    pub client: String,
    pub server: String,
}

/// Self-contained verification receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReceipt {
    pub ok: bool,
    pub mandate_id: String,
    pub parties: Parties,
    pub signatures: MandateVerification,
    pub mandate_hash: String,
    pub core: Option<Core>,
}

/// Fully verify an untrusted mandate document.
pub fn verify_mandate(
    document: &Value,
    options: &VerifyOptions,
    registry: &PrimitiveRegistry,
) -> MandateResult<VerificationReceipt> {
    let result = run_checks(document, options, registry);
    match &result {
        Ok(receipt) => info!(
            mandate_id = %receipt.mandate_id,
            mandate_hash = %receipt.mandate_hash,
            "mandate verified"
        ),
        Err(e) => warn!(code = e.code(), error = %e, "mandate verification failed"),
    }
    result
}

fn run_checks(
    document: &Value,
    options: &VerifyOptions,
    registry: &PrimitiveRegistry,
) -> MandateResult<VerificationReceipt> {
    let mandate = Mandate::from_object(document.clone())?;

    let signatures = mandate.verify_all(
        options.client_domain.as_ref(),
        options.server_domain.as_ref(),
    )?;

    check_identity(&mandate, Role::Client, options.require_client.as_deref())?;
    check_identity(&mandate, Role::Server, options.require_server.as_deref())?;

    let now = options.now.unwrap_or_else(Utc::now);
    let deadline = mandate.deadline_at()?;
    if deadline < now {
        return Err(MandateError::DeadlinePassed {
            deadline: mandate.deadline().to_string(),
            now: format_timestamp(now),
        });
    }

    if let Some(kind) = options.expect_kind.as_deref() {
        check_core(&mandate, registry, kind)?;
    }

    Ok(VerificationReceipt {
        ok: true,
        mandate_id: mandate.mandate_id().to_string(),
        parties: Parties {
            client: mandate.client().address().to_string(),
            server: mandate.server().address().to_string(),
        },
        mandate_hash: signatures.client.mandate_hash.clone(),
        signatures,
        core: mandate.core().cloned(),
    })
}

fn check_identity(mandate: &Mandate, role: Role, required: Option<&str>) -> MandateResult<()> {
    let Some(required) = required else {
        return Ok(());
    };
    let party = mandate.party(role);
    if party.matches_address(required) {
        Ok(())
    } else {
        Err(MandateError::IdentityMismatch {
            role,
            required: required.to_string(),
            found: party.address().to_string(),
        })
    }
}

fn check_core(mandate: &Mandate, registry: &PrimitiveRegistry, kind: &str) -> MandateResult<()> {
    let validator = registry.get(kind)?;
    let unexpected = |reason: String| MandateError::UnexpectedCoreShape { reason };

    let core = mandate
        .core()
        .ok_or_else(|| unexpected(format!("expected {kind}, mandate has no core")))?;
    if core.kind != kind {
        return Err(unexpected(format!("expected {kind}, found {}", core.kind)));
    }
    validator
        .validate(&core.payload)
        .map_err(|e| unexpected(format!("{kind} payload: {e}")))?;
    validator
        .check_rules(&core.payload)
        .map_err(|e| unexpected(format!("{kind} rules: {e}")))
}
