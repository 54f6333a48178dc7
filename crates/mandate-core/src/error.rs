//! Error taxonomy for mandate construction, signing and verification.
//!
//! Every failure is surfaced as a distinct, inspectable variant. Nothing in
//! this crate retries: none of these failures are transient.

use crate::mandate::Role;

/// Result type for mandate operations.
pub type MandateResult<T> = Result<T, MandateError>;

/// Mandate errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MandateError {
    /// A required field is missing or malformed at construction.
    #[error("invalid mandate: {reason}")]
    Construction { reason: String },

    /// `core.kind` is not present in the registry.
    #[error("unknown primitive: {kind}")]
    UnknownPrimitive { kind: String },

    /// The kind is already registered; registrations never overwrite.
    #[error("primitive already registered: {kind}")]
    DuplicateRegistration { kind: String },

    /// The payload was rejected by the kind's validator.
    #[error("payload for {kind} failed validation: {reason}")]
    PayloadValidation { kind: String, reason: String },

    /// Typed core access asked for a kind the mandate does not carry.
    #[error("core shape mismatch: expected {expected}, found {found}")]
    CoreShapeMismatch { expected: String, found: String },

    /// No signature is attached for the role (or none at all).
    #[error("{role} signature missing: {detail}")]
    SignatureMissing { role: Role, detail: String },

    /// The signature's embedded hash disagrees with the recomputed hash.
    #[error("{role} signature hash mismatch: signed {signed}, computed {computed}")]
    HashMismatch {
        role: Role,
        signed: String,
        computed: String,
    },

    /// The signature does not recover to the role's address.
    #[error("{role} signature invalid: {reason}")]
    SignatureInvalid { role: Role, reason: String },

    /// Typed-data signing or verification without a domain chain id.
    #[error("eip712 domain with chainId required: {context}")]
    DomainRequired { context: String },

    /// A party address differs from the one the verifier required.
    #[error("{role} identity mismatch: required {required}, found {found}")]
    IdentityMismatch {
        role: Role,
        required: String,
        found: String,
    },

    /// The mandate deadline is already in the past.
    #[error("deadline passed: {deadline} is before {now}")]
    DeadlinePassed { deadline: String, now: String },

    /// The core tag or payload is not what the verifier expected.
    #[error("unexpected core shape: {reason}")]
    UnexpectedCoreShape { reason: String },

    /// The document is not a structurally valid mandate.
    #[error("malformed mandate document: {reason}")]
    Malformed { reason: String },

    /// Canonical serialization failed or produced nothing.
    #[error("canonicalization failed: {reason}")]
    Canonicalization { reason: String },

    /// The signing identity could not produce a signature.
    #[error("signing failed: {reason}")]
    Signing { reason: String },

    /// Blob store failure.
    #[error("store error: {reason}")]
    Store { reason: String },

    /// Message transport failure.
    #[error("transport error: {reason}")]
    Transport { reason: String },
}

impl MandateError {
    /// Stable machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Construction { .. } => "construction",
            Self::UnknownPrimitive { .. } => "unknown_primitive",
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::PayloadValidation { .. } => "payload_validation",
            Self::CoreShapeMismatch { .. } => "core_shape_mismatch",
            Self::SignatureMissing { .. } => "signature_missing",
            Self::HashMismatch { .. } => "hash_mismatch",
            Self::SignatureInvalid { .. } => "signature_invalid",
            Self::DomainRequired { .. } => "domain_required",
            Self::IdentityMismatch { .. } => "identity_mismatch",
            Self::DeadlinePassed { .. } => "deadline_passed",
            Self::UnexpectedCoreShape { .. } => "unexpected_core_shape",
            Self::Malformed { .. } => "malformed",
            Self::Canonicalization { .. } => "canonicalization",
            Self::Signing { .. } => "signing",
            Self::Store { .. } => "store",
            Self::Transport { .. } => "transport",
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Missing evidence
            Self::SignatureMissing { .. } => 2,

            // Wrong parties
            Self::IdentityMismatch { .. } => 3,

            // Cryptographic / tamper failures
            Self::HashMismatch { .. } | Self::SignatureInvalid { .. } => 4,

            // Expired
            Self::DeadlinePassed { .. } => 5,

            // I/O collaborators
            Self::Signing { .. } | Self::Store { .. } | Self::Transport { .. } => 6,

            // Structural / configuration
            Self::Construction { .. }
            | Self::UnknownPrimitive { .. }
            | Self::DuplicateRegistration { .. }
            | Self::PayloadValidation { .. }
            | Self::CoreShapeMismatch { .. }
            | Self::DomainRequired { .. }
            | Self::UnexpectedCoreShape { .. }
            | Self::Malformed { .. }
            | Self::Canonicalization { .. } => 1,
        }
    }

    pub(crate) fn construction(reason: impl Into<String>) -> Self {
        Self::Construction {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
