//! Mandate document types.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "mandateId": "0192b1c4-...",
//!   "version": "0.1.0",
//!   "client": "eip155:1:0x...",
//!   "server": "eip155:1:0x...",
//!   "createdAt": "2026-01-01T00:00:00.000Z",
//!   "deadline": "2026-01-01T00:15:00.000Z",
//!   "intent": "swap 100 USDC for ETH",
//!   "core": {"kind": "swap@1", "payload": {}},
//!   "signatures": {"serverSig": {"alg": "eip191", "mandateHash": "0x...", "signature": "0x..."}}
//! }
//! ```
//!
//! An empty `core` is written as `{}`. `signatures` is omitted until the
//! first signature is attached; a document that arrives with
//! `"signatures": {}` keeps it.
//!
//! Decoding is strict. The member set above is closed for a given `version`:
//! an unknown top-level member is rejected as [`MandateError::Malformed`]
//! rather than silently hashed or dropped, so two parties can never sign
//! different views of the same bytes. New members require a new `version`.
//! `null` is not accepted for `core` or `signatures`; omit the member
//! instead.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::account::AccountId;
use crate::error::{MandateError, MandateResult};
use crate::signing::SignatureAlg;

/// Mandate schema version written by this crate.
pub const MANDATE_VERSION: &str = "0.1.0";

/// Signing party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Client, Role::Server];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }

    /// Field name under `signatures`.
    pub fn sig_field(&self) -> &'static str {
        match self {
            Self::Client => "clientSig",
            Self::Server => "serverSig",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MandateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            other => Err(MandateError::malformed(format!("unknown role: {other}"))),
        }
    }
}

/// Tagged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Core {
    pub kind: String,
    pub payload: Value,
}

/// One role's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSignature {
    pub alg: SignatureAlg,
    /// `0x` + 64 hex; the hash the signer saw.
    pub mandate_hash: String,
    /// `0x` + hex of `r || s || v`.
    pub signature: String,
}

impl RoleSignature {
    pub fn signature_bytes(&self) -> Result<Vec<u8>, String> {
        let digits = self
            .signature
            .strip_prefix("0x")
            .ok_or_else(|| "signature must be 0x-prefixed".to_string())?;
        hex::decode(digits).map_err(|e| format!("invalid signature hex: {e}"))
    }
}

/// At most one signature per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Signatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_sig: Option<RoleSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_sig: Option<RoleSignature>,
}

impl Signatures {
    pub fn get(&self, role: Role) -> Option<&RoleSignature> {
        match role {
            Role::Client => self.client_sig.as_ref(),
            Role::Server => self.server_sig.as_ref(),
        }
    }

    /// Attach a signature, replacing any previous one for the role.
    pub fn set(&mut self, role: Role, sig: RoleSignature) {
        match role {
            Role::Client => self.client_sig = Some(sig),
            Role::Server => self.server_sig = Some(sig),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.client_sig.is_none() && self.server_sig.is_none()
    }
}

/// A two-party agreement document.
///
/// Parties are fixed at construction. The only mutations are replacing the
/// core ([`Mandate::set_core`]) and attaching signatures ([`Mandate::sign`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireMandate")]
pub struct Mandate {
    pub(crate) mandate_id: String,
    pub(crate) version: String,
    pub(crate) client: AccountId,
    pub(crate) server: AccountId,
    pub(crate) created_at: String,
    pub(crate) deadline: String,
    pub(crate) intent: String,
    #[serde(serialize_with = "serialize_core_slot")]
    pub(crate) core: Option<Core>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) signatures: Option<Signatures>,
}

/// Serializes an absent core as `{}`.
pub(crate) struct CoreSlot<'a>(pub(crate) &'a Option<Core>);

impl Serialize for CoreSlot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(core) => core.serialize(serializer),
            None => serde_json::Map::new().serialize(serializer),
        }
    }
}

fn serialize_core_slot<S: Serializer>(core: &Option<Core>, serializer: S) -> Result<S::Ok, S::Error> {
    CoreSlot(core).serialize(serializer)
}

impl Mandate {
    pub fn builder() -> MandateBuilder {
        MandateBuilder::default()
    }

    pub fn mandate_id(&self) -> &str {
        &self.mandate_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn client(&self) -> &AccountId {
        &self.client
    }

    pub fn server(&self) -> &AccountId {
        &self.server
    }

    pub fn party(&self, role: Role) -> &AccountId {
        match role {
            Role::Client => &self.client,
            Role::Server => &self.server,
        }
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn deadline(&self) -> &str {
        &self.deadline
    }

    /// Parsed deadline.
    pub fn deadline_at(&self) -> MandateResult<DateTime<Utc>> {
        parse_timestamp("deadline", &self.deadline)
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn core(&self) -> Option<&Core> {
        self.core.as_ref()
    }

    pub fn signatures(&self) -> Option<&Signatures> {
        self.signatures.as_ref()
    }

    pub fn signature(&self, role: Role) -> Option<&RoleSignature> {
        self.signatures.as_ref().and_then(|s| s.get(role))
    }

    /// Independent JSON snapshot of the full document, signatures included.
    pub fn to_json(&self) -> MandateResult<Value> {
        serde_json::to_value(self).map_err(|e| MandateError::malformed(e.to_string()))
    }

    /// Re-hydrate from a JSON document, keeping any attached signatures.
    pub fn from_object(value: Value) -> MandateResult<Self> {
        let wire: WireMandate =
            serde_json::from_value(value).map_err(|e| MandateError::malformed(e.to_string()))?;
        Self::try_from(wire)
    }

    pub fn from_slice(bytes: &[u8]) -> MandateResult<Self> {
        let wire: WireMandate =
            serde_json::from_slice(bytes).map_err(|e| MandateError::malformed(e.to_string()))?;
        Self::try_from(wire)
    }

    pub fn to_vec(&self) -> MandateResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| MandateError::malformed(e.to_string()))
    }

    pub fn to_vec_pretty(&self) -> MandateResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| MandateError::malformed(e.to_string()))
    }
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> MandateResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MandateError::construction(format!("{field} is not RFC 3339 ({value:?}): {e}")))
}

pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builder for creating mandates.
#[derive(Debug, Default)]
pub struct MandateBuilder {
    mandate_id: Option<String>,
    version: Option<String>,
    client: Option<String>,
    server: Option<String>,
    created_at: Option<String>,
    deadline: Option<String>,
    intent: Option<String>,
    core: Option<Core>,
    signatures: Option<Signatures>,
}

impl MandateBuilder {
    /// Set an explicit mandate id (default: UUIDv7).
    pub fn mandate_id(mut self, id: impl Into<String>) -> Self {
        self.mandate_id = Some(id.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Client account, CAIP-10.
    pub fn client(mut self, account: impl Into<String>) -> Self {
        self.client = Some(account.into());
        self
    }

    /// Server account, CAIP-10.
    pub fn server(mut self, account: impl Into<String>) -> Self {
        self.server = Some(account.into());
        self
    }

    /// RFC 3339 creation time (default: now).
    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// RFC 3339 deadline.
    pub fn deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn deadline_at(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(format_timestamp(deadline));
        self
    }

    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Raw core. Use [`Mandate::set_core`] to validate against a registry.
    pub fn core(mut self, core: Core) -> Self {
        self.core = Some(core);
        self
    }

    pub(crate) fn signatures(mut self, signatures: Option<Signatures>) -> Self {
        self.signatures = signatures;
        self
    }

    /// Build the mandate.
    ///
    /// Returns [`MandateError::Construction`] if `client`, `server` or
    /// `deadline` is missing or malformed.
    pub fn build(self) -> MandateResult<Mandate> {
        let client = self
            .client
            .ok_or_else(|| MandateError::construction("client is required"))?;
        let server = self
            .server
            .ok_or_else(|| MandateError::construction("server is required"))?;
        let deadline = self
            .deadline
            .ok_or_else(|| MandateError::construction("deadline is required"))?;
        parse_timestamp("deadline", &deadline)?;

        let created_at = match self.created_at {
            Some(created_at) => {
                parse_timestamp("createdAt", &created_at)?;
                created_at
            }
            None => format_timestamp(Utc::now()),
        };

        let mandate_id = match self.mandate_id {
            Some(id) if id.is_empty() => {
                return Err(MandateError::construction("mandateId must not be empty"))
            }
            Some(id) => id,
            None => Uuid::now_v7().to_string(),
        };

        Ok(Mandate {
            mandate_id,
            version: self.version.unwrap_or_else(|| MANDATE_VERSION.to_string()),
            client: AccountId::parse(&client)?,
            server: AccountId::parse(&server)?,
            created_at,
            deadline,
            intent: self.intent.unwrap_or_default(),
            core: self.core,
            signatures: self.signatures,
        })
    }
}

/// Untrusted wire shape; every field optional so missing ones surface as
/// construction errors rather than serde noise.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireMandate {
    mandate_id: Option<String>,
    version: Option<String>,
    client: Option<String>,
    server: Option<String>,
    created_at: Option<String>,
    deadline: Option<String>,
    intent: Option<String>,
    #[serde(default, deserialize_with = "present")]
    core: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    signatures: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it can be rejected.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn core_from_wire(value: Value) -> MandateResult<Option<Core>> {
    match value {
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(mut map) => {
            let kind = match map.remove("kind") {
                Some(Value::String(kind)) => kind,
                _ => return Err(MandateError::malformed("core.kind must be a string")),
            };
            let payload = map
                .remove("payload")
                .ok_or_else(|| MandateError::malformed("core.payload is required"))?;
            if let Some(extra) = map.keys().next() {
                return Err(MandateError::malformed(format!("unexpected core field: {extra}")));
            }
            Ok(Some(Core { kind, payload }))
        }
        _ => Err(MandateError::malformed("core must be an object")),
    }
}

fn signatures_from_wire(value: Value) -> MandateResult<Signatures> {
    if value.is_null() {
        return Err(MandateError::malformed("signatures must be an object"));
    }
    serde_json::from_value(value).map_err(|e| MandateError::malformed(format!("signatures: {e}")))
}

impl TryFrom<WireMandate> for Mandate {
    type Error = MandateError;

    fn try_from(wire: WireMandate) -> Result<Self, Self::Error> {
        let signatures = wire.signatures.map(signatures_from_wire).transpose()?;
        let mut builder = Mandate::builder().signatures(signatures);
        if let Some(id) = wire.mandate_id {
            builder = builder.mandate_id(id);
        }
        if let Some(version) = wire.version {
            builder = builder.version(version);
        }
        if let Some(client) = wire.client {
            builder = builder.client(client);
        }
        if let Some(server) = wire.server {
            builder = builder.server(server);
        }
        if let Some(created_at) = wire.created_at {
            builder = builder.created_at(created_at);
        }
        if let Some(deadline) = wire.deadline {
            builder = builder.deadline(deadline);
        }
        if let Some(intent) = wire.intent {
            builder = builder.intent(intent);
        }
        if let Some(core) = wire.core.map(core_from_wire).transpose()?.flatten() {
            builder = builder.core(core);
        }
        builder.build()
    }
}
