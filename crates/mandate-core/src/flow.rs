//! Two-party negotiation.
//!
//! ```text
//! server: propose()  ──JSON──▶  client: accept()
//! server: finalize() ◀──JSON──
//! ```
//!
//! The server builds and signs first. The client re-hydrates the bytes,
//! checks the server's signature, that it is the named client, the payload
//! kind and the deadline, then countersigns. The server re-verifies both.

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{MandateError, MandateResult};
use crate::mandate::{format_timestamp, Mandate, MandateVerification, Role};
use crate::registry::PrimitiveRegistry;
use crate::signing::{Eip712Domain, SignatureScheme, SigningIdentity};
use crate::transport::MessageTransport;

/// What the client insists on before countersigning.
#[derive(Debug, Clone, Default)]
pub struct AcceptTerms {
    /// Payload kind the client is willing to sign.
    pub expect_kind: Option<String>,
    /// Domain the server signed under, if eip712.
    pub server_domain: Option<Eip712Domain>,
}

/// Sign `mandate` as server and serialize it for the client.
pub async fn propose<I>(
    mut mandate: Mandate,
    server: &I,
    scheme: &SignatureScheme,
) -> MandateResult<(Mandate, Bytes)>
where
    I: SigningIdentity + ?Sized,
{
    mandate.sign(Role::Server, server, scheme).await?;
    let bytes = Bytes::from(mandate.to_vec()?);
    info!(mandate_id = %mandate.mandate_id(), "mandate proposed");
    Ok((mandate, bytes))
}

/// Check a proposal and countersign it as client.
pub async fn accept<I>(
    proposal: &[u8],
    client: &I,
    scheme: &SignatureScheme,
    registry: &PrimitiveRegistry,
    terms: &AcceptTerms,
) -> MandateResult<(Mandate, Bytes)>
where
    I: SigningIdentity + ?Sized,
{
    let mut mandate = Mandate::from_slice(proposal)?;
    mandate.verify_role(Role::Server, terms.server_domain.as_ref())?;

    let own = client.address().to_checksum(None);
    if !mandate.client().matches_address(&own) {
        return Err(MandateError::IdentityMismatch {
            role: Role::Client,
            required: mandate.client().address().to_string(),
            found: own,
        });
    }

    if let Some(kind) = terms.expect_kind.as_deref() {
        mandate.core_as_kind(registry, kind)?;
    }

    let now = Utc::now();
    if mandate.deadline_at()? < now {
        return Err(MandateError::DeadlinePassed {
            deadline: mandate.deadline().to_string(),
            now: format_timestamp(now),
        });
    }

    mandate.sign(Role::Client, client, scheme).await?;
    let bytes = Bytes::from(mandate.to_vec()?);
    info!(mandate_id = %mandate.mandate_id(), "mandate accepted");
    Ok((mandate, bytes))
}

/// Re-verify the countersigned mandate on the server side.
pub fn finalize(
    countersigned: &[u8],
    client_domain: Option<&Eip712Domain>,
    server_domain: Option<&Eip712Domain>,
) -> MandateResult<(Mandate, MandateVerification)> {
    let mandate = Mandate::from_slice(countersigned)?;
    let verification = mandate.verify_all(client_domain, server_domain)?;
    info!(mandate_id = %mandate.mandate_id(), "mandate finalized");
    Ok((mandate, verification))
}

/// Send a mandate's JSON over a transport.
pub async fn send_mandate<T>(transport: &T, mandate: &Mandate) -> MandateResult<()>
where
    T: MessageTransport + ?Sized,
{
    debug!(mandate_id = %mandate.mandate_id(), "sending mandate");
    transport.send(Bytes::from(mandate.to_vec()?)).await
}

/// Receive the next message as raw mandate bytes.
pub async fn receive_mandate<T>(transport: &T) -> MandateResult<Bytes>
where
    T: MessageTransport + ?Sized,
{
    transport
        .receive()
        .await?
        .ok_or_else(|| MandateError::Transport {
            reason: "peer hung up before sending a mandate".to_string(),
        })
}
