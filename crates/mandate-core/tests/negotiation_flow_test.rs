//! Two-party negotiation over an in-process transport, with publication to a
//! blob store and re-verification by an observer.

use chrono::{Duration, Utc};
use mandate_core::flow::{self, AcceptTerms};
use mandate_core::mandate::{Mandate, Role};
use mandate_core::store::{fetch_mandate, publish_mandate};
use mandate_core::verify::{verify_mandate, VerifyOptions};
use mandate_core::{
    AccountId, ChannelTransport, Eip712Domain, LocalSigner, MandateError, ObjectStoreBlobStore,
    PrimitiveRegistry, SignatureScheme, SigningIdentity,
};
use serde_json::json;

fn transfer_mandate(client: &LocalSigner, server: &LocalSigner) -> Mandate {
    let registry = PrimitiveRegistry::with_builtins();
    let mut mandate = Mandate::builder()
        .client(AccountId::eip155(8453, client.address()).to_string())
        .server(AccountId::eip155(8453, server.address()).to_string())
        .deadline_at(Utc::now() + Duration::minutes(15))
        .intent("pay 5 USDC for inference")
        .build()
        .unwrap();
    mandate
        .set_core(
            &registry,
            "transfer@1",
            json!({
                "chainId": 8453,
                "token": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                "amount": "5000000",
                "to": server.address().to_checksum(None)
            }),
        )
        .unwrap();
    mandate
}

#[tokio::test]
async fn test_two_party_flow_over_channel() {
    let client = LocalSigner::random();
    let server = LocalSigner::random();
    let (server_end, client_end) = ChannelTransport::pair(4);
    let registry = PrimitiveRegistry::with_builtins();
    let server_domain = Eip712Domain::for_chain(8453).with_name("Mandates").with_version("1");

    // Client side runs as its own task
    let client_task = {
        let client = client.clone();
        let registry = registry.clone();
        let server_domain = server_domain.clone();
        tokio::spawn(async move {
            let proposal = flow::receive_mandate(&client_end).await?;
            let terms = AcceptTerms {
                expect_kind: Some("transfer@1".to_string()),
                server_domain: Some(server_domain),
            };
            let (accepted, _) =
                flow::accept(&proposal, &client, &SignatureScheme::Eip191, &registry, &terms)
                    .await?;
            flow::send_mandate(&client_end, &accepted).await?;
            Ok::<_, MandateError>(accepted)
        })
    };

    let (proposed, _) = flow::propose(
        transfer_mandate(&client, &server),
        &server,
        &SignatureScheme::Eip712(server_domain.clone()),
    )
    .await
    .unwrap();
    flow::send_mandate(&server_end, &proposed).await.unwrap();

    let reply = flow::receive_mandate(&server_end).await.unwrap();
    let (final_mandate, verification) =
        flow::finalize(&reply, None, Some(&server_domain)).unwrap();
    let accepted = client_task.await.unwrap().unwrap();

    assert_eq!(final_mandate, accepted);
    assert_eq!(final_mandate.hash().unwrap(), proposed.hash().unwrap());
    assert_eq!(verification.client.recovered, client.address().to_checksum(None));
    assert_eq!(verification.server.recovered, server.address().to_checksum(None));

    // Publish, then an observer with only the content id re-verifies
    let store = ObjectStoreBlobStore::memory();
    let id = publish_mandate(&store, &final_mandate).await.unwrap();
    let fetched = fetch_mandate(&store, &id).await.unwrap();
    let receipt = verify_mandate(
        &fetched.to_json().unwrap(),
        &VerifyOptions::new()
            .with_server_domain(server_domain)
            .with_expect_kind("transfer@1"),
        &registry,
    )
    .unwrap();
    assert!(receipt.ok);
    assert_eq!(receipt.mandate_id, final_mandate.mandate_id());
}

#[tokio::test]
async fn test_accept_rejects_wrong_client() {
    let client = LocalSigner::random();
    let server = LocalSigner::random();
    let stranger = LocalSigner::random();
    let registry = PrimitiveRegistry::with_builtins();

    let (_, bytes) = flow::propose(
        transfer_mandate(&client, &server),
        &server,
        &SignatureScheme::Eip191,
    )
    .await
    .unwrap();

    let err = flow::accept(
        &bytes,
        &stranger,
        &SignatureScheme::Eip191,
        &registry,
        &AcceptTerms::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MandateError::IdentityMismatch { role: Role::Client, .. }));
}

#[tokio::test]
async fn test_accept_rejects_unexpected_kind() {
    let client = LocalSigner::random();
    let server = LocalSigner::random();
    let registry = PrimitiveRegistry::with_builtins();

    let (_, bytes) = flow::propose(
        transfer_mandate(&client, &server),
        &server,
        &SignatureScheme::Eip191,
    )
    .await
    .unwrap();

    let terms = AcceptTerms {
        expect_kind: Some("swap@1".to_string()),
        server_domain: None,
    };
    let err = flow::accept(&bytes, &client, &SignatureScheme::Eip191, &registry, &terms)
        .await
        .unwrap_err();
    assert!(matches!(err, MandateError::CoreShapeMismatch { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_accept_rejects_tampered_proposal() {
    let client = LocalSigner::random();
    let server = LocalSigner::random();
    let registry = PrimitiveRegistry::with_builtins();

    let (proposed, _) = flow::propose(
        transfer_mandate(&client, &server),
        &server,
        &SignatureScheme::Eip191,
    )
    .await
    .unwrap();
    let mut doc = proposed.to_json().unwrap();
    doc["core"]["payload"]["amount"] = json!("5000001");
    let bytes = serde_json::to_vec(&doc).unwrap();

    let err = flow::accept(
        &bytes,
        &client,
        &SignatureScheme::Eip191,
        &registry,
        &AcceptTerms::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MandateError::HashMismatch { role: Role::Server, .. }));
}

#[tokio::test]
async fn test_receive_after_hangup() {
    let (a, b) = ChannelTransport::pair(1);
    drop(a);
    assert!(matches!(
        flow::receive_mandate(&b).await,
        Err(MandateError::Transport { .. })
    ));
}
