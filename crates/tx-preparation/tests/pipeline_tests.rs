//! # Pipeline Tests for Transaction Preparation
//!
//! End-to-end runs of [`TransactionPreparer`] against mock collaborators.
//!
//! ## Test Categories
//!
//! 1. **Reference block** - short-circuit, look-back clamp, truncation, chain id
//! 2. **Interfaces** - missing detection, fallback provider, batch failure
//! 3. **Encoding** - missing interface, partial progress and resumption
//! 4. **Envelope** - full scenario, idempotence, signing

use std::sync::Arc;

use serde_json::json;
use tx_preparation::{
    Action, ContractName, MockActionEncoder, MockChainProvider, MockInterfaceProvider,
    MockSigner, PermissionLevel, PreparationConfig, PreparationError, ProviderError,
    TaposConfig, Transaction, TransactionPreparationApi, TransactionPreparer,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

const TOKEN_ABI: &str = r#"{
    "version": "eosio::abi/1.1",
    "structs": [{"name": "transfer", "base": "", "fields": [
        {"name": "from", "type": "name"},
        {"name": "to", "type": "name"},
        {"name": "quantity", "type": "asset"},
        {"name": "memo", "type": "string"}
    ]}],
    "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}]
}"#;

const HEX_CHAIN_ID: &str = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";

fn name(s: &str) -> ContractName {
    ContractName::new(s).unwrap()
}

fn transfer(account: &str) -> Action {
    Action::new(
        name(account),
        name("transfer"),
        vec![PermissionLevel::new(name("alice"), name("active"))],
        json!({"from": "alice", "to": "bob", "quantity": "1.0000 SYS", "memo": ""}),
    )
}

fn service_with(chain: &Arc<MockChainProvider>, encoder: &Arc<MockActionEncoder>) -> TransactionPreparer {
    TransactionPreparer::new(PreparationConfig::for_testing())
        .with_chain_provider(chain.clone())
        .with_encoder(encoder.clone())
}

// =============================================================================
// REFERENCE BLOCK
// =============================================================================

#[tokio::test]
async fn test_resolved_transaction_makes_no_calls() {
    let chain = Arc::new(MockChainProvider::new("chain1", 100));
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()));
    let mut tx = Transaction::new().with_chain_id("chain1");
    tx.ref_block_num = 1234;
    tx.ref_block_prefix = 5678;

    service.resolve_tapos(&mut tx).await.unwrap();

    assert_eq!(chain.info_calls() + chain.block_calls(), 0);
    assert_eq!(tx.chain_id, "chain1");
    assert_eq!((tx.ref_block_num, tx.ref_block_prefix), (1234, 5678));
}

#[tokio::test]
async fn test_look_back_clamps_to_block_zero() {
    let chain = Arc::new(MockChainProvider::new("chain1", 2).with_block(0, 99));
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()));
    let mut tx = Transaction::new().with_tapos_config(TaposConfig::new(3, 300));

    service.resolve_tapos(&mut tx).await.unwrap();

    assert_eq!(chain.requested_blocks(), vec![0]);
}

#[tokio::test]
async fn test_ref_block_num_keeps_low_16_bits() {
    let chain = Arc::new(MockChainProvider::new("chain1", 65_636).with_block(65_633, 7));
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()));
    let mut tx = Transaction::new();

    service.resolve_tapos(&mut tx).await.unwrap();

    assert_eq!(chain.requested_blocks(), vec![65_633]);
    assert_eq!(tx.ref_block_num, 97);
    assert_eq!(u64::from(tx.ref_block_num), 65_633 % 65_536);
}

#[tokio::test]
async fn test_chain_id_mismatch_keeps_preset_id() {
    let chain = Arc::new(MockChainProvider::new("y", 100).with_block(97, 555));
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()));
    let mut tx = Transaction::new().with_chain_id("x");

    let err = service.resolve_tapos(&mut tx).await.unwrap_err();

    assert_eq!(
        err,
        PreparationError::Mismatch {
            provided: "x".to_string(),
            fetched: "y".to_string()
        }
    );
    assert_eq!(tx.chain_id, "x");
    assert_eq!(tx.ref_block_num, 0);
}

#[tokio::test]
async fn test_prepare_without_chain_provider() {
    let service = TransactionPreparer::new(PreparationConfig::for_testing());
    let mut tx = Transaction::new().with_action(transfer("tokenx"));

    let err = service.prepare(&mut tx).await.unwrap_err();
    assert!(matches!(err, PreparationError::Configuration(_)));
}

// =============================================================================
// INTERFACES
// =============================================================================

#[tokio::test]
async fn test_only_missing_interfaces_are_requested() {
    let chain = Arc::new(MockChainProvider::new("chain1", 100));
    let interfaces = Arc::new(
        MockInterfaceProvider::new()
            .with_abi(name("a"), TOKEN_ABI)
            .with_abi(name("c"), TOKEN_ABI),
    );
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()))
        .with_interface_provider(interfaces.clone());

    let mut tx = Transaction::new()
        .with_chain_id("chain1")
        .with_action(transfer("a"))
        .with_action(transfer("b"))
        .with_action(transfer("a"))
        .with_action(transfer("c"));
    tx.interface_cache_mut()
        .insert(name("b"), TOKEN_ABI.as_bytes())
        .unwrap();

    assert_eq!(tx.accounts_missing_interfaces(), vec![name("a"), name("c")]);
    service.resolve_interfaces(&mut tx).await.unwrap();

    assert_eq!(
        interfaces.requests(),
        vec![("chain1".to_string(), vec![name("a"), name("c")])]
    );
    assert!(tx.accounts_missing_interfaces().is_empty());
}

#[tokio::test]
async fn test_chain_provider_serves_interfaces_when_no_provider_set() {
    let chain = Arc::new(
        MockChainProvider::new("chain1", 100)
            .with_block(97, 555)
            .with_abi(name("tokenx"), TOKEN_ABI),
    );
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()));
    let mut tx = Transaction::new().with_action(transfer("tokenx"));

    service.prepare(&mut tx).await.unwrap();

    assert_eq!(chain.abi_calls(), 1);
    assert!(tx.interface_cache().contains(&name("tokenx")));
}

#[tokio::test]
async fn test_interface_failure_is_passed_through() {
    let chain = Arc::new(MockChainProvider::new("chain1", 100).with_block(97, 555));
    let failure = ProviderError::Rpc {
        code: 503,
        message: "unavailable".to_string(),
    };
    let interfaces = Arc::new(MockInterfaceProvider::new().failing(failure.clone()));
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()))
        .with_interface_provider(interfaces);
    let mut tx = Transaction::new().with_action(transfer("tokenx"));

    let err = service.prepare(&mut tx).await.unwrap_err();

    assert_eq!(err, PreparationError::Collaborator(failure));
    assert_eq!(err.to_string(), "RPC error 503: unavailable");
    assert!(tx.interface_cache().is_empty());
    assert_eq!(tx.ref_block_num, 97);
}

// =============================================================================
// ENCODING
// =============================================================================

#[tokio::test]
async fn test_encoding_requires_interface() {
    let chain = Arc::new(MockChainProvider::new("chain1", 100));
    let encoder = Arc::new(MockActionEncoder::new());
    let service = service_with(&chain, &encoder);
    let mut tx = Transaction::new().with_action(transfer("tokenx"));

    let err = service.encode_actions(&mut tx).await.unwrap_err();

    assert_eq!(err, PreparationError::MissingInterface(name("tokenx")));
    assert!(tx.actions[0].encoded_payload().is_none());
    assert_eq!(encoder.calls(), 0);
}

#[tokio::test]
async fn test_partial_progress_survives_and_resumes() {
    let chain = Arc::new(
        MockChainProvider::new("chain1", 100)
            .with_block(97, 555)
            .with_abi(name("a"), TOKEN_ABI)
            .with_abi(name("b"), TOKEN_ABI),
    );
    let failing = Arc::new(MockActionEncoder::new().failing_for(name("b")));
    let mut tx = Transaction::new()
        .with_action(transfer("a"))
        .with_action(transfer("b"));

    let err = service_with(&chain, &failing)
        .prepare(&mut tx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PreparationError::Collaborator(ProviderError::Encode(_))
    ));
    assert!(tx.actions[0].is_encoded());
    assert!(!tx.actions[1].is_encoded());
    let first_payload = tx.actions[0].encoded_payload().map(<[u8]>::to_vec);

    let working = Arc::new(MockActionEncoder::new());
    service_with(&chain, &working)
        .prepare(&mut tx)
        .await
        .unwrap();

    assert_eq!(working.calls(), 1);
    assert_eq!(tx.actions[0].encoded_payload().map(<[u8]>::to_vec), first_payload);
    assert!(tx.actions[1].is_encoded());
    assert_eq!(chain.info_calls(), 1);
    assert_eq!(chain.abi_calls(), 2);
}

// =============================================================================
// ENVELOPE
// =============================================================================

#[tokio::test]
async fn test_full_pipeline_scenario() {
    let chain = Arc::new(
        MockChainProvider::new("chain1", 100)
            .with_block(97, 555)
            .with_abi(name("tokenx"), TOKEN_ABI),
    );
    let encoder = Arc::new(MockActionEncoder::new());
    let service = service_with(&chain, &encoder);
    let mut tx = service.new_transaction().with_action(transfer("tokenx"));

    let envelope = service.prepare_submission_envelope(&mut tx).await.unwrap();

    assert_eq!(tx.chain_id, "chain1");
    assert_eq!(tx.ref_block_num, 97);
    assert_eq!(tx.ref_block_prefix, 555);
    assert!(tx.expiration > chrono::Utc::now());
    assert!(tx.actions[0].is_encoded());

    assert!(!envelope.packed_trx.is_empty());
    assert!(envelope.signatures.is_empty());
    assert_eq!(envelope.compression, 0);

    let packed = envelope.packed_bytes().unwrap();
    assert_eq!(
        u32::from_le_bytes(packed[0..4].try_into().unwrap()),
        tx.expiration.timestamp() as u32
    );
    assert_eq!(u16::from_le_bytes([packed[4], packed[5]]), 97);
    assert_eq!(u32::from_le_bytes(packed[6..10].try_into().unwrap()), 555);
    assert_eq!(envelope.transaction_id().unwrap().len(), 64);
}

#[tokio::test]
async fn test_second_prepare_makes_no_calls() {
    let chain = Arc::new(
        MockChainProvider::new("chain1", 100)
            .with_block(97, 555)
            .with_abi(name("tokenx"), TOKEN_ABI),
    );
    let encoder = Arc::new(MockActionEncoder::new());
    let service = service_with(&chain, &encoder);
    let mut tx = service.new_transaction().with_action(transfer("tokenx"));

    let first = service.prepare_submission_envelope(&mut tx).await.unwrap();
    let expiration = tx.expiration;
    let second = service.prepare_submission_envelope(&mut tx).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(tx.expiration, expiration);
    assert_eq!(chain.info_calls(), 1);
    assert_eq!(chain.block_calls(), 1);
    assert_eq!(chain.abi_calls(), 1);
    assert_eq!(encoder.calls(), 1);
}

#[tokio::test]
async fn test_envelope_before_preparation_is_incomplete() {
    let service = TransactionPreparer::new(PreparationConfig::for_testing());
    let tx = Transaction::new().with_action(transfer("tokenx"));

    let err = service.to_submission_envelope(&tx).unwrap_err();
    assert_eq!(
        err,
        PreparationError::IncompleteTransaction {
            field: "ref_block_num".to_string()
        }
    );
}

#[tokio::test]
async fn test_prepare_and_sign() {
    let chain = Arc::new(
        MockChainProvider::new(HEX_CHAIN_ID, 100)
            .with_block(97, 555)
            .with_abi(name("tokenx"), TOKEN_ABI),
    );
    let service = service_with(&chain, &Arc::new(MockActionEncoder::new()))
        .with_signer(Arc::new(MockSigner::new(vec![
            "PUB_K1_alice".to_string(),
            "PUB_K1_bob".to_string(),
        ])));
    let mut tx = service.new_transaction().with_action(transfer("tokenx"));

    let mut envelope = service.prepare_submission_envelope(&mut tx).await.unwrap();
    service
        .sign_envelope(&tx, &mut envelope, &["PUB_K1_bob".to_string()])
        .await
        .unwrap();

    assert_eq!(envelope.signatures.len(), 1);
    assert!(envelope.signatures[0].ends_with("PUB_K1_bob"));
}
