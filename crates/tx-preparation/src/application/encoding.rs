//! # Action Encoding
//!
//! Turns each pending action's parameters into its encoded payload using
//! the interfaces already cached on the transaction. Never fetches.

use tracing::debug;

use crate::domain::{PreparationError, Transaction};
use crate::ports::{ActionEncoder, EncodeRequest};

/// Encodes every action that has no payload yet.
pub struct ActionEncoding<'a> {
    encoder: Option<&'a dyn ActionEncoder>,
}

impl<'a> ActionEncoding<'a> {
    /// Stage backed by `encoder`, if any.
    pub fn new(encoder: Option<&'a dyn ActionEncoder>) -> Self {
        Self { encoder }
    }

    /// Encode pending actions, context-free ones first.
    ///
    /// Stops at the first failure. Payloads stored before it are kept.
    #[tracing::instrument(skip_all)]
    pub async fn encode_pending(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        let Transaction {
            context_free_actions,
            actions,
            interface_cache,
            ..
        } = tx;

        for action in context_free_actions
            .iter_mut()
            .chain(actions.iter_mut())
            .filter(|a| !a.is_encoded())
        {
            let interface = interface_cache
                .lookup(&action.account)
                .map_err(|_| PreparationError::MissingInterface(action.account.clone()))?;

            let encoder = self.encoder.ok_or_else(|| {
                PreparationError::Configuration(
                    "an action encoder is required to encode action data".to_string(),
                )
            })?;

            let payload = encoder
                .encode_action(EncodeRequest {
                    account: &action.account,
                    intent: &action.name,
                    parameters: &action.data,
                    interface,
                })
                .await?;

            debug!(
                "[txp] Encoded {}::{} ({} bytes)",
                action.account,
                action.name,
                payload.len()
            );
            action.store_encoded_payload(payload);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, ContractName, ProviderError};
    use crate::ports::MockActionEncoder;
    use serde_json::json;

    const ABI: &str = r#"{"version": "eosio::abi/1.1", "actions": [{"name": "transfer", "type": "transfer"}]}"#;

    fn name(s: &str) -> ContractName {
        ContractName::new(s).unwrap()
    }

    fn action(account: &str) -> Action {
        Action::new(name(account), name("transfer"), vec![], json!({"qty": 1}))
    }

    #[tokio::test]
    async fn test_missing_interface_leaves_payload_unset() {
        let encoder = MockActionEncoder::new();
        let mut tx = Transaction::new().with_action(action("a"));

        let err = ActionEncoding::new(Some(&encoder))
            .encode_pending(&mut tx)
            .await
            .unwrap_err();

        assert_eq!(err, PreparationError::MissingInterface(name("a")));
        assert!(!tx.actions[0].is_encoded());
        assert_eq!(encoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_encodes_context_free_and_regular_actions() {
        let encoder = MockActionEncoder::new();
        let mut tx = Transaction::new().with_action(action("a"));
        tx.context_free_actions.push(action("a"));
        tx.interface_cache_mut().insert(name("a"), ABI.as_bytes()).unwrap();

        ActionEncoding::new(Some(&encoder))
            .encode_pending(&mut tx)
            .await
            .unwrap();

        assert!(tx.all_actions().all(|a| a.is_encoded()));
        assert_eq!(encoder.calls(), 2);
    }

    #[tokio::test]
    async fn test_already_encoded_actions_are_skipped() {
        let encoder = MockActionEncoder::new();
        let mut tx = Transaction::new().with_action(action("a").with_encoded_payload(vec![1]));

        ActionEncoding::new(Some(&encoder))
            .encode_pending(&mut tx)
            .await
            .unwrap();

        assert_eq!(encoder.calls(), 0);
        assert_eq!(tx.actions[0].encoded_payload(), Some(&[1u8][..]));
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_payloads() {
        let encoder = MockActionEncoder::new().failing_for(name("b"));
        let mut tx = Transaction::new()
            .with_action(action("a"))
            .with_action(action("b"));
        tx.interface_cache_mut().insert(name("a"), ABI.as_bytes()).unwrap();
        tx.interface_cache_mut().insert(name("b"), ABI.as_bytes()).unwrap();

        let err = ActionEncoding::new(Some(&encoder))
            .encode_pending(&mut tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PreparationError::Collaborator(ProviderError::Encode(_))
        ));
        assert!(tx.actions[0].is_encoded());
        assert!(!tx.actions[1].is_encoded());
    }

    #[tokio::test]
    async fn test_missing_encoder() {
        let mut tx = Transaction::new().with_action(action("a"));
        tx.interface_cache_mut().insert(name("a"), ABI.as_bytes()).unwrap();

        let err = ActionEncoding::new(None)
            .encode_pending(&mut tx)
            .await
            .unwrap_err();
        assert!(matches!(err, PreparationError::Configuration(_)));
    }
}
