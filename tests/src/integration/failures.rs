//! # Failure Tests
//!
//! Storage refusing appends and the root ledger going away must leave the
//! UTXO set and the pending pool exactly as they were before the attempt.
//! Once the fault clears, the next round picks up where the failed one left.

#[cfg(test)]
mod tests {
    use super::super::common::*;
    use pc_02_ledger::UtxoKey;
    use pc_03_block_storage::BlockStore;
    use pc_04_root_anchor::{RootAnchor, SubmitterConfig};
    use pc_05_chain_state::ChainError;
    use shared_types::{UtxoPosition, NATIVE_TOKEN, U256};
    use std::sync::Arc;

    async fn flaky_harness() -> ChainHarness<FlakyStore> {
        ChainHarness::over(Arc::new(FlakyStore::new())).await
    }

    // =============================================================================
    // STORAGE
    // =============================================================================

    #[tokio::test]
    async fn test_refused_append_restores_pool_and_set() {
        let h = flaky_harness().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        h.deposit(a, 10).await;
        h.deposit(b, 5).await;
        let first = h.transfer(&alice(), c, 4).await.unwrap();
        let second = h.transfer(&bob(), c, 5).await.unwrap();

        let utxos_before = h.chain.utxos().await;
        h.store.fail_appends(true);
        let err = h.chain.generate_next_block().await.unwrap_err();
        assert!(matches!(err, ChainError::Storage(_)));

        assert_eq!(h.chain.utxos().await, utxos_before);
        assert_eq!(
            h.chain.pending_transactions().await,
            vec![first.clone(), second.clone()]
        );
        assert!(!h.store.block_exists(INTERVAL).await.unwrap());

        h.store.fail_appends(false);
        let block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(block.number(), INTERVAL);
        let included = block.decoded_transactions().unwrap();
        assert_eq!(included[0].hash(), first.hash());
        assert_eq!(included[1].hash(), second.hash());
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(15));
    }

    #[tokio::test]
    async fn test_refused_deposit_block_is_retried() {
        let h = flaky_harness().await;
        h.store.fail_appends(true);
        h.anchor
            .deposit(alice().address(), U256::from(10), NATIVE_TOKEN);
        assert!(h.chain.generate_next_block().await.unwrap().is_none());

        assert!(h.chain.utxos().await.is_empty());
        assert!(!h.store.block_exists(1).await.unwrap());
        let key = UtxoKey::new(UtxoPosition::new(1, 0, 0), NATIVE_TOKEN);
        assert!(h.store.utxo(&key).await.unwrap().is_none());

        h.store.fail_appends(false);
        for _ in 0..3 {
            assert!(h.chain.generate_next_block().await.unwrap().is_none());
        }
        assert!(h.store.block_exists(1).await.unwrap());
        assert_eq!(
            h.chain.utxo_by_address(&alice().address(), &NATIVE_TOKEN).await,
            Some(key)
        );
        assert!(!h.store.utxo(&key).await.unwrap().unwrap().spent);
        assert_eq!(h.store.blocks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refused_deposit_survives_anchored_interval_block() {
        let h = flaky_harness().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        let submitter = h.submitter(SubmitterConfig {
            block_interval: INTERVAL,
            ..Default::default()
        });
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();
        submitter.tick().await.unwrap();

        h.store.refuse_block(Some(INTERVAL + 1));
        assert_eq!(h.anchor.deposit(b, U256::from(5), NATIVE_TOKEN), INTERVAL + 1);
        h.transfer(&alice(), c, 1).await.unwrap();
        let interval_block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(interval_block.number(), 2 * INTERVAL);
        assert!(!h.store.block_exists(INTERVAL + 1).await.unwrap());

        // The root ledger moves past the block the deposit was numbered under.
        assert_eq!(submitter.tick().await.unwrap().submitted, vec![2 * INTERVAL]);
        assert_eq!(h.anchor.current_child_block().await.unwrap(), 3 * INTERVAL);

        h.store.refuse_block(None);
        assert!(h.chain.generate_next_block().await.unwrap().is_none());
        let deposit_block = h.store.block(INTERVAL + 1).await.unwrap().unwrap();
        assert_eq!(deposit_block.previous_hash(), interval_block.hash());
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(15));
        assert_eq!(h.chain.next_block_number().await.unwrap(), 3 * INTERVAL);
    }

    #[tokio::test]
    async fn test_failed_spend_write_stores_no_confirmation() {
        let h = flaky_harness().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();
        let confirmation = h
            .chain
            .generate_confirm_sig(INTERVAL, 0, &alice())
            .await
            .unwrap();

        h.store.fail_utxo_writes(true);
        let err = h
            .chain
            .create_transaction(NATIVE_TOKEN, b, c, U256::from(4), Some(confirmation), &bob())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Storage(_)));

        let stored = h.store.block(INTERVAL).await.unwrap().unwrap();
        assert_eq!(stored.confirmation(0), None);
        assert!(h.chain.pending_transactions().await.is_empty());
        let bobs = UtxoKey::new(UtxoPosition::new(INTERVAL, 0, 0), NATIVE_TOKEN);
        assert_eq!(h.chain.utxo_by_address(&b, &NATIVE_TOKEN).await, Some(bobs));
        assert!(!h.store.utxo(&bobs).await.unwrap().unwrap().spent);
    }

    #[tokio::test]
    async fn test_failed_confirmation_write_unspends_inputs() {
        let h = flaky_harness().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();
        let confirmation = h
            .chain
            .generate_confirm_sig(INTERVAL, 0, &alice())
            .await
            .unwrap();

        h.store.fail_confirmations(true);
        let err = h
            .chain
            .create_transaction(NATIVE_TOKEN, b, c, U256::from(4), Some(confirmation), &bob())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Storage(_)));

        let bobs = UtxoKey::new(UtxoPosition::new(INTERVAL, 0, 0), NATIVE_TOKEN);
        assert!(!h.store.utxo(&bobs).await.unwrap().unwrap().spent);
        assert!(h.chain.pending_transactions().await.is_empty());

        h.store.fail_confirmations(false);
        h.chain
            .create_transaction(NATIVE_TOKEN, b, c, U256::from(4), Some(confirmation), &bob())
            .await
            .unwrap();
        assert!(h.store.utxo(&bobs).await.unwrap().unwrap().spent);
        let stored = h.store.block(INTERVAL).await.unwrap().unwrap();
        assert_eq!(stored.confirmation(0), Some(confirmation));
    }

    #[tokio::test]
    async fn test_rejected_submission_changes_nothing() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;

        let overdraw = h.transfer(&alice(), b, 11).await.unwrap_err();
        assert!(matches!(overdraw, ChainError::InsufficientFunds { .. }));
        let nothing = h.transfer(&bob(), a, 1).await.unwrap_err();
        assert!(matches!(nothing, ChainError::NoAssetFound));

        assert!(h.chain.pending_transactions().await.is_empty());
        let key = UtxoKey::new(UtxoPosition::new(1, 0, 0), NATIVE_TOKEN);
        assert_eq!(h.chain.utxo_by_address(&a, &NATIVE_TOKEN).await, Some(key));
        assert!(!h.store.utxo(&key).await.unwrap().unwrap().spent);
    }

    // =============================================================================
    // ROOT LEDGER
    // =============================================================================

    #[tokio::test]
    async fn test_anchor_outage_defers_deposits() {
        let h = ChainHarness::new().await;
        h.anchor
            .deposit(alice().address(), U256::from(10), NATIVE_TOKEN);

        // Child block and deposit queries both fail.
        h.anchor.fail_next(2);
        assert!(h.chain.generate_next_block().await.unwrap().is_none());
        assert!(!h.store.block_exists(1).await.unwrap());

        h.chain.generate_next_block().await.unwrap();
        assert!(h.store.block_exists(1).await.unwrap());
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(10));
    }

    #[tokio::test]
    async fn test_anchor_outage_does_not_block_pool() {
        let h = ChainHarness::new().await;
        h.deposit(alice().address(), 10).await;
        h.transfer(&alice(), bob().address(), 4).await.unwrap();

        h.anchor.fail_next(3);
        let block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(block.number(), INTERVAL);
        assert!(h.chain.pending_transactions().await.is_empty());
    }
}
