//! # Chain Scenarios
//!
//! End-to-end flows over the in-memory backends:
//!
//! 1. **Deposit**: a root-ledger deposit becomes its own block and UTXO
//! 2. **Merge**: a second deposit to the same owner is merged in that block
//! 3. **Transfer**: a spend is pooled, then lands in the next interval block
//! 4. **Confirmation**: spending a received output needs the sender's confirmation
//! 5. **Exit**: an exited UTXO is withdrawn by the operator
//! 6. **Capacity**: the pool spills into the next block past 256 slots

#[cfg(test)]
mod tests {
    use super::super::common::*;
    use pc_02_ledger::{sign_confirmation, ConfirmationSignature, Transaction, TxOutput, Utxo};
    use pc_03_block_storage::BlockStore;
    use pc_05_chain_state::ChainError;
    use shared_types::{TxType, UtxoPosition, BLOCK_CAPACITY, NATIVE_TOKEN, U256};

    // =============================================================================
    // DEPOSITS AND MERGES
    // =============================================================================

    #[tokio::test]
    async fn test_deposit_then_merge_then_transfer() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());

        assert_eq!(h.deposit(a, 3).await, 1);
        assert_eq!(h.deposit(a, 4).await, 2);

        let merged = h.store.block(2).await.unwrap().unwrap();
        assert_eq!(merged.types, vec![TxType::Deposit, TxType::Merge]);
        assert_eq!(
            h.chain.utxos().await,
            vec![Utxo::new(UtxoPosition::new(2, 1, 0), a, U256::from(7), NATIVE_TOKEN)]
        );

        h.transfer(&alice(), b, 5).await.unwrap();
        let block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(block.number(), INTERVAL);
        assert_eq!(block.previous_hash(), merged.hash());

        let utxos = h.chain.utxos().await;
        assert_eq!(total_value(&utxos), U256::from(7));
        assert!(utxos.contains(&Utxo::new(
            UtxoPosition::new(INTERVAL, 0, 0),
            b,
            U256::from(5),
            NATIVE_TOKEN
        )));
        assert!(utxos.contains(&Utxo::new(
            UtxoPosition::new(INTERVAL, 0, 1),
            a,
            U256::from(2),
            NATIVE_TOKEN
        )));
    }

    #[tokio::test]
    async fn test_deposits_of_different_owners_do_not_merge() {
        let h = ChainHarness::new().await;
        h.deposit(alice().address(), 3).await;
        h.deposit(bob().address(), 4).await;

        let second = h.store.block(2).await.unwrap().unwrap();
        assert_eq!(second.types, vec![TxType::Deposit]);
        assert_eq!(h.chain.utxos().await.len(), 2);
        assert!(h
            .chain
            .two_utxos_by_address(&alice().address(), &NATIVE_TOKEN)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_received_output_merges_with_existing_one() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;
        h.deposit(b, 1).await;

        h.transfer(&alice(), b, 4).await.unwrap();
        let block = h.chain.generate_next_block().await.unwrap().unwrap();

        // Bob now holds {2,0,0} and {INTERVAL,0,0}; the merge follows the transfer.
        assert_eq!(block.types, vec![TxType::Normal, TxType::Merge]);
        assert!(block.confirmation(1).is_some());
        assert_eq!(block.confirmation(0), None);
        assert_eq!(
            h.chain.utxo_by_address(&b, &NATIVE_TOKEN).await.map(|key| key.position),
            Some(UtxoPosition::new(INTERVAL, 1, 0))
        );
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(11));
    }

    // =============================================================================
    // CONFIRMATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_recipient_spends_with_sender_confirmation() {
        let h = ChainHarness::new().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 6).await.unwrap();
        h.chain.generate_next_block().await.unwrap();

        // Only the slot signer can confirm it.
        let denied = h.transfer(&bob(), c, 6).await.unwrap_err();
        assert!(matches!(denied, ChainError::InvalidConfirmationSignature));

        let confirmation = h
            .chain
            .generate_confirm_sig(INTERVAL, 0, &alice())
            .await
            .unwrap();
        h.chain
            .create_transaction(
                NATIVE_TOKEN,
                b,
                c,
                U256::from(6),
                Some(confirmation),
                &bob(),
            )
            .await
            .unwrap();

        let stored = h.store.block(INTERVAL).await.unwrap().unwrap();
        assert_eq!(stored.confirmation(0), Some(confirmation));

        let block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(block.number(), 2 * INTERVAL);
        assert_eq!(
            h.chain.utxo_by_address(&c, &NATIVE_TOKEN).await.map(|key| key.position),
            Some(UtxoPosition::new(2 * INTERVAL, 0, 0))
        );
    }

    #[tokio::test]
    async fn test_two_input_spend_needs_both_confirmations() {
        let h = ChainHarness::new().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        h.deposit(a, 10).await;
        h.deposit(b, 5).await;

        let mut joint = Transaction::normal(
            [
                Some(UtxoPosition::new(1, 0, 0)),
                Some(UtxoPosition::new(2, 0, 0)),
            ],
            [Some(TxOutput::new(c, U256::from(15))), None],
            U256::zero(),
            NATIVE_TOKEN,
        );
        let hash = joint.hash();
        let sig1 = alice().sign_message(&hash).unwrap();
        let sig2 = bob().sign_message(&hash).unwrap();
        joint.set_signature(Some(sig1), Some(sig2));
        h.chain.submit_transaction(joint, None).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();

        let hash_root = h.chain.tx_hash_root(INTERVAL, 0).await.unwrap();
        assert_eq!(hash_root.sig1, Some(sig1));
        assert_eq!(hash_root.sig2, Some(sig2));

        let first = sign_confirmation(&hash_root.tx_hash, &hash_root.root, &alice()).unwrap();
        let second = sign_confirmation(&hash_root.tx_hash, &hash_root.root, &bob()).unwrap();

        let half = ConfirmationSignature::new(first, None);
        let err = h
            .chain
            .create_transaction(NATIVE_TOKEN, c, a, U256::from(1), Some(half), &carol())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidConfirmationSignature));

        let swapped = ConfirmationSignature::new(second, Some(first));
        assert!(h
            .chain
            .create_transaction(NATIVE_TOKEN, c, a, U256::from(1), Some(swapped), &carol())
            .await
            .is_err());

        let both = ConfirmationSignature::new(first, Some(second));
        h.chain
            .create_transaction(NATIVE_TOKEN, c, a, U256::from(1), Some(both), &carol())
            .await
            .unwrap();
        assert_eq!(h.chain.pending_transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unconfirmed_slots_listed_for_input_owner() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 1).await.unwrap();
        h.chain.generate_next_block().await.unwrap();

        let pending = h.store.unconfirmed_transactions(&a).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].block_number, INTERVAL);
        assert_eq!(pending[0].tx_index, 0);
        assert_eq!(pending[0].owned_inputs, vec![0]);
        assert!(h.store.unconfirmed_transactions(&b).await.unwrap().is_empty());

        let confirmation = h
            .chain
            .generate_confirm_sig(INTERVAL, 0, &alice())
            .await
            .unwrap();
        h.store
            .set_confirm_signature(INTERVAL, 0, confirmation)
            .await
            .unwrap();
        assert!(h.store.unconfirmed_transactions(&a).await.unwrap().is_empty());
    }

    // =============================================================================
    // EXITS
    // =============================================================================

    #[tokio::test]
    async fn test_exited_utxo_is_withdrawn() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;
        h.deposit(b, 3).await;

        h.anchor.start_exit(UtxoPosition::new(1, 0, 0), NATIVE_TOKEN);
        let block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(block.types, vec![TxType::Withdraw]);
        assert!(block.confirmation(0).is_some());

        assert!(h.chain.utxo_by_address(&a, &NATIVE_TOKEN).await.is_none());
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(3));

        // An exit the chain already processed yields nothing further.
        assert!(h.chain.generate_next_block().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exit_of_unknown_utxo_is_ignored() {
        let h = ChainHarness::new().await;
        h.deposit(alice().address(), 10).await;
        h.anchor.start_exit(UtxoPosition::new(7, 0, 0), NATIVE_TOKEN);
        assert!(h.chain.generate_next_block().await.unwrap().is_none());
        assert_eq!(h.chain.utxos().await.len(), 1);
    }

    // =============================================================================
    // CAPACITY
    // =============================================================================

    #[tokio::test]
    async fn test_pool_spills_into_next_block() {
        let h = ChainHarness::new().await;
        let senders: Vec<_> = (100..100 + BLOCK_CAPACITY as u16 + 2).map(key).collect();
        for sender in &senders {
            h.anchor
                .deposit(sender.address(), U256::from(1), NATIVE_TOKEN);
        }
        assert!(h.chain.generate_next_block().await.unwrap().is_none());
        assert_eq!(h.chain.utxos().await.len(), senders.len());

        // Each sender pays itself so no merges are generated.
        for sender in &senders {
            h.transfer(sender, sender.address(), 1).await.unwrap();
        }

        let first = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(first.number(), INTERVAL);
        assert_eq!(first.len(), BLOCK_CAPACITY);
        assert_eq!(h.chain.pending_transactions().await.len(), 2);

        let second = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(second.number(), 2 * INTERVAL);
        assert_eq!(second.len(), 2);
        assert!(h.chain.pending_transactions().await.is_empty());
        assert_eq!(h.chain.utxos().await.len(), senders.len());
    }

    // =============================================================================
    // PROOFS
    // =============================================================================

    #[tokio::test]
    async fn test_every_slot_proves_against_its_root() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;
        h.deposit(b, 1).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        let block = h.chain.generate_next_block().await.unwrap().unwrap();

        for index in 0..block.len() {
            let proof = h
                .chain
                .transaction_proof(block.number(), index)
                .await
                .unwrap();
            let tx = block.transaction(index).unwrap();
            assert_eq!(proof.transaction, tx.wire_data());
            assert!(proof.proof.verify_preimage(&tx.merkle_leaf(), &proof.root));
        }

        let past_end = h.chain.transaction_proof(block.number(), block.len()).await;
        assert!(matches!(past_end, Err(ChainError::SlotNotFound { .. })));
    }
}
