//! # Replay Tests
//!
//! Restarting the operator must rebuild exactly the UTXO set it had, from the
//! persisted blocks alone. Covers the file backend across a real reopen and a
//! randomized run checked for conservation.

#[cfg(test)]
mod tests {
    use super::super::common::*;
    use pc_02_ledger::UtxoKey;
    use pc_03_block_storage::{
        BlockStore, FileBackedKVStore, FileBlockStore, InMemoryKVStore, KvBlockStore,
    };
    use pc_04_root_anchor::InMemoryRootAnchor;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{UtxoPosition, NATIVE_TOKEN, U256};
    use std::path::Path;
    use std::sync::Arc;

    fn open_file_store(dir: &Path) -> Arc<FileBlockStore> {
        Arc::new(KvBlockStore::new(FileBackedKVStore::open(dir).unwrap()))
    }

    /// Every input owner signs the confirmations still missing for their slots.
    async fn confirm_all<S: BlockStore + 'static>(h: &ChainHarness<S>, keys: &[Secp256k1KeyPair]) {
        for key in keys {
            let pending = h.store.unconfirmed_transactions(&key.address()).await.unwrap();
            for entry in pending {
                let confirmation = h
                    .chain
                    .generate_confirm_sig(entry.block_number, entry.tx_index, key)
                    .await
                    .unwrap();
                h.store
                    .set_confirm_signature(entry.block_number, entry.tx_index, confirmation)
                    .await
                    .unwrap();
            }
        }
    }

    // =============================================================================
    // RESTART
    // =============================================================================

    #[tokio::test]
    async fn test_file_backed_chain_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let anchor = Arc::new(InMemoryRootAnchor::new(INTERVAL));
        let (a, b) = (alice().address(), bob().address());

        let (live, head_hash) = {
            let h = ChainHarness::with_anchor(open_file_store(dir.path()), Arc::clone(&anchor)).await;
            h.deposit(a, 10).await;
            h.deposit(b, 2).await;
            h.transfer(&alice(), b, 3).await.unwrap();
            h.chain.generate_next_block().await.unwrap().unwrap();
            let head = h.store.latest_block().await.unwrap();
            (h.chain.utxos().await, head.hash())
        };

        let h = ChainHarness::with_anchor(open_file_store(dir.path()), anchor).await;
        assert_eq!(h.chain.utxos().await, live);
        assert_eq!(h.store.latest_block().await.unwrap().hash(), head_hash);
        assert_eq!(h.chain.next_block_number().await.unwrap(), 2 * INTERVAL);
        assert_eq!(total_value(&live), U256::from(12));

        // The reopened chain keeps building on the same head. Bob's UTXO came
        // from an operator merge, so its confirmation is already stored.
        h.transfer(&bob(), a, 1).await.unwrap();
        let block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(block.number(), 2 * INTERVAL);
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(12));
    }

    #[tokio::test]
    async fn test_second_open_of_same_directory_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let _held = open_file_store(dir.path());
        assert!(FileBackedKVStore::open(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_pooled_transaction_does_not_survive_restart() {
        let store = Arc::new(KvBlockStore::new(InMemoryKVStore::new()));
        let h = ChainHarness::over(Arc::clone(&store)).await;
        let a = alice().address();
        h.deposit(a, 10).await;
        h.transfer(&alice(), bob().address(), 4).await.unwrap();

        let funding = UtxoKey::new(UtxoPosition::new(1, 0, 0), NATIVE_TOKEN);
        assert!(store.utxo(&funding).await.unwrap().unwrap().spent);

        let restarted = ChainHarness::with_anchor(store, Arc::clone(&h.anchor)).await;
        assert!(restarted.chain.pending_transactions().await.is_empty());
        assert_eq!(
            restarted.chain.utxo_by_address(&a, &NATIVE_TOKEN).await,
            Some(funding)
        );
        assert!(!restarted.store.utxo(&funding).await.unwrap().unwrap().spent);
    }

    // =============================================================================
    // DETERMINISM
    // =============================================================================

    #[tokio::test]
    async fn test_random_transfers_conserve_value_and_replay_identically() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let h = ChainHarness::new().await;
        let keys: Vec<Secp256k1KeyPair> = (10..16).map(key).collect();

        let mut deposited = 0u64;
        for key in &keys {
            let amount = rng.gen_range(1..=50u64);
            h.anchor
                .deposit(key.address(), U256::from(amount), NATIVE_TOKEN);
            deposited += amount;
        }
        h.chain.generate_next_block().await.unwrap();

        for _ in 0..5 {
            for (index, sender) in keys.iter().enumerate() {
                if !rng.gen_bool(0.6) {
                    continue;
                }
                let Some(first) = h
                    .chain
                    .utxo_by_address(&sender.address(), &NATIVE_TOKEN)
                    .await
                else {
                    continue;
                };
                let balance = h
                    .chain
                    .utxos()
                    .await
                    .into_iter()
                    .find(|utxo| utxo.key() == first)
                    .map(|utxo| utxo.amount.as_u64())
                    .unwrap();
                let mut to = rng.gen_range(0..keys.len());
                if to == index {
                    to = (to + 1) % keys.len();
                }
                let amount = rng.gen_range(1..=balance);
                h.transfer(sender, keys[to].address(), amount).await.unwrap();
            }
            h.chain.generate_next_block().await.unwrap();
            confirm_all(&h, &keys).await;

            assert_eq!(total_value(&h.chain.utxos().await), U256::from(deposited));
        }

        let live = h.chain.utxos().await;
        let replayed = ChainHarness::with_anchor(Arc::clone(&h.store), Arc::clone(&h.anchor)).await;
        assert_eq!(replayed.chain.utxos().await, live);

        for utxo in &live {
            let record = h.store.utxo(&utxo.key()).await.unwrap().unwrap();
            assert!(!record.spent);
            assert_eq!(record.utxo, *utxo);
        }
    }
}
