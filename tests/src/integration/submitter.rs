//! # Header Submission Tests
//!
//! The chain assembles blocks, the submitter anchors interval blocks on the
//! root ledger, and deposit numbering follows the anchored head. Deposits
//! numbered under a local interval block that is not anchored yet are still
//! credited.

#[cfg(test)]
mod tests {
    use super::super::common::*;
    use pc_03_block_storage::BlockStore;
    use pc_04_root_anchor::{RootAnchor, SubmitterConfig};
    use shared_types::{TxType, UtxoPosition, NATIVE_TOKEN, U256};
    use std::time::Duration;
    use tokio::sync::watch;

    fn fast_config() -> SubmitterConfig {
        SubmitterConfig {
            block_interval: INTERVAL,
            poll_interval: Duration::from_millis(20),
            base_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(40),
        }
    }

    async fn wait_for_header(h: &ChainHarness, number: u64) -> bool {
        for _ in 0..200 {
            if h.anchor.submitted_root(number).is_some() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_tick_anchors_interval_blocks_only() {
        let h = ChainHarness::new().await;
        h.deposit(alice().address(), 10).await;
        h.transfer(&alice(), bob().address(), 4).await.unwrap();
        let block = h.chain.generate_next_block().await.unwrap().unwrap();

        let submitter = h.submitter(fast_config());
        let report = submitter.tick().await.unwrap();
        assert_eq!(report.anchor_block, INTERVAL);
        assert_eq!(report.submitted, vec![INTERVAL]);
        assert_eq!(h.anchor.submitted_root(INTERVAL), block.merkle_root());
        assert_eq!(h.anchor.submitted_root(1), None);
        assert_eq!(
            h.anchor.current_child_block().await.unwrap(),
            2 * INTERVAL
        );

        assert!(submitter.tick().await.unwrap().is_idle());
    }

    #[tokio::test]
    async fn test_deposits_after_header_follow_new_head() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();
        h.submitter(fast_config()).tick().await.unwrap();

        assert_eq!(h.deposit(b, 7).await, INTERVAL + 1);
        let deposit_block = h.store.block(INTERVAL + 1).await.unwrap().unwrap();
        assert_eq!(deposit_block.types, vec![TxType::Deposit, TxType::Merge]);
        assert_eq!(h.chain.next_block_number().await.unwrap(), 2 * INTERVAL);

        // The next interval block links onto the deposit block.
        h.transfer(&alice(), b, 1).await.unwrap();
        let next = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(next.number(), 2 * INTERVAL);
        assert_eq!(next.previous_hash(), deposit_block.hash());
    }

    #[tokio::test]
    async fn test_deposit_under_unanchored_block_is_credited() {
        let h = ChainHarness::new().await;
        let (a, b, c) = (alice().address(), bob().address(), carol().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        let interval_block = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(interval_block.number(), INTERVAL);

        // The root ledger has not seen block INTERVAL, so the deposit is numbered 2.
        assert_eq!(h.deposit(c, 7).await, 2);
        let late = h.store.block(2).await.unwrap().unwrap();
        assert_eq!(late.previous_hash(), interval_block.hash());
        assert_eq!(
            h.chain.utxo_by_address(&c, &NATIVE_TOKEN).await.map(|key| key.position),
            Some(UtxoPosition::new(2, 0, 0))
        );
        assert_eq!(h.chain.next_block_number().await.unwrap(), 2 * INTERVAL);

        for _ in 0..3 {
            assert!(h.chain.generate_next_block().await.unwrap().is_none());
        }
        let numbers: Vec<u64> = h
            .store
            .blocks()
            .await
            .unwrap()
            .iter()
            .map(|block| block.number())
            .collect();
        assert_eq!(numbers, vec![0, 1, INTERVAL, 2]);

        let report = h.submitter(fast_config()).tick().await.unwrap();
        assert_eq!(report.submitted, vec![INTERVAL]);

        // Carol spends the deposit and the next interval block follows it.
        h.transfer(&carol(), a, 2).await.unwrap();
        let next = h.chain.generate_next_block().await.unwrap().unwrap();
        assert_eq!(next.number(), 2 * INTERVAL);
        assert_eq!(next.previous_hash(), late.hash());
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(17));
    }

    #[tokio::test]
    async fn test_deposit_seen_after_header_is_still_credited() {
        let h = ChainHarness::new().await;
        let c = carol().address();
        h.deposit(alice().address(), 10).await;
        h.transfer(&alice(), bob().address(), 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();

        // Locked before the header lands, collected only after it.
        let early = h.anchor.deposit(c, U256::from(7), NATIVE_TOKEN);
        assert_eq!(early, 2);
        h.submitter(fast_config()).tick().await.unwrap();
        assert_eq!(h.anchor.current_child_block().await.unwrap(), 2 * INTERVAL);

        assert!(h.chain.generate_next_block().await.unwrap().is_none());
        assert!(h.store.block_exists(2).await.unwrap());
        assert_eq!(
            h.chain.utxo_by_address(&c, &NATIVE_TOKEN).await.map(|key| key.position),
            Some(UtxoPosition::new(2, 0, 0))
        );

        // A later deposit is numbered above the anchored block and merges.
        assert_eq!(h.deposit(c, 1).await, INTERVAL + 1);
        assert_eq!(
            h.chain.utxo_by_address(&c, &NATIVE_TOKEN).await.map(|key| key.position),
            Some(UtxoPosition::new(INTERVAL + 1, 1, 0))
        );
        assert_eq!(total_value(&h.chain.utxos().await), U256::from(18));
    }

    #[tokio::test]
    async fn test_loop_anchors_blocks_as_they_are_assembled() {
        let h = ChainHarness::new().await;
        let submitter = h.submitter(SubmitterConfig {
            poll_interval: Duration::from_secs(3600),
            ..fast_config()
        });
        let chain = {
            let store = std::sync::Arc::clone(&h.store);
            let anchor = std::sync::Arc::clone(&h.anchor);
            let chain = pc_05_chain_state::UtxoPlasmaChain::new(
                pc_05_chain_state::ChainConfig {
                    block_interval: INTERVAL,
                },
                operator(),
                store,
                anchor,
            )
            .unwrap()
            .with_block_notifier(submitter.notifier());
            chain.replay().await.unwrap();
            chain
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = std::sync::Arc::clone(&submitter).spawn(shutdown_rx);

        h.anchor
            .deposit(alice().address(), U256::from(10), NATIVE_TOKEN);
        chain.generate_next_block().await.unwrap();
        chain
            .create_transaction(
                NATIVE_TOKEN,
                alice().address(),
                bob().address(),
                U256::from(3),
                None,
                &alice(),
            )
            .await
            .unwrap();
        chain.generate_next_block().await.unwrap().unwrap();

        assert!(wait_for_header(&h, INTERVAL).await);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_loop_retries_through_outage() {
        let h = ChainHarness::new().await;
        h.deposit(alice().address(), 10).await;
        h.transfer(&alice(), bob().address(), 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();

        h.anchor.fail_next(3);
        let submitter = h.submitter(fast_config());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = std::sync::Arc::clone(&submitter).spawn(shutdown_rx);

        assert!(wait_for_header(&h, INTERVAL).await);
        assert_eq!(h.anchor.submitted_headers().len(), 1);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_unanchored_blocks_are_submitted_in_order() {
        let h = ChainHarness::new().await;
        let (a, b) = (alice().address(), bob().address());
        h.deposit(a, 10).await;
        h.transfer(&alice(), b, 4).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();
        h.transfer(&alice(), b, 1).await.unwrap();
        h.chain.generate_next_block().await.unwrap().unwrap();
        assert!(h.store.block_exists(2 * INTERVAL).await.unwrap());

        let report = h.submitter(fast_config()).tick().await.unwrap();
        assert_eq!(report.submitted, vec![INTERVAL, 2 * INTERVAL]);
        let headers: Vec<u64> = h
            .anchor
            .submitted_headers()
            .into_iter()
            .map(|(number, _)| number)
            .collect();
        assert_eq!(headers, vec![INTERVAL, 2 * INTERVAL]);
    }
}
