//! # UTXO Plasma Chain Service
//!
//! [`UtxoPlasmaChain`] wires the pure transition rules to storage and the
//! root anchor. It owns the live UTXO set and the pending pool behind one
//! `tokio::sync::Mutex`.
//!
//! ## Block assembly
//!
//! ```text
//! deposits since the floor ──────────► one block per deposit (deposit + merge)
//!                                           │
//! exits since (next - interval) ──────► WITHDRAW slots ─┐
//! pending pool (FIFO) ────────────────► NORMAL + MERGE ─┴─► block `next`
//! ```
//!
//! Every block is built against a [`UtxoDelta`]. When the block cannot be
//! appended the delta is reverted and drained pool entries go back to the
//! front of the queue.
//!
//! ## Deposits
//!
//! A deposit is credited once its block is in storage, and only then. Each
//! round re-reads every deposit at or above the deposit floor and skips those
//! whose block exists. The floor moves up to `current_child_block - interval`
//! only after a round in which every deposit it covered was committed. A
//! deposit numbered below an interval block that is not yet anchored is
//! appended after it, linked by hash.

use crate::config::ChainConfig;
use crate::domain::rules::{self, can_create, can_spend, is_valid_transaction, UtxoDelta};
use crate::domain::utxo_set::UtxoSet;
use crate::error::{ChainError, Result};
use crate::next_block_number;
use pc_01_merkle::MerkleProof;
use pc_02_ledger::{
    Block, ConfirmationSignature, LedgerError, Transaction, TxOutput, Utxo, UtxoKey,
};
use pc_03_block_storage::BlockStore;
use pc_04_root_anchor::{DepositEvent, ExitStartedEvent, RootAnchor};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{hex_util, Address, Hash, Signature, TxType, BLOCK_CAPACITY, U256};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

/// Hash, root and slot signatures of a stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHashRoot {
    /// `keccak(body)`, what the input owners signed.
    pub tx_hash: Hash,
    pub root: Hash,
    pub sig1: Option<Signature>,
    pub sig2: Option<Signature>,
}

/// Inclusion proof of a stored transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionProof {
    pub root: Hash,
    /// Wire bytes of the slot (`body || sig1 || sig2`).
    pub transaction: Vec<u8>,
    pub proof: MerkleProof,
}

/// Outcome of [`UtxoPlasmaChain::replay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub blocks: usize,
    pub transactions: usize,
    pub live_utxos: usize,
    pub head: u64,
}

struct ChainState {
    utxos: UtxoSet,
    pool: VecDeque<Transaction>,
    /// Deposits below this block number are all committed.
    deposit_floor: u64,
}

/// Slots collected for the next interval block.
#[derive(Default)]
struct PendingBlock {
    transactions: Vec<Transaction>,
    delta: UtxoDelta,
    /// Pool entries taken for this block, oldest first.
    drained: Vec<Transaction>,
}

impl PendingBlock {
    fn is_full(&self) -> bool {
        self.transactions.len() >= BLOCK_CAPACITY
    }

    fn next_index(&self) -> u32 {
        self.transactions.len() as u32
    }

    /// Undo the UTXO changes and requeue drained pool entries in order.
    fn abandon(self, state: &mut ChainState) {
        self.delta.revert(&mut state.utxos);
        for tx in self.drained.into_iter().rev() {
            state.pool.push_front(tx);
        }
    }
}

/// The child chain.
pub struct UtxoPlasmaChain {
    config: ChainConfig,
    operator: Secp256k1KeyPair,
    store: Arc<dyn BlockStore>,
    anchor: Arc<dyn RootAnchor>,
    state: Mutex<ChainState>,
    block_notifier: Option<Arc<Notify>>,
}

impl UtxoPlasmaChain {
    /// Create a chain with an empty UTXO set. Call [`UtxoPlasmaChain::replay`]
    /// before serving.
    pub fn new(
        config: ChainConfig,
        operator: Secp256k1KeyPair,
        store: Arc<dyn BlockStore>,
        anchor: Arc<dyn RootAnchor>,
    ) -> Result<Self> {
        if config.block_interval == 0 {
            return Err(ChainError::InvalidConfig(
                "block_interval must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            config,
            operator,
            store,
            anchor,
            state: Mutex::new(ChainState {
                utxos: UtxoSet::new(),
                pool: VecDeque::new(),
                deposit_floor: 0,
            }),
            block_notifier: None,
        })
    }

    /// Signal `notify` whenever an interval block is committed.
    pub fn with_block_notifier(mut self, notify: Arc<Notify>) -> Self {
        self.block_notifier = Some(notify);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn operator_address(&self) -> Address {
        self.operator.address()
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    /// Rebuild the UTXO set from every persisted block.
    ///
    /// Connects storage (inserting genesis on first start), clears the pool,
    /// applies every slot in chain order and re-asserts the resulting UTXO
    /// records. Running it twice gives the same set.
    pub async fn replay(&self) -> Result<ReplaySummary> {
        let mut state = self.state.lock().await;
        self.store.connect().await?;

        let blocks = self.store.blocks().await?;
        let mut utxos = UtxoSet::new();
        let mut delta = UtxoDelta::new();
        let mut transactions = 0usize;
        let mut head = 0u64;

        for block in &blocks {
            head = block.number();
            for (index, tx) in block.decoded_transactions()?.iter().enumerate() {
                rules::apply_transaction(&mut utxos, block.number(), index as u32, tx, &mut delta);
                transactions += 1;
            }
        }

        self.store
            .apply_utxo_changes(&delta.created(), &delta.spent_keys())
            .await?;

        let summary = ReplaySummary {
            blocks: blocks.len(),
            transactions,
            live_utxos: utxos.len(),
            head,
        };
        state.utxos = utxos;
        state.pool.clear();
        state.deposit_floor = 0;

        info!(
            "[pc-05] 🔁 Replayed {} blocks ({} transactions), head {}, {} live UTXOs",
            summary.blocks, summary.transactions, summary.head, summary.live_utxos
        );
        Ok(summary)
    }

    // =========================================================================
    // BLOCK ASSEMBLY
    // =========================================================================

    /// Number the next interval block will carry.
    pub async fn next_block_number(&self) -> Result<u64> {
        let top = self.store.highest_block_number().await?;
        Ok(next_block_number(top, self.config.block_interval))
    }

    /// Commit pending deposits as their own blocks, then build the next
    /// interval block from exits and the pool.
    ///
    /// Returns `None` when there was nothing for the interval block. Deposit
    /// blocks may still have been committed. Anchor failures are logged and
    /// read as "no events". A deposit whose block could not be committed is
    /// offered again on the next call.
    pub async fn generate_next_block(&self) -> Result<Option<Block>> {
        let mut state = self.state.lock().await;
        let interval = self.config.block_interval;

        let mut previous_hash = self.store.latest_block().await?.hash();
        let mut top = self.store.highest_block_number().await?;
        let since = next_block_number(top, interval) - interval;

        if let Some(block) = self.commit_deposits(&mut state, previous_hash).await? {
            previous_hash = block.hash();
            top = top.max(block.number());
        }

        let exits = match self.anchor.exit_started_events(since).await {
            Ok(exits) => exits,
            Err(e) => {
                warn!("[pc-05] Exit query since {} failed: {}", since, e);
                Vec::new()
            }
        };

        let block_number = next_block_number(top, interval);
        let mut pending = PendingBlock::default();
        if let Err(e) = self.collect_transactions(&mut state, block_number, &exits, &mut pending) {
            pending.abandon(&mut state);
            return Err(e);
        }
        if pending.transactions.is_empty() {
            return Ok(None);
        }

        let block = match self
            .seal_and_commit(block_number, previous_hash, &pending.transactions, &pending.delta)
            .await
        {
            Ok(block) => block,
            Err(e) => {
                error!("[pc-05] Block {} abandoned: {}", block_number, e);
                pending.abandon(&mut state);
                return Err(e);
            }
        };

        info!(
            "[pc-05] 📦 Block {} committed with {} transactions ({} pending)",
            block_number,
            block.len(),
            state.pool.len()
        );
        if let Some(notify) = &self.block_notifier {
            notify.notify_one();
        }

        let operator_slots: Vec<usize> = block
            .types
            .iter()
            .enumerate()
            .filter(|(_, tx_type)| tx_type.is_operator_synthesized())
            .map(|(index, _)| index)
            .collect();
        self.auto_confirm(&block, &operator_slots).await;

        Ok(Some(block))
    }

    /// Commit a block for every deposit at or above the floor that has none.
    /// Returns the last block committed.
    async fn commit_deposits(
        &self,
        state: &mut ChainState,
        mut previous_hash: Hash,
    ) -> Result<Option<Block>> {
        // Read before querying, so a deposit numbered under it is in the query.
        let anchored_floor = match self.anchor.current_child_block().await {
            Ok(current) => Some(current.saturating_sub(self.config.block_interval)),
            Err(e) => {
                warn!("[pc-05] Child block query failed: {}", e);
                None
            }
        };
        let since = state.deposit_floor;
        let deposits = match self.anchor.deposit_events(since).await {
            Ok(deposits) => deposits,
            Err(e) => {
                warn!("[pc-05] Deposit query since {} failed: {}", since, e);
                return Ok(None);
            }
        };

        let mut settled = true;
        let mut last = None;
        for deposit in &deposits {
            if self.store.block_exists(deposit.deposit_block).await? {
                continue;
            }
            match self.commit_deposit_block(state, deposit, previous_hash).await {
                Ok(Some(block)) => {
                    previous_hash = block.hash();
                    last = Some(block);
                }
                Ok(None) => {}
                Err(e) => {
                    settled = false;
                    warn!(
                        "[pc-05] Deposit block {} not committed, retrying next round: {}",
                        deposit.deposit_block, e
                    );
                }
            }
        }

        if let Some(floor) = anchored_floor.filter(|floor| settled && *floor > state.deposit_floor) {
            debug!("[pc-05] Deposit floor {} -> {}", state.deposit_floor, floor);
            state.deposit_floor = floor;
        }
        Ok(last)
    }

    async fn commit_deposit_block(
        &self,
        state: &mut ChainState,
        deposit: &DepositEvent,
        previous_hash: Hash,
    ) -> Result<Option<Block>> {
        let block_number = deposit.deposit_block;
        let mut deposit_tx = Transaction::deposit(deposit.depositor, deposit.amount, deposit.token);
        if !can_create(&deposit_tx) {
            info!("[pc-05] Empty deposit at {} ignored", block_number);
            return Ok(None);
        }
        deposit_tx.sign(&self.operator)?;

        let mut delta = UtxoDelta::new();
        rules::create(&mut state.utxos, block_number, 0, &deposit_tx, &mut delta);
        let mut transactions = vec![deposit_tx];

        match self.signed_merge(&state.utxos, &deposit.depositor, &deposit.token) {
            Ok(Some(merge)) => {
                rules::spend(&mut state.utxos, &merge, &mut delta);
                rules::create(&mut state.utxos, block_number, 1, &merge, &mut delta);
                transactions.push(merge);
            }
            Ok(None) => {}
            Err(e) => {
                delta.revert(&mut state.utxos);
                return Err(e);
            }
        }

        let block = match self
            .seal_and_commit(block_number, previous_hash, &transactions, &delta)
            .await
        {
            Ok(block) => block,
            Err(e) => {
                delta.revert(&mut state.utxos);
                return Err(e);
            }
        };

        info!(
            "[pc-05] 💰 Deposit block {} committed: {} to {}",
            block_number,
            deposit.amount,
            hex_util::to_hex(&deposit.depositor)
        );
        let slots: Vec<usize> = (0..block.len()).collect();
        self.auto_confirm(&block, &slots).await;
        Ok(Some(block))
    }

    /// Withdrawals first, then the pool, stopping at block capacity.
    fn collect_transactions(
        &self,
        state: &mut ChainState,
        block_number: u64,
        exits: &[ExitStartedEvent],
        pending: &mut PendingBlock,
    ) -> Result<()> {
        for exit in exits {
            let mut withdraw = Transaction::withdraw(exit.utxo_pos, exit.token);
            if !can_spend(&state.utxos, &withdraw) {
                continue;
            }
            if pending.is_full() {
                warn!(
                    "[pc-05] Block {} full, withdrawal of {} dropped this round",
                    block_number, exit.utxo_pos
                );
                continue;
            }
            withdraw.sign(&self.operator)?;
            rules::spend(&mut state.utxos, &withdraw, &mut pending.delta);
            pending.transactions.push(withdraw);
        }

        while !pending.is_full() {
            let Some(tx) = state.pool.pop_front() else {
                break;
            };
            // Spent at admission. Included even without a creatable output so
            // replay sees the spend.
            rules::create(
                &mut state.utxos,
                block_number,
                pending.next_index(),
                &tx,
                &mut pending.delta,
            );
            let owners: Vec<Address> = tx.present_outputs().map(|(_, out)| out.owner).collect();
            let token = tx.token;
            pending.transactions.push(tx.clone());
            pending.drained.push(tx);

            for owner in owners {
                if pending.is_full() {
                    break;
                }
                if let Some(merge) = self.signed_merge(&state.utxos, &owner, &token)? {
                    rules::spend(&mut state.utxos, &merge, &mut pending.delta);
                    rules::create(
                        &mut state.utxos,
                        block_number,
                        pending.next_index(),
                        &merge,
                        &mut pending.delta,
                    );
                    pending.transactions.push(merge);
                }
            }
        }
        Ok(())
    }

    /// Operator-signed merge of `owner`'s two oldest UTXOs, if it may apply.
    fn signed_merge(
        &self,
        utxos: &UtxoSet,
        owner: &Address,
        token: &Address,
    ) -> Result<Option<Transaction>> {
        let Some(mut merge) = rules::merge_transaction(utxos, owner, token) else {
            return Ok(None);
        };
        if !(can_spend(utxos, &merge) && can_create(&merge)) {
            return Ok(None);
        }
        merge.sign(&self.operator)?;
        Ok(Some(merge))
    }

    async fn seal_and_commit(
        &self,
        block_number: u64,
        previous_hash: Hash,
        transactions: &[Transaction],
        delta: &UtxoDelta,
    ) -> Result<Block> {
        let mut block = Block::new(block_number, previous_hash, transactions)?;
        block.sign(&self.operator)?;
        self.store.append_block(&block).await?;

        // The block is durable at this point. Replay re-asserts UTXO records,
        // so a failed write here is repaired on the next start.
        if let Err(e) = self
            .store
            .apply_utxo_changes(&delta.created(), &delta.spent_keys())
            .await
        {
            error!(
                "[pc-05] UTXO records for block {} not persisted: {}",
                block_number, e
            );
        }
        Ok(block)
    }

    /// Store an operator confirmation for each slot in `slots`.
    async fn auto_confirm(&self, block: &Block, slots: &[usize]) {
        for &index in slots {
            let confirmation = match self.confirm_slot(block, index, &self.operator) {
                Ok(confirmation) => confirmation,
                Err(e) => {
                    warn!(
                        "[pc-05] Operator confirmation of {}:{} failed: {}",
                        block.number(),
                        index,
                        e
                    );
                    continue;
                }
            };
            if let Err(e) = self
                .store
                .set_confirm_signature(block.number(), index, confirmation)
                .await
            {
                warn!(
                    "[pc-05] Confirmation of {}:{} not stored: {}",
                    block.number(),
                    index,
                    e
                );
            }
        }
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// Admit a signed NORMAL transaction into the pool.
    ///
    /// Checks run in a fixed order and the first failure is returned with
    /// nothing changed:
    ///
    /// 1. input 1 is present
    /// 2. input 1's block is below the next block number
    /// 3. that block and slot exist
    /// 4. the confirmation (`confirmation`, else the stored one) validates
    /// 5. signatures, conservation and liveness of every input
    ///
    /// On success the inputs are spent in storage, then the confirmation is
    /// stored, then the inputs are spent in memory and the transaction is
    /// queued. A failed confirmation write marks the inputs unspent again.
    pub async fn submit_transaction(
        &self,
        tx: Transaction,
        confirmation: Option<ConfirmationSignature>,
    ) -> Result<Transaction> {
        let mut state = self.state.lock().await;

        if tx.tx_type != TxType::Normal {
            return Err(ChainError::InvalidTransaction(format!(
                "{} transactions are built by the operator",
                tx.tx_type
            )));
        }
        let input = tx.inputs[0].ok_or(ChainError::MissingInput)?;

        let next_block = self.next_block_number().await?;
        if input.blk_num >= next_block {
            return Err(ChainError::BlockNotYetIncluded {
                input_block: input.blk_num,
                next_block,
            });
        }

        let block = self.load_block(input.blk_num).await?;
        let index = input.tx_index as usize;
        let hash_root = Self::hash_root_of(&block, index)?;
        let confirmation = confirmation
            .or_else(|| block.confirmation(index))
            .ok_or(ChainError::InvalidConfirmationSignature)?;
        if !self.confirmation_matches(&hash_root, &confirmation) {
            return Err(ChainError::InvalidConfirmationSignature);
        }

        if !(is_valid_transaction(&state.utxos, &tx) && can_spend(&state.utxos, &tx)) {
            debug!("[pc-05] Rejected transaction {}", hex_util::to_hex(&tx.hash()));
            return Err(ChainError::InvalidTransaction(
                "inputs not spendable or not balanced".to_string(),
            ));
        }

        let consumed: Vec<Utxo> = tx
            .present_inputs()
            .filter_map(|(_, position)| state.utxos.get(&UtxoKey::new(position, tx.token)).copied())
            .collect();
        let spent: Vec<UtxoKey> = consumed.iter().map(Utxo::key).collect();
        self.store.apply_utxo_changes(&[], &spent).await?;
        if let Err(e) = self
            .store
            .set_confirm_signature(input.blk_num, index, confirmation)
            .await
        {
            if let Err(restore) = self.store.apply_utxo_changes(&consumed, &[]).await {
                error!(
                    "[pc-05] Inputs of {} left spent in storage: {}",
                    hex_util::to_hex(&tx.hash()),
                    restore
                );
            }
            return Err(e.into());
        }

        let mut delta = UtxoDelta::new();
        rules::spend(&mut state.utxos, &tx, &mut delta);
        state.pool.push_back(tx.clone());

        info!(
            "[pc-05] ✅ Accepted {} ({} pending)",
            hex_util::to_hex(&tx.hash()),
            state.pool.len()
        );
        Ok(tx)
    }

    /// Build, sign and submit a transfer of `amount` from the first UTXO of
    /// `from`. Change goes back to `from`. The fee is zero.
    ///
    /// Without a supplied or stored confirmation for the input's slot, one is
    /// generated with `key`.
    pub async fn create_transaction(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
        confirmation: Option<ConfirmationSignature>,
        key: &Secp256k1KeyPair,
    ) -> Result<Transaction> {
        let (mut tx, confirmation) = self
            .build_transfer(token, from, to, amount, confirmation, Some(key))
            .await?;
        tx.sign(key)?;
        self.submit_transaction(tx, Some(confirmation)).await
    }

    /// Same as [`UtxoPlasmaChain::create_transaction`] without signing or
    /// submitting, for external wallets. A valid confirmation is stored.
    pub async fn create_unsigned_transaction(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
        confirmation: Option<ConfirmationSignature>,
    ) -> Result<Transaction> {
        let (tx, confirmation) = self
            .build_transfer(token, from, to, amount, confirmation, None)
            .await?;
        if let Some(input) = tx.inputs[0] {
            self.store
                .set_confirm_signature(input.blk_num, input.tx_index as usize, confirmation)
                .await?;
        }
        Ok(tx)
    }

    async fn build_transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
        confirmation: Option<ConfirmationSignature>,
        key: Option<&Secp256k1KeyPair>,
    ) -> Result<(Transaction, ConfirmationSignature)> {
        let utxo = {
            let state = self.state.lock().await;
            state
                .utxos
                .first_of(&from, &token)
                .and_then(|key| state.utxos.get(&key).copied())
                .ok_or(ChainError::NoAssetFound)?
        };
        let position = utxo.position;

        let block = self.load_block(position.blk_num).await?;
        let index = position.tx_index as usize;
        let hash_root = Self::hash_root_of(&block, index)?;
        let confirmation = match confirmation.or_else(|| block.confirmation(index)) {
            Some(confirmation) => confirmation,
            None => match key {
                Some(key) => self.confirm_slot(&block, index, key)?,
                None => return Err(ChainError::InvalidConfirmationSignature),
            },
        };
        if !self.confirmation_matches(&hash_root, &confirmation) {
            return Err(ChainError::InvalidConfirmationSignature);
        }

        if utxo.amount < amount {
            return Err(ChainError::InsufficientFunds {
                available: utxo.amount,
                requested: amount,
            });
        }
        let remain = utxo.amount - amount;
        let change = (!remain.is_zero()).then(|| TxOutput::new(from, remain));

        let tx = Transaction::normal(
            [Some(position), None],
            [Some(TxOutput::new(to, amount)), change],
            U256::zero(),
            token,
        );
        Ok((tx, confirmation))
    }

    // =========================================================================
    // CONFIRMATIONS AND PROOFS
    // =========================================================================

    /// Sign a confirmation for slot `tx_index` of block `block_number` with
    /// `key`. Both halves carry the same signature.
    ///
    /// # Errors
    ///
    /// `ChainError::InvalidConfirmationSignature` when `key` did not sign the slot.
    pub async fn generate_confirm_sig(
        &self,
        block_number: u64,
        tx_index: usize,
        key: &Secp256k1KeyPair,
    ) -> Result<ConfirmationSignature> {
        let block = self.load_block(block_number).await?;
        self.confirm_slot(&block, tx_index, key)
    }

    fn confirm_slot(
        &self,
        block: &Block,
        index: usize,
        key: &Secp256k1KeyPair,
    ) -> Result<ConfirmationSignature> {
        let hash_root = Self::hash_root_of(block, index)?;
        let signature = self.anchor.confirm_sig(&hash_root.tx_hash, &hash_root.root, key)?;
        let confirmation = ConfirmationSignature::new(signature, hash_root.sig2.map(|_| signature));
        if !self.confirmation_matches(&hash_root, &confirmation) {
            return Err(ChainError::InvalidConfirmationSignature);
        }
        Ok(confirmation)
    }

    fn confirmation_matches(
        &self,
        hash_root: &TxHashRoot,
        confirmation: &ConfirmationSignature,
    ) -> bool {
        match &hash_root.sig1 {
            Some(sig1) => self.anchor.is_valid_confirm_sig(
                &hash_root.tx_hash,
                &hash_root.root,
                sig1,
                hash_root.sig2.as_ref(),
                confirmation,
            ),
            None => false,
        }
    }

    pub async fn tx_hash_root(&self, block_number: u64, tx_index: usize) -> Result<TxHashRoot> {
        let block = self.load_block(block_number).await?;
        Self::hash_root_of(&block, tx_index)
    }

    fn hash_root_of(block: &Block, index: usize) -> Result<TxHashRoot> {
        if index >= block.len() {
            return Err(ChainError::SlotNotFound {
                block_number: block.number(),
                tx_index: index,
            });
        }
        let root = block
            .merkle_root()
            .ok_or(LedgerError::MissingRoot(block.number()))?;
        let [sig1, sig2] = block.slot_signatures(index)?;
        Ok(TxHashRoot {
            tx_hash: block.tx_hash(index)?,
            root,
            sig1,
            sig2,
        })
    }

    /// Root, wire bytes and merkle proof of a stored slot.
    pub async fn transaction_proof(
        &self,
        block_number: u64,
        tx_index: usize,
    ) -> Result<TransactionProof> {
        let block = self.load_block(block_number).await?;
        let hash_root = Self::hash_root_of(&block, tx_index)?;
        Ok(TransactionProof {
            root: hash_root.root,
            transaction: block.transactions[tx_index].clone(),
            proof: block.proof(tx_index)?,
        })
    }

    async fn load_block(&self, block_number: u64) -> Result<Block> {
        self.store
            .block(block_number)
            .await?
            .ok_or(ChainError::BlockNotFound(block_number))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Oldest live UTXO of `owner` for `token`.
    pub async fn utxo_by_address(&self, owner: &Address, token: &Address) -> Option<UtxoKey> {
        self.state.lock().await.utxos.first_of(owner, token)
    }

    /// Two oldest live UTXOs of `owner` for `token`.
    pub async fn two_utxos_by_address(
        &self,
        owner: &Address,
        token: &Address,
    ) -> Option<(UtxoKey, UtxoKey)> {
        self.state.lock().await.utxos.first_two_of(owner, token)
    }

    pub async fn utxos(&self) -> Vec<Utxo> {
        self.state.lock().await.utxos.iter().copied().collect()
    }

    /// Admitted transactions not yet in a block, oldest first.
    pub async fn pending_transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.pool.iter().cloned().collect()
    }
}
