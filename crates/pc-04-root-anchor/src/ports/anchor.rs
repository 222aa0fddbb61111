//! The root-ledger port.

use crate::domain::errors::AnchorError;
use crate::domain::events::{DepositEvent, ExitStartedEvent};
use async_trait::async_trait;
use pc_02_ledger::{confirmation_hash, is_valid_confirm_sig, ConfirmationSignature};
use shared_crypto::{recover_message, Secp256k1KeyPair};
use shared_types::{Address, Hash, Signature};

/// The root ledger as seen by the operator.
///
/// Event queries and header submission are implementation specific. The
/// signing helpers default to the personal-message scheme the root ledger
/// verifies with `ecrecover`.
#[async_trait]
pub trait RootAnchor: Send + Sync {
    /// Every deposit with `deposit_block >= since_block`, ascending.
    ///
    /// Repeated queries return the same deposits. The caller skips those
    /// whose block it has already committed.
    async fn deposit_events(&self, since_block: u64) -> Result<Vec<DepositEvent>, AnchorError>;

    /// Exits started while the root ledger head was at or above `since_block`.
    async fn exit_started_events(
        &self,
        since_block: u64,
    ) -> Result<Vec<ExitStartedEvent>, AnchorError>;

    /// Block number the root ledger expects the next header for.
    async fn current_child_block(&self) -> Result<u64, AnchorError>;

    /// Submit the root of block `block_number`.
    ///
    /// # Errors
    ///
    /// `AnchorError::OutOfSync` when `block_number` is not the current child block.
    async fn submit_block_header(&self, block_number: u64, root: Hash) -> Result<(), AnchorError>;

    fn sign_message(&self, message: &[u8], key: &Secp256k1KeyPair) -> Result<Signature, AnchorError> {
        Ok(key.sign_message(message)?)
    }

    fn recover_signer(&self, message: &[u8], signature: &Signature) -> Result<Address, AnchorError> {
        Ok(recover_message(message, signature)?)
    }

    /// Personal-sign `keccak(tx_hash || root)`.
    fn confirm_sig(
        &self,
        tx_hash: &Hash,
        root: &Hash,
        key: &Secp256k1KeyPair,
    ) -> Result<Signature, AnchorError> {
        self.sign_message(&confirmation_hash(tx_hash, root), key)
    }

    fn is_valid_confirm_sig(
        &self,
        tx_hash: &Hash,
        root: &Hash,
        sig1: &Signature,
        sig2: Option<&Signature>,
        confirmation: &ConfirmationSignature,
    ) -> bool {
        is_valid_confirm_sig(tx_hash, root, sig1, sig2, confirmation)
    }
}
