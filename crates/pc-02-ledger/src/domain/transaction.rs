//! # Transaction
//!
//! Two optional inputs, two optional outputs, a fee and a token. Each input
//! slot has an optional signature. Operator-built DEPOSIT transactions carry
//! a signature in slot 1 even though they have no inputs.

use super::codec::{
    decode_optional_address, decode_scalar, decode_u256, open_list, split_wire, BODY_FIELD_COUNT,
};
use super::errors::{LedgerError, Result};
use rlp::RlpStream;
use shared_crypto::{keccak256, recover_message, Secp256k1KeyPair};
use shared_types::{
    Address, Hash, Signature, TxType, UtxoPosition, NATIVE_TOKEN, SIGNATURE_LENGTH, U256,
    ZERO_ADDRESS,
};

/// A transaction output: new owner and amount in the smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutput {
    pub owner: Address,
    pub amount: U256,
}

impl TxOutput {
    pub fn new(owner: Address, amount: U256) -> Self {
        Self { owner, amount }
    }

    /// True when this output would create a UTXO: non-zero owner and amount.
    pub fn is_creatable(&self) -> bool {
        self.owner != ZERO_ADDRESS && !self.amount.is_zero()
    }
}

/// A child-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub tx_type: TxType,
    /// Consumed outputs, by position.
    pub inputs: [Option<UtxoPosition>; 2],
    /// Per-slot signatures over [`Transaction::hash`].
    pub signatures: [Option<Signature>; 2],
    pub outputs: [Option<TxOutput>; 2],
    pub fee: U256,
    pub token: Address,
    /// Creation time in milliseconds. Not part of any byte form.
    pub timestamp: u64,
}

impl Transaction {
    /// Unsigned transaction from its parts.
    pub fn new(
        tx_type: TxType,
        inputs: [Option<UtxoPosition>; 2],
        outputs: [Option<TxOutput>; 2],
        fee: U256,
        token: Address,
    ) -> Self {
        Self {
            tx_type,
            inputs,
            signatures: [None, None],
            outputs,
            fee,
            token,
            timestamp: crate::now_millis(),
        }
    }

    /// Credit of a root-ledger deposit.
    pub fn deposit(owner: Address, amount: U256, token: Address) -> Self {
        Self::new(
            TxType::Deposit,
            [None, None],
            [Some(TxOutput::new(owner, amount)), None],
            U256::zero(),
            token,
        )
    }

    /// Removal of an exited output.
    pub fn withdraw(position: UtxoPosition, token: Address) -> Self {
        Self::new(
            TxType::Withdraw,
            [Some(position), None],
            [None, None],
            U256::zero(),
            token,
        )
    }

    /// Combination of two same-owner outputs into one.
    pub fn merge(
        first: UtxoPosition,
        second: UtxoPosition,
        owner: Address,
        amount: U256,
        token: Address,
    ) -> Self {
        Self::new(
            TxType::Merge,
            [Some(first), Some(second)],
            [Some(TxOutput::new(owner, amount)), None],
            U256::zero(),
            token,
        )
    }

    /// User transfer.
    pub fn normal(
        inputs: [Option<UtxoPosition>; 2],
        outputs: [Option<TxOutput>; 2],
        fee: U256,
        token: Address,
    ) -> Self {
        Self::new(TxType::Normal, inputs, outputs, fee, token)
    }

    /// Set slot signatures. Slot 2 is only filled when input 2 exists, and
    /// falls back to `sig1` when `sig2` is not given.
    pub fn set_signature(&mut self, sig1: Option<Signature>, sig2: Option<Signature>) {
        self.signatures[0] = sig1;
        if self.inputs[1].is_some() {
            self.signatures[1] = sig2.or(sig1);
        }
    }

    /// Personal-sign the hash with `key` and set it on every slot.
    pub fn sign(&mut self, key: &Secp256k1KeyPair) -> Result<Signature> {
        let sig = key.sign_message(&self.hash())?;
        self.set_signature(Some(sig), None);
        Ok(sig)
    }

    /// Canonical RLP encoding, optionally followed by both signatures.
    pub fn encode(&self, include_signatures: bool) -> Vec<u8> {
        let field_count = if include_signatures {
            BODY_FIELD_COUNT + 2
        } else {
            BODY_FIELD_COUNT
        };
        let mut stream = RlpStream::new_list(field_count);

        for input in &self.inputs {
            let pos = input.unwrap_or(UtxoPosition::new(0, 0, 0));
            stream.append(&pos.blk_num);
            stream.append(&pos.tx_index);
            stream.append(&pos.o_index);
        }
        for output in &self.outputs {
            match output {
                Some(out) => {
                    stream.append(&out.owner.to_vec());
                    stream.append(&out.amount);
                }
                None => {
                    stream.append_empty_data();
                    stream.append(&U256::zero());
                }
            }
        }
        stream.append(&self.fee);
        stream.append(&self.token.to_vec());

        if include_signatures {
            for sig in &self.signatures {
                stream.append(&sig.unwrap_or(Signature::ZERO).as_bytes().to_vec());
            }
        }
        stream.out().to_vec()
    }

    /// `keccak(encode(false))`. The message every input owner signs.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode(false))
    }

    fn signature_bytes(&self) -> [u8; 2 * SIGNATURE_LENGTH] {
        let mut out = [0u8; 2 * SIGNATURE_LENGTH];
        for (slot, sig) in self.signatures.iter().enumerate() {
            if let Some(sig) = sig {
                out[slot * SIGNATURE_LENGTH..(slot + 1) * SIGNATURE_LENGTH]
                    .copy_from_slice(sig.as_bytes());
            }
        }
        out
    }

    /// `body || sig1 || sig2`.
    pub fn wire_data(&self) -> Vec<u8> {
        let mut out = self.encode(false);
        out.extend_from_slice(&self.signature_bytes());
        out
    }

    /// `keccak(wire_data)`. Identifies a slot in storage.
    pub fn wire_hash(&self) -> Hash {
        keccak256(&self.wire_data())
    }

    /// `hash || sig1 || sig2`, the merkle leaf preimage.
    pub fn merkle_leaf(&self) -> Vec<u8> {
        let mut out = self.hash().to_vec();
        out.extend_from_slice(&self.signature_bytes());
        out
    }

    /// Decode a wire blob. The type tag is carried beside the blob, not in it.
    pub fn decode(wire: &[u8], tx_type: TxType) -> Result<Self> {
        let parts = split_wire(wire)?;
        let rlp = open_list(parts.body, BODY_FIELD_COUNT)?;

        let mut inputs = [None, None];
        for (slot, input) in inputs.iter_mut().enumerate() {
            let base = slot * 3;
            let blk_num: u64 = decode_scalar(&rlp, base)?;
            let tx_index: u32 = decode_scalar(&rlp, base + 1)?;
            let o_index: u8 = decode_scalar(&rlp, base + 2)?;
            if blk_num != 0 {
                *input = Some(UtxoPosition::new(blk_num, tx_index, o_index));
            }
        }

        let mut outputs = [None, None];
        for (slot, output) in outputs.iter_mut().enumerate() {
            let base = 6 + slot * 2;
            let owner = decode_optional_address(&rlp, base)?;
            let amount = decode_u256(&rlp, base + 1)?;
            *output = match owner {
                Some(owner) => Some(TxOutput::new(owner, amount)),
                None if amount.is_zero() => None,
                None => return Err(LedgerError::OwnerlessOutput(slot)),
            };
        }

        let fee = decode_u256(&rlp, 10)?;
        let token = decode_optional_address(&rlp, 11)?.unwrap_or(NATIVE_TOKEN);

        Ok(Self {
            tx_type,
            inputs,
            signatures: [parts.sig1.non_zero(), parts.sig2.non_zero()],
            outputs,
            fee,
            token,
            timestamp: 0,
        })
    }

    /// Present inputs with their slot index.
    pub fn present_inputs(&self) -> impl Iterator<Item = (usize, UtxoPosition)> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .filter_map(|(slot, input)| input.map(|pos| (slot, pos)))
    }

    /// Present outputs with their output index.
    pub fn present_outputs(&self) -> impl Iterator<Item = (usize, TxOutput)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .filter_map(|(slot, output)| output.map(|out| (slot, out)))
    }

    /// `denom1 + denom2 + fee`, or `None` on overflow.
    pub fn total_out(&self) -> Option<U256> {
        self.present_outputs()
            .try_fold(self.fee, |acc, (_, out)| acc.checked_add(out.amount))
    }

    /// Address that produced the signature in `slot`, if there is one.
    pub fn signer(&self, slot: usize) -> Result<Option<Address>> {
        match self.signatures.get(slot).copied().flatten() {
            Some(sig) => Ok(Some(recover_message(&self.hash(), &sig)?)),
            None => Ok(None),
        }
    }
}
