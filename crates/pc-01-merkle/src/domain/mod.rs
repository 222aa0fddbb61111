//! Pure merkle logic: tree construction, proofs and their byte form.

pub mod errors;
pub mod proof;
pub mod tree;
