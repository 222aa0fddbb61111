//! Ports layer.

mod anchor;

pub use anchor::RootAnchor;
