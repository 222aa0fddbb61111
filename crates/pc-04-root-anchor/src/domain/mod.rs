//! Domain layer: events, errors and submission bookkeeping.

pub mod backoff;
pub mod errors;
pub mod events;
pub mod report;
