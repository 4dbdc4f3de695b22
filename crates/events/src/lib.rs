//! Domain events: facts emitted by the ledger when an operation applies.

pub mod event;

pub use event::Event;
