//! Match history: partnership read model and the append-only store boundary
//!
//! `PartnershipHistoryIndex` derives a co-membership penalty table from past
//! completed matches. `HistoryStore` is the external collaborator that owns
//! the durable log of outcomes and rating states; the in-memory
//! implementation here covers the core's contract and tests.

pub mod index;
pub mod store;

// Re-export commonly used types
pub use index::PartnershipHistoryIndex;
pub use store::{HistoryStore, InMemoryHistoryStore, StateEntry};
