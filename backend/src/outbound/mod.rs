//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **record_store**: Firebase Realtime Database over REST, plus an
//!   in-process store seeded from a JSON snapshot
//! - **generation**: chat-completions client for generative answers
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod generation;
pub mod record_store;
