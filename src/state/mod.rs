//! Per-URL download state tracking
//!
//! This module defines the state machine a URL moves through during a batch
//! run. Every URL resolves to exactly one terminal state before the next
//! URL is processed.

mod url_state;

pub use url_state::UrlState;
