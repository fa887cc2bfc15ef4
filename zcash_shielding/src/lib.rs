//! *A crate for coordinating the shielding of transparent Zcash funds.*
//!
//! `zcash_shielding` contains the state machine a light wallet uses to decide when
//! shielding of its transparent balance is offered to the user, and to drive the
//! propose, create and submit sequence that moves those funds into a shielded pool.
//!
//! Wallet synchronization, transaction proposal and transaction submission are owned by
//! the wallet SDK; this crate talks to them through the traits in [`synchronizer`].
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

use std::time::Duration;

use zcash_protocol::value::Zatoshis;

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod state;
pub mod status;
pub mod synchronizer;
pub mod wallet;

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing;

pub use config::ShieldingConfig;
pub use error::Error;
pub use orchestrator::ShieldingOrchestrator;
pub use state::{SavedShielding, ShieldState};
pub use wallet::{SyncStatus, WalletBalance, WalletSnapshot};

/// The minimum transparent balance below which shielding is not offered.
pub const DEFAULT_SHIELDING_THRESHOLD: Zatoshis = Zatoshis::const_from_u64(100_000);

/// How long a failed shielding attempt waits before it is reported to the user.
pub const DEFAULT_FAILURE_DELAY: Duration = Duration::from_millis(1500);

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
