//! Interfaces to the wallet SDK collaborators that shielding depends on.

use std::fmt;

use tokio::sync::watch;
use transparent::address::TransparentAddress;
use zcash_protocol::{memo::MemoBytes, value::Zatoshis};

use crate::wallet::WalletSnapshot;

/// A wallet synchronizer that can propose shielding transactions.
#[trait_variant::make(Synchronizer: Send)]
pub trait LocalSynchronizer {
    /// The identifier of an account within the wallet.
    type AccountId;

    /// A transaction proposal, ready to be handed to a [`TransactionSubmitter`].
    type Proposal: fmt::Debug;

    /// The error type returned when a proposal cannot be constructed.
    type Error: fmt::Display;

    /// Returns a receiver for the continuously updating wallet snapshot.
    ///
    /// The value is `None` until the synchronizer has produced its first snapshot.
    fn observe_balance(&self) -> watch::Receiver<Option<WalletSnapshot>>;

    /// Proposes a transaction that shields the spendable transparent funds of `account`.
    ///
    /// If `transparent_receiver` is `None`, the synchronizer selects whichever of the
    /// account's transparent receivers holds funds.
    ///
    /// Returns `Ok(None)` if the transparent balance is below `shielding_threshold`.
    async fn propose_shielding(
        &self,
        account: &Self::AccountId,
        shielding_threshold: Zatoshis,
        memo: MemoBytes,
        transparent_receiver: Option<TransparentAddress>,
    ) -> Result<Option<Self::Proposal>, Self::Error>;

    /// Asks the synchronizer to reload the wallet's transaction history.
    ///
    /// This returns immediately; the refresh happens in the background.
    fn refresh_transactions(&self);
}

/// The outcome of creating and submitting the transactions of a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Every transaction was created and submitted.
    Success,
    /// The proposal's only transaction failed.
    SimpleFailure { description: String },
    /// At least one of several transactions failed; the wallet may be left with some of
    /// the proposal's transactions broadcast and some not.
    MultipleTransactionFailure,
}

/// A service that creates, signs and broadcasts the transactions of a proposal.
#[trait_variant::make(TransactionSubmitter: Send)]
pub trait LocalTransactionSubmitter<AccountId, Proposal> {
    async fn create_transactions(&self, account: &AccountId, proposal: Proposal) -> SubmitResult;
}
