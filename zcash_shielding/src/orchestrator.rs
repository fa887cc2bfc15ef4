//! Coordination of the shielding flow.
//!
//! A [`ShieldingOrchestrator`] owns the wallet's [`ShieldState`]. Two things write it:
//!
//! - the balance observer, which promotes the state to [`ShieldState::Available`]
//!   whenever the transparent balance reaches the shielding threshold (see
//!   [`update_transparent_balance_state`]), and
//! - a shielding attempt, started by [`ShieldingOrchestrator::shield`], which moves the
//!   state through `Running` to either `Shielded` or `Failed`.
//!
//! An attempt can only start from `Available`, and the balance observer never touches a
//! `Running` state, so at most one attempt is in flight per orchestrator.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    config::ShieldingConfig,
    error::Error,
    state::{update_transparent_balance_state, SavedShielding, ShieldState},
    synchronizer::{SubmitResult, Synchronizer, TransactionSubmitter},
    wallet::WalletSnapshot,
};

type NavigationCallback = Box<dyn Fn() + Send + Sync>;

/// Drives transparent-fund shielding for a single account.
pub struct ShieldingOrchestrator<S: Synchronizer, T> {
    synchronizer: S,
    submitter: T,
    account: S::AccountId,
    config: ShieldingConfig,
    shield_state: watch::Sender<ShieldState>,
    error_dialog: watch::Sender<bool>,
    on_multiple_transaction_failure: NavigationCallback,
}

impl<S, T> ShieldingOrchestrator<S, T>
where
    S: Synchronizer,
    T: TransactionSubmitter<S::AccountId, S::Proposal>,
{
    /// Constructs an orchestrator in the [`ShieldState::None`] state.
    ///
    /// `on_multiple_transaction_failure` is invoked when a proposal's transactions were
    /// only partially submitted; the host is expected to navigate to its recovery screen.
    pub fn new(
        synchronizer: S,
        submitter: T,
        account: S::AccountId,
        config: ShieldingConfig,
        on_multiple_transaction_failure: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::with_saved(
            synchronizer,
            submitter,
            account,
            config,
            SavedShielding::default(),
            on_multiple_transaction_failure,
        )
    }

    /// Constructs an orchestrator from previously saved UI state.
    ///
    /// The saved state is passed through [`SavedShielding::restored`].
    pub fn with_saved(
        synchronizer: S,
        submitter: T,
        account: S::AccountId,
        config: ShieldingConfig,
        saved: SavedShielding,
        on_multiple_transaction_failure: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let saved = saved.restored();
        ShieldingOrchestrator {
            synchronizer,
            submitter,
            account,
            config,
            shield_state: watch::Sender::new(saved.state),
            error_dialog: watch::Sender::new(saved.show_error_dialog),
            on_multiple_transaction_failure: Box::new(on_multiple_transaction_failure),
        }
    }

    /// Returns the configuration this orchestrator was built with.
    pub fn config(&self) -> &ShieldingConfig {
        &self.config
    }

    /// Returns the UI state to persist, for use with [`Self::with_saved`].
    pub fn saved(&self) -> SavedShielding {
        SavedShielding {
            state: self.shield_state(),
            show_error_dialog: self.is_showing_error_dialog(),
        }
    }

    /// Returns the current shield state.
    pub fn shield_state(&self) -> ShieldState {
        self.shield_state.borrow().clone()
    }

    /// Returns a receiver that is notified whenever the shield state changes.
    pub fn subscribe(&self) -> watch::Receiver<ShieldState> {
        self.shield_state.subscribe()
    }

    /// Returns `true` if the host should be showing the shielding error dialog.
    pub fn is_showing_error_dialog(&self) -> bool {
        *self.error_dialog.borrow()
    }

    /// Returns a receiver that is notified whenever the error dialog flag changes.
    pub fn subscribe_error_dialog(&self) -> watch::Receiver<bool> {
        self.error_dialog.subscribe()
    }

    /// Records that the user dismissed the error dialog.
    pub fn dismiss_error_dialog(&self) {
        self.error_dialog.send_if_modified(|showing| std::mem::replace(showing, false));
    }

    /// Applies a wallet snapshot to the shield state.
    ///
    /// Returns `true` if the state changed.
    pub fn observe_snapshot(&self, snapshot: Option<&WalletSnapshot>) -> bool {
        let threshold = self.config.shielding_threshold;
        self.shield_state.send_if_modified(|state| {
            let next = update_transparent_balance_state(state, snapshot, threshold);
            if next != *state {
                debug!("Shield state {} -> {}", state, next);
                *state = next;
                true
            } else {
                false
            }
        })
    }

    /// Follows the synchronizer's wallet snapshots, keeping the shield state in step
    /// with the transparent balance.
    ///
    /// Returns once the synchronizer stops publishing snapshots.
    pub async fn observe_balance(&self) {
        let mut snapshots = self.synchronizer.observe_balance();
        loop {
            {
                let snapshot = snapshots.borrow_and_update();
                self.observe_snapshot(Option::as_ref(&*snapshot));
            }
            if snapshots.changed().await.is_err() {
                debug!("Wallet snapshot stream closed");
                return;
            }
        }
    }

    /// Shields the account's transparent funds.
    ///
    /// The state must be [`ShieldState::Available`]; it is moved to `Running` before the
    /// synchronizer is called, and any other state is rejected with
    /// [`Error::NotAvailable`] without side effects.
    ///
    /// On success the state becomes `Shielded` and the synchronizer is asked to refresh
    /// its transaction history. Failures become `Failed` and raise the error dialog flag
    /// after [`ShieldingConfig::failure_delay`] has elapsed. A partially submitted
    /// proposal leaves the state untouched and invokes the multiple-transaction-failure
    /// callback instead.
    #[tracing::instrument(skip(self))]
    pub async fn shield(&self) -> Result<(), Error<S::Error>> {
        self.begin()?;

        debug!("Shielding transparent funds");

        let proposal = self
            .synchronizer
            .propose_shielding(
                &self.account,
                self.config.shielding_threshold,
                self.config.memo.clone(),
                self.config.transparent_receiver,
            )
            .await;

        let result = match proposal {
            Ok(proposal) => {
                info!("Shielding proposal result: {:?}", proposal);
                match proposal {
                    None => Err(Error::ProposalBelowThreshold),
                    Some(proposal) => self.submit(proposal).await,
                }
            }
            Err(e) => Err(Error::Proposal(e)),
        };

        match result {
            Err(Error::MultipleSubmission) => {
                (self.on_multiple_transaction_failure)();
                Err(Error::MultipleSubmission)
            }
            Err(e) => {
                error!("Shielding proposal failed with: {}", e);
                self.report_failure(e.user_message().unwrap_or_default())
                    .await;
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }

    /// Moves the state from `Available` to `Running` in a single step.
    fn begin(&self) -> Result<(), Error<S::Error>> {
        let mut rejected = None;
        self.shield_state.send_if_modified(|state| {
            if state.is_available() {
                *state = ShieldState::Running;
                true
            } else {
                rejected = Some(state.clone());
                false
            }
        });

        match rejected {
            Some(state) => {
                warn!("Ignoring shielding request in state {}", state);
                Err(Error::NotAvailable(state))
            }
            None => Ok(()),
        }
    }

    async fn submit(&self, proposal: S::Proposal) -> Result<(), Error<S::Error>> {
        match self
            .submitter
            .create_transactions(&self.account, proposal)
            .await
        {
            SubmitResult::Success => {
                info!("Shielding transaction done successfully");
                self.shield_state.send_replace(ShieldState::Shielded);
                // Make the new transaction visible in history as soon as possible.
                self.synchronizer.refresh_transactions();
                Ok(())
            }
            SubmitResult::SimpleFailure { description } => {
                warn!("Shielding transaction failed");
                Err(Error::SimpleSubmission(description))
            }
            SubmitResult::MultipleTransactionFailure => {
                warn!("Shielding failed with multi-transactions-submission-error handling");
                Err(Error::MultipleSubmission)
            }
        }
    }

    async fn report_failure(&self, message: String) {
        // Give the user a moment before the dialog appears.
        tokio::time::sleep(self.config.failure_delay).await;

        self.shield_state.send_replace(ShieldState::Failed(message));
        self.error_dialog.send_replace(true);
    }
}

impl<S, T> ShieldingOrchestrator<S, T>
where
    S: Synchronizer + Sync + 'static,
    S::AccountId: Send + Sync + 'static,
    S::Proposal: Send + 'static,
    S::Error: Send + 'static,
    T: TransactionSubmitter<S::AccountId, S::Proposal> + Sync + 'static,
{
    /// Spawns [`Self::shield`] onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from outside a tokio runtime.
    pub fn launch_shielding(self: &Arc<Self>) -> JoinHandle<Result<(), Error<S::Error>>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.shield().await })
    }

    /// Spawns [`Self::observe_balance`] onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from outside a tokio runtime.
    pub fn launch_balance_observer(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.observe_balance().await })
    }
}
