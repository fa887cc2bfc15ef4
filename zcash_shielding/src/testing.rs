//! Utilities for testing shielding flows without a wallet SDK.

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use proptest::prelude::*;
use tokio::sync::watch;
use transparent::address::TransparentAddress;
use zcash_protocol::{
    memo::MemoBytes,
    value::{Zatoshis, MAX_MONEY},
};

use crate::{
    state::ShieldState,
    synchronizer::{SubmitResult, Synchronizer, TransactionSubmitter},
    wallet::{SyncStatus, WalletBalance, WalletSnapshot},
};

/// A stand-in for an SDK transaction proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProposal(pub u32);

/// A stand-in for an SDK error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

/// The arguments of a [`Synchronizer::propose_shielding`] call.
#[derive(Debug, Clone)]
pub struct ProposeCall {
    pub account: u32,
    pub shielding_threshold: Zatoshis,
    pub memo: MemoBytes,
    pub transparent_receiver: Option<TransparentAddress>,
}

struct SynchronizerState {
    snapshots_tx: Mutex<Option<watch::Sender<Option<WalletSnapshot>>>>,
    snapshots_rx: watch::Receiver<Option<WalletSnapshot>>,
    proposal: Mutex<Result<Option<MockProposal>, MockError>>,
    propose_latency: Mutex<Duration>,
    propose_calls: Mutex<Vec<ProposeCall>>,
    refreshes: AtomicUsize,
}

/// A scripted [`Synchronizer`].
///
/// Clones share their state, so a test can keep a handle after moving one into the
/// code under test.
#[derive(Clone)]
pub struct MockSynchronizer {
    inner: Arc<SynchronizerState>,
}

impl MockSynchronizer {
    /// Constructs a synchronizer that has not yet published a snapshot, and that
    /// proposes nothing.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        MockSynchronizer {
            inner: Arc::new(SynchronizerState {
                snapshots_tx: Mutex::new(Some(tx)),
                snapshots_rx: rx,
                proposal: Mutex::new(Ok(None)),
                propose_latency: Mutex::new(Duration::ZERO),
                propose_calls: Mutex::new(vec![]),
                refreshes: AtomicUsize::new(0),
            }),
        }
    }

    /// Sets the result of every subsequent `propose_shielding` call.
    pub fn set_proposal(&self, proposal: Result<Option<MockProposal>, MockError>) {
        *self.inner.proposal.lock().unwrap() = proposal;
    }

    /// Makes `propose_shielding` take `latency` before returning.
    pub fn set_propose_latency(&self, latency: Duration) {
        *self.inner.propose_latency.lock().unwrap() = latency;
    }

    /// Publishes a new wallet snapshot.
    ///
    /// Does nothing once [`Self::close`] has been called.
    pub fn publish(&self, snapshot: WalletSnapshot) {
        if let Some(tx) = self.inner.snapshots_tx.lock().unwrap().as_ref() {
            tx.send_replace(Some(snapshot));
        }
    }

    /// Ends the snapshot stream.
    pub fn close(&self) {
        self.inner.snapshots_tx.lock().unwrap().take();
    }

    pub fn propose_count(&self) -> usize {
        self.inner.propose_calls.lock().unwrap().len()
    }

    pub fn last_propose_call(&self) -> Option<ProposeCall> {
        self.inner.propose_calls.lock().unwrap().last().cloned()
    }

    pub fn refresh_count(&self) -> usize {
        self.inner.refreshes.load(Ordering::SeqCst)
    }
}

impl Default for MockSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer for MockSynchronizer {
    type AccountId = u32;
    type Proposal = MockProposal;
    type Error = MockError;

    fn observe_balance(&self) -> watch::Receiver<Option<WalletSnapshot>> {
        self.inner.snapshots_rx.clone()
    }

    async fn propose_shielding(
        &self,
        account: &u32,
        shielding_threshold: Zatoshis,
        memo: MemoBytes,
        transparent_receiver: Option<TransparentAddress>,
    ) -> Result<Option<MockProposal>, MockError> {
        self.inner.propose_calls.lock().unwrap().push(ProposeCall {
            account: *account,
            shielding_threshold,
            memo,
            transparent_receiver,
        });

        let latency = *self.inner.propose_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.inner.proposal.lock().unwrap().clone()
    }

    fn refresh_transactions(&self) {
        self.inner.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A [`TransactionSubmitter`] that returns a scripted result and records what it was
/// asked to submit.
#[derive(Clone)]
pub struct MockSubmitter {
    result: Arc<Mutex<SubmitResult>>,
    submitted: Arc<Mutex<Vec<(u32, MockProposal)>>>,
}

impl MockSubmitter {
    pub fn new(result: SubmitResult) -> Self {
        MockSubmitter {
            result: Arc::new(Mutex::new(result)),
            submitted: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn set_result(&self, result: SubmitResult) {
        *self.result.lock().unwrap() = result;
    }

    pub fn submitted(&self) -> Vec<(u32, MockProposal)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl TransactionSubmitter<u32, MockProposal> for MockSubmitter {
    async fn create_transactions(&self, account: &u32, proposal: MockProposal) -> SubmitResult {
        self.submitted.lock().unwrap().push((*account, proposal));
        self.result.lock().unwrap().clone()
    }
}

/// Counts invocations of a navigation callback.
#[derive(Clone, Default)]
pub struct NavigationProbe(Arc<AtomicUsize>);

impl NavigationProbe {
    pub fn callback(&self) -> impl Fn() + Send + Sync + 'static {
        let count = self.0.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn arb_shield_state() -> impl Strategy<Value = ShieldState> {
    prop_oneof![
        Just(ShieldState::None),
        Just(ShieldState::Available),
        Just(ShieldState::Running),
        Just(ShieldState::Shielded),
        "[a-z ]{0,16}".prop_map(ShieldState::Failed),
    ]
}

pub fn arb_sync_status() -> impl Strategy<Value = SyncStatus> {
    prop_oneof![
        Just(SyncStatus::Syncing),
        Just(SyncStatus::Synced),
        Just(SyncStatus::Disconnected),
        Just(SyncStatus::Stopped),
    ]
}

prop_compose! {
    /// A transparent balance concentrated around the default shielding threshold.
    pub fn arb_transparent_balance()(
        amt in prop_oneof![0u64..200_000, 0u64..MAX_MONEY]
    ) -> Zatoshis {
        Zatoshis::from_u64(amt).unwrap()
    }
}

prop_compose! {
    pub fn arb_wallet_snapshot()(
        status in arb_sync_status(),
        progress in 0.0f32..=1.0,
        transparent_balance in arb_transparent_balance(),
        synchronizer_error in proptest::option::of("[a-z]{1,8}"),
    ) -> WalletSnapshot {
        WalletSnapshot {
            status,
            progress,
            orchard_balance: WalletBalance::ZERO,
            sapling_balance: WalletBalance::ZERO,
            transparent_balance,
            synchronizer_error,
        }
    }
}
