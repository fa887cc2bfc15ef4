//! Read-only views of wallet state, as published by the wallet's synchronizer.

use zcash_protocol::value::Zatoshis;

/// The synchronizer's view of its own progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// Blocks are being downloaded and scanned.
    Syncing,
    /// The wallet is up to date with the chain tip.
    Synced,
    /// The synchronizer lost its connection to the light wallet server.
    Disconnected,
    /// The synchronizer has been stopped.
    Stopped,
}

/// The balance held by the wallet in a single shielded pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletBalance {
    /// All funds in the pool, including those that are not yet spendable.
    pub total: Zatoshis,
    /// Funds in the pool that can be spent right now.
    pub available: Zatoshis,
}

impl WalletBalance {
    /// An empty pool.
    pub const ZERO: Self = WalletBalance {
        total: Zatoshis::ZERO,
        available: Zatoshis::ZERO,
    };

    /// Constructs a balance from its total and spendable parts.
    pub fn new(total: Zatoshis, available: Zatoshis) -> Self {
        WalletBalance { total, available }
    }

    /// Returns the portion of the total that is still awaiting confirmations.
    pub fn pending(&self) -> Zatoshis {
        (self.total - self.available).unwrap_or(Zatoshis::ZERO)
    }
}

/// A point-in-time snapshot of the wallet, as observed through
/// [`Synchronizer::observe_balance`].
///
/// [`Synchronizer::observe_balance`]: crate::synchronizer::Synchronizer::observe_balance
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSnapshot {
    pub status: SyncStatus,
    /// Sync progress in the range `0.0..=1.0`.
    pub progress: f32,
    pub orchard_balance: WalletBalance,
    pub sapling_balance: WalletBalance,
    pub transparent_balance: Zatoshis,
    /// The cause of the most recent synchronizer failure, if any.
    pub synchronizer_error: Option<String>,
}

impl WalletSnapshot {
    /// Constructs a snapshot of a fully synced wallet holding only the given
    /// transparent balance.
    pub fn synced(transparent_balance: Zatoshis) -> Self {
        WalletSnapshot {
            status: SyncStatus::Synced,
            progress: 1.0,
            orchard_balance: WalletBalance::ZERO,
            sapling_balance: WalletBalance::ZERO,
            transparent_balance,
            synchronizer_error: None,
        }
    }

    /// Returns the sum of every pool's total balance.
    ///
    /// Returns `None` if the sum exceeds the valid monetary range.
    pub fn total_balance(&self) -> Option<Zatoshis> {
        self.orchard_balance.total + self.sapling_balance.total + self.transparent_balance
    }

    /// Returns the balance that can be spent right now.
    ///
    /// Transparent funds are not spendable until they are shielded.
    pub fn spendable_balance(&self) -> Option<Zatoshis> {
        self.orchard_balance.available + self.sapling_balance.available
    }

    /// Returns `true` if the transparent balance is at least `threshold`.
    pub fn can_shield(&self, threshold: Zatoshis) -> bool {
        self.transparent_balance >= threshold
    }
}

#[cfg(test)]
mod tests {
    use zcash_protocol::value::{Zatoshis, MAX_MONEY};

    use super::{WalletBalance, WalletSnapshot};

    fn zats(amount: u64) -> Zatoshis {
        Zatoshis::from_u64(amount).unwrap()
    }

    #[test]
    fn balances_sum_across_pools() {
        let snapshot = WalletSnapshot {
            orchard_balance: WalletBalance::new(zats(500), zats(300)),
            sapling_balance: WalletBalance::new(zats(70), zats(70)),
            ..WalletSnapshot::synced(zats(9))
        };

        assert_eq!(snapshot.total_balance(), Some(zats(579)));
        assert_eq!(snapshot.spendable_balance(), Some(zats(370)));
        assert_eq!(snapshot.orchard_balance.pending(), zats(200));
    }

    #[test]
    fn total_balance_overflow_is_none() {
        let snapshot = WalletSnapshot {
            orchard_balance: WalletBalance::new(zats(MAX_MONEY), zats(0)),
            ..WalletSnapshot::synced(zats(1))
        };

        assert_eq!(snapshot.total_balance(), None);
    }

    #[test]
    fn shielding_threshold_is_inclusive() {
        let threshold = zats(100_000);
        assert!(!WalletSnapshot::synced(zats(99_999)).can_shield(threshold));
        assert!(WalletSnapshot::synced(zats(100_000)).can_shield(threshold));
    }
}
