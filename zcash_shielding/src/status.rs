//! A summary of wallet sync status, for display next to the balance.

use std::fmt;

use crate::wallet::{SyncStatus, WalletSnapshot};

/// What the wallet's status line should say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Syncing,
    Synced,
    /// The wallet is synced, and a newer version of the app is available.
    UpdateAvailable,
    /// The connection to the server was lost. Only reported in detailed mode.
    ConnectionError,
    /// The synchronizer is stopped. Only reported in detailed mode.
    Stopped,
    /// The synchronizer failed with the given cause. Only reported in detailed mode.
    Error(String),
    /// Something went wrong; detailed mode is off.
    GenericError,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Syncing => write!(f, "Syncing"),
            StatusKind::Synced => write!(f, "Synced"),
            StatusKind::UpdateAvailable => write!(f, "Update available"),
            StatusKind::ConnectionError => write!(f, "Error: connection error"),
            StatusKind::Stopped => write!(f, "Synchronizer stopped"),
            StatusKind::Error(cause) => write!(f, "Error: {}", cause),
            StatusKind::GenericError => write!(f, "Error: something went wrong"),
        }
    }
}

/// The status line and progress to show for a wallet snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletStatus {
    /// Sync progress in the range `0.0..=1.0`; zero unless the wallet is syncing.
    pub progress: f32,
    pub kind: StatusKind,
}

const UNKNOWN_CAUSE: &str = "unknown";

impl WalletStatus {
    /// Derives the status from a snapshot.
    ///
    /// With `is_detailed` unset, disconnections and synchronizer failures collapse into
    /// [`StatusKind::GenericError`] and a stopped synchronizer reads as syncing.
    pub fn from_snapshot(
        snapshot: &WalletSnapshot,
        is_update_available: bool,
        is_detailed: bool,
    ) -> Self {
        let mut progress = 0.0;
        let mut kind = match snapshot.status {
            SyncStatus::Syncing => {
                if snapshot.progress.is_finite() {
                    progress = snapshot.progress.clamp(0.0, 1.0);
                }
                StatusKind::Syncing
            }
            SyncStatus::Synced if is_update_available => StatusKind::UpdateAvailable,
            SyncStatus::Synced => StatusKind::Synced,
            SyncStatus::Disconnected if is_detailed => StatusKind::ConnectionError,
            SyncStatus::Disconnected => StatusKind::GenericError,
            SyncStatus::Stopped if is_detailed => StatusKind::Stopped,
            SyncStatus::Stopped => StatusKind::Syncing,
        };

        if let Some(cause) = &snapshot.synchronizer_error {
            kind = if is_detailed {
                let cause = if cause.is_empty() {
                    UNKNOWN_CAUSE
                } else {
                    cause.as_str()
                };
                StatusKind::Error(cause.to_owned())
            } else {
                StatusKind::GenericError
            };
        }

        WalletStatus { progress, kind }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use zcash_protocol::value::Zatoshis;

    use super::{StatusKind, WalletStatus};
    use crate::{
        testing::arb_wallet_snapshot,
        wallet::{SyncStatus, WalletSnapshot},
    };

    fn snapshot(status: SyncStatus) -> WalletSnapshot {
        WalletSnapshot {
            status,
            progress: 0.4,
            ..WalletSnapshot::synced(Zatoshis::ZERO)
        }
    }

    #[test]
    fn syncing_reports_progress() {
        let status = WalletStatus::from_snapshot(&snapshot(SyncStatus::Syncing), false, false);
        assert_eq!(status.kind, StatusKind::Syncing);
        assert_eq!(status.progress, 0.4);
    }

    #[test]
    fn synced_with_update() {
        let s = snapshot(SyncStatus::Synced);
        assert_eq!(
            WalletStatus::from_snapshot(&s, false, false).kind,
            StatusKind::Synced
        );
        assert_eq!(
            WalletStatus::from_snapshot(&s, true, false).kind,
            StatusKind::UpdateAvailable
        );
    }

    #[test]
    fn detail_level() {
        let disconnected = snapshot(SyncStatus::Disconnected);
        assert_eq!(
            WalletStatus::from_snapshot(&disconnected, false, true).kind,
            StatusKind::ConnectionError
        );
        assert_eq!(
            WalletStatus::from_snapshot(&disconnected, false, false).kind,
            StatusKind::GenericError
        );

        let stopped = snapshot(SyncStatus::Stopped);
        assert_eq!(
            WalletStatus::from_snapshot(&stopped, false, true).kind,
            StatusKind::Stopped
        );
        let simple = WalletStatus::from_snapshot(&stopped, false, false);
        assert_eq!(simple.kind, StatusKind::Syncing);
        assert_eq!(simple.progress, 0.0);
    }

    #[test]
    fn synchronizer_error_overrides_status() {
        let mut s = snapshot(SyncStatus::Synced);
        s.synchronizer_error = Some("server busy".into());
        assert_eq!(
            WalletStatus::from_snapshot(&s, true, true).kind,
            StatusKind::Error("server busy".into())
        );
        assert_eq!(
            WalletStatus::from_snapshot(&s, true, false).kind,
            StatusKind::GenericError
        );

        s.synchronizer_error = Some(String::new());
        let status = WalletStatus::from_snapshot(&s, false, true);
        assert_eq!(status.kind, StatusKind::Error("unknown".into()));
        assert_eq!(status.kind.to_string(), "Error: unknown");
    }

    #[test]
    fn non_finite_progress_reads_as_zero() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let s = WalletSnapshot {
                progress: bad,
                ..snapshot(SyncStatus::Syncing)
            };
            let status = WalletStatus::from_snapshot(&s, false, false);
            assert_eq!(status.kind, StatusKind::Syncing);
            assert_eq!(status.progress, 0.0);
        }

        let s = WalletSnapshot {
            progress: 1.5,
            ..snapshot(SyncStatus::Syncing)
        };
        assert_eq!(WalletStatus::from_snapshot(&s, false, false).progress, 1.0);
    }

    proptest! {
        #[test]
        fn progress_only_while_syncing(
            s in arb_wallet_snapshot(),
            update in any::<bool>(),
            detailed in any::<bool>(),
        ) {
            let status = WalletStatus::from_snapshot(&s, update, detailed);
            prop_assert!((0.0..=1.0).contains(&status.progress));
            if s.status != SyncStatus::Syncing {
                prop_assert_eq!(status.progress, 0.0);
            }
        }
    }
}
