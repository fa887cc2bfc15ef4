//! The user-facing state of transparent-fund shielding.

use std::fmt;

use serde::{Deserialize, Serialize};
use zcash_protocol::value::Zatoshis;

use crate::wallet::WalletSnapshot;

/// Where the wallet is in the shielding flow.
///
/// The state is serializable so that a host can persist it across process death; use
/// [`ShieldState::restored`] when reading it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message")]
pub enum ShieldState {
    /// There is no shieldable transparent balance.
    #[default]
    None,
    /// The transparent balance has reached the shielding threshold, and the user may
    /// start shielding.
    Available,
    /// A shielding attempt is in flight.
    Running,
    /// The most recent shielding attempt succeeded.
    Shielded,
    /// The most recent shielding attempt failed for the given reason.
    Failed(String),
}

impl ShieldState {
    /// Returns `true` if an observed transparent balance is allowed to replace this
    /// state with [`ShieldState::Available`].
    ///
    /// An in-flight attempt is never overridden.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ShieldState::Running)
    }

    /// Returns `true` if the user may start shielding from this state.
    pub fn is_available(&self) -> bool {
        matches!(self, ShieldState::Available)
    }

    /// Maps a state read back from storage onto one that is valid in a fresh process.
    ///
    /// A saved `Running` state has no task behind it anymore, so it becomes `None`; the
    /// next balance observation will promote it again if funds are still shieldable.
    pub fn restored(self) -> Self {
        match self {
            ShieldState::Running => ShieldState::None,
            other => other,
        }
    }
}

/// The shielding UI state that a host persists across process death.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedShielding {
    pub state: ShieldState,
    /// Whether the error dialog was showing when the state was saved.
    #[serde(default)]
    pub show_error_dialog: bool,
}

impl SavedShielding {
    /// Maps saved UI state onto one that is valid in a fresh process.
    ///
    /// See [`ShieldState::restored`]. The error dialog flag is kept as saved.
    pub fn restored(self) -> Self {
        SavedShielding {
            state: self.state.restored(),
            show_error_dialog: self.show_error_dialog,
        }
    }
}

impl fmt::Display for ShieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShieldState::None => write!(f, "None"),
            ShieldState::Available => write!(f, "Available"),
            ShieldState::Running => write!(f, "Running"),
            ShieldState::Shielded => write!(f, "Shielded"),
            ShieldState::Failed(message) => write!(f, "Failed({message})"),
        }
    }
}

/// Computes the shield state implied by the latest wallet snapshot.
///
/// If the snapshot's transparent balance is at least `threshold` and the current state
/// is [enabled](ShieldState::is_enabled), the result is [`ShieldState::Available`].
/// In every other case, including a missing snapshot, the current state is kept.
pub fn update_transparent_balance_state(
    current: &ShieldState,
    snapshot: Option<&WalletSnapshot>,
    threshold: Zatoshis,
) -> ShieldState {
    match snapshot {
        Some(snapshot) if snapshot.can_shield(threshold) && current.is_enabled() => {
            ShieldState::Available
        }
        _ => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use zcash_protocol::value::Zatoshis;

    use super::{update_transparent_balance_state, SavedShielding, ShieldState};
    use crate::{
        testing::{arb_shield_state, arb_wallet_snapshot},
        wallet::WalletSnapshot,
        DEFAULT_SHIELDING_THRESHOLD,
    };

    fn snapshot(balance: u64) -> WalletSnapshot {
        WalletSnapshot::synced(Zatoshis::from_u64(balance).unwrap())
    }

    #[test]
    fn missing_snapshot_keeps_state() {
        for state in [
            ShieldState::None,
            ShieldState::Available,
            ShieldState::Shielded,
            ShieldState::Failed("boom".into()),
        ] {
            assert_eq!(
                update_transparent_balance_state(&state, None, DEFAULT_SHIELDING_THRESHOLD),
                state
            );
        }
    }

    #[test]
    fn threshold_boundary() {
        let below = snapshot(DEFAULT_SHIELDING_THRESHOLD.into_u64() - 1);
        let at = snapshot(DEFAULT_SHIELDING_THRESHOLD.into_u64());

        assert_eq!(
            update_transparent_balance_state(
                &ShieldState::None,
                Some(&below),
                DEFAULT_SHIELDING_THRESHOLD
            ),
            ShieldState::None
        );
        assert_eq!(
            update_transparent_balance_state(&ShieldState::None, Some(&at), DEFAULT_SHIELDING_THRESHOLD),
            ShieldState::Available
        );
    }

    #[test]
    fn failed_and_shielded_are_promoted() {
        let funded = snapshot(250_000);
        for state in [ShieldState::Shielded, ShieldState::Failed("no".into())] {
            assert_eq!(
                update_transparent_balance_state(&state, Some(&funded), DEFAULT_SHIELDING_THRESHOLD),
                ShieldState::Available
            );
        }
    }

    #[test]
    fn saved_state_round_trips_through_json() {
        let failed = ShieldState::Failed("Insufficient balance".into());
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, r#"{"state":"Failed","message":"Insufficient balance"}"#);
        assert_eq!(serde_json::from_str::<ShieldState>(&json).unwrap(), failed);

        let running: ShieldState = serde_json::from_str(r#"{"state":"Running"}"#).unwrap();
        assert_eq!(running.restored(), ShieldState::None);
        assert_eq!(ShieldState::Shielded.restored(), ShieldState::Shielded);
    }

    #[test]
    fn saved_shielding_keeps_error_dialog() {
        let saved = SavedShielding {
            state: ShieldState::Failed("tx expired".into()),
            show_error_dialog: true,
        };
        let json = serde_json::to_string(&saved).unwrap();
        let restored = serde_json::from_str::<SavedShielding>(&json)
            .unwrap()
            .restored();
        assert_eq!(restored, saved);

        // Older saves without the flag read back with the dialog hidden.
        let legacy: SavedShielding =
            serde_json::from_str(r#"{"state":{"state":"Shielded"}}"#).unwrap();
        assert_eq!(legacy.state, ShieldState::Shielded);
        assert!(!legacy.show_error_dialog);
    }

    proptest! {
        #[test]
        fn promotion_follows_latest_balance(
            initial in arb_shield_state(),
            snapshots in prop::collection::vec(arb_wallet_snapshot(), 1..20),
        ) {
            let mut state = initial;
            for snapshot in &snapshots {
                let next = update_transparent_balance_state(
                    &state,
                    Some(snapshot),
                    DEFAULT_SHIELDING_THRESHOLD,
                );
                if state == ShieldState::Running {
                    prop_assert_eq!(&next, &ShieldState::Running);
                } else if snapshot.transparent_balance >= DEFAULT_SHIELDING_THRESHOLD {
                    prop_assert_eq!(&next, &ShieldState::Available);
                } else {
                    prop_assert_eq!(&next, &state);
                }
                state = next;
            }
        }
    }
}
