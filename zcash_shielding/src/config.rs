//! Parameters of a shielding attempt.

use std::time::Duration;

use transparent::address::TransparentAddress;
use zcash_protocol::{memo::MemoBytes, value::Zatoshis};

use crate::{DEFAULT_FAILURE_DELAY, DEFAULT_SHIELDING_THRESHOLD};

/// Configuration for a [`ShieldingOrchestrator`].
///
/// [`ShieldingOrchestrator`]: crate::orchestrator::ShieldingOrchestrator
#[derive(Debug, Clone)]
pub struct ShieldingConfig {
    /// The minimum transparent balance for which shielding is offered, and the threshold
    /// passed to the synchronizer when proposing.
    pub shielding_threshold: Zatoshis,
    /// How long to wait before reporting a failed attempt to the user.
    pub failure_delay: Duration,
    /// The memo attached to the shielding output.
    ///
    /// Defaults to the empty memo, which overrides any memo prefix the wallet SDK would
    /// otherwise apply.
    pub memo: MemoBytes,
    /// The transparent receiver to shield from.
    ///
    /// `None` lets the synchronizer pick whichever of the account's transparent
    /// receivers holds funds.
    pub transparent_receiver: Option<TransparentAddress>,
}

impl Default for ShieldingConfig {
    fn default() -> Self {
        ShieldingConfig {
            shielding_threshold: DEFAULT_SHIELDING_THRESHOLD,
            failure_delay: DEFAULT_FAILURE_DELAY,
            memo: MemoBytes::empty(),
            transparent_receiver: None,
        }
    }
}

impl ShieldingConfig {
    /// Sets the minimum transparent balance for which shielding is offered.
    pub fn with_shielding_threshold(mut self, threshold: Zatoshis) -> Self {
        self.shielding_threshold = threshold;
        self
    }

    /// Sets how long a failed attempt waits before it is reported.
    pub fn with_failure_delay(mut self, delay: Duration) -> Self {
        self.failure_delay = delay;
        self
    }

    /// Sets the memo attached to the shielding output.
    pub fn with_memo(mut self, memo: MemoBytes) -> Self {
        self.memo = memo;
        self
    }

    /// Restricts shielding to funds held by `receiver`.
    pub fn with_transparent_receiver(mut self, receiver: TransparentAddress) -> Self {
        self.transparent_receiver = Some(receiver);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use zcash_protocol::memo::MemoBytes;

    use super::ShieldingConfig;
    use crate::DEFAULT_SHIELDING_THRESHOLD;

    #[test]
    fn defaults() {
        let config = ShieldingConfig::default();
        assert_eq!(config.shielding_threshold.into_u64(), 100_000);
        assert_eq!(config.failure_delay, Duration::from_millis(1500));
        assert_eq!(config.memo, MemoBytes::empty());
        assert!(config.transparent_receiver.is_none());
        assert_eq!(config.shielding_threshold, DEFAULT_SHIELDING_THRESHOLD);
    }
}
