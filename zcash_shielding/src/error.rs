//! Types for shielding error handling.

use std::error;
use std::fmt::{self, Debug, Display};

use crate::state::ShieldState;

/// The message shown when the synchronizer declines to propose a shielding transaction
/// because the transparent balance dropped below the threshold.
pub const BELOW_THRESHOLD_MESSAGE: &str =
    "Your transparent balance is below the shielding threshold. Please try again later.";

/// Errors that can occur while shielding transparent funds.
#[derive(Debug)]
pub enum Error<SynchronizerError> {
    /// The synchronizer returned no proposal, because the transparent balance was below
    /// the shielding threshold at the time of the call.
    ProposalBelowThreshold,

    /// The synchronizer failed to construct a shielding proposal.
    Proposal(SynchronizerError),

    /// The single transaction of the proposal could not be created or submitted.
    SimpleSubmission(String),

    /// Some of the proposal's transactions could not be submitted.
    ///
    /// This is not reported to the user as an error; the host navigates to a dedicated
    /// recovery flow instead.
    MultipleSubmission,

    /// Shielding was triggered while it was not being offered.
    NotAvailable(ShieldState),
}

impl<SE: Display> Error<SE> {
    /// Returns the message that the error dialog should show for this error, or `None`
    /// if the error is not surfaced as a dialog.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Error::ProposalBelowThreshold => Some(BELOW_THRESHOLD_MESSAGE.to_owned()),
            Error::Proposal(e) => Some(e.to_string()),
            Error::SimpleSubmission(description) => Some(description.clone()),
            Error::MultipleSubmission | Error::NotAvailable(_) => None,
        }
    }
}

impl<SE: Display> fmt::Display for Error<SE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProposalBelowThreshold => write!(
                f,
                "No shielding proposal was created because the transparent balance is below the threshold"
            ),
            Error::Proposal(e) => {
                write!(f, "The synchronizer failed to propose shielding: {}", e)
            }
            Error::SimpleSubmission(description) => {
                write!(f, "The shielding transaction failed: {}", description)
            }
            Error::MultipleSubmission => write!(
                f,
                "Some transactions of the shielding proposal could not be submitted"
            ),
            Error::NotAvailable(state) => {
                write!(f, "Shielding is not available in state {}", state)
            }
        }
    }
}

impl<SE> error::Error for Error<SE>
where
    SE: Debug + Display + error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self {
            Error::Proposal(e) => Some(e),
            _ => None,
        }
    }
}
