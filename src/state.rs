//! Checkout state machine.
//!
//! ```text
//! Idle ─► [Tokenizing] ─► Submitting ─► AwaitingIntent ─► AwaitingConfirmation ─► Succeeded
//!              │                              │                    │
//!              ▼                              ▼                    ├─► ConfirmationError ─► Idle
//!       TokenizationError ─► Idle       IntentError ─► Idle        └─► RequiresAction    ─► Idle
//! ```
//!
//! `Tokenizing` only appears in the subscription flow. The error exits and
//! `RequiresAction` are passed through on the way back to `Idle` so that
//! observers see which branch was taken.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckoutState {
    Idle,
    Tokenizing,
    Submitting,
    AwaitingIntent,
    AwaitingConfirmation,
    Succeeded,
    TokenizationError,
    IntentError,
    ConfirmationError,
    /// Confirmation resolved without error but with a status other than `succeeded`.
    RequiresAction,
}

impl CheckoutState {
    /// A new submission may start only from `Idle`.
    pub fn accepts_submit(self) -> bool {
        self == CheckoutState::Idle
    }

    /// A submission is in flight; the submit control must be disabled.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            CheckoutState::Tokenizing
                | CheckoutState::Submitting
                | CheckoutState::AwaitingIntent
                | CheckoutState::AwaitingConfirmation
        )
    }

    /// Error exits and `RequiresAction`, all of which recover to `Idle`.
    pub fn is_recoverable_exit(self) -> bool {
        matches!(
            self,
            CheckoutState::TokenizationError
                | CheckoutState::IntentError
                | CheckoutState::ConfirmationError
                | CheckoutState::RequiresAction
        )
    }

    pub fn is_terminal(self) -> bool {
        self == CheckoutState::Succeeded
    }

    /// Whether the machine may move from `self` to `next`.
    pub fn can_transition_to(self, next: CheckoutState) -> bool {
        use CheckoutState::*;
        matches!(
            (self, next),
            (Idle, Tokenizing)
                | (Idle, Submitting)
                | (Tokenizing, Submitting)
                | (Tokenizing, TokenizationError)
                | (Submitting, AwaitingIntent)
                | (AwaitingIntent, AwaitingConfirmation)
                | (AwaitingIntent, IntentError)
                | (AwaitingConfirmation, Succeeded)
                | (AwaitingConfirmation, ConfirmationError)
                | (AwaitingConfirmation, RequiresAction)
                | (TokenizationError, Idle)
                | (IntentError, Idle)
                | (ConfirmationError, Idle)
                | (RequiresAction, Idle)
        )
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Tokenizing => "tokenizing",
            CheckoutState::Submitting => "submitting",
            CheckoutState::AwaitingIntent => "awaiting_intent",
            CheckoutState::AwaitingConfirmation => "awaiting_confirmation",
            CheckoutState::Succeeded => "succeeded",
            CheckoutState::TokenizationError => "tokenization_error",
            CheckoutState::IntentError => "intent_error",
            CheckoutState::ConfirmationError => "confirmation_error",
            CheckoutState::RequiresAction => "requires_action",
        };
        f.write_str(name)
    }
}
