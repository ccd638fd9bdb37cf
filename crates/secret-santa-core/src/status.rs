//! The transaction status slot shown to the user.

use serde::{Deserialize, Serialize};

/// Phase of the operation currently being reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxPhase {
    #[default]
    Pending,
    Success,
    Error,
}

/// One status message.
///
/// `token` increases with every update, so a delayed clear can tell whether
/// the status it was scheduled for is still the one on display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub visible: bool,
    pub phase: TxPhase,
    pub message: String,
    pub token: u64,
}

impl TransactionStatus {
    /// The hidden status a session starts with.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.visible && self.phase == TxPhase::Pending
    }

    pub fn is_success(&self) -> bool {
        self.visible && self.phase == TxPhase::Success
    }

    pub fn is_error(&self) -> bool {
        self.visible && self.phase == TxPhase::Error
    }
}
