//! Status messages shown to the user.

pub const CONNECT_WALLET: &str = "Please connect wallet first";
pub const LOAD_FAILED: &str = "Failed to load data";
pub const INIT_FAILED: &str = "FHEVM initialization failed.";

pub const CREATING: &str = "Creating Secret Santa with FHE encryption...";
pub const AWAITING_CONFIRMATION: &str = "Waiting for transaction confirmation...";
pub const CREATED: &str = "Secret Santa created successfully!";
pub const REJECTED: &str = "Transaction rejected";
pub const CREATION_FAILED_PREFIX: &str = "Creation failed: ";

pub const ALREADY_VERIFIED: &str = "Gift value already verified";
pub const VERIFYING: &str = "Verifying gift value...";
pub const REVEALED: &str = "Gift value revealed!";
pub const REVEAL_FAILED_PREFIX: &str = "Reveal failed: ";

pub const AVAILABLE: &str = "FHE System is available and ready!";
pub const AVAILABILITY_FAILED: &str = "Availability check failed";
