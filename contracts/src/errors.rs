//! Protocol error definitions.

use odra::prelude::*;

/// Points protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    // Authorization errors (1xx)
    Unauthorized = 100,
    ProtocolPaused = 101,
    CapabilityNotFound = 102,

    // Policy errors (2xx)
    ExceedsLtv = 200,
    InsufficientPoints = 201,
    InsufficientLocked = 202,
    NotMature = 203,
    PositionEncumbered = 204,
    ZeroAmount = 205,
    InvalidDuration = 206,

    // Ownership / lookup errors (3xx)
    NotPositionOwner = 300,
    NotLoanBorrower = 301,
    PositionNotFound = 302,
    LoanNotFound = 303,

    // Configuration errors (4xx)
    InvalidConfig = 400,
    InvalidRate = 401,
    UnsupportedAsset = 402,

    // Internal errors (9xx)
    ArithmeticOverflow = 900,
    InsufficientVaultBalance = 901,
}

impl ProtocolError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Authorization
            ProtocolError::Unauthorized => "Unauthorized: capability not held or revoked",
            ProtocolError::ProtocolPaused => "Operation blocked: protocol paused",
            ProtocolError::CapabilityNotFound => "Capability not found",

            // Policy
            ProtocolError::ExceedsLtv => "Borrow exceeds maximum loan-to-value",
            ProtocolError::InsufficientPoints => "Insufficient available points",
            ProtocolError::InsufficientLocked => "Insufficient locked points",
            ProtocolError::NotMature => "Stake position has not reached its unlock time",
            ProtocolError::PositionEncumbered => "Stake position backs an open loan",
            ProtocolError::ZeroAmount => "Amount must be greater than zero",
            ProtocolError::InvalidDuration => "Stake duration out of range",

            // Ownership / lookup
            ProtocolError::NotPositionOwner => "Caller does not own the stake position",
            ProtocolError::NotLoanBorrower => "Caller is not the loan borrower",
            ProtocolError::PositionNotFound => "Stake position not found",
            ProtocolError::LoanNotFound => "Loan not found",

            // Config
            ProtocolError::InvalidConfig => "Invalid configuration parameter",
            ProtocolError::InvalidRate => "Invalid rate (zero or decimals above 18)",
            ProtocolError::UnsupportedAsset => "Asset not supported",

            // Internal
            ProtocolError::ArithmeticOverflow => "Arithmetic overflow",
            ProtocolError::InsufficientVaultBalance => "Escrow vault balance below requested withdrawal",
        }
    }

    /// Numeric error code, as surfaced to clients.
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Internal invariant violations. These should never be reachable through
    /// the public entry points and are logged before the call reverts.
    pub const fn is_fatal(&self) -> bool {
        self.code() >= 900
    }

    /// Policy rejections the caller can fix (wait, repay, claim more points).
    pub const fn is_recoverable(&self) -> bool {
        let code = self.code();
        code >= 200 && code < 300
    }
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ProtocolError> for OdraError {
    fn from(error: ProtocolError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
