//! Points Protocol Integration Tests
//!
//! Host-level flows against the deployed `PointsProtocol` contract.

#[cfg(test)]
mod fixtures;


#[cfg(test)]
mod loan_tests;


#[cfg(test)]
mod token_stake_tests;

#[cfg(test)]
mod tests {
    use points_protocol_contracts::errors::ProtocolError;
    use points_protocol_contracts::types::*;

    #[test]
    fn test_asset_id_ordering() {
        assert!(AssetId::Cspr < AssetId::StakeToken);
    }

    #[test]
    fn test_protocol_constants() {
        assert_eq!(MAX_LTV_BPS, 7_000);
        assert_eq!(INTEREST_RATE_BPS, 500);
        assert_eq!(EPOCHS_PER_YEAR, 365);
        assert_eq!(MILLIS_PER_EPOCH, 86_400_000);
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let errors = [
            ProtocolError::Unauthorized,
            ProtocolError::ProtocolPaused,
            ProtocolError::ExceedsLtv,
            ProtocolError::InsufficientPoints,
            ProtocolError::InsufficientLocked,
            ProtocolError::NotMature,
            ProtocolError::PositionEncumbered,
        ];
        for (i, a) in errors.iter().enumerate() {
            for b in errors.iter().skip(i + 1) {
                assert_ne!(a.message(), b.message());
            }
        }
    }
}
