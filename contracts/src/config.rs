//! Authorization & configuration.
//!
//! Holds the global pause switch, the admin key and the points rate, and
//! issues two kinds of capability objects:
//! - `GovernCap`: pause, points rate, capability issuance, admin rotation
//! - `OracleCap`: exchange rate updates
//!
//! A capability authorizes a call only when the caller is its holder AND its
//! `auth_key` equals the current admin. Rotating the admin therefore revokes
//! every capability issued under the previous key.
//!
//! Every mutation here except `set_pause_state` is refused while paused.

use odra::prelude::*;
use crate::errors::ProtocolError;
use crate::events::{
    AdminRotated, GovernCapTransferred, OracleCapIssued, OracleCapTransferred,
    PauseStateChanged, PointsRateChanged,
};
use crate::types::ConfigSnapshot;

/// Governance capability
#[odra::odra_type]
#[derive(Copy)]
pub struct GovernCap {
    /// Capability id
    pub id: u64,
    /// Current holder
    pub holder: Address,
    /// Admin key at issuance; immutable
    pub auth_key: Address,
}

/// Oracle update capability
#[odra::odra_type]
#[derive(Copy)]
pub struct OracleCap {
    /// Capability id
    pub id: u64,
    /// Current holder
    pub holder: Address,
    /// Admin key at issuance; immutable
    pub auth_key: Address,
}

/// Transferable authority object checked against the admin key.
pub trait Capability: Copy {
    fn id(&self) -> u64;
    fn holder(&self) -> Address;
    fn auth_key(&self) -> Address;
    fn with_holder(self, holder: Address) -> Self;
}

impl Capability for GovernCap {
    fn id(&self) -> u64 {
        self.id
    }

    fn holder(&self) -> Address {
        self.holder
    }

    fn auth_key(&self) -> Address {
        self.auth_key
    }

    fn with_holder(self, holder: Address) -> Self {
        GovernCap { holder, ..self }
    }
}

impl Capability for OracleCap {
    fn id(&self) -> u64 {
        self.id
    }

    fn holder(&self) -> Address {
        self.holder
    }

    fn auth_key(&self) -> Address {
        self.auth_key
    }

    fn with_holder(self, holder: Address) -> Self {
        OracleCap { holder, ..self }
    }
}

/// Resolves a capability id presented by `caller` into a valid capability.
pub trait AuthorizedBy<C: Capability> {
    fn authorize(&self, cap_id: u64, caller: Address) -> Result<C, ProtocolError>;
}

/// Possession plus a matching auth key.
pub fn is_valid<C: Capability>(cap: &C, caller: Address, admin: Address) -> bool {
    cap.holder() == caller && cap.auth_key() == admin
}

/// Protocol configuration sub-module
#[odra::module(events = [
    PauseStateChanged,
    PointsRateChanged,
    GovernCapTransferred,
    OracleCapTransferred,
    OracleCapIssued,
    AdminRotated
])]
pub struct ProtocolConfig {
    /// Global pause switch
    paused: Var<bool>,
    /// Admin key capabilities are checked against
    admin: Var<Address>,
    /// Points per whole asset unit per epoch
    points_per_asset_per_epoch: Var<u64>,
    /// Governance capabilities by id
    govern_caps: Mapping<u64, GovernCap>,
    /// Oracle capabilities by id
    oracle_caps: Mapping<u64, OracleCap>,
    /// Next governance capability id (starts at 1)
    next_govern_cap_id: Var<u64>,
    /// Next oracle capability id (starts at 1)
    next_oracle_cap_id: Var<u64>,
}

impl ProtocolConfig {
    /// Set up the configuration and issue the first capabilities to `admin`.
    ///
    /// Returns `(govern_cap_id, oracle_cap_id)`.
    pub fn init(
        &mut self,
        admin: Address,
        points_per_asset_per_epoch: u64,
    ) -> Result<(u64, u64), ProtocolError> {
        if points_per_asset_per_epoch == 0 {
            return Err(ProtocolError::InvalidConfig);
        }
        self.paused.set(false);
        self.admin.set(admin);
        self.points_per_asset_per_epoch.set(points_per_asset_per_epoch);
        self.next_govern_cap_id.set(1);
        self.next_oracle_cap_id.set(1);

        let govern_cap_id = self.mint_govern_cap(admin, admin);
        let oracle_cap_id = self.mint_oracle_cap(admin, admin);
        Ok((govern_cap_id, oracle_cap_id))
    }

    // ========== Reads ==========

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    /// Fails with `ProtocolPaused` while the pause switch is on.
    pub fn assert_not_paused(&self) -> Result<(), ProtocolError> {
        if self.is_paused() {
            return Err(ProtocolError::ProtocolPaused);
        }
        Ok(())
    }

    pub fn admin(&self) -> Result<Address, ProtocolError> {
        self.admin.get().ok_or(ProtocolError::InvalidConfig)
    }

    pub fn points_per_asset_per_epoch(&self) -> u64 {
        self.points_per_asset_per_epoch.get_or_default()
    }

    pub fn snapshot(&self) -> Result<ConfigSnapshot, ProtocolError> {
        Ok(ConfigSnapshot {
            paused: self.is_paused(),
            admin: self.admin()?,
            points_per_asset_per_epoch: self.points_per_asset_per_epoch(),
        })
    }

    pub fn govern_cap(&self, cap_id: u64) -> Option<GovernCap> {
        self.govern_caps.get(&cap_id)
    }

    pub fn oracle_cap(&self, cap_id: u64) -> Option<OracleCap> {
        self.oracle_caps.get(&cap_id)
    }

    // ========== Governance ==========

    pub fn set_pause_state(
        &mut self,
        caller: Address,
        paused: bool,
        govern_cap_id: u64,
    ) -> Result<(), ProtocolError> {
        let _: GovernCap = self.authorize(govern_cap_id, caller)?;
        self.paused.set(paused);
        self.env().emit_event(PauseStateChanged { paused, by: caller });
        Ok(())
    }

    pub fn set_points_rate(
        &mut self,
        caller: Address,
        new_rate: u64,
        govern_cap_id: u64,
    ) -> Result<(), ProtocolError> {
        self.assert_not_paused()?;
        let _: GovernCap = self.authorize(govern_cap_id, caller)?;
        if new_rate == 0 {
            return Err(ProtocolError::InvalidConfig);
        }
        let old_rate = self.points_per_asset_per_epoch();
        self.points_per_asset_per_epoch.set(new_rate);
        self.env().emit_event(PointsRateChanged { old_rate, new_rate });
        Ok(())
    }

    pub fn transfer_govern_cap(
        &mut self,
        caller: Address,
        cap_id: u64,
        recipient: Address,
    ) -> Result<(), ProtocolError> {
        self.assert_not_paused()?;
        let cap: GovernCap = self.authorize(cap_id, caller)?;
        self.govern_caps.set(&cap_id, cap.with_holder(recipient));
        self.env().emit_event(GovernCapTransferred {
            cap_id,
            from: caller,
            to: recipient,
        });
        Ok(())
    }

    pub fn transfer_oracle_cap(
        &mut self,
        caller: Address,
        cap_id: u64,
        recipient: Address,
    ) -> Result<(), ProtocolError> {
        self.assert_not_paused()?;
        let cap: OracleCap = self.authorize(cap_id, caller)?;
        self.oracle_caps.set(&cap_id, cap.with_holder(recipient));
        self.env().emit_event(OracleCapTransferred {
            cap_id,
            from: caller,
            to: recipient,
        });
        Ok(())
    }

    /// Issue an additional oracle capability under the current admin key.
    pub fn issue_oracle_cap(
        &mut self,
        caller: Address,
        recipient: Address,
        govern_cap_id: u64,
    ) -> Result<u64, ProtocolError> {
        self.assert_not_paused()?;
        let _: GovernCap = self.authorize(govern_cap_id, caller)?;
        let admin = self.admin()?;
        let cap_id = self.mint_oracle_cap(recipient, admin);
        self.env().emit_event(OracleCapIssued {
            cap_id,
            holder: recipient,
        });
        Ok(cap_id)
    }

    /// Replace the admin key. Every outstanding capability stops validating;
    /// the new admin receives a fresh governance and oracle capability.
    ///
    /// Returns `(govern_cap_id, oracle_cap_id)` of the fresh capabilities.
    pub fn rotate_admin(
        &mut self,
        caller: Address,
        new_admin: Address,
        govern_cap_id: u64,
    ) -> Result<(u64, u64), ProtocolError> {
        self.assert_not_paused()?;
        let _: GovernCap = self.authorize(govern_cap_id, caller)?;
        let old_admin = self.admin()?;
        if new_admin == old_admin {
            return Err(ProtocolError::InvalidConfig);
        }
        self.admin.set(new_admin);
        let govern_cap_id = self.mint_govern_cap(new_admin, new_admin);
        let oracle_cap_id = self.mint_oracle_cap(new_admin, new_admin);
        self.env().emit_event(AdminRotated {
            old_admin,
            new_admin,
            govern_cap_id,
            oracle_cap_id,
        });
        Ok((govern_cap_id, oracle_cap_id))
    }

    // ========== Internal ==========

    fn mint_govern_cap(&mut self, holder: Address, auth_key: Address) -> u64 {
        let id = self.next_govern_cap_id.get().unwrap_or(1);
        self.next_govern_cap_id.set(id.saturating_add(1));
        self.govern_caps.set(&id, GovernCap { id, holder, auth_key });
        id
    }

    fn mint_oracle_cap(&mut self, holder: Address, auth_key: Address) -> u64 {
        let id = self.next_oracle_cap_id.get().unwrap_or(1);
        self.next_oracle_cap_id.set(id.saturating_add(1));
        self.oracle_caps.set(&id, OracleCap { id, holder, auth_key });
        id
    }

    fn check<C: Capability>(&self, cap: Option<C>, caller: Address) -> Result<C, ProtocolError> {
        let cap = cap.ok_or(ProtocolError::CapabilityNotFound)?;
        if !is_valid(&cap, caller, self.admin()?) {
            return Err(ProtocolError::Unauthorized);
        }
        Ok(cap)
    }
}

impl AuthorizedBy<GovernCap> for ProtocolConfig {
    fn authorize(&self, cap_id: u64, caller: Address) -> Result<GovernCap, ProtocolError> {
        self.check(self.govern_caps.get(&cap_id), caller)
    }
}

impl AuthorizedBy<OracleCap> for ProtocolConfig {
    fn authorize(&self, cap_id: u64, caller: Address) -> Result<OracleCap, ProtocolError> {
        self.check(self.oracle_caps.get(&cap_id), caller)
    }
}
