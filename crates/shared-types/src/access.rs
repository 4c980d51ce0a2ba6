//! # Access Control
//!
//! Flat role table shared by every ledger component. Each component owns
//! its own `AccessControl` instance, so a role held on the registry says
//! nothing about the same role on the certificate ledger.
//!
//! ## Rules
//!
//! - Membership is keyed by `(Role, Address)`; there is no role hierarchy.
//! - Only `Admin` holders may grant or revoke roles.
//! - Any holder may renounce its own role.

use crate::entities::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Roles recognised by the ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Grants and revokes roles; may revoke any document.
    Admin,
    /// May revoke any document on the registry.
    DocumentManager,
    /// May engage and release the pause gate.
    Pauser,
    /// May swap the registry endpoint a certificate ledger resolves against.
    RegistryManager,
    /// May revoke certificates.
    CertificateManager,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::DocumentManager,
        Role::Pauser,
        Role::RegistryManager,
        Role::CertificateManager,
    ];

    /// Stable external name of the role.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN_ROLE",
            Role::DocumentManager => "DOCUMENT_MANAGER_ROLE",
            Role::Pauser => "PAUSER_ROLE",
            Role::RegistryManager => "REGISTRY_MANAGER_ROLE",
            Role::CertificateManager => "CERTIFICATE_MANAGER_ROLE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The account does not hold the required role.
    #[error("account {account} is missing role {role}")]
    MissingRole { account: Address, role: Role },

    /// The account holds none of the accepted roles.
    #[error("account {account} holds none of {roles:?}")]
    MissingAnyRole { account: Address, roles: Vec<Role> },

    /// Role grants to the zero address are rejected.
    #[error("cannot grant {role} to the zero address")]
    ZeroAccount { role: Role },
}

/// Role membership table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControl {
    members: HashMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table where `deployer` holds each of `roles`.
    #[must_use]
    pub fn with_deployer(deployer: Address, roles: &[Role]) -> Self {
        let mut table = Self::new();
        for role in roles {
            table.insert(*role, deployer);
        }
        table
    }

    /// Returns true if `account` holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(&account))
    }

    /// Fails with `MissingRole` unless `account` holds `role`.
    pub fn ensure_role(&self, role: Role, account: Address) -> Result<(), AccessError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(AccessError::MissingRole { account, role })
        }
    }

    /// Fails with `MissingAnyRole` unless `account` holds at least one of `roles`.
    pub fn ensure_any_role(&self, roles: &[Role], account: Address) -> Result<(), AccessError> {
        if roles.iter().any(|role| self.has_role(*role, account)) {
            Ok(())
        } else {
            Err(AccessError::MissingAnyRole {
                account,
                roles: roles.to_vec(),
            })
        }
    }

    /// Grants `role` to `account` on behalf of `caller`.
    ///
    /// Returns whether membership changed.
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, AccessError> {
        self.ensure_role(Role::Admin, caller)?;
        if account.is_zero() {
            return Err(AccessError::ZeroAccount { role });
        }
        Ok(self.insert(role, account))
    }

    /// Revokes `role` from `account` on behalf of `caller`.
    ///
    /// Returns whether membership changed.
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, AccessError> {
        self.ensure_role(Role::Admin, caller)?;
        Ok(self.remove(role, account))
    }

    /// Drops `role` from `caller` itself. Returns whether membership changed.
    pub fn renounce_role(&mut self, caller: Address, role: Role) -> bool {
        self.remove(role, caller)
    }

    /// Current holders of `role`, in ascending address order.
    #[must_use]
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn insert(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    fn remove(&mut self, role: Role, account: Address) -> bool {
        let Some(set) = self.members.get_mut(&role) else {
            return false;
        };
        let removed = set.remove(&account);
        if set.is_empty() {
            self.members.remove(&role);
        }
        removed
    }
}
