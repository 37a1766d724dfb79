// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Account management.
//!
//! An [`Account`] is a customer or admin identity with a wallet balance.
//! The wallet never goes negative: every mutation validates first and
//! asserts the invariant after.

use crate::base::{AccountId, Role};
use crate::error::StoreError;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Registration accepts ages 0..=120; profile updates accept 1..=149
/// (original service behavior, kept as-is).
const MAX_REGISTRATION_AGE: i64 = 120;
const MAX_UPDATE_AGE: i64 = 149;

/// Profile fields that travel together. Everything here is updatable
/// after creation; identity, credentials, wallet, and role are not.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub full_name: String,
    pub age: u8,
    pub address: String,
    pub gender: String,
    pub marital_status: String,
}

/// Validated registration input. Construction is the only path into the
/// accounts table, so field checks happen exactly once, here.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub username: String,
    pub password: String,
    pub profile: Profile,
}

impl NewCustomer {
    pub fn new(
        username: String,
        password: String,
        full_name: String,
        age: i64,
        address: String,
        gender: String,
        marital_status: String,
    ) -> Result<Self, StoreError> {
        if username.is_empty() {
            return Err(StoreError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(StoreError::MissingField("password"));
        }
        if !(0..=MAX_REGISTRATION_AGE).contains(&age) {
            return Err(StoreError::InvalidAge);
        }
        Ok(Self {
            username,
            password,
            profile: Profile {
                full_name,
                age: age as u8,
                address,
                gender,
                marital_status,
            },
        })
    }
}

/// Allow-listed partial update for an account profile.
///
/// Unknown fields are rejected at deserialization; id, username, password,
/// wallet, and role are deliberately absent so no request payload can
/// reach them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub age: Option<i64>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
}

/// Serializable view of an account, wallet rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub username: String,
    pub full_name: String,
    pub wallet: Decimal,
    pub age: u8,
    pub address: String,
    pub gender: String,
    pub marital_status: String,
    pub role: Role,
}

#[derive(Debug)]
pub(crate) struct AccountData {
    id: AccountId,
    username: String,
    password: String,
    profile: Profile,
    wallet: Decimal,
    role: Role,
}

impl AccountData {
    fn assert_invariants(&self) {
        debug_assert!(
            self.wallet >= Decimal::ZERO,
            "Invariant violated: wallet went negative: {}",
            self.wallet
        );
    }

    pub(crate) fn id(&self) -> AccountId {
        self.id
    }

    pub(crate) fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn wallet(&self) -> Decimal {
        self.wallet
    }

    /// Increases the wallet balance. Returns the new balance.
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<Decimal, StoreError> {
        if amount <= Decimal::ZERO {
            return Err(StoreError::InvalidAmount);
        }
        self.wallet += amount;
        self.assert_invariants();
        Ok(self.wallet)
    }

    /// Decreases the wallet balance. Returns the new balance.
    pub(crate) fn debit(&mut self, amount: Decimal) -> Result<Decimal, StoreError> {
        if amount <= Decimal::ZERO {
            return Err(StoreError::InvalidAmount);
        }
        if self.wallet < amount {
            return Err(StoreError::InsufficientFunds);
        }
        self.wallet -= amount;
        self.assert_invariants();
        Ok(self.wallet)
    }

    /// Applies an allow-listed profile update. All fields are validated
    /// before any of them is written, so a rejected update changes nothing.
    pub(crate) fn apply_update(&mut self, update: &ProfileUpdate) -> Result<(), StoreError> {
        if let Some(age) = update.age {
            if !(1..=MAX_UPDATE_AGE).contains(&age) {
                return Err(StoreError::InvalidAge);
            }
        }

        if let Some(full_name) = &update.full_name {
            self.profile.full_name = full_name.clone();
        }
        if let Some(age) = update.age {
            self.profile.age = age as u8;
        }
        if let Some(address) = &update.address {
            self.profile.address = address.clone();
        }
        if let Some(gender) = &update.gender {
            self.profile.gender = gender.clone();
        }
        if let Some(marital_status) = &update.marital_status {
            self.profile.marital_status = marital_status.clone();
        }
        Ok(())
    }

    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            username: self.username.clone(),
            full_name: self.profile.full_name.clone(),
            wallet: self.wallet.round_dp(Account::MONEY_PRECISION),
            age: self.profile.age,
            address: self.profile.address.clone(),
            gender: self.profile.gender.clone(),
            marital_status: self.profile.marital_status.clone(),
            role: self.role,
        }
    }
}

/// Store account with an interior row lock.
#[derive(Debug)]
pub struct Account {
    inner: Mutex<AccountData>,
}

impl Account {
    const MONEY_PRECISION: u32 = 2;

    pub fn new(
        id: AccountId,
        username: String,
        password: String,
        profile: Profile,
        role: Role,
        wallet: Decimal,
    ) -> Self {
        Self {
            inner: Mutex::new(AccountData {
                id,
                username,
                password,
                profile,
                wallet,
                role,
            }),
        }
    }

    pub fn id(&self) -> AccountId {
        self.inner.lock().id
    }

    pub fn username(&self) -> String {
        self.inner.lock().username.clone()
    }

    pub fn role(&self) -> Role {
        self.inner.lock().role
    }

    pub fn wallet(&self) -> Decimal {
        self.inner.lock().wallet
    }

    /// Plain credential comparison; hashing is out of scope for this service.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.inner.lock().password == candidate
    }

    pub fn credit(&self, amount: Decimal) -> Result<Decimal, StoreError> {
        self.inner.lock().credit(amount)
    }

    pub fn debit(&self, amount: Decimal) -> Result<Decimal, StoreError> {
        self.inner.lock().debit(amount)
    }

    pub fn apply_update(&self, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.inner.lock().apply_update(update)
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        self.inner.lock().snapshot()
    }

    /// Row lock for multi-entity operations (the purchase path). Lock order
    /// across entities is account before product.
    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.inner.lock()
    }
}
