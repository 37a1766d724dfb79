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

//! Session-based authentication.
//!
//! Login mints an opaque token mapped to an [`AuthContext`]; the context is
//! resolved once per request and passed into handlers by value. There is no
//! process-wide mutable session state beyond this table, and no secondary
//! identity path (e.g. a plain username header).

use crate::base::{AccountId, Role};
use crate::error::StoreError;
use crate::store::Store;
use dashmap::DashMap;
use uuid::Uuid;

/// Authenticated identity for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: AccountId,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Caller must hold exactly this role.
    pub fn require_role(&self, role: Role) -> Result<(), StoreError> {
        if self.role == role {
            Ok(())
        } else {
            Err(StoreError::AccessDenied)
        }
    }

    /// Caller must be the named account.
    pub fn require_self(&self, id: AccountId) -> Result<(), StoreError> {
        if self.account_id == id {
            Ok(())
        } else {
            Err(StoreError::AccessDenied)
        }
    }

    /// Caller must be the named account or an admin.
    pub fn require_self_or_admin(&self, id: AccountId) -> Result<(), StoreError> {
        if self.account_id == id || self.is_admin() {
            Ok(())
        } else {
            Err(StoreError::AccessDenied)
        }
    }
}

/// Server-side session table keyed by opaque v4 tokens.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, AuthContext>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Verifies credentials against the store and establishes a session.
    pub fn login(
        &self,
        store: &Store,
        username: &str,
        password: &str,
    ) -> Result<(Uuid, AuthContext), StoreError> {
        let context = store.verify_credentials(username, password)?;
        let token = Uuid::new_v4();
        self.sessions.insert(token, context.clone());
        Ok((token, context))
    }

    /// Revokes a session. Returns whether a session existed.
    pub fn logout(&self, token: &Uuid) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Revokes every session belonging to one account. Tokens must not
    /// outlive the account they authenticate.
    pub fn revoke_account(&self, account_id: AccountId) {
        self.sessions.retain(|_, context| context.account_id != account_id);
    }

    /// Resolves a token to its identity, if the session is live.
    pub fn resolve(&self, token: &Uuid) -> Option<AuthContext> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }
}
