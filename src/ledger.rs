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

//! Append-only purchase ledger.
//!
//! Every successful purchase appends exactly one [`PurchaseRecord`].
//! Records are never mutated or deleted, and they survive deletion of the
//! purchasing account.

use crate::base::{AccountId, ProductId, PurchaseId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Immutable ledger entry linking a customer to a purchased product.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRecord {
    pub id: PurchaseId,
    pub customer_id: AccountId,
    pub product_id: ProductId,
    pub purchase_time: DateTime<Utc>,
}

/// Thread-safe append-only ledger.
///
/// Ids come from a monotonic counter, so sorting by id recovers append
/// order without a separate queue.
#[derive(Debug)]
pub struct PurchaseLedger {
    records: DashMap<PurchaseId, Arc<PurchaseRecord>>,
    next_id: AtomicU32,
}

impl PurchaseLedger {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Appends one record and returns it. Infallible by design: the caller
    /// validates referential integrity before appending, and ids are unique
    /// by construction.
    pub(crate) fn append(
        &self,
        customer_id: AccountId,
        product_id: ProductId,
    ) -> Arc<PurchaseRecord> {
        let id = PurchaseId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = Arc::new(PurchaseRecord {
            id,
            customer_id,
            product_id,
            purchase_time: Utc::now(),
        });
        self.records.insert(id, Arc::clone(&record));
        record
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records for one customer, in purchase order.
    pub fn for_customer(&self, customer_id: AccountId) -> Vec<Arc<PurchaseRecord>> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|entry| entry.value().customer_id == customer_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Number of records referencing one product.
    pub fn count_for_product(&self, product_id: ProductId) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.value().product_id == product_id)
            .count()
    }
}

impl Default for PurchaseLedger {
    fn default() -> Self {
        Self::new()
    }
}
