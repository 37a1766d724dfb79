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

//! Inventory management.
//!
//! A [`Product`] is a sellable item with a price and a unit count.
//! Stock is a `u32`, so it is non-negative by construction; every
//! decrement validates against the current count first. Products are
//! created by admins and never deleted.

use crate::base::ProductId;
use crate::error::StoreError;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: u32,
}

impl NewProduct {
    pub fn new(
        name: String,
        category: String,
        price: Decimal,
        description: Option<String>,
        stock: i64,
    ) -> Result<Self, StoreError> {
        if name.is_empty() {
            return Err(StoreError::MissingField("name"));
        }
        if category.is_empty() {
            return Err(StoreError::MissingField("category"));
        }
        if price < Decimal::ZERO {
            return Err(StoreError::InvalidPrice);
        }
        if stock < 0 || stock > u32::MAX as i64 {
            return Err(StoreError::InvalidStock);
        }
        Ok(Self {
            name,
            category,
            price,
            description,
            stock: stock as u32,
        })
    }
}

/// Allow-listed partial update for a product.
///
/// Unknown fields are rejected at deserialization; the id cannot be touched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    /// Field validation, separated from application so callers can check
    /// the whole update before touching any state (e.g. before a rename
    /// claims the name index).
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(name) = &self.name {
            if name.is_empty() {
                return Err(StoreError::MissingField("name"));
            }
        }
        if let Some(price) = self.price {
            if price < Decimal::ZERO {
                return Err(StoreError::InvalidPrice);
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 || stock > u32::MAX as i64 {
                return Err(StoreError::InvalidStock);
            }
        }
        Ok(())
    }
}

/// Serializable view of a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: u32,
}

#[derive(Debug)]
pub(crate) struct ProductData {
    id: ProductId,
    name: String,
    category: String,
    price: Decimal,
    description: Option<String>,
    stock: u32,
}

impl ProductData {
    fn assert_invariants(&self) {
        debug_assert!(
            self.price >= Decimal::ZERO,
            "Invariant violated: price went negative: {}",
            self.price
        );
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn price(&self) -> Decimal {
        self.price
    }

    pub(crate) fn stock(&self) -> u32 {
        self.stock
    }

    /// Removes one unit for a purchase. Returns the remaining stock.
    pub(crate) fn take_unit(&mut self) -> Result<u32, StoreError> {
        if self.stock == 0 {
            return Err(StoreError::OutOfStock);
        }
        self.stock -= 1;
        self.assert_invariants();
        Ok(self.stock)
    }

    /// Removes `quantity` units (manual inventory adjustment). Returns the
    /// remaining stock.
    pub(crate) fn remove_stock(&mut self, quantity: i64) -> Result<u32, StoreError> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity);
        }
        if quantity > self.stock as i64 {
            return Err(StoreError::NotEnoughStock);
        }
        self.stock -= quantity as u32;
        self.assert_invariants();
        Ok(self.stock)
    }

    /// Applies an allow-listed update. Validation runs before any field is
    /// written, so a rejected update changes nothing.
    pub(crate) fn apply_update(&mut self, update: &ProductUpdate) -> Result<(), StoreError> {
        update.validate()?;

        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(category) = &update.category {
            self.category = category.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(stock) = update.stock {
            self.stock = stock as u32;
        }
        self.assert_invariants();
        Ok(())
    }

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            description: self.description.clone(),
            stock: self.stock,
        }
    }
}

/// Catalog product with an interior row lock.
#[derive(Debug)]
pub struct Product {
    inner: Mutex<ProductData>,
}

impl Product {
    pub fn new(id: ProductId, new: NewProduct) -> Self {
        Self {
            inner: Mutex::new(ProductData {
                id,
                name: new.name,
                category: new.category,
                price: new.price,
                description: new.description,
                stock: new.stock,
            }),
        }
    }

    pub fn id(&self) -> ProductId {
        self.inner.lock().id
    }

    pub fn name(&self) -> String {
        self.inner.lock().name.clone()
    }

    pub fn price(&self) -> Decimal {
        self.inner.lock().price
    }

    pub fn stock(&self) -> u32 {
        self.inner.lock().stock
    }

    pub fn remove_stock(&self, quantity: i64) -> Result<u32, StoreError> {
        self.inner.lock().remove_stock(quantity)
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        self.inner.lock().snapshot()
    }

    /// Row lock for multi-entity operations (the purchase path). Lock order
    /// across entities is account before product.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ProductData> {
        self.inner.lock()
    }
}
