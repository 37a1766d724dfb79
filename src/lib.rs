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

//! # Storefront
//!
//! This library provides an in-memory e-commerce backend: customer accounts
//! with wallets, an admin-managed product catalog, an atomic purchase path,
//! and review moderation, all behind a session-authenticated REST API.
//!
//! ## Core Components
//!
//! - [`Store`]: Central engine owning accounts, products, reviews, and the
//!   purchase ledger
//! - [`Account`]: Customer or admin identity with a non-negative wallet
//! - [`Product`]: Catalog item with a price and a unit count
//! - [`SessionStore`]: Bearer-token session table behind the HTTP layer
//! - [`StoreError`]: Error types for every operation failure
//!
//! ## Example
//!
//! ```
//! use storefront_rs::{NewCustomer, Store};
//! use rust_decimal_macros::dec;
//!
//! let store = Store::new();
//!
//! // Register a customer
//! let new = NewCustomer::new(
//!     "alice".to_string(),
//!     "hunter2".to_string(),
//!     "Alice Doe".to_string(),
//!     30,
//!     "12 Main St".to_string(),
//!     "Female".to_string(),
//!     "Single".to_string(),
//! )
//! .unwrap();
//! let id = store.register_customer(new).unwrap();
//!
//! // Verify the credentials and charge the wallet
//! let auth = store.verify_credentials("alice", "hunter2").unwrap();
//! let balance = store.charge_wallet(&auth, id, dec!(100.00)).unwrap();
//! assert_eq!(balance, dec!(100.00));
//! ```
//!
//! ## Thread Safety
//!
//! Tables are concurrent maps and every account, product, and review carries
//! its own row lock, so unrelated requests proceed in parallel. The purchase
//! path holds the buyer and product locks together, which makes the
//! check-debit-decrement sequence atomic under contention.

pub mod account;
mod base;
pub mod error;
mod ledger;
pub mod product;
pub mod review;
pub mod sanitize;
pub mod server;
mod session;
mod store;

pub use account::{Account, AccountSnapshot, NewCustomer, Profile, ProfileUpdate};
pub use base::{AccountId, ProductId, PurchaseId, ReviewId, Role};
pub use error::StoreError;
pub use ledger::{PurchaseLedger, PurchaseRecord};
pub use product::{NewProduct, Product, ProductSnapshot, ProductUpdate};
pub use review::{Review, ReviewSnapshot, ReviewStatus, ReviewUpdate};
pub use session::{AuthContext, SessionStore};
pub use store::{
    GoodListing, ModerationAction, PurchaseEntry, PurchaseOutcome, ReviewDetails, Store,
};
