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

//! Store engine: accounts, inventory, reviews, and the purchase path.
//!
//! The [`Store`] owns the four tables (accounts, products, reviews, purchase
//! ledger) plus unique secondary indexes for usernames and product names.
//! Every read-check-write sequence runs under the affected rows' locks, so
//! two concurrent purchases of the last unit of stock cannot both succeed.
//!
//! # Invariants
//!
//! - Wallets and stock never go negative.
//! - Usernames and product names are unique (atomic claim via the map
//!   entry API).
//! - A purchase debits the wallet, decrements stock, and appends one ledger
//!   record together, or does none of them.
//! - Roles are fixed at account creation; no operation rewrites them.

use crate::account::{Account, AccountSnapshot, NewCustomer, Profile, ProfileUpdate};
use crate::base::{AccountId, ProductId, PurchaseId, ReviewId, Role};
use crate::error::StoreError;
use crate::ledger::PurchaseLedger;
use crate::product::{NewProduct, Product, ProductSnapshot, ProductUpdate};
use crate::review::{Review, ReviewSnapshot, ReviewUpdate, validate_rating};
use crate::session::AuthContext;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    pub purchase_id: PurchaseId,
    pub remaining_wallet: Decimal,
    pub remaining_stock: u32,
}

/// One row of a customer's purchase history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseEntry {
    pub product_name: String,
    pub purchase_time: DateTime<Utc>,
}

/// Catalog listing entry for in-stock products.
#[derive(Debug, Clone, Serialize)]
pub struct GoodListing {
    pub name: String,
    pub price: Decimal,
}

/// Expanded review view for the moderation/details endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDetails {
    pub review_id: ReviewId,
    pub product_name: String,
    pub customer_username: String,
    pub rating: u8,
    pub comment: Option<String>,
}

/// Admin resolution for a flagged review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Delete,
}

/// Central store managing accounts, inventory, reviews, and purchases.
pub struct Store {
    /// Accounts indexed by id.
    accounts: DashMap<AccountId, Account>,
    /// Unique username index.
    usernames: DashMap<String, AccountId>,
    /// Products indexed by id.
    products: DashMap<ProductId, Product>,
    /// Unique product name index; purchases resolve products by name.
    product_names: DashMap<String, ProductId>,
    /// Reviews indexed by id.
    reviews: DashMap<ReviewId, Review>,
    /// Append-only purchase history.
    ledger: PurchaseLedger,
    next_account_id: AtomicU32,
    next_product_id: AtomicU32,
    next_review_id: AtomicU32,
}

impl Store {
    pub fn new() -> Self {
        Store {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            products: DashMap::new(),
            product_names: DashMap::new(),
            reviews: DashMap::new(),
            ledger: PurchaseLedger::new(),
            next_account_id: AtomicU32::new(1),
            next_product_id: AtomicU32::new(1),
            next_review_id: AtomicU32::new(1),
        }
    }

    // === Accounts ===

    /// Registers a new customer. The role is always `Customer` and the
    /// wallet starts at zero; admins only come from [`Store::seed_admin`].
    pub fn register_customer(&self, new: NewCustomer) -> Result<AccountId, StoreError> {
        // Atomic check-and-claim on the username index prevents two
        // concurrent registrations from sharing a username.
        match self.usernames.entry(new.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UsernameTaken),
            Entry::Vacant(entry) => {
                let id = AccountId(self.next_account_id.fetch_add(1, Ordering::Relaxed));
                entry.insert(id);
                self.accounts.insert(
                    id,
                    Account::new(
                        id,
                        new.username,
                        new.password,
                        new.profile,
                        Role::Customer,
                        Decimal::ZERO,
                    ),
                );
                Ok(id)
            }
        }
    }

    /// Creates an admin account. Startup/bootstrap path only; there is no
    /// request route that produces an admin.
    pub fn seed_admin(
        &self,
        username: String,
        password: String,
        profile: Profile,
        wallet: Decimal,
    ) -> Result<AccountId, StoreError> {
        match self.usernames.entry(username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UsernameTaken),
            Entry::Vacant(entry) => {
                let id = AccountId(self.next_account_id.fetch_add(1, Ordering::Relaxed));
                entry.insert(id);
                self.accounts.insert(
                    id,
                    Account::new(id, username, password, profile, Role::Admin, wallet),
                );
                Ok(id)
            }
        }
    }

    /// Checks a username/password pair and returns the matching identity.
    /// Unknown usernames and wrong passwords are indistinguishable.
    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthContext, StoreError> {
        let id = self
            .usernames
            .get(username)
            .map(|entry| *entry.value())
            .ok_or(StoreError::InvalidCredentials)?;
        let account = self
            .accounts
            .get(&id)
            .ok_or(StoreError::InvalidCredentials)?;
        if !account.verify_password(password) {
            return Err(StoreError::InvalidCredentials);
        }
        Ok(AuthContext {
            account_id: id,
            username: username.to_string(),
            role: account.role(),
        })
    }

    /// All customer accounts. Admin only.
    pub fn customers(&self, auth: &AuthContext) -> Result<Vec<AccountSnapshot>, StoreError> {
        auth.require_role(Role::Admin)?;
        let mut customers: Vec<_> = self
            .accounts
            .iter()
            .filter(|entry| entry.value().role() == Role::Customer)
            .map(|entry| entry.value().snapshot())
            .collect();
        customers.sort_by_key(|snapshot| snapshot.id.0);
        Ok(customers)
    }

    /// Looks up one customer by username. Self or admin.
    pub fn customer_by_username(
        &self,
        auth: &AuthContext,
        username: &str,
    ) -> Result<AccountSnapshot, StoreError> {
        let id = self
            .usernames
            .get(username)
            .map(|entry| *entry.value())
            .ok_or(StoreError::CustomerNotFound)?;
        let account = self
            .accounts
            .get(&id)
            .ok_or(StoreError::CustomerNotFound)?;
        if account.role() != Role::Customer {
            return Err(StoreError::CustomerNotFound);
        }
        if auth.username != username && !auth.is_admin() {
            return Err(StoreError::AccessDenied);
        }
        Ok(account.snapshot())
    }

    /// Updates a customer profile. Customers may update themselves; admins
    /// may update any customer (but not other admins).
    pub fn update_customer(
        &self,
        auth: &AuthContext,
        id: AccountId,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError> {
        if auth.role == Role::Customer && auth.account_id != id {
            return Err(StoreError::AccessDenied);
        }
        let account = self
            .accounts
            .get(&id)
            .ok_or(StoreError::CustomerNotFound)?;
        if auth.is_admin() && account.role() != Role::Customer {
            return Err(StoreError::CustomerNotFound);
        }
        account.apply_update(update)
    }

    /// Deletes a customer account. Admin only; admin accounts cannot be
    /// deleted. Ledger records referencing the account survive.
    pub fn delete_customer(&self, auth: &AuthContext, id: AccountId) -> Result<(), StoreError> {
        auth.require_role(Role::Admin)?;
        {
            let account = self
                .accounts
                .get(&id)
                .ok_or(StoreError::CustomerNotFound)?;
            if account.role() != Role::Customer {
                return Err(StoreError::CustomerNotFound);
            }
        }
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.usernames.remove(&account.username());
        }
        Ok(())
    }

    // === Wallet adjustments ===

    /// Credits a customer's wallet. Self-service only.
    pub fn charge_wallet(
        &self,
        auth: &AuthContext,
        id: AccountId,
        amount: Decimal,
    ) -> Result<Decimal, StoreError> {
        auth.require_role(Role::Customer)?;
        let account = self
            .accounts
            .get(&id)
            .ok_or(StoreError::CustomerNotFound)?;
        auth.require_self(id)?;
        account.credit(amount)
    }

    /// Debits a customer's wallet. Self-service only; the wallet cannot go
    /// negative.
    pub fn deduct_wallet(
        &self,
        auth: &AuthContext,
        id: AccountId,
        amount: Decimal,
    ) -> Result<Decimal, StoreError> {
        auth.require_role(Role::Customer)?;
        let account = self
            .accounts
            .get(&id)
            .ok_or(StoreError::CustomerNotFound)?;
        auth.require_self(id)?;
        account.debit(amount)
    }

    // === Inventory ===

    /// Adds a product to the catalog. Admin only; names are unique because
    /// purchases resolve products by name.
    pub fn add_product(&self, auth: &AuthContext, new: NewProduct) -> Result<ProductId, StoreError> {
        auth.require_role(Role::Admin)?;
        let id = match self.product_names.entry(new.name.clone()) {
            Entry::Occupied(_) => return Err(StoreError::ProductNameTaken),
            Entry::Vacant(entry) => {
                let id = ProductId(self.next_product_id.fetch_add(1, Ordering::Relaxed));
                entry.insert(id);
                id
            }
        };
        // Row insert happens after the claim guard is released; holding the
        // name entry across it would invert the shard order taken by
        // update_product's rename path.
        self.products.insert(id, Product::new(id, new));
        Ok(id)
    }

    /// Manual stock decrement. Admin only. Returns the remaining stock.
    pub fn deduct_stock(
        &self,
        auth: &AuthContext,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<u32, StoreError> {
        auth.require_role(Role::Admin)?;
        let product = self
            .products
            .get(&product_id)
            .ok_or(StoreError::ProductNotFound)?;
        product.remove_stock(quantity)
    }

    /// Partial product update. Admin only. A rename re-claims the name
    /// index before releasing the old name.
    pub fn update_product(
        &self,
        auth: &AuthContext,
        product_id: ProductId,
        update: &ProductUpdate,
    ) -> Result<(), StoreError> {
        auth.require_role(Role::Admin)?;
        let product = self
            .products
            .get(&product_id)
            .ok_or(StoreError::ProductNotFound)?;
        update.validate()?;

        // A rename reads the current name and swaps the index entries under
        // the row lock; done outside it, two concurrent renames could each
        // release the old name and strand a stale index entry.
        let mut data = product.lock();
        if let Some(new_name) = &update.name {
            let old_name = data.name().to_string();
            if *new_name != old_name {
                match self.product_names.entry(new_name.clone()) {
                    Entry::Occupied(_) => return Err(StoreError::ProductNameTaken),
                    Entry::Vacant(entry) => {
                        entry.insert(product_id);
                    }
                }
                self.product_names.remove(&old_name);
            }
        }
        data.apply_update(update)
    }

    /// In-stock products, name and price only.
    pub fn available_goods(&self) -> Vec<GoodListing> {
        let mut goods: Vec<_> = self
            .products
            .iter()
            .filter(|entry| entry.value().stock() > 0)
            .map(|entry| GoodListing {
                name: entry.value().name(),
                price: entry.value().price(),
            })
            .collect();
        goods.sort_by(|a, b| a.name.cmp(&b.name));
        goods
    }

    /// Full details for one product.
    pub fn product_details(&self, product_id: ProductId) -> Result<ProductSnapshot, StoreError> {
        self.products
            .get(&product_id)
            .map(|entry| entry.value().snapshot())
            .ok_or(StoreError::ProductNotFound)
    }

    // === Purchases ===

    /// Executes a purchase: debit the wallet by the product price, remove
    /// one unit of stock, and append one ledger record.
    ///
    /// Preconditions are checked in order, each a distinct failure:
    /// 1. the product name resolves → [`StoreError::ProductNotFound`]
    /// 2. the caller is an existing customer → [`StoreError::CustomerNotFound`]
    /// 3. stock > 0 → [`StoreError::OutOfStock`]
    /// 4. wallet ≥ price → [`StoreError::InsufficientFunds`]
    ///
    /// All three mutations happen under both row locks, so the purchase is
    /// atomic: a failed precondition changes nothing, and a concurrent
    /// purchase of the last unit cannot interleave between the stock check
    /// and the decrement.
    pub fn purchase(
        &self,
        auth: &AuthContext,
        product_name: &str,
    ) -> Result<PurchaseOutcome, StoreError> {
        auth.require_role(Role::Customer)?;
        if product_name.is_empty() {
            return Err(StoreError::MissingField("product_name"));
        }

        let product_id = self
            .product_names
            .get(product_name)
            .map(|entry| *entry.value())
            .ok_or(StoreError::ProductNotFound)?;
        let account = self
            .accounts
            .get(&auth.account_id)
            .ok_or(StoreError::CustomerNotFound)?;
        let product = self
            .products
            .get(&product_id)
            .ok_or(StoreError::ProductNotFound)?;

        // Row locks, account before product. This is the only place in the
        // crate that holds two row locks at once.
        let mut account_data = account.lock();
        let mut product_data = product.lock();

        if product_data.stock() == 0 {
            return Err(StoreError::OutOfStock);
        }
        let price = product_data.price();
        if account_data.wallet() < price {
            return Err(StoreError::InsufficientFunds);
        }

        let remaining_wallet = if price > Decimal::ZERO {
            account_data.debit(price)?
        } else {
            account_data.wallet()
        };
        let remaining_stock = product_data.take_unit()?;
        let record = self.ledger.append(account_data.id(), product_id);

        Ok(PurchaseOutcome {
            purchase_id: record.id,
            remaining_wallet,
            remaining_stock,
        })
    }

    /// Purchase history for one customer, oldest first. Self or admin.
    pub fn purchase_history(
        &self,
        auth: &AuthContext,
        customer_id: AccountId,
    ) -> Result<Vec<PurchaseEntry>, StoreError> {
        auth.require_self_or_admin(customer_id)?;
        {
            let account = self
                .accounts
                .get(&customer_id)
                .ok_or(StoreError::CustomerNotFound)?;
            if account.role() != Role::Customer {
                return Err(StoreError::CustomerNotFound);
            }
        }
        Ok(self
            .ledger
            .for_customer(customer_id)
            .into_iter()
            .map(|record| PurchaseEntry {
                product_name: self
                    .products
                    .get(&record.product_id)
                    .map(|entry| entry.value().name())
                    .unwrap_or_else(|| "unknown".to_string()),
                purchase_time: record.purchase_time,
            })
            .collect())
    }

    /// Direct access to the purchase ledger.
    pub fn ledger(&self) -> &PurchaseLedger {
        &self.ledger
    }

    /// Number of account rows (all roles).
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    // === Reviews ===

    /// Submits a review for a product. Customer only; referential integrity
    /// to the product is checked before the row is created.
    pub fn submit_review(
        &self,
        auth: &AuthContext,
        product_id: ProductId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<ReviewId, StoreError> {
        auth.require_role(Role::Customer)?;
        // The token may outlive the account; a deleted customer must not
        // author rows with a dangling customer_id.
        if !self.accounts.contains_key(&auth.account_id) {
            return Err(StoreError::CustomerNotFound);
        }
        if !self.products.contains_key(&product_id) {
            return Err(StoreError::ProductNotFound);
        }
        let rating = validate_rating(rating)?;
        let id = ReviewId(self.next_review_id.fetch_add(1, Ordering::Relaxed));
        self.reviews.insert(
            id,
            Review::new(id, product_id, auth.account_id, rating, comment),
        );
        Ok(id)
    }

    /// Updates a review. Author only.
    pub fn update_review(
        &self,
        auth: &AuthContext,
        review_id: ReviewId,
        update: &ReviewUpdate,
    ) -> Result<(), StoreError> {
        let review = self
            .reviews
            .get(&review_id)
            .ok_or(StoreError::ReviewNotFound)?;
        if review.author() != auth.account_id {
            return Err(StoreError::AccessDenied);
        }
        review.apply_update(update)
    }

    /// Deletes a review. Author or admin.
    pub fn delete_review(&self, auth: &AuthContext, review_id: ReviewId) -> Result<(), StoreError> {
        {
            let review = self
                .reviews
                .get(&review_id)
                .ok_or(StoreError::ReviewNotFound)?;
            if review.author() != auth.account_id && !auth.is_admin() {
                return Err(StoreError::AccessDenied);
            }
        }
        self.reviews.remove(&review_id);
        Ok(())
    }

    /// Flags a review for moderation. Any authenticated user except the
    /// author; idempotent.
    pub fn flag_review(&self, auth: &AuthContext, review_id: ReviewId) -> Result<(), StoreError> {
        if !self.accounts.contains_key(&auth.account_id) {
            return Err(StoreError::CustomerNotFound);
        }
        let review = self
            .reviews
            .get(&review_id)
            .ok_or(StoreError::ReviewNotFound)?;
        review.flag(auth.account_id)
    }

    /// All reviews awaiting moderation. Admin only.
    pub fn flagged_reviews(&self, auth: &AuthContext) -> Result<Vec<ReviewSnapshot>, StoreError> {
        auth.require_role(Role::Admin)?;
        let mut flagged: Vec<_> = self
            .reviews
            .iter()
            .filter(|entry| entry.value().flagged())
            .map(|entry| entry.value().snapshot())
            .collect();
        flagged.sort_by_key(|snapshot| snapshot.review_id.0);
        Ok(flagged)
    }

    /// Resolves a flagged review. Admin only. Approving an active review is
    /// a no-op; deleting destroys the record.
    pub fn moderate_review(
        &self,
        auth: &AuthContext,
        review_id: ReviewId,
        action: ModerationAction,
    ) -> Result<(), StoreError> {
        auth.require_role(Role::Admin)?;
        match action {
            ModerationAction::Approve => {
                let review = self
                    .reviews
                    .get(&review_id)
                    .ok_or(StoreError::ReviewNotFound)?;
                review.approve();
            }
            ModerationAction::Delete => {
                self.reviews
                    .remove(&review_id)
                    .ok_or(StoreError::ReviewNotFound)?;
            }
        }
        Ok(())
    }

    /// All reviews for one product. Any authenticated user.
    pub fn product_reviews(&self, product_id: ProductId) -> Result<Vec<ReviewSnapshot>, StoreError> {
        if !self.products.contains_key(&product_id) {
            return Err(StoreError::ProductNotFound);
        }
        let mut reviews: Vec<_> = self
            .reviews
            .iter()
            .filter(|entry| entry.value().product() == product_id)
            .map(|entry| entry.value().snapshot())
            .collect();
        reviews.sort_by_key(|snapshot| snapshot.review_id.0);
        Ok(reviews)
    }

    /// All reviews written by one customer. Self or admin.
    pub fn customer_reviews(
        &self,
        auth: &AuthContext,
        customer_id: AccountId,
    ) -> Result<Vec<ReviewSnapshot>, StoreError> {
        auth.require_self_or_admin(customer_id)?;
        if !self.accounts.contains_key(&customer_id) {
            return Err(StoreError::CustomerNotFound);
        }
        let mut reviews: Vec<_> = self
            .reviews
            .iter()
            .filter(|entry| entry.value().author() == customer_id)
            .map(|entry| entry.value().snapshot())
            .collect();
        reviews.sort_by_key(|snapshot| snapshot.review_id.0);
        Ok(reviews)
    }

    /// Expanded view of one review. Author or admin.
    pub fn review_details(
        &self,
        auth: &AuthContext,
        review_id: ReviewId,
    ) -> Result<ReviewDetails, StoreError> {
        // Snapshot first and release the reviews shard before touching the
        // other tables; no map ref is held across a cross-table lookup.
        let snapshot = {
            let review = self
                .reviews
                .get(&review_id)
                .ok_or(StoreError::ReviewNotFound)?;
            review.snapshot()
        };
        if auth.account_id != snapshot.customer_id && !auth.is_admin() {
            return Err(StoreError::AccessDenied);
        }
        Ok(ReviewDetails {
            review_id: snapshot.review_id,
            product_name: self
                .products
                .get(&snapshot.product_id)
                .map(|entry| entry.value().name())
                .unwrap_or_else(|| "unknown".to_string()),
            customer_username: self
                .accounts
                .get(&snapshot.customer_id)
                .map(|entry| entry.value().username())
                .unwrap_or_else(|| "unknown".to_string()),
            rating: snapshot.rating,
            comment: snapshot.comment,
        })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
