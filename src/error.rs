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

//! Error types for store operations.
//!
//! The HTTP status mapping lives at the API boundary (`server` module);
//! this enum only distinguishes the failure kinds.

use thiserror::Error;

/// Store operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No session established for the request
    #[error("authentication required")]
    AuthenticationRequired,

    /// Unknown username or wrong password at login
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Wrong role or wrong owner for the operation
    #[error("access denied")]
    AccessDenied,

    /// Authors may not flag their own reviews
    #[error("you cannot flag your own review")]
    CannotFlagOwnReview,

    /// No matching customer account
    #[error("customer not found")]
    CustomerNotFound,

    /// No matching product
    #[error("product not found")]
    ProductNotFound,

    /// No matching review
    #[error("review not found")]
    ReviewNotFound,

    /// A required field is absent from the request
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Age outside the accepted range
    #[error("invalid age")]
    InvalidAge,

    /// Wallet amount is zero, negative, or not a number
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Price must be non-negative
    #[error("price must be a non-negative number")]
    InvalidPrice,

    /// Stock must be a non-negative integer
    #[error("stock must be a non-negative integer")]
    InvalidStock,

    /// Stock adjustment quantity is zero or negative
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// Rating outside 1..=5
    #[error("invalid rating (must be an integer from 1 to 5)")]
    InvalidRating,

    /// Username is already registered
    #[error("username already exists")]
    UsernameTaken,

    /// Product name is already in the catalog
    #[error("product name already exists")]
    ProductNameTaken,

    /// Purchase or deduction exceeds the wallet balance
    #[error("insufficient wallet balance")]
    InsufficientFunds,

    /// Purchase attempted against a product with zero stock
    #[error("product out of stock")]
    OutOfStock,

    /// Manual stock deduction exceeds the units on hand
    #[error("not enough stock available")]
    NotEnoughStock,
}
