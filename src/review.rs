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

//! Review moderation.
//!
//! State machine:
//! - `Active` → `Flagged` (via flag, any authenticated non-author; idempotent)
//! - `Flagged` → `Active` (via approve, admin; approving an active review is a no-op)
//! - any state → removed (via delete, owner or admin; record destroyed)

use crate::base::{AccountId, ProductId, ReviewId};
use crate::error::StoreError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Moderation state of a review. A removed review has no state: the record
/// is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Active,
    Flagged,
}

/// Validated rating value, 1 to 5 inclusive.
pub fn validate_rating(rating: i64) -> Result<u8, StoreError> {
    if (1..=5).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(StoreError::InvalidRating)
    }
}

/// Partial update for a review, restricted to its author.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewUpdate {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Serializable view of a review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSnapshot {
    pub review_id: ReviewId,
    pub product_id: ProductId,
    pub customer_id: AccountId,
    pub rating: u8,
    pub comment: Option<String>,
    pub flagged: bool,
}

#[derive(Debug)]
struct ReviewData {
    id: ReviewId,
    product_id: ProductId,
    customer_id: AccountId,
    rating: u8,
    comment: Option<String>,
    status: ReviewStatus,
}

/// Customer feedback on a product.
#[derive(Debug)]
pub struct Review {
    inner: Mutex<ReviewData>,
}

impl Review {
    pub fn new(
        id: ReviewId,
        product_id: ProductId,
        customer_id: AccountId,
        rating: u8,
        comment: Option<String>,
    ) -> Self {
        Self {
            inner: Mutex::new(ReviewData {
                id,
                product_id,
                customer_id,
                rating,
                comment,
                status: ReviewStatus::Active,
            }),
        }
    }

    pub fn author(&self) -> AccountId {
        self.inner.lock().customer_id
    }

    pub fn product(&self) -> ProductId {
        self.inner.lock().product_id
    }

    pub fn status(&self) -> ReviewStatus {
        self.inner.lock().status
    }

    pub fn flagged(&self) -> bool {
        self.inner.lock().status == ReviewStatus::Flagged
    }

    /// Reports the review for moderation. Authors cannot flag their own
    /// reviews; flagging an already-flagged review is a no-op.
    pub fn flag(&self, by: AccountId) -> Result<(), StoreError> {
        let mut data = self.inner.lock();
        if data.customer_id == by {
            return Err(StoreError::CannotFlagOwnReview);
        }
        data.status = ReviewStatus::Flagged;
        Ok(())
    }

    /// Clears the flagged state. Approving an active review is a no-op.
    pub fn approve(&self) {
        self.inner.lock().status = ReviewStatus::Active;
    }

    pub fn apply_update(&self, update: &ReviewUpdate) -> Result<(), StoreError> {
        let mut data = self.inner.lock();
        if let Some(rating) = update.rating {
            data.rating = validate_rating(rating)?;
        }
        if let Some(comment) = &update.comment {
            data.comment = Some(comment.clone());
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ReviewSnapshot {
        let data = self.inner.lock();
        ReviewSnapshot {
            review_id: data.id,
            product_id: data.product_id,
            customer_id: data.customer_id,
            rating: data.rating,
            comment: data.comment.clone(),
            flagged: data.status == ReviewStatus::Flagged,
        }
    }
}
