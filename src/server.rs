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

//! REST API for the store.
//!
//! ## Endpoints
//!
//! - `POST /login`, `GET /logout` - session management
//! - `POST /customers/register` - create a customer
//! - `GET /customers` - list customers (admin)
//! - `GET/PUT/DELETE /customers/{..}` - account CRUD
//! - `POST /customers/{id}/charge`, `POST /customers/{id}/deduct` - wallet
//! - `POST /inventory/add`, `POST /inventory/deduct/{id}`,
//!   `PUT /inventory/update/{id}` - inventory (admin)
//! - `GET /sales/available-goods`, `GET /sales/good-details/{id}`,
//!   `POST /sales/purchase`, `GET /sales/purchase-history/{id}` - sales
//! - `/reviews/*` - review CRUD and moderation
//!
//! Authentication is a bearer token minted at login:
//!
//! ```bash
//! curl -X POST http://localhost:3000/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "hunter2"}'
//!
//! curl -X POST http://localhost:3000/sales/purchase \
//!   -H "Authorization: Bearer <token>" \
//!   -H "Content-Type: application/json" \
//!   -d '{"product_name": "Widget"}'
//! ```

use crate::account::{AccountSnapshot, NewCustomer, ProfileUpdate};
use crate::base::{AccountId, ProductId, ReviewId};
use crate::error::StoreError;
use crate::product::{NewProduct, ProductSnapshot, ProductUpdate};
use crate::review::{ReviewSnapshot, ReviewUpdate};
use crate::sanitize;
use crate::session::{AuthContext, SessionStore};
use crate::store::{
    GoodListing, ModerationAction, PurchaseEntry, ReviewDetails, Store,
};
use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::request::Parts,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

// === Application State ===

/// Shared application state containing the store and the session table.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Store::new()),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// === Error Handling ===

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Wrapper for converting [`StoreError`] and malformed requests into HTTP
/// responses.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
            }
            ApiError::Store(err) => {
                let (status, code) = match &err {
                    StoreError::AuthenticationRequired => {
                        (StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED")
                    }
                    StoreError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                    }
                    StoreError::AccessDenied => (StatusCode::FORBIDDEN, "ACCESS_DENIED"),
                    StoreError::CannotFlagOwnReview => {
                        (StatusCode::FORBIDDEN, "CANNOT_FLAG_OWN_REVIEW")
                    }
                    StoreError::CustomerNotFound => (StatusCode::NOT_FOUND, "CUSTOMER_NOT_FOUND"),
                    StoreError::ProductNotFound => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
                    StoreError::ReviewNotFound => (StatusCode::NOT_FOUND, "REVIEW_NOT_FOUND"),
                    StoreError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
                    StoreError::InvalidAge => (StatusCode::BAD_REQUEST, "INVALID_AGE"),
                    StoreError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
                    StoreError::InvalidPrice => (StatusCode::BAD_REQUEST, "INVALID_PRICE"),
                    StoreError::InvalidStock => (StatusCode::BAD_REQUEST, "INVALID_STOCK"),
                    StoreError::InvalidQuantity => (StatusCode::BAD_REQUEST, "INVALID_QUANTITY"),
                    StoreError::InvalidRating => (StatusCode::BAD_REQUEST, "INVALID_RATING"),
                    StoreError::UsernameTaken => (StatusCode::BAD_REQUEST, "USERNAME_TAKEN"),
                    StoreError::ProductNameTaken => {
                        (StatusCode::BAD_REQUEST, "PRODUCT_NAME_TAKEN")
                    }
                    StoreError::InsufficientFunds => {
                        (StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS")
                    }
                    StoreError::OutOfStock => (StatusCode::BAD_REQUEST, "OUT_OF_STOCK"),
                    StoreError::NotEnoughStock => (StatusCode::BAD_REQUEST, "NOT_ENOUGH_STOCK"),
                };
                (status, code, err.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Extractors ===

/// Authenticated identity, resolved once per request from the
/// `Authorization: Bearer <token>` header.
pub struct Authed(pub AuthContext);

impl FromRequestParts<AppState> for Authed {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Store(StoreError::AuthenticationRequired))?;
        let context = state
            .sessions
            .resolve(&token)
            .ok_or(ApiError::Store(StoreError::AuthenticationRequired))?;
        Ok(Authed(context))
    }
}

fn bearer_token(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// JSON body extractor that reports malformed payloads (bad types, unknown
/// fields, missing fields) as a structured 400 instead of a bare 422.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub age: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub marital_status: String,
}

/// Customer view without credentials or role.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: AccountId,
    pub username: String,
    pub full_name: String,
    pub wallet: Decimal,
    pub age: u8,
    pub address: String,
    pub gender: String,
    pub marital_status: String,
}

impl From<AccountSnapshot> for CustomerResponse {
    fn from(snapshot: AccountSnapshot) -> Self {
        Self {
            id: snapshot.id,
            username: snapshot.username,
            full_name: snapshot.full_name,
            wallet: snapshot.wallet,
            age: snapshot.age,
            address: snapshot.address,
            gender: snapshot.gender,
            marital_status: snapshot.marital_status,
        }
    }
}

/// Abbreviated customer row for the admin listing.
#[derive(Debug, Serialize)]
pub struct CustomerListEntry {
    pub id: AccountId,
    pub username: String,
    pub full_name: String,
    pub wallet: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub message: String,
    pub new_balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: i64,
}

#[derive(Debug, Serialize)]
pub struct AddProductResponse {
    pub message: String,
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub message: String,
    pub remaining_stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub product_name: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub message: String,
    pub remaining_wallet_balance: Decimal,
    pub remaining_stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub product_id: u32,
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub message: String,
    pub review_id: ReviewId,
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub action: ModerationAction,
}

// === Session Handlers ===

/// POST /login - establish a session.
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = sanitize::clean(&request.username);
    let password = sanitize::clean(&request.password);

    match state.sessions.login(&state.store, &username, &password) {
        Ok((token, context)) => {
            tracing::info!(username = %context.username, role = %context.role, "login");
            Ok(Json(LoginResponse {
                message: "Logged in successfully".to_string(),
                token,
            }))
        }
        Err(err) => {
            tracing::warn!(username = %username, "failed login attempt");
            Err(err.into())
        }
    }
}

/// GET /logout - clear the session, if any.
async fn logout(State(state): State<AppState>, parts: Parts) -> Json<MessageResponse> {
    if let Some(token) = bearer_token(&parts) {
        state.sessions.logout(&token);
    }
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

// === Customer Handlers ===

/// POST /customers/register - create a customer account.
async fn register_customer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let new = NewCustomer::new(
        sanitize::clean(&request.username),
        sanitize::clean(&request.password),
        sanitize::clean(&request.full_name),
        request.age,
        sanitize::clean(&request.address),
        sanitize::clean(&request.gender),
        sanitize::clean(&request.marital_status),
    )?;
    state.store.register_customer(new)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Customer registered successfully".to_string(),
        }),
    ))
}

/// GET /customers - list all customers (admin).
async fn list_customers(
    State(state): State<AppState>,
    Authed(auth): Authed,
) -> Result<Json<Vec<CustomerListEntry>>, ApiError> {
    let customers = state.store.customers(&auth)?;
    Ok(Json(
        customers
            .into_iter()
            .map(|snapshot| CustomerListEntry {
                id: snapshot.id,
                username: snapshot.username,
                full_name: snapshot.full_name,
                wallet: snapshot.wallet,
            })
            .collect(),
    ))
}

/// GET /customers/{username} - fetch one customer (self or admin).
async fn get_customer(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(username): Path<String>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let snapshot = state.store.customer_by_username(&auth, &username)?;
    Ok(Json(snapshot.into()))
}

/// PUT /customers/{id} - update a customer profile.
async fn update_customer(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(id): Path<u32>,
    ApiJson(mut update): ApiJson<ProfileUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    update.full_name = sanitize::clean_opt(update.full_name);
    update.address = sanitize::clean_opt(update.address);
    update.gender = sanitize::clean_opt(update.gender);
    update.marital_status = sanitize::clean_opt(update.marital_status);

    state.store.update_customer(&auth, AccountId(id), &update)?;
    Ok(MessageResponse::new("Customer updated successfully"))
}

/// DELETE /customers/{id} - delete a customer (admin).
async fn delete_customer(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(id): Path<u32>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_customer(&auth, AccountId(id))?;
    // Any live tokens for the deleted account stop resolving immediately
    state.sessions.revoke_account(AccountId(id));
    Ok(MessageResponse::new("Customer deleted successfully"))
}

/// POST /customers/{id}/charge - credit the caller's wallet.
async fn charge_wallet(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(id): Path<u32>,
    ApiJson(request): ApiJson<AmountRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .store
        .charge_wallet(&auth, AccountId(id), request.amount)?;
    Ok(Json(BalanceResponse {
        message: format!("Wallet charged by {}. New balance: {}", request.amount, balance),
        new_balance: balance,
    }))
}

/// POST /customers/{id}/deduct - debit the caller's wallet.
async fn deduct_wallet(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(id): Path<u32>,
    ApiJson(request): ApiJson<AmountRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .store
        .deduct_wallet(&auth, AccountId(id), request.amount)?;
    Ok(Json(BalanceResponse {
        message: format!("Wallet deducted by {}. New balance: {}", request.amount, balance),
        new_balance: balance,
    }))
}

// === Inventory Handlers ===

/// POST /inventory/add - create a product (admin).
async fn add_product(
    State(state): State<AppState>,
    Authed(auth): Authed,
    ApiJson(request): ApiJson<AddProductRequest>,
) -> Result<Json<AddProductResponse>, ApiError> {
    let new = NewProduct::new(
        sanitize::clean(&request.name),
        request.category,
        request.price,
        sanitize::clean_opt(request.description),
        request.stock,
    )?;
    let product_id = state.store.add_product(&auth, new)?;
    Ok(Json(AddProductResponse {
        message: "Product added successfully".to_string(),
        product_id,
    }))
}

/// POST /inventory/deduct/{id} - manual stock decrement (admin).
async fn deduct_stock(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(product_id): Path<u32>,
    ApiJson(request): ApiJson<QuantityRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let remaining = state
        .store
        .deduct_stock(&auth, ProductId(product_id), request.quantity)?;
    Ok(Json(StockResponse {
        message: format!(
            "Deducted {} items from stock. Remaining stock: {}",
            request.quantity, remaining
        ),
        remaining_stock: remaining,
    }))
}

/// PUT /inventory/update/{id} - partial product update (admin).
async fn update_product(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(product_id): Path<u32>,
    ApiJson(mut update): ApiJson<ProductUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    update.name = sanitize::clean_opt(update.name);
    update.category = sanitize::clean_opt(update.category);
    update.description = sanitize::clean_opt(update.description);

    state
        .store
        .update_product(&auth, ProductId(product_id), &update)?;
    Ok(MessageResponse::new("Product updated successfully"))
}

// === Sales Handlers ===

/// GET /sales/available-goods - list in-stock products.
async fn available_goods(
    State(state): State<AppState>,
    Authed(_auth): Authed,
) -> Json<Vec<GoodListing>> {
    Json(state.store.available_goods())
}

/// GET /sales/good-details/{id} - full product details.
async fn good_details(
    State(state): State<AppState>,
    Authed(_auth): Authed,
    Path(product_id): Path<u32>,
) -> Result<Json<ProductSnapshot>, ApiError> {
    let snapshot = state.store.product_details(ProductId(product_id))?;
    Ok(Json(snapshot))
}

/// POST /sales/purchase - execute a purchase for the calling customer.
async fn purchase(
    State(state): State<AppState>,
    Authed(auth): Authed,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let product_name = sanitize::clean(&request.product_name);
    let outcome = state.store.purchase(&auth, &product_name)?;
    tracing::info!(
        customer = %auth.username,
        product = %product_name,
        purchase_id = %outcome.purchase_id,
        "purchase completed"
    );
    Ok(Json(PurchaseResponse {
        message: "Purchase successful".to_string(),
        remaining_wallet_balance: outcome.remaining_wallet,
        remaining_stock: outcome.remaining_stock,
    }))
}

/// GET /sales/purchase-history/{id} - ledger entries for one customer.
async fn purchase_history(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(customer_id): Path<u32>,
) -> Result<Json<Vec<PurchaseEntry>>, ApiError> {
    let history = state
        .store
        .purchase_history(&auth, AccountId(customer_id))?;
    Ok(Json(history))
}

// === Review Handlers ===

/// POST /reviews/submit - create a review.
async fn submit_review(
    State(state): State<AppState>,
    Authed(auth): Authed,
    ApiJson(request): ApiJson<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>, ApiError> {
    let review_id = state.store.submit_review(
        &auth,
        ProductId(request.product_id),
        request.rating,
        sanitize::clean_opt(request.comment),
    )?;
    Ok(Json(SubmitReviewResponse {
        message: "Review submitted successfully".to_string(),
        review_id,
    }))
}

/// PUT /reviews/update/{id} - update own review.
async fn update_review(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(review_id): Path<u32>,
    ApiJson(mut update): ApiJson<ReviewUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    update.comment = sanitize::clean_opt(update.comment);
    state
        .store
        .update_review(&auth, ReviewId(review_id), &update)?;
    Ok(MessageResponse::new("Review updated successfully"))
}

/// DELETE /reviews/delete/{id} - delete a review (owner or admin).
async fn delete_review(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(review_id): Path<u32>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_review(&auth, ReviewId(review_id))?;
    Ok(MessageResponse::new("Review deleted successfully"))
}

/// GET /reviews/product/{id} - all reviews for a product.
async fn product_reviews(
    State(state): State<AppState>,
    Authed(_auth): Authed,
    Path(product_id): Path<u32>,
) -> Result<Json<Vec<ReviewSnapshot>>, ApiError> {
    let reviews = state.store.product_reviews(ProductId(product_id))?;
    Ok(Json(reviews))
}

/// GET /reviews/customer/{id} - all reviews by a customer (self or admin).
async fn customer_reviews(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(customer_id): Path<u32>,
) -> Result<Json<Vec<ReviewSnapshot>>, ApiError> {
    let reviews = state
        .store
        .customer_reviews(&auth, AccountId(customer_id))?;
    Ok(Json(reviews))
}

/// POST /reviews/flag/{id} - report a review for moderation.
async fn flag_review(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(review_id): Path<u32>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.flag_review(&auth, ReviewId(review_id))?;
    Ok(MessageResponse::new("Review flagged successfully"))
}

/// GET /reviews/flagged - reviews awaiting moderation (admin).
async fn flagged_reviews(
    State(state): State<AppState>,
    Authed(auth): Authed,
) -> Result<Json<Vec<ReviewSnapshot>>, ApiError> {
    let reviews = state.store.flagged_reviews(&auth)?;
    Ok(Json(reviews))
}

/// PUT /reviews/moderate/{id} - approve or delete a flagged review (admin).
async fn moderate_review(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(review_id): Path<u32>,
    ApiJson(request): ApiJson<ModerateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store
        .moderate_review(&auth, ReviewId(review_id), request.action)?;
    let message = match request.action {
        ModerationAction::Approve => "Review approved successfully",
        ModerationAction::Delete => "Review deleted successfully",
    };
    Ok(MessageResponse::new(message))
}

/// GET /reviews/details/{id} - expanded review view (author or admin).
async fn review_details(
    State(state): State<AppState>,
    Authed(auth): Authed,
    Path(review_id): Path<u32>,
) -> Result<Json<ReviewDetails>, ApiError> {
    let details = state.store.review_details(&auth, ReviewId(review_id))?;
    Ok(Json(details))
}

// === Router ===

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/customers/register", post(register_customer))
        .route("/customers", get(list_customers))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/customers/{id}/charge", post(charge_wallet))
        .route("/customers/{id}/deduct", post(deduct_wallet))
        .route("/inventory/add", post(add_product))
        .route("/inventory/deduct/{id}", post(deduct_stock))
        .route("/inventory/update/{id}", axum::routing::put(update_product))
        .route("/sales/available-goods", get(available_goods))
        .route("/sales/good-details/{id}", get(good_details))
        .route("/sales/purchase", post(purchase))
        .route("/sales/purchase-history/{id}", get(purchase_history))
        .route("/reviews/submit", post(submit_review))
        .route("/reviews/update/{id}", axum::routing::put(update_review))
        .route("/reviews/delete/{id}", axum::routing::delete(delete_review))
        .route("/reviews/product/{id}", get(product_reviews))
        .route("/reviews/customer/{id}", get(customer_reviews))
        .route("/reviews/flag/{id}", post(flag_review))
        .route("/reviews/flagged", get(flagged_reviews))
        .route("/reviews/moderate/{id}", axum::routing::put(moderate_review))
        .route("/reviews/details/{id}", get(review_details))
        .with_state(state)
}

/// Serves the API on an already-bound listener until shutdown.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
