//! Transaction handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledger_core::{IdempotencyKey, NewTransaction, Transaction, TxId, TxStatus};
use ledger_store::{keys, Cursor};

use crate::auth::{AdminAuth, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Create transaction request body.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Amount to record. Required and non-zero.
    pub amount: Option<Decimal>,
    /// ISO currency code (defaults to ARS).
    pub currency: Option<String>,
    /// Opaque structured payload (defaults to an empty object).
    pub data: Option<serde_json::Value>,
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction id.
    pub tx_id: String,
    /// Owning user.
    pub user_id: String,
    /// Amount.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Processing status.
    pub status: TxStatus,
    /// Creation timestamp (ISO-8601).
    pub created_at: String,
    /// Opaque structured payload.
    pub data: serde_json::Value,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            tx_id: tx.tx_id.to_string(),
            user_id: tx.user_id.to_string(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            status: tx.status,
            created_at: keys::iso_timestamp(tx.created_at),
            data: tx.data.clone(),
        }
    }
}

/// Record a new transaction for the authenticated user.
///
/// An optional `Idempotency-Key` header guarantees the transaction is
/// recorded exactly once per token; a retried request returns the
/// originally recorded transaction.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(body): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let amount = body
        .amount
        .filter(|amount| !amount.is_zero())
        .ok_or_else(|| ApiError::BadRequest("amount required".into()))?;

    let idempotency_key = idempotency_key(&headers)?;

    let mut new = NewTransaction::new(amount);
    if let Some(currency) = body.currency.filter(|c| !c.is_empty()) {
        new.currency = currency;
    }
    if let Some(data) = body.data {
        new.data = data;
    }

    let tx = state
        .transactions
        .create(&auth.user_id, new, idempotency_key.as_ref())?;

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(&tx))))
}

/// Extract and validate the optional `Idempotency-Key` header.
fn idempotency_key(headers: &HeaderMap) -> Result<Option<IdempotencyKey>, ApiError> {
    let Some(value) = headers.get("idempotency-key") else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.parse().ok())
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest("invalid Idempotency-Key header".into()))
}

/// Fetch a transaction by id.
///
/// Only the owning user may view a transaction, unless the request carries
/// a valid admin key.
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    admin: Option<AdminAuth>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let not_found = || ApiError::NotFound("Transaction not found".into());

    // A malformed id cannot name a transaction.
    let tx_id: TxId = id.parse().map_err(|_| not_found())?;

    let tx = state.transactions.get(&tx_id)?.ok_or_else(not_found)?;

    if tx.user_id != auth.user_id && admin.is_none() {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(TransactionResponse::from(&tx)))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 20, max: 100).
    pub limit: Option<usize>,
    /// Continuation cursor from a previous page, passed back verbatim.
    pub cursor: Option<Cursor>,
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions, newest first.
    pub items: Vec<TransactionResponse>,
    /// Cursor for the next page; absent at end of stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// List the authenticated user's transactions, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let page = state
        .transactions
        .list_by_user(&auth.user_id, query.limit, query.cursor.as_ref())?;

    Ok(Json(ListTransactionsResponse {
        items: page.items.iter().map(TransactionResponse::from).collect(),
        next_cursor: page.next_cursor.map(|cursor| cursor.to_string()),
    }))
}

/// Global transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct GlobalTransactionsQuery {
    /// Maximum number of transactions to return (default: 10, max: 100).
    pub limit: Option<usize>,
}

/// Global transactions response.
#[derive(Debug, Serialize)]
pub struct GlobalTransactionsResponse {
    /// The most recently created transactions system-wide, newest first.
    pub items: Vec<TransactionResponse>,
}

/// List the most recent transactions system-wide. Requires authentication
/// but is not scoped to the caller.
pub async fn list_global_transactions(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<GlobalTransactionsQuery>,
) -> Result<Json<GlobalTransactionsResponse>, ApiError> {
    let items = state.transactions.list_global_recent(query.limit)?;

    Ok(Json(GlobalTransactionsResponse {
        items: items.iter().map(TransactionResponse::from).collect(),
    }))
}
