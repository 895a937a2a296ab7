//! REST API handlers for ledger operations

use crate::api::websocket::WsBroadcaster;
use crate::storage::Storage;
use crate::token::{AccountId, Amount, EventRecord, SharedLedger};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub ledger: SharedLedger,
    pub storage: Arc<Storage>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
    /// Serializes snapshot-and-write so the file never goes back in time
    pub save_lock: Arc<Mutex<()>>,
}

impl ApiState {
    /// Build the state and subscribe the WebSocket broadcaster to the ledger
    pub fn new(ledger: SharedLedger, storage: Arc<Storage>) -> Self {
        let ws_broadcaster = Arc::new(WsBroadcaster::new());
        ledger.subscribe(ws_broadcaster.clone());

        Self {
            ledger,
            storage,
            ws_broadcaster,
            save_lock: Arc::new(Mutex::new(())),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Serialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    pub creator: AccountId,
    pub holder_count: usize,
    pub event_count: usize,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub account: AccountId,
    pub balance: String,
    pub display: String,
}

#[derive(Serialize)]
pub struct AllowanceResponse {
    pub owner: AccountId,
    pub spender: AccountId,
    pub allowance: String,
}

/// Transfer request; `caller` is trusted as the sender
#[derive(Deserialize)]
pub struct TransferRequest {
    pub caller: String,
    pub to: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub caller: String,
    pub spender: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct TransferFromRequest {
    pub caller: String,
    pub from: String,
    pub to: String,
    pub amount: String,
}

/// `persisted` is false when the operation was applied but the save failed
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub persisted: bool,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub success: bool,
    pub persisted: bool,
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub since: Option<u64>,
}

// ============================================================================
// Helpers
// ============================================================================

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

fn parse_account(field: &str, value: &str) -> Result<AccountId, (StatusCode, Json<ApiError>)> {
    value.trim().parse::<AccountId>().map_err(|_| {
        error(
            StatusCode::BAD_REQUEST,
            format!("Invalid {}: {}", field, value),
        )
    })
}

/// Amounts travel as decimal strings of minimal units
fn parse_amount(value: &str) -> Result<Amount, (StatusCode, Json<ApiError>)> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(error(StatusCode::BAD_REQUEST, "Invalid amount"));
    }
    Amount::from_str_radix(value, 10).map_err(|_| error(StatusCode::BAD_REQUEST, "Invalid amount"))
}

/// Write the current ledger state to disk on the blocking pool.
///
/// A failed save is logged and reported as `false`; the operation that
/// preceded it stays applied.
async fn persist(state: &ApiState) -> bool {
    let ledger = state.ledger.clone();
    let storage = state.storage.clone();
    let save_lock = state.save_lock.clone();

    let result = tokio::task::spawn_blocking(move || {
        let _guard = save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = ledger.snapshot();
        storage.save(&snapshot)
    })
    .await;

    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::error!("Failed to persist ledger: {}", e);
            false
        }
        Err(e) => {
            log::error!("Persist task failed: {}", e);
            false
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/token - Token metadata and supply
pub async fn get_token_info(State(state): State<ApiState>) -> Json<TokenInfo> {
    let info = state.ledger.with(|ledger| TokenInfo {
        name: ledger.name().to_string(),
        symbol: ledger.symbol().to_string(),
        decimals: ledger.decimals(),
        total_supply: ledger.total_supply().to_string(),
        creator: ledger.creator(),
        holder_count: ledger.holder_count(),
        event_count: ledger.events().len(),
    });

    Json(info)
}

/// GET /api/balances/{account}
pub async fn get_balance(
    State(state): State<ApiState>,
    Path(account): Path<String>,
) -> ApiResult<BalanceResponse> {
    let account = parse_account("account", &account)?;

    let (balance, display) = state.ledger.with(|ledger| {
        let balance = ledger.balance_of(&account);
        (balance, ledger.metadata().format_amount(balance))
    });

    Ok(Json(BalanceResponse {
        account,
        balance: balance.to_string(),
        display,
    }))
}

/// GET /api/allowances/{owner}/{spender}
pub async fn get_allowance(
    State(state): State<ApiState>,
    Path((owner, spender)): Path<(String, String)>,
) -> ApiResult<AllowanceResponse> {
    let owner = parse_account("owner", &owner)?;
    let spender = parse_account("spender", &spender)?;

    Ok(Json(AllowanceResponse {
        owner,
        spender,
        allowance: state.ledger.allowance(&owner, &spender).to_string(),
    }))
}

/// POST /api/transfer
pub async fn transfer(
    State(state): State<ApiState>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferResponse> {
    let caller = parse_account("caller", &req.caller)?;
    let to = parse_account("to", &req.to)?;
    let amount = parse_amount(&req.amount)?;

    let success = state
        .ledger
        .transfer(caller, to, amount)
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let persisted = persist(&state).await;

    Ok(Json(TransferResponse {
        success,
        persisted,
        from: caller,
        to,
        amount: amount.to_string(),
    }))
}

/// POST /api/approve
pub async fn approve(
    State(state): State<ApiState>,
    Json(req): Json<ApproveRequest>,
) -> ApiResult<ApproveResponse> {
    let caller = parse_account("caller", &req.caller)?;
    let spender = parse_account("spender", &req.spender)?;
    let amount = parse_amount(&req.amount)?;

    let success = state
        .ledger
        .approve(caller, spender, amount)
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let persisted = persist(&state).await;

    Ok(Json(ApproveResponse {
        success,
        persisted,
        owner: caller,
        spender,
        amount: amount.to_string(),
    }))
}

/// POST /api/transfer_from - Delegated transfer
pub async fn transfer_from(
    State(state): State<ApiState>,
    Json(req): Json<TransferFromRequest>,
) -> ApiResult<TransferResponse> {
    let caller = parse_account("caller", &req.caller)?;
    let from = parse_account("from", &req.from)?;
    let to = parse_account("to", &req.to)?;
    let amount = parse_amount(&req.amount)?;

    let success = state
        .ledger
        .transfer_from(caller, from, to, amount)
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let persisted = persist(&state).await;

    Ok(Json(TransferResponse {
        success,
        persisted,
        from,
        to,
        amount: amount.to_string(),
    }))
}

/// GET /api/events?since=N
pub async fn list_events(
    State(state): State<ApiState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    Json(state.ledger.events_since(query.since.unwrap_or(0)))
}
