//! REST API handlers for launchpad operations
//!
//! Amounts travel as decimal strings of smallest units so that 128-bit
//! values survive JSON clients that only have doubles.

use crate::api::websocket::WsBroadcaster;
use crate::launchpad::{ErrorKind, EventRecord, Launchpad, LaunchpadError, Listing};
use crate::storage::Storage;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub launchpad: Arc<RwLock<Launchpad>>,
    pub storage: Arc<Storage>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
    /// Bearer token required on owner routes; `None` leaves them open
    pub admin_token: Option<Arc<str>>,
}

impl ApiState {
    pub fn new(launchpad: Launchpad, storage: Storage) -> Self {
        Self {
            launchpad: Arc::new(RwLock::new(launchpad)),
            storage: Arc::new(storage),
            ws_broadcaster: Arc::new(WsBroadcaster::new()),
            admin_token: None,
        }
    }

    /// Require `token` as a bearer credential on owner routes
    pub fn with_admin_token(mut self, token: &str) -> Self {
        self.admin_token = Some(Arc::from(token));
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

type ApiFailure = (StatusCode, Json<ApiError>);

#[derive(Debug, Serialize)]
pub struct LaunchpadInfo {
    pub address: String,
    pub owner: String,
    pub reserve: String,
    pub listings: usize,
    pub events: usize,
    pub reject_dust_trades: bool,
}

/// Listing snapshot joined with its ledger metadata
#[derive(Debug, Serialize)]
pub struct ListingInfo {
    pub token: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    pub unsold: String,
    pub holder_count: usize,
    pub creator: String,
    pub price: String,
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub token: String,
    pub quantity: String,
    pub cost: String,
}

#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub success: bool,
    pub token: String,
    pub account: String,
    pub quantity: String,
    /// Paid on buy, refunded on sell
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TokenBalanceResponse {
    pub token: String,
    pub holder: String,
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct NativeBalanceResponse {
    pub account: String,
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TokenHistoryEntry {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub success: bool,
    pub owner: String,
    pub amount: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct CreateTokenRequest {
    pub caller: String,
    pub name: String,
    pub symbol: String,
    /// Whole tokens
    pub initial_supply: u64,
    /// Native smallest units per whole token
    pub price: String,
}

#[derive(Deserialize)]
pub struct BuyRequest {
    pub caller: String,
    pub quantity: String,
    pub payment: String,
}

#[derive(Deserialize)]
pub struct SellRequest {
    pub caller: String,
    pub quantity: String,
}

#[derive(Deserialize)]
pub struct TokenTransferRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct TokenApproveRequest {
    pub owner: String,
    pub spender: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct TokenTransferFromRequest {
    pub spender: String,
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct AllowanceQuery {
    pub owner: String,
    pub spender: String,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub quantity: String,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

#[derive(Deserialize)]
pub struct UpdatePriceRequest {
    pub caller: String,
    pub price: String,
}

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: String,
}

#[derive(Deserialize)]
pub struct TransferOwnershipRequest {
    pub caller: String,
    pub new_owner: String,
}

#[derive(Deserialize)]
pub struct DepositRequest {
    pub from: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct FaucetRequest {
    pub account: String,
    pub amount: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Availability => StatusCode::CONFLICT,
        ErrorKind::Funds => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
    }
}

fn launchpad_error(err: LaunchpadError) -> ApiFailure {
    let kind = err.kind();
    (
        status_for(kind),
        Json(ApiError {
            error: err.to_string(),
            kind: Some(kind),
        }),
    )
}

fn bad_request(message: String) -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: message,
            kind: Some(ErrorKind::InvalidInput),
        }),
    )
}

fn parse_amount(field: &str, value: &str) -> Result<u128, ApiFailure> {
    value
        .trim()
        .parse::<u128>()
        .map_err(|_| bad_request(format!("Invalid {}: must be a whole number of smallest units", field)))
}

/// Run `op` against a copy of the registry and swap the copy in once it is
/// saved. A failed operation or a failed save leaves the shared registry
/// untouched; records appended by the operation are broadcast after the swap.
fn commit<T>(
    state: &ApiState,
    launchpad: &mut Launchpad,
    op: impl FnOnce(&mut Launchpad) -> Result<T, LaunchpadError>,
) -> Result<T, ApiFailure> {
    let since = launchpad.events().len() as u64;
    let mut next = launchpad.clone();
    let value = op(&mut next).map_err(launchpad_error)?;

    state.storage.save(&next).map_err(|e| {
        log::error!("Failed to persist launchpad state: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("Failed to persist state: {}", e),
                kind: None,
            }),
        )
    })?;

    *launchpad = next;
    state
        .ws_broadcaster
        .broadcast_records(launchpad.events_since(since));
    Ok(value)
}

/// Owner routes require `Authorization: Bearer <admin token>` when the
/// server was started with one
fn ensure_admin(state: &ApiState, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if presented != Some(expected) {
        log::warn!("Rejected admin request without a valid admin token");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiError {
                error: "Missing or invalid Authorization header".to_string(),
                kind: Some(ErrorKind::Authorization),
            }),
        ));
    }
    Ok(())
}

fn listing_info(launchpad: &Launchpad, listing: &Listing) -> Result<ListingInfo, ApiFailure> {
    let token = launchpad
        .token(&listing.token)
        .ok_or_else(|| launchpad_error(LaunchpadError::NotFound(listing.token.clone())))?;

    Ok(ListingInfo {
        token: listing.token.clone(),
        name: token.name().to_string(),
        symbol: token.symbol().to_string(),
        decimals: token.decimals(),
        total_supply: token.total_supply().to_string(),
        unsold: token.balance_of(launchpad.address()).to_string(),
        holder_count: token.holder_count(),
        creator: listing.creator.clone(),
        price: listing.price.to_string(),
        active: listing.active,
        created_at: listing.created_at.to_rfc3339(),
    })
}

// ============================================================================
// Registry
// ============================================================================

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/launchpad - Registry info
pub async fn get_launchpad_info(State(state): State<ApiState>) -> Json<LaunchpadInfo> {
    let launchpad = state.launchpad.read().await;
    let stats = launchpad.stats();

    Json(LaunchpadInfo {
        address: stats.address,
        owner: stats.owner,
        reserve: stats.reserve.to_string(),
        listings: stats.listings,
        events: stats.events,
        reject_dust_trades: launchpad.config().reject_dust_trades,
    })
}

/// GET /api/events?since=N - Event log from sequence N on
pub async fn get_events(
    State(state): State<ApiState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let launchpad = state.launchpad.read().await;
    Json(launchpad.events_since(query.since).to_vec())
}

// ============================================================================
// Tokens & listings
// ============================================================================

/// POST /api/tokens - Create and list a token
pub async fn create_token(
    State(state): State<ApiState>,
    Json(req): Json<CreateTokenRequest>,
) -> Result<(StatusCode, Json<ListingInfo>), ApiFailure> {
    let price = parse_amount("price", &req.price)?;

    let mut launchpad = state.launchpad.write().await;
    let address = commit(&state, &mut launchpad, |launchpad| {
        launchpad.create_token(&req.caller, &req.name, &req.symbol, req.initial_supply, price)
    })?;

    let listing = launchpad.listed_tokens(&address).map_err(launchpad_error)?;
    Ok((StatusCode::CREATED, Json(listing_info(&launchpad, listing)?)))
}

/// GET /api/tokens - All listings in creation order
pub async fn list_tokens(
    State(state): State<ApiState>,
) -> Result<Json<Vec<ListingInfo>>, ApiFailure> {
    let launchpad = state.launchpad.read().await;

    let listings = launchpad
        .listings()
        .into_iter()
        .map(|listing| listing_info(&launchpad, listing))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(listings))
}

/// GET /api/tokens/{token} - Listing snapshot
pub async fn get_listing(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> Result<Json<ListingInfo>, ApiFailure> {
    let launchpad = state.launchpad.read().await;
    let listing = launchpad.listed_tokens(&token).map_err(launchpad_error)?;
    Ok(Json(listing_info(&launchpad, listing)?))
}

/// GET /api/tokens/{token}/quote?quantity=N - Price a trade
pub async fn get_quote(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, ApiFailure> {
    let quantity = parse_amount("quantity", &query.quantity)?;
    let launchpad = state.launchpad.read().await;
    let cost = launchpad.quote(&token, quantity).map_err(launchpad_error)?;

    Ok(Json(QuoteResponse {
        token,
        quantity: quantity.to_string(),
        cost: cost.to_string(),
    }))
}

/// GET /api/tokens/{token}/history - Recent transfers
pub async fn get_token_history(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> Result<Json<Vec<TokenHistoryEntry>>, ApiFailure> {
    let launchpad = state.launchpad.read().await;
    let ledger = launchpad
        .token(&token)
        .ok_or_else(|| launchpad_error(LaunchpadError::NotFound(token.clone())))?;

    let history = ledger
        .transfer_history
        .iter()
        .rev()
        .map(|event| TokenHistoryEntry {
            from: event.from.clone(),
            to: event.to.clone(),
            amount: event.amount.to_string(),
            timestamp: event.timestamp.to_rfc3339(),
        })
        .collect();

    Ok(Json(history))
}

// ============================================================================
// Trading
// ============================================================================

/// POST /api/tokens/{token}/buy - Buy with an exact payment
pub async fn buy_tokens(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Json(req): Json<BuyRequest>,
) -> Result<Json<TradeResponse>, ApiFailure> {
    let quantity = parse_amount("quantity", &req.quantity)?;
    let payment = parse_amount("payment", &req.payment)?;

    let mut launchpad = state.launchpad.write().await;
    let receipt = commit(&state, &mut launchpad, |launchpad| {
        launchpad.buy_tokens(&req.caller, &token, quantity, payment)
    })?;

    Ok(Json(TradeResponse {
        success: true,
        token: receipt.token,
        account: receipt.account,
        quantity: receipt.quantity.to_string(),
        amount: receipt.amount.to_string(),
    }))
}

/// POST /api/tokens/{token}/sell - Sell back against the reserve
pub async fn sell_tokens(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Json(req): Json<SellRequest>,
) -> Result<Json<TradeResponse>, ApiFailure> {
    let quantity = parse_amount("quantity", &req.quantity)?;

    let mut launchpad = state.launchpad.write().await;
    let receipt = commit(&state, &mut launchpad, |launchpad| {
        launchpad.sell_tokens(&req.caller, &token, quantity)
    })?;

    Ok(Json(TradeResponse {
        success: true,
        token: receipt.token,
        account: receipt.account,
        quantity: receipt.quantity.to_string(),
        amount: receipt.amount.to_string(),
    }))
}

// ============================================================================
// Token ledger
// ============================================================================

/// GET /api/tokens/{token}/balance/{holder}
pub async fn get_token_balance(
    State(state): State<ApiState>,
    Path((token, holder)): Path<(String, String)>,
) -> Result<Json<TokenBalanceResponse>, ApiFailure> {
    let launchpad = state.launchpad.read().await;
    let balance = launchpad
        .balance_of(&token, &holder)
        .map_err(launchpad_error)?;

    Ok(Json(TokenBalanceResponse {
        token,
        holder,
        balance: balance.to_string(),
    }))
}

/// GET /api/tokens/{token}/allowance?owner=..&spender=..
pub async fn get_token_allowance(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Query(query): Query<AllowanceQuery>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let launchpad = state.launchpad.read().await;
    let allowance = launchpad
        .allowance(&token, &query.owner, &query.spender)
        .map_err(launchpad_error)?;

    Ok(Json(serde_json::json!({
        "token": token,
        "owner": query.owner,
        "spender": query.spender,
        "allowance": allowance.to_string()
    })))
}

/// POST /api/tokens/{token}/approve
pub async fn approve_tokens(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Json(req): Json<TokenApproveRequest>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let amount = parse_amount("amount", &req.amount)?;

    let mut launchpad = state.launchpad.write().await;
    commit(&state, &mut launchpad, |launchpad| {
        launchpad.approve(&token, &req.owner, &req.spender, amount)
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "owner": req.owner,
        "spender": req.spender,
        "amount": amount.to_string()
    })))
}

/// POST /api/tokens/{token}/transfer
pub async fn transfer_tokens(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Json(req): Json<TokenTransferRequest>,
) -> Result<Json<TransferResponse>, ApiFailure> {
    let amount = parse_amount("amount", &req.amount)?;

    let mut launchpad = state.launchpad.write().await;
    commit(&state, &mut launchpad, |launchpad| {
        launchpad.transfer(&token, &req.from, &req.to, amount)
    })?;

    Ok(Json(TransferResponse {
        success: true,
        from: req.from,
        to: req.to,
        amount: amount.to_string(),
    }))
}

/// POST /api/tokens/{token}/transferFrom - Delegated transfer
pub async fn transfer_from_tokens(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Json(req): Json<TokenTransferFromRequest>,
) -> Result<Json<TransferResponse>, ApiFailure> {
    let amount = parse_amount("amount", &req.amount)?;

    let mut launchpad = state.launchpad.write().await;
    commit(&state, &mut launchpad, |launchpad| {
        launchpad.transfer_from(&token, &req.spender, &req.from, &req.to, amount)
    })?;

    Ok(Json(TransferResponse {
        success: true,
        from: req.from,
        to: req.to,
        amount: amount.to_string(),
    }))
}

// ============================================================================
// Admin
// ============================================================================

/// POST /api/tokens/{token}/price - Owner-only price update
pub async fn update_price(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdatePriceRequest>,
) -> Result<Json<ListingInfo>, ApiFailure> {
    ensure_admin(&state, &headers)?;
    let price = parse_amount("price", &req.price)?;

    let mut launchpad = state.launchpad.write().await;
    commit(&state, &mut launchpad, |launchpad| {
        launchpad.update_token_price(&req.caller, &token, price)
    })?;

    let listing = launchpad.listed_tokens(&token).map_err(launchpad_error)?;
    Ok(Json(listing_info(&launchpad, listing)?))
}

/// POST /api/withdraw - Owner-only reserve withdrawal
pub async fn withdraw(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<CallerRequest>,
) -> Result<Json<WithdrawResponse>, ApiFailure> {
    ensure_admin(&state, &headers)?;

    let mut launchpad = state.launchpad.write().await;
    let amount = commit(&state, &mut launchpad, |launchpad| {
        launchpad.withdraw_eth(&req.caller)
    })?;

    Ok(Json(WithdrawResponse {
        success: true,
        owner: launchpad.owner().to_string(),
        amount: amount.to_string(),
    }))
}

/// POST /api/ownership - Owner-only ownership transfer
pub async fn transfer_ownership(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<TransferOwnershipRequest>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    ensure_admin(&state, &headers)?;

    let mut launchpad = state.launchpad.write().await;
    commit(&state, &mut launchpad, |launchpad| {
        launchpad.transfer_ownership(&req.caller, &req.new_owner)
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "owner": launchpad.owner()
    })))
}

// ============================================================================
// Native currency
// ============================================================================

/// POST /api/deposit - Send native currency to the reserve
pub async fn deposit(
    State(state): State<ApiState>,
    Json(req): Json<DepositRequest>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let amount = parse_amount("amount", &req.amount)?;

    let mut launchpad = state.launchpad.write().await;
    commit(&state, &mut launchpad, |launchpad| {
        launchpad.deposit(&req.from, amount)
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "reserve": launchpad.reserve().to_string()
    })))
}

/// POST /api/faucet - Development faucet
pub async fn fund_account(
    State(state): State<ApiState>,
    Json(req): Json<FaucetRequest>,
) -> Result<Json<NativeBalanceResponse>, ApiFailure> {
    let amount = parse_amount("amount", &req.amount)?;

    let mut launchpad = state.launchpad.write().await;
    let balance = commit(&state, &mut launchpad, |launchpad| {
        launchpad.fund_account(&req.account, amount)
    })?;

    Ok(Json(NativeBalanceResponse {
        account: req.account,
        balance: balance.to_string(),
    }))
}

/// GET /api/native/{account} - Native balance
pub async fn get_native_balance(
    State(state): State<ApiState>,
    Path(account): Path<String>,
) -> Json<NativeBalanceResponse> {
    let launchpad = state.launchpad.read().await;
    let balance = launchpad.native_balance(&account);

    Json(NativeBalanceResponse {
        account,
        balance: balance.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::WsEvent;
    use crate::launchpad::{LaunchpadEvent, ONE_TOKEN};
    use crate::storage::StorageConfig;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    const PRICE: u128 = ONE_TOKEN / 1000;

    fn test_state() -> (ApiState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        let launchpad = Launchpad::new("owner").unwrap();
        (ApiState::new(launchpad, storage), temp_dir)
    }

    async fn create_listing(state: &ApiState) -> String {
        let (status, Json(info)) = create_token(
            State(state.clone()),
            Json(CreateTokenRequest {
                caller: "owner".to_string(),
                name: "Test Token".to_string(),
                symbol: "TST".to_string(),
                initial_supply: 1_000_000,
                price: PRICE.to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        info.token
    }

    async fn faucet(state: &ApiState, account: &str, amount: u128) {
        fund_account(
            State(state.clone()),
            Json(FaucetRequest {
                account: account.to_string(),
                amount: amount.to_string(),
            }),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_token_persists_and_lists() {
        let (state, _dir) = test_state();
        let token = create_listing(&state).await;

        let Json(listings) = list_tokens(State(state.clone())).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].token, token);
        assert_eq!(listings[0].symbol, "TST");
        assert_eq!(listings[0].unsold, (1_000_000 * ONE_TOKEN).to_string());

        let saved = state.storage.load().unwrap();
        assert_eq!(saved.count(), 1);
    }

    #[tokio::test]
    async fn test_buy_then_sell_round_trip() {
        let (state, _dir) = test_state();
        let token = create_listing(&state).await;
        faucet(&state, "alice", ONE_TOKEN).await;

        let quantity = (100 * ONE_TOKEN).to_string();
        let Json(quote) = get_quote(
            State(state.clone()),
            Path(token.clone()),
            Query(QuoteQuery {
                quantity: quantity.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(quote.cost, (ONE_TOKEN / 10).to_string());

        buy_tokens(
            State(state.clone()),
            Path(token.clone()),
            Json(BuyRequest {
                caller: "alice".to_string(),
                quantity: quantity.clone(),
                payment: quote.cost.clone(),
            }),
        )
        .await
        .unwrap();

        let launchpad_address = state.launchpad.read().await.address().to_string();
        approve_tokens(
            State(state.clone()),
            Path(token.clone()),
            Json(TokenApproveRequest {
                owner: "alice".to_string(),
                spender: launchpad_address,
                amount: quantity.clone(),
            }),
        )
        .await
        .unwrap();

        let Json(sold) = sell_tokens(
            State(state.clone()),
            Path(token.clone()),
            Json(SellRequest {
                caller: "alice".to_string(),
                quantity,
            }),
        )
        .await
        .unwrap();
        assert_eq!(sold.amount, (ONE_TOKEN / 10).to_string());

        let Json(balance) = get_native_balance(State(state.clone()), Path("alice".to_string())).await;
        assert_eq!(balance.balance, ONE_TOKEN.to_string());
    }

    #[tokio::test]
    async fn test_payment_mismatch_is_unprocessable() {
        let (state, _dir) = test_state();
        let token = create_listing(&state).await;
        faucet(&state, "alice", ONE_TOKEN).await;

        let (status, Json(error)) = buy_tokens(
            State(state.clone()),
            Path(token),
            Json(BuyRequest {
                caller: "alice".to_string(),
                quantity: (100 * ONE_TOKEN).to_string(),
                payment: (ONE_TOKEN / 10 + 1).to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.kind, Some(ErrorKind::Funds));
        assert_eq!(state.launchpad.read().await.reserve(), 0);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (state, _dir) = test_state();
        let token = create_listing(&state).await;

        let (status, _) = update_price(
            State(state.clone()),
            Path(token),
            HeaderMap::new(),
            Json(UpdatePriceRequest {
                caller: "mallory".to_string(),
                price: "1".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = withdraw(
            State(state.clone()),
            HeaderMap::new(),
            Json(CallerRequest {
                caller: "mallory".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_token_guards_owner_routes() {
        let (state, _dir) = test_state();
        let state = state.with_admin_token("secret");
        let token = create_listing(&state).await;

        // The owner's name alone is not enough once a token is configured
        let (status, Json(error)) = update_price(
            State(state.clone()),
            Path(token.clone()),
            HeaderMap::new(),
            Json(UpdatePriceRequest {
                caller: "owner".to_string(),
                price: "1".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.kind, Some(ErrorKind::Authorization));

        let mut wrong = HeaderMap::new();
        wrong.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer guess"));
        let (status, _) = transfer_ownership(
            State(state.clone()),
            wrong,
            Json(TransferOwnershipRequest {
                caller: "owner".to_string(),
                new_owner: "mallory".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        {
            let launchpad = state.launchpad.read().await;
            assert_eq!(launchpad.owner(), "owner");
            assert_eq!(launchpad.listed_tokens(&token).unwrap().price, PRICE);
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        let Json(info) = update_price(
            State(state.clone()),
            Path(token.clone()),
            headers.clone(),
            Json(UpdatePriceRequest {
                caller: "owner".to_string(),
                price: "1".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(info.price, "1");

        // A valid token does not stand in for the owner role
        let (status, _) = withdraw(
            State(state.clone()),
            headers,
            Json(CallerRequest {
                caller: "mallory".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_untouched() {
        let (state, dir) = test_state();
        let token = create_listing(&state).await;
        faucet(&state, "alice", ONE_TOKEN).await;
        let events_before = state.launchpad.read().await.events().len();
        let mut rx = state.ws_broadcaster.subscribe();

        // A directory in place of the temp file makes every save fail
        std::fs::create_dir(dir.path().join("launchpad.json.tmp")).unwrap();

        let (status, _) = buy_tokens(
            State(state.clone()),
            Path(token.clone()),
            Json(BuyRequest {
                caller: "alice".to_string(),
                quantity: (100 * ONE_TOKEN).to_string(),
                payment: (ONE_TOKEN / 10).to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        {
            let launchpad = state.launchpad.read().await;
            assert_eq!(launchpad.balance_of(&token, "alice").unwrap(), 0);
            assert_eq!(launchpad.native_balance("alice"), ONE_TOKEN);
            assert_eq!(launchpad.reserve(), 0);
            assert_eq!(launchpad.events().len(), events_before);
        }
        assert!(rx.try_recv().is_err());

        let saved = state.storage.load().unwrap();
        assert_eq!(saved.native_balance("alice"), ONE_TOKEN);
        assert_eq!(saved.reserve(), 0);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let (state, _dir) = test_state();

        let (status, _) = get_listing(State(state.clone()), Path("0xmissing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_amount_is_bad_request() {
        let (state, _dir) = test_state();
        let token = create_listing(&state).await;

        let (status, _) = buy_tokens(
            State(state.clone()),
            Path(token),
            Json(BuyRequest {
                caller: "alice".to_string(),
                quantity: "lots".to_string(),
                payment: "0".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mutations_are_broadcast() {
        let (state, _dir) = test_state();
        let mut rx = state.ws_broadcaster.subscribe();

        let token = create_listing(&state).await;

        match rx.recv().await.unwrap() {
            WsEvent::Launchpad { record } => {
                assert_eq!(record.sequence, 0);
                assert!(matches!(
                    record.event,
                    LaunchpadEvent::TokenCreated { token: ref t, .. } if *t == token
                ));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let Json(events) = get_events(State(state.clone()), Query(EventsQuery { since: 0 })).await;
        assert_eq!(events.len(), 1);
    }
}
