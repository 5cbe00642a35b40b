//! REST API module
//!
//! Provides HTTP REST API for programmatic access to the launchpad.
//! Amounts are decimal strings of smallest units.
//!
//! # Endpoints
//!
//! ## Registry
//! - `GET /api/launchpad` - Address, owner, reserve and counters
//! - `GET /api/events?since=N` - Event log from sequence N
//!
//! ## Tokens
//! - `GET /api/tokens` - List listings
//! - `POST /api/tokens` - Create and list a token
//! - `GET /api/tokens/:token` - Listing snapshot
//! - `GET /api/tokens/:token/quote?quantity=N` - Price a trade
//! - `GET /api/tokens/:token/history` - Recent transfers
//!
//! ## Trading
//! - `POST /api/tokens/:token/buy` - Buy with exact payment
//! - `POST /api/tokens/:token/sell` - Sell back (requires approval)
//!
//! ## Token ledger
//! - `GET /api/tokens/:token/balance/:holder`
//! - `GET /api/tokens/:token/allowance?owner=..&spender=..`
//! - `POST /api/tokens/:token/approve`
//! - `POST /api/tokens/:token/transfer`
//! - `POST /api/tokens/:token/transferFrom`
//!
//! ## Admin (owner only)
//! - `POST /api/tokens/:token/price`
//! - `POST /api/withdraw`
//! - `POST /api/ownership`
//!
//! ## Native currency
//! - `POST /api/deposit` - Fund the reserve
//! - `POST /api/faucet` - Development faucet
//! - `GET /api/native/:account`
//!
//! ## WebSocket
//! - `GET /ws` - Real-time registry events

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
pub use websocket::{WsBroadcaster, WsEvent};
