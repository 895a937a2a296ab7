//! REST API module
//!
//! Provides HTTP REST API for programmatic access to the ledger. The `caller`
//! field of every mutating request is trusted as the authenticated sender.
//!
//! # Endpoints
//!
//! ## Reads
//! - `GET /api/token` - Metadata, total supply, holder count
//! - `GET /api/balances/{account}` - Balance of an account
//! - `GET /api/allowances/{owner}/{spender}` - Remaining allowance
//! - `GET /api/events?since=N` - Notification log from sequence N
//!
//! ## Mutations
//! - `POST /api/transfer` - Direct transfer
//! - `POST /api/approve` - Set an allowance
//! - `POST /api/transfer_from` - Delegated transfer
//!
//! ## WebSocket
//! - `GET /ws` - Real-time notifications (Transfer, Approval)

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::{create_router, endpoint_summary};
pub use websocket::{WsBroadcaster, WsEvent};
