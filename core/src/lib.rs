//! Client core for the Odonto clinic console.
//!
//! # Overview
//! Talks to the clinic REST API on behalf of a console front end: signs users
//! in and out, reads and writes appointments, dentists, patients, treatments
//! and users, and keeps a cache of what was read so screens can share it.
//!
//! # Design
//! - `ApiClient` is the single place requests are configured and failures are
//!   normalized into `ApiError`. Every service operation is split into a pure
//!   `build_*` step producing an `HttpRequest` and a parse step consuming an
//!   `HttpResponse`, so a host can also do the I/O itself.
//! - `QueryCache` deduplicates concurrent reads, tracks staleness per key and
//!   evicts idle entries. The `queries` handles put each resource behind it
//!   and invalidate the right key families after a confirmed write.
//! - `Session` is the signed-in state. It doubles as the client's 401 handler,
//!   so an expired token ends the session wherever it is discovered.
//! - Side effects the front end owns (navigation and toasts) go through the
//!   `Navigator` and `Notifier` traits.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod notify;
pub mod queries;
pub mod query;
pub mod routes;
pub mod schedule;
pub mod services;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{check_status, parse_empty, parse_json, ApiClient, UnauthorizedHandler};
pub use config::{ClientConfig, ConfigError};
pub use console::{Console, ConsoleError};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{Notifier, Toast, ToastLevel, ToastLog, TracingNotifier};
pub use query::{QueryCache, QueryKey, QueryOptions, QueryResult, QueryStatus};
pub use routes::{Navigator, Route, RouteHistory};
pub use session::{AuthSession, Session, SessionError, SessionProvider, SessionState};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use transport::{ReqwestTransport, Transport, TransportError};
