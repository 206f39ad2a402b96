//! Graph store access for kgqa
//!
//! Queries reach the remote store through one stored procedure. The
//! connection layer is abstracted behind [`Connector`] and [`Session`] so the
//! pipeline can run against any transport; [`HttpConnector`] is the default.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod procedure;

pub use client::{GraphStoreClient, RawPayload};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use http::HttpConnector;
pub use procedure::{Connector, ProcedureArg, ProcedureCall, Session};
