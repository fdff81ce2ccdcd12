//! Database layer - connection handle and typed parameter binding

pub mod connection;

pub use connection::{connect, Cell, ConnectError, ConnectParams, ConnectParamsBuilder, Db};
