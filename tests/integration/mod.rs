//! Integration tests
//!
//! End-to-end behaviour of the sync engine against in-memory and HTTP
//! remote stores.

mod config_env;
mod durability;
mod http_remote;
