//! Mall admin account library.
//!
//! Admin accounts for the mall back office: credential checks, paged
//! listing, and the account lifecycle (create, update, enable/disable,
//! soft delete). Backed by `PostgreSQL`; the service itself only sees the
//! [`store`] traits, so tests can run it against an in-memory store.
//!
//! # Security
//!
//! Passwords are stored as Argon2id PHC strings. Disabling an account
//! revokes its OAuth2 tokens in the same transaction.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{CommonResult, codes};
pub use services::{AdminService, AdminServiceError};
pub use store::{AdminStore, AdminTransaction, RevocationError, TokenRevoker};
