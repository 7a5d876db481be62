//! Business logic services for admin.
//!
//! # Services
//!
//! - `admin` - Admin account validation, paging and lifecycle
//! - `password` - Argon2id password hashing

pub mod admin;
pub mod password;

pub use admin::{AdminService, AdminServiceError};
pub use password::{PasswordHashError, hash_password, verify_password};
