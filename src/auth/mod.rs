//! Authentication
//!
//! Handles:
//! - Password hashing (Argon2id)
//! - Signed bearer tokens
//! - Current-user extraction for handlers

mod middleware;
pub mod password;
pub mod token;

pub use middleware::CurrentUser;
pub use token::{Claims, create_token, verify_token};
