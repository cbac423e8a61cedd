//! Credentials: JWT access/refresh tokens and password hashes.

pub mod jwt;
pub mod password;

pub use jwt::{refresh_token_digest, AuthError, Claims, TokenKind, TokenPair, TokenService};
pub use password::{hash_password, verify_password, PasswordError};
