// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which rejects the
// request with 401 unless it carries a valid access token for an existing
// user.

pub mod activities;
pub mod charts;
pub mod entries;
pub mod friends;
pub mod pages;
pub mod users;
