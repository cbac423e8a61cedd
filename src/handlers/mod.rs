// handlers/mod.rs - Two handler tiers
//
// Public (no auth) handlers issue tokens and serve the landing page.
// Protected handlers run behind `jwt_auth_middleware` and receive the
// authenticated user as `Extension<CurrentUser>`.

pub mod protected;
pub mod public;
