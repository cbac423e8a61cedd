// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod pages;
pub mod users;
