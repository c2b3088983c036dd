pub mod auth;
pub mod cors;

pub use auth::{AdminAuthMiddleware, current_admin};
pub use cors::create_cors;
