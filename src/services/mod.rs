pub mod admin_service;
pub mod auth_service;
pub mod countdown_service;
pub mod lucky_draw_service;
pub mod reward_selector;

pub use admin_service::*;
pub use auth_service::*;
pub use countdown_service::CountdownService;
pub use lucky_draw_service::*;
