pub mod client_ip;
pub mod jwt;
pub mod password;

pub use client_ip::visitor_id;
pub use jwt::*;
pub use password::*;
