pub mod admin;
pub mod common;
pub mod countdown;
pub mod prize;
pub mod visitor;

pub use admin::*;
pub use common::*;
pub use countdown::*;
pub use prize::*;
pub use visitor::*;
