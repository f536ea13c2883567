//! 用户聚合

mod admin_grant;
mod user;

pub use admin_grant::*;
pub use user::*;
