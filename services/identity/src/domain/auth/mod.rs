//! 认证领域模型

mod current_user;
mod session;

pub use current_user::*;
pub use session::*;
