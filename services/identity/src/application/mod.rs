//! 应用层

pub mod context;
pub mod guards;
pub mod services;
