//! warden-bootstrap - 服务启动骨架
//!
//! 运行时初始化（日志）、基础设施连接（带重试）和优雅关闭信号

mod infrastructure;
mod runtime;

pub use infrastructure::*;
pub use runtime::*;
