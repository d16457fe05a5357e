//! 核心：任务执行错误

pub mod error;

pub use error::AgentError;
