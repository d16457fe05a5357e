//! 记忆层：任务执行期间的对话消息序列

pub mod conversation;

pub use conversation::{validate_history, Message, Role, ToolCallRequest};
