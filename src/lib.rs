//! Hive - 单智能体任务执行核心
//!
//! 模块划分：
//! - **agent**: 智能体定义（角色、描述、模型、工具表）与 system 指令
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 对话消息与历史校验
//! - **react**: 上下文构建、回合解释、执行主循环
//! - **tools**: 工具 trait、工具表、执行器与结构化输出 Schema
//! - **workflow**: 工作流与任务文件

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod tools;
pub mod workflow;

pub use agent::Agent;
pub use core::AgentError;
pub use react::{execute_task, execute_workflow};
