//! 任务执行错误
//!
//! 执行循环不在本地恢复任何错误：每一种都会终止当前 execute_task 并交给调用方。

use thiserror::Error;

use crate::llm::LlmError;

/// 任务执行过程中可能出现的错误（工具、模型输出、模型调用、历史、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 模型请求了智能体工具表中不存在的工具
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// 模型请求的调用不是函数式调用（如 custom tool）
    #[error("Tool call is not a function: {0}")]
    NonFunctionToolCall(String),

    /// 模型输出既不是工具调用，也无法解析为 step / complete
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// 状态机进入了不可达分支：模型调用层与执行循环之间的约定被破坏
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Invalid arguments for tool {tool}: {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    #[error("Tool execution failed: {tool}: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),

    /// 调用方传入的历史中存在孤立的 tool 消息
    #[error("Invalid conversation history: {0}")]
    InvalidHistory(String),

    #[error("Turn limit reached ({0} turns)")]
    TurnLimitExceeded(usize),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// 错误类别名，用于日志与事件
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::UnknownTool(_) => "unknown_tool",
            AgentError::NonFunctionToolCall(_) => "non_function_tool_call",
            AgentError::MalformedResponse(_) => "malformed_response",
            AgentError::IllegalState(_) => "illegal_state",
            AgentError::InvalidToolArguments { .. } => "invalid_tool_arguments",
            AgentError::ToolExecutionFailed { .. } => "tool_execution_failed",
            AgentError::LlmError(_) => "llm_error",
            AgentError::InvalidHistory(_) => "invalid_history",
            AgentError::TurnLimitExceeded(_) => "turn_limit_exceeded",
            AgentError::ConfigError(_) => "config_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_converts() {
        let err: AgentError = LlmError::EmptyResponse.into();
        assert!(matches!(err, AgentError::LlmError(LlmError::EmptyResponse)));
        assert_eq!(err.kind(), "llm_error");
    }

    #[test]
    fn test_display_names_tool() {
        let err = AgentError::ToolExecutionFailed {
            tool: "search".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Tool execution failed: search: boom");
        assert_eq!(AgentError::UnknownTool("x".into()).to_string(), "Unknown tool: x");
    }
}
