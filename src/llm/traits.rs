//! LLM 客户端抽象
//!
//! 执行循环只依赖 LlmClient：输入模型 id、消息、可选的函数描述与结构化输出 Schema，
//! 输出 ModelResponse（文本内容 / 工具调用）。具体后端（OpenAI 兼容 / Mock）实现该 trait。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::memory::{Message, ToolCallRequest};

/// 模型调用层错误（网络、鉴权、请求构造、拒答、空回复），执行循环不重试
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model refused: {0}")]
    Refusal(String),

    #[error("Empty response")]
    EmptyResponse,
}

/// 提供给模型的函数式工具描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// 参数 JSON Schema
    pub parameters: Value,
}

/// 结构化输出要求：名称 + JSON Schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

/// 单次模型调用请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    /// 完整消息序列（首条为 system）
    pub messages: Vec<Message>,
    /// 智能体无工具时为 None，请求中不携带 tools 字段
    pub tools: Option<Vec<FunctionDefinition>>,
    pub response_format: ResponseSchema,
}

/// 模型返回的工具调用：函数式调用，或执行循环不支持的其它类型
#[derive(Debug, Clone, PartialEq)]
pub enum RawToolCall {
    Function(ToolCallRequest),
    Other { id: String, kind: String },
}

/// 单次模型回复
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// 文本内容（结构化输出时为 JSON 文本）
    pub content: Option<String>,
    pub tool_calls: Vec<RawToolCall>,
}

impl ModelResponse {
    /// 原样文本回复
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// step 结构化回复
    pub fn step(name: &str, result: &str, reasoning: &str) -> Self {
        Self::text(
            json!({
                "response": {"kind": "step", "name": name, "result": result, "reasoning": reasoning}
            })
            .to_string(),
        )
    }

    /// complete 结构化回复
    pub fn complete(result: &str, reasoning: &str) -> Self {
        Self::text(
            json!({
                "response": {"kind": "complete", "result": result, "reasoning": reasoning}
            })
            .to_string(),
        )
    }

    /// 仅含函数式工具调用的回复
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls.into_iter().map(RawToolCall::Function).collect(),
            ..Self::default()
        }
    }
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelResponse, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_helper_shape() {
        let resp = ModelResponse::step("plan", "drafted outline", "need structure first");
        let value: Value = serde_json::from_str(resp.content.as_deref().unwrap()).unwrap();
        assert_eq!(value["response"]["kind"], "step");
        assert_eq!(value["response"]["name"], "plan");
        assert!(resp.tool_calls.is_empty());
    }

    #[test]
    fn test_tool_calls_helper_wraps_functions() {
        let resp = ModelResponse::tool_calls(vec![ToolCallRequest::new("1", "echo", "{}")]);
        assert!(resp.content.is_none());
        assert!(matches!(&resp.tool_calls[0], RawToolCall::Function(c) if c.name == "echo"));
    }
}
