//! 工具执行器（工具适配层）
//!
//! 把智能体的工具映射转换为提供给模型的函数描述；按名称分发模型发出的调用，执行后把结果序列化为
//! JSON 文本并包装成 tool 消息。工具本身的错误不在此处理，直接转为 AgentError 交给执行循环；
//! 每次调用输出结构化审计日志（JSON）。

use std::time::Instant;

use serde_json::Value;

use crate::core::AgentError;
use crate::llm::FunctionDefinition;
use crate::memory::{Message, ToolCallRequest};
use crate::tools::ToolRegistry;

/// 工具执行器：借用智能体的工具表，不持有、不修改
pub struct ToolExecutor<'a> {
    registry: &'a ToolRegistry,
    preview_chars: usize,
}

impl<'a> ToolExecutor<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self {
            registry,
            preview_chars: 200,
        }
    }

    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// 每个 (名称, 工具) 生成一条函数描述；名称取映射键
    pub fn function_definitions(&self) -> Vec<FunctionDefinition> {
        self.registry
            .iter()
            .map(|(name, tool)| FunctionDefinition {
                name: name.clone(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    /// 执行一次函数式调用，返回应答该调用的 tool 消息；输出 JSON 审计日志
    pub async fn dispatch(&self, call: &ToolCallRequest) -> Result<Message, AgentError> {
        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| AgentError::UnknownTool(call.name.clone()))?;

        let args = parse_arguments(&call.arguments).map_err(|reason| {
            AgentError::InvalidToolArguments {
                tool: call.name.clone(),
                reason,
            }
        })?;

        let start = Instant::now();
        let result = tool.execute(args).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": call.name,
            "call_id": call.id,
            "ok": result.is_ok(),
            "duration_ms": duration_ms,
            "args_preview": preview(&call.arguments, self.preview_chars),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        let value = result.map_err(|reason| AgentError::ToolExecutionFailed {
            tool: call.name.clone(),
            reason,
        })?;
        let content = serde_json::to_string(&value).map_err(|e| AgentError::ToolExecutionFailed {
            tool: call.name.clone(),
            reason: format!("unserializable result: {e}"),
        })?;

        Ok(Message::tool(call.id.clone(), content))
    }
}

/// 解析原始参数文本；空文本视为无参数
fn parse_arguments(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

/// 截断到 max_chars 个字符，超出时追加 "..."
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{EchoTool, Tool};
    use async_trait::async_trait;

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        async fn execute(&self, _args: Value) -> Result<Value, String> {
            Err("disk on fire".to_string())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_typed(EchoTool);
        registry.register(Failing);
        registry
    }

    #[test]
    fn test_function_definitions_cover_every_tool() {
        let registry = registry();
        let defs = ToolExecutor::new(&registry).function_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "failing"]);
        assert_eq!(defs[1].description, "Always fails");
        assert_eq!(defs[0].parameters["type"], "object");
    }

    #[tokio::test]
    async fn test_dispatch_serializes_result_as_json() {
        let registry = registry();
        let call = ToolCallRequest::new("call_1", "echo", r#"{"text":"hello"}"#);
        let msg = ToolExecutor::new(&registry).dispatch(&call).await.unwrap();
        assert_eq!(msg, Message::tool("call_1", "\"hello\""));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = registry();
        let call = ToolCallRequest::new("call_1", "rm_rf", "{}");
        let err = ToolExecutor::new(&registry).dispatch(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "rm_rf"));
    }

    #[tokio::test]
    async fn test_dispatch_propagates_tool_failure() {
        let registry = registry();
        let call = ToolCallRequest::new("call_1", "failing", "");
        let err = ToolExecutor::new(&registry).dispatch(&call).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::ToolExecutionFailed { ref tool, ref reason } if tool == "failing" && reason == "disk on fire"
        ));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_non_json_arguments() {
        let registry = registry();
        let call = ToolCallRequest::new("call_1", "echo", "text=hello");
        let err = ToolExecutor::new(&registry).dispatch(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidToolArguments { .. }));
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        assert_eq!(preview("蜜蜂蜂巢", 2), "蜜蜂...");
        assert_eq!(preview("short", 10), "short");
    }
}
