//! 对话消息：角色、内容、工具调用请求与应答
//!
//! 一次任务执行中的消息序列只追加、不修改、不重排；tool 消息必须应答紧邻其前的
//! assistant 消息中的某个工具调用请求（validate_history 负责校验外部传入的历史）。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// 模型发出的函数式工具调用请求：id 用于与 tool 消息对应，arguments 为原始 JSON 文本
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// assistant 消息携带的工具调用请求
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// tool 消息所应答的调用 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn plain(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content.into())
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content.into())
    }

    /// assistant 发起的工具调用消息（content 可为空）
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    /// 工具结果消息，content 为结果的 JSON 文本
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// 校验消息序列中每条 tool 消息都应答了紧邻其前的 assistant 工具调用，且每个调用恰好被应答一次。
///
/// 返回第一处违规的描述。
pub fn validate_history(messages: &[Message]) -> Result<(), String> {
    let mut open: Option<(usize, HashSet<&str>)> = None;

    for (idx, msg) in messages.iter().enumerate() {
        match msg.role {
            Role::Tool => {
                let Some(call_id) = msg.tool_call_id.as_deref() else {
                    return Err(format!("tool message #{idx} has no tool_call_id"));
                };
                let Some((origin, pending)) = open.as_mut() else {
                    return Err(format!(
                        "tool message #{idx} ({call_id}) does not follow an assistant tool call"
                    ));
                };
                if !pending.remove(call_id) {
                    return Err(format!(
                        "tool message #{idx} ({call_id}) answers no open call of message #{origin}"
                    ));
                }
            }
            Role::Assistant if msg.has_tool_calls() => {
                ensure_answered(open.take())?;
                let ids = msg.tool_calls.iter().map(|c| c.id.as_str()).collect();
                open = Some((idx, ids));
            }
            _ => ensure_answered(open.take())?,
        }
    }
    ensure_answered(open)
}

fn ensure_answered(open: Option<(usize, HashSet<&str>)>) -> Result<(), String> {
    match open {
        Some((origin, pending)) if !pending.is_empty() => {
            let mut ids: Vec<&str> = pending.into_iter().collect();
            ids.sort_unstable();
            Err(format!(
                "tool calls of message #{origin} left unanswered: {}",
                ids.join(", ")
            ))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCallRequest {
        ToolCallRequest::new(id, "echo", "{}")
    }

    #[test]
    fn test_tool_message_serialization_carries_call_id() {
        let msg = Message::tool("call_1", "\"ok\"");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_validate_accepts_answered_calls() {
        let history = vec![
            Message::assistant("seed"),
            Message::assistant_tool_calls("", vec![call("a"), call("b")]),
            Message::tool("b", "1"),
            Message::tool("a", "2"),
            Message::assistant("step"),
        ];
        assert!(validate_history(&history).is_ok());
    }

    #[test]
    fn test_validate_rejects_orphan_tool_message() {
        let history = vec![Message::assistant("seed"), Message::tool("a", "1")];
        let err = validate_history(&history).unwrap_err();
        assert!(err.contains("does not follow"));
    }

    #[test]
    fn test_validate_rejects_tool_message_after_plain_turn() {
        let history = vec![
            Message::assistant_tool_calls("", vec![call("a")]),
            Message::tool("a", "1"),
            Message::assistant("step"),
            Message::tool("a", "1"),
        ];
        assert!(validate_history(&history).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_answer() {
        let history = vec![
            Message::assistant_tool_calls("", vec![call("a")]),
            Message::tool("a", "1"),
            Message::tool("a", "1"),
        ];
        let err = validate_history(&history).unwrap_err();
        assert!(err.contains("answers no open call"));
    }

    #[test]
    fn test_validate_rejects_unanswered_call_before_user_turn() {
        let history = vec![
            Message::assistant_tool_calls("", vec![call("a"), call("b")]),
            Message::tool("a", "1"),
            Message::user("never mind"),
        ];
        let err = validate_history(&history).unwrap_err();
        assert!(err.contains("left unanswered: b"));
    }

    #[test]
    fn test_validate_rejects_unanswered_call_at_end() {
        let history = vec![
            Message::user("hi"),
            Message::assistant_tool_calls("", vec![call("a")]),
        ];
        let err = validate_history(&history).unwrap_err();
        assert!(err.contains("message #1 left unanswered: a"));
    }
}
