//! 回合解释：把一次模型回复归类为 工具调用 / 中间步骤 / 完成 / 无法解析
//!
//! 同一回复里既有工具调用又有结构化载荷时，工具调用优先，载荷被忽略；
//! 结构化载荷会在工具结果写回上下文后的下一轮重新由模型给出。

use crate::llm::{ModelResponse, RawToolCall};
use crate::tools::{TaskResultEnvelope, TurnResult};

/// 单轮解释结果
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// 一个或多个工具调用（保持模型给出的顺序）
    ToolCalls(Vec<RawToolCall>),
    Step {
        name: String,
        result: String,
        reasoning: String,
    },
    Complete {
        result: String,
        reasoning: String,
    },
    /// 既无工具调用也无可解析的结构化载荷
    Malformed(String),
}

/// 解释一次模型回复
pub fn interpret(response: &ModelResponse) -> TurnOutcome {
    if !response.tool_calls.is_empty() {
        if response.content.as_deref().is_some_and(|c| !c.trim().is_empty()) {
            tracing::warn!("Response carries both tool calls and content; content ignored this turn");
        }
        return TurnOutcome::ToolCalls(response.tool_calls.clone());
    }

    let Some(content) = response.content.as_deref() else {
        return TurnOutcome::Malformed("response has neither tool calls nor content".to_string());
    };

    match parse_turn_result(content) {
        Ok(TurnResult::Step {
            name,
            result,
            reasoning,
        }) => TurnOutcome::Step {
            name,
            result,
            reasoning,
        },
        Ok(TurnResult::Complete { result, reasoning }) => TurnOutcome::Complete { result, reasoning },
        Err(reason) => TurnOutcome::Malformed(reason),
    }
}

/// 解析结构化载荷：{"response": {...}}，也接受省略外层的 {...}；
/// 两者都失败且整段内容以代码块开头时，再剥掉 ```json 围栏重试
fn parse_turn_result(content: &str) -> Result<TurnResult, String> {
    let trimmed = content.trim();
    match parse_payload(trimmed) {
        Ok(result) => Ok(result),
        Err(err) => match strip_fence(trimmed) {
            Some(inner) => parse_payload(inner).map_err(|_| format!("{}: {}", err, preview(trimmed))),
            None => Err(format!("{}: {}", err, preview(trimmed))),
        },
    }
}

fn parse_payload(json_str: &str) -> Result<TurnResult, serde_json::Error> {
    match serde_json::from_str::<TaskResultEnvelope>(json_str) {
        Ok(env) => Ok(env.response),
        Err(envelope_err) => {
            serde_json::from_str::<TurnResult>(json_str).map_err(|_| envelope_err)
        }
    }
}

/// 内容以 ``` 开头时返回围栏内的文本
fn strip_fence(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let inner = match rest.rfind("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(inner.trim())
}

fn preview(s: &str) -> String {
    crate::tools::executor::preview(s, 200)
}
