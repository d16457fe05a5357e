//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按顺序返回预先编排的 ModelResponse，并记录每次收到的请求，便于断言调用次数与上下文。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{CompletionRequest, LlmClient, LlmError, ModelResponse};

/// Mock 客户端：脚本耗尽后返回 LlmError::Api
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<ModelResponse, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 在脚本末尾追加一次调用失败
    pub fn then_fail(self, err: LlmError) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(err));
        self
    }

    /// 已收到的请求数（即模型调用次数）
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 已收到的请求副本
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api("mock script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ResponseSchema;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "mock".to_string(),
            messages: vec![],
            tools: None,
            response_format: ResponseSchema {
                name: "task_result".to_string(),
                schema: serde_json::json!({}),
            },
        }
    }

    #[tokio::test]
    async fn test_returns_script_in_order_then_fails() {
        let mock = MockLlmClient::new(vec![
            ModelResponse::text("first"),
            ModelResponse::text("second"),
        ]);
        assert_eq!(mock.complete(&request()).await.unwrap().content.as_deref(), Some("first"));
        assert_eq!(mock.complete(&request()).await.unwrap().content.as_deref(), Some("second"));
        assert!(matches!(mock.complete(&request()).await, Err(LlmError::Api(_))));
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_then_fail_appends_error() {
        let mock = MockLlmClient::new(vec![]).then_fail(LlmError::EmptyResponse);
        assert!(matches!(mock.complete(&request()).await, Err(LlmError::EmptyResponse)));
    }
}
