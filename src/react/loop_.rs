//! 任务执行主循环
//!
//! 显式状态机：AwaitingModel -> (DispatchingTools -> AwaitingModel)* -> Done。
//! 每轮把 [system, ...messages] 连同函数描述与 TurnResult Schema 交给模型；
//! 工具调用并发执行，全部成功后把 assistant 调用消息与 tool 回复按调用顺序写回；
//! step 只写回结果文本；complete 结束并返回结果。任何错误都立即终止任务。

use futures_util::future::try_join_all;
use tokio::sync::mpsc::UnboundedSender;

use crate::agent::Agent;
use crate::core::AgentError;
use crate::llm::{CompletionRequest, LlmClient, RawToolCall};
use crate::memory::{validate_history, Message, ToolCallRequest};
use crate::react::context::Context;
use crate::react::events::TaskEvent;
use crate::react::interpreter::{interpret, TurnOutcome};
use crate::tools::executor::preview;
use crate::tools::{task_result_schema, ToolExecutor};
use crate::workflow::Workflow;

/// 日志与事件中的默认预览字符数
const DEFAULT_PREVIEW_CHARS: usize = 200;

/// 任务执行结果：最终文本、完整对话（不含 system）与模型调用轮数
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub result: String,
    pub messages: Vec<Message>,
    pub turns: usize,
}

enum LoopState {
    AwaitingModel,
    DispatchingTools {
        assistant: Message,
        calls: Vec<ToolCallRequest>,
    },
    Done(String),
}

/// 单个任务的执行配置
pub struct TaskSession<'a> {
    /// 模型调用（必需）
    pub llm: &'a dyn LlmClient,
    /// 执行任务的智能体（必需）
    pub agent: &'a Agent,
    /// 团队成员：目前只记录，不影响控制流
    pub team: &'a [Agent],
    /// 可选：模型调用轮数上限
    pub max_turns: Option<usize>,
    /// 可选：事件推送通道
    pub event_tx: Option<&'a UnboundedSender<TaskEvent>>,
    pub preview_chars: usize,
}

impl<'a> TaskSession<'a> {
    pub fn new(llm: &'a dyn LlmClient, agent: &'a Agent) -> Self {
        Self {
            llm,
            agent,
            team: &[],
            max_turns: None,
            event_tx: None,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_team(mut self, team: &'a [Agent]) -> Self {
        self.team = team;
        self
    }

    /// 设置轮数上限；None 表示不限制
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// 设置事件推送通道
    pub fn with_event_tx(mut self, tx: &'a UnboundedSender<TaskEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    fn send_event(&self, ev: TaskEvent) {
        if let Some(tx) = self.event_tx {
            let _ = tx.send(ev);
        }
    }

    fn request(&self, messages: &[Message]) -> CompletionRequest {
        let mut full = Vec::with_capacity(messages.len() + 1);
        full.push(Message::system(self.agent.system_prompt()));
        full.extend_from_slice(messages);
        CompletionRequest {
            model: self.agent.model.clone(),
            messages: full,
            tools: self
                .agent
                .toolset()
                .map(|registry| ToolExecutor::new(registry).function_definitions()),
            response_format: task_result_schema(),
        }
    }

    /// 从 messages 出发驱动对话直到模型给出 complete
    pub async fn run(&self, messages: Vec<Message>) -> Result<TaskOutcome, AgentError> {
        validate_history(&messages).map_err(AgentError::InvalidHistory)?;

        tracing::debug!(
            role = %self.agent.role,
            model = %self.agent.model,
            team_size = self.team.len(),
            "Task started"
        );

        let mut messages = messages;
        let mut turns = 0usize;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if let Some(max) = self.max_turns {
                        if turns >= max {
                            tracing::warn!(max_turns = max, "Turn limit reached");
                            return Err(AgentError::TurnLimitExceeded(max));
                        }
                    }
                    turns += 1;
                    tracing::info!(turn = turns, "Turn started");
                    self.send_event(TaskEvent::TurnStarted { turn: turns });

                    let request = self.request(&messages);
                    tracing::debug!(
                        messages = request.messages.len(),
                        tools = request.tools.as_ref().map_or(0, |t| t.len()),
                        "Request"
                    );
                    let response = self.llm.complete(&request).await?;
                    match interpret(&response) {
                        TurnOutcome::ToolCalls(raw) => {
                            let calls = function_calls(&raw)?;
                            let assistant = Message::assistant_tool_calls(
                                response.content.clone().unwrap_or_default(),
                                calls.clone(),
                            );
                            LoopState::DispatchingTools { assistant, calls }
                        }
                        TurnOutcome::Step {
                            name,
                            result,
                            reasoning,
                        } => {
                            tracing::info!(step = %name, reasoning = %preview(&reasoning, self.preview_chars), "Step");
                            self.send_event(TaskEvent::Step {
                                name,
                                result: result.clone(),
                                reasoning,
                            });
                            messages.push(Message::assistant(result));
                            LoopState::AwaitingModel
                        }
                        TurnOutcome::Complete { result, reasoning } => {
                            tracing::debug!(reasoning = %preview(&reasoning, self.preview_chars), "Complete");
                            LoopState::Done(result)
                        }
                        TurnOutcome::Malformed(reason) => {
                            return Err(AgentError::MalformedResponse(reason));
                        }
                    }
                }
                LoopState::DispatchingTools { assistant, calls } => {
                    let replies = self.dispatch_all(&calls).await?;
                    messages.push(assistant);
                    messages.extend(replies);
                    LoopState::AwaitingModel
                }
                LoopState::Done(result) => {
                    tracing::info!(turns, "Task complete");
                    self.send_event(TaskEvent::Complete {
                        result: result.clone(),
                        turns,
                    });
                    return Ok(TaskOutcome {
                        result,
                        messages,
                        turns,
                    });
                }
            };
        }
    }

    /// 并发执行一轮中的全部调用；任一失败则整轮失败，回复按调用顺序返回
    async fn dispatch_all(&self, calls: &[ToolCallRequest]) -> Result<Vec<Message>, AgentError> {
        if calls.is_empty() {
            return Err(AgentError::IllegalState(
                "dispatching tools with no tool calls".to_string(),
            ));
        }
        let Some(registry) = self.agent.toolset() else {
            return Err(AgentError::UnknownTool(calls[0].name.clone()));
        };
        if let Some(missing) = calls.iter().find(|c| registry.get(&c.name).is_none()) {
            return Err(AgentError::UnknownTool(missing.name.clone()));
        }

        for call in calls {
            self.send_event(TaskEvent::ToolCall {
                id: call.id.clone(),
                tool: call.name.clone(),
                args_preview: preview(&call.arguments, self.preview_chars),
            });
        }

        let executor = ToolExecutor::new(registry).with_preview_chars(self.preview_chars);
        let replies = try_join_all(calls.iter().map(|call| executor.dispatch(call))).await?;

        for (call, reply) in calls.iter().zip(&replies) {
            self.send_event(TaskEvent::Observation {
                id: call.id.clone(),
                tool: call.name.clone(),
                preview: preview(&reply.content, self.preview_chars),
            });
        }
        Ok(replies)
    }
}

/// 只接受函数式调用
fn function_calls(raw: &[RawToolCall]) -> Result<Vec<ToolCallRequest>, AgentError> {
    raw.iter()
        .map(|call| match call {
            RawToolCall::Function(call) => Ok(call.clone()),
            RawToolCall::Other { id, kind } => {
                Err(AgentError::NonFunctionToolCall(format!("{kind} (id {id})")))
            }
        })
        .collect()
}

/// 以 messages 为初始对话执行任务，返回最终结果文本
pub async fn execute_task(
    llm: &dyn LlmClient,
    agent: &Agent,
    messages: Vec<Message>,
    team: &[Agent],
) -> Result<String, AgentError> {
    let outcome = TaskSession::new(llm, agent)
        .with_team(team)
        .run(messages)
        .await?;
    Ok(outcome.result)
}

/// 由工作流构建上下文后执行任务
pub async fn execute_workflow(
    llm: &dyn LlmClient,
    agent: &Agent,
    workflow: &Workflow,
    team: &[Agent],
) -> Result<String, AgentError> {
    let context = Context::new(workflow.clone(), None);
    execute_task(llm, agent, context.into_messages(), team).await
}
