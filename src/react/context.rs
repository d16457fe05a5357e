//! 上下文构建
//!
//! Context = 工作流引用 + 已累积的消息序列。构建时在最前面放入唯一一条 assistant 种子消息，
//! 用固定模板写入工作流的 description 与 output；调用方提供的历史消息原样跟在其后。
//! Context 不就地修改：extended 返回追加了新消息的新 Context。

use crate::memory::Message;
use crate::workflow::Workflow;

/// 任务上下文
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub workflow: Workflow,
    pub messages: Vec<Message>,
}

/// 种子消息模板
pub fn workflow_brief(workflow: &Workflow) -> String {
    format!(
        "Here is description of the workflow and expected output by the user:\n\
         <workflow>{}</workflow>\n\
         <output>{}</output>",
        workflow.description, workflow.output
    )
}

impl Context {
    /// 以工作流种子消息开头；prior 中的消息保持原顺序追加在种子之后
    pub fn new(workflow: Workflow, prior: Option<Vec<Message>>) -> Self {
        let mut messages = vec![Message::assistant(workflow_brief(&workflow))];
        messages.extend(prior.unwrap_or_default());
        Self { workflow, messages }
    }

    /// 返回追加 new 后的新上下文，自身不变
    pub fn extended(&self, new: impl IntoIterator<Item = Message>) -> Self {
        let mut messages = self.messages.clone();
        messages.extend(new);
        Self {
            workflow: self.workflow.clone(),
            messages,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Role;

    #[test]
    fn test_seeds_exactly_one_message() {
        let wf = Workflow::new("Plan a 3-day trip to Lisbon", "A day-by-day itinerary");
        let ctx = Context::new(wf, None);
        assert_eq!(ctx.messages.len(), 1);
        let seed = &ctx.messages[0];
        assert_eq!(seed.role, Role::Assistant);
        assert!(seed.content.contains("Plan a 3-day trip to Lisbon"));
        assert!(seed.content.contains("A day-by-day itinerary"));
    }

    #[test]
    fn test_empty_fields_render_into_template() {
        let ctx = Context::new(Workflow::default(), None);
        assert!(ctx.messages[0].content.contains("<workflow></workflow>"));
        assert!(ctx.messages[0].content.contains("<output></output>"));
    }

    #[test]
    fn test_prior_messages_follow_seed_in_order() {
        let prior = vec![Message::user("first"), Message::assistant("second")];
        let ctx = Context::new(Workflow::new("d", "o"), Some(prior.clone()));
        assert_eq!(ctx.messages.len(), 3);
        assert_eq!(&ctx.messages[1..], prior.as_slice());
    }

    #[test]
    fn test_extended_leaves_original_untouched() {
        let ctx = Context::new(Workflow::new("d", "o"), None);
        let next = ctx.extended([Message::assistant("step result")]);
        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(next.messages.len(), 2);
        assert_eq!(next.messages[0], ctx.messages[0]);
    }
}
