//! 执行层：上下文构建、回合解释、任务执行主循环与过程事件

pub mod context;
pub mod events;
pub mod interpreter;
pub mod loop_;

pub use context::Context;
pub use events::TaskEvent;
pub use interpreter::{interpret, TurnOutcome};
pub use loop_::{execute_task, execute_workflow, TaskOutcome, TaskSession};
