//! Hive 命令行入口
//!
//! 读取 TOML 任务文件（[workflow] + [agent]），用配置中的模型后端执行任务并打印最终结果。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hive::config::load_config;
use hive::llm::create_llm_from_config;
use hive::react::{Context as TaskContext, TaskEvent, TaskSession};
use hive::tools::{ClockTool, EchoTool, ToolRegistry, Typed};
use hive::workflow::TaskFile;

#[derive(Parser, Debug)]
#[command(name = "hive", about = "Run a single agent task to completion")]
struct Args {
    /// 任务文件（TOML）
    #[arg(short, long)]
    task: PathBuf,

    /// 额外配置文件，覆盖 config/default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖 executor.max_turns
    #[arg(long)]
    max_turns: Option<usize>,

    /// 以 JSON 行输出过程事件到 stderr
    #[arg(long)]
    events: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hive::observability::init();
    let args = Args::parse();

    let cfg = load_config(args.config.clone()).context("Failed to load config")?;
    let task = TaskFile::load(&args.task)
        .with_context(|| format!("Failed to load task {}", args.task.display()))?;

    let tools = ToolRegistry::new()
        .with(Typed(EchoTool))
        .with(Typed(ClockTool));
    let agent = task.agent.into_agent(&cfg.llm.model).with_tools(tools);
    let llm = create_llm_from_config(&cfg).context("Failed to create LLM client")?;

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<TaskEvent>();
    let printer = args.events.then(|| {
        tokio::spawn(async move {
            while let Some(ev) = event_rx.recv().await {
                if let Ok(line) = serde_json::to_string(&ev) {
                    eprintln!("{line}");
                }
            }
        })
    });

    let context = TaskContext::new(task.workflow, None);
    let session = TaskSession::new(llm.as_ref(), &agent)
        .with_max_turns(args.max_turns.or(cfg.executor.max_turns))
        .with_preview_chars(cfg.executor.preview_chars);
    let session = if args.events {
        session.with_event_tx(&event_tx)
    } else {
        session
    };

    let outcome = match session.run(context.into_messages()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(kind = err.kind(), error = %err, "Task failed");
            return Err(anyhow::Error::new(err).context("Task failed"));
        }
    };

    drop(session);
    drop(event_tx);
    if let Some(handle) = printer {
        let _ = handle.await;
    }

    let (prompt, completion, total) = llm.token_usage();
    tracing::info!(turns = outcome.turns, prompt, completion, total, "Token usage");
    println!("{}", outcome.result);
    Ok(())
}
