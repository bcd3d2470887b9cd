use clap::Parser;
use petrel::execution::model::{ExecutionStatus, TriggerKind};
use petrel::{
    load_plan, spawn_worker, EngineError, ExecutionQueue, ExecutionService, Plan, Repository,
    Result, SchedulePoller,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "petrel", about = "HTTP test execution daemon", version)]
struct Args {
    /// Plan file seeding environments, cases, suites and schedules
    #[arg(long, default_value = "plan.json")]
    plan: PathBuf,
    /// Run this suite once and exit instead of staying up as a daemon
    #[arg(long)]
    suite: Option<String>,
    /// Environment name for --suite (defaults to the plan's first)
    #[arg(long)]
    environment: Option<String>,
    /// Seconds between schedule polls in daemon mode
    #[arg(long, default_value_t = 60)]
    poll_interval: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let repository = Arc::new(Repository::new());
    let plan = load_plan(&args.plan, Arc::clone(&repository)).await?;
    let (queue, receiver) = ExecutionQueue::channel();
    let worker = spawn_worker(Arc::clone(&repository), receiver);
    let executions = ExecutionService::new(Arc::clone(&repository), queue);

    if let Some(suite_name) = &args.suite {
        return run_suite_once(&repository, &executions, &plan, suite_name, &args).await;
    }

    let poller = SchedulePoller::new(Arc::clone(&repository), executions);
    info!("petrel daemon up, polling schedules every {}s", args.poll_interval);
    poller.run(Duration::from_secs(args.poll_interval)).await;
    worker.abort();
    Ok(ExitCode::SUCCESS)
}

/// One-shot mode: trigger the suite, watch it to a terminal status, report
/// per case and exit 0 only when everything passed.
async fn run_suite_once(
    repository: &Arc<Repository>,
    executions: &ExecutionService,
    plan: &Plan,
    suite_name: &str,
    args: &Args,
) -> Result<ExitCode> {
    let suite = repository
        .suites()
        .find_by_name(suite_name)
        .await
        .ok_or_else(|| EngineError::Configuration(format!("suite not found: {}", suite_name)))?;
    let environment_id = match &args.environment {
        Some(name) => {
            repository
                .environments()
                .find_by_name(name)
                .await
                .ok_or_else(|| {
                    EngineError::Configuration(format!("environment not found: {}", name))
                })?
                .id
        }
        None => {
            plan.environments
                .first()
                .ok_or_else(|| {
                    EngineError::Configuration("plan has no environments".to_string())
                })?
                .id
                .clone()
        }
    };

    let execution = executions
        .trigger_suite_run(&suite.id, &environment_id, TriggerKind::Manual)
        .await?;
    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    let (execution, details) = loop {
        ticker.tick().await;
        let (execution, details) = executions.execution_progress(&execution.id).await?;
        if execution.status.is_terminal() {
            break (execution, details);
        }
    };

    for detail in &details {
        println!(
            "{:?}  {} ({} ms)",
            detail.status, detail.case_name, detail.duration_ms
        );
        for outcome in detail.assertions.iter().filter(|outcome| !outcome.passed) {
            println!("        {}", outcome.message);
        }
        if let Some(message) = &detail.error_message {
            println!("        {}", message);
        }
    }
    println!(
        "{:?}: {}/{} passed in {} ms",
        execution.status,
        execution.passed_count,
        execution.total_count,
        execution.duration_ms.unwrap_or_default()
    );
    if execution.status == ExecutionStatus::Passed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
