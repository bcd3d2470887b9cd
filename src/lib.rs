//! Declarative HTTP test execution engine: cases render `{{var}}` templates
//! against an environment, responses feed extractors and assertions, and
//! suites run sequentially or in parallel, on demand or on a cron schedule.

pub mod assertion;
pub mod case;
pub mod environment;
pub mod error;
pub mod execution;
pub mod extractor;
pub mod http;
pub mod plan;
pub mod schedule;
pub mod store;
pub mod suite;
pub mod variable;
pub mod worker;

pub use case::executor::CaseExecutor;
pub use error::{EngineError, Result};
pub use execution::service::ExecutionService;
pub use http::ApiClient;
pub use plan::{load_plan, Plan};
pub use schedule::poller::SchedulePoller;
pub use schedule::service::ScheduleService;
pub use store::repo::Repository;
pub use suite::runner::SuiteRunner;
pub use variable::VariableContext;
pub use worker::{spawn_worker, ExecutionQueue};
