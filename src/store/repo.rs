use crate::case::model::TestCase;
use crate::environment::model::Environment;
use crate::execution::model::{Execution, ExecutionDetail};
use crate::schedule::model::Schedule;
use crate::store::cases::CaseOperations;
use crate::store::environments::EnvironmentOperations;
use crate::store::executions::{ExecutionDetailOperations, ExecutionOperations};
use crate::store::schedules::ScheduleOperations;
use crate::store::suites::SuiteOperations;
use crate::suite::model::Suite;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub(crate) type Shared<T> = Arc<RwLock<HashMap<String, T>>>;

/// In-memory store. Every accessor hands out an operations struct over the
/// shared tables; locks are taken per call and never held across an await.
#[derive(Clone, Default)]
pub struct Repository {
    environments: Shared<Environment>,
    cases: Shared<TestCase>,
    suites: Shared<Suite>,
    executions: Shared<Execution>,
    details: Arc<RwLock<Vec<ExecutionDetail>>>,
    schedules: Shared<Schedule>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environments(&self) -> EnvironmentOperations {
        EnvironmentOperations {
            entities: Arc::clone(&self.environments),
        }
    }

    pub fn cases(&self) -> CaseOperations {
        CaseOperations {
            entities: Arc::clone(&self.cases),
        }
    }

    pub fn suites(&self) -> SuiteOperations {
        SuiteOperations {
            entities: Arc::clone(&self.suites),
        }
    }

    pub fn executions(&self) -> ExecutionOperations {
        ExecutionOperations {
            entities: Arc::clone(&self.executions),
        }
    }

    pub fn execution_details(&self) -> ExecutionDetailOperations {
        ExecutionDetailOperations {
            rows: Arc::clone(&self.details),
        }
    }

    pub fn schedules(&self) -> ScheduleOperations {
        ScheduleOperations {
            entities: Arc::clone(&self.schedules),
        }
    }
}
