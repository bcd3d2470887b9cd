pub mod cases;
pub mod environments;
pub mod executions;
pub mod repo;
pub mod schedules;
pub mod suites;
