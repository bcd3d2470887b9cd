pub mod cron;
pub mod model;
pub mod poller;
pub mod service;
