pub mod executor;
pub mod model;
