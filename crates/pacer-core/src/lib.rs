pub mod config;
pub mod ingest;
pub mod planner;
pub mod reconcile;
pub mod tools;
