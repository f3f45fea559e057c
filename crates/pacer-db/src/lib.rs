//! PostgreSQL storage for pacer: training plans, scheduled workouts and
//! ingested activities.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
