pub mod activities;
pub mod plans;
pub mod workouts;
