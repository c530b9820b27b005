//! Backend services for activity and participant management.
//!
//! This module provides the service layer abstraction over the activity
//! registry along with an in-memory implementation seeded with the school's
//! activity catalogue.

pub mod activities;
mod seed;

pub use activities::*;
pub use seed::seed_activities;
