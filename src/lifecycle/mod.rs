//! Division lifecycles and operator progression through them.
//!
//! - [`schema`] builds the ordered operator steps of every division
//! - [`progression`] derives journeys, next steps and stage durations

pub mod progression;
pub mod schema;

pub use progression::{
    build_journey, division_journey_stats, next_step, stage_durations, DivisionJourneyStats,
    OperatorJourney, Progression, Stage, StageDurationStats,
};
pub use schema::{build_lifecycle_steps, DivisionFilter, LifecycleSchema, LifecycleStep, UNORDERED};
