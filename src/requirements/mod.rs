//! Certification requirement inference.
//!
//! # Modules
//!
//! - [`holdings`] - Distinct valid certifications per operator
//! - [`classification`] - REQUIRED / COMMON / OPTIONAL bands
//! - [`inference`] - Adoption tables per lifecycle step

pub mod classification;
pub mod holdings;
pub mod inference;

pub use classification::{classify, Classification};
pub use holdings::{Holdings, OperatorIndex, StepKey};
pub use inference::{
    infer_requirements, AdoptionInfo, RequirementLookup, RequirementSet, SampleStatus,
    StepRequirements,
};
