//! Core mosaic algorithm: placement enumeration, matching, orchestration

/// Run orchestration, stage machine, and cancellation
pub mod executor;
/// Photo selection under use-limit and spacing constraints
pub mod matcher;
/// Target cell enumeration with sampled colors
pub mod placement;

pub use executor::{
    CancelToken, GenerationSummary, MosaicEngine, MosaicRequest, RunStatus, Stage, plan_request,
};
