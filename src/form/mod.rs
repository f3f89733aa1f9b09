//! Stacked form engine.
//!
//! A stacked form shows 2 to 4 steps. Exactly one step is expanded; the others
//! are thin collapsed bars stacked above and below it, each overlapping the
//! previous one. A CTA button at the bottom advances the form and completes it
//! on the last step.
//!
//! The engine is independent of the terminal: steps draw themselves into
//! whatever area the host gives them, and animation timing comes from a
//! [`Scheduler`] the host picks.

pub mod cta;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod registry;
pub mod scheduler;
pub mod step;
pub mod testing;
pub mod transition;

pub use cta::{CtaButton, CtaState};
pub use error::FormError;
pub use host::{FormDataSource, FormDelegate, AUTOMATIC_CTA_BUTTON_HEIGHT, AUTOMATIC_ELEMENT_HEIGHT};
pub use orchestrator::{FormSettings, StackedForm, MAX_STEPS, MIN_STEPS};
pub use registry::{Region, RegionFrame, StepRegistry, StepSlot, SurfaceState};
pub use scheduler::{FrameScheduler, InstantScheduler, ManualScheduler, Scheduler};
pub use step::{
    FormStep, StepHandle, StepNotification, StepNotifier, StepObserver, StepObserverHandle,
    OVERLAP_HEIGHT,
};
pub use transition::{AdvancePolicy, AdvanceTrigger, SlotState};

#[cfg(test)]
mod tests;
