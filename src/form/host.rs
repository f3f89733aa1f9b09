//! Host-side collaborators of the stacked form.

use super::cta::CtaButton;
use super::step::StepHandle;

/// Returned by [`FormDataSource::collapsed_height`] to let the form pick the height.
pub const AUTOMATIC_ELEMENT_HEIGHT: f32 = -1.0;

/// Returned by [`FormDataSource::cta_button_height`] to let the form pick the height.
pub const AUTOMATIC_CTA_BUTTON_HEIGHT: f32 = -1.0;

/// Supplies the steps of the form and their layout.
pub trait FormDataSource {
    /// Number of steps in the form. Must be between 2 and 4.
    fn number_of_steps(&self) -> usize;

    /// The step shown at `index`.
    fn step(&self, index: usize) -> StepHandle;

    /// Collapsed height of the step at `index`, excluding the overlap space.
    fn collapsed_height(&self, _index: usize) -> f32 {
        AUTOMATIC_ELEMENT_HEIGHT
    }

    fn cta_button_height(&self) -> f32 {
        AUTOMATIC_CTA_BUTTON_HEIGHT
    }
}

/// Lifecycle notifications and CTA styling.
///
/// Every method has an empty default; implement the ones you care about.
pub trait FormDelegate {
    fn will_expand(&self, _index: usize) {}

    fn will_collapse(&self, _index: usize) {}

    fn did_expand(&self, _index: usize) {}

    fn did_collapse(&self, _index: usize) {}

    /// The CTA was tapped on the last step. `steps` holds every step in index order.
    fn did_complete_form(&self, _steps: &[StepHandle]) {}

    fn style_cta_for_valid(&self, _button: &mut CtaButton) {}

    fn style_cta_for_invalid(&self, _button: &mut CtaButton) {}
}
