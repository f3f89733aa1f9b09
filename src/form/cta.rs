//! Call-to-action button and the state derived for it from the expanded step.

use ratatui::style::{Color, Style};

use super::step::FormStep;

/// Below this alpha the button no longer receives taps.
const HIT_TEST_ALPHA: f32 = 0.01;

/// The single button at the bottom of the form that drives it forward.
#[derive(Debug, Clone, PartialEq)]
pub struct CtaButton {
    /// Last title shown. Kept while the button is faded out.
    pub title: String,
    pub enabled: bool,
    /// Drawn alpha. Reaches `target_alpha` when the fade ends.
    pub alpha: f32,
    /// Alpha the button is fading to. Hit testing follows this one.
    pub target_alpha: f32,
    pub height: f32,
    /// Style applied by the host's valid/invalid styling callbacks.
    pub style: Style,
}

impl CtaButton {
    pub fn new(height: f32) -> Self {
        Self {
            title: String::new(),
            enabled: true,
            alpha: 1.0,
            target_alpha: 1.0,
            height,
            style: Style::default().bg(Color::Green).fg(Color::Black),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.alpha > 0.0
    }

    /// Whether the button takes hits at all, even disabled. A button fading
    /// out lets taps through from the start of the fade.
    pub fn receives_hits(&self) -> bool {
        self.target_alpha >= HIT_TEST_ALPHA
    }

    /// Whether a tap on the button reaches the form.
    pub fn accepts_taps(&self) -> bool {
        self.enabled && self.receives_hits()
    }
}

/// CTA state as a pure function of the expanded step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaState {
    /// Title to show, `None` when the button should fade out.
    pub label: Option<String>,
    pub enabled: bool,
}

impl CtaState {
    pub fn for_step(step: &dyn FormStep) -> Self {
        Self {
            label: step.cta_label(),
            enabled: step.is_valid(),
        }
    }

    pub fn target_alpha(&self) -> f32 {
        if self.label.is_some() {
            1.0
        } else {
            0.0
        }
    }
}
