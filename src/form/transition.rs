//! Transition descriptions and the continuations scheduled to run them.
//!
//! An animated transition is split into three phases that all start from the
//! same moment: the outgoing surface fades out over half the duration, the
//! incoming surface fades in over the second half, and the region background
//! cross-fades over the full duration. Each phase is scheduled as a
//! [`Continuation`] and its end state is applied when the scheduler hands it back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Visual state of a single step slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
}

impl SlotState {
    pub fn is_settled(self) -> bool {
        matches!(self, SlotState::Collapsed | SlotState::Expanded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Expand,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Outgoing surface reaches alpha 0 and is detached.
    FadeOut,
    /// Incoming surface reaches alpha 1.
    FadeIn,
    /// Background and layout reach their end state; the slot settles.
    Settle,
}

/// Work chained onto the settle point of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Collapse { index: usize, animated: bool },
}

/// One expand or collapse of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub index: usize,
    pub kind: TransitionKind,
    pub animated: bool,
    pub follow_up: Option<FollowUp>,
}

impl Transition {
    pub fn expand(index: usize, animated: bool) -> Self {
        Self {
            index,
            kind: TransitionKind::Expand,
            animated,
            follow_up: None,
        }
    }

    pub fn collapse(index: usize, animated: bool) -> Self {
        Self {
            index,
            kind: TransitionKind::Collapse,
            animated,
            follow_up: None,
        }
    }

    pub fn then(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    /// Phases scheduled when the transition starts, with their delays.
    ///
    /// `FadeIn` is not listed: it is scheduled once `FadeOut` completes.
    pub fn opening_phases(&self, duration: Duration) -> [(Phase, Duration); 2] {
        [(Phase::FadeOut, duration / 2), (Phase::Settle, duration)]
    }

    pub fn continuation(&self, phase: Phase) -> Continuation {
        Continuation::Phase {
            index: self.index,
            kind: self.kind,
            phase,
            follow_up: if phase == Phase::Settle {
                self.follow_up
            } else {
                None
            },
        }
    }
}

/// A deferred end-state mutation handed to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Continuation {
    Phase {
        index: usize,
        kind: TransitionKind,
        phase: Phase,
        follow_up: Option<FollowUp>,
    },
    /// CTA alpha reaches its target.
    CtaFade { alpha: f32 },
}

/// What caused the form to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    /// The user tapped a collapsed step.
    Tap,
    /// The CTA button was tapped, or a step finished its input.
    Cta,
}

/// Animation policy for the two halves of an advance.
///
/// Tap advances expand animated; CTA advances expand without animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancePolicy {
    #[serde(default = "default_true")]
    pub tap_expand_animated: bool,
    #[serde(default)]
    pub tap_collapse_animated: bool,
    #[serde(default)]
    pub cta_expand_animated: bool,
    #[serde(default)]
    pub cta_collapse_animated: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AdvancePolicy {
    fn default() -> Self {
        Self {
            tap_expand_animated: true,
            tap_collapse_animated: false,
            cta_expand_animated: false,
            cta_collapse_animated: false,
        }
    }
}

impl AdvancePolicy {
    /// Build the expand transition for `target`, chained to collapse `previous`.
    pub fn advance(&self, trigger: AdvanceTrigger, previous: usize, target: usize) -> Transition {
        let (expand_animated, collapse_animated) = match trigger {
            AdvanceTrigger::Tap => (self.tap_expand_animated, self.tap_collapse_animated),
            AdvanceTrigger::Cta => (self.cta_expand_animated, self.cta_collapse_animated),
        };
        Transition::expand(target, expand_animated).then(FollowUp::Collapse {
            index: previous,
            animated: collapse_animated,
        })
    }
}
