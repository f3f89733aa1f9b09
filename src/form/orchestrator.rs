//! The stacked form: which step is expanded, how it gets there, and what the CTA shows.

use std::rc::{Rc, Weak};
use std::time::Duration;

use super::cta::{CtaButton, CtaState};
use super::error::FormError;
use super::host::{FormDataSource, FormDelegate, AUTOMATIC_CTA_BUTTON_HEIGHT, AUTOMATIC_ELEMENT_HEIGHT};
use super::registry::{RegionFrame, StepRegistry, StepSlot, SurfaceState};
use super::scheduler::Scheduler;
use super::step::{Inbox, StepHandle, StepNotification, StepNotifier, StepObserverHandle, OVERLAP_HEIGHT};
use super::transition::{
    AdvancePolicy, AdvanceTrigger, Continuation, FollowUp, Phase, SlotState, Transition,
    TransitionKind,
};

pub const MIN_STEPS: usize = 2;
pub const MAX_STEPS: usize = 4;

/// Container height used until the host reports a real one.
pub const DEFAULT_CONTAINER_HEIGHT: f32 = 600.0;

/// Engine settings. Built from the `form` section of the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSettings {
    /// Full duration of an animated transition.
    pub animation: Duration,
    /// Collapsed height used when neither the host nor the step provide one.
    pub default_element_height: f32,
    pub default_cta_height: f32,
    /// Drop taps while a slot is expanding or collapsing.
    pub ignore_input_while_animating: bool,
    pub advance: AdvancePolicy,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            animation: Duration::from_millis(300),
            default_element_height: 50.0,
            default_cta_height: 50.0,
            ignore_input_while_animating: true,
            advance: AdvancePolicy::default(),
        }
    }
}

/// Orchestrates a sequence of 2 to 4 steps with exactly one expanded at a time.
///
/// Call [`set_data_source`](Self::set_data_source), optionally
/// [`set_delegate`](Self::set_delegate), then [`setup`](Self::setup). Input is
/// fed through [`tap_step`](Self::tap_step), [`tap_at`](Self::tap_at) and
/// [`tap_cta`](Self::tap_cta); scheduled animation phases and queued step
/// notifications are applied by [`run_pending`](Self::run_pending).
pub struct StackedForm {
    settings: FormSettings,
    data_source: Option<Weak<dyn FormDataSource>>,
    delegate: Option<Weak<dyn FormDelegate>>,
    scheduler: Box<dyn Scheduler>,
    registry: StepRegistry,
    inbox: Inbox,
    installed_observers: Vec<StepObserverHandle>,
    cta: CtaButton,
    /// Step the CTA state was last derived from
    cta_index: usize,
    current_expanded_index: usize,
    container_height: f32,
    is_set_up: bool,
}

impl StackedForm {
    pub fn new(settings: FormSettings, scheduler: Box<dyn Scheduler>) -> Self {
        let cta = CtaButton::new(settings.default_cta_height);
        Self {
            settings,
            data_source: None,
            delegate: None,
            scheduler,
            registry: StepRegistry::new(OVERLAP_HEIGHT),
            inbox: Inbox::new(),
            installed_observers: Vec::new(),
            cta,
            cta_index: 0,
            current_expanded_index: 0,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            is_set_up: false,
        }
    }

    /// The form keeps a weak reference; the host owns the data source.
    pub fn set_data_source<S: FormDataSource + 'static>(&mut self, source: &Rc<S>) {
        let weak = Rc::downgrade(source);
        let weak: Weak<dyn FormDataSource> = weak;
        self.data_source = Some(weak);
    }

    /// The form keeps a weak reference; the host owns the delegate.
    pub fn set_delegate<D: FormDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let weak = Rc::downgrade(delegate);
        let weak: Weak<dyn FormDelegate> = weak;
        self.delegate = Some(weak);
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn container_height(&self) -> f32 {
        self.container_height
    }

    /// Resize the form. An expanded or expanding step follows the new height.
    pub fn set_container_height(&mut self, height: f32) {
        self.container_height = height;
        for index in 0..self.registry.len() {
            if let Some(slot) = self.registry.get_mut(index) {
                if matches!(slot.state, SlotState::Expanded | SlotState::Expanding) {
                    slot.region.height = height;
                }
            }
        }
    }

    /// Reset the form and rebuild it from the data source.
    ///
    /// # Panics
    ///
    /// Panics if no data source is set or it reports fewer than 2 or more than 4
    /// steps. Both are host programming errors.
    pub fn setup(&mut self) {
        if let Err(err) = self.try_setup() {
            panic!("{err}. Terminating.");
        }
    }

    /// Like [`setup`](Self::setup), but hands configuration errors back.
    pub fn try_setup(&mut self) -> Result<(), FormError> {
        let source = self
            .data_source
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(FormError::MissingDataSource)?;

        self.reset();

        let count = source.number_of_steps();
        if count < MIN_STEPS {
            return Err(FormError::TooFewSteps {
                count,
                min: MIN_STEPS,
            });
        }
        if count > MAX_STEPS {
            return Err(FormError::TooManySteps {
                count,
                max: MAX_STEPS,
            });
        }

        let cta_height = source.cta_button_height();
        self.cta = CtaButton::new(if cta_height == AUTOMATIC_CTA_BUTTON_HEIGHT {
            self.settings.default_cta_height
        } else {
            cta_height
        });

        let previous_observers = std::mem::take(&mut self.installed_observers);
        for index in 0..count {
            self.add_step(source.as_ref(), index, &previous_observers);
        }

        self.expand(Transition::expand(0, false));
        self.refresh_cta(0);
        self.is_set_up = true;
        self.run_pending();

        tracing::info!(steps = count, "stacked form set up");
        Ok(())
    }

    fn reset(&mut self) {
        self.registry.clear();
        self.scheduler.cancel_all();
        self.inbox.clear();
        self.current_expanded_index = 0;
        self.cta_index = 0;
        self.cta = CtaButton::new(self.settings.default_cta_height);
        self.is_set_up = false;
    }

    fn add_step(
        &mut self,
        source: &dyn FormDataSource,
        index: usize,
        previous_observers: &[StepObserverHandle],
    ) {
        let step = source.step(index);

        {
            let mut s = step.borrow_mut();
            let adopt = match s.observer() {
                None => true,
                // our own notifier from a previous setup: rebind it to the new index
                Some(existing) => previous_observers
                    .iter()
                    .any(|ours| std::ptr::addr_eq(Rc::as_ptr(ours), Rc::as_ptr(&existing))),
            };
            if adopt {
                let notifier: StepObserverHandle =
                    Rc::new(StepNotifier::new(index, self.inbox.clone()));
                self.installed_observers.push(notifier.clone());
                s.set_observer(notifier);
            }
        }

        let valid = step.borrow().is_valid();
        self.style_cta(valid);

        let height = self.resolve_collapsed_height(source, index, &step);
        self.registry.push(step, height);
        tracing::debug!(index, height, "step slot added");
    }

    fn resolve_collapsed_height(
        &self,
        source: &dyn FormDataSource,
        index: usize,
        step: &StepHandle,
    ) -> f32 {
        let host = source.collapsed_height(index);
        if host != AUTOMATIC_ELEMENT_HEIGHT && host >= 0.0 {
            return host;
        }
        let own = step.borrow().collapsed_height();
        if own >= 0.0 {
            own
        } else {
            self.settings.default_element_height
        }
    }

    pub fn is_set_up(&self) -> bool {
        self.is_set_up
    }

    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    /// Step at `index`, or `None` when the index is out of range.
    pub fn step_at(&self, index: usize) -> Option<StepHandle> {
        self.registry.get(index).map(|slot| slot.step().clone())
    }

    pub fn current_expanded_index(&self) -> usize {
        self.current_expanded_index
    }

    pub fn slot(&self, index: usize) -> Option<&StepSlot> {
        self.registry.get(index)
    }

    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.registry.get(index).map(StepSlot::state)
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn layout(&self) -> Vec<RegionFrame> {
        self.registry.layout()
    }

    pub fn cta(&self) -> &CtaButton {
        &self.cta
    }

    /// The CTA sits at the bottom of the container, above every region.
    pub fn cta_frame(&self) -> RegionFrame {
        RegionFrame {
            index: self.registry.len(),
            top: self.container_height - self.cta.height,
            height: self.cta.height,
        }
    }

    /// True while any slot is expanding or collapsing.
    pub fn is_animating(&self) -> bool {
        self.registry.iter().any(|slot| !slot.state().is_settled())
    }

    /// Whether anything is still scheduled or queued.
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.pending() > 0 || !self.inbox.is_empty()
    }

    /// The default observer for the slot at `index`.
    ///
    /// Hosts that intercept step notifications forward to this to keep the
    /// form's default handling.
    pub fn notifier(&self, index: usize) -> StepNotifier {
        StepNotifier::new(index, self.inbox.clone())
    }

    /// Tap on the region of the step at `index`.
    ///
    /// Returns false when the tap was dropped: unknown index, the step is the
    /// expanded one, or a transition is running.
    pub fn tap_step(&mut self, index: usize) -> bool {
        let Some(slot) = self.registry.get(index) else {
            return false;
        };
        if !slot.region().tap_enabled {
            tracing::debug!(index, "tap on step without tap handler ignored");
            return false;
        }
        if self.input_blocked() {
            return false;
        }
        self.advance(AdvanceTrigger::Tap, index);
        self.run_pending();
        true
    }

    /// Tap at vertical position `y` in form units.
    pub fn tap_at(&mut self, y: f32) -> bool {
        if self.cta.receives_hits() && self.cta_frame().contains(y) {
            return self.tap_cta();
        }
        match self.registry.hit_test(y) {
            Some(index) => self.tap_step(index),
            None => false,
        }
    }

    /// Tap on the CTA button. Hidden or disabled buttons ignore the tap.
    pub fn tap_cta(&mut self) -> bool {
        if !self.is_set_up || !self.cta.accepts_taps() {
            tracing::debug!(
                enabled = self.cta.enabled,
                alpha = self.cta.target_alpha,
                "CTA tap ignored"
            );
            return false;
        }
        let handled = self.cta_action();
        self.run_pending();
        handled
    }

    /// Apply queued step notifications and every continuation that is due.
    pub fn run_pending(&mut self) {
        loop {
            if let Some((index, notification)) = self.inbox.pop() {
                self.handle_notification(index, notification);
                continue;
            }
            match self.scheduler.next_due() {
                Some(continuation) => self.apply(continuation),
                None => break,
            }
        }
    }

    fn input_blocked(&self) -> bool {
        if self.settings.ignore_input_while_animating && self.is_animating() {
            tracing::warn!("input ignored while a transition is running");
            return true;
        }
        false
    }

    fn cta_action(&mut self) -> bool {
        if !self.is_set_up || self.input_blocked() {
            return false;
        }
        let last = self.registry.len() - 1;
        if self.current_expanded_index == last {
            let steps = self.registry.steps();
            tracing::info!(steps = steps.len(), "form completed");
            if let Some(delegate) = self.delegate() {
                delegate.did_complete_form(&steps);
            }
            return true;
        }
        self.advance(AdvanceTrigger::Cta, self.current_expanded_index + 1);
        true
    }

    fn advance(&mut self, trigger: AdvanceTrigger, target: usize) {
        let previous = self.current_expanded_index;
        let transition = self.settings.advance.advance(trigger, previous, target);
        tracing::debug!(?trigger, previous, target, "advancing");
        self.expand(transition);
        self.refresh_cta(target);
    }

    fn handle_notification(&mut self, index: usize, notification: StepNotification) {
        // during an animated expand the CTA already belongs to the incoming step
        if index != self.cta_index {
            tracing::debug!(
                index,
                ?notification,
                "notification from a step that is not expanded ignored"
            );
            return;
        }
        match notification {
            StepNotification::DataBecameInvalid => {
                self.cta.enabled = false;
                self.style_cta(false);
            }
            StepNotification::DataBecameValid => {
                self.cta.enabled = true;
                self.style_cta(true);
            }
            StepNotification::FinishedInput => {
                self.cta_action();
            }
        }
    }

    // ─── Transitions ────────────────────────────────────────────────────────

    fn begin(&mut self, transition: Transition) {
        match transition.kind {
            TransitionKind::Expand => self.expand(transition),
            TransitionKind::Collapse => self.collapse(transition),
        }
    }

    fn expand(&mut self, transition: Transition) {
        let index = transition.index;
        let Some(step) = self.step_at(index) else {
            return;
        };
        if let Some(delegate) = self.delegate() {
            delegate.will_expand(index);
        }

        step.borrow_mut().prepare_to_expand();
        let background = step.borrow().collapsed_background();
        let container_height = self.container_height;
        if let Some(slot) = self.registry.get_mut(index) {
            slot.region.tap_enabled = false;
            slot.region.expanded = SurfaceState::hidden();
            slot.region.background = background;
            slot.region.height = container_height;
        }

        self.set_state(index, SlotState::Expanding);
        if transition.animated {
            self.schedule_opening(&transition);
        } else {
            self.finish_fade_out(index, TransitionKind::Expand);
            self.settle(index, TransitionKind::Expand, transition.follow_up);
        }
    }

    fn collapse(&mut self, transition: Transition) {
        let index = transition.index;
        let Some(step) = self.step_at(index) else {
            return;
        };
        if let Some(delegate) = self.delegate() {
            delegate.will_collapse(index);
        }

        step.borrow_mut().prepare_to_collapse();
        let background = step.borrow().expanded_background();
        let overlap = self.registry.overlap();
        if let Some(slot) = self.registry.get_mut(index) {
            slot.region.tap_enabled = true;
            slot.region.collapsed = SurfaceState::hidden();
            slot.region.background = background;
            slot.region.height = slot.collapsed_height() + overlap;
        }

        self.set_state(index, SlotState::Collapsing);
        if transition.animated {
            self.schedule_opening(&transition);
        } else {
            self.finish_fade_out(index, TransitionKind::Collapse);
            self.settle(index, TransitionKind::Collapse, transition.follow_up);
        }
    }

    fn schedule_opening(&mut self, transition: &Transition) {
        tracing::debug!(
            index = transition.index,
            kind = ?transition.kind,
            "animated transition started"
        );
        for (phase, delay) in transition.opening_phases(self.settings.animation) {
            self.scheduler
                .schedule(delay, transition.continuation(phase));
        }
    }

    fn apply(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::CtaFade { alpha } => {
                self.cta.alpha = alpha;
            }
            Continuation::Phase {
                index,
                kind,
                phase,
                follow_up,
            } => {
                // the fade-in ends together with the settle point and may land after it
                if phase == Phase::FadeIn {
                    self.finish_fade_in(index, kind);
                    return;
                }
                let expected = match kind {
                    TransitionKind::Expand => SlotState::Expanding,
                    TransitionKind::Collapse => SlotState::Collapsing,
                };
                if self.slot_state(index) != Some(expected) {
                    tracing::debug!(index, ?phase, "stale transition phase dropped");
                    return;
                }
                match phase {
                    Phase::FadeOut => {
                        self.finish_fade_out(index, kind);
                        self.scheduler.schedule(
                            self.settings.animation / 2,
                            Continuation::Phase {
                                index,
                                kind,
                                phase: Phase::FadeIn,
                                follow_up: None,
                            },
                        );
                    }
                    Phase::FadeIn => {}
                    Phase::Settle => self.settle(index, kind, follow_up),
                }
            }
        }
    }

    /// The outgoing surface is gone. For an expand this is the swap point.
    fn finish_fade_out(&mut self, index: usize, kind: TransitionKind) {
        if let Some(slot) = self.registry.get_mut(index) {
            match kind {
                TransitionKind::Expand => slot.region.collapsed = SurfaceState::detached(),
                TransitionKind::Collapse => slot.region.expanded = SurfaceState::detached(),
            }
        }
        if kind == TransitionKind::Expand {
            self.current_expanded_index = index;
            tracing::debug!(index, "expanded index updated");
        }
    }

    fn finish_fade_in(&mut self, index: usize, kind: TransitionKind) {
        if let Some(slot) = self.registry.get_mut(index) {
            let surface = match kind {
                TransitionKind::Expand => &mut slot.region.expanded,
                TransitionKind::Collapse => &mut slot.region.collapsed,
            };
            if surface.attached {
                surface.alpha = 1.0;
            }
        }
    }

    fn settle(&mut self, index: usize, kind: TransitionKind, follow_up: Option<FollowUp>) {
        let Some(step) = self.step_at(index) else {
            return;
        };
        let background = match kind {
            TransitionKind::Expand => step.borrow().expanded_background(),
            TransitionKind::Collapse => step.borrow().collapsed_background(),
        };
        if let Some(slot) = self.registry.get_mut(index) {
            slot.region.background = background;
            match kind {
                TransitionKind::Expand => {
                    slot.region.collapsed = SurfaceState::detached();
                    slot.region.expanded = SurfaceState::shown();
                    slot.state = SlotState::Expanded;
                }
                TransitionKind::Collapse => {
                    slot.region.expanded = SurfaceState::detached();
                    slot.region.collapsed = SurfaceState::shown();
                    slot.state = SlotState::Collapsed;
                }
            }
        }
        tracing::debug!(index, ?kind, "transition settled");

        if let Some(delegate) = self.delegate() {
            match kind {
                TransitionKind::Expand => delegate.did_expand(index),
                TransitionKind::Collapse => delegate.did_collapse(index),
            }
        }

        if let Some(FollowUp::Collapse { index, animated }) = follow_up {
            self.begin(Transition::collapse(index, animated));
        }
    }

    fn set_state(&mut self, index: usize, state: SlotState) {
        if let Some(slot) = self.registry.get_mut(index) {
            slot.state = state;
        }
    }

    // ─── CTA ────────────────────────────────────────────────────────────────

    fn refresh_cta(&mut self, index: usize) {
        let Some(step) = self.step_at(index) else {
            return;
        };
        let state = CtaState::for_step(&*step.borrow());

        if let Some(label) = &state.label {
            self.cta.title = label.clone();
        }
        let alpha = state.target_alpha();
        self.cta.target_alpha = alpha;
        self.cta_index = index;
        self.scheduler
            .schedule(self.settings.animation, Continuation::CtaFade { alpha });

        self.cta.enabled = state.enabled;
        self.style_cta(state.enabled);
    }

    fn style_cta(&mut self, valid: bool) {
        if let Some(delegate) = self.delegate() {
            if valid {
                delegate.style_cta_for_valid(&mut self.cta);
            } else {
                delegate.style_cta_for_invalid(&mut self.cta);
            }
        }
    }

    fn delegate(&self) -> Option<Rc<dyn FormDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }
}
