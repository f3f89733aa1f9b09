//! Tests for the stacked form orchestration

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use ratatui::style::Color;

use super::testing::{is_same_step, FormEvent, RecordingDelegate, TestDataSource, TestStep};
use super::*;

const HALF: Duration = Duration::from_millis(150);

fn form_with(source: &Rc<TestDataSource>, delegate: &Rc<RecordingDelegate>) -> StackedForm {
    let mut form = StackedForm::new(FormSettings::default(), Box::new(InstantScheduler::new()));
    form.set_data_source(source);
    form.set_delegate(delegate);
    form
}

fn build(n: usize) -> (StackedForm, Rc<TestDataSource>, Rc<RecordingDelegate>) {
    let source = Rc::new(TestDataSource::with_steps(n));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();
    (form, source, delegate)
}

fn build_manual(
    n: usize,
    settings: FormSettings,
) -> (
    StackedForm,
    ManualScheduler,
    Rc<TestDataSource>,
    Rc<RecordingDelegate>,
) {
    let clock = ManualScheduler::new();
    let source = Rc::new(TestDataSource::with_steps(n));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = StackedForm::new(settings, Box::new(clock.clone()));
    form.set_data_source(&source);
    form.set_delegate(&delegate);
    form.setup();
    (form, clock, source, delegate)
}

fn tick(form: &mut StackedForm, clock: &ManualScheduler, by: Duration) {
    clock.advance(by);
    form.run_pending();
}

fn expanded_count(form: &StackedForm) -> usize {
    (0..form.step_count())
        .filter(|i| form.slot_state(*i) == Some(SlotState::Expanded))
        .count()
}

// ─── Setup ──────────────────────────────────────────────────────────────────

#[test]
fn test_setup_builds_one_slot_per_step() {
    for n in MIN_STEPS..=MAX_STEPS {
        let (form, _source, _delegate) = build(n);

        assert!(form.is_set_up());
        assert_eq!(form.step_count(), n);
        assert_eq!(form.current_expanded_index(), 0);
        assert_eq!(form.slot_state(0), Some(SlotState::Expanded));
        for i in 1..n {
            assert_eq!(form.slot_state(i), Some(SlotState::Collapsed), "step {i}");
        }
    }
}

#[test]
fn test_setup_lays_out_expanded_and_collapsed_regions() {
    let (form, _source, _delegate) = build(3);

    let first = form.slot(0).unwrap().region();
    assert!(!first.tap_enabled);
    assert_eq!(first.height, form.container_height());
    assert!(first.expanded.is_visible());
    assert!(!first.collapsed.attached);
    assert_eq!(first.background, Color::Black);

    let second = form.slot(1).unwrap().region();
    assert!(second.tap_enabled);
    assert_eq!(second.height, 40.0 + OVERLAP_HEIGHT);
    assert!(second.collapsed.is_visible());
    assert!(!second.expanded.attached);
    assert_eq!(second.background, Color::DarkGray);
}

#[test]
fn test_setup_expands_first_step_without_animation() {
    let (form, _clock, source, delegate) = build_manual(2, FormSettings::default());

    // no clock movement needed
    assert_eq!(form.slot_state(0), Some(SlotState::Expanded));
    assert_eq!(
        delegate.lifecycle(),
        vec![FormEvent::WillExpand(0), FormEvent::DidExpand(0)]
    );
    assert_eq!(source.steps[0].borrow().prepared_to_expand.get(), 1);
    assert_eq!(source.steps[1].borrow().prepared_to_expand.get(), 0);
}

#[test]
fn test_setup_styles_cta_for_each_step_then_expanded_one() {
    let steps = vec![
        TestStep::new("a").into_handle(),
        TestStep::new("b").with_valid(false).into_handle(),
    ];
    let source = Rc::new(TestDataSource::new(steps));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    let styles: Vec<FormEvent> = delegate
        .events()
        .into_iter()
        .filter(|e| matches!(e, FormEvent::StyledValid | FormEvent::StyledInvalid))
        .collect();
    assert_eq!(
        styles,
        vec![
            FormEvent::StyledValid,
            FormEvent::StyledInvalid,
            FormEvent::StyledValid
        ]
    );
    assert_eq!(form.cta().style.bg, Some(Color::Green));
}

#[test]
fn test_setup_rejects_too_few_steps() {
    let source = Rc::new(TestDataSource::with_steps(2));
    source.count.set(1);
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);

    assert_eq!(
        form.try_setup(),
        Err(FormError::TooFewSteps { count: 1, min: 2 })
    );
    assert_eq!(form.step_count(), 0);
    assert!(!form.is_set_up());
    assert!(delegate.events().is_empty());
}

#[test]
fn test_setup_rejects_too_many_steps() {
    let source = Rc::new(TestDataSource::with_steps(4));
    source.count.set(5);
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);

    assert_eq!(
        form.try_setup(),
        Err(FormError::TooManySteps { count: 5, max: 4 })
    );
    assert_eq!(form.step_count(), 0);
}

#[test]
#[should_panic(expected = "cannot be greater than 4")]
fn test_setup_panics_on_invalid_step_count() {
    let source = Rc::new(TestDataSource::with_steps(4));
    source.count.set(5);
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();
}

#[test]
#[should_panic(expected = "data source")]
fn test_setup_panics_without_data_source() {
    let mut form = StackedForm::new(FormSettings::default(), Box::new(InstantScheduler::new()));
    form.setup();
}

#[test]
fn test_setup_fails_when_data_source_dropped() {
    let mut form = StackedForm::new(FormSettings::default(), Box::new(InstantScheduler::new()));
    {
        let source = Rc::new(TestDataSource::with_steps(2));
        form.set_data_source(&source);
    }
    assert_eq!(form.try_setup(), Err(FormError::MissingDataSource));
}

#[test]
fn test_failed_setup_tears_down_previous_slots() {
    let (mut form, source, _delegate) = build(3);
    assert_eq!(form.step_count(), 3);

    source.count.set(7);
    assert!(form.try_setup().is_err());
    assert_eq!(form.step_count(), 0);
    assert!(form.step_at(0).is_none());
}

#[test]
fn test_setup_twice_matches_setup_once() {
    let (once, _s1, d1) = build(4);

    let source = Rc::new(TestDataSource::with_steps(4));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut twice = form_with(&source, &delegate);
    twice.setup();
    twice.tap_step(2);
    delegate.clear();
    twice.setup();

    assert_eq!(twice.step_count(), once.step_count());
    assert_eq!(twice.current_expanded_index(), once.current_expanded_index());
    assert_eq!(twice.layout(), once.layout());
    assert_eq!(twice.cta(), once.cta());
    for i in 0..4 {
        assert_eq!(twice.slot_state(i), once.slot_state(i));
        assert_eq!(
            twice.slot(i).unwrap().region(),
            once.slot(i).unwrap().region()
        );
    }
    assert_eq!(delegate.lifecycle(), d1.lifecycle());
    assert_eq!(source.count_queries.get(), 2);
}

#[test]
fn test_setup_again_rebinds_default_observers() {
    let (mut form, source, _delegate) = build(3);
    form.setup();

    form.tap_step(1);
    source.steps[1].borrow_mut().set_valid(false);
    form.run_pending();
    assert!(!form.cta().enabled);
}

#[test]
fn test_collapsed_height_resolution() {
    let steps = vec![
        TestStep::new("a").into_handle(),
        TestStep::new("b").with_height(25.0).into_handle(),
        TestStep::new("c").with_height(-1.0).into_handle(),
    ];
    let mut source = TestDataSource::new(steps);
    source.collapsed_heights = Some(vec![
        70.0,
        AUTOMATIC_ELEMENT_HEIGHT,
        AUTOMATIC_ELEMENT_HEIGHT,
    ]);
    source.cta_height = 80.0;
    let source = Rc::new(source);
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    assert_eq!(form.slot(0).unwrap().collapsed_height(), 70.0);
    assert_eq!(form.slot(1).unwrap().collapsed_height(), 25.0);
    assert_eq!(
        form.slot(2).unwrap().collapsed_height(),
        form.settings().default_element_height
    );
    assert_eq!(form.cta().height, 80.0);
}

// ─── Tap to expand ──────────────────────────────────────────────────────────

#[test]
fn test_tap_expands_target_then_collapses_previous() {
    let (mut form, _source, delegate) = build(4);
    delegate.clear();

    assert!(form.tap_step(2));

    assert_eq!(form.current_expanded_index(), 2);
    assert_eq!(form.slot_state(2), Some(SlotState::Expanded));
    assert_eq!(form.slot_state(0), Some(SlotState::Collapsed));
    assert_eq!(
        delegate.lifecycle(),
        vec![
            FormEvent::WillExpand(2),
            FormEvent::DidExpand(2),
            FormEvent::WillCollapse(0),
            FormEvent::DidCollapse(0),
        ]
    );
}

#[test]
fn test_tap_runs_prepare_hooks() {
    let (mut form, source, _delegate) = build(2);
    form.tap_step(1);

    assert_eq!(source.steps[1].borrow().prepared_to_expand.get(), 1);
    assert_eq!(source.steps[0].borrow().prepared_to_collapse.get(), 1);
    assert_eq!(source.steps[1].borrow().prepared_to_collapse.get(), 0);
}

#[test]
fn test_tap_swaps_tap_handlers() {
    let (mut form, _source, _delegate) = build(3);
    form.tap_step(1);

    assert!(form.slot(0).unwrap().region().tap_enabled);
    assert!(!form.slot(1).unwrap().region().tap_enabled);
    assert_eq!(form.slot(0).unwrap().region().height, 40.0 + OVERLAP_HEIGHT);
    assert_eq!(form.slot(1).unwrap().region().height, form.container_height());
}

#[test]
fn test_tap_on_expanded_step_is_ignored() {
    let (mut form, _source, delegate) = build(3);
    delegate.clear();

    assert!(!form.tap_step(0));
    assert!(delegate.events().is_empty());
    assert_eq!(form.current_expanded_index(), 0);
}

#[test]
fn test_tap_out_of_range_is_ignored() {
    let (mut form, _source, _delegate) = build(2);
    assert!(!form.tap_step(2));
    assert!(!form.tap_step(usize::MAX));
}

#[test]
fn test_exactly_one_step_expanded_after_every_tap() {
    let (mut form, _source, delegate) = build(4);
    for target in [3, 1, 2, 0, 3, 2] {
        delegate.clear();
        assert!(form.tap_step(target));
        assert_eq!(form.current_expanded_index(), target);
        assert_eq!(expanded_count(&form), 1);
        assert!(!form.is_animating());

        let did: Vec<FormEvent> = delegate
            .lifecycle()
            .into_iter()
            .filter(|e| matches!(e, FormEvent::DidExpand(_) | FormEvent::DidCollapse(_)))
            .collect();
        assert_eq!(did.len(), 2);
        assert_eq!(did[0], FormEvent::DidExpand(target));
    }
}

#[test]
fn test_animated_expand_updates_index_at_midpoint() {
    let (mut form, clock, _source, _delegate) = build_manual(3, FormSettings::default());

    assert!(form.tap_step(1));
    assert_eq!(form.slot_state(1), Some(SlotState::Expanding));
    assert_eq!(form.current_expanded_index(), 0);
    let region = form.slot(1).unwrap().region();
    assert!(region.collapsed.is_visible());
    assert!(region.expanded.attached);
    assert_eq!(region.expanded.alpha, 0.0);
    // background still the collapsed one until the cross-fade ends
    assert_eq!(region.background, Color::DarkGray);

    tick(&mut form, &clock, HALF);
    assert_eq!(form.current_expanded_index(), 1);
    assert_eq!(form.slot_state(1), Some(SlotState::Expanding));
    assert!(!form.slot(1).unwrap().region().collapsed.attached);
    // previous step is untouched until the expand settles
    assert_eq!(form.slot_state(0), Some(SlotState::Expanded));

    tick(&mut form, &clock, HALF);
    assert_eq!(form.slot_state(1), Some(SlotState::Expanded));
    assert_eq!(form.slot_state(0), Some(SlotState::Collapsed));
    let region = form.slot(1).unwrap().region();
    assert!(region.expanded.is_visible());
    assert_eq!(region.expanded.alpha, 1.0);
    assert_eq!(region.background, Color::Black);
}

#[test]
fn test_input_ignored_while_animating() {
    let (mut form, clock, _source, delegate) = build_manual(3, FormSettings::default());

    assert!(form.tap_step(1));
    delegate.clear();
    assert!(form.is_animating());
    assert!(!form.tap_step(2));
    assert!(!form.tap_cta());
    assert!(delegate.lifecycle().is_empty());

    tick(&mut form, &clock, HALF * 2);
    assert!(!form.is_animating());
    assert!(form.tap_step(2));
}

#[test]
fn test_input_accepted_while_animating_when_hardening_disabled() {
    let settings = FormSettings {
        ignore_input_while_animating: false,
        ..FormSettings::default()
    };
    let (mut form, _clock, _source, _delegate) = build_manual(3, settings);

    assert!(form.tap_step(1));
    assert!(form.tap_step(2));
}

// ─── CTA ────────────────────────────────────────────────────────────────────

#[test]
fn test_cta_advances_to_next_step() {
    let (mut form, _source, delegate) = build(3);
    delegate.clear();

    assert!(form.tap_cta());

    assert_eq!(form.current_expanded_index(), 1);
    assert_eq!(form.slot_state(1), Some(SlotState::Expanded));
    assert_eq!(form.slot_state(0), Some(SlotState::Collapsed));
    assert_eq!(
        delegate.lifecycle(),
        vec![
            FormEvent::WillExpand(1),
            FormEvent::DidExpand(1),
            FormEvent::WillCollapse(0),
            FormEvent::DidCollapse(0),
        ]
    );
}

#[test]
fn test_cta_expand_is_not_animated() {
    let (mut form, _clock, _source, _delegate) = build_manual(3, FormSettings::default());

    assert!(form.tap_cta());
    // settled without moving the clock
    assert_eq!(form.current_expanded_index(), 1);
    assert_eq!(form.slot_state(1), Some(SlotState::Expanded));
    assert_eq!(form.slot_state(0), Some(SlotState::Collapsed));
}

#[test]
fn test_cta_collapse_can_be_animated_by_policy() {
    let mut settings = FormSettings::default();
    settings.advance.cta_collapse_animated = true;
    let (mut form, clock, _source, delegate) = build_manual(3, settings);
    delegate.clear();

    form.tap_cta();
    assert_eq!(form.slot_state(1), Some(SlotState::Expanded));
    assert_eq!(form.slot_state(0), Some(SlotState::Collapsing));
    assert_eq!(form.slot(0).unwrap().region().background, Color::Black);

    tick(&mut form, &clock, HALF * 2);
    assert_eq!(form.slot_state(0), Some(SlotState::Collapsed));
    assert_eq!(form.slot(0).unwrap().region().background, Color::DarkGray);
    assert!(form.slot(0).unwrap().region().collapsed.is_visible());
    assert_eq!(
        delegate.lifecycle(),
        vec![
            FormEvent::WillExpand(1),
            FormEvent::DidExpand(1),
            FormEvent::WillCollapse(0),
            FormEvent::DidCollapse(0),
        ]
    );
}

#[test]
fn test_cta_on_last_step_completes_form() {
    let (mut form, source, delegate) = build(3);
    form.tap_step(2);
    delegate.clear();

    assert!(form.tap_cta());

    assert_eq!(delegate.events(), vec![FormEvent::Completed(3)]);
    let completed = delegate.completed_with.borrow();
    assert_eq!(completed.len(), 3);
    for (handle, step) in completed.iter().zip(&source.steps) {
        assert!(is_same_step(handle, step));
    }
    assert_eq!(form.current_expanded_index(), 2);
    assert_eq!(form.slot_state(2), Some(SlotState::Expanded));
}

#[test]
fn test_cta_walks_whole_form() {
    let (mut form, _source, delegate) = build(4);
    for expected in 1..4 {
        form.tap_cta();
        assert_eq!(form.current_expanded_index(), expected);
    }
    delegate.clear();
    form.tap_cta();
    assert_eq!(delegate.lifecycle(), vec![FormEvent::Completed(4)]);
}

#[test]
fn test_cta_reflects_expanded_step() {
    let steps = vec![
        TestStep::new("a").with_label(Some("Continue")).into_handle(),
        TestStep::new("b").with_label(None).with_valid(false).into_handle(),
        TestStep::new("c").with_label(Some("Submit")).into_handle(),
    ];
    let source = Rc::new(TestDataSource::new(steps));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    assert_eq!(form.cta().title, "Continue");
    assert!(form.cta().enabled);
    assert_eq!(form.cta().alpha, 1.0);

    form.tap_cta();
    // label kept while faded out
    assert_eq!(form.cta().title, "Continue");
    assert_eq!(form.cta().alpha, 0.0);
    assert!(!form.cta().enabled);
    assert_eq!(form.cta().style.bg, Some(Color::DarkGray));

    form.tap_step(2);
    assert_eq!(form.cta().title, "Submit");
    assert_eq!(form.cta().alpha, 1.0);
    assert!(form.cta().enabled);
    assert_eq!(form.cta().style.bg, Some(Color::Green));
}

#[test]
fn test_cta_fades_over_animation_duration() {
    let steps = vec![
        TestStep::new("a").into_handle(),
        TestStep::new("b").with_label(None).into_handle(),
    ];
    let clock = ManualScheduler::new();
    let source = Rc::new(TestDataSource::new(steps));
    let mut form = StackedForm::new(FormSettings::default(), Box::new(clock.clone()));
    form.set_data_source(&source);
    form.setup();
    tick(&mut form, &clock, HALF * 2);

    form.tap_cta();
    assert_eq!(form.cta().alpha, 1.0);
    tick(&mut form, &clock, HALF);
    assert_eq!(form.cta().alpha, 1.0);
    tick(&mut form, &clock, HALF);
    assert_eq!(form.cta().alpha, 0.0);
}

#[test]
fn test_disabled_cta_ignores_taps() {
    let steps = vec![
        TestStep::new("a").with_valid(false).into_handle(),
        TestStep::new("b").into_handle(),
    ];
    let source = Rc::new(TestDataSource::new(steps));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    assert!(!form.cta().enabled);
    assert!(!form.tap_cta());
    assert_eq!(form.current_expanded_index(), 0);
}

#[test]
fn test_hidden_cta_ignores_taps() {
    let steps = vec![
        TestStep::new("a").with_label(None).into_handle(),
        TestStep::new("b").into_handle(),
    ];
    let source = Rc::new(TestDataSource::new(steps));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    assert!(!form.cta().is_visible());
    assert!(!form.tap_cta());
    assert_eq!(form.current_expanded_index(), 0);
}

#[test]
fn test_cta_tap_before_setup_is_ignored() {
    let mut form = StackedForm::new(FormSettings::default(), Box::new(InstantScheduler::new()));
    assert!(!form.tap_cta());
    assert!(!form.tap_at(590.0));
}

// ─── Step notifications ─────────────────────────────────────────────────────

#[test]
fn test_validity_notifications_toggle_cta() {
    let (mut form, source, delegate) = build(2);
    delegate.clear();

    source.steps[0].borrow_mut().set_valid(false);
    form.run_pending();
    assert!(!form.cta().enabled);
    assert_eq!(form.cta().style.bg, Some(Color::DarkGray));
    assert_eq!(delegate.events(), vec![FormEvent::StyledInvalid]);

    source.steps[0].borrow_mut().set_valid(true);
    form.run_pending();
    assert!(form.cta().enabled);
    assert_eq!(form.cta().style.bg, Some(Color::Green));
}

#[test]
fn test_notifications_from_collapsed_steps_are_ignored() {
    let (mut form, source, delegate) = build(3);
    delegate.clear();

    source.steps[2].borrow_mut().set_valid(false);
    source.steps[1].borrow().finish_input();
    form.run_pending();

    assert!(form.cta().enabled);
    assert_eq!(form.current_expanded_index(), 0);
    assert!(delegate.events().is_empty());
}

/// Form on a virtual clock, with the setup fade already run
fn manual_form(steps: Vec<Rc<RefCell<TestStep>>>) -> (StackedForm, ManualScheduler, Rc<TestDataSource>) {
    let clock = ManualScheduler::new();
    let source = Rc::new(TestDataSource::new(steps));
    let mut form = StackedForm::new(FormSettings::default(), Box::new(clock.clone()));
    form.set_data_source(&source);
    form.setup();
    tick(&mut form, &clock, HALF * 2);
    (form, clock, source)
}

#[test]
fn test_outgoing_step_notifications_ignored_during_expand() {
    let (mut form, clock, source) = manual_form(vec![
        TestStep::new("a").into_handle(),
        TestStep::new("b").with_valid(false).into_handle(),
    ]);

    assert!(form.tap_step(1));
    assert_eq!(form.current_expanded_index(), 0);
    assert!(!form.cta().enabled);

    // the step being left still reports before the midpoint
    source.steps[0].borrow_mut().set_valid(false);
    source.steps[0].borrow_mut().set_valid(true);
    form.run_pending();
    assert!(!form.cta().enabled);

    tick(&mut form, &clock, HALF * 2);
    assert_eq!(form.current_expanded_index(), 1);
    assert_eq!(form.cta().enabled, source.steps[1].borrow().valid);
}

#[test]
fn test_incoming_step_notifications_apply_before_midpoint() {
    let (mut form, clock, source) = manual_form(vec![
        TestStep::new("a").into_handle(),
        TestStep::new("b").with_valid(false).into_handle(),
    ]);

    assert!(form.tap_step(1));
    source.steps[1].borrow_mut().set_valid(true);
    form.run_pending();
    assert!(form.cta().enabled);

    tick(&mut form, &clock, HALF * 2);
    assert!(form.cta().enabled);
}

#[test]
fn test_cta_fading_out_rejects_taps_at_once() {
    let (mut form, clock, _source) = manual_form(vec![
        TestStep::new("a").into_handle(),
        TestStep::new("b").with_label(None).into_handle(),
        TestStep::new("c").into_handle(),
    ]);

    assert!(form.tap_cta());
    assert_eq!(form.current_expanded_index(), 1);
    // still drawn, but a second press must not skip the label-less step
    assert_eq!(form.cta().alpha, 1.0);
    assert!(!form.tap_cta());
    assert_eq!(form.current_expanded_index(), 1);

    tick(&mut form, &clock, HALF * 2);
    assert_eq!(form.cta().alpha, 0.0);
    assert!(!form.tap_cta());
}

#[test]
fn test_finished_input_advances_like_cta() {
    let steps = vec![
        TestStep::new("a").with_label(None).into_handle(),
        TestStep::new("b").into_handle(),
    ];
    let source = Rc::new(TestDataSource::new(steps));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    // the CTA is hidden, yet finishing input still advances
    source.steps[0].borrow().finish_input();
    form.run_pending();
    assert_eq!(form.current_expanded_index(), 1);

    delegate.clear();
    source.steps[1].borrow().finish_input();
    form.run_pending();
    assert_eq!(delegate.lifecycle(), vec![FormEvent::Completed(2)]);
}

struct CountingObserver {
    seen: Cell<usize>,
    forward: StepNotifier,
}

impl StepObserver for CountingObserver {
    fn notify(&self, notification: StepNotification) {
        self.seen.set(self.seen.get() + 1);
        self.forward.notify(notification);
    }
}

#[test]
fn test_host_observer_is_kept_and_can_forward() {
    let source = Rc::new(TestDataSource::with_steps(2));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);

    let observer = Rc::new(CountingObserver {
        seen: Cell::new(0),
        forward: form.notifier(0),
    });
    let handle: StepObserverHandle = observer.clone();
    source.steps[0].borrow_mut().observer = Some(handle);
    form.setup();

    let installed = source.steps[0].borrow().observer.clone().unwrap();
    assert!(std::ptr::addr_eq(Rc::as_ptr(&installed), Rc::as_ptr(&observer)));

    source.steps[0].borrow_mut().set_valid(false);
    form.run_pending();
    assert_eq!(observer.seen.get(), 1);
    assert!(!form.cta().enabled);
}

// ─── Queries and hit testing ────────────────────────────────────────────────

#[test]
fn test_step_at_bounds() {
    let (form, source, _delegate) = build(3);
    for (i, step) in source.steps.iter().enumerate() {
        let handle = form.step_at(i).unwrap();
        assert!(is_same_step(&handle, step));
    }
    assert!(form.step_at(3).is_none());
    assert!(form.step_at(usize::MAX).is_none());
}

#[test]
fn test_tap_at_hits_region_on_top() {
    let (mut form, _source, _delegate) = build(3);
    // region 0: 0..600 (expanded), region 1: 550..640, region 2: 590..680
    assert!(!form.tap_at(10.0));
    assert!(form.tap_at(620.0));
    assert_eq!(form.current_expanded_index(), 2);
}

#[test]
fn test_tap_at_cta_frame() {
    let (mut form, _source, _delegate) = build(3);
    let frame = form.cta_frame();
    assert_eq!(frame.top, form.container_height() - 50.0);

    assert!(form.tap_at(frame.top + 1.0));
    assert_eq!(form.current_expanded_index(), 1);
}

#[test]
fn test_tap_at_passes_through_hidden_cta() {
    let steps = vec![
        TestStep::new("a").with_label(None).into_handle(),
        TestStep::new("b").into_handle(),
        TestStep::new("c").into_handle(),
    ];
    let source = Rc::new(TestDataSource::new(steps));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut form = form_with(&source, &delegate);
    form.setup();

    assert!(form.tap_at(560.0));
    assert_eq!(form.current_expanded_index(), 1);
}

#[test]
fn test_container_resize_follows_expanded_step() {
    let (mut form, _source, _delegate) = build(2);
    form.set_container_height(300.0);

    assert_eq!(form.slot(0).unwrap().region().height, 300.0);
    assert_eq!(form.slot(1).unwrap().region().height, 40.0 + OVERLAP_HEIGHT);
    assert_eq!(form.cta_frame().top, 250.0);
}
