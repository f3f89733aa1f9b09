//! Test doubles for the form's collaborators.
//!
//! Provides a scripted step, a fixed data source and a delegate that records
//! every callback, so hosts and the form itself can be tested without a terminal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

use super::cta::CtaButton;
use super::host::{FormDataSource, FormDelegate, AUTOMATIC_CTA_BUTTON_HEIGHT, AUTOMATIC_ELEMENT_HEIGHT};
use super::step::{FormStep, StepHandle, StepNotification, StepObserverHandle};

/// Step with scripted label, validity and height that counts its hook calls.
pub struct TestStep {
    pub title: String,
    pub label: Option<String>,
    pub valid: bool,
    pub height: f32,
    pub observer: Option<StepObserverHandle>,
    pub prepared_to_expand: Cell<usize>,
    pub prepared_to_collapse: Cell<usize>,
}

impl TestStep {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            label: Some("Next".to_string()),
            valid: true,
            height: 40.0,
            observer: None,
            prepared_to_expand: Cell::new(0),
            prepared_to_collapse: Cell::new(0),
        }
    }

    pub fn with_label(mut self, label: Option<&str>) -> Self {
        self.label = label.map(str::to_string);
        self
    }

    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn into_handle(self) -> Rc<RefCell<TestStep>> {
        Rc::new(RefCell::new(self))
    }

    /// Change validity and tell the observer, as a real step would after an edit.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
        self.notify(if valid {
            StepNotification::DataBecameValid
        } else {
            StepNotification::DataBecameInvalid
        });
    }

    pub fn finish_input(&self) {
        self.notify(StepNotification::FinishedInput);
    }

    fn notify(&self, notification: StepNotification) {
        if let Some(observer) = &self.observer {
            observer.notify(notification);
        }
    }
}

impl FormStep for TestStep {
    fn render_collapsed(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.title.as_str()).render(area, buf);
    }

    fn render_expanded(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!("{} (editing)", self.title)).render(area, buf);
    }

    fn collapsed_background(&self) -> Color {
        Color::DarkGray
    }

    fn expanded_background(&self) -> Color {
        Color::Black
    }

    fn collapsed_height(&self) -> f32 {
        self.height
    }

    fn cta_label(&self) -> Option<String> {
        self.label.clone()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn observer(&self) -> Option<StepObserverHandle> {
        self.observer.clone()
    }

    fn set_observer(&mut self, observer: StepObserverHandle) {
        self.observer = Some(observer);
    }

    fn prepare_to_collapse(&mut self) {
        self.prepared_to_collapse.set(self.prepared_to_collapse.get() + 1);
    }

    fn prepare_to_expand(&mut self) {
        self.prepared_to_expand.set(self.prepared_to_expand.get() + 1);
    }
}

/// Data source over a fixed list of test steps.
pub struct TestDataSource {
    pub steps: Vec<Rc<RefCell<TestStep>>>,
    /// Reported step count; defaults to the number of steps.
    pub count: Cell<usize>,
    pub collapsed_heights: Option<Vec<f32>>,
    pub cta_height: f32,
    pub count_queries: Cell<usize>,
}

impl TestDataSource {
    pub fn new(steps: Vec<Rc<RefCell<TestStep>>>) -> Self {
        let count = steps.len();
        Self {
            steps,
            count: Cell::new(count),
            collapsed_heights: None,
            cta_height: AUTOMATIC_CTA_BUTTON_HEIGHT,
            count_queries: Cell::new(0),
        }
    }

    /// Data source with `n` default steps titled "step 0", "step 1", ...
    pub fn with_steps(n: usize) -> Self {
        Self::new(
            (0..n)
                .map(|i| TestStep::new(&format!("step {i}")).into_handle())
                .collect(),
        )
    }
}

impl FormDataSource for TestDataSource {
    fn number_of_steps(&self) -> usize {
        self.count_queries.set(self.count_queries.get() + 1);
        self.count.get()
    }

    fn step(&self, index: usize) -> StepHandle {
        self.steps[index].clone()
    }

    fn collapsed_height(&self, index: usize) -> f32 {
        self.collapsed_heights
            .as_ref()
            .and_then(|h| h.get(index).copied())
            .unwrap_or(AUTOMATIC_ELEMENT_HEIGHT)
    }

    fn cta_button_height(&self) -> f32 {
        self.cta_height
    }
}

/// A delegate callback, as recorded by [`RecordingDelegate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    WillExpand(usize),
    DidExpand(usize),
    WillCollapse(usize),
    DidCollapse(usize),
    Completed(usize),
    StyledValid,
    StyledInvalid,
}

/// Delegate that records every callback in order.
#[derive(Default)]
pub struct RecordingDelegate {
    pub events: RefCell<Vec<FormEvent>>,
    pub completed_with: RefCell<Vec<StepHandle>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FormEvent> {
        self.events.borrow().clone()
    }

    /// Events other than CTA styling.
    pub fn lifecycle(&self) -> Vec<FormEvent> {
        self.events
            .borrow()
            .iter()
            .copied()
            .filter(|e| !matches!(e, FormEvent::StyledValid | FormEvent::StyledInvalid))
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: FormEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl FormDelegate for RecordingDelegate {
    fn will_expand(&self, index: usize) {
        self.record(FormEvent::WillExpand(index));
    }

    fn will_collapse(&self, index: usize) {
        self.record(FormEvent::WillCollapse(index));
    }

    fn did_expand(&self, index: usize) {
        self.record(FormEvent::DidExpand(index));
    }

    fn did_collapse(&self, index: usize) {
        self.record(FormEvent::DidCollapse(index));
    }

    fn did_complete_form(&self, steps: &[StepHandle]) {
        self.record(FormEvent::Completed(steps.len()));
        *self.completed_with.borrow_mut() = steps.to_vec();
    }

    fn style_cta_for_valid(&self, button: &mut CtaButton) {
        self.record(FormEvent::StyledValid);
        button.style = Style::default().bg(Color::Green);
    }

    fn style_cta_for_invalid(&self, button: &mut CtaButton) {
        self.record(FormEvent::StyledInvalid);
        button.style = Style::default().bg(Color::DarkGray);
    }
}

/// Whether `handle` points at the same step as `step`.
pub fn is_same_step(handle: &StepHandle, step: &Rc<RefCell<TestStep>>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(handle), Rc::as_ptr(step))
}
