//! The step capability a host implements for every stage of the form.
//!
//! A step owns two surfaces: a thin collapsed summary bar and a full expanded
//! editor. The form decides which one is attached to the step's region and
//! calls the `prepare_to_*` hooks right before swapping them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// Vertical space at the bottom of a collapsed step that the next step sits on.
pub const OVERLAP_HEIGHT: f32 = 50.0;

/// Shared handle to a host-owned step.
pub type StepHandle = Rc<RefCell<dyn FormStep>>;

/// Shared handle to whoever receives a step's notifications.
pub type StepObserverHandle = Rc<dyn StepObserver>;

/// Notifications a step sends about its own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepNotification {
    /// The data in the step is no longer valid; the CTA should be disabled.
    DataBecameInvalid,
    /// The data in the step became valid; the CTA should be enabled.
    DataBecameValid,
    /// The user is done with the step; the form should advance as if the CTA was tapped.
    FinishedInput,
}

/// Receiver of step notifications.
///
/// The form installs a [`StepNotifier`] on every step that has no observer at
/// setup time. A host that wants to intercept notifications installs its own
/// observer before calling setup and may forward to
/// [`StackedForm::notifier`](super::StackedForm::notifier).
pub trait StepObserver {
    fn notify(&self, notification: StepNotification);
}

/// One stage of a stacked form.
pub trait FormStep {
    /// Draw the collapsed summary surface.
    fn render_collapsed(&self, area: Rect, buf: &mut Buffer);

    /// Draw the expanded editing surface.
    fn render_expanded(&self, area: Rect, buf: &mut Buffer);

    fn collapsed_background(&self) -> Color {
        Color::Reset
    }

    fn expanded_background(&self) -> Color {
        Color::Reset
    }

    /// Height of the collapsed surface, excluding the overlap space.
    fn collapsed_height(&self) -> f32;

    /// Title of the CTA button while this step is expanded. `None` hides the button.
    fn cta_label(&self) -> Option<String>;

    /// Whether the data entered in this step is currently valid.
    fn is_valid(&self) -> bool;

    fn observer(&self) -> Option<StepObserverHandle>;

    fn set_observer(&mut self, observer: StepObserverHandle);

    /// Called before the expanded step collapses. Copy data into the collapsed surface here.
    fn prepare_to_collapse(&mut self);

    /// Called before the collapsed step expands.
    fn prepare_to_expand(&mut self);

    /// Keyboard input routed to the expanded step. Returns true if consumed.
    fn handle_key(&mut self, _key: KeyEvent) -> bool {
        false
    }

    /// Space at the bottom of the collapsed surface that is covered by the next step.
    ///
    /// Nothing important should be drawn there.
    fn overlap_margin(&self) -> f32 {
        OVERLAP_HEIGHT
    }
}

/// Queue of notifications waiting to be processed by the form.
#[derive(Clone, Default)]
pub struct Inbox {
    queue: Rc<RefCell<VecDeque<(usize, StepNotification)>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, index: usize, notification: StepNotification) {
        self.queue.borrow_mut().push_back((index, notification));
    }

    pub fn pop(&self) -> Option<(usize, StepNotification)> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

/// Default observer: posts notifications for one slot into the form's inbox.
#[derive(Clone)]
pub struct StepNotifier {
    index: usize,
    inbox: Inbox,
}

impl StepNotifier {
    pub(crate) fn new(index: usize, inbox: Inbox) -> Self {
        Self { index, inbox }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for StepNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepNotifier")
            .field("index", &self.index)
            .field("pending", &self.inbox.len())
            .finish()
    }
}

impl StepObserver for StepNotifier {
    fn notify(&self, notification: StepNotification) {
        tracing::trace!(index = self.index, ?notification, "step notification queued");
        self.inbox.push(self.index, notification);
    }
}
