//! Per-step bookkeeping: the region each step occupies and how regions stack.

use ratatui::style::Color;

use super::step::StepHandle;
use super::transition::SlotState;

/// Attachment and opacity of one of a step's surfaces inside its region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    pub attached: bool,
    pub alpha: f32,
}

impl SurfaceState {
    pub fn detached() -> Self {
        Self {
            attached: false,
            alpha: 0.0,
        }
    }

    pub fn shown() -> Self {
        Self {
            attached: true,
            alpha: 1.0,
        }
    }

    /// Attached but still transparent, waiting to fade in.
    pub fn hidden() -> Self {
        Self {
            attached: true,
            alpha: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.attached && self.alpha > 0.0
    }
}

/// The on-screen area of a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub height: f32,
    /// Whether taps on the region reach the form. Off while the step is expanded.
    pub tap_enabled: bool,
    pub background: Color,
    pub corner_radius: f32,
    pub collapsed: SurfaceState,
    pub expanded: SurfaceState,
}

impl Region {
    fn collapsed(height: f32, overlap: f32, background: Color) -> Self {
        Self {
            height: height + overlap,
            tap_enabled: true,
            background,
            corner_radius: overlap / 2.0,
            collapsed: SurfaceState::shown(),
            expanded: SurfaceState::detached(),
        }
    }
}

/// One step and its region.
pub struct StepSlot {
    index: usize,
    step: StepHandle,
    collapsed_height: f32,
    pub(crate) region: Region,
    pub(crate) state: SlotState,
}

impl StepSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step(&self) -> &StepHandle {
        &self.step
    }

    /// Collapsed height resolved at setup, excluding the overlap space.
    pub fn collapsed_height(&self) -> f32 {
        self.collapsed_height
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn state(&self) -> SlotState {
        self.state
    }
}

/// Vertical placement of a region inside the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFrame {
    pub index: usize,
    pub top: f32,
    pub height: f32,
}

impl RegionFrame {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Ordered slots of the form. Indices are assigned on insertion and never change.
#[derive(Default)]
pub struct StepRegistry {
    slots: Vec<StepSlot>,
    overlap: f32,
}

impl StepRegistry {
    pub fn new(overlap: f32) -> Self {
        Self {
            slots: Vec::new(),
            overlap,
        }
    }

    /// Append a collapsed slot for `step`. Returns its index.
    pub fn push(&mut self, step: StepHandle, collapsed_height: f32) -> usize {
        let index = self.slots.len();
        let background = step.borrow().collapsed_background();
        self.slots.push(StepSlot {
            index,
            step,
            collapsed_height,
            region: Region::collapsed(collapsed_height, self.overlap, background),
            state: SlotState::Collapsed,
        });
        index
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn overlap(&self) -> f32 {
        self.overlap
    }

    pub fn get(&self, index: usize) -> Option<&StepSlot> {
        self.slots.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut StepSlot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepSlot> {
        self.slots.iter()
    }

    pub fn steps(&self) -> Vec<StepHandle> {
        self.slots.iter().map(|s| s.step.clone()).collect()
    }

    /// Stack regions top to bottom, each one overlapping the previous by the overlap margin.
    pub fn layout(&self) -> Vec<RegionFrame> {
        let mut frames: Vec<RegionFrame> = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let top = match frames.last() {
                Some(prev) => prev.bottom() - self.overlap,
                None => 0.0,
            };
            frames.push(RegionFrame {
                index: slot.index,
                top,
                height: slot.region.height,
            });
        }
        frames
    }

    /// Index of the region drawn on top at `y`. Later regions cover earlier ones.
    pub fn hit_test(&self, y: f32) -> Option<usize> {
        self.layout()
            .iter()
            .rev()
            .find(|frame| frame.contains(y))
            .map(|frame| frame.index)
    }
}
