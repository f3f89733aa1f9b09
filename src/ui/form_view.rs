//! Terminal view of a stacked form.
//!
//! The form lays out in abstract units; the view maps them to rows with a
//! fixed `units_per_row` factor and draws regions in index order, so a later
//! region covers the overlap strip of the one before it. The CTA is drawn last,
//! as a button right-aligned in the CTA rows.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::form::{RegionFrame, StackedForm};

/// Rows covered by `units`, rounded to the nearest row
pub fn units_to_rows(units: f32, units_per_row: f32) -> u16 {
    (units / units_per_row).round().max(0.0) as u16
}

/// Form units at the middle of the row `row` rows below the top of the view
pub fn row_to_units(row: u16, units_per_row: f32) -> f32 {
    (f32::from(row) + 0.5) * units_per_row
}

/// Container height that lets the whole stack fit in `available` units.
///
/// With step `k` expanded the stack ends at the container height plus the
/// collapsed heights of every other step, so the largest such sum is reserved.
pub fn fitting_container_height(form: &StackedForm, available: f32) -> f32 {
    let heights: Vec<f32> = form.registry().iter().map(|s| s.collapsed_height()).collect();
    let total: f32 = heights.iter().sum();
    let smallest = heights.iter().copied().fold(f32::INFINITY, f32::min);
    let reserved = if heights.is_empty() { 0.0 } else { total - smallest };
    let floor = form.cta().height + form.registry().overlap();
    (available - reserved).max(floor)
}

/// What a click at a cell of the view lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewHit {
    Cta,
    Step(usize),
}

pub struct StackedFormView<'a> {
    form: &'a StackedForm,
    units_per_row: f32,
}

impl<'a> StackedFormView<'a> {
    pub fn new(form: &'a StackedForm, units_per_row: f32) -> Self {
        Self {
            form,
            units_per_row,
        }
    }

    /// Screen rows of a region, clipped to `area`. `None` when fully outside.
    fn frame_rect(&self, frame: &RegionFrame, area: Rect) -> Option<Rect> {
        let top = area.y.saturating_add(units_to_rows(frame.top, self.units_per_row));
        let bottom = area
            .y
            .saturating_add(units_to_rows(frame.bottom(), self.units_per_row))
            .min(area.bottom());
        if top >= bottom {
            return None;
        }
        Some(Rect::new(area.x, top, area.width, bottom - top))
    }

    /// Cells taken by the CTA button, if it is visible and on screen
    pub fn button_rect(&self, area: Rect) -> Option<Rect> {
        let cta = self.form.cta();
        if !cta.is_visible() {
            return None;
        }
        let rows = self.frame_rect(&self.form.cta_frame(), area)?;
        let width = (cta.title.chars().count() as u16 + 8).min(area.width);
        Some(Rect::new(
            area.right().saturating_sub(width),
            rows.y,
            width,
            rows.height,
        ))
    }

    /// Resolve a click at (`column`, `row`) in screen coordinates
    pub fn hit(&self, area: Rect, column: u16, row: u16) -> Option<ViewHit> {
        if row < area.y || row >= area.bottom() || column < area.x || column >= area.right() {
            return None;
        }
        if let Some(button) = self.button_rect(area) {
            if self.form.cta().receives_hits() && button.contains((column, row).into()) {
                return Some(ViewHit::Cta);
            }
        }
        let y = row_to_units(row - area.y, self.units_per_row);
        self.form.registry().hit_test(y).map(ViewHit::Step)
    }

    fn render_regions(&self, area: Rect, buf: &mut Buffer) {
        for frame in self.form.layout() {
            let Some(slot) = self.form.slot(frame.index) else {
                continue;
            };
            let Some(rect) = self.frame_rect(&frame, area) else {
                continue;
            };
            let region = slot.region();

            Clear.render(rect, buf);
            let border_type = if region.corner_radius > 0.0 {
                BorderType::Rounded
            } else {
                BorderType::Plain
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .style(Style::default().bg(region.background));
            let inner = block.inner(rect);
            block.render(rect, buf);

            let step = slot.step().borrow();
            if region.collapsed.is_visible() {
                step.render_collapsed(inner, buf);
            }
            if region.expanded.is_visible() {
                step.render_expanded(inner, buf);
            }
        }
    }

    fn render_cta(&self, area: Rect, buf: &mut Buffer) {
        let Some(rect) = self.button_rect(area) else {
            return;
        };
        let cta = self.form.cta();
        let mut style = cta.style;
        if !cta.enabled {
            style = style.add_modifier(Modifier::DIM);
        }
        Block::default().style(style).render(rect, buf);

        let middle = Rect::new(rect.x, rect.y + (rect.height.saturating_sub(1)) / 2, rect.width, 1);
        Paragraph::new(Line::from(cta.title.as_str()))
            .alignment(Alignment::Center)
            .style(style.add_modifier(Modifier::BOLD))
            .render(middle, buf);
    }
}

impl Widget for StackedFormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_regions(area, buf);
        self.render_cta(area, buf);
    }
}
