//! Steps built from form fields, used by the terminal demo.

mod steps;

pub use steps::{demo_steps, MAX_DEMO_STEPS};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::form::{FormStep, StepNotification, StepObserverHandle};
use crate::ui::form_field::FormField;

/// A field with its label and validation rule
pub struct LabeledField {
    pub label: String,
    pub field: FormField,
    pub required: bool,
    /// Extra rule applied to the field value
    pub check: Option<fn(&str) -> bool>,
}

impl LabeledField {
    pub fn is_valid(&self) -> bool {
        self.field.is_valid(self.required) && self.check.map_or(true, |check| check(&self.field.value()))
    }
}

/// A form step made of labeled fields.
///
/// Tab and Shift+Tab move between fields. Enter on a field that does not take
/// Enter itself moves on to the next field; on the last one it finishes the
/// step if its data is valid.
pub struct FieldStep {
    title: String,
    cta_label: Option<String>,
    fields: Vec<LabeledField>,
    focused: usize,
    summary: String,
    collapsed_height: f32,
    collapsed_background: Color,
    expanded_background: Color,
    observer: Option<StepObserverHandle>,
    was_valid: bool,
}

impl FieldStep {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            cta_label: Some("Next".to_string()),
            fields: Vec::new(),
            focused: 0,
            summary: String::new(),
            collapsed_height: 50.0,
            collapsed_background: Color::DarkGray,
            expanded_background: Color::Black,
            observer: None,
            was_valid: true,
        }
    }

    pub fn with_field(mut self, label: &str, field: FormField, required: bool) -> Self {
        self.fields.push(LabeledField {
            label: label.to_string(),
            field,
            required,
            check: None,
        });
        self.was_valid = self.fields_valid();
        self.apply_focus();
        self
    }

    /// Attach a rule to the most recently added field
    pub fn with_check(mut self, check: fn(&str) -> bool) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.check = Some(check);
        }
        self.was_valid = self.fields_valid();
        self
    }

    pub fn with_cta_label(mut self, label: Option<&str>) -> Self {
        self.cta_label = label.map(str::to_string);
        self
    }

    pub fn with_colors(mut self, collapsed: Color, expanded: Color) -> Self {
        self.collapsed_background = collapsed;
        self.expanded_background = expanded;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Text shown on the collapsed bar, refreshed when the step collapses
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn focused_field(&self) -> usize {
        self.focused
    }

    pub fn field_mut(&mut self, label: &str) -> Option<&mut FormField> {
        self.fields
            .iter_mut()
            .find(|f| f.label == label)
            .map(|f| &mut f.field)
    }

    /// Label and value of every field, in order
    pub fn values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.label.clone(), f.field.value()))
            .collect()
    }

    fn fields_valid(&self) -> bool {
        self.fields.iter().all(LabeledField::is_valid)
    }

    fn notify(&self, notification: StepNotification) {
        if let Some(observer) = &self.observer {
            observer.notify(notification);
        }
    }

    /// Tell the observer when validity flipped since the last check
    pub fn refresh_validity(&mut self) {
        let valid = self.fields_valid();
        if valid != self.was_valid {
            self.was_valid = valid;
            self.notify(if valid {
                StepNotification::DataBecameValid
            } else {
                StepNotification::DataBecameInvalid
            });
        }
    }

    fn focus(&mut self, index: usize) {
        self.focused = index.min(self.fields.len().saturating_sub(1));
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        let focused = self.focused;
        for (i, f) in self.fields.iter_mut().enumerate() {
            f.field.set_focused(i == focused);
        }
    }

    fn is_last_field(&self) -> bool {
        self.focused + 1 >= self.fields.len()
    }

    fn build_summary(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.field.display_value())
            .filter(|v| !v.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

impl FormStep for FieldStep {
    fn render_collapsed(&self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(
                self.title.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.summary.as_str(), Style::default().fg(Color::Gray)),
        ]);
        Paragraph::new(line).render(area, buf);
    }

    fn render_expanded(&self, area: Rect, buf: &mut Buffer) {
        let mut y = area.y;
        let bottom = area.bottom();

        let title = Line::from(Span::styled(
            self.title.as_str(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(title).render(Rect::new(area.x, y, area.width, 1), buf);
        y = y.saturating_add(2);

        for (i, f) in self.fields.iter().enumerate() {
            let needed = 1 + f.field.render_height();
            if y.saturating_add(needed) > bottom {
                break;
            }
            let focused = i == self.focused;
            let marker = if f.required { " *" } else { "" };
            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Paragraph::new(Line::from(Span::styled(
                format!("{}{marker}", f.label),
                label_style,
            )))
            .render(Rect::new(area.x, y, area.width, 1), buf);

            let field_area = Rect::new(area.x + 2, y + 1, area.width.saturating_sub(2), f.field.render_height());
            f.field.render(field_area, buf, focused);

            y = y.saturating_add(needed + 1);
        }
    }

    fn collapsed_background(&self) -> Color {
        self.collapsed_background
    }

    fn expanded_background(&self) -> Color {
        self.expanded_background
    }

    fn collapsed_height(&self) -> f32 {
        self.collapsed_height
    }

    fn cta_label(&self) -> Option<String> {
        self.cta_label.clone()
    }

    fn is_valid(&self) -> bool {
        self.fields_valid()
    }

    fn observer(&self) -> Option<StepObserverHandle> {
        self.observer.clone()
    }

    fn set_observer(&mut self, observer: StepObserverHandle) {
        self.observer = Some(observer);
    }

    fn prepare_to_collapse(&mut self) {
        self.summary = self.build_summary();
    }

    fn prepare_to_expand(&mut self) {
        self.focus(0);
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.fields.is_empty() {
            return false;
        }
        match key.code {
            KeyCode::Tab => {
                self.focus(self.focused + 1);
                return true;
            }
            KeyCode::BackTab => {
                self.focus(self.focused.saturating_sub(1));
                return true;
            }
            KeyCode::Enter if !self.fields[self.focused].field.consumes_enter() => {
                if !self.is_last_field() {
                    self.focus(self.focused + 1);
                } else if self.fields_valid() {
                    self.notify(StepNotification::FinishedInput);
                }
                return true;
            }
            _ => {}
        }

        let consumed = self.fields[self.focused].field.handle_key(key);
        if consumed {
            self.refresh_validity();
        }
        consumed
    }
}
