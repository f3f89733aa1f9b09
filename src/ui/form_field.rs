//! Input widgets used by the demo steps

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};
use tui_textarea::TextArea;

/// A form field widget that can handle different input types
pub enum FormField {
    /// Single-line text input
    TextInput {
        value: String,
        cursor_pos: usize,
        placeholder: String,
        max_length: Option<usize>,
    },
    /// Multi-line text input using tui-textarea
    TextArea { textarea: Box<TextArea<'static>> },
    /// Selection from predefined options
    EnumSelect {
        options: Vec<String>,
        selected: usize,
    },
    /// Boolean toggle
    Toggle {
        value: bool,
        true_label: String,
        false_label: String,
    },
}

impl FormField {
    pub fn text(placeholder: &str, max_length: Option<usize>) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor_pos: 0,
            placeholder: placeholder.to_string(),
            max_length,
        }
    }

    pub fn text_area(placeholder: &str) -> Self {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(placeholder);
        textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
        textarea.set_cursor_line_style(Style::default());
        FormField::TextArea {
            textarea: Box::new(textarea),
        }
    }

    pub fn select(options: &[&str]) -> Self {
        FormField::EnumSelect {
            options: options.iter().map(|o| (*o).to_string()).collect(),
            selected: 0,
        }
    }

    pub fn toggle(true_label: &str, false_label: &str) -> Self {
        FormField::Toggle {
            value: false,
            true_label: true_label.to_string(),
            false_label: false_label.to_string(),
        }
    }

    /// Get the current value as a string
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
            FormField::EnumSelect { options, selected } => {
                options.get(*selected).cloned().unwrap_or_default()
            }
            FormField::Toggle { value, .. } => value.to_string(),
        }
    }

    /// Short value for the collapsed summary
    pub fn display_value(&self) -> String {
        match self {
            FormField::TextArea { textarea, .. } => {
                let first = textarea.lines().first().cloned().unwrap_or_default();
                if textarea.lines().len() > 1 {
                    format!("{first}…")
                } else {
                    first
                }
            }
            FormField::Toggle {
                value,
                true_label,
                false_label,
            } => {
                if *value {
                    true_label.clone()
                } else {
                    false_label.clone()
                }
            }
            _ => self.value(),
        }
    }

    /// Set the value from a string
    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => {
                *value = new_value.to_string();
                *cursor_pos = value.len();
            }
            FormField::TextArea { textarea, .. } => {
                textarea.select_all();
                textarea.cut();
                textarea.insert_str(new_value);
            }
            FormField::EnumSelect { options, selected } => {
                if let Some(idx) = options.iter().position(|o| o == new_value) {
                    *selected = idx;
                }
            }
            FormField::Toggle { value, .. } => {
                *value = new_value == "true" || new_value == "yes";
            }
        }
    }

    /// Check if the field value is valid (non-empty for required fields)
    pub fn is_valid(&self, required: bool) -> bool {
        if !required {
            return true;
        }
        match self {
            FormField::TextInput { value, .. } => !value.trim().is_empty(),
            FormField::TextArea { textarea, .. } => {
                !textarea.lines().iter().all(|l| l.trim().is_empty())
            }
            FormField::EnumSelect { options, .. } => !options.is_empty(),
            // a required toggle has to be switched on
            FormField::Toggle { value, .. } => *value,
        }
    }

    /// Whether Enter is an edit for this field rather than "done"
    pub fn consumes_enter(&self) -> bool {
        matches!(self, FormField::TextArea { .. } | FormField::Toggle { .. })
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                max_length,
                ..
            } => match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if max_length.map_or(true, |m| value.chars().count() < m) {
                        value.insert(*cursor_pos, c);
                        *cursor_pos += c.len_utf8();
                    }
                    true
                }
                KeyCode::Backspace => {
                    if let Some(prev) = value[..*cursor_pos].chars().next_back() {
                        *cursor_pos -= prev.len_utf8();
                        value.remove(*cursor_pos);
                    }
                    true
                }
                KeyCode::Delete => {
                    if *cursor_pos < value.len() {
                        value.remove(*cursor_pos);
                    }
                    true
                }
                KeyCode::Left => {
                    if let Some(prev) = value[..*cursor_pos].chars().next_back() {
                        *cursor_pos -= prev.len_utf8();
                    }
                    true
                }
                KeyCode::Right => {
                    if let Some(next) = value[*cursor_pos..].chars().next() {
                        *cursor_pos += next.len_utf8();
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    true
                }
                KeyCode::End => {
                    *cursor_pos = value.len();
                    true
                }
                _ => false,
            },
            FormField::TextArea { textarea, .. } => match key.code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => false,
                _ => {
                    textarea.input(key);
                    true
                }
            },
            FormField::EnumSelect { options, selected } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    if *selected > 0 {
                        *selected -= 1;
                    }
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *selected < options.len().saturating_sub(1) {
                        *selected += 1;
                    }
                    true
                }
                _ => false,
            },
            FormField::Toggle { value, .. } => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    *value = !*value;
                    true
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    *value = false;
                    true
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    *value = true;
                    true
                }
                _ => false,
            },
        }
    }

    /// Get the height needed to render this field
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextArea { .. } => 5,
            FormField::EnumSelect { options, .. } => u16::try_from(options.len()).unwrap_or(5).min(5),
            FormField::TextInput { .. } | FormField::Toggle { .. } => 1,
        }
    }

    /// Update focus-dependent styling that lives inside the widget
    pub fn set_focused(&mut self, focused: bool) {
        if let FormField::TextArea { textarea, .. } = self {
            let border_color = if focused { Color::Cyan } else { Color::Gray };
            textarea.set_cursor_style(if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            });
            textarea.set_block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color)),
            );
        }
    }

    /// Render the field
    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
                max_length,
            } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        text.insert(*cursor_pos, '|');
                    }
                    let suffix = max_length
                        .map(|m| format!(" ({}/{})", value.chars().count(), m))
                        .unwrap_or_default();
                    Line::from(vec![
                        Span::raw(text),
                        Span::styled(suffix, Style::default().fg(Color::DarkGray)),
                    ])
                };

                Paragraph::new(content)
                    .style(Style::default().fg(if focused { Color::White } else { Color::Gray }))
                    .render(area, buf);
            }
            FormField::TextArea { textarea, .. } => {
                Widget::render(&**textarea, area, buf);
            }
            FormField::EnumSelect { options, selected } => {
                let items: Vec<ListItem> = options
                    .iter()
                    .enumerate()
                    .map(|(i, opt)| {
                        let style = if i == *selected {
                            Style::default().add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        ListItem::new(Span::styled(opt.as_str(), style))
                    })
                    .collect();

                let highlight = if focused {
                    Style::default()
                        .add_modifier(Modifier::REVERSED)
                        .fg(Color::Cyan)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                let list = List::new(items)
                    .highlight_style(highlight)
                    .highlight_symbol("> ");

                let mut list_state = ListState::default().with_selected(Some(*selected));
                StatefulWidget::render(list, area, buf, &mut list_state);
            }
            FormField::Toggle {
                value,
                true_label,
                false_label,
            } => {
                let yes_style = if *value {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let no_style = if *value {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                };

                let mut spans = vec![
                    Span::styled(format!("[{true_label}]"), yes_style),
                    Span::raw(" / "),
                    Span::styled(format!("[{false_label}]"), no_style),
                ];
                if focused {
                    spans.push(Span::styled(
                        "  space to switch",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Paragraph::new(Line::from(spans)).render(area, buf);
            }
        }
    }
}
