//! The sign-up flow shown by the demo

use std::cell::RefCell;
use std::rc::Rc;

use ratatui::style::Color;

use super::FieldStep;
use crate::ui::form_field::FormField;

/// Number of distinct steps the demo can show
pub const MAX_DEMO_STEPS: usize = 4;

fn looks_like_email(value: &str) -> bool {
    let Some((user, domain)) = value.split_once('@') else {
        return false;
    };
    !user.is_empty() && domain.contains('.') && !domain.ends_with('.')
}

fn account() -> FieldStep {
    FieldStep::new("Account")
        .with_field("Name", FormField::text("Ada Lovelace", Some(40)), true)
        .with_field("Email", FormField::text("ada@example.com", Some(60)), true)
        .with_check(looks_like_email)
        .with_colors(Color::Blue, Color::Black)
}

/// No CTA label: the button hides and Enter on the plan list finishes the step.
fn plan() -> FieldStep {
    FieldStep::new("Plan")
        .with_field("Yearly billing", FormField::toggle("Yearly", "Monthly"), false)
        .with_field("Plan", FormField::select(&["Free", "Pro", "Team"]), true)
        .with_cta_label(None)
        .with_colors(Color::Magenta, Color::Black)
}

fn about() -> FieldStep {
    FieldStep::new("About you")
        .with_field("Bio", FormField::text_area("A few words about yourself"), false)
        .with_colors(Color::Cyan, Color::Black)
}

fn confirm() -> FieldStep {
    FieldStep::new("Confirm")
        .with_field("Accept the terms", FormField::toggle("Accept", "Decline"), true)
        .with_cta_label(Some("Submit"))
        .with_colors(Color::Green, Color::Black)
}

/// The first `count` steps of the sign-up flow.
///
/// The confirmation step always comes last, so shorter flows drop the
/// optional middle steps first.
pub fn demo_steps(count: usize) -> Vec<Rc<RefCell<FieldStep>>> {
    let steps = match count {
        0 => Vec::new(),
        1 => vec![confirm()],
        2 => vec![account(), confirm()],
        3 => vec![account(), plan(), confirm()],
        _ => vec![account(), plan(), about(), confirm()],
    };
    steps
        .into_iter()
        .map(|s| Rc::new(RefCell::new(s)))
        .collect()
}
