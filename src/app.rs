use anyhow::Result;
use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::config::Config;
use crate::form::{
    CtaButton, FormDataSource, FormDelegate, FrameScheduler, Scheduler, StackedForm, StepHandle,
};
use crate::ui::demo::{demo_steps, FieldStep};
use crate::ui::form_view::{fitting_container_height, StackedFormView, ViewHit};
use crate::ui::keybindings::{action_for, help_line, Action, ShortcutContext};
use crate::ui::terminal_guard::{install_panic_hook, TerminalGuard};

/// Values of one step at the time the form was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStep {
    pub title: String,
    pub values: Vec<(String, String)>,
}

/// Data source and delegate of the demo form.
pub struct DemoHost {
    /// Number of steps reported to the form, as requested on the command line
    count: usize,
    steps: RefCell<Vec<Rc<RefCell<FieldStep>>>>,
    completed: RefCell<Option<Vec<CompletedStep>>>,
}

impl DemoHost {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            steps: RefCell::new(demo_steps(count)),
            completed: RefCell::new(None),
        }
    }

    /// Fresh, empty steps for another run through the form
    pub fn reset(&self) {
        *self.steps.borrow_mut() = demo_steps(self.count);
        self.completed.borrow_mut().take();
    }

    pub fn field_step(&self, index: usize) -> Option<Rc<RefCell<FieldStep>>> {
        self.steps.borrow().get(index).cloned()
    }

    /// Submitted values, once. `None` until the form completes.
    pub fn take_completion(&self) -> Option<Vec<CompletedStep>> {
        self.completed.borrow_mut().take()
    }
}

impl FormDataSource for DemoHost {
    fn number_of_steps(&self) -> usize {
        self.count
    }

    fn step(&self, index: usize) -> StepHandle {
        let step: StepHandle = self.steps.borrow()[index].clone();
        step
    }
}

impl FormDelegate for DemoHost {
    fn will_expand(&self, index: usize) {
        tracing::debug!(index, "will expand");
    }

    fn did_expand(&self, index: usize) {
        tracing::debug!(index, "did expand");
    }

    fn did_collapse(&self, index: usize) {
        tracing::debug!(index, "did collapse");
    }

    fn did_complete_form(&self, steps: &[StepHandle]) {
        // `steps` are type-erased; the values come from our own typed handles
        if steps.len() != self.steps.borrow().len() {
            tracing::warn!(
                form = steps.len(),
                host = self.steps.borrow().len(),
                "completed form does not match the host's steps"
            );
        }
        let completed: Vec<CompletedStep> = self
            .steps
            .borrow()
            .iter()
            .map(|step| {
                let step = step.borrow();
                CompletedStep {
                    title: step.title().to_string(),
                    values: step.values(),
                }
            })
            .collect();
        tracing::info!(steps = steps.len(), "demo form submitted");
        *self.completed.borrow_mut() = Some(completed);
    }

    fn style_cta_for_valid(&self, button: &mut CtaButton) {
        button.style = Style::default().bg(Color::Green).fg(Color::Black);
    }

    fn style_cta_for_invalid(&self, button: &mut CtaButton) {
        button.style = Style::default().bg(Color::DarkGray).fg(Color::Gray);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Form,
    Completed,
}

pub struct App {
    config: Config,
    form: StackedForm,
    host: Rc<DemoHost>,
    mode: Mode,
    /// Area the form was last fitted to
    form_area: Rect,
    should_quit: bool,
    completion: Option<Vec<CompletedStep>>,
}

impl App {
    /// Demo app driven by the wall clock
    pub fn new(config: Config, steps: usize) -> Self {
        Self::with_scheduler(config, steps, Box::new(FrameScheduler::new()))
    }

    pub fn with_scheduler(config: Config, steps: usize, scheduler: Box<dyn Scheduler>) -> Self {
        let host = Rc::new(DemoHost::new(steps));
        let mut form = StackedForm::new(config.form_settings(), scheduler);
        form.set_data_source(&host);
        form.set_delegate(&host);
        Self {
            config,
            form,
            host,
            mode: Mode::Form,
            form_area: Rect::default(),
            should_quit: false,
            completion: None,
        }
    }

    /// Build the form. Panics on a step count outside 2..=4.
    pub fn start(&mut self) {
        self.form.setup();
        self.form_area = Rect::default();
        self.mode = Mode::Form;
    }

    pub fn form(&self) -> &StackedForm {
        &self.form
    }

    pub fn host(&self) -> &Rc<DemoHost> {
        &self.host
    }

    pub fn is_completed(&self) -> bool {
        self.mode == Mode::Completed
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Values submitted in the last completed run
    pub fn completion(&self) -> Option<&[CompletedStep]> {
        self.completion.as_deref()
    }

    pub fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let guard = TerminalGuard::new()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        self.start();
        let result = self.event_loop(&mut terminal);

        guard.restore();
        result
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let tick_rate = self.config.refresh_rate();

        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    // the next draw refits the form
                    _ => {}
                }
            }

            // animation phases that came due while waiting
            self.form.run_pending();
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Form => {
                match action_for(ShortcutContext::Form, &key) {
                    Some(action) => self.perform(action),
                    None => {
                        if let Some(step) = self.expanded_step() {
                            step.borrow_mut().handle_key(key);
                        }
                        self.form.run_pending();
                    }
                }
                self.check_completion();
            }
            Mode::Completed => {
                if let Some(action) = action_for(ShortcutContext::Completed, &key) {
                    self.perform(action);
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Form || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let hit = StackedFormView::new(&self.form, self.config.ui.units_per_row).hit(
            self.form_area,
            mouse.column,
            mouse.row,
        );
        match hit {
            Some(ViewHit::Cta) => {
                self.form.tap_cta();
            }
            Some(ViewHit::Step(index)) => {
                self.form.tap_step(index);
            }
            None => {}
        }
        self.check_completion();
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TapCta => {
                self.form.tap_cta();
            }
            Action::TapStep(index) => {
                self.form.tap_step(index);
            }
            Action::Restart => {
                tracing::info!("restarting demo form");
                self.host.reset();
                self.completion = None;
                self.start();
            }
        }
    }

    fn expanded_step(&self) -> Option<StepHandle> {
        self.form.step_at(self.form.current_expanded_index())
    }

    fn check_completion(&mut self) {
        if let Some(completion) = self.host.take_completion() {
            self.completion = Some(completion);
            self.mode = Mode::Completed;
        }
    }

    /// Match the container height to the rows the form gets
    fn fit_to(&mut self, area: Rect) {
        if area == self.form_area {
            return;
        }
        self.form_area = area;
        let available = f32::from(area.height) * self.config.ui.units_per_row;
        let height = fitting_container_height(&self.form, available);
        tracing::debug!(rows = area.height, height, "form fitted to terminal");
        self.form.set_container_height(height);
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let [body, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

        match self.mode {
            Mode::Form => {
                self.fit_to(body);
                frame.render_widget(
                    StackedFormView::new(&self.form, self.config.ui.units_per_row),
                    body,
                );
            }
            Mode::Completed => self.draw_completion(frame, body),
        }
        self.draw_status(frame, status);
    }

    fn draw_completion(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for step in self.completion.iter().flatten() {
            lines.push(Line::from(Span::styled(
                step.title.as_str(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for (label, value) in &step.values {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {label}: "), Style::default().fg(Color::Gray)),
                    Span::raw(value.as_str()),
                ]));
            }
            lines.push(Line::default());
        }
        let block = Block::default()
            .title(" Submitted ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let (context, position) = match self.mode {
            Mode::Form => (
                ShortcutContext::Form,
                format!(
                    " Step {}/{} ",
                    self.form.current_expanded_index() + 1,
                    self.form.step_count()
                ),
            ),
            Mode::Completed => (ShortcutContext::Completed, " Done ".to_string()),
        };
        let line = Line::from(vec![
            Span::styled(position, Style::default().fg(Color::Black).bg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(
                help_line(context, self.form.step_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}
