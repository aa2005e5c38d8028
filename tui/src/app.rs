use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use serde_json::Value;
use tokio::select;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use transcript_feedback::TelemetrySink;
use transcript_protocol::ChatTurn;

use crate::app_event::AppEvent;
use crate::app_event::StepAction;
use crate::app_event_sender::AppEventSender;
use crate::clipboard_text::copy_text_to_clipboard;
use crate::render::renderable::Renderable;
use crate::step_container::ActionButton;
use crate::step_container::StepContainerView;
use crate::step_container::StepContext;
use crate::step_container::StepId;
use crate::step_container::StepProps;
use crate::style::selected_step_style;
use crate::tui;
use crate::tui::TuiEvent;

const KEY_HINTS: &str =
    "↑/↓ select  ⏎ open  r regenerate  c continue  y copy  +/- rate  d delete  u reverse  g active  q quit";
const GUTTER_COLS: u16 = 1;

pub(crate) struct App {
    steps: Vec<StepContainerView>,
    context: StepContext,
    selected: usize,
    scroll_top: usize,
    status: Option<String>,
    app_event_tx: AppEventSender,
}

impl App {
    pub async fn run(
        tui: &mut tui::Tui,
        history: Vec<ChatTurn>,
        context: StepContext,
        sink: Arc<dyn TelemetrySink>,
    ) -> Result<()> {
        let (app_event_tx, mut app_event_rx) = unbounded_channel();
        let mut app = Self::new(history, context, sink, AppEventSender::new(app_event_tx));
        let mut tui_events = tui.event_stream();

        app.draw(tui)?;
        while select! {
            Some(event) = app_event_rx.recv() => {
                app.handle_event(event)
            }
            Some(event) = tui_events.next() => {
                app.handle_tui_event(event);
                true
            }
            else => false,
        } {
            app.draw(tui)?;
        }
        tui.terminal.clear()?;
        Ok(())
    }

    pub(crate) fn new(
        history: Vec<ChatTurn>,
        context: StepContext,
        sink: Arc<dyn TelemetrySink>,
        app_event_tx: AppEventSender,
    ) -> Self {
        let count = history.len();
        let steps = history
            .into_iter()
            .enumerate()
            .map(|(index, turn)| {
                let props = step_props(index, count, &turn);
                StepContainerView::new(
                    StepId(index),
                    turn,
                    props,
                    &context,
                    sink.clone(),
                    app_event_tx.clone(),
                )
            })
            .collect();
        let mut app = Self {
            steps,
            context,
            selected: 0,
            scroll_top: 0,
            status: None,
            app_event_tx,
        };
        app.focus(0);
        app
    }

    fn draw(&mut self, tui: &mut tui::Tui) -> Result<()> {
        tui.draw(|frame| {
            let area = frame.area();
            self.render(area, frame.buffer_mut());
        })?;
        Ok(())
    }

    /// Handles an event from the app channel. Returns `false` to exit.
    pub(crate) fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Step { id, action } => self.handle_step_action(id, action),
            AppEvent::CopyToClipboard(text) => match copy_text_to_clipboard(&text) {
                Ok(()) => self.status = Some("Copied to clipboard".to_string()),
                Err(err) => {
                    tracing::warn!("copy failed: {err}");
                    self.status = Some(err);
                }
            },
            AppEvent::Exit => return false,
        }
        true
    }

    pub(crate) fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) => self.handle_key_event(key_event),
            TuiEvent::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            TuiEvent::Paste(pasted) => self.handle_paste(pasted),
            TuiEvent::Draw => {}
        }
    }

    fn handle_step_action(&mut self, id: StepId, action: StepAction) {
        let Some(index) = self.steps.iter().position(|step| step.id() == id) else {
            tracing::warn!(id = id.0, ?action, "step action for a step that no longer exists");
            return;
        };
        tracing::info!(id = id.0, index, ?action, "step action");
        let message = match action {
            StepAction::Delete => {
                self.steps.remove(index);
                self.reindex();
                format!("Deleted step {}", index + 1)
            }
            StepAction::Reverse => {
                self.steps.truncate(index + 1);
                self.reindex();
                format!("Reverted to step {}", index + 1)
            }
            StepAction::Retry => format!("Regenerate requested for step {}", index + 1),
            StepAction::ContinueGeneration => {
                format!("Continue generation requested for step {}", index + 1)
            }
            StepAction::UserInput(input) => {
                format!("Resubmitted step {}: {}", index + 1, first_line(&input))
            }
        };
        self.status = Some(message);
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.app_event_tx.send(AppEvent::Exit);
            }
            KeyCode::Char('q') => self.app_event_tx.send(AppEvent::Exit),
            KeyCode::Up => self.focus(self.selected.saturating_sub(1)),
            KeyCode::Down => self.focus(self.selected.saturating_add(1)),
            KeyCode::Enter => {
                if let Some(step) = self.steps.get_mut(self.selected) {
                    let open = !step.props().open;
                    step.set_open(open);
                }
            }
            KeyCode::Char('r') => self.activate_selected(ActionButton::Regenerate),
            KeyCode::Char('c') => self.activate_selected(ActionButton::ContinueGeneration),
            KeyCode::Char('y') => self.activate_selected(ActionButton::Copy),
            KeyCode::Char('+') => self.activate_selected(ActionButton::Helpful),
            KeyCode::Char('-') => self.activate_selected(ActionButton::Unhelpful),
            KeyCode::Char('d') => self.activate_selected(ActionButton::Delete),
            KeyCode::Char('u') => {
                if let Some(step) = self.steps.get(self.selected) {
                    step.reverse();
                }
            }
            KeyCode::Char('g') => self.set_active(!self.context.active),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::ScrollDown => self.focus(self.selected.saturating_add(1)),
            MouseEventKind::ScrollUp => self.focus(self.selected.saturating_sub(1)),
            _ => {
                if matches!(mouse_event.kind, MouseEventKind::Down(_)) {
                    let position = Position::new(mouse_event.column, mouse_event.row);
                    if let Some(index) = self.steps.iter().position(|step| step.contains(position)) {
                        self.selected = index;
                    }
                }
                for step in &mut self.steps {
                    step.handle_mouse(mouse_event);
                }
            }
        }
    }

    /// Pasted text on a user step is treated as an edited version of it.
    fn handle_paste(&mut self, pasted: String) {
        match self.steps.get(self.selected) {
            Some(step) if step.turn().is_user_input() => step.submit_user_input(pasted),
            _ => self.status = Some("Paste onto a user message to resubmit it".to_string()),
        }
    }

    fn activate_selected(&mut self, button: ActionButton) {
        let Some(step) = self.steps.get_mut(self.selected) else {
            return;
        };
        if self.context.active || !step.available_buttons().contains(&button) {
            self.status = Some(format!("{} is not available here", button.label()));
            return;
        }
        step.activate(button);
    }

    fn set_active(&mut self, active: bool) {
        self.context.active = active;
        for step in &mut self.steps {
            step.sync(&self.context);
        }
        tracing::debug!(active, "generation flag toggled");
    }

    /// Moves the selection, carrying the keyboard "hover" with it.
    fn focus(&mut self, index: usize) {
        if self.steps.is_empty() {
            self.selected = 0;
            return;
        }
        let index = index.min(self.steps.len() - 1);
        if let Some(previous) = self.steps.get_mut(self.selected)
            && self.selected != index
        {
            previous.pointer_leave();
        }
        self.selected = index;
        if let Some(step) = self.steps.get_mut(index) {
            step.pointer_enter();
        }
    }

    fn reindex(&mut self) {
        let count = self.steps.len();
        for (index, step) in self.steps.iter_mut().enumerate() {
            let open = step.props().open;
            let props = StepProps {
                open,
                ..step_props(index, count, step.turn())
            };
            step.set_props(props);
        }
        self.scroll_top = self.scroll_top.min(count.saturating_sub(1));
        let selected = self.selected.min(count.saturating_sub(1));
        self.selected = selected;
        self.focus(selected);
    }

    pub(crate) fn render(&mut self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
        let status_row = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);
        let step_width = body.width.saturating_sub(GUTTER_COLS);

        self.scroll_into_view(body.height, step_width);

        let mut y = body.y;
        for (index, step) in self.steps.iter().enumerate() {
            if index < self.scroll_top || y >= body.bottom() {
                step.clear_layout();
                continue;
            }
            let height = step.desired_height(step_width).min(body.bottom() - y);
            let step_area = Rect::new(body.x + GUTTER_COLS, y, step_width, height);
            step.render(step_area, buf);
            if index == self.selected {
                for row in y..y + height {
                    buf.set_string(body.x, row, "▌", selected_step_style().cyan());
                }
            }
            y += height;
        }

        if self.steps.is_empty() {
            buf.set_string(body.x, body.y, "Transcript is empty.", selected_step_style().dim());
        }
        buf.set_line(status_row.x, status_row.y, &self.status_line(), status_row.width);
    }

    fn scroll_into_view(&mut self, height: u16, width: u16) {
        if self.selected < self.scroll_top {
            self.scroll_top = self.selected;
            return;
        }
        while self.scroll_top < self.selected {
            let used: u16 = self.steps[self.scroll_top..=self.selected]
                .iter()
                .map(|step| step.desired_height(width))
                .fold(0, u16::saturating_add);
            if used <= height {
                break;
            }
            self.scroll_top += 1;
        }
    }

    fn status_line(&self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        if self.context.active {
            spans.push("● generating ".yellow());
        }
        match &self.status {
            Some(status) => spans.push(Span::raw(status.clone())),
            None => spans.push(KEY_HINTS.dim()),
        }
        Line::from(spans)
    }

    #[cfg(test)]
    fn steps(&self) -> &[StepContainerView] {
        &self.steps
    }
}

fn step_props(index: usize, count: usize, turn: &ChatTurn) -> StepProps {
    StepProps {
        index,
        is_first: index == 0,
        is_last: index + 1 == count,
        open: true,
        subtext: subtext_for(turn),
    }
}

/// The model that produced an assistant turn, when its prompt log says so.
fn subtext_for(turn: &ChatTurn) -> Option<String> {
    let log = turn.prompt_logs.first()?.as_value();
    log.get("model")
        .or_else(|| log.pointer("/completionOptions/model"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
