use std::io::IsTerminal;
use std::io::Result;
use std::io::Stdout;
use std::io::stdin;
use std::io::stdout;
use std::panic;
use std::pin::Pin;

use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyEvent;
use crossterm::event::MouseEvent;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::disable_raw_mode;
use ratatui::crossterm::terminal::enable_raw_mode;
use tokio_stream::Stream;

/// A type alias for the terminal type used in this application
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

pub fn set_modes() -> Result<()> {
    execute!(stdout(), EnableBracketedPaste)?;
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    // Hover tracking needs motion events, which only arrive with capture on.
    execute!(stdout(), EnableMouseCapture)?;
    Ok(())
}

/// Restore the terminal to its original state.
/// Inverse of `set_modes`.
pub fn restore() -> Result<()> {
    let _ = execute!(stdout(), DisableMouseCapture);
    execute!(stdout(), DisableBracketedPaste)?;
    let _ = execute!(stdout(), LeaveAlternateScreen);
    disable_raw_mode()?;
    let _ = execute!(stdout(), crossterm::cursor::Show);
    Ok(())
}

/// Initialize the terminal in the alternate screen.
pub fn init() -> Result<Terminal> {
    if !stdin().is_terminal() {
        return Err(std::io::Error::other("stdin is not a terminal"));
    }
    if !stdout().is_terminal() {
        return Err(std::io::Error::other("stdout is not a terminal"));
    }
    set_modes()?;

    set_panic_hook();

    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn set_panic_hook() {
    let hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore(); // ignore any errors as we are already failing
        hook(panic_info);
    }));
}

#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    Draw,
}

impl TuiEvent {
    fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key_event) => Some(TuiEvent::Key(key_event)),
            Event::Mouse(mouse_event) => Some(TuiEvent::Mouse(mouse_event)),
            Event::Paste(pasted) => Some(TuiEvent::Paste(pasted)),
            Event::Resize(_, _) | Event::FocusGained => Some(TuiEvent::Draw),
            Event::FocusLost => None,
        }
    }
}

pub struct Tui {
    pub(crate) terminal: Terminal,
}

impl Tui {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }

    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        use tokio_stream::StreamExt;

        let events = crossterm::event::EventStream::new().filter_map(|event| match event {
            Ok(event) => TuiEvent::from_crossterm(event),
            Err(err) => {
                tracing::warn!("failed to read terminal event: {err}");
                None
            }
        });
        Box::pin(events)
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyModifiers;

    #[test]
    fn maps_crossterm_events() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_matches!(TuiEvent::from_crossterm(Event::Key(key)), Some(TuiEvent::Key(k)) if k == key);
        assert_matches!(TuiEvent::from_crossterm(Event::Resize(80, 24)), Some(TuiEvent::Draw));
        assert_matches!(
            TuiEvent::from_crossterm(Event::Paste("hi".to_string())),
            Some(TuiEvent::Paste(text)) if text == "hi"
        );
        assert!(TuiEvent::from_crossterm(Event::FocusLost).is_none());
    }
}
