// Terminal session and the dashboard event loop
use crate::application::dashboard_service::{DashboardEvent, DashboardService};
use crate::presentation::input::{map_key, map_mouse, Action};
use crate::presentation::ui;
use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Take over the terminal until the user quits, then restore it
pub async fn run(
    mut service: DashboardService,
    mut events: mpsc::UnboundedReceiver<DashboardEvent>,
    frame_interval: Duration,
) -> Result<()> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        restore_terminal();
        return Err(e.into());
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(e) => {
            restore_terminal();
            return Err(e.into());
        }
    };

    let result = event_loop(&mut terminal, &mut service, &mut events, frame_interval).await;

    restore_terminal();
    result
}

/// Undo every terminal mode we set. Each step runs even if an earlier one fails.
fn restore_terminal() {
    let mut stdout = io::stdout();

    if let Err(e) = execute!(stdout, DisableMouseCapture) {
        tracing::error!("Failed to disable mouse capture: {}", e);
    }
    if let Err(e) = execute!(stdout, LeaveAlternateScreen) {
        tracing::error!("Failed to leave alternate screen: {}", e);
    }
    if let Err(e) = execute!(stdout, Show) {
        tracing::error!("Failed to show cursor: {}", e);
    }
    if let Err(e) = disable_raw_mode() {
        tracing::error!("Failed to disable raw mode: {}", e);
    }
    let _ = stdout.flush();
}

/// Restore the terminal before the default hook prints the panic message
fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let mut stdout = io::stdout();
            let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen, Show);
            let _ = disable_raw_mode();
            let _ = stdout.flush();
            previous(info);
        }));
    });
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    service: &mut DashboardService,
    events: &mut mpsc::UnboundedReceiver<DashboardEvent>,
    frame_interval: Duration,
) -> Result<()> {
    let mut input = EventStream::new();
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut modal_area = None;

    service.load_all();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                service.tick(Instant::now());
                terminal.draw(|frame| modal_area = ui::draw(frame, &*service))?;
            }
            Some(event) = events.recv() => service.handle_event(event),
            next = input.next() => match next {
                Some(Ok(Event::Key(key))) => match map_key(key, service.input_mode()) {
                    Some(Action::Quit) => {
                        tracing::info!("Quit requested");
                        return Ok(());
                    }
                    Some(Action::Dispatch(command)) => {
                        tracing::debug!("Command {:?}", command);
                        service.execute(command);
                    }
                    None => {}
                },
                Some(Ok(Event::Mouse(mouse))) => {
                    if let Some(command) = map_mouse(mouse, modal_area, service.input_mode()) {
                        service.execute(command);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_runs_every_step_outside_a_session() {
        // raw mode was never enabled, so individual steps may fail; none may abort
        restore_terminal();
        restore_terminal();
    }
}
