// Key bindings per input mode
use crate::application::dashboard_service::{Command, InputMode};
use crate::application::modal::ClickTarget;
use crate::domain::dashboard::WidgetKind;
use crate::domain::resources::{Granularity, InstanceAction};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Dispatch(Command),
}

pub fn map_key(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let command = match mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('d') => Command::SelectGranularity(Granularity::Daily),
            KeyCode::Char('w') => Command::SelectGranularity(Granularity::Weekly),
            KeyCode::Char('m') => Command::SelectGranularity(Granularity::Monthly),
            KeyCode::Char('y') => Command::SelectGranularity(Granularity::Yearly),
            KeyCode::Char('1') => Command::ViewDetails(WidgetKind::Cost),
            KeyCode::Char('2') => Command::ViewDetails(WidgetKind::Compute),
            KeyCode::Char('3') => Command::ViewDetails(WidgetKind::Storage),
            KeyCode::Char('4') => Command::ViewDetails(WidgetKind::Identity),
            KeyCode::Char('r') => Command::ReloadAll,
            _ => return None,
        },
        InputMode::Modal => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Command::CloseModal,
            KeyCode::Down | KeyCode::Char('j') => Command::SelectNext,
            KeyCode::Up | KeyCode::Char('k') => Command::SelectPrevious,
            KeyCode::Char('s') => Command::RequestAction(InstanceAction::Start),
            KeyCode::Char('x') => Command::RequestAction(InstanceAction::Stop),
            _ => return None,
        },
        InputMode::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Command::Confirm(true),
            KeyCode::Char('n') | KeyCode::Esc => Command::Confirm(false),
            _ => return None,
        },
        InputMode::Notification => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Command::DismissNotification,
            _ => return None,
        },
    };
    Some(Action::Dispatch(command))
}

/// Left clicks while the modal is open land on its panel or the backdrop
pub fn map_mouse(mouse: MouseEvent, modal_area: Option<Rect>, mode: InputMode) -> Option<Command> {
    if mode != InputMode::Modal || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let area = modal_area?;
    let target = if area.contains(Position::new(mouse.column, mouse.row)) {
        ClickTarget::Panel
    } else {
        ClickTarget::Backdrop
    };
    Some(Command::Click(target))
}
