//! Per-frame input. All pending terminal events are drained every frame and
//! folded into one [`FrameInput`]; when several button events race within a
//! frame the last one wins, and a click outside every button clears any
//! earlier press.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::buttons::Button;
use crate::screen::Screen;

#[derive(Default, Debug)]
pub struct FrameInput {
    pub quit: bool,
    pub pressed: Option<Button>,
    pub resized: Option<(u16, u16)>,
}

pub fn poll(screen: &Screen) -> io::Result<FrameInput> {
    let mut frame = FrameInput::default();
    while event::poll(Duration::ZERO)? {
        apply(&mut frame, event::read()?, screen);
    }
    Ok(frame)
}

fn apply(frame: &mut FrameInput, ev: Event, screen: &Screen) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Esc => frame.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                frame.quit = true;
            }
            KeyCode::Char(ch) => {
                if let Some(b) = Button::from_key(ch) {
                    frame.pressed = Some(b);
                }
            }
            _ => {}
        },
        Event::Mouse(mouse) => {
            if let MouseEventKind::Up(MouseButton::Left) = mouse.kind {
                let (x, y) = screen.cell_to_canvas(mouse.column, mouse.row);
                frame.pressed = Button::at(x, y);
            }
        }
        Event::Resize(cols, rows) => frame.resized = Some((cols, rows)),
        _ => {}
    }
}
