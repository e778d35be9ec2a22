//! The four game buttons and everything keyed off them: board geometry,
//! flash colors, tones, and key bindings.

use crate::canvas::{HEIGHT, Rect, Rgb, WIDTH};

pub const BUTTON_SIZE: i32 = 200;
pub const BUTTON_GAP: i32 = 20;
const X_MARGIN: i32 = (WIDTH - (BUTTON_SIZE * 2 + BUTTON_GAP)) / 2;
const Y_MARGIN: i32 = (HEIGHT - (BUTTON_SIZE * 2 + BUTTON_GAP)) / 2;

/// One of the four buttons, named after the color it flashes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Button {
    Yellow,
    Blue,
    Red,
    Green,
}

pub const ALL: [Button; 4] = [Button::Yellow, Button::Blue, Button::Red, Button::Green];

impl Button {
    /// Board position: yellow and blue on top, red and green below.
    pub fn rect(self) -> Rect {
        let (col, row) = match self {
            Button::Yellow => (0, 0),
            Button::Blue => (1, 0),
            Button::Red => (0, 1),
            Button::Green => (1, 1),
        };
        Rect::new(
            X_MARGIN + col * (BUTTON_SIZE + BUTTON_GAP),
            Y_MARGIN + row * (BUTTON_SIZE + BUTTON_GAP),
            BUTTON_SIZE,
            BUTTON_SIZE,
        )
    }

    pub fn flash_color(self) -> Rgb {
        match self {
            Button::Yellow => Rgb(255, 255, 0),
            Button::Blue => Rgb(0, 0, 255),
            Button::Red => Rgb(255, 0, 0),
            Button::Green => Rgb(0, 255, 0),
        }
    }

    /// Pitch of the tone played when this button flashes, ascending
    /// left-to-right, top-to-bottom.
    pub fn tone_hz(self) -> f64 {
        match self {
            Button::Yellow => 262.0,
            Button::Blue => 330.0,
            Button::Red => 392.0,
            Button::Green => 523.0,
        }
    }

    pub fn from_key(ch: char) -> Option<Button> {
        match ch.to_ascii_lowercase() {
            'q' => Some(Button::Yellow),
            'w' => Some(Button::Blue),
            'a' => Some(Button::Red),
            's' => Some(Button::Green),
            _ => None,
        }
    }

    /// Which button (if any) covers the given canvas point.
    pub fn at(x: i32, y: i32) -> Option<Button> {
        ALL.into_iter().find(|b| b.rect().contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_geometry_is_centered() {
        assert_eq!(Button::Yellow.rect(), Rect::new(110, 30, 200, 200));
        assert_eq!(Button::Blue.rect(), Rect::new(330, 30, 200, 200));
        assert_eq!(Button::Red.rect(), Rect::new(110, 250, 200, 200));
        assert_eq!(Button::Green.rect(), Rect::new(330, 250, 200, 200));
    }

    #[test]
    fn rects_do_not_overlap() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                let (ra, rb) = (a.rect(), b.rect());
                let disjoint = ra.x + ra.w <= rb.x
                    || rb.x + rb.w <= ra.x
                    || ra.y + ra.h <= rb.y
                    || rb.y + rb.h <= ra.y;
                assert!(disjoint, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn hit_test_finds_each_button() {
        for b in ALL {
            let r = b.rect();
            assert_eq!(Button::at(r.x + r.w / 2, r.y + r.h / 2), Some(b));
            assert_eq!(Button::at(r.x, r.y), Some(b));
        }
    }

    #[test]
    fn hit_test_misses_gaps_and_margins() {
        // dead center of the board is inside the gap
        assert_eq!(Button::at(320, 240), None);
        assert_eq!(Button::at(315, 100), None);
        assert_eq!(Button::at(5, 5), None);
        assert_eq!(Button::at(109, 30), None);
        assert_eq!(Button::at(310, 30), None);
    }

    #[test]
    fn key_bindings_ignore_case_and_reject_others() {
        assert_eq!(Button::from_key('q'), Some(Button::Yellow));
        assert_eq!(Button::from_key('W'), Some(Button::Blue));
        assert_eq!(Button::from_key('a'), Some(Button::Red));
        assert_eq!(Button::from_key('S'), Some(Button::Green));
        assert_eq!(Button::from_key('x'), None);
        assert_eq!(Button::from_key(' '), None);
    }
}
