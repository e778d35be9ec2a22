//! Board and HUD rendering. Buttons are drawn in their idle look here;
//! flashes and fades are blended on top by the game.

use crate::buttons::{BUTTON_SIZE, Button};
use crate::canvas::{self, Canvas, HEIGHT, Rect, Rgb, WHITE, WIDTH};

const FIELD_BLUE: Rgb = Rgb(0, 0, 155);
const STRIPE_RED: Rgb = Rgb(155, 0, 0);
const HINT_GRAY: Rgb = Rgb(40, 40, 40);

const STRIPE_H: i32 = 30;
const STRIPE_OFFSETS: [i32; 4] = [0, 55, 115, 170];
const STAR_RADIUS: i32 = 5;

/// Full scene: background, board, score, key hints.
pub fn draw(canvas: &mut Canvas, bg: Rgb, score: u32) {
    canvas.fill(bg);
    draw_board(canvas);
    draw_score(canvas, score);
    draw_hints(canvas);
}

/// Idle board. The yellow button wears a star field, the other three wear
/// stripes; each still flashes its own color when lit.
pub fn draw_board(canvas: &mut Canvas) {
    let field = Button::Yellow.rect();
    canvas.fill_rect(field, FIELD_BLUE);
    for row in 0..10 {
        let y = field.y + 10 + row * 20;
        for col in 0..5 {
            let x = field.x + 10 + col * 40 + (row % 2) * 20;
            canvas.fill_circle(x, y, STAR_RADIUS, WHITE);
        }
    }

    for b in [Button::Blue, Button::Red, Button::Green] {
        let r = b.rect();
        canvas.fill_rect(r, WHITE);
        for off in STRIPE_OFFSETS {
            canvas.fill_rect(
                Rect::new(r.x, r.y + off, BUTTON_SIZE, STRIPE_H),
                STRIPE_RED,
            );
        }
    }
}

fn draw_score(canvas: &mut Canvas, score: u32) {
    let text = format!("SCORE {score}");
    let x = WIDTH - 10 - canvas::text_width(&text, 4);
    canvas::draw_text(canvas, x, 10, &text, 4, WHITE);
}

fn draw_hints(canvas: &mut Canvas) {
    canvas::draw_text(
        canvas,
        10,
        HEIGHT - 25,
        "MATCH THE PATTERN  Q W A S",
        3,
        HINT_GRAY,
    );
}
