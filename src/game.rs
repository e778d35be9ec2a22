//! Game rules and the phase machine that sequences them.
//!
//! Every wait, flash and fade is a phase with either a deadline or a
//! per-frame ramp; `update` is called once per frame and never blocks.
//! Sounds are requested by returning a [`Cue`] so playback stays outside
//! the rules.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::StdRng;

use crate::anim::{FadeIn, TwoPassRamp};
use crate::buttons::{ALL, Button};
use crate::canvas::{BLACK, Canvas, Rgb, WHITE};
use crate::scene;

const STARTUP_HOLD: Duration = Duration::from_secs(4);
const ROUND_LEAD_IN: Duration = Duration::from_secs(1);
const FLASH_GAP: Duration = Duration::from_secs(1);
const INPUT_TIMEOUT: Duration = Duration::from_secs(4);
const GAME_OVER_PAUSE: Duration = Duration::from_secs(1);

const FLASH_STEP: u8 = 50;
const FADE_STEP: u8 = 40;
const GAME_OVER_CYCLES: u8 = 3;

/// Sound requests emitted by `update`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Tone(Button),
    Failure,
    Music,
}

/// Coarse view of the phase machine: is the game showing the pattern or
/// listening for the player's answer?
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Playback,
    AwaitingInput,
}

#[derive(Debug)]
enum Phase {
    /// Hold on the idle board right after launch, while the intro jingle
    /// plays.
    Startup { until: Instant },
    /// Beat of silence before the pattern grows and plays back.
    RoundIntro { until: Instant },
    /// One pattern element lighting up and dimming again.
    PatternFlash { index: usize, ramp: TwoPassRamp, alpha: u8 },
    /// Idle board between two pattern elements.
    PatternGap { index: usize, until: Instant },
    /// Player's turn.
    Waiting,
    /// Echo of a correctly pressed button. A press made while the echo is
    /// running is held and resolved once it ends.
    EchoFlash {
        button: Button,
        pending: Option<Button>,
        ramp: TwoPassRamp,
        alpha: u8,
    },
    /// White strobe after a miss or timeout. Progress is wiped only once
    /// the last cycle ends.
    GameOverFlash { cycles_left: u8, ramp: TwoPassRamp, alpha: u8 },
    GameOverPause { until: Instant },
    /// Cross-fade to the next background color, then a new round.
    BgFade { color: Rgb, fade: FadeIn, alpha: u8 },
}

pub struct Game {
    pattern: Vec<Button>,
    current_step: usize,
    score: u32,
    bg: Rgb,
    last_press: Option<Instant>,
    phase: Phase,
    rng: StdRng,
}

impl Game {
    pub fn new(now: Instant, rng: StdRng) -> Self {
        Game {
            pattern: Vec::new(),
            current_step: 0,
            score: 0,
            bg: BLACK,
            last_press: None,
            phase: Phase::Startup {
                until: now + STARTUP_HOLD,
            },
            rng,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mode(&self) -> Mode {
        match self.phase {
            Phase::Waiting | Phase::EchoFlash { .. } => Mode::AwaitingInput,
            _ => Mode::Playback,
        }
    }

    /// Advance one frame. `pressed` is the button input decoded for this
    /// frame, if any. It is acted on while the game is waiting for the
    /// player or echoing a correct press; every other phase drains and
    /// drops it.
    pub fn update(&mut self, now: Instant, pressed: Option<Button>) -> Option<Cue> {
        let cue = self.step(now, pressed);
        debug_assert!(self.mode() == Mode::Playback || !self.pattern.is_empty());
        cue
    }

    fn step(&mut self, now: Instant, pressed: Option<Button>) -> Option<Cue> {
        match &mut self.phase {
            Phase::Startup { until } => {
                let until = *until;
                if now >= until {
                    self.phase = Phase::RoundIntro {
                        until: now + ROUND_LEAD_IN,
                    };
                    return Some(Cue::Music);
                }
                None
            }
            Phase::RoundIntro { until } => {
                let until = *until;
                if now >= until {
                    let next = self.next_pattern_button();
                    self.pattern.push(next);
                    tracing::debug!(len = self.pattern.len(), "pattern playback");
                    return Some(self.start_pattern_flash(0));
                }
                None
            }
            Phase::PatternFlash { index, ramp, alpha } => {
                match ramp.next() {
                    Some(a) => *alpha = a,
                    None => {
                        let index = *index;
                        self.phase = Phase::PatternGap {
                            index,
                            until: now + FLASH_GAP,
                        };
                    }
                }
                None
            }
            Phase::PatternGap { index, until } => {
                let (index, until) = (*index, *until);
                if now >= until {
                    if index + 1 < self.pattern.len() {
                        return Some(self.start_pattern_flash(index + 1));
                    }
                    self.phase = Phase::Waiting;
                }
                None
            }
            Phase::Waiting => {
                if let Some(b) = pressed {
                    return Some(self.answer(now, b));
                }
                if self.current_step > 0
                    && self
                        .last_press
                        .is_some_and(|t| now.duration_since(t) > INPUT_TIMEOUT)
                {
                    return Some(self.fail());
                }
                None
            }
            Phase::EchoFlash { pending, ramp, alpha, .. } => {
                if pressed.is_some() {
                    *pending = pressed;
                }
                match ramp.next() {
                    Some(a) => {
                        *alpha = a;
                        None
                    }
                    None => {
                        let held = *pending;
                        if self.current_step == self.pattern.len() {
                            self.score += 1;
                            self.current_step = 0;
                            tracing::debug!(score = self.score, "round complete");
                            self.start_bg_fade();
                            None
                        } else if let Some(b) = held {
                            Some(self.answer(now, b))
                        } else {
                            self.phase = Phase::Waiting;
                            None
                        }
                    }
                }
            }
            Phase::GameOverFlash { cycles_left, ramp, alpha } => {
                match ramp.next() {
                    Some(a) => *alpha = a,
                    None => {
                        let left = *cycles_left - 1;
                        if left > 0 {
                            let mut ramp = TwoPassRamp::new(FLASH_STEP);
                            let alpha = ramp.next().unwrap_or(0);
                            self.phase = Phase::GameOverFlash {
                                cycles_left: left,
                                ramp,
                                alpha,
                            };
                        } else {
                            self.pattern.clear();
                            self.current_step = 0;
                            self.score = 0;
                            self.phase = Phase::GameOverPause {
                                until: now + GAME_OVER_PAUSE,
                            };
                        }
                    }
                }
                None
            }
            Phase::GameOverPause { until } => {
                let until = *until;
                if now >= until {
                    self.start_bg_fade();
                }
                None
            }
            Phase::BgFade { color, fade, alpha } => {
                match fade.next() {
                    Some(a) => *alpha = a,
                    None => {
                        self.bg = *color;
                        self.phase = Phase::RoundIntro {
                            until: now + ROUND_LEAD_IN,
                        };
                    }
                }
                None
            }
        }
    }

    /// A fresh game always opens on green; after that the pattern grows
    /// uniformly at random.
    fn next_pattern_button(&mut self) -> Button {
        if self.score == 0 {
            Button::Green
        } else {
            ALL[self.rng.random_range(0..ALL.len())]
        }
    }

    fn start_pattern_flash(&mut self, index: usize) -> Cue {
        let button = self.pattern[index];
        let mut ramp = TwoPassRamp::new(FLASH_STEP);
        let alpha = ramp.next().unwrap_or(0);
        self.phase = Phase::PatternFlash { index, ramp, alpha };
        Cue::Tone(button)
    }

    fn start_bg_fade(&mut self) {
        let color = Rgb(self.rng.random(), self.rng.random(), self.rng.random());
        let mut fade = FadeIn::new(FADE_STEP);
        let alpha = fade.next().unwrap_or(0);
        self.phase = Phase::BgFade { color, fade, alpha };
    }

    /// Resolve a button press against the pattern: a match echoes the button
    /// and advances, a mismatch ends the game.
    fn answer(&mut self, now: Instant, b: Button) -> Cue {
        if self.pattern.get(self.current_step) != Some(&b) {
            return self.fail();
        }
        self.current_step += 1;
        self.last_press = Some(now);
        let mut ramp = TwoPassRamp::new(FLASH_STEP);
        let alpha = ramp.next().unwrap_or(0);
        self.phase = Phase::EchoFlash {
            button: b,
            pending: None,
            ramp,
            alpha,
        };
        Cue::Tone(b)
    }

    fn fail(&mut self) -> Cue {
        tracing::debug!(score = self.score, reached = self.current_step, "game over");
        let mut ramp = TwoPassRamp::new(FLASH_STEP);
        let alpha = ramp.next().unwrap_or(0);
        self.phase = Phase::GameOverFlash {
            cycles_left: GAME_OVER_CYCLES,
            ramp,
            alpha,
        };
        Cue::Failure
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        scene::draw(canvas, self.bg, self.score);
        match &self.phase {
            Phase::PatternFlash { index, alpha, .. } => {
                if let Some(b) = self.pattern.get(*index) {
                    canvas.blend_rect(b.rect(), b.flash_color(), *alpha);
                }
            }
            Phase::EchoFlash { button, alpha, .. } => {
                canvas.blend_rect(button.rect(), button.flash_color(), *alpha);
            }
            Phase::GameOverFlash { alpha, .. } => {
                canvas.blend_all(WHITE, *alpha);
                scene::draw_board(canvas);
            }
            Phase::BgFade { color, alpha, .. } => {
                canvas.blend_all(*color, *alpha);
                scene::draw_board(canvas);
            }
            Phase::Startup { .. }
            | Phase::RoundIntro { .. }
            | Phase::PatternGap { .. }
            | Phase::Waiting
            | Phase::GameOverPause { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const DT: Duration = Duration::from_millis(33);

    struct Harness {
        game: Game,
        now: Instant,
    }

    impl Harness {
        fn new(seed: u64) -> Self {
            let now = Instant::now();
            Harness {
                game: Game::new(now, StdRng::seed_from_u64(seed)),
                now,
            }
        }

        fn tick(&mut self, pressed: Option<Button>) -> Option<Cue> {
            self.now += DT;
            self.game.update(self.now, pressed)
        }

        fn run(&mut self, frames: u32) {
            for _ in 0..frames {
                self.tick(None);
            }
        }

        /// Jump the clock forward and deliver one empty frame.
        fn wait(&mut self, d: Duration) -> Option<Cue> {
            self.now += d;
            self.game.update(self.now, None)
        }

        fn run_until_waiting(&mut self, limit: u32) {
            for _ in 0..limit {
                if matches!(self.game.phase, Phase::Waiting) {
                    return;
                }
                self.tick(None);
            }
            panic!("game never started waiting for input");
        }

        /// Tick until the game accepts input, then press `b`.
        fn press(&mut self, b: Button) -> Option<Cue> {
            self.run_until_waiting(5000);
            self.tick(Some(b))
        }

        /// Answer every element of the current pattern correctly, once per
        /// round, returning each round's pattern as it was played.
        fn play_rounds(&mut self, rounds: u32) -> Vec<Vec<Button>> {
            let mut seen = Vec::new();
            for _ in 0..rounds {
                self.run_until_waiting(5000);
                seen.push(self.game.pattern.clone());
                for i in 0..self.game.pattern.len() {
                    let b = self.game.pattern[i];
                    assert_eq!(self.press(b), Some(Cue::Tone(b)));
                }
                // let the final echo finish so the score lands
                self.run(12);
            }
            seen
        }
    }

    #[test]
    fn first_round_always_opens_on_green() {
        for seed in [0, 1, 2, 7, 99] {
            let mut h = Harness::new(seed);
            h.run_until_waiting(2000);
            assert_eq!(h.game.pattern, vec![Button::Green]);
        }
    }

    #[test]
    fn startup_hold_keeps_the_board_idle() {
        let mut h = Harness::new(1);
        h.run(30); // one second in
        assert!(matches!(h.game.phase, Phase::Startup { .. }));
        assert!(h.game.pattern.is_empty());
    }

    #[test]
    fn music_cue_fires_once_when_the_hold_ends() {
        let mut h = Harness::new(1);
        let mut cues = Vec::new();
        for _ in 0..400 {
            if let Some(c) = h.tick(None) {
                cues.push(c);
            }
        }
        assert_eq!(cues.first(), Some(&Cue::Music));
        assert_eq!(cues.iter().filter(|c| **c == Cue::Music).count(), 1);
    }

    #[test]
    fn playback_sounds_each_pattern_element_in_order() {
        let mut h = Harness::new(2);
        h.play_rounds(2);
        let mut cues = Vec::new();
        for _ in 0..5000 {
            if matches!(h.game.phase, Phase::Waiting) {
                break;
            }
            if let Some(c) = h.tick(None) {
                cues.push(c);
            }
        }
        assert_eq!(h.game.pattern.len(), 3);
        let expected: Vec<Cue> = h.game.pattern.iter().map(|b| Cue::Tone(*b)).collect();
        assert_eq!(cues, expected);
    }

    #[test]
    fn presses_during_playback_are_ignored() {
        let mut h = Harness::new(9);
        assert_eq!(h.tick(Some(Button::Red)), None);
        for _ in 0..2000 {
            if matches!(h.game.phase, Phase::PatternFlash { .. }) {
                break;
            }
            h.tick(None);
        }
        assert!(matches!(h.game.phase, Phase::PatternFlash { .. }));
        assert_eq!(h.tick(Some(Button::Red)), None);
        assert_eq!(h.game.current_step, 0);
        assert_eq!(h.game.score(), 0);
    }

    #[test]
    fn completing_the_pattern_scores_and_grows_it() {
        let mut h = Harness::new(3);
        h.run_until_waiting(2000);
        assert_eq!(h.game.pattern, vec![Button::Green]);
        assert_eq!(h.press(Button::Green), Some(Cue::Tone(Button::Green)));
        h.run(12); // echo runs out, fade starts
        assert_eq!(h.game.score(), 1);
        assert_eq!(h.game.current_step, 0);
        h.run_until_waiting(5000);
        assert_eq!(h.game.pattern.len(), 2);
        assert_eq!(h.game.pattern[0], Button::Green);
    }

    #[test]
    fn pattern_grows_by_one_each_round() {
        let mut h = Harness::new(12);
        let rounds = h.play_rounds(4);
        let lens: Vec<usize> = rounds.iter().map(Vec::len).collect();
        assert_eq!(lens, [1, 2, 3, 4]);
        // earlier rounds stay as prefixes
        for w in rounds.windows(2) {
            assert_eq!(&w[0][..], &w[1][..w[0].len()]);
        }
    }

    #[test]
    fn round_completion_repaints_the_background() {
        let mut h = Harness::new(6);
        assert_eq!(h.game.bg, BLACK);
        h.play_rounds(1);
        h.run_until_waiting(5000);
        assert_ne!(h.game.bg, BLACK);
    }

    #[test]
    fn wrong_press_wipes_progress_after_the_strobe() {
        let mut h = Harness::new(7);
        h.run_until_waiting(2000);
        assert_eq!(h.press(Button::Red), Some(Cue::Failure));
        // the strobe is still running; nothing is reset yet
        h.run(10);
        assert!(matches!(h.game.phase, Phase::GameOverFlash { .. }));
        assert!(!h.game.pattern.is_empty());
        // three 12-frame cycles in total
        h.run(40);
        assert!(matches!(h.game.phase, Phase::GameOverPause { .. }));
        assert!(h.game.pattern.is_empty());
        assert_eq!(h.game.score(), 0);
        assert_eq!(h.game.current_step, 0);
        // and the next game opens on green again
        h.run_until_waiting(2000);
        assert_eq!(h.game.pattern, vec![Button::Green]);
    }

    #[test]
    fn wrong_second_press_ends_the_game() {
        let mut h = Harness::new(11);
        h.play_rounds(1);
        h.run_until_waiting(5000);
        let p = h.game.pattern.clone();
        assert_eq!(p.len(), 2);
        assert_eq!(h.press(p[0]), Some(Cue::Tone(p[0])));
        let wrong = ALL.into_iter().find(|b| *b != p[1]).unwrap();
        assert_eq!(h.press(wrong), Some(Cue::Failure));
    }

    #[test]
    fn press_during_echo_is_held_until_the_echo_ends() {
        let mut h = Harness::new(11);
        h.play_rounds(1);
        h.run_until_waiting(5000);
        let p = h.game.pattern.clone();
        assert_eq!(p.len(), 2);
        assert_eq!(h.press(p[0]), Some(Cue::Tone(p[0])));
        // answer the next element while the first echo is still running
        assert_eq!(h.tick(Some(p[1])), None);
        let cue = (0..12).find_map(|_| h.tick(None));
        assert_eq!(cue, Some(Cue::Tone(p[1])));
        assert_eq!(h.game.current_step, 2);
        assert!(matches!(h.game.phase, Phase::EchoFlash { .. }));
        // the chained echo still completes the round
        h.run(12);
        assert_eq!(h.game.score(), 2);
    }

    #[test]
    fn wrong_press_during_echo_fails_when_the_echo_ends() {
        let mut h = Harness::new(13);
        h.play_rounds(1);
        h.run_until_waiting(5000);
        let p = h.game.pattern.clone();
        assert_eq!(h.press(p[0]), Some(Cue::Tone(p[0])));
        let wrong = ALL.into_iter().find(|b| *b != p[1]).unwrap();
        assert_eq!(h.tick(Some(wrong)), None);
        let cue = (0..12).find_map(|_| h.tick(None));
        assert_eq!(cue, Some(Cue::Failure));
        assert!(matches!(h.game.phase, Phase::GameOverFlash { .. }));
    }

    #[test]
    fn press_during_the_final_echo_is_dropped() {
        let mut h = Harness::new(3);
        h.run_until_waiting(2000);
        assert_eq!(h.press(Button::Green), Some(Cue::Tone(Button::Green)));
        assert_eq!(h.tick(Some(Button::Green)), None);
        // the echo runs out into the round-won fade with no extra cue
        for _ in 0..12 {
            assert_eq!(h.tick(None), None);
        }
        assert_eq!(h.game.score(), 1);
        assert_eq!(h.game.current_step, 0);
        assert!(matches!(h.game.phase, Phase::BgFade { .. }));
    }

    #[test]
    fn stalling_before_any_press_is_allowed() {
        let mut h = Harness::new(1);
        h.run_until_waiting(2000);
        assert_eq!(h.wait(Duration::from_secs(60)), None);
        assert!(matches!(h.game.phase, Phase::Waiting));
        // the round is still winnable
        assert_eq!(h.press(Button::Green), Some(Cue::Tone(Button::Green)));
    }

    #[test]
    fn stalling_after_a_press_forfeits() {
        let mut h = Harness::new(5);
        h.play_rounds(1);
        h.run_until_waiting(5000);
        assert_eq!(h.game.pattern.len(), 2);
        let first = h.game.pattern[0];
        h.press(first);
        h.run(12); // echo out, waiting again
        assert!(matches!(h.game.phase, Phase::Waiting));
        assert_eq!(h.wait(Duration::from_secs(5)), Some(Cue::Failure));
        assert!(matches!(h.game.phase, Phase::GameOverFlash { .. }));
    }

    #[test]
    fn same_seed_yields_same_patterns() {
        let mut a = Harness::new(42);
        let mut b = Harness::new(42);
        assert_eq!(a.play_rounds(5), b.play_rounds(5));
    }

    #[test]
    fn input_phases_always_have_a_pattern() {
        let mut h = Harness::new(4);
        for _ in 0..3000 {
            h.tick(None);
            if h.game.mode() == Mode::AwaitingInput {
                assert!(!h.game.pattern.is_empty());
            }
        }
    }

    #[test]
    fn flash_overlay_tints_only_the_flashing_button() {
        let mut h = Harness::new(10);
        for _ in 0..2000 {
            if matches!(h.game.phase, Phase::PatternFlash { .. }) {
                break;
            }
            h.tick(None);
        }
        h.run(3); // partway up the ramp
        let mut c = Canvas::new();
        h.game.draw(&mut c);
        let lit = Button::Green.rect();
        let pixel = c.get(lit.x + lit.w / 2, lit.y + lit.h / 2);
        assert_ne!(pixel, WHITE);
        // the star field is not touched by the overlay
        let mut idle = Canvas::new();
        scene::draw(&mut idle, BLACK, 0);
        assert_eq!(c.get(113, 33), idle.get(113, 33));
    }

    #[test]
    fn strobe_tints_margins_but_repaints_the_board() {
        let mut h = Harness::new(8);
        h.run_until_waiting(2000);
        h.press(Button::Red); // round one wants green
        h.run(6); // peak of the ramp
        let mut c = Canvas::new();
        h.game.draw(&mut c);
        let mut idle = Canvas::new();
        scene::draw(&mut idle, BLACK, 0);
        // margins are fully whited out, the board stays its own colors
        assert_eq!(c.get(5, 5), WHITE);
        assert_eq!(c.get(113, 33), idle.get(113, 33));
        assert_eq!(c.get(335, 35), idle.get(335, 35));
        assert_ne!(c.get(113, 33), WHITE);
        assert_ne!(c.get(335, 35), WHITE);
    }
}
