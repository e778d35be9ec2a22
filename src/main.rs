mod anim;
mod audio;
mod buttons;
mod canvas;
mod game;
mod input;
mod scene;
mod screen;

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, event, execute, terminal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use crate::audio::Audio;
use crate::canvas::Canvas;
use crate::game::Game;
use crate::screen::Screen;

const FRAME: Duration = Duration::from_millis(33); // ~30 fps

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(version, about = "A Simon-style memory game in the terminal")]
struct Cli {
    /// Run without sound.
    #[arg(long)]
    mute: bool,

    /// Seed for the pattern sequence; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    // Logs go to stderr; stdout belongs to the game screen.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

// ── Terminal setup ──────────────────────────────────────────────────────────

fn setup_terminal(out: &mut io::Stdout) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        event::EnableMouseCapture,
    )
}

fn restore_terminal(out: &mut io::Stdout) -> io::Result<()> {
    execute!(
        out,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

// ── Main loop ───────────────────────────────────────────────────────────────

fn run(out: &mut io::Stdout, screen: &mut Screen, audio: &Audio, rng: StdRng) -> Result<()> {
    let mut canvas = Canvas::new();
    let mut game = Game::new(Instant::now(), rng);
    audio.play_startup();

    loop {
        let frame_start = Instant::now();

        let frame = input::poll(screen)?;
        if frame.quit {
            tracing::info!(score = game.score(), "quit");
            return Ok(());
        }
        if let Some((cols, rows)) = frame.resized {
            screen.rescale(cols, rows);
            execute!(out, terminal::Clear(terminal::ClearType::All))?;
        }

        if let Some(cue) = game.update(Instant::now(), frame.pressed) {
            audio.play(cue);
        }

        game.draw(&mut canvas);
        screen.present(&canvas, out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let audio = if cli.mute {
        Audio::muted()
    } else {
        Audio::new().context("audio setup failed (run with --mute to play silent)")?
    };

    let seed: u64 = cli.seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(seed, mute = cli.mute, "starting");
    let rng = StdRng::seed_from_u64(seed);

    let mut screen = Screen::new()?;

    let mut out = stdout();
    setup_terminal(&mut out)?;
    let result = run(&mut out, &mut screen, &audio, rng);
    let restored = restore_terminal(&mut out);
    result?;
    restored?;
    Ok(())
}
