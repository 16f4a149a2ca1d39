use clap::Parser;
use jogdial::{JogDial, JogDialCommand, JogDialConfig, Masks};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;

/// Interactive jog dial. Arrow keys step the selection, Escape quits.
/// Lines on stdin are also accepted: `+`, `-`, or a signed step count.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of ticks on the dial
    #[arg(long, default_value_t = 40)]
    ticks: usize,

    /// Initially selected tick
    #[arg(long, default_value_t = 0)]
    initial: usize,

    /// Fraction of the half-width used as the interaction radius
    #[arg(long, default_value_t = 0.8)]
    radius_ratio: f32,

    #[arg(long, default_value_t = 480)]
    width: u32,

    #[arg(long, default_value_t = 320)]
    height: u32,

    /// Seconds per selection step
    #[arg(long, default_value_t = 0.6)]
    duration: f32,

    /// Shadow mask image; procedural masks are used unless both masks are given
    #[arg(long, requires = "color_mask")]
    shadow_mask: Option<PathBuf>,

    /// Color mask image
    #[arg(long, requires = "shadow_mask")]
    color_mask: Option<PathBuf>,
}

fn parse_step(line: &str) -> Option<i32> {
    match line.trim() {
        "+" => Some(1),
        "-" => Some(-1),
        other => other.parse().ok(),
    }
}

fn pipe_stdin(sender: Sender<JogDialCommand>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let Some(step) = parse_step(&line) else {
                log::warn!("ignoring stdin line {:?}", line);
                continue;
            };
            if sender.send(JogDialCommand::Step(step)).is_err() {
                break;
            }
        }
    });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = JogDialConfig::builder()
        .tick_count(args.ticks)
        .initial_index(args.initial)
        .radius_ratio(args.radius_ratio)
        .width(args.width)
        .height(args.height)
        .step_duration(args.duration)
        .build();

    let masks = match (&args.shadow_mask, &args.color_mask) {
        (Some(shadow), Some(color)) => Masks::open(shadow, color)?,
        _ => Masks::procedural(config.width, config.height),
    };

    let mut dial = JogDial::new(config, masks)?;

    let (sender, receiver) = mpsc::channel();
    pipe_stdin(sender);

    dial.show_with_commands(receiver)?;
    Ok(())
}
