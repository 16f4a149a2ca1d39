use jogdial::{JogDial, JogDialCommand, JogDialConfig};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = JogDialConfig::builder()
        .tick_count(24)
        .initial_index(12)
        .title("Jog Dial - random walk".to_string())
        .build();

    let mut dial = JogDial::with_procedural_masks(config)?;
    let stop = dial.stop_handle();

    // Create a channel for sending random steps
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let command = JogDialCommand::Advance {
                direction: if rng.random_bool(0.5) { 1 } else { -1 },
                duration: rng.random_range(0.2..0.9),
                force: false,
            };
            if sender.send(command).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(rng.random_range(150..700)));
        }
        stop.stop();
    });

    println!("Jog dial stepping randomly for 200 moves (arrow keys also work)");
    println!("Press Escape to exit");

    dial.show_with_commands(receiver)?;
    Ok(())
}
