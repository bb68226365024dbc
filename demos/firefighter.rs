extern crate clipfade;
extern crate env_logger;

use std::io::BufRead;
use std::sync::mpsc;
use std::{io, thread, time};

use clipfade::{Clock, Viewer, ViewerConfig};

enum Command {
    Toggle,
    Quit,
}

fn main() {
    env_logger::init();

    let default = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");
    let root = std::env::args().nth(1).unwrap_or(default.into());
    let mut viewer = Viewer::new(ViewerConfig::new(root));

    // Every line on stdin stands in for a click on the toggle button.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let command = match line {
                Ok(ref text) if text.trim() == "q" => Command::Quit,
                Ok(_) => Command::Toggle,
                Err(_) => Command::Quit,
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });
    println!("Press Enter to toggle between Idle and Pointing Gesture, q to quit.");

    let frame_time = time::Duration::from_millis(16);
    let mut clock = Clock::new();
    let mut shown = String::new();
    'main: loop {
        while let Ok(command) = rx.try_recv() {
            match command {
                Command::Toggle => viewer.click(),
                Command::Quit => break 'main,
            }
        }

        viewer.frame(clock.delta());

        if let Some(controller) = viewer.controller() {
            if controller.current_clip_name() != shown {
                shown = controller.current_clip_name().to_string();
                println!("[{:>7.2}s] now playing {:?}", clock.elapsed(), shown);
            }
        }
        thread::sleep(frame_time);
    }
}
