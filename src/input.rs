//! Host commands read from stdin
//!
//! One command per line:
//! - `pick <px> <py>`: pick at a pointer position in viewport pixels
//! - `resize <w> <h>`: resize the viewport
//! - `look <dx> <dy>`: mouse-look delta in pixels
//! - `quit`

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use diorama_game::{MouseLook, SharedPose, StopHandle};
use glam::Vec2;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Pick { x: f32, y: f32 },
    Resize { width: u32, height: u32 },
    Look { dx: f32, dy: f32 },
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' expects {expected} arguments")]
    Arity { command: &'static str, expected: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

fn numbers<T: FromStr>(command: &'static str, args: &[&str]) -> Result<(T, T), CommandError> {
    let [a, b] = args else {
        return Err(CommandError::Arity { command, expected: 2 });
    };
    let parse = |s: &str| s.parse::<T>().map_err(|_| CommandError::InvalidNumber(s.to_string()));
    Ok((parse(a)?, parse(b)?))
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "pick" => {
                let (x, y) = numbers("pick", &args)?;
                Command::Pick { x, y }
            }
            "resize" => {
                let (width, height) = numbers("resize", &args)?;
                Command::Resize { width, height }
            }
            "look" => {
                let (dx, dy) = numbers("look", &args)?;
                Command::Look { dx, dy }
            }
            "quit" | "exit" => {
                if !args.is_empty() {
                    return Err(CommandError::Arity {
                        command: "quit",
                        expected: 0,
                    });
                }
                Command::Quit
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Read commands until stdin closes, `quit` is entered, or the loop stops
pub async fn input_task(session: Rc<RefCell<Session>>, pose: SharedPose, mut look: MouseLook, stop: StopHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };
        if stop.is_stopped() {
            break;
        }

        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Pick { x, y })) => match session.borrow().pick(x, y) {
                Some(identifier) => info!("Picked '{}'", identifier),
                None => info!("Picked nothing"),
            },
            Ok(Some(Command::Resize { width, height })) => {
                session.borrow_mut().on_viewport_resize(width, height);
                info!("Viewport resized to {}x{}", width, height);
            }
            Ok(Some(Command::Look { dx, dy })) => {
                look.handle_mouse_look(Vec2::new(dx, dy));
                pose.publish(look.sample());
            }
            Ok(Some(Command::Quit)) => {
                info!("Quit requested");
                stop.stop();
                break;
            }
            Err(e) => warn!("{}", e),
        }
    }
}
