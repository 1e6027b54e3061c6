//! Interactive mode: the whole widget on one terminal.

use pomowidget_core::{Counter, Input, Mode, Widget};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::frames;
use crate::host::{print_counter, Host, TerminalDisplay};

const HELP: &str = "keys (then Enter): space/s start-pause, r reset, f/b/l mode, \
                    +/-/0 counter, d <mode> <min> duration, q quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Input(Input),
    Help,
    Quit,
}

fn key(key: char) -> Command {
    Command::Input(Input::Key {
        key,
        in_text_field: false,
    })
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None | Some("s") => key(' '),
        Some(k @ ("f" | "b" | "l" | "F" | "B" | "L")) => key(k.chars().next()?),
        Some("r") => Command::Input(Input::Reset),
        Some("+") => Command::Input(Input::CounterIncrement),
        Some("-") => Command::Input(Input::CounterDecrement),
        Some("0") => Command::Input(Input::CounterReset),
        Some("m") => Command::Input(Input::SelectMode {
            mode: words.next()?.parse::<Mode>().ok()?,
        }),
        Some("d") => {
            let mode = words.next()?.parse::<Mode>().ok()?;
            let minutes = words.next()?.parse::<u32>().ok()?;
            Command::Input(Input::SelectDuration { mode, minutes })
        }
        Some("?" | "h" | "help") => Command::Help,
        Some("q" | "quit") => Command::Quit,
        Some(_) => return None,
    };
    Some(command)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let host = Host::open(Box::new(TerminalDisplay::new()))?;
    let interval = host.config.ui.frame_interval_ms;
    let frames_queue = host.frames;
    let mut widget = Widget::new(Counter::new(print_counter), host.engine);

    eprintln!("{HELP}");
    widget.counter.render();

    frames::runtime()?.block_on(async {
        let mut ticker = frames::ticker(interval);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    frames::pump(&mut widget.timer, &frames_queue);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_command(&line) {
                        Some(Command::Input(input)) => {
                            if let Some(event) = widget.handle(input) {
                                tracing::debug!(?event, "timer event");
                            }
                        }
                        Some(Command::Help) => eprintln!("{HELP}"),
                        Some(Command::Quit) => break,
                        None => eprintln!("unknown command: {}", line.trim()),
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        Ok::<(), std::io::Error>(())
    })?;
    println!();
    Ok(())
}
