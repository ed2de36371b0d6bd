use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use argo_core::{update, AppState, Msg};
use argo_logging::{argo_debug, argo_info};

use super::config::AppConfig;
use super::console::{self, Command, RenderCursor};
use super::effects::EffectRunner;

enum AppInput {
    Msg(Msg),
    Line(String),
    InputClosed,
}

impl From<Msg> for AppInput {
    fn from(msg: Msg) -> Self {
        AppInput::Msg(msg)
    }
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let (input_tx, input_rx) = mpsc::channel::<AppInput>();
    let runner = EffectRunner::new(
        config.transport_settings(),
        config.output_dir.clone(),
        input_tx.clone(),
    )
    .context("starting the transport thread")?;
    spawn_stdin_reader(input_tx);

    let mut app = ConsoleApp {
        state: AppState::with_parameters(config.query_defaults()),
        runner,
        cursor: RenderCursor::default(),
    };
    println!(
        "argo: querying {} ({:?}); results go to {}",
        config.endpoint,
        config.transport,
        config.output_dir.display()
    );
    println!("Type 'help' for commands.");

    while let Ok(input) = input_rx.recv() {
        let flow = match input {
            AppInput::Msg(msg) => {
                app.dispatch(msg);
                Flow::Continue
            }
            AppInput::Line(line) => app.handle_line(&line),
            AppInput::InputClosed => Flow::Quit,
        };
        if flow == Flow::Quit {
            break;
        }
    }

    app.shutdown();
    argo_info!("argo exiting");
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(AppInput::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(AppInput::InputClosed);
    });
}

struct ConsoleApp {
    state: AppState,
    runner: EffectRunner,
    cursor: RenderCursor,
}

impl ConsoleApp {
    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match console::parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(message) => {
                println!("{message}");
                return Flow::Continue;
            }
        };
        match command {
            Command::Dispatch(msgs) => msgs.into_iter().for_each(|msg| self.dispatch(msg)),
            Command::DrawOverlay(rect) => {
                let msg = self.runner.overlay_mut().user_draw(rect);
                self.dispatch(msg);
            }
            Command::ClearOverlay => {
                let msg = self.runner.overlay_mut().user_clear();
                self.dispatch(msg);
            }
            Command::Show => print_lines(console::summary(&self.state.view())),
            Command::Help => println!("{}", console::HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Runs `msg` and any follow-up messages through `update`, then prints
    /// what changed.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        let mut notes = Vec::new();
        while let Some(msg) = queue.pop_front() {
            argo_debug!("dispatch {msg:?}");
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            let outcome = self.runner.run(effects);
            queue.extend(outcome.follow_up);
            notes.extend(outcome.notes);
        }

        if self.state.consume_dirty() {
            print_lines(console::render(&self.state.view(), &mut self.cursor));
        }
        print_lines(notes);
    }

    fn shutdown(&mut self) {
        if self.state.view().loading {
            self.dispatch(Msg::CancelClicked);
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
