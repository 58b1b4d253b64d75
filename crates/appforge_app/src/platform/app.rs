use std::io::{self, BufRead, ErrorKind, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use appforge_core::{update, AppState, Msg};
use engine_logging::{engine_info, engine_warn};

use super::effects::EffectRunner;
use super::render::{render, PROMPT};
use super::{config, history, logging};
use crate::cli::Cli;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const QUIT_COMMAND: &str = ":q";

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::initialize(cli.log.into());

    let config = config::load_or_default(&cli.config).apply_cli(&cli);
    if cli.history {
        for entry in history::load_history(&config.output_dir) {
            println!("{}", history::format_entry(&entry));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let engine_config = config.to_engine_config();
    engine_info!("Starting appforge with {:?}", engine_config);
    let runner = EffectRunner::new(engine_config).context("failed to start conversion engine")?;
    let mut host = Host::new(runner, io::stdout());

    match cli.url {
        Some(url) => Ok(if host.run_once(url) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
        None => {
            let (input_tx, input_rx) = mpsc::channel();
            spawn_stdin_reader(input_tx)?;
            host.run_interactive(input_rx);
            Ok(ExitCode::SUCCESS)
        }
    }
}

enum InputEvent {
    Line(String),
    Quit,
}

/// Owns the form state and feeds it messages from the user and the engine.
struct Host<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
}

impl<W: Write> Host<W> {
    fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            out,
        }
    }

    /// Applies one message and runs its effects; reports whether the view changed.
    fn apply(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        self.runner.run(effects);
        dirty
    }

    fn dispatch(&mut self, msg: Msg) {
        if self.apply(msg) {
            self.draw();
        }
    }

    /// Edits and submits as one step so the previous result is not redrawn in between.
    fn submit(&mut self, url: String) {
        let edited = self.apply(Msg::UrlChanged(url));
        let submitted = self.apply(Msg::SubmitClicked);
        if edited || submitted {
            self.draw();
        }
    }

    fn pump(&mut self) {
        for msg in self.runner.poll(POLL_INTERVAL) {
            self.dispatch(msg);
        }
    }

    fn draw(&mut self) {
        for line in render(&self.state.view()) {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }

    fn prompt(&mut self) {
        let _ = write!(self.out, "{PROMPT}");
        let _ = self.out.flush();
    }

    /// Converts a single URL and reports whether it ended without an error.
    fn run_once(&mut self, url: String) -> bool {
        self.submit(url);
        while self.state.is_converting() {
            self.pump();
        }
        let view = self.state.view();
        view.error.is_empty() && view.validation.is_none()
    }

    fn accept_line(&mut self, line: String) {
        if self.state.is_converting() {
            let _ = writeln!(self.out, "A conversion is already in progress.");
        }
        self.submit(line);
        if !self.state.is_converting() {
            self.prompt();
        }
    }

    /// Reads submissions until `Quit` or a closed input, then waits out the in-flight conversion.
    fn run_interactive(&mut self, input: mpsc::Receiver<InputEvent>) {
        self.prompt();
        let mut quitting = false;
        loop {
            while !quitting {
                match input.try_recv() {
                    Ok(InputEvent::Line(line)) => self.accept_line(line),
                    Ok(InputEvent::Quit) | Err(TryRecvError::Disconnected) => quitting = true,
                    Err(TryRecvError::Empty) => break,
                }
            }
            if quitting && !self.state.is_converting() {
                return;
            }

            let was_converting = self.state.is_converting();
            self.pump();
            if was_converting && !self.state.is_converting() && !quitting {
                self.prompt();
            }
        }
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<InputEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("appforge-stdin".to_string())
        .spawn(move || read_input(io::stdin().lock(), &tx))?;
    Ok(())
}

/// Turns input lines into events; always ends with `Quit` unless the host hung up.
fn read_input(reader: impl BufRead, tx: &mpsc::Sender<InputEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                engine_warn!("Skipping input line that is not UTF-8: {}", err);
                continue;
            }
            Err(err) => {
                engine_warn!("Stopped reading input: {}", err);
                break;
            }
        };
        let event = if line.trim() == QUIT_COMMAND {
            InputEvent::Quit
        } else {
            InputEvent::Line(line)
        };
        if tx.send(event).is_err() {
            return;
        }
    }
    let _ = tx.send(InputEvent::Quit);
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use appforge_engine::EngineConfig;
    use tempfile::TempDir;

    use super::*;

    fn host(root: &std::path::Path) -> Host<Vec<u8>> {
        let config = EngineConfig {
            probe_page: false,
            bundle: false,
            ..EngineConfig::default_with_output(root)
        };
        Host::new(EffectRunner::new(config).unwrap(), Vec::new())
    }

    fn output(host: &Host<Vec<u8>>) -> String {
        String::from_utf8(host.out.clone()).unwrap()
    }

    fn queued(events: Vec<InputEvent>) -> mpsc::Receiver<InputEvent> {
        let (tx, rx) = mpsc::channel();
        for event in events {
            tx.send(event).unwrap();
        }
        rx
    }

    #[test]
    fn one_shot_success_writes_scaffold_and_history() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());

        assert!(host.run_once("https://example.com".to_string()));

        let output = output(&host);
        assert!(output.contains("[Converting...] Converting webpage to app..."));
        assert!(output.contains("App scaffold created at:"));
        assert!(temp.path().join("example-com-app/src-tauri/tauri.conf.json").is_file());

        let history = history::load_history(temp.path());
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].url, "https://example.com");
        assert!(history[0].succeeded);
    }

    #[test]
    fn one_shot_failure_reports_error() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());

        assert!(!host.run_once("ftp://example.com".to_string()));
    }

    #[test]
    fn one_shot_rejects_relative_url_without_engine_call() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());

        assert!(!host.run_once("example.com".to_string()));
        assert!(history::load_history(temp.path()).is_empty());
    }

    #[test]
    fn resubmission_does_not_redraw_previous_result() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());
        assert!(!host.run_once("ftp://example.com".to_string()));
        host.out.clear();

        assert!(host.run_once("https://example.com".to_string()));

        let output = output(&host);
        assert!(output.starts_with("[Converting...] Converting webpage to app..."));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn quit_waits_for_in_flight_conversion() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());

        host.run_interactive(queued(vec![
            InputEvent::Line("https://example.com".to_string()),
            InputEvent::Quit,
        ]));

        assert!(!host.state.is_converting());
        assert!(output(&host).contains("App scaffold created at:"));
        assert!(temp.path().join("example-com-app/src-tauri/tauri.conf.json").is_file());
        assert_eq!(history::load_history(temp.path()).len(), 1);
    }

    #[test]
    fn closed_input_waits_for_in_flight_conversion() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());

        host.run_interactive(queued(vec![InputEvent::Line(
            "https://example.com".to_string(),
        )]));

        assert!(!host.state.is_converting());
        assert_eq!(history::load_history(temp.path()).len(), 1);
    }

    #[test]
    fn line_sent_while_busy_is_dropped() {
        let temp = TempDir::new().unwrap();
        let mut host = host(temp.path());

        host.run_interactive(queued(vec![
            InputEvent::Line("https://example.com".to_string()),
            InputEvent::Line("https://example.org".to_string()),
            InputEvent::Quit,
        ]));

        assert!(output(&host).contains("A conversion is already in progress."));
        let history = history::load_history(temp.path());
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].url, "https://example.com");
        assert!(!temp.path().join("example-org-app").exists());
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let (tx, rx) = mpsc::channel();
        read_input(
            Cursor::new(b"https://a.example\n\xff\xfe\nhttps://b.example\n".to_vec()),
            &tx,
        );

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], InputEvent::Line(l) if l == "https://a.example"));
        assert!(matches!(&events[1], InputEvent::Line(l) if l == "https://b.example"));
        assert!(matches!(events[2], InputEvent::Quit));
    }

    #[test]
    fn quit_command_is_recognised() {
        let (tx, rx) = mpsc::channel();
        read_input(Cursor::new(b" :q \n".to_vec()), &tx);

        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(events.as_slice(), [InputEvent::Quit, InputEvent::Quit]));
    }
}
