mod commands;
mod player;

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Instant;

use trackmarker_core::config::Config;
use trackmarker_core::{
    action_queue, Action, ActionSender, Engine, EngineEvent, EngineView, Severity, SharedView,
    ViewPlayback,
};

use commands::{parse_line, to_action, Command, ParseError, HELP};
use player::RodioBackend;

fn init_logging(verbose: bool) {
    use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trackmarker")
        .join("trackmarker.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    if let Ok(log_file) = File::create(&log_path) {
        let _ = WriteLogger::init(level, LogConfig::default(), log_file);
    }

    log::info!("trackmarker starting (log level: {:?})", level);
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let config = Config::load();

    let backend = match RodioBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("*** cannot open audio output: {}", e);
            log::error!(target: "cli", "audio output unavailable: {}", e);
            std::process::exit(1);
        }
    };

    let (actions, queue) = action_queue();
    let (events_tx, events_rx) = mpsc::channel();
    let view = SharedView::new();
    let mut engine = Engine::new(Box::new(backend), queue, events_tx, view.clone());

    // Optional positional argument: the marker file for this run. An
    // existing file is loaded; a new one just becomes the save target.
    let markers_arg = args.iter().find(|a| !a.starts_with('-')).map(PathBuf::from);
    let marker_path = markers_arg.clone().unwrap_or_else(|| config.markers_file());
    engine.state_mut().marker_path = Some(marker_path);
    if let Some(path) = markers_arg {
        if path.exists() {
            actions.send(Action::LoadMarkers(path));
        }
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let command_thread = {
        let actions = actions.clone();
        let view = view.clone();
        let shutdown = Arc::clone(&shutdown);
        std::thread::spawn(move || command_loop(actions, view, shutdown))
    };

    run_clock_loop(&mut engine, &events_rx, &config);

    // The quit action has been processed; let the command loop see it too.
    shutdown.store(true, Ordering::Relaxed);
    if command_thread.join().is_err() {
        log::warn!(target: "cli", "command thread panicked");
    }
}

/// The clock-owning loop: polls the engine at the configured interval and
/// surfaces status messages and marker events.
fn run_clock_loop(engine: &mut Engine, events_rx: &Receiver<EngineEvent>, config: &Config) {
    let tick = config.tick_interval();
    let announce = config.announce_markers();

    loop {
        let started = Instant::now();
        let report = engine.poll();

        for status in &report.status {
            match status.severity {
                Severity::Info => println!("{}", status.message),
                Severity::Error => println!("*** {}", status.message),
            }
        }

        for event in events_rx.try_iter() {
            match event {
                EngineEvent::MarkerPassed { channel, index, timestamp } => {
                    log::debug!(target: "engine", "marker '{}' [{}] at {:.3}s", channel, index, timestamp);
                    if announce {
                        println!("marker '{}' [{}] at {:.3}s", channel, index, timestamp);
                    }
                }
                EngineEvent::PlaybackFinished { channel } => {
                    println!("track finished; recording stopped on '{}'", channel);
                }
            }
        }

        if report.quit {
            break;
        }

        let elapsed = started.elapsed();
        if elapsed < tick {
            std::thread::sleep(tick - elapsed);
        }
    }
}

/// The command thread: read a line, validate, enqueue. Display commands are
/// answered here from the shared view without touching the queue.
fn command_loop(
    actions: ActionSender<Action>,
    view: SharedView<EngineView>,
    shutdown: Arc<AtomicBool>,
) {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        print!("(trackmarker) ");
        let _ = io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // End of input behaves like quit.
                actions.send(Action::Quit);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!(target: "cli", "stdin error: {}", e);
                actions.send(Action::Quit);
                break;
            }
        }

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                println!("*** {}", e);
                continue;
            }
        };

        match command {
            Command::Show(names) => print_view(&view.read(), &names),
            Command::Help => println!("{}", HELP),
            Command::Quit => {
                actions.send(Action::Quit);
                break;
            }
            other => {
                if let Some(action) = to_action(other) {
                    actions.send(action);
                }
            }
        }
    }
}

fn print_view(view: &EngineView, filter: &[String]) {
    match &view.track {
        Some(path) => println!("track: {}", path.display()),
        None => println!("track: (none)"),
    }
    match &view.marker_file {
        Some(path) => println!("file: {}", path.display()),
        None => println!("file: (none)"),
    }
    match &view.playback {
        ViewPlayback::Playing { channel, position } => {
            println!("recording '{}' at {:.3}s", channel, position)
        }
        ViewPlayback::Stopped { position: Some(position) } => {
            println!("stopped at {:.3}s", position)
        }
        ViewPlayback::Stopped { position: None } => {}
    }

    for (name, markers) in view.store.channels() {
        if !filter.is_empty() && !filter.iter().any(|f| f == name) {
            continue;
        }
        let rendered: Vec<String> = markers.iter().map(|t| format!("{:.3}", t)).collect();
        println!("{}: [{}]", name, rendered.join(", "));
    }
    for name in filter {
        if !view.store.contains(name) {
            println!("*** unknown channel '{}'", name);
        }
    }
}
