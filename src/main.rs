use anyhow::Context;
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use textcycle::{Config, RealtimeScheduler, TargetId, TerminalSink, TextCycler, TextCyclerOptions, ViewportTracker};
use tracing_subscriber::EnvFilter;

const TARGET: TargetId = TargetId(0);

/// Type, pause, delete and retype texts on the current terminal line.
#[derive(Parser)]
#[command(author, version, about = "Type and delete texts on the terminal", long_about = None)]
struct Cli {
    /// The texts to cycle through. Standard input is used when none are given.
    texts: Vec<String>,

    /// The path to the configuration file.
    #[clap(short, long, env = "TEXTCYCLE_CONFIG")]
    config: Option<PathBuf>,

    /// Start over after the last text.
    #[clap(short, long = "loop", conflicts_with = "no_loop")]
    loop_texts: bool,

    /// Stop after the last text, even if the configuration loops.
    #[clap(long)]
    no_loop: bool,

    /// Delay between typed characters, in milliseconds.
    #[clap(long)]
    typing_speed: Option<u64>,

    /// Delay between deleted characters, in milliseconds.
    #[clap(long)]
    deleting_speed: Option<u64>,

    /// How long a typed text stays before being deleted, in milliseconds.
    #[clap(long)]
    pause: Option<u64>,

    /// Delay before the first character, in milliseconds.
    #[clap(long)]
    initial_delay: Option<u64>,

    /// The cursor glyph.
    #[clap(long)]
    cursor: Option<String>,
}

impl Cli {
    fn options(self, config: Config) -> TextCyclerOptions {
        let mut options = config.typing;
        if !self.texts.is_empty() {
            options.texts = Some(self.texts);
        }
        if self.loop_texts {
            options.loop_texts = true;
        } else if self.no_loop {
            options.loop_texts = false;
        }
        options.typing_speed = self.typing_speed.unwrap_or(options.typing_speed);
        options.deleting_speed = self.deleting_speed.unwrap_or(options.deleting_speed);
        options.pause_duration = self.pause.unwrap_or(options.pause_duration);
        options.initial_delay = self.initial_delay.unwrap_or(options.initial_delay);
        if let Some(cursor) = self.cursor {
            options.cursor_character = cursor;
        }
        options
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TEXTCYCLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_stdin() -> anyhow::Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut contents = String::new();
    stdin.lock().read_to_string(&mut contents).context("reading stdin")?;
    Ok(single_line(&contents))
}

/// Join the non blank lines of `contents` with spaces, since the terminal sink only redraws one line.
fn single_line(contents: &str) -> String {
    contents.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join(" ")
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let options = cli.options(config);
    let initial = match options.texts {
        Some(_) => String::new(),
        None => read_stdin()?,
    };

    let scheduler = Rc::new(RealtimeScheduler::new());
    let viewport = ViewportTracker::new();
    let sink = TerminalSink::new(io::stdout(), initial);
    let cycler = TextCycler::new(TARGET, options, sink, scheduler.clone(), &viewport).context("invalid options")?;

    // The terminal line is always on screen.
    viewport.report(TARGET, 1.0);
    while let Some(wait) = scheduler.time_until_next() {
        thread::sleep(wait);
        scheduler.run_due();
    }
    drop(cycler);
    println!();
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
