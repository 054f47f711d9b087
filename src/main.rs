use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use draftzero::config::{validate_config, SessionConfig};
use draftzero::gateway::{FixedPrompt, FsGateway, PersistenceGateway, TerminalPrompt};
use draftzero::memory::{InMemoryPathMemory, JsonPathMemory, PathMemory, PATH_MEMORY_KEY};
use draftzero::model::{DisplayState, Mode, RawInput};
use draftzero::replay;
use draftzero::session::{Session, SessionEvent};
use draftzero::status::{filename, word_count, StatusLine};

#[derive(Debug, Args, Clone)]
struct SessionArgs {
    /// Document to write to. Skips the save-location prompt when nothing is remembered.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Start with corrections allowed (backspace, delete and cut work).
    #[arg(long)]
    corrections: bool,

    /// Seconds between periodic saves.
    #[arg(long, default_value_t = 10)]
    save_interval: u64,

    /// Accepted edits that trigger an immediate save.
    #[arg(long, default_value_t = 5)]
    keystrokes: u32,

    /// Milliseconds the "Saved" confirmation stays visible.
    #[arg(long, default_value_t = 2000)]
    confirm_ms: u64,
}

impl SessionArgs {
    fn to_config(&self) -> SessionConfig {
        SessionConfig {
            save_interval: Duration::from_secs(self.save_interval),
            keystroke_threshold: self.keystrokes,
            confirm_window: Duration::from_millis(self.confirm_ms),
            ..Default::default()
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "draftzero")]
#[command(about = "Forward-only writing with autosave", long_about = None)]
struct Cli {
    /// Path memory file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    memory: Option<PathBuf>,

    /// Do not remember the document path across runs
    #[arg(long, global = true)]
    no_remember: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write from the terminal, one line at a time.
    ///
    /// Lines starting with ':' are commands: `:q` quits, `:bs` sends a backspace,
    /// `:corrections on|off` switches modes.
    Write {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Feed a replay script (JSON) into a session
    Replay {
        /// Replay script file
        #[arg(long, value_name = "PATH")]
        script: PathBuf,

        /// Print the final document to stdout
        #[arg(long)]
        print: bool,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show the remembered document
    Status,

    /// Forget the remembered document path
    Forget,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn open_memory(cli: &Cli) -> Result<Box<dyn PathMemory>> {
    if cli.no_remember {
        return Ok(Box::new(InMemoryPathMemory::new()));
    }
    let location = match &cli.memory {
        Some(path) => path.clone(),
        None => JsonPathMemory::default_location()
            .ok_or_else(|| anyhow!("could not determine a config directory; pass --memory"))?,
    };
    Ok(Box::new(JsonPathMemory::new(location)))
}

fn open_gateway(args: &SessionArgs) -> Arc<dyn PersistenceGateway> {
    match &args.file {
        Some(path) => Arc::new(FsGateway::new(FixedPrompt(Some(path.clone())))),
        None => Arc::new(FsGateway::new(TerminalPrompt)),
    }
}

fn print_status(line: &StatusLine) {
    eprintln!("{line}");
}

/// Initialize, offering a manual retry while no file is chosen.
async fn open_session(session: &mut Session, retry: bool) -> Result<bool> {
    let mut state = session.initialize().await;
    while state == DisplayState::NoFile {
        print_status(&session.status_line(tokio::time::Instant::now()));
        if !retry || !confirm("Try again? [y/N] ").await? {
            return Ok(false);
        }
        state = session.restart().await;
    }
    Ok(true)
}

async fn confirm(question: &'static str) -> Result<bool> {
    let line = tokio::task::spawn_blocking(move || -> io::Result<String> {
        eprint!("{question}");
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    })
    .await
    .context("confirmation prompt task failed")?
    .context("failed to read stdin")?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn parse_line(line: &str) -> Vec<SessionEvent> {
    match line.trim_end() {
        ":q" => vec![SessionEvent::Stop],
        ":bs" => vec![SessionEvent::Input(RawInput::key("Backspace"))],
        ":corrections on" => vec![SessionEvent::SetMode(Mode::CorrectionsAllowed)],
        ":corrections off" => vec![SessionEvent::SetMode(Mode::ForwardOnly)],
        _ => {
            let mut events: Vec<SessionEvent> = line
                .chars()
                .map(|c| SessionEvent::Input(RawInput::key(c.to_string())))
                .collect();
            events.push(SessionEvent::Input(RawInput::key("Enter")));
            events
        }
    }
}

fn install_stop_handler(events: mpsc::Sender<SessionEvent>) -> Result<()> {
    ctrlc::set_handler(move || {
        let _ = events.try_send(SessionEvent::Stop);
    })
    .context("failed to install Ctrl+C handler")
}

async fn run_write(args: SessionArgs, memory: Box<dyn PathMemory>) -> Result<()> {
    let config = args.to_config();
    validate_config(&config)?;

    let mut session = Session::new(open_gateway(&args), memory, config);
    session.set_mode(Mode::from_corrections(args.corrections));
    if !open_session(&mut session, args.file.is_none()).await? {
        return Ok(());
    }

    let (tx, rx) = mpsc::channel(1024);
    install_stop_handler(tx.clone())?;

    // Blocking stdin reader; the session task owns everything else.
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for event in parse_line(&line) {
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
        }
        let _ = tx.blocking_send(SessionEvent::Stop);
    });

    let mut sink = print_status;
    session.run(rx, &mut sink).await;
    Ok(())
}

async fn run_replay(
    script_path: PathBuf,
    print: bool,
    args: SessionArgs,
    memory: Box<dyn PathMemory>,
) -> Result<()> {
    let config = args.to_config();
    validate_config(&config)?;
    let script = replay::load_script(&script_path)?;

    let stats = replay::stats(&script);
    eprintln!(
        "Replaying: {} actions, {} input events, ~{:.1}s",
        stats.actions,
        stats.events,
        (stats.total_wait_ms as f64) / 1000.0
    );

    let mut session = Session::new(open_gateway(&args), memory, config);
    session.set_mode(Mode::from_corrections(args.corrections));
    if !open_session(&mut session, false).await? {
        return Err(anyhow!("no save location chosen"));
    }

    let (tx, rx) = mpsc::channel(1024);
    install_stop_handler(tx.clone())?;
    let feeder = replay::spawn_feeder(script, tx);

    let mut sink = print_status;
    session.run(rx, &mut sink).await;
    feeder.abort();

    if print {
        print!("{}", session.text());
    }
    Ok(())
}

fn show_status(memory: &dyn PathMemory) -> Result<()> {
    let Some(path) = memory
        .get(PATH_MEMORY_KEY)
        .context("failed to read path memory")?
    else {
        println!("No remembered document.");
        return Ok(());
    };

    println!("{}", path.display());
    match fs::read_to_string(&path) {
        Ok(text) => println!(
            "{} · {} words",
            filename(Some(&path)),
            word_count(&text)
        ),
        Err(err) => println!("{} · unreadable ({err})", filename(Some(&path))),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut memory = open_memory(&cli)?;

    match cli.command {
        Command::Write { session } => run_write(session, memory).await?,
        Command::Replay {
            script,
            print,
            session,
        } => run_replay(script, print, session, memory).await?,
        Command::Status => show_status(&*memory)?,
        Command::Forget => {
            memory
                .clear(PATH_MEMORY_KEY)
                .context("failed to clear path memory")?;
            eprintln!("Forgot the remembered document.");
        }
    }

    Ok(())
}
