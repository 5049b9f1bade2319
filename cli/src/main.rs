//! Tally CLI - plays a level counter flip sequence in the terminal.
//!
//! # Architecture
//!
//! ```text
//! main() -> init_tracing() -> TallyConfig -> LocalSet::run_until(play())
//!                                                   |
//!                                                   v
//!                         flip_through(LocalDelay) + frame loop until settled
//! ```
//!
//! Every flip is a deferred sequencer whose trigger is fired by the delay service.
//! The frame loop only advances the flip effect and redraws the face; it never
//! drives the sequence itself.

use anyhow::{Context, Result, bail};
use std::{
    cell::RefCell,
    env,
    fs::{self, OpenOptions},
    io::{self, Write, stdout},
    ops::RangeInclusive,
    path::{Path, PathBuf},
    rc::Rc,
    sync::Mutex,
    time::Duration,
};
use tokio::{
    task::LocalSet,
    time::{self, Instant, MissedTickBehavior},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tally_config::{AnimationConfig, TallyConfig, config_path};
use tally_engine::{
    CounterFace, FlipTiming, LocalDelay, MAX_LEVEL, MIN_LEVEL, Outcome, flip_through,
    steps_between,
};

const FRAME_DURATION: Duration = Duration::from_millis(16);

const USAGE: &str = "usage: tally [FROM] [TO]\n\nFlips a level counter from FROM to TO one level at a time.\nDefaults: FROM=1, TO=10.";

/// Log to a file so the counter owns the terminal. With no writable log path,
/// events are filtered but go nowhere.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut unavailable = Vec::new();
    let opened = log_paths().find_map(|path| match open_log(&path) {
        Ok(file) => Some((path, file)),
        Err(err) => {
            unavailable.push(format!("{}: {err}", path.display()));
            None
        }
    });

    let Some((path, file)) = opened else {
        tracing_subscriber::registry().with(filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(filter)
        .init();
    tracing::info!(path = %path.display(), "Logging initialized");
    for skipped in unavailable {
        tracing::warn!(%skipped, "Log path unavailable");
    }
}

/// `logs/tally.log` beside the config file, then under `./.tally`.
fn log_paths() -> impl Iterator<Item = PathBuf> {
    let beside_config = config_path().and_then(|path| path.parent().map(Path::to_path_buf));
    beside_config
        .into_iter()
        .chain([PathBuf::from(".tally")])
        .map(|dir| dir.join("logs").join("tally.log"))
}

fn open_log(path: &Path) -> io::Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play { from: i64, to: i64 },
    Help,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            _ => positional.push(arg),
        }
    }

    let parse = |raw: &str, name: &str| -> Result<i64> {
        raw.trim()
            .parse::<i64>()
            .with_context(|| format!("{name} must be a whole number, got {raw:?}"))
    };

    match positional.as_slice() {
        [] => Ok(Command::Play {
            from: MIN_LEVEL,
            to: MAX_LEVEL,
        }),
        [to] => Ok(Command::Play {
            from: MIN_LEVEL,
            to: parse(to.as_str(), "TO")?,
        }),
        [from, to] => Ok(Command::Play {
            from: parse(from.as_str(), "FROM")?,
            to: parse(to.as_str(), "TO")?,
        }),
        _ => bail!("too many arguments\n\n{USAGE}"),
    }
}

fn load_animation() -> AnimationConfig {
    match TallyConfig::load() {
        Ok(config) => config.unwrap_or_default().animation(),
        Err(err) => {
            eprintln!("Ignoring config {}: {err}", err.path().display());
            TallyConfig::default().animation()
        }
    }
}

/// Targets beyond the face stop one step past its bounds; the sequence rejects
/// there anyway.
fn clamp_target(range: &RangeInclusive<i64>, to: i64) -> i64 {
    to.clamp(
        range.start().saturating_sub(1),
        range.end().saturating_add(1),
    )
}

async fn play(set: Rc<LocalSet>, from: i64, to: i64, timing: FlipTiming) -> Result<Outcome> {
    let face = CounterFace::level(from).context("FROM is not a valid level")?;
    let to = clamp_target(&face.range(), to);
    let face = Rc::new(RefCell::new(face));
    let delay = LocalDelay::new(set);

    let sequence = flip_through(&delay, &face, steps_between(from, to), timing);
    let landed = Rc::clone(&face);
    sequence
        .on_failure_then(move || {
            tracing::warn!(stopped_at = landed.borrow().value(), "Flip sequence rejected");
        })
        .on_complete_then(|| tracing::info!("Flip sequence complete"));

    let mut out = stdout();
    let mut frames = time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        frames.tick().await;

        let now = Instant::now();
        face.borrow_mut().advance(now - last);
        last = now;

        write!(out, "\r{}", face.borrow())?;
        out.flush()?;

        if let Some(outcome) = sequence.outcome() {
            writeln!(out)?;
            return Ok(outcome);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let (from, to) = match parse_args(env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Play { from, to } => (from, to),
    };

    let animation = load_animation();
    tracing::debug!(?animation, from, to, "Starting flip sequence");

    let set = Rc::new(LocalSet::new());
    let outcome = set
        .run_until(play(Rc::clone(&set), from, to, animation.into()))
        .await?;

    match outcome {
        Outcome::Completed { .. } => Ok(()),
        Outcome::Rejected { .. } => bail!("level {to} is outside {MIN_LEVEL}..={MAX_LEVEL}"),
    }
}
