use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use freshmath_shared::controller::PracticeTestType;
use freshmath_shared::{Difficulty, DifficultyMix, TopicCategory};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

/// A topic as typed on the command line: `NAME` or `NAME|Intro`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicArg {
    pub name: String,
    pub category: Option<TopicCategory>,
}

impl std::str::FromStr for TopicArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, category) = match s.split_once('|') {
            Some((name, cat)) => (name, Some(cat.parse::<TopicCategory>().map_err(|e| anyhow!(e))?)),
            None => (s, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("topic name cannot be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            category,
        })
    }
}

/// One custom worksheet row: `UNIT:TOPIC[|CATEGORY][:DIFFICULTY[:COUNT]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecArg {
    pub unit: String,
    pub topic: TopicArg,
    pub difficulty: Option<Difficulty>,
    pub count: Option<String>,
}

impl std::str::FromStr for SpecArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let unit = parts.next().map(str::trim).unwrap_or_default();
        let topic = parts
            .next()
            .ok_or_else(|| anyhow!("expected UNIT:TOPIC[:DIFFICULTY[:COUNT]], got: {s}"))?;
        if unit.is_empty() {
            return Err(anyhow!("missing unit in spec: {s}"));
        }
        let difficulty = parts
            .next()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<Difficulty>().map_err(|e| anyhow!(e)))
            .transpose()?;
        let count = parts.next().map(|raw| raw.trim().to_string());
        if parts.next().is_some() {
            return Err(anyhow!("too many ':' separated fields in spec: {s}"));
        }

        Ok(Self {
            unit: unit.to_string(),
            topic: topic.parse()?,
            difficulty,
            count,
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "freshmath",
    version,
    about = "Fresh Math worksheet generator client and contact relay",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "rcfile", global = true)]
    pub rcfile: Option<PathBuf>,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List catalog units, or the topics of one unit.
    Topics { unit: Option<String> },
    /// Ask the backend to generate a worksheet or test.
    Generate(GenerateArgs),
    /// Contact form relay.
    #[command(subcommand)]
    Relay(RelayCommand),
    /// Print the effective configuration.
    Show,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Download the generated file here instead of only printing its URL.
    #[arg(long = "save", global = true)]
    pub save: Option<PathBuf>,

    #[command(subcommand)]
    pub kind: GenerateCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GenerateCommand {
    Standard {
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<TopicArg>()))]
        topic: Option<TopicArg>,
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
        #[arg(long = "problems")]
        problems: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
    },
    Practice {
        #[arg(value_enum)]
        test_type: PracticeKind,
        /// Repeat for cumulative tests.
        #[arg(long = "unit", action = ArgAction::Append)]
        units: Vec<String>,
        #[arg(long, value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<TopicArg>()))]
        topic: Option<TopicArg>,
        #[arg(long = "mix", default_value = "balanced")]
        mix: DifficultyMix,
        #[arg(long = "problems")]
        problems: Option<String>,
        #[arg(long = "per-level")]
        per_level: Option<String>,
    },
    Custom {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(
            long = "spec",
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<SpecArg>()),
            action = ArgAction::Append
        )]
        specs: Vec<SpecArg>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeKind {
    Unit,
    Cumulative,
    Spiral,
}

impl From<PracticeKind> for PracticeTestType {
    fn from(kind: PracticeKind) -> Self {
        match kind {
            PracticeKind::Unit => PracticeTestType::Unit,
            PracticeKind::Cumulative => PracticeTestType::Cumulative,
            PracticeKind::Spiral => PracticeTestType::Spiral,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RelayCommand {
    /// Process one submission read from FILE, or stdin when FILE is `-` or absent.
    Submit { file: Option<PathBuf> },
    /// Health probe.
    Status,
    /// Print stored submissions.
    List,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` overrides out of argv.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest
                .split_once('=')
                .or_else(|| rest.split_once(':'))
                .map(|(k, v)| (format!("rc.{k}"), v.to_string()));

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}
