//! prog-run - check, run and schedule a prog from a source file
//!
//! Usage:
//!
//! ```text
//! prog-run check double.prog --returns number --param "number x"
//! prog-run run double.prog --returns number --param "number x" --arg 21
//! prog-run schedule tick.prog --every "every 2 hours" --until-hours 12
//! ```

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use prog_functions::core_library;
use prog_run::{CliError, ConsoleHost, ProgSpec, json_to_native, load_prog, native_to_json, parse_parameter};
use prog_runtime::{
    Engine, EngineConfig, GameCalendar, GameClock, IncidentLog, RecurringInterval, RuntimeError,
    Scheduler,
};
use prog_types::{CalendarTime, NativeValue, TypeDescriptor};

#[derive(Parser, Debug)]
#[command(name = "prog-run")]
#[command(about = "Compile, run and schedule prog scripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a prog and report the first error
    Check(ProgArgs),

    /// Compile and execute a prog, printing its result as JSON
    Run {
        #[command(flatten)]
        prog: ProgArgs,

        /// Argument as JSON, in parameter order (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,
    },

    /// Run a prog on a recurring game-calendar interval
    Schedule {
        #[command(flatten)]
        prog: ProgArgs,

        /// Interval, e.g. "every 2 hours"
        #[arg(long)]
        every: String,

        /// How many in-world hours to simulate
        #[arg(long, default_value = "24")]
        until_hours: i64,

        /// Calendar unit lengths as JSON
        #[arg(long)]
        calendar: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ProgArgs {
    /// Path to the prog source
    file: PathBuf,

    /// Declared return type
    #[arg(long, default_value = "void")]
    returns: String,

    /// Declared parameter as "<type> <name>" (repeatable)
    #[arg(long = "param")]
    params: Vec<String>,

    /// Prog name (defaults to the file stem)
    #[arg(long)]
    name: Option<String>,

    /// Cache the first result for every later call
    #[arg(long = "static")]
    fully_static: bool,

    /// Engine configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ProgArgs {
    fn spec(&self) -> Result<ProgSpec, CliError> {
        let name = self.name.clone().unwrap_or_else(|| {
            self.file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "prog".to_string())
        });
        let parameters = self
            .params
            .iter()
            .map(|p| parse_parameter(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProgSpec {
            name,
            return_type: TypeDescriptor::parse(&self.returns)?,
            parameters,
            fully_static: self.fully_static,
        })
    }

    fn engine(&self) -> Result<Engine, CliError> {
        let config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        Ok(Engine::with_config(core_library(), config))
    }
}

fn main() {
    prog_run::init_logging();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Check(prog) => check(&prog),
        Command::Run { prog, args } => run(&prog, &args),
        Command::Schedule {
            prog,
            every,
            until_hours,
            calendar,
        } => schedule(&prog, &every, until_hours, calendar.as_deref()),
    };

    if let Err(e) = outcome {
        match &e {
            CliError::Runtime(RuntimeError::Compile { error, .. }) => {
                error!("line {}: {}", error.line, error.message);
            }
            other => error!("{}", other),
        }
        process::exit(1);
    }
}

fn check(args: &ProgArgs) -> Result<(), CliError> {
    let spec = args.spec()?;
    let mut engine = args.engine()?;
    load_prog(&mut engine, &args.file, &spec)?;
    info!("{} compiled without errors", args.file.display());
    Ok(())
}

fn run(args: &ProgArgs, json_args: &[String]) -> Result<(), CliError> {
    let spec = args.spec()?;
    let log = IncidentLog::new();
    let mut engine = args.engine()?.with_notifier(log.clone());
    let id = load_prog(&mut engine, &args.file, &spec)?;

    let natives = json_args
        .iter()
        .map(|text| serde_json::from_str(text).map(|json| json_to_native(&json)))
        .collect::<Result<Vec<NativeValue>, _>>()?;

    let mut host = ConsoleHost::new(CalendarTime::EPOCH);
    let result = engine.execute(&mut host, id, &natives);
    for incident in log.incidents() {
        error!(kind = %incident.kind, arguments = ?incident.arguments, "{}", incident.message);
    }
    println!("{}", native_to_json(&result));
    Ok(())
}

fn schedule(args: &ProgArgs, every: &str, until_hours: i64, calendar: Option<&Path>) -> Result<(), CliError> {
    let spec = args.spec()?;
    let mut engine = args.engine()?;
    let id = load_prog(&mut engine, &args.file, &spec)?;

    let calendar = match calendar {
        Some(path) => GameCalendar::from_json_file(path)?,
        None => GameCalendar::default(),
    };
    let hour = calendar.unit_length(prog_runtime::IntervalUnit::Hour);
    let until = CalendarTime::EPOCH + hour.scale(until_hours as f64);
    let mut clock = GameClock::new(calendar, CalendarTime::EPOCH);

    let interval = RecurringInterval::parse(every)?;
    let mut scheduler = Scheduler::new();
    scheduler.schedule(&mut clock, spec.name.clone(), id, interval, CalendarTime::EPOCH)?;

    let mut host = ConsoleHost::new(CalendarTime::EPOCH);
    let firings = scheduler.run_until(&mut clock, &mut engine, &mut host, until)?;
    for firing in &firings {
        println!("{} fired at {}", spec.name, firing.at);
    }
    info!(firings = firings.len(), "schedule finished");
    Ok(())
}
