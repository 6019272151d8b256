use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use sysqual::action::{ActionData, ActionKind, QualFlags};
use sysqual::call::SyscallStop;
use sysqual::cli::{Cli, OutputFormat};
use sysqual::config::FilterConfig;
use sysqual::engine::{EngineSummary, FilterEngine};
use sysqual::selector::string_to_uint;
use sysqual::syscalls::Personalities;
use sysqual::QualifyError;
use tracing_subscriber::EnvFilter;

/// Exit status for configuration (usage) errors
const EXIT_USAGE: u8 = 2;

/// Initialize tracing subscriber.
///
/// `--debug` forces TRACE; otherwise `RUST_LOG` applies, defaulting to WARN.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Actions fired for one simulated syscall
#[derive(Debug, Serialize)]
struct CheckResult {
    syscall: String,
    number: u64,
    fired: Vec<Fired>,
    qual: QualFlags,
}

#[derive(Debug, Serialize)]
struct Fired {
    action: ActionKind,
    data: ActionData,
}

#[derive(Debug, Serialize)]
struct Report {
    #[serde(flatten)]
    summary: EngineSummary,
    checks: Vec<CheckResult>,
}

fn flag_names(flags: QualFlags) -> String {
    let names: Vec<&str> = flags.iter_names().map(|(name, _)| name).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join("|")
    }
}

/// Resolve a `--check` argument on the native personality
fn resolve_check(engine: &FilterEngine, syscall: &str) -> Result<(String, u64)> {
    let table = engine
        .personalities()
        .get(0)
        .context("no native personality")?;
    if let Some(number) = string_to_uint(syscall) {
        let name = table
            .name_of(number)
            .map_or_else(|| format!("syscall_{number}"), str::to_string);
        return Ok((name, u64::from(number)));
    }
    let number = table
        .number_of(syscall)
        .with_context(|| format!("unknown syscall '{}' for --check", syscall))?;
    Ok((syscall.to_string(), u64::from(number)))
}

fn run_checks(engine: &mut FilterEngine, args: &Cli) -> Result<Vec<CheckResult>> {
    let mut results = Vec::with_capacity(args.check.len());
    for syscall in &args.check {
        let (name, number) = resolve_check(engine, syscall)?;
        let mut call = SyscallStop::new(0, number);
        if let Some(fd) = args.fd {
            call.args[0] = fd as i64 as u64;
        }
        if let Some(path) = &args.with_path {
            call = call.with_path(path.clone());
        }

        let mut fired = Vec::new();
        engine.filter_syscall(
            &mut call,
            &mut |_: &mut SyscallStop, action: ActionKind, data: &ActionData| {
                fired.push(Fired {
                    action,
                    data: *data,
                })
            },
        );
        results.push(CheckResult {
            syscall: name,
            number,
            fired,
            qual: call.qual,
        });
    }
    Ok(results)
}

fn print_text(report: &Report) {
    println!("default actions: {}", flag_names(report.summary.default_flags));
    for action in &report.summary.actions {
        println!(
            "#{} {} (priority {}): {} [{}]",
            action.id,
            action.action,
            action.priority,
            action.expression,
            action.filters.join(", ")
        );
        if let Some(opts) = action.data.inject_opts() {
            println!(
                "    first={} step={} result={:?} signal={}",
                opts.first, opts.step, opts.result, opts.signal
            );
        }
    }
    for check in &report.checks {
        let fired: Vec<&str> = check.fired.iter().map(|f| f.action.name()).collect();
        println!(
            "{} ({}): fired [{}], flags {}",
            check.syscall,
            check.number,
            fired.join(", "),
            flag_names(check.qual)
        );
    }
}

fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => FilterConfig::from_file(path)?,
        None => FilterConfig::default(),
    };
    config.extend(&args.expressions, &args.paths);

    let mut engine = config.build(Personalities::native())?;
    let checks = run_checks(&mut engine, &args)?;
    let report = Report {
        summary: engine.summary(),
        checks,
    };

    match args.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Cli::parse();

    // Initialize tracing; --debug raises the level to TRACE
    init_tracing(args.debug);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        // Qualifier errors already quote their cause
        Err(err) => match err.downcast_ref::<QualifyError>() {
            Some(qualify_err) => {
                eprintln!("sysqual: {}", qualify_err);
                ExitCode::from(EXIT_USAGE)
            }
            None => {
                eprintln!("sysqual: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
