//! Command dispatch

use std::io::{self, Write};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{IngestStats, TallyService};
use crate::cli::args::{Cli, Commands, ConfigCommands, TallyArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{Date, NoSeparatorPolicy, TreeDisplay};
use crate::infrastructure::{InfraError, RealFileSystem};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Count { tally, summary }) => cmd_count(cli, tally, *summary),
        Some(Commands::Tree { tally }) => cmd_tree(cli, tally),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn parse_date(label: &str, text: &str) -> CliResult<Date> {
    text.parse()
        .map_err(|e| CliError::InvalidArgs(format!("{}: {}", label, e)))
}

/// Settings after config file, environment and command line flags.
fn effective_settings(cli: &Cli, tally: &TallyArgs) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(separator) = tally.separator {
        settings.separator = separator;
    }
    if tally.whole_hostname {
        settings.no_separator = NoSeparatorPolicy::WholeHostname;
    }
    debug!("effective settings: {:?}", settings);
    Ok(settings)
}

/// Build a tally and feed it every input, stdin when no files are given.
#[instrument(level = "debug", skip(settings))]
fn run_tally(tally: &TallyArgs, settings: &Settings) -> CliResult<(TallyService, IngestStats)> {
    let begin = parse_date("begin", &tally.begin)?;
    let end = parse_date("end", &tally.end)?;
    let mut service = TallyService::new(
        Arc::new(RealFileSystem),
        begin,
        end,
        settings.extractor(),
    )?;

    let mut stats = IngestStats::default();
    if tally.files.is_empty() {
        stats += service.ingest(io::stdin().lock(), "<stdin>")?;
    } else {
        for path in &tally.files {
            stats += service.ingest_path(path)?;
        }
    }
    if stats.malformed > 0 {
        output::warning(&format!("skipped {} malformed line(s)", stats.malformed));
    }
    Ok((service, stats))
}

#[instrument(level = "debug", skip(cli))]
fn cmd_count(cli: &Cli, tally: &TallyArgs, summary: bool) -> CliResult<()> {
    let settings = effective_settings(cli, tally)?;
    let (service, stats) = run_tally(tally, &settings)?;
    let report = service.report();

    let mut out = io::stdout().lock();
    write!(out, "{}", report).map_err(|e| InfraError::io("write report", e))?;
    out.flush().map_err(|e| InfraError::io("write report", e))?;

    if summary || settings.summary {
        output::header("summary");
        output::detail("lines", &stats.lines);
        output::detail("accepted", &stats.accepted);
        output::detail("out of range", &stats.out_of_range);
        output::detail("malformed", &stats.malformed);
        output::detail("distinct", &service.tree().len());
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_tree(cli: &Cli, tally: &TallyArgs) -> CliResult<()> {
    let settings = effective_settings(cli, tally)?;
    let (service, _) = run_tally(tally, &settings)?;
    let tree = service.tree();

    let mut out = io::stdout().lock();
    write!(out, "{}", tree.to_tree_string()).map_err(|e| InfraError::io("write tree", e))?;
    writeln!(
        out,
        "height: {}, distinct: {}, accepted: {}",
        tree.height(),
        tree.len(),
        tree.count()
    )
    .map_err(|e| InfraError::io("write tree", e))?;

    let released = service.into_tree().destroy();
    debug!("released {} nodes", released);
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let text = match command {
        ConfigCommands::Show => Settings::load(cli.config.as_deref())?.to_toml()?,
        ConfigCommands::Template => Settings::template(),
    };
    let mut out = io::stdout().lock();
    write!(out, "{}", text).map_err(|e| InfraError::io("write config", e))?;
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
