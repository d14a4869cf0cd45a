//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::control;
use thiserror::Error;

use clustermon::collector::{Aggregator, CollectOptions, Selection};
use clustermon::core::config::Config;
use clustermon::core::errors::MonError;
use clustermon::fetcher::Fetcher;
use clustermon::fetcher::curl::CurlFetcher;
use clustermon::fetcher::fixture::FixtureFetcher;
use clustermon::format::{RenderOptions, Rendered};
use clustermon::logger::ActivityLog;
use clustermon::logger::jsonl::{EventType, JsonlConfig, LogEntry, Severity};
use clustermon::panels::layout::Layout;
use clustermon::panels::report::{catalogue_layout, describe, layout_table, panel_table};
use clustermon::panels::{ContentContext, PanelRegistry};
use clustermon::tui::terminal_guard::terminal_size;
use clustermon::tui::{DashboardSettings, run_dashboard};

/// clustermon: live multi-panel dashboard for data-grid clusters.
#[derive(Debug, Parser)]
#[command(
    name = "clustermon",
    author,
    version,
    about = "Live terminal dashboard for data-grid clusters",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity (also collects reporters in one-shot output).
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Management endpoint URL, overriding the config file.
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,
    /// Serve payloads from a directory of JSON fixtures instead of the network.
    #[arg(long, global = true, value_name = "DIR")]
    fixtures: Option<PathBuf>,
    /// Sort tables by column number (1-based) or header name.
    #[arg(long, global = true, value_name = "COLUMN")]
    sort: Option<String>,
    /// Sort in descending order.
    #[arg(long, global = true)]
    desc: bool,
    /// Show additional columns.
    #[arg(long, global = true)]
    wide: bool,
    /// Truncate wide columns to this many characters (0 disables).
    #[arg(long, global = true, value_name = "N")]
    max_width: Option<usize>,
    /// Cap one-shot output to this many rows (0 disables). Defaults to the
    /// terminal height when stdout is a terminal.
    #[arg(long, global = true, value_name = "ROWS")]
    max_height: Option<usize>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run the live dashboard.
    Monitor(MonitorArgs),
    /// Collect once and print every panel as text.
    Describe(DescribeArgs),
    /// List registered panels.
    Panels,
    /// Manage named layouts.
    Layouts(LayoutsArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct SelectionArgs {
    /// Service used by service-scoped panels.
    #[arg(long, value_name = "NAME")]
    service: Option<String>,
    /// Cache used by cache-scoped panels (requires --service).
    #[arg(long, value_name = "NAME", requires = "service")]
    cache: Option<String>,
    /// Topic used by topic-scoped panels (requires --service).
    #[arg(long, value_name = "NAME", requires = "service")]
    topic: Option<String>,
    /// Subscriber shown in topic panel titles.
    #[arg(long, value_name = "ID")]
    subscriber: Option<String>,
}

impl SelectionArgs {
    fn selection(&self) -> Selection {
        Selection {
            service: self.service.clone(),
            cache: self.cache.clone(),
            topic: self.topic.clone(),
            subscriber: self.subscriber.clone(),
        }
    }
}

#[derive(Debug, Clone, Args, Default)]
struct MonitorArgs {
    /// Layout spec or named layout (rows split by ':', panels by ',').
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<String>,
    /// Refresh interval in seconds.
    #[arg(short, long, value_name = "SECONDS")]
    refresh: Option<u64>,
    /// End the session on the first fetch failure instead of showing placeholders.
    #[arg(long)]
    strict: bool,
    /// Degrade on fetch failures even when the config asks for strict mode.
    #[arg(long, conflicts_with = "strict")]
    ignore_errors: bool,
    /// Let panels shrink to fit their content.
    #[arg(long)]
    no_padding: bool,
    /// Extra rows added to every panel.
    #[arg(long, value_name = "ROWS")]
    height_adjust: Option<usize>,
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct DescribeArgs {
    /// Only print the panels of this layout.
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<String>,
    /// Fail instead of printing partial output when any data group fails.
    #[arg(long)]
    strict: bool,
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Debug, Clone, Args)]
struct LayoutsArgs {
    #[command(subcommand)]
    command: Option<LayoutsCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum LayoutsCommand {
    /// List built-in and user layouts.
    List,
    /// Validate and store a user layout.
    Add {
        name: String,
        /// Layout spec, e.g. "members,services:caches".
        spec: String,
    },
    /// Remove a user layout.
    Remove { name: String },
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Operation partially succeeded.
    #[error("{0}")]
    Partial(String),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Partial(_) => 4,
        }
    }
}

impl From<MonError> for CliError {
    fn from(err: MonError) -> Self {
        match err {
            MonError::InvalidConfig { .. }
            | MonError::MissingConfig { .. }
            | MonError::ConfigParse { .. }
            | MonError::InvalidLayout { .. }
            | MonError::UnknownPanel { .. }
            | MonError::DuplicatePanel { .. }
            | MonError::MissingSelection { .. }
            | MonError::PanelWithoutData { .. } => Self::User(err.to_string()),
            MonError::PartialFetch { .. } => Self::Partial(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Loaded configuration and the services every command shares.
struct Session {
    config: Config,
    registry: PanelRegistry,
    options: RenderOptions,
    log: ActivityLog,
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    if let Command::Completions(args) = &cli.command {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(args.shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }

    let session = open_session(cli)?;
    match &cli.command {
        Command::Monitor(args) => run_monitor(cli, session, args),
        Command::Describe(args) => run_describe(cli, &session, args),
        Command::Panels => {
            let table = panel_table(&session.registry)
                .render(&session.options)
                .capped(session.options.max_height);
            print_rendered(&table.to_text(session.options.color), &table.warnings);
            Ok(())
        }
        Command::Layouts(args) => run_layouts(session, args),
        Command::Completions(_) => Ok(()),
    }
}

fn open_session(cli: &Cli) -> Result<Session, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.connection.url.clone_from(url);
    }

    let log = ActivityLog::open(JsonlConfig {
        path: config.paths.jsonl_log.clone(),
        ..JsonlConfig::default()
    });
    log.record(
        &LogEntry::new(EventType::ConfigLoaded, Severity::Info)
            .with_details(format!("config_hash={}", config.stable_hash()?)),
    );

    let mut registry = PanelRegistry::builtin();
    registry.add_named_layouts(&config.layouts)?;
    let options = render_options(cli, &config)?;
    Ok(Session {
        config,
        registry,
        options,
        log,
    })
}

fn render_options(cli: &Cli, config: &Config) -> Result<RenderOptions, CliError> {
    let mut options = RenderOptions::from_config(&config.output);
    options.color = options.color && !cli.no_color && io::stdout().is_terminal();
    options.wide |= cli.wide;
    options.sort_column.clone_from(&cli.sort);
    options.descending = cli.desc;
    if let Some(width) = cli.max_width {
        if width != 0 && width < 10 {
            return Err(CliError::User(format!(
                "--max-width must be 0 or >= 10, got {width}"
            )));
        }
        options.max_column_width = width;
    }
    options.max_height = match cli.max_height {
        Some(0) => None,
        Some(rows) => Some(rows),
        None => io::stdout().is_terminal().then(|| terminal_size().1),
    };
    Ok(options)
}

fn fetcher(cli: &Cli, config: &Config) -> Box<dyn Fetcher> {
    match &cli.fixtures {
        Some(dir) => Box::new(FixtureFetcher::new(dir)),
        None => Box::new(CurlFetcher::new(&config.connection)),
    }
}

fn resolve_layout(session: &Session, spec: &str) -> Result<Layout, CliError> {
    let layout = session.registry.resolve_layout(spec)?;
    let mut entry = LogEntry::new(EventType::LayoutResolved, Severity::Info)
        .with_details(format!("{} panel(s)", layout.panel_count()));
    entry.layout = Some(spec.to_string());
    session.log.record(&entry);
    Ok(layout)
}

/// Reject layouts whose panels need a selection the user did not give.
fn check_selection(session: &Session, layout: &Layout, selection: &Selection) -> Result<(), CliError> {
    for name in layout.panels() {
        if let Some(panel) = session.registry.panel(name) {
            panel.check_selection(selection)?;
        }
    }
    Ok(())
}

fn run_monitor(cli: &Cli, session: Session, args: &MonitorArgs) -> Result<(), CliError> {
    let layout_name = args
        .layout
        .clone()
        .unwrap_or_else(|| session.config.dashboard.default_layout.clone());
    let layout = resolve_layout(&session, &layout_name)?;
    let selection = args.selection.selection();
    check_selection(&session, &layout, &selection)?;

    let mut settings = DashboardSettings::from_config(&session.config, &layout_name, layout);
    if let Some(secs) = args.refresh {
        if secs == 0 {
            return Err(CliError::User("--refresh must be at least 1 second".to_string()));
        }
        settings.refresh = Duration::from_secs(secs);
    }
    if args.strict {
        settings.strict = true;
    } else if args.ignore_errors {
        settings.strict = false;
    }
    if args.no_padding {
        settings.padding = false;
    }
    if let Some(rows) = args.height_adjust {
        settings.height_adjust = rows;
    }
    settings.options = session.options.clone();
    // The dashboard owns the terminal, so colors follow the config rather
    // than whether stdout is a pipe.
    settings.options.color = session.config.output.color && !cli.no_color;

    let aggregator = Aggregator::new(
        fetcher(cli, &session.config),
        CollectOptions {
            verbose: cli.verbose,
            dashboard_active: true,
            selection,
            ..CollectOptions::default()
        },
    );
    run_dashboard(aggregator, session.registry, settings, &session.log)?;
    Ok(())
}

fn run_describe(cli: &Cli, session: &Session, args: &DescribeArgs) -> Result<(), CliError> {
    let selection = args.selection.selection();
    let layout = match &args.layout {
        Some(spec) => resolve_layout(session, spec)?,
        None => catalogue_layout(&session.registry, &selection)?,
    };
    check_selection(session, &layout, &selection)?;

    let aggregator = Aggregator::new(
        fetcher(cli, &session.config),
        CollectOptions {
            verbose: cli.verbose,
            dashboard_active: false,
            selection: selection.clone(),
            ..CollectOptions::default()
        },
    );
    let required = session.registry.required_data_groups(&layout);
    let (snapshot, errors) = aggregator.collect(&required)?;

    for err in &errors {
        eprintln!("[MON-FETCH] {err}");
        session
            .log
            .record(&LogEntry::new(EventType::FetchError, Severity::Warning).with_error(err));
    }
    if !errors.is_empty() && args.strict {
        return Err(MonError::partial(&errors).into());
    }

    let ctx = ContentContext {
        options: &session.options,
        selection: &selection,
    };
    let version = snapshot.cluster.version.split_whitespace().next().unwrap_or("?");
    let mut out = Rendered::from_lines([
        format!(
            "Cluster {} ({version}), {} member(s)",
            snapshot.cluster.cluster_name, snapshot.cluster.cluster_size
        ),
        String::new(),
    ]);
    out.append(describe(&session.registry, &layout, &snapshot, &ctx));
    let out = out.capped(session.options.max_height);
    print_rendered(&out.to_text(session.options.color), &out.warnings);
    Ok(())
}

fn run_layouts(session: Session, args: &LayoutsArgs) -> Result<(), CliError> {
    let Session {
        mut config,
        registry,
        options,
        ..
    } = session;
    match args.command.as_ref().unwrap_or(&LayoutsCommand::List) {
        LayoutsCommand::List => {
            let table = layout_table(&registry).render(&options);
            print_rendered(&table.to_text(options.color), &table.warnings);
        }
        LayoutsCommand::Add { name, spec } => {
            config.add_layout(name, spec, &PanelRegistry::builtin())?;
            config.save(&config.paths.config_file)?;
            println!("Added layout {name}: {}", spec.trim());
        }
        LayoutsCommand::Remove { name } => {
            if !config.remove_layout(name) {
                return Err(CliError::User(format!("no user layout named {name:?}")));
            }
            config.save(&config.paths.config_file)?;
            println!("Removed layout {name}");
        }
    }
    Ok(())
}

fn print_rendered(text: &str, warnings: &[String]) {
    for warning in warnings {
        eprintln!("{warning}");
    }
    if !text.is_empty() {
        println!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "clustermon",
            "--config",
            "/tmp/clustermon.toml",
            "--no-color",
            "-v",
            "--sort",
            "2",
            "--desc",
            "panels",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["clustermon", "panels", "--wide", "--max-width", "20"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_subcommands() {
        let cases = [
            vec!["clustermon", "monitor"],
            vec!["clustermon", "monitor", "-l", "members,services:caches", "-r", "10"],
            vec!["clustermon", "monitor", "--ignore-errors", "--no-padding", "--height-adjust", "2"],
            vec!["clustermon", "monitor", "--strict"],
            vec!["clustermon", "monitor", "-l", "default-service", "--service", "Dist"],
            vec!["clustermon", "describe", "--strict"],
            vec!["clustermon", "describe", "-l", "caches", "--fixtures", "/tmp/fx"],
            vec!["clustermon", "layouts"],
            vec!["clustermon", "layouts", "list"],
            vec!["clustermon", "layouts", "add", "mine", "members:caches"],
            vec!["clustermon", "layouts", "remove", "mine"],
            vec!["clustermon", "completions", "bash"],
        ];
        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn strict_and_ignore_errors_conflict() {
        let parsed = Cli::try_parse_from(["clustermon", "monitor", "--strict", "--ignore-errors"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cache_requires_service() {
        let parsed = Cli::try_parse_from(["clustermon", "monitor", "--cache", "orders"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let user: CliError = MonError::UnknownPanel {
            panel: "zzz".to_string(),
        }
        .into();
        assert_eq!(user.exit_code(), 1);
        let partial: CliError = MonError::PartialFetch {
            failed: 1,
            summary: "x".to_string(),
        }
        .into();
        assert_eq!(partial.exit_code(), 4);
        let runtime: CliError = MonError::Rendering {
            details: "boom".to_string(),
        }
        .into();
        assert_eq!(runtime.exit_code(), 2);
    }

    #[test]
    fn max_width_below_ten_is_rejected() {
        let cli = Cli::try_parse_from(["clustermon", "--max-width", "5", "panels"]).unwrap();
        assert!(render_options(&cli, &Config::default()).is_err());
        let cli = Cli::try_parse_from(["clustermon", "--max-width", "0", "panels"]).unwrap();
        assert_eq!(
            render_options(&cli, &Config::default()).unwrap().max_column_width,
            0
        );
    }
}
