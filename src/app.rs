use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::dashboard::{
    Action, Dashboard, DashboardOptions, Notice, NoticeKind, Outcome, CONFIRM_CLEAR,
    CONFIRM_DELETE,
};
use crate::pager::{Direction, DEFAULT_PAGE_SIZE};
use crate::session::SessionState;
use crate::store::{RealtimeDbOptions, RealtimeDbStore};
use crate::view::{self, OutputFormat};

fn print_banner() {
    const BANNER: &str = r#"
             _               _           _
   ___ _   _| |__   __ _  __| |_ __ ___ (_)_ __
  / __| | | | '_ \ / _` |/ _` | '_ ` _ \| | '_ \
  \__ \ |_| | |_) | (_| | (_| | | | | | | | | | |
  |___/\__,_|_.__/ \__,_|\__,_|_| |_| |_|_|_| |_|
       user submission admin dashboard
    "#;
    println!("{}", BANNER.bold().cyan());
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,subadmin={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    command: Command,
    database_url: String,
    collection: String,
    auth_token: Option<String>,
    timeout: usize,
    proxy: Option<String>,
    page_size: usize,
    export_dir: Option<PathBuf>,
    output_format: OutputFormat,
    no_color: bool,
    assume_yes: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let assume_yes = args.yes || cfg.assume_yes.unwrap_or(false);

    let database_url = args
        .database_url
        .or(cfg.database_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            "database url is required (--database-url, SUBADMIN_DATABASE_URL or database_url in config)"
                .to_string()
        })?;
    let collection = args
        .collection
        .or(cfg.collection)
        .unwrap_or_else(|| "users".to_string());
    let auth_token = args
        .auth_token
        .or(cfg.auth_token)
        .filter(|t| !t.trim().is_empty());

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let page_size = args
        .page_size
        .or(cfg.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page-size, expected positive integer".to_string());
    }

    let export_dir = cfg.export_dir.map(|p| config::expand_tilde(&p));

    let command = args.command.unwrap_or(Command::Shell);
    let format_raw = match &command {
        Command::List {
            format: Some(raw), ..
        } => Some(raw.clone()),
        _ => cfg.output_format,
    };
    let output_format = match format_raw {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected table or json"))?,
        None => OutputFormat::Table,
    };

    Ok(RunConfig {
        command,
        database_url,
        collection,
        auth_token,
        timeout,
        proxy,
        page_size,
        export_dir,
        output_format,
        no_color,
        assume_yes,
    })
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success => println!(
            "{}{}{} {}",
            "[".bold().white(),
            "OK".bold().green(),
            "]".bold().white(),
            notice.text.as_str().bold().white()
        ),
        NoticeKind::Error => eprintln!(
            "{}{}{} {}",
            "[".bold().white(),
            "ERR".bold().red(),
            "]".bold().white(),
            notice.text.as_str().bold().white()
        ),
    }
}

fn touches_store(action: &Action) -> bool {
    matches!(action, Action::Load | Action::Delete(_) | Action::Clear)
}

/// Runs one action, showing a spinner while the store is being called.
async fn run_action(dash: &Dashboard, state: &SessionState, action: Action) -> Outcome {
    if !touches_store(&action) {
        return dash.apply(state, action).await;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb.set_message(match &action {
        Action::Delete(_) => "Deleting submission...",
        Action::Clear => "Clearing submissions...",
        _ => "Loading submissions...",
    });

    let outcome = dash.apply(state, action).await;
    pb.finish_and_clear();
    outcome
}

async fn confirm<R>(lines: &mut Lines<R>, question: &str) -> Result<bool, String>
where
    R: AsyncBufRead + Unpin,
{
    print!("{} {} ", question.bold().yellow(), "[y/N]".dimmed());
    std::io::stdout()
        .flush()
        .map_err(|e| format!("failed to flush stdout: {e}"))?;
    let answer = lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read answer: {e}"))?
        .unwrap_or_default();
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn confirmation_for(action: &Action) -> Option<&'static str> {
    match action {
        Action::Delete(_) => Some(CONFIRM_DELETE),
        Action::Clear => Some(CONFIRM_CLEAR),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ShellCommand {
    Redraw,
    Help,
    Quit,
    Run(Action),
}

fn parse_shell_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Redraw);
    }
    if let Some(term) = line.strip_prefix('/') {
        return Ok(ShellCommand::Run(Action::Search(term.to_string())));
    }

    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    let cmd = cmd.to_lowercase();
    if let Some(direction) = Direction::parse(&cmd) {
        return Ok(ShellCommand::Run(Action::Step(direction)));
    }

    match cmd.as_str() {
        "search" | "s" | "find" => Ok(ShellCommand::Run(Action::Search(rest.to_string()))),
        "page" | "g" | "goto" => rest
            .parse::<usize>()
            .map(|n| ShellCommand::Run(Action::GoTo(n)))
            .map_err(|_| format!("invalid page '{rest}', expected a number")),
        "delete" | "del" | "rm" => {
            if rest.is_empty() {
                Err("usage: delete <id>".to_string())
            } else {
                Ok(ShellCommand::Run(Action::Delete(rest.to_string())))
            }
        }
        "clear" => Ok(ShellCommand::Run(Action::Clear)),
        "export" | "x" => {
            let dest = if rest.is_empty() {
                None
            } else {
                Some(config::expand_tilde(rest))
            };
            Ok(ShellCommand::Run(Action::Export(dest)))
        }
        "reload" | "r" | "refresh" => Ok(ShellCommand::Run(Action::Load)),
        "help" | "h" | "?" => Ok(ShellCommand::Help),
        "quit" | "q" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

const SHELL_HELP: &str = "\
Commands:
  search <term>   filter by mobile, amount, bank or pin (also: /<term>; empty term resets)
  next | n        next page
  prev | p        previous page
  page <n>        jump to page n
  delete <id>     delete one submission
  export [path]   write the filtered view as CSV
  clear           delete every submission
  reload | r      fetch submissions again
  help            show this help
  quit | q        leave
  <enter>         redraw
";

fn draw(state: &SessionState) {
    print!("{}", view::render_table(&view::project(state)));
}

async fn run_shell(run: &RunConfig, dash: &Dashboard) -> Result<(), String> {
    print_banner();
    format_kv_line("Database", &run.database_url);
    format_kv_line("Collection", &run.collection);
    format_kv_line("Page size", &run.page_size.to_string());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let first = run_action(dash, &dash.initial_state(), Action::Load).await;
    let mut state = first.state;
    if let Some(notice) = first.notice.as_ref() {
        print_notice(notice);
    }
    draw(&state);

    loop {
        print!("{} ", "subadmin>".bold().blue());
        std::io::stdout()
            .flush()
            .map_err(|e| format!("failed to flush stdout: {e}"))?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        else {
            println!();
            break;
        };

        let action = match parse_shell_line(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Help) => {
                print!("{SHELL_HELP}");
                continue;
            }
            Ok(ShellCommand::Redraw) => {
                draw(&state);
                continue;
            }
            Ok(ShellCommand::Run(action)) => action,
            Err(e) => {
                print_notice(&Notice::error(e));
                continue;
            }
        };

        if let Some(question) = confirmation_for(&action) {
            if !run.assume_yes && !confirm(&mut lines, question).await? {
                continue;
            }
        }

        let outcome = run_action(dash, &state, action).await;
        state = outcome.state;
        if let Some(notice) = outcome.notice.as_ref() {
            print_notice(notice);
        }
        draw(&state);
    }

    Ok(())
}

/// Loads the collection and applies an optional search, failing on a load
/// error so one-shot commands can exit non-zero.
async fn load_view(dash: &Dashboard, search: Option<&str>) -> Result<SessionState, String> {
    let outcome = run_action(dash, &dash.initial_state(), Action::Load).await;
    if let Some(notice) = outcome.notice.filter(|n| n.is_error()) {
        return Err(notice.text);
    }
    Ok(match search {
        Some(term) => outcome.state.searched(term),
        None => outcome.state,
    })
}

fn finish(outcome: Outcome) -> Result<SessionState, String> {
    match outcome.notice {
        Some(notice) if notice.is_error() => Err(notice.text),
        Some(notice) => {
            print_notice(&notice);
            Ok(outcome.state)
        }
        None => Ok(outcome.state),
    }
}

async fn run_mutation(run: &RunConfig, dash: &Dashboard, action: Action) -> Result<(), String> {
    if let Some(question) = confirmation_for(&action) {
        if !run.assume_yes {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            if !confirm(&mut lines, question).await? {
                println!("aborted");
                return Ok(());
            }
        }
    }
    let state = finish(run_action(dash, &dash.initial_state(), action).await)?;
    draw(&state);
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let store = RealtimeDbStore::new(RealtimeDbOptions {
        database_url: run.database_url.clone(),
        collection: run.collection.clone(),
        auth_token: run.auth_token.clone(),
        timeout_seconds: run.timeout,
        proxy: run.proxy.clone(),
    })
    .map_err(|e| e.to_string())?;
    let dash = Dashboard::new(
        Arc::new(store),
        DashboardOptions {
            page_size: run.page_size,
            export_dir: run.export_dir.clone(),
        },
    );

    match run.command.clone() {
        Command::Shell => run_shell(&run, &dash).await,
        Command::List { search, page, .. } => {
            let state = load_view(&dash, search.as_deref()).await?.at_page(page);
            let model = view::project(&state);
            match run.output_format {
                OutputFormat::Table => print!("{}", view::render_table(&model)),
                OutputFormat::Json => {
                    let mut stdout = std::io::stdout().lock();
                    stdout
                        .write_all(&view::render_json(&model))
                        .and_then(|_| stdout.write_all(b"\n"))
                        .map_err(|e| format!("failed to write output: {e}"))?;
                }
            }
            Ok(())
        }
        Command::Delete { id } => run_mutation(&run, &dash, Action::Delete(id)).await,
        Command::Clear => run_mutation(&run, &dash, Action::Clear).await,
        Command::Export { search, output } => {
            let state = load_view(&dash, search.as_deref()).await?;
            let dest = output.map(|p| config::expand_tilde(&p));
            finish(dash.apply(&state, Action::Export(dest)).await)?;
            Ok(())
        }
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let config_path = match args.config.as_deref() {
        Some(p) => Some(config::expand_tilde(p)),
        None => config::default_config_path(),
    };

    if args.init_config {
        let path = config_path.ok_or_else(|| "could not determine config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("wrote default config to {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match config_path.as_ref() {
        Some(path) => config::load_config(path, args.config.is_none())?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;
    tracing::debug!(collection = %run.collection, page_size = run.page_size, "starting");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
