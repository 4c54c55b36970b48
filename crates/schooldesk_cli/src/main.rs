use clap::{CommandFactory, Parser};
use log::info;
use schooldesk_cli::cli::{Cli, Command, collect_config_overrides, resolve_sort};
use schooldesk_cli::render;
use schooldesk_core::config::{Config, load_config_with_fallback, merge_overrides, palette_for_theme};
use schooldesk_core::error::AppError;
use schooldesk_core::logging::{default_log_level, init_logging};
use schooldesk_core::model::{Record, RecordKind};
use schooldesk_core::session;
use std::io::{self, BufRead};

const LOG_DIR_ENV_VAR: &str = "SCHOOLDESK_LOG_DIR";

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

/// Starts file logging when a directory is configured; failures only warn.
fn start_logging(config: &Config) {
    let log_dir = std::env::var(LOG_DIR_ENV_VAR)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .or_else(|| config.log_dir.clone());
    let Some(log_dir) = log_dir else {
        return;
    };
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("WARN: logging disabled: {err}");
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::List { .. } => "list",
        Command::Board { .. } => "board",
        Command::Add { .. } => "add",
        Command::Edit { .. } => "edit",
        Command::Advance { .. } => "advance",
        Command::Done { .. } => "done",
        Command::Reopen { .. } => "reopen",
        Command::Show { .. } => "show",
        Command::Accept { .. } => "accept",
        Command::Note { .. } => "note",
        Command::Delegate { .. } => "delegate",
        Command::Summary => "summary",
        Command::Inbox => "inbox",
        Command::Notify => "notify",
        Command::Reset => "reset",
    }
}

fn print_outcome(json: bool, verb: &str, record: &Record) -> Result<(), AppError> {
    if json {
        render::print_json(record)
    } else {
        println!("{verb}: {} ({}) [{}]", record.title, record.id, record.status);
        Ok(())
    }
}

fn run_command(cli: Cli, base: &Config) -> Result<(), AppError> {
    let overrides = collect_config_overrides(&cli.config_override)?;
    let config = merge_overrides(base, &overrides);
    start_logging(&config);
    info!("event=command name={} json={}", command_name(&cli.command), cli.json);
    let palette = palette_for_theme(config.theme.as_deref());
    let now = session::local_now();

    match cli.command {
        Command::List {
            kind,
            filters,
            sort,
            desc,
        } => {
            let kind: RecordKind = kind.parse()?;
            let filters = filters.to_filters(now)?;
            let sort = resolve_sort(sort.as_deref(), desc, config.sort()?)?;
            let records = session::list_records(kind, filters, sort)?;
            if cli.json {
                render::print_json(&records)?;
            } else {
                render::print_records(&records, now, &palette);
            }
        }
        Command::Board { kind, filters } => {
            let kind: RecordKind = kind.parse()?;
            let view = session::bucketed_view(kind, filters.to_filters(now)?, config.sort()?)?;
            if cli.json {
                render::print_json(&view)?;
            } else {
                render::print_board(&view, now, &palette);
            }
        }
        Command::Add { kind, fields } => {
            let kind: RecordKind = kind.parse()?;
            let record = session::create_record(fields.into_draft(kind, now)?)?;
            print_outcome(cli.json, "Added record", &record)?;
        }
        Command::Edit { id, fields, clear } => {
            let patch = fields.into_patch(&clear, now)?;
            let record = session::patch_record(&id, &patch)?;
            print_outcome(cli.json, "Updated record", &record)?;
        }
        Command::Advance { id } => {
            let record = session::advance_status(&id)?;
            print_outcome(cli.json, "Advanced record", &record)?;
        }
        Command::Done { id } => {
            let record = session::force_complete(&id)?;
            print_outcome(cli.json, "Completed record", &record)?;
        }
        Command::Reopen { id } => {
            let record = session::reopen(&id)?;
            print_outcome(cli.json, "Reopened record", &record)?;
        }
        Command::Show { id } => {
            let record = session::get_record(&id)?;
            if cli.json {
                render::print_json(&record)?;
            } else {
                render::print_record(&record, now, &palette);
            }
        }
        Command::Accept { id } => {
            let record = session::accept(&id)?;
            print_outcome(cli.json, "Accepted record", &record)?;
        }
        Command::Note {
            id,
            text,
            attachments,
        } => {
            let record = session::add_note(&id, &text, attachments)?;
            print_outcome(cli.json, "Logged note on", &record)?;
        }
        Command::Delegate { id, delegation } => {
            let record = session::delegate(&id, delegation.into_draft(now)?)?;
            print_outcome(cli.json, "Delegated record", &record)?;
        }
        Command::Summary => {
            let summary = session::summary()?;
            if cli.json {
                render::print_json(&summary)?;
            } else {
                render::print_summary(&summary, now, &palette);
            }
        }
        Command::Inbox => {
            let items = session::inbox()?;
            if cli.json {
                render::print_json(&items)?;
            } else {
                render::print_feed(&items, now);
            }
        }
        Command::Notify => {
            let outcome = session::notify_overdue_records()?;
            if cli.json {
                render::print_json(&render::notification_outcome_json(&outcome))?;
            } else {
                render::print_notification_outcome(&outcome);
            }
        }
        Command::Reset => {
            let count = session::reset()?;
            if cli.json {
                render::print_json(&serde_json::json!({ "records": count }))?;
            } else {
                println!("Session reset with {count} sample records.");
            }
        }
    }

    Ok(())
}

fn run_interactive(base: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("schooldesk".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, base) {
            eprintln!("ERROR: {err}");
        }
    }

    Ok(())
}

fn load_base_config() -> Config {
    let load = load_config_with_fallback();
    if let Some(err) = load.error {
        eprintln!("WARN: using default config: {err}");
    }
    load.config
}

fn main() {
    let base = load_base_config();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&base) {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &base) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
