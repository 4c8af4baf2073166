use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;
use taskmaster_cli::cli::{Cli, Command, collect_config_overrides};
use taskmaster_cli::input::{expand_alias, parse_datetime, split_command_line};
use taskmaster_cli::logging::init_logging;
use taskmaster_cli::render::{self, RenderContext};
use taskmaster_core::config::{Config, load_config_with_fallback, merge_overrides};
use taskmaster_core::error::AppError;
use taskmaster_core::model::{Task, TaskPriority, TaskStatus};
use taskmaster_core::query::FilterPreset;
use taskmaster_core::storage::seed::{SAMPLE_USER_ID, load_seed, sample_state};
use taskmaster_core::store::{TaskDraft, TaskStore, TaskUpdate};
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info, warn};

/// One store shared by every command of a run.
struct Session {
    store: TaskStore,
    config: Config,
    local_offset: UtcOffset,
}

impl Session {
    fn open(config: Config, seed: Option<&str>) -> Result<Self, AppError> {
        let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().to_offset(local_offset);

        let seed = seed.or(config.seed_path.as_deref());
        let store = match seed {
            Some(path) => load_seed(Path::new(path))?,
            None => {
                debug!("starting from sample data");
                sample_state(now)
            }
        };

        Ok(Self {
            store,
            config,
            local_offset,
        })
    }

    fn render_context(&self) -> RenderContext {
        RenderContext {
            now: OffsetDateTime::now_utc().to_offset(self.local_offset),
            local_offset: self.local_offset,
        }
    }
}

fn load_base_config() -> Config {
    let load = load_config_with_fallback();
    if let Some(err) = load.error {
        warn!(error = %err, "config unreadable, using defaults");
    }
    load.config
}

fn effective_config(base: &Config, raw_overrides: &[String]) -> Result<Config, AppError> {
    let overrides = collect_config_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(merge_overrides(base, &overrides))
}

fn parse_all<T: FromStr<Err = AppError>>(values: &[String]) -> Result<Vec<T>, AppError> {
    values.iter().map(|value| value.parse()).collect()
}

fn parse_optional<T: FromStr<Err = AppError>>(value: Option<&str>) -> Result<Option<T>, AppError> {
    value.map(str::parse).transpose()
}

fn print_task(task: &Task, ctx: &RenderContext, json: bool, verb: &str) -> Result<(), AppError> {
    if json {
        println!("{}", render::task_value(task, ctx)?);
    } else {
        println!("{verb}: {} ({})", task.title, task.id);
    }
    Ok(())
}

fn encode_error(err: serde_json::Error) -> AppError {
    AppError::invalid_data(format!("cannot encode output: {err}"))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, session: &mut Session) -> Result<(), AppError> {
    let config = effective_config(&session.config, &cli.config_override)?;
    let ctx = session.render_context();
    let store = &mut session.store;

    match cli.command {
        Command::List {
            preset,
            status,
            priority,
            category,
            tag,
            search,
            due_from,
            due_to,
            sort,
            direction,
        } => {
            let preset =
                parse_optional::<FilterPreset>(preset.as_deref())?.unwrap_or(FilterPreset::Active);
            let mut filter = preset.filter_at(ctx.now);

            if !status.is_empty() {
                filter.status = parse_all::<TaskStatus>(&status)?;
            }
            if !priority.is_empty() {
                filter.priority = parse_all::<TaskPriority>(&priority)?;
            }
            if category.is_some() {
                filter.category_id = category;
            }
            filter.tags.extend(tag);
            if search.is_some() {
                filter.search_text = search;
            }
            if let Some(raw) = due_from {
                filter.due_date_from = Some(parse_datetime(&raw, ctx.local_offset)?);
            }
            if let Some(raw) = due_to {
                filter.due_date_to = Some(parse_datetime(&raw, ctx.local_offset)?);
            }

            let key = parse_optional(sort.as_deref())?.unwrap_or(config.default_sort);
            let direction =
                parse_optional(direction.as_deref())?.unwrap_or(config.default_direction);
            debug!(%preset, %key, %direction, "listing tasks");

            let tasks = store.query(&filter, key, direction);
            if cli.json {
                println!("{}", render::tasks_json(&tasks, &ctx)?);
            } else {
                println!("{}", render::tasks_table(store, &tasks, &ctx)?);
            }
        }
        Command::Dashboard => {
            let views = store.dashboard(ctx.now);
            if cli.json {
                println!("{}", render::dashboard_json(&views)?);
            } else {
                println!("{}", render::dashboard_plain(store, &views, &ctx)?);
            }
        }
        Command::Show { id } => {
            let task = store.task(&id)?;
            if cli.json {
                println!("{}", render::task_value(task, &ctx)?);
            } else {
                println!("{}", render::task_details(store, task, &ctx)?);
            }
        }
        Command::Add {
            title,
            description,
            priority,
            due,
            category,
            tag,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let mut draft = TaskDraft::new(SAMPLE_USER_ID, title);
            draft.description = description;
            draft.priority = parse_optional(priority.as_deref())?.unwrap_or_default();
            draft.due_date = due
                .map(|raw| parse_datetime(&raw, ctx.local_offset))
                .transpose()?;
            draft.category_id = category;
            draft.tags = tag;

            let task = store.add_task(draft)?;
            print_task(&task, &ctx, cli.json, "Added task")?;
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            clear_due,
            category,
            clear_category,
        } => {
            let due_date = if clear_due {
                Some(None)
            } else {
                due.map(|raw| parse_datetime(&raw, ctx.local_offset))
                    .transpose()?
                    .map(Some)
            };
            let category_id = if clear_category {
                Some(None)
            } else {
                category.map(Some)
            };

            let update = TaskUpdate {
                title,
                description: description.map(Some),
                due_date,
                category_id,
                ..TaskUpdate::default()
            };
            let task = store.update_task(&id, update)?;
            print_task(&task, &ctx, cli.json, "Updated task")?;
        }
        Command::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            let task = store.set_status(&id, status)?;
            print_task(&task, &ctx, cli.json, &format!("Status {status}"))?;
        }
        Command::Priority { id, priority } => {
            let priority: TaskPriority = priority.parse()?;
            let task = store.set_priority(&id, priority)?;
            print_task(&task, &ctx, cli.json, &format!("Priority {priority}"))?;
        }
        Command::Tag { id, tag, remove } => {
            let task = if remove {
                store.remove_tag_from_task(&id, &tag)?
            } else {
                store.add_tag_to_task(&id, &tag)?
            };
            let verb = if remove { "Untagged task" } else { "Tagged task" };
            print_task(&task, &ctx, cli.json, verb)?;
        }
        Command::Delete { id } => {
            let task = store.delete_task(&id)?;
            print_task(&task, &ctx, cli.json, "Deleted task")?;
        }
        Command::Select { id, clear } => {
            let target = if clear { None } else { id.as_deref() };
            match store.select_task(target)? {
                Some(task) => print_task(&task, &ctx, cli.json, "Selected task")?,
                None if cli.json => println!("null"),
                None => println!("Selection cleared"),
            }
        }
        Command::Categories => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(store.categories()).map_err(encode_error)?
                );
            } else {
                println!("{}", render::categories_table(store.categories()));
            }
        }
        Command::Tags => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(store.tags()).map_err(encode_error)?
                );
            } else {
                println!("{}", render::tags_table(store.tags()));
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut session = Session::open(load_base_config(), None)?;
    info!(tasks = session.store.tasks().len(), "interactive session started");

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

        let args = match split_command_line(line)
            .and_then(|args| expand_alias(args, &session.config.aliases))
        {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskmaster".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if cli.seed.is_some() {
            eprintln!(
                "ERROR: {}",
                AppError::invalid_input("--seed only applies when the session starts")
            );
            continue;
        }

        if let Err(err) = run_command(cli, &mut session) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run_once(cli: Cli) -> Result<(), AppError> {
    let config = effective_config(&load_base_config(), &cli.config_override)?;
    let mut session = Session::open(config, cli.seed.as_deref())?;
    run_command(cli, &mut session)
}

fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
