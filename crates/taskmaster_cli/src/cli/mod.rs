use clap::{Parser, Subcommand};
use taskmaster_core::config::ConfigOverrides;
use taskmaster_core::model::{SortDirection, SortKey, canonical_token};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Start the session from a JSON seed file instead of the sample data
    #[arg(long, value_name = "PATH", global = true)]
    pub seed: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks through a filter and sort order
    ///
    /// Example: taskmaster list --preset overdue
    /// Example: taskmaster list --status completed --sort priority --direction desc
    /// Example: taskmaster list --tag urgent --search report
    List {
        /// Starting filter: active, overdue, today, high-priority, completed
        #[arg(long)]
        preset: Option<String>,
        /// Replace the preset's statuses (repeatable)
        #[arg(long)]
        status: Vec<String>,
        /// Only these priorities (repeatable)
        #[arg(long)]
        priority: Vec<String>,
        #[arg(long)]
        category: Option<String>,
        /// Match any of these tag ids (repeatable)
        #[arg(long)]
        tag: Vec<String>,
        /// Case-insensitive text in title or description
        #[arg(long)]
        search: Option<String>,
        /// Earliest due date (RFC3339, "YYYY-MM-DD" or "YYYY-MM-DD HH:MM")
        #[arg(long)]
        due_from: Option<String>,
        /// Latest due date
        #[arg(long)]
        due_to: Option<String>,
        /// due-date, priority, created-at or title
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        direction: Option<String>,
    },
    /// Show overdue, due today, high priority and recently completed tasks
    ///
    /// Example: taskmaster dashboard
    Dashboard,
    /// Show details of a task
    ///
    /// Example: taskmaster show task1
    Show { id: String },
    /// Add a new task
    ///
    /// Example: taskmaster add "Buy milk" --priority high --due 2024-06-12 --tag urgent
    Add {
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tag: Vec<String>,
    },
    /// Edit a task's fields
    ///
    /// Example: taskmaster edit task1 --title "Buy organic milk"
    /// Example: taskmaster edit task1 --clear-due
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[arg(long)]
        clear_category: bool,
    },
    /// Change a task's status
    ///
    /// Example: taskmaster status task1 completed
    Status { id: String, status: String },
    /// Change a task's priority
    ///
    /// Example: taskmaster priority task1 high
    Priority { id: String, priority: String },
    /// Tag a task, or untag it with --remove
    ///
    /// Example: taskmaster tag task1 urgent
    /// Example: taskmaster tag task1 urgent --remove
    Tag {
        id: String,
        tag: String,
        #[arg(long)]
        remove: bool,
    },
    /// Delete a task
    ///
    /// Example: taskmaster delete task1
    Delete { id: String },
    /// Select a task for the session, or clear the selection with --clear
    ///
    /// Example: taskmaster select task1
    Select {
        #[arg(required_unless_present = "clear")]
        id: Option<String>,
        #[arg(long)]
        clear: bool,
    },
    /// List categories
    Categories,
    /// List tags
    Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    DefaultSort,
    DefaultDirection,
    SeedPath,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_token(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match canonical_field.as_str() {
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            return Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            });
        }
        "default_sort" | "sort" => ConfigOverrideTarget::DefaultSort,
        "default_direction" | "direction" => ConfigOverrideTarget::DefaultDirection,
        "seed_path" | "seed" => ConfigOverrideTarget::SeedPath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if remainder.is_some() {
        return Err(format!("{canonical_field} override cannot have subfields"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Fold every `--config-override` value into one set of overrides.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::DefaultSort => {
                let key = parsed
                    .value
                    .parse::<SortKey>()
                    .map_err(|err| err.message().to_string())?;
                overrides.default_sort = Some(key);
            }
            ConfigOverrideTarget::DefaultDirection => {
                let direction = parsed
                    .value
                    .parse::<SortDirection>()
                    .map_err(|err| err.message().to_string())?;
                overrides.default_direction = Some(direction);
            }
            ConfigOverrideTarget::SeedPath => overrides.seed_path = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }

    Ok(overrides)
}
