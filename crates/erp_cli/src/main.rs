//! Command-line access to ERP record collections.
//!
//! # Responsibility
//! - Drive `erp_core` collections from a shell for inspection and scripting.
//! - Print records as JSON on stdout and toasts on stderr.

use clap::{Parser, Subcommand};
use erp_core::db::open_db;
use erp_core::remote::resources;
use erp_core::storage::keys;
use erp_core::{
    init_logging, profile_for_key, profile_for_resource, ApiClient, ApiConfig,
    CollectionRepository, EntityService, ErpConfig, Fields, LocalCollection, RecordFilter,
    RecordId, RestCollection, SqliteStorage, StorageConfig, SystemClock, ToastChannel,
    ToastEvent,
};
use log::info;
use serde_json::Value;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Database file used when neither flags nor config name one.
const DEFAULT_DB_FILE: &str = "erp.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "erp", version, about = "Inspect and edit ERP record collections")]
struct Cli {
    /// JSON config file; `ERP_*` environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path [default: configured path, else ./erp.sqlite3]
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core linkage
    Ping,
    /// Show every local collection key with its record count, then the REST resources
    Keys,
    /// Print the records of a collection key or REST resource
    List {
        key: String,
        /// Equality filter, repeatable: --where status=pending
        #[arg(long = "where", value_parser = parse_assignment)]
        filters: Vec<(String, Value)>,
    },
    /// Validate and add a record
    Create {
        key: String,
        /// Field value, repeatable; JSON when it parses, text otherwise
        #[arg(long = "field", value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Validate and merge fields into an existing record
    Update {
        key: String,
        id: String,
        #[arg(long = "field", value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Remove a record
    Delete { key: String, id: String },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Command::Ping = cli.command {
        println!("erp_core ping={}", erp_core::ping());
        println!("erp_core version={}", erp_core::core_version());
        return Ok(());
    }

    let config = ErpConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let toasts = ToastChannel::with_default_duration(
        Rc::new(SystemClock),
        config.toast.default_duration_ms,
    );
    toasts.subscribe(|event| {
        if let ToastEvent::Shown(toast) = event {
            eprintln!("[{}] {}", toast.kind, toast.message);
        }
    });

    let db_path = local_db_path(&config.storage, cli.db);
    execute(cli.command, &config.api, &db_path, toasts)
}

/// Resolves the SQLite file for local collections.
///
/// Each invocation is its own process, so an in-memory backend would drop
/// every write on exit; the CLI persists to `DEFAULT_DB_FILE` instead.
fn local_db_path(storage: &StorageConfig, db_flag: Option<PathBuf>) -> PathBuf {
    match (db_flag, storage) {
        (Some(path), _) => path,
        (None, StorageConfig::Sqlite { path }) => path.clone(),
        (None, StorageConfig::Memory) => PathBuf::from(DEFAULT_DB_FILE),
    }
}

fn execute(
    command: Command,
    api: &ApiConfig,
    db_path: &Path,
    toasts: ToastChannel,
) -> CliResult<()> {
    let (key, action) = match command {
        Command::Ping => return Ok(()),
        Command::Keys => {
            let conn = open_db(db_path)?;
            let storage = SqliteStorage::try_new(&conn)?;
            for key in keys::all_keys() {
                let count = LocalCollection::new(&storage, key)
                    .list_or_empty(&RecordFilter::new())
                    .len();
                println!("{key}\t{count}");
            }
            for resource in resources::ALL {
                println!("{resource}\tremote");
            }
            return Ok(());
        }
        Command::List { key, filters } => (key, Action::List(filters)),
        Command::Create { key, fields } => (key, Action::Create(fields)),
        Command::Update { key, id, fields } => (key, Action::Update(parse_id(&id)?, fields)),
        Command::Delete { key, id } => (key, Action::Delete(parse_id(&id)?)),
    };

    if let Some(profile) = profile_for_resource(&key) {
        let client = ApiClient::new(api);
        let repo = RestCollection::new(&client, key.as_str());
        let service = EntityService::from_profile(repo, profile, toasts);
        return perform(&service, action);
    }

    let profile = profile_for_key(&key)
        .ok_or_else(|| format!("unknown collection key `{key}`; run `erp keys`"))?;
    let conn = open_db(db_path)?;
    let storage = SqliteStorage::try_new(&conn)?;
    let repo = LocalCollection::new(&storage, key.as_str());
    let service = EntityService::from_profile(repo, profile, toasts);
    perform(&service, action)
}

fn perform<R: CollectionRepository>(service: &EntityService<R>, action: Action) -> CliResult<()> {
    info!(
        "event=cli_command module=cli status=start collection={} action={}",
        service.repo().name(),
        action.name()
    );

    match action {
        Action::List(filters) => {
            let filter = filters
                .into_iter()
                .fold(RecordFilter::new(), |filter, (field, value)| {
                    filter.where_eq(field, value)
                });
            print_json(&service.try_list(&filter)?)
        }
        Action::Create(fields) => print_json(&service.create(into_fields(fields))?),
        Action::Update(id, fields) => print_json(&service.update(&id, into_fields(fields))?),
        Action::Delete(id) => {
            service.delete(&id)?;
            Ok(())
        }
    }
}

enum Action {
    List(Vec<(String, Value)>),
    Create(Vec<(String, Value)>),
    Update(RecordId, Vec<(String, Value)>),
    Delete(RecordId),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Create(_) => "create",
            Self::Update(..) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

fn parse_id(raw: &str) -> CliResult<RecordId> {
    RecordId::parse(raw).ok_or_else(|| "record id cannot be blank".into())
}

/// Parses `FIELD=VALUE`; the value is JSON when it parses, text otherwise.
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("field name is empty in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

fn into_fields(assignments: Vec<(String, Value)>) -> Fields {
    assignments.into_iter().collect()
}

fn print_json(value: &impl serde::Serialize) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{execute, local_db_path, parse_assignment, Cli, Command, DEFAULT_DB_FILE};
    use clap::{CommandFactory, Parser};
    use erp_core::db::open_db;
    use erp_core::storage::keys::inventory;
    use erp_core::{
        ApiConfig, CollectionRepository, LocalCollection, RecordFilter, SqliteStorage,
        StorageConfig, ToastChannel,
    };
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn assignment_values_parse_as_json_then_text() {
        assert_eq!(
            parse_assignment("capacity=10000").unwrap(),
            ("capacity".to_string(), json!(10000))
        );
        assert_eq!(
            parse_assignment("name=Main Warehouse").unwrap(),
            ("name".to_string(), json!("Main Warehouse"))
        );
        assert_eq!(
            parse_assignment("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".to_string(), json!(["a", "b"]))
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), json!("a=b"))
        );
    }

    #[test]
    fn assignment_requires_field_name_and_separator() {
        assert!(parse_assignment("capacity").is_err());
        assert!(parse_assignment(" =1").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_field_flags_collect_in_order() {
        let cli = Cli::try_parse_from([
            "erp",
            "create",
            "erp_inventory_warehouses",
            "--field",
            "name=Main",
            "--field",
            "capacity=10000",
        ])
        .unwrap();
        match cli.command {
            super::Command::Create { key, fields } => {
                assert_eq!(key, "erp_inventory_warehouses");
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[1], ("capacity".to_string(), json!(10000)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn db_path_prefers_flag_then_config_then_local_file() {
        let configured = StorageConfig::Sqlite {
            path: PathBuf::from("/var/lib/erp/store.sqlite3"),
        };
        assert_eq!(
            local_db_path(&configured, Some(PathBuf::from("/tmp/cli.sqlite3"))),
            PathBuf::from("/tmp/cli.sqlite3")
        );
        assert_eq!(
            local_db_path(&configured, None),
            PathBuf::from("/var/lib/erp/store.sqlite3")
        );
        assert_eq!(
            local_db_path(&StorageConfig::Memory, None),
            PathBuf::from(DEFAULT_DB_FILE)
        );
    }

    #[test]
    fn created_records_outlive_the_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("erp.sqlite3");
        let create = Command::Create {
            key: inventory::WAREHOUSES.to_string(),
            fields: vec![
                ("name".to_string(), json!("Main")),
                ("capacity".to_string(), json!(100)),
            ],
        };
        execute(create, &ApiConfig::default(), &db_path, ToastChannel::default()).unwrap();

        let conn = open_db(&db_path).unwrap();
        let storage = SqliteStorage::try_new(&conn).unwrap();
        let stored = LocalCollection::new(&storage, inventory::WAREHOUSES)
            .list(&RecordFilter::new())
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].field("name"), Some(&json!("Main")));
    }

    #[test]
    fn unknown_key_is_rejected_before_touching_storage() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("erp.sqlite3");
        let list = Command::List {
            key: "erp_unknown".to_string(),
            filters: Vec::new(),
        };

        let err = execute(list, &ApiConfig::default(), &db_path, ToastChannel::default())
            .unwrap_err();
        assert!(err.to_string().contains("unknown collection key"));
        assert!(!db_path.exists());
    }
}
