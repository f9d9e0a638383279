use clap::{Parser, Subcommand};
use sqlcrud::config::{self, Config};
use sqlcrud::{Crud, DbConnection, QueryResult, Record, Result, SqlCrudError, TableSchema, Value};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Create, insert, select, update and delete rows in a SQLite database.
///
/// Connection settings come from the config file, then `DB_*` environment
/// variables (a `.env` file is loaded first), then the flags below.
#[derive(Parser, Debug)]
#[command(name = "sqlcrud", version)]
struct Cli {
    /// Path to a TOML config file (default: <config dir>/sqlcrud/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database host (recorded only; SQLite is embedded)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Database user
    #[arg(long, global = true)]
    user: Option<String>,

    /// Database password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Database file, or :memory:
    #[arg(long, global = true)]
    database: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a table unless it already exists
    CreateTable {
        table: String,
        /// Column declaration, repeatable
        #[arg(long = "column", value_name = "NAME:TYPE", required = true)]
        columns: Vec<String>,
        /// Primary key column, repeatable for a composite key
        #[arg(long = "primary-key", value_name = "NAME", required = true)]
        primary_key: Vec<String>,
    },
    /// Insert one row
    Insert {
        table: String,
        /// Column value, repeatable
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Insert a JSON array of objects in one batch
    InsertMany {
        table: String,
        /// JSON file to read (default: stdin)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print all rows, or the rows matching a filter
    Select {
        table: String,
        /// Filter such as `--where age '>=' 30`; OP is one of =, >, <, >=, <=
        #[arg(
            long = "where",
            num_args = 3,
            value_names = ["FIELD", "OP", "VALUE"],
            allow_negative_numbers = true
        )]
        filter: Option<Vec<String>>,
    },
    /// Update the row with the given id
    Update {
        table: String,
        #[arg(long, allow_negative_numbers = true)]
        id: String,
        /// Column value, repeatable
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Delete the row with the given id
    Delete {
        table: String,
        #[arg(long, allow_negative_numbers = true)]
        id: String,
    },
}

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    init_tracing(cli.verbose, config.logging.level.as_deref());

    let mut db = DbConnection::new();
    db.connect_from_config(&config)?;

    let outcome = execute(&db, &cli);
    let closed = db.close_connection();
    finish(outcome, closed)
}

/// The operation's error takes precedence over a failure to close afterwards.
fn finish(outcome: Result<()>, closed: Result<()>) -> Result<()> {
    outcome.and(closed)
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => match config::default_config_path().filter(|p| p.exists()) {
            Some(path) => config::load_config(path)?,
            None => Config::default(),
        },
    };
    config.apply_env();

    let db = &mut config.database;
    for (flag, slot) in [
        (&cli.host, &mut db.host),
        (&cli.user, &mut db.user),
        (&cli.password, &mut db.password),
        (&cli.database, &mut db.database),
    ] {
        if let Some(value) = flag {
            *slot = Some(value.clone());
        }
    }
    Ok(config)
}

fn init_tracing(verbose: bool, configured: Option<&str>) {
    let fallback = if verbose { "debug" } else { configured.unwrap_or("warn") };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // Logs go to stderr so query output on stdout stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn execute(db: &DbConnection, cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::CreateTable {
            table,
            columns,
            primary_key,
        } => {
            let mut schema = TableSchema::new();
            for spec in columns {
                let (name, declaration) = split_pair(spec, ':', "NAME:TYPE")?;
                schema = schema.column(name, declaration);
            }
            for key in primary_key {
                schema = schema.primary_key(key);
            }
            db.create_table(table, &schema)?;
            report(cli.json, &format!("Table '{}' created successfully!", table), 0)
        }
        Command::Insert { table, set } => {
            let record = parse_assignments(set)?;
            let rows = db.insert_into(table, &record)?;
            report(cli.json, &format!("Data inserted into '{}' successfully!", table), rows)
        }
        Command::InsertMany { table, file } => {
            let input = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let records = parse_json_records(&input)?;
            debug!(count = records.len(), "parsed batch");
            let rows = db.insert_many(table, &records)?;
            report(cli.json, &format!("Data inserted into '{}' successfully!", table), rows)
        }
        Command::Select { table, filter } => {
            let result = match filter.as_deref() {
                Some([field, op, value]) => {
                    db.select_data(table, field, op, Value::parse_literal(value))?
                }
                Some(_) => {
                    return Err(SqlCrudError::validation("--where takes FIELD OP VALUE"));
                }
                None => db.select_all_data(table)?,
            };
            print_rows(&result, cli.json)
        }
        Command::Update { table, id, set } => {
            let record = parse_assignments(set)?;
            let fields: Vec<&str> = record.columns().collect();
            let values: Vec<Value> = record.values().cloned().collect();
            let rows = db.update_where(table, Value::parse_literal(id), &fields, &values)?;
            report(cli.json, "Data updated successfully!", rows)
        }
        Command::Delete { table, id } => {
            let rows = db.delete_where(table, Value::parse_literal(id))?;
            report(cli.json, &format!("Deleted from '{}'.", table), rows)
        }
    }
}

fn split_pair<'a>(raw: &'a str, sep: char, shape: &str) -> Result<(&'a str, &'a str)> {
    raw.split_once(sep)
        .map(|(left, right)| (left.trim(), right))
        .ok_or_else(|| SqlCrudError::validation(format!("Expected {}, got '{}'", shape, raw)))
}

fn parse_assignments(raw: &[String]) -> Result<Record> {
    let mut record = Record::new();
    for assignment in raw {
        let (column, value) = split_pair(assignment, '=', "COLUMN=VALUE")?;
        record.set(column, Value::parse_literal(value));
    }
    Ok(record)
}

fn parse_json_records(input: &str) -> Result<Vec<Record>> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    let items = json
        .as_array()
        .ok_or_else(|| SqlCrudError::validation("insert-many expects a JSON array of objects"))?;
    items.iter().map(Record::try_from).collect()
}

fn report(json: bool, message: &str, rows: usize) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "rows_affected": rows }));
    } else {
        println!("{}", message);
    }
    info!(rows, "{}", message);
    Ok(())
}

fn print_rows(result: &QueryResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&result.to_json()?)?);
        return Ok(());
    }
    println!("{}", result.columns.join("\t"));
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(Value::to_string).collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}
