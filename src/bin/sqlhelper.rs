//! sqlhelper — run statements through the pooled query helpers
//!
//! # Usage
//!
//! ```bash
//! # Run a statement (empty result is an error)
//! sqlhelper run "SELECT * FROM users WHERE active = $1" --bind true
//!
//! # Single row, allowed to be missing
//! sqlhelper run "SELECT * FROM users WHERE id = $1" --bind 42 --mode lookup-safe
//!
//! # Preview fragments
//! sqlhelper fields insert firstName lastName email
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlhelper::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlhelper")]
#[command(version)]
#[command(about = "Pooled query helpers CLI", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlhelper run 'SELECT * FROM users'
    sqlhelper run 'SELECT * FROM users WHERE id = $1' --bind 42 --mode lookup
    sqlhelper fields set firstName updatedAt")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a statement against the configured database
    Run {
        /// SQL text with $1, $2, ... placeholders
        sql: String,

        /// Parameter bindings ($1, $2, etc.)
        #[arg(short, long, value_delimiter = ',')]
        bind: Vec<String>,

        /// Result policy
        #[arg(short, long, value_enum, default_value = "query")]
        mode: Mode,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Database connection URL (overrides sqlhelper.toml)
        #[arg(long, env = "SQLHELPER_DATABASE_URL")]
        database_url: Option<String>,

        /// Run inside BEGIN/COMMIT
        #[arg(short, long)]
        transaction: bool,
    },
    /// Print an INSERT or SET fragment for a list of fields
    Fields {
        #[arg(value_enum)]
        kind: FragmentKind,
        /// Field names
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Print the column name for each field
    Column {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Print the current UTC timestamp
    Now,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Query,
    QuerySafe,
    Lookup,
    LookupSafe,
}

impl From<Mode> for QueryOptions {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Query => QueryOptions::QUERY,
            Mode::QuerySafe => QueryOptions::QUERY_SAFE,
            Mode::Lookup => QueryOptions::LOOKUP,
            Mode::LookupSafe => QueryOptions::LOOKUP_SAFE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FragmentKind {
    Insert,
    Set,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            sql,
            bind,
            mode,
            format,
            database_url,
            transaction,
        } => run_statement(&sql, &bind, mode, format, database_url, transaction).await,
        Commands::Fields { kind, fields } => show_fragment(kind, &fields),
        Commands::Column { fields } => {
            for field in &fields {
                println!("{} {} {}", field.white(), "→".dimmed(), transform_to_column(field).cyan());
            }
            Ok(())
        }
        Commands::Now => {
            println!("{}", create_now_timestamp());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run_statement(
    sql: &str,
    bind: &[String],
    mode: Mode,
    format: OutputFormat,
    database_url: Option<String>,
    transaction: bool,
) -> anyhow::Result<()> {
    let mut config = Config::discover()?;
    if database_url.is_some() {
        config.database.url = database_url;
    }

    let statement = Statement::new(sql).bind_all(bind.iter().map(|b| parse_binding(b)));
    let db = Database::new(
        SqlxPool::connect(&config.database)
            .await
            .context("connecting to database")?,
    );

    let (data, meta) = if transaction {
        let tx = db.begin_transaction().await?;
        let res = tx.execute(&statement, mode.into()).await?;
        res.connection.commit().await?;
        (res.data, res.meta)
    } else {
        let res = db.execute(&statement, mode.into()).await?;
        (res.data, res.meta)
    };

    format_output(&data, &meta, format)
}

/// Numbers, booleans and `null` are bound as such; anything else as text.
fn parse_binding(binding: &str) -> SqlValue {
    if let Ok(n) = binding.parse::<i64>() {
        SqlValue::Int(n)
    } else if let Ok(f) = binding.parse::<f64>() {
        SqlValue::Float(f)
    } else {
        match binding {
            "true" => SqlValue::Bool(true),
            "false" => SqlValue::Bool(false),
            "null" => SqlValue::Null,
            other => SqlValue::String(other.to_string()),
        }
    }
}

fn show_fragment(kind: FragmentKind, fields: &[String]) -> anyhow::Result<()> {
    let fragment = match kind {
        FragmentKind::Insert => prepare_fields_for_insert(fields)?,
        FragmentKind::Set => prepare_fields_for_set(fields)?,
    };
    println!("{}", fragment.white());
    Ok(())
}

fn format_output(data: &Data, meta: &QueryMeta, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let envelope = serde_json::json!({ "data": data, "meta": meta });
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        OutputFormat::Table => {
            let rows: Vec<&Record> = match data {
                Data::Rows(rows) => rows.iter().collect(),
                Data::Single(row) => vec![row],
                Data::Empty => Vec::new(),
            };
            print_table(&rows);
            if let Some(count) = meta.row_count {
                println!("{} row(s) affected", count.to_string().cyan());
            }
        }
    }
    Ok(())
}

fn print_table(rows: &[&Record]) {
    let Some(first) = rows.first() else {
        println!("{}", "(no results)".dimmed());
        return;
    };

    let columns: Vec<&String> = first.keys().collect();
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| {
            rows.iter()
                .map(|row| row.get(*c).map(val_to_string).unwrap_or_default().len())
                .max()
                .unwrap_or(0)
                .max(c.len())
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:width$}", c, width = w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let val = row.get(*c).map(val_to_string).unwrap_or_default();
                format!("{:width$}", val, width = w)
            })
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} row(s) returned", rows.len().to_string().cyan());
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}
