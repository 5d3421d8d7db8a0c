use clap::{Parser, Subcommand, ValueEnum};
use jsontable::{Database, DatabaseConfig, Record, TableOptions};
use std::process;

/// jsontable CLI — manage schema-checked tables stored in a JSON document
#[derive(Parser)]
#[command(name = "jsontable", version, about)]
struct Cli {
    /// Directory holding database documents
    #[arg(long, env = "JSONTABLE_DATA_DIR", default_value = "data")]
    data_dir: String,

    /// Database name (stored as <data-dir>/<db>.json)
    #[arg(long, env = "JSONTABLE_DB", default_value = "defaultDB")]
    db: String,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create a table
    Create {
        /// Table name
        table: String,
        /// Column declarations (e.g. --column title=string). Defaults to id=number
        #[arg(long = "column", value_parser = parse_key_value)]
        columns: Vec<(String, String)>,
        /// Primary key column
        #[arg(long)]
        primary_key: Option<String>,
        /// Assign sequential ids when the primary key is omitted
        #[arg(long)]
        auto_increment: bool,
        /// Add a createdAt date column, stamped on insert
        #[arg(long)]
        created_at: bool,
        /// Add an updatedAt date column, stamped on insert
        #[arg(long)]
        updated_at: bool,
    },

    /// Insert a record
    Insert {
        /// Table name
        table: String,
        /// Field values (e.g. --field completed=false)
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Print a table: metadata, columns and rows
    Get {
        /// Table name
        table: String,
    },

    /// List table names
    Tables,

    /// Drop a table
    Drop {
        /// Table name
        table: String,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("Invalid key=value pair: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::new(cli.db, cli.data_dir);
    let mut db = Database::open_with_config(&config)?;

    match cli.command {
        Command::Create {
            table,
            columns,
            primary_key,
            auto_increment,
            created_at,
            updated_at,
        } => {
            let declaration = if columns.is_empty() {
                serde_json::to_value(jsontable::schema::default_columns())?
            } else {
                columns_to_value(&columns)
            };
            let options = TableOptions {
                primary_key,
                auto_increment,
                created_at,
                updated_at,
            };
            db.create_table(&table, &declaration, &options)?;
            print_output(&serde_json::json!({ "ok": true, "created": table }), &cli.format)?;
        }

        Command::Insert { table, fields } => {
            let row = db.insert(&table, &fields_to_record(&fields))?;
            print_output(&serde_json::Value::Object(row), &cli.format)?;
        }

        Command::Get { table } => {
            let record = db.get_all(&table)?;
            print_output(&serde_json::to_value(record)?, &cli.format)?;
        }

        Command::Tables => {
            print_output(&serde_json::json!(db.get_table_names()), &cli.format)?;
        }

        Command::Drop { table } => {
            db.drop_table(&table)?;
            print_output(&serde_json::json!({ "ok": true, "dropped": table }), &cli.format)?;
        }
    }

    Ok(())
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

fn columns_to_value(columns: &[(String, String)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, ty) in columns {
        map.insert(name.clone(), serde_json::Value::String(ty.clone()));
    }
    serde_json::Value::Object(map)
}

fn fields_to_record(fields: &[(String, String)]) -> Record {
    let mut record = Record::new();
    for (key, val) in fields {
        // Numbers, booleans, arrays and objects parse as JSON; anything else is text
        let json_val =
            serde_json::from_str(val).unwrap_or_else(|_| serde_json::Value::String(val.clone()));
        record.insert(key.clone(), json_val);
    }
    record
}
