use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemawright_core::{Config, DatabaseKind, Schema, Severity, ValidationResult};
use schemawright_engine::{
    analyze_schema, design_schema, generate_migration, generate_seed_data_with, normalize_schema,
    optimize_indexes, seed_to_sql, validate_schema_with,
};

const DEFAULT_CONFIG: &str = "schemawright.toml";

/// SchemaWright - database schemas from plain-language requirements
#[derive(Parser)]
#[command(name = "schemawright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemawright.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design a schema from a requirements text file
    Design {
        /// Requirements file
        file: PathBuf,

        /// Target database (postgres, mysql, mongodb, sqlite)
        #[arg(short, long)]
        database: Option<DatabaseKind>,

        /// Add created_at/updated_at/deleted_at columns; `--timestamps false` turns them off
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        timestamps: Option<bool>,

        /// Write schema JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate up/down migration scripts
    Migrate {
        schema: PathBuf,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Suggest indexes
    Indexes { schema: PathBuf },

    /// Report normalization problems
    Normalize { schema: PathBuf },

    /// Validate a schema; exits non-zero when errors are found
    Validate { schema: PathBuf },

    /// Generate deterministic seed data
    Seed {
        schema: PathBuf,

        /// Records per table
        #[arg(short, long)]
        records: Option<usize>,

        /// Render INSERT statements instead of JSON
        #[arg(long)]
        sql: bool,
    },

    /// Print schema metrics
    Analyze { schema: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Design {
            file,
            database,
            timestamps,
            output,
        } => design_command(&config, &file, database, timestamps, output.as_deref(), cli.verbose),
        Commands::Migrate {
            schema,
            description,
        } => migrate_command(&config, &schema, description),
        Commands::Indexes { schema } => print_json(&optimize_indexes(&read_schema(&schema)?)),
        Commands::Normalize { schema } => normalize_command(&schema, cli.verbose),
        Commands::Validate { schema } => validate_command(&config, &schema),
        Commands::Seed {
            schema,
            records,
            sql,
        } => seed_command(&config, &schema, records, sql),
        Commands::Analyze { schema } => print_json(&analyze_schema(&read_schema(&schema)?)),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(path) = path {
        Config::from_file(path).with_context(|| format!("loading {}", path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if verbose {
        eprintln!("{} database: {}", "Using".cyan(), config.design.database);
    }
    Ok(config)
}

fn read_schema(path: &Path) -> Result<Schema> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Schema::from_json(&json).with_context(|| format!("parsing schema {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn design_command(
    config: &Config,
    file: &Path,
    database: Option<DatabaseKind>,
    timestamps: Option<bool>,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let requirements =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    let mut options = config.design.clone();
    if let Some(database) = database {
        options.database = database;
    }
    if let Some(timestamps) = timestamps {
        options.include_timestamps = timestamps;
    }

    let schema = design_schema(&requirements, &options);
    if schema.is_empty() {
        eprintln!("{}", "⚠ No entities recognized in the requirements".yellow());
    }

    let json = schema.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            if verbose {
                eprintln!("{} {}", "Schema saved to:".green(), path.display());
            }
        }
        None => println!("{}", json),
    }

    if verbose {
        eprintln!("{} {}", "Objects:".bold(), schema.object_names().join(", "));
    }
    Ok(())
}

fn migrate_command(config: &Config, path: &Path, description: Option<String>) -> Result<()> {
    let schema = read_schema(path)?;
    let description = description.unwrap_or_else(|| config.migration.description.clone());
    print_json(&generate_migration(&schema, &description))
}

fn normalize_command(path: &Path, verbose: bool) -> Result<()> {
    let suggestions = normalize_schema(&read_schema(path)?);

    if verbose {
        for suggestion in &suggestions {
            eprintln!(
                "  {} {}",
                suggestion.kind.as_str().yellow(),
                suggestion.description
            );
        }
    }
    print_json(&suggestions)
}

fn validate_command(config: &Config, path: &Path) -> Result<()> {
    let result = validate_schema_with(&read_schema(path)?, &config.validation);

    print_json(&result)?;
    print_validation_summary(&result);

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn print_validation_summary(result: &ValidationResult) {
    eprintln!();
    for issue in result.errors.iter().chain(&result.warnings) {
        let location = match (&issue.table, &issue.column) {
            (Some(table), Some(column)) => format!("{}.{}", table, column),
            (Some(table), None) => table.clone(),
            _ => String::new(),
        };
        let code = match issue.severity {
            Severity::Error => issue.code.as_str().red(),
            Severity::Warn => issue.code.as_str().yellow(),
        };
        eprintln!("  {} {} {}", code, location.bold(), issue.message);
    }

    if result.valid {
        eprintln!(
            "{} ({} warnings)",
            "✓ Schema is valid".green(),
            result.warnings.len()
        );
    } else {
        eprintln!(
            "{} {} errors, {} warnings",
            "✗".red(),
            result.errors.len(),
            result.warnings.len()
        );
    }
}

fn seed_command(config: &Config, path: &Path, records: Option<usize>, sql: bool) -> Result<()> {
    let schema = read_schema(path)?;

    let mut options = config.seed.clone();
    if let Some(records) = records {
        options.records_per_table = records;
    }
    let seeds = generate_seed_data_with(&schema, &options);

    let database = schema.database();
    if sql && database != DatabaseKind::Mongodb {
        println!("{}", seed_to_sql(&seeds, database));
        Ok(())
    } else {
        if sql {
            eprintln!("{}", "⚠ --sql ignored for document schemas".yellow());
        }
        print_json(&seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_design_flags() {
        let cli = Cli::try_parse_from([
            "schemawright",
            "design",
            "reqs.txt",
            "--database",
            "mongo",
            "--timestamps",
            "false",
        ])
        .unwrap();

        match cli.command {
            Commands::Design {
                file,
                database,
                timestamps,
                output,
            } => {
                assert_eq!(file, PathBuf::from("reqs.txt"));
                assert_eq!(database, Some(DatabaseKind::Mongodb));
                assert_eq!(timestamps, Some(false));
                assert!(output.is_none());
            }
            _ => panic!("expected design"),
        }
    }

    #[test]
    fn bare_timestamps_flag() {
        let cli = Cli::try_parse_from(["schemawright", "design", "reqs.txt", "--timestamps"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Design {
                timestamps: Some(true),
                ..
            }
        ));

        let cli = Cli::try_parse_from(["schemawright", "design", "reqs.txt"]).unwrap();
        assert!(matches!(cli.command, Commands::Design { timestamps: None, .. }));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["schemawright", "seed", "s.json", "--records", "3", "--sql", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Seed {
                records: Some(3),
                sql: true,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_database() {
        assert!(Cli::try_parse_from(["schemawright", "design", "r.txt", "-d", "oracle"]).is_err());
    }
}
