mod audit_calls;
mod registry;
mod workspace;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use schemashift_convert::{
    ConvertError, ConvertOptions, IdentityPolicy, convert, render_summary, repair_generated_schema,
};
use schemashift_extract::DialectKind;
use thiserror::Error;
use uuid::Uuid;

use audit_calls::{AuditCallError, restore_audit_calls};
use registry::{RunContext, init_run_logging, init_stderr_logging, start_run, write_summary};
use workspace::{WorkspaceError, load_settings, write_bytes_atomic};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),
    #[error("audit call rewrite error: {0}")]
    AuditCalls(#[from] AuditCallError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "schemashift", version, about = "Drizzle to Prisma schema converter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a source schema document into a target schema document.
    Convert(ConvertArgs),
    /// Remove stray closing braces from a previously generated schema.
    FixSchema(FixSchemaArgs),
    /// Re-enable commented-out audit-log calls in router sources.
    RestoreAuditCalls(RestoreAuditCallsArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Source schema document.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Target schema document.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Settings file (defaults to ./schemashift.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    dialect: Option<DialectArg>,
    /// Primary-key typing policy.
    #[arg(long, value_enum)]
    identity: Option<IdentityArg>,
    /// Table identifier to skip (repeatable).
    #[arg(long, value_name = "TABLE")]
    exclude: Vec<String>,
    /// Do not append the audit fields to every model.
    #[arg(long, default_value_t = false)]
    no_audit_fields: bool,
    /// Directory that receives run artifacts.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Convert and report without writing the output file.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct FixSchemaArgs {
    /// Generated schema to repair.
    path: PathBuf,
    /// Write the repaired document here instead of in place.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RestoreAuditCallsArgs {
    /// Files to rewrite in place.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DialectArg {
    Auto,
    Mysql,
    Pg,
}

impl From<DialectArg> for DialectKind {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Auto => DialectKind::Auto,
            DialectArg::Mysql => DialectKind::MySql,
            DialectArg::Pg => DialectKind::Pg,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IdentityArg {
    Uuid,
    Preserve,
}

impl From<IdentityArg> for IdentityPolicy {
    fn from(value: IdentityArg) -> Self {
        match value {
            IdentityArg::Uuid => IdentityPolicy::Uuid,
            IdentityArg::Preserve => IdentityPolicy::Preserve,
        }
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::FixSchema(args) => run_fix_schema(args),
        Command::RestoreAuditCalls(args) => run_restore_audit_calls(args),
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), CliError> {
    let ConvertArgs {
        input,
        output,
        config,
        dialect,
        identity,
        exclude,
        no_audit_fields,
        run_dir,
        dry_run,
    } = args;

    let settings = load_settings(config.as_deref())?;
    let input = input.unwrap_or(settings.paths.input);
    let output = output.unwrap_or(settings.paths.output);
    let options = apply_overrides(settings.convert, dialect, identity, exclude, no_audit_fields)?;

    if input == output {
        return Err(CliError::InvalidConfig(format!(
            "input and output are the same file: {}",
            input.display()
        )));
    }

    let run_paths = match run_dir {
        Some(run_dir) => {
            let ctx = RunContext {
                run_id: Uuid::new_v4().simple().to_string(),
                started_at: chrono::Utc::now(),
                run_dir,
                input: input.clone(),
                output: output.clone(),
                dry_run,
                options: options.clone(),
            };
            let paths = start_run(&ctx)?;
            init_run_logging(&paths.logs_path)?;
            tracing::info!(
                event = "run_started",
                run_id = %ctx.run_id,
                run_dir = %paths.root.display()
            );
            Some(paths)
        }
        None => {
            init_stderr_logging()?;
            None
        }
    };

    let timer = Instant::now();
    tracing::info!(event = "conversion_started", input = %input.display());

    let source = read_text(&input)?;
    let conversion = convert(&source, &options)?;

    if dry_run {
        tracing::info!(event = "output_skipped", reason = "dry_run");
    } else {
        write_bytes_atomic(&output, conversion.document.as_bytes())?;
        tracing::info!(event = "output_written", path = %output.display());
    }

    if let Some(paths) = &run_paths {
        write_summary(paths, &conversion.report)?;
        tracing::info!(event = "summary_written", path = %paths.summary_path.display());
    }

    println!("{}", render_summary(&conversion.report));
    if !dry_run {
        println!("\nOutput: {}", output.display());
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

fn apply_overrides(
    mut options: ConvertOptions,
    dialect: Option<DialectArg>,
    identity: Option<IdentityArg>,
    exclude: Vec<String>,
    no_audit_fields: bool,
) -> Result<ConvertOptions, CliError> {
    if let Some(dialect) = dialect {
        options.dialect = dialect.into();
    }
    if let Some(identity) = identity {
        options.identity = identity.into();
    }
    options.exclude.extend(exclude);
    if no_audit_fields {
        options.audit_fields = false;
    }
    if options.column_width == 0 {
        return Err(CliError::InvalidConfig(
            "column_width must be at least 1".to_string(),
        ));
    }
    Ok(options)
}

fn run_fix_schema(args: FixSchemaArgs) -> Result<(), CliError> {
    init_stderr_logging()?;

    let text = read_text(&args.path)?;
    let repair = repair_generated_schema(&text)?;
    let target = args.output.as_deref().unwrap_or(&args.path);

    if repair.repaired > 0 || target != args.path.as_path() {
        write_bytes_atomic(target, repair.text.as_bytes())?;
    }
    tracing::info!(
        event = "schema_fixed",
        path = %target.display(),
        repaired = repair.repaired
    );

    println!(
        "Repaired {} model block(s): {}",
        repair.repaired,
        target.display()
    );
    Ok(())
}

fn run_restore_audit_calls(args: RestoreAuditCallsArgs) -> Result<(), CliError> {
    init_stderr_logging()?;

    let results = restore_audit_calls(&args.paths)?;
    let total: usize = results.iter().map(|result| result.rewrites).sum();
    for result in &results {
        println!("{:>4}  {}", result.rewrites, result.path.display());
    }
    println!("Restored {total} audit call(s) in {} file(s)", results.len());
    Ok(())
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "schemashift",
            "convert",
            "--input",
            "db/schema.ts",
            "--dialect",
            "pg",
            "--identity",
            "preserve",
            "--exclude",
            "users",
            "--exclude",
            "sessions",
            "--no-audit-fields",
            "--dry-run",
        ])
        .unwrap();

        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, Some(PathBuf::from("db/schema.ts")));
        assert_eq!(args.exclude, vec!["users".to_string(), "sessions".to_string()]);
        assert!(args.no_audit_fields);
        assert!(args.dry_run);

        let options = apply_overrides(
            ConvertOptions::default(),
            args.dialect,
            args.identity,
            args.exclude,
            args.no_audit_fields,
        )
        .unwrap();
        assert_eq!(options.dialect, DialectKind::Pg);
        assert_eq!(options.identity, IdentityPolicy::Preserve);
        assert!(!options.audit_fields);
        assert_eq!(options.exclude.len(), 2);
    }

    #[test]
    fn flags_extend_configured_exclusions() {
        let mut configured = ConvertOptions::default();
        configured.exclude.insert("auditLogs".to_string());

        let options =
            apply_overrides(configured, None, None, vec!["users".to_string()], false).unwrap();

        assert!(options.exclude.contains("auditLogs"));
        assert!(options.exclude.contains("users"));
        assert!(options.audit_fields);
    }

    #[test]
    fn zero_column_width_is_rejected() {
        let configured = ConvertOptions {
            column_width: 0,
            ..ConvertOptions::default()
        };
        let err = apply_overrides(configured, None, None, Vec::new(), false).unwrap_err();

        assert!(matches!(err, CliError::InvalidConfig(_)));
    }

    #[test]
    fn restore_requires_paths() {
        assert!(Cli::try_parse_from(["schemashift", "restore-audit-calls"]).is_err());
    }
}
