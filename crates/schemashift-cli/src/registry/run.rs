use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use schemashift_convert::{ConversionReport, ConvertOptions};

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub dry_run: bool,
    pub options: ConvertOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig<'a> {
    pub run_id: &'a str,
    pub started_at: String,
    pub input: &'a Path,
    pub output: &'a Path,
    pub dry_run: bool,
    pub options: &'a ConvertOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Create `<run_dir>/<timestamp>__convert_<short id>/` and write `config.json`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let short_id: String = ctx.run_id.chars().take(8).collect();
    let root = ctx
        .run_dir
        .join(format!("{timestamp}__convert_{short_id}"));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");
    let summary_path = root.join("summary.json");

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        input: &ctx.input,
        output: &ctx.output,
        dry_run: ctx.dry_run,
        options: &ctx.options,
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        logs_path,
        summary_path,
    })
}

pub fn write_summary(paths: &RunPaths, report: &ConversionReport) -> RegistryResult<()> {
    write_json(&paths.summary_path, report)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashift_convert::convert;

    #[test]
    fn creates_run_directory_with_artifacts() {
        let run_dir = std::env::temp_dir().join(format!("schemashift_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "0123456789abcdef".to_string(),
            started_at: Utc::now(),
            run_dir: run_dir.clone(),
            input: PathBuf::from("drizzle/schema.ts"),
            output: PathBuf::from("prisma/schema.prisma"),
            dry_run: true,
            options: ConvertOptions::default(),
        };

        let paths = start_run(&ctx).expect("start run");
        let name = paths.root.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("__convert_01234567"));
        assert!(paths.logs_path.exists());

        let config: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.root.join("config.json")).unwrap())
                .unwrap();
        assert_eq!(config["run_id"], "0123456789abcdef");
        assert_eq!(config["dry_run"], true);
        assert_eq!(config["options"]["identity"], "uuid");

        let conversion = convert("", &ConvertOptions::default()).unwrap();
        write_summary(&paths, &conversion.report).expect("summary");
        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.summary_path).unwrap()).unwrap();
        assert_eq!(summary["dialect"], "mysql");

        std::fs::remove_dir_all(run_dir).ok();
    }
}
