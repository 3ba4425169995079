use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use crate::workspace::{WorkspaceError, write_bytes_atomic};

const DISABLED_CALL_PATTERN: &str =
    r"//[ \t]*TODO:[ \t]*Fix audit log[ \t]*\r?\n[ \t]*//[ \t]*await auditService\.createAuditLog\(";
const ENABLED_CALL: &str = "await auditService.logAction(";

#[derive(Debug, Error)]
pub enum AuditCallError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: WorkspaceError,
    },
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Number of calls re-enabled in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub rewrites: usize,
}

/// Rewrites disabled audit-log calls into enabled `logAction` calls.
#[derive(Debug)]
pub struct AuditCallRewriter {
    pattern: Regex,
}

impl AuditCallRewriter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(DISABLED_CALL_PATTERN)?,
        })
    }

    /// Returns the rewritten text and the number of replacements.
    pub fn rewrite(&self, text: &str) -> (String, usize) {
        let count = self.pattern.find_iter(text).count();
        if count == 0 {
            return (text.to_string(), 0);
        }
        let rewritten = self.pattern.replace_all(text, ENABLED_CALL).into_owned();
        (rewritten, count)
    }

    /// Rewrite one file in place. Files without matches are left untouched.
    pub fn rewrite_file(&self, path: &Path) -> Result<FileRewrite, AuditCallError> {
        let text = std::fs::read_to_string(path).map_err(|source| AuditCallError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let (rewritten, rewrites) = self.rewrite(&text);
        if rewrites > 0 {
            write_bytes_atomic(path, rewritten.as_bytes()).map_err(|source| {
                AuditCallError::Write {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        }

        tracing::info!(event = "audit_calls_restored", path = %path.display(), rewrites);
        Ok(FileRewrite {
            path: path.to_path_buf(),
            rewrites,
        })
    }
}

/// Rewrite every file in `paths`, stopping at the first failure.
pub fn restore_audit_calls(paths: &[PathBuf]) -> Result<Vec<FileRewrite>, AuditCallError> {
    let rewriter = AuditCallRewriter::new()?;
    paths
        .iter()
        .map(|path| rewriter.rewrite_file(path))
        .collect()
}
