//! TOML configuration files
//!
//! # Example sysqual.toml
//!
//! ```toml
//! expressions = [
//!     "trace=%file,%network",
//!     "fault=openat:error=ENOENT:when=2+",
//! ]
//! paths = ["/etc/resolv.conf"]
//! ```

use crate::engine::{EngineBuilder, FilterEngine};
use crate::syscalls::Personalities;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Qualifier clauses and traced paths loaded from a file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Qualifier clauses, applied in order
    #[serde(default)]
    pub expressions: Vec<String>,

    /// Paths selected for path tracing
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl FilterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Append clauses and paths given on the command line
    pub fn extend(&mut self, expressions: &[String], paths: &[PathBuf]) {
        self.expressions.extend_from_slice(expressions);
        self.paths.extend_from_slice(paths);
    }

    /// Feed every clause and path into `builder`
    pub fn apply(&self, builder: &mut EngineBuilder) -> crate::Result<()> {
        for expr in &self.expressions {
            builder.qualify(expr)?;
        }
        for path in &self.paths {
            builder.trace_path(path.clone());
        }
        Ok(())
    }

    /// Build a finalized engine for `personalities`
    pub fn build(&self, personalities: Personalities) -> crate::Result<FilterEngine> {
        let mut builder = EngineBuilder::new(personalities);
        self.apply(&mut builder)?;
        Ok(builder.finish())
    }
}
