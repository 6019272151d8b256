//! CLI argument parsing for Sysqual

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the resolved configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sysqual")]
#[command(version)]
#[command(about = "Resolve strace-style qualifier expressions into filter actions", long_about = None)]
pub struct Cli {
    /// Qualifier clause (e.g., -e trace=open,read or -e fault=openat:error=ENOENT)
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub expressions: Vec<String>,

    /// Trace only syscalls touching PATH
    #[arg(short = 'P', long = "path", value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Load qualifier clauses from a TOML file (applied before -e)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Simulate dispatch of SYSCALL (name or number) and report fired actions
    #[arg(long = "check", value_name = "SYSCALL")]
    pub check: Vec<String>,

    /// First argument (descriptor) of simulated calls
    #[arg(long = "fd", value_name = "FD", allow_negative_numbers = true)]
    pub fd: Option<i32>,

    /// Decoded path argument of simulated calls
    #[arg(long = "with-path", value_name = "PATH")]
    pub with_path: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_repeated_expressions() {
        let cli = Cli::parse_from(["sysqual", "-e", "trace=open", "-e", "fault=read"]);
        assert_eq!(cli.expressions, vec!["trace=open", "fault=read"]);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["sysqual"]);
        assert!(cli.expressions.is_empty());
        assert!(cli.paths.is_empty());
        assert!(cli.config.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_check_and_fd() {
        let cli = Cli::parse_from(["sysqual", "--check", "read", "--check", "1", "--fd", "-1"]);
        assert_eq!(cli.check, vec!["read", "1"]);
        assert_eq!(cli.fd, Some(-1));
    }

    #[test]
    fn test_cli_paths_and_format() {
        let cli = Cli::parse_from(["sysqual", "-P", "/etc/passwd", "--format", "json"]);
        assert_eq!(cli.paths, vec![PathBuf::from("/etc/passwd")]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_debug_flag() {
        let cli = Cli::parse_from(["sysqual", "--debug"]);
        assert!(cli.debug);
    }
}
