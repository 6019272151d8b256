//! Sysqual - strace-compatible syscall qualifiers and filter actions
//!
//! This library turns `-e` qualifier clauses (`trace=%file`,
//! `fault=openat:error=ENOENT:when=2+`, `read=3`, ...) into a finalized
//! filter engine, and decides for every intercepted syscall which actions
//! (trace, inject, fault, read, write, raw, abbrev, verbose) apply.

pub mod action;
pub mod call;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod filter;
pub mod inject;
pub mod names;
pub mod number_set;
pub mod qualify;
pub mod selector;
pub mod syscalls;

pub use error::{QualifyError, Result};
