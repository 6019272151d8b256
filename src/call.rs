//! The intercepted syscall as seen by the filter engine
//!
//! The ptrace loop and argument decoder live outside this crate; they fill
//! in a [`SyscallStop`] for every syscall-entry stop and hand it to
//! [`crate::engine::FilterEngine::filter_syscall`].

use crate::action::QualFlags;
use serde::Serialize;
use std::path::PathBuf;

/// One syscall-entry stop of one traced process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyscallStop {
    pub pid: i32,
    /// Index into [`crate::syscalls::Personalities`]
    pub personality: usize,
    /// Raw syscall number; values outside every table are legal
    pub number: u64,
    pub args: [u64; 6],
    /// Path arguments already decoded from the tracee, for path tracing
    pub paths: Vec<PathBuf>,
    /// Actions decided for this call so far
    pub qual: QualFlags,
}

impl SyscallStop {
    pub fn new(personality: usize, number: u64) -> Self {
        Self {
            personality,
            number,
            ..Self::default()
        }
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_args(mut self, args: [u64; 6]) -> Self {
        self.args = args;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Argument `index` interpreted as a C `int` (descriptors)
    pub fn int_arg(&self, index: usize) -> i32 {
        self.args[index] as i32
    }

    /// Trace action decided to show this call
    pub fn is_traced(&self) -> bool {
        self.qual.contains(QualFlags::TRACE)
    }

    /// No injection has been decided for this call yet
    pub fn not_injected(&self) -> bool {
        !self.qual.contains(QualFlags::INJECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let call = SyscallStop::new(1, 257)
            .with_pid(42)
            .with_args([u64::MAX, 2, 0, 0, 0, 0])
            .with_path("/etc/hosts");
        assert_eq!(call.pid, 42);
        assert_eq!(call.personality, 1);
        assert_eq!(call.int_arg(0), -1);
        assert_eq!(call.int_arg(1), 2);
        assert_eq!(call.paths, vec![PathBuf::from("/etc/hosts")]);
    }

    #[test]
    fn test_prefilter_predicates() {
        let mut call = SyscallStop::new(0, 0);
        assert!(!call.is_traced());
        assert!(call.not_injected());
        call.qual |= QualFlags::TRACE | QualFlags::INJECT;
        assert!(call.is_traced());
        assert!(!call.not_injected());
    }
}
