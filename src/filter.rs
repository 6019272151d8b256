//! Filters attached to filter actions
//!
//! A filter turns one intercepted syscall into a boolean:
//! - `syscall`: syscall number, one [`NumberSet`] per personality
//! - `fd`: descriptor arguments, used by `read=` and `write=`
//! - `path`: decoded path arguments, used by path tracing (`-P`)

use crate::call::SyscallStop;
use crate::error::Result;
use crate::number_set::NumberSet;
use crate::selector::{parse_set, parse_syscall_set, string_to_uint};
use crate::syscalls::{Personalities, SyscallClass};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Filter kinds a clause can attach to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Syscall,
    Fd,
    Path,
}

impl FilterType {
    pub fn name(self) -> &'static str {
        match self {
            FilterType::Syscall => "syscall",
            FilterType::Fd => "fd",
            FilterType::Path => "path",
        }
    }
}

/// Paths selected for path tracing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathSet {
    paths: Vec<PathBuf>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a path; duplicates are ignored
    pub fn select(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Whether any decoded path argument of `call` is selected
    pub fn matches(&self, call: &SyscallStop) -> bool {
        call.paths.iter().any(|path| self.contains(path))
    }
}

/// A filter with its per-kind matcher state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    Syscall { sets: Vec<NumberSet> },
    Fd { set: NumberSet },
    Path { paths: PathSet },
}

impl Filter {
    /// Parse `spec` into a new filter of type `ty`
    pub fn parse(
        ty: FilterType,
        spec: &str,
        personalities: &Personalities,
        qualify_mode: bool,
    ) -> Result<Self> {
        match ty {
            FilterType::Syscall => {
                let mut sets = vec![NumberSet::new(); personalities.len()];
                parse_syscall_set(spec, &mut sets, personalities, qualify_mode)?;
                Ok(Filter::Syscall { sets })
            }
            FilterType::Fd => {
                let mut set = NumberSet::new();
                parse_set(spec, &mut set, string_to_uint, "descriptor", qualify_mode)?;
                Ok(Filter::Fd { set })
            }
            FilterType::Path => {
                let mut paths = PathSet::new();
                paths.select(spec);
                Ok(Filter::Path { paths })
            }
        }
    }

    /// Syscall filter selecting every number in every personality
    pub fn all_syscalls(personalities: &Personalities) -> Self {
        let mut sets = vec![NumberSet::new(); personalities.len()];
        for set in &mut sets {
            set.invert();
        }
        Filter::Syscall { sets }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            Filter::Syscall { .. } => FilterType::Syscall,
            Filter::Fd { .. } => FilterType::Fd,
            Filter::Path { .. } => FilterType::Path,
        }
    }

    /// Evaluate the filter against one call
    pub fn run(&self, call: &SyscallStop, personalities: &Personalities) -> bool {
        match self {
            Filter::Syscall { sets } => match sets.get(call.personality) {
                Some(set) => number_in_set(call.number, set),
                None => false,
            },
            Filter::Fd { set } => match_fd(call, personalities, set),
            Filter::Path { paths } => paths.matches(call),
        }
    }
}

/// Membership for values that may not fit the set's index type
fn number_in_set(number: u64, set: &NumberSet) -> bool {
    u32::try_from(number).map_or(set.is_inverted(), |n| set.contains(n))
}

fn fd_in_set(fd: i32, set: &NumberSet) -> bool {
    if fd < 0 {
        return set.is_inverted();
    }
    set.contains(fd as u32)
}

/// Syscalls taking more than one descriptor, with the argument positions
static MULTI_FD_SYSCALLS: &[(&str, &[usize])] = &[
    ("dup2", &[0, 1]),
    ("dup3", &[0, 1]),
    ("sendfile", &[0, 1]),
    ("tee", &[0, 1]),
    ("kexec_file_load", &[0, 1]),
    ("splice", &[0, 2]),
    ("copy_file_range", &[0, 2]),
    ("epoll_ctl", &[0, 2]),
    ("linkat", &[0, 2]),
    ("renameat", &[0, 2]),
    ("renameat2", &[0, 2]),
    ("symlinkat", &[1]),
    ("mmap", &[4]),
    // Not descriptor-class, but dumped by read=/write=.
    ("mq_timedsend", &[0]),
    ("mq_timedreceive", &[0]),
];

fn match_fd(call: &SyscallStop, personalities: &Personalities, set: &NumberSet) -> bool {
    let Some(entry) = personalities
        .get(call.personality)
        .and_then(|table| u32::try_from(call.number).ok().and_then(|n| table.get(n)))
    else {
        return false;
    };
    let Some(name) = entry.name else {
        return false;
    };

    if let Some((_, positions)) = MULTI_FD_SYSCALLS.iter().find(|(n, _)| *n == name) {
        return positions.iter().any(|&i| fd_in_set(call.int_arg(i), set));
    }
    entry.flags.contains(SyscallClass::DESC) && fd_in_set(call.int_arg(0), set)
}
