//! Selector resolution for syscall, descriptor and signal sets
//!
//! A syscall specification is a comma-separated list of tokens. Each token
//! is one of:
//! - a syscall number: `trace=0,1`
//! - a POSIX-style extended regex: `trace=/^open.*`
//! - a class mnemonic: `trace=%file`, or `trace=network` in qualify mode
//! - an exact syscall name: `trace=openat`
//!
//! A leading run of `?` makes a token best-effort. In qualify mode a
//! leading run of `!` inverts the whole specification, and the literals
//! `none` and `all` short-circuit tokenization.

use crate::error::{QualifyError, Result};
use crate::number_set::NumberSet;
use crate::syscalls::{Personalities, SyscallClass};
use regex::Regex;
use tracing::debug;

/// Class mnemonics and the flags a syscall must carry to match them
static SYSCALL_CLASSES: &[(&str, SyscallClass)] = &[
    ("desc", SyscallClass::DESC),
    ("file", SyscallClass::FILE),
    ("memory", SyscallClass::MEMORY),
    ("process", SyscallClass::PROCESS),
    ("signal", SyscallClass::SIGNAL),
    ("ipc", SyscallClass::IPC),
    ("network", SyscallClass::NETWORK),
    ("%desc", SyscallClass::DESC),
    ("%file", SyscallClass::FILE),
    ("%memory", SyscallClass::MEMORY),
    ("%process", SyscallClass::PROCESS),
    ("%signal", SyscallClass::SIGNAL),
    ("%ipc", SyscallClass::IPC),
    ("%network", SyscallClass::NETWORK),
    ("%stat", SyscallClass::STAT),
    ("%lstat", SyscallClass::LSTAT),
    ("%fstat", SyscallClass::FSTAT),
    ("%%stat", SyscallClass::STAT_LIKE),
    ("%statfs", SyscallClass::STATFS),
    ("%fstatfs", SyscallClass::FSTATFS),
    ("%%statfs", SyscallClass::STATFS_LIKE),
];

/// Look up a class mnemonic; bare spellings are only valid in qualify mode
pub fn lookup_class(name: &str, qualify_mode: bool) -> Option<SyscallClass> {
    if !qualify_mode && !name.starts_with('%') {
        return None;
    }
    SYSCALL_CLASSES
        .iter()
        .find(|(class, _)| *class == name)
        .map(|&(_, flags)| flags)
}

/// Parse a decimal number made of ASCII digits only, capped at `max`
pub fn string_to_uint_upto(s: &str, max: u32) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().filter(|&n| n <= max)
}

/// Parse a decimal number in `0..=i32::MAX`
pub fn string_to_uint(s: &str) -> Option<u32> {
    string_to_uint_upto(s, i32::MAX as u32)
}

/// One syscall selector token, classified by resolution strategy
#[derive(Debug)]
pub enum Selector<'a> {
    Number(u32),
    Regex(Regex),
    Class(SyscallClass),
    Name(&'a str),
}

impl<'a> Selector<'a> {
    /// Classify a token. `Ok(None)` means the token cannot resolve at all
    /// (e.g. a malformed number); a bad regex is a hard error.
    pub fn parse(token: &'a str, qualify_mode: bool) -> Result<Option<Self>> {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok(string_to_uint(token).map(Selector::Number));
        }
        if let Some(pattern) = token.strip_prefix('/') {
            let regex = Regex::new(pattern).map_err(|source| QualifyError::Regex {
                stage: "regcomp",
                pattern: pattern.to_string(),
                source: Box::new(source),
            })?;
            return Ok(Some(Selector::Regex(regex)));
        }
        if let Some(class) = lookup_class(token, qualify_mode) {
            return Ok(Some(Selector::Class(class)));
        }
        Ok(Some(Selector::Name(token)))
    }

    /// Add matching syscall numbers to `sets`, one per personality.
    /// Returns whether the selector resolved.
    pub fn resolve(&self, sets: &mut [NumberSet], personalities: &Personalities) -> bool {
        let mut found = false;
        for (set, table) in sets.iter_mut().zip(personalities.iter()) {
            match self {
                Selector::Number(n) => {
                    if (*n as usize) < table.len() {
                        set.add(*n);
                        found = true;
                    }
                }
                Selector::Regex(regex) => {
                    for (n, name, _) in table.iter() {
                        if regex.is_match(name) {
                            set.add(n);
                            found = true;
                        }
                    }
                }
                Selector::Class(class) => {
                    for (n, _, flags) in table.iter() {
                        if flags.contains(*class) {
                            set.add(n);
                        }
                    }
                }
                Selector::Name(wanted) => {
                    for (n, name, _) in table.iter() {
                        if name == *wanted {
                            set.add(n);
                            found = true;
                        }
                    }
                }
            }
        }
        // A known class resolves even when no syscall carries its flags.
        found || matches!(self, Selector::Class(_))
    }
}

/// Resolve a single token, honoring the `?` best-effort prefix.
/// Returns `(resolved, tolerated)`.
fn parse_syscall_token(
    token: &str,
    sets: &mut [NumberSet],
    personalities: &Personalities,
    qualify_mode: bool,
) -> Result<(bool, bool)> {
    let stripped = token.trim_start_matches('?');
    let best_effort = stripped.len() != token.len();

    let resolved = match Selector::parse(stripped, qualify_mode)? {
        Some(selector) => selector.resolve(sets, personalities),
        None => false,
    };
    debug!(token, resolved, best_effort, "resolved syscall selector");
    Ok((resolved, resolved || best_effort))
}

/// Strip leading `!` markers (qualify mode only) and report how many there were
fn strip_negations(spec: &str, qualify_mode: bool) -> (usize, &str) {
    if !qualify_mode {
        return (0, spec);
    }
    let rest = spec.trim_start_matches('!');
    (spec.len() - rest.len(), rest)
}

fn invert_all(sets: &mut [NumberSet]) {
    for set in sets {
        set.invert();
    }
}

/// Add syscall numbers to `sets` (one per personality) according to `spec`
pub fn parse_syscall_set(
    spec: &str,
    sets: &mut [NumberSet],
    personalities: &Personalities,
    qualify_mode: bool,
) -> Result<()> {
    debug_assert_eq!(sets.len(), personalities.len());

    let (negations, rest) = strip_negations(spec, qualify_mode);
    for _ in 0..negations {
        invert_all(sets);
    }

    match rest {
        "none" => return Ok(()),
        "all" => {
            invert_all(sets);
            return Ok(());
        }
        _ => {}
    }

    let mut any_resolved = false;
    for token in rest.split(',').filter(|t| !t.is_empty()) {
        let (resolved, tolerated) =
            parse_syscall_token(token, sets, personalities, qualify_mode)?;
        if !tolerated {
            return Err(QualifyError::InvalidSyscall(token.to_string()));
        }
        any_resolved |= resolved;
    }

    if !any_resolved {
        return Err(QualifyError::InvalidSyscall(spec.to_string()));
    }
    Ok(())
}

/// Add numbers to `set` according to `spec`, resolving each token with `resolve`
pub fn parse_set<F>(
    spec: &str,
    set: &mut NumberSet,
    resolve: F,
    kind: &'static str,
    qualify_mode: bool,
) -> Result<()>
where
    F: Fn(&str) -> Option<u32>,
{
    let (negations, rest) = strip_negations(spec, qualify_mode);
    for _ in 0..negations {
        set.invert();
    }

    match rest {
        "none" => return Ok(()),
        "all" => {
            set.invert();
            return Ok(());
        }
        _ => {}
    }

    let mut added = false;
    for token in rest.split(',').filter(|t| !t.is_empty()) {
        let number = resolve(token).ok_or_else(|| QualifyError::InvalidNumber {
            kind,
            token: token.to_string(),
        })?;
        set.add(number);
        added = true;
    }

    if !added {
        return Err(QualifyError::InvalidNumber {
            kind,
            token: spec.to_string(),
        });
    }
    Ok(())
}
