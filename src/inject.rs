//! `fault=` and `inject=` argument grammar
//!
//! Arguments are a list of tokens separated by `:` (qualify mode) or `;`:
//! - `when=F`, `when=F+`, `when=F+S`: rate control
//! - `error=EIO` or `error=5`: force a failing return
//! - `retval=N` (inject only): force a successful return value
//! - `signal=SIGUSR1` (inject only): deliver a signal
//!
//! `fault=` without a forced outcome defaults to `error=ENOSYS`; `inject=`
//! requires at least one of `error=`, `retval=` or `signal=`.

use crate::names::{enosys, errno_by_name, signal_number, MAX_ERRNO_VALUE, MAX_SIGNAL};
use crate::selector::{string_to_uint, string_to_uint_upto};
use serde::Serialize;

/// Upper bound for `when=` first occurrence and step
const MAX_WHEN: u32 = 0xffff;

/// Outcome forced on an injected syscall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedResult {
    /// Leave the return value alone
    Unset,
    /// Fail with this (positive) errno value
    Error(u32),
    /// Return this non-negative value
    Retval(u32),
}

impl ForcedResult {
    /// Raw return value as the kernel would report it
    pub fn raw_value(self) -> Option<i64> {
        match self {
            ForcedResult::Unset => None,
            ForcedResult::Error(errno) => Some(-i64::from(errno)),
            ForcedResult::Retval(value) => Some(i64::from(value)),
        }
    }
}

/// Injection options carried by a `fault`/`inject` action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InjectOpts {
    /// First occurrence to inject, 1-based
    pub first: u32,
    /// Inject every `step` occurrences after `first`; 0 means once
    pub step: u32,
    pub result: ForcedResult,
    /// Signal to deliver, 0 for none
    pub signal: u32,
}

impl Default for InjectOpts {
    fn default() -> Self {
        Self {
            first: 1,
            step: 1,
            result: ForcedResult::Unset,
            signal: 0,
        }
    }
}

impl InjectOpts {
    /// Whether the `occurrence`-th (1-based) matching call is selected.
    ///
    /// Occurrence counting belongs to whoever applies the injection.
    pub fn fires_on(&self, occurrence: u32) -> bool {
        if occurrence < self.first {
            return false;
        }
        if occurrence == self.first {
            return true;
        }
        self.step != 0 && (occurrence - self.first) % self.step == 0
    }

    /// Apply one token to the options; `false` rejects the whole argument string
    fn apply_token(&mut self, token: &str, fault_tokens_only: bool) -> bool {
        if let Some(value) = token.strip_prefix("when=") {
            let (first, step) = match value.split_once('+') {
                Some((first, step)) => (first, Some(step)),
                None => (value, None),
            };
            let Some(first) = string_to_uint_upto(first, MAX_WHEN).filter(|&n| n >= 1) else {
                return false;
            };
            self.first = first;
            self.step = match step {
                None => 0,
                Some("") => 1,
                Some(step) => match string_to_uint_upto(step, MAX_WHEN) {
                    Some(step) if step >= 1 => step,
                    _ => return false,
                },
            };
        } else if let Some(value) = token.strip_prefix("error=") {
            if self.result != ForcedResult::Unset {
                return false;
            }
            let errno = string_to_uint_upto(value, MAX_ERRNO_VALUE).or_else(|| errno_by_name(value));
            match errno {
                Some(errno) if errno >= 1 => self.result = ForcedResult::Error(errno),
                _ => return false,
            }
        } else if let Some(value) = token
            .strip_prefix("retval=")
            .filter(|_| !fault_tokens_only)
        {
            if self.result != ForcedResult::Unset {
                return false;
            }
            match string_to_uint(value) {
                Some(retval) => self.result = ForcedResult::Retval(retval),
                None => return false,
            }
        } else if let Some(value) = token
            .strip_prefix("signal=")
            .filter(|_| !fault_tokens_only)
        {
            match signal_number(value) {
                Some(signo) if (1..=MAX_SIGNAL).contains(&signo) => self.signal = signo,
                _ => return false,
            }
        } else {
            return false;
        }
        true
    }
}

/// Parse `fault=`/`inject=` arguments.
///
/// Returns `None` when any token is malformed or when `inject=` syntax names
/// no forced outcome; the caller reports that as a configuration error.
pub fn parse_inject_args(
    args: Option<&str>,
    fault_tokens_only: bool,
    qualify_mode: bool,
) -> Option<InjectOpts> {
    let delimiter = if qualify_mode { ':' } else { ';' };
    let mut opts = InjectOpts::default();

    let tokens = args
        .into_iter()
        .flat_map(|args| args.split(delimiter))
        .filter(|token| !token.is_empty());
    for token in tokens {
        if !opts.apply_token(token, fault_tokens_only) {
            return None;
        }
    }

    if opts.result == ForcedResult::Unset && opts.signal == 0 {
        if !fault_tokens_only {
            return None;
        }
        opts.result = ForcedResult::Error(enosys());
    }
    Some(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use nix::sys::signal::Signal;

    fn eio() -> u32 {
        Errno::EIO as i32 as u32
    }

    #[test]
    fn test_when_and_error() {
        let opts = parse_inject_args(Some("when=3+2:error=EIO"), true, true).unwrap();
        assert_eq!(opts.first, 3);
        assert_eq!(opts.step, 2);
        assert_eq!(opts.result, ForcedResult::Error(eio()));
        assert_eq!(opts.result.raw_value(), Some(-(eio() as i64)));
    }

    #[test]
    fn test_when_forms() {
        let once = parse_inject_args(Some("when=5"), true, true).unwrap();
        assert_eq!((once.first, once.step), (5, 0));
        let every = parse_inject_args(Some("when=5+"), true, true).unwrap();
        assert_eq!((every.first, every.step), (5, 1));

        for bad in ["when=0", "when=", "when=3+0", "when=65536", "when=3-1", "when=3+x"] {
            assert!(parse_inject_args(Some(bad), true, true).is_none(), "{bad}");
        }
    }

    #[test]
    fn test_fault_defaults_to_enosys() {
        let opts = parse_inject_args(None, true, true).unwrap();
        assert_eq!(opts.result, ForcedResult::Error(enosys()));
        assert_eq!((opts.first, opts.step), (1, 1));
    }

    #[test]
    fn test_inject_requires_outcome() {
        assert!(parse_inject_args(None, false, true).is_none());
        assert!(parse_inject_args(Some("when=2"), false, true).is_none());
    }

    #[test]
    fn test_result_clauses_are_exclusive() {
        assert!(parse_inject_args(Some("retval=0:error=EIO"), false, true).is_none());
        assert!(parse_inject_args(Some("error=EIO:error=EPERM"), true, true).is_none());
    }

    #[test]
    fn test_inject_only_tokens_rejected_for_fault() {
        assert!(parse_inject_args(Some("retval=0"), true, true).is_none());
        assert!(parse_inject_args(Some("signal=USR1"), true, true).is_none());
        let opts = parse_inject_args(Some("retval=7"), false, true).unwrap();
        assert_eq!(opts.result, ForcedResult::Retval(7));
    }

    #[test]
    fn test_error_numeric_and_symbolic() {
        let opts = parse_inject_args(Some("error=eio"), true, true).unwrap();
        assert_eq!(opts.result, ForcedResult::Error(eio()));
        let opts = parse_inject_args(Some("error=4095"), true, true).unwrap();
        assert_eq!(opts.result, ForcedResult::Error(4095));
        assert!(parse_inject_args(Some("error=0"), true, true).is_none());
        assert!(parse_inject_args(Some("error=4096"), true, true).is_none());
        assert!(parse_inject_args(Some("error=ENOTANERRNO"), true, true).is_none());
    }

    #[test]
    fn test_signal_only_injection() {
        let opts = parse_inject_args(Some("signal=SIGUSR1"), false, true).unwrap();
        assert_eq!(opts.signal, Signal::SIGUSR1 as i32 as u32);
        assert_eq!(opts.result, ForcedResult::Unset);
        assert!(parse_inject_args(Some("signal=0"), false, true).is_none());
        assert!(parse_inject_args(Some("signal=65"), false, true).is_none());
        assert!(parse_inject_args(Some("signal=64"), false, true).is_some());
    }

    #[test]
    fn test_unknown_token_rejected() {
        assert!(parse_inject_args(Some("error=EIO:bogus=1"), true, true).is_none());
    }

    #[test]
    fn test_delimiter_depends_on_mode() {
        let opts = parse_inject_args(Some("when=2;error=EIO"), true, false).unwrap();
        assert_eq!(opts.first, 2);
        assert!(parse_inject_args(Some("when=2;error=EIO"), true, true).is_none());
    }

    #[test]
    fn test_fires_on() {
        let opts = InjectOpts {
            first: 3,
            step: 2,
            ..InjectOpts::default()
        };
        let fired: Vec<u32> = (1..=9).filter(|&n| opts.fires_on(n)).collect();
        assert_eq!(fired, vec![3, 5, 7, 9]);

        let once = InjectOpts {
            first: 2,
            step: 0,
            ..InjectOpts::default()
        };
        let fired: Vec<u32> = (1..=9).filter(|&n| once.fires_on(n)).collect();
        assert_eq!(fired, vec![2]);
    }
}
