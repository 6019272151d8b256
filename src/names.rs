//! Signal and errno symbolic names
//!
//! Symbolic lookups are case-insensitive. Signal names may be given with or
//! without the `SIG` prefix.

use crate::selector::string_to_uint_upto;
use nix::errno::Errno;
use nix::sys::signal::Signal;

/// Highest signal number accepted by `signal=` (kernel sigset width)
pub const MAX_SIGNAL: u32 = 64;

/// Highest errno value accepted by `error=`
pub const MAX_ERRNO_VALUE: u32 = 4095;

/// Highest value probed when resolving errno names
const MAX_NAMED_ERRNO: i32 = 200;

/// Name of signal `signo`, e.g. `SIGINT`
pub fn signal_name(signo: u32) -> Option<&'static str> {
    i32::try_from(signo)
        .ok()
        .and_then(|n| Signal::try_from(n).ok())
        .map(Signal::as_str)
}

/// Resolve a symbolic signal name (`INT`, `sigint`, `SIGINT`) to its number
pub fn signal_by_name(name: &str) -> Option<u32> {
    let bare = strip_sig_prefix(name);
    Signal::iterator()
        .find(|sig| strip_sig_prefix(sig.as_str()).eq_ignore_ascii_case(bare))
        .map(|sig| sig as i32 as u32)
}

/// Resolve a signal given numerically (`0..=255`) or by name
pub fn signal_number(token: &str) -> Option<u32> {
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return string_to_uint_upto(token, 255);
    }
    signal_by_name(token)
}

fn strip_sig_prefix(name: &str) -> &str {
    match name.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("SIG") => &name[3..],
        _ => name,
    }
}

/// Resolve a symbolic errno name (`EIO`, `enoent`) to its positive value
pub fn errno_by_name(name: &str) -> Option<u32> {
    (1..=MAX_NAMED_ERRNO)
        .map(Errno::from_raw)
        .filter(|errno| *errno != Errno::UnknownErrno)
        .find(|errno| format!("{errno:?}").eq_ignore_ascii_case(name))
        .map(|errno| errno as i32 as u32)
}

/// Positive value of ENOSYS, the default `fault=` error
pub fn enosys() -> u32 {
    Errno::ENOSYS as i32 as u32
}
