//! Filter action kinds and instances
//!
//! The set of action kinds is closed. Each kind has a fixed priority (0 runs
//! first), a qualifier flag recorded on calls it fires for, an optional
//! prefilter, and says whether it takes arguments. Argument-less kinds are
//! deduplicated by the engine; `inject` and `fault` get a new instance per
//! clause.

use crate::call::SyscallStop;
use crate::expression::BoolExpression;
use crate::filter::Filter;
use crate::inject::InjectOpts;
use crate::syscalls::Personalities;
use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

bitflags! {
    /// Per-call action decisions
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct QualFlags: u32 {
        const TRACE = 1 << 0;
        const ABBREV = 1 << 1;
        const VERBOSE = 1 << 2;
        const RAW = 1 << 3;
        const INJECT = 1 << 4;
        const READ = 1 << 5;
        const WRITE = 1 << 6;
    }
}

impl QualFlags {
    /// Actions enabled for every call unless a clause for them is given
    pub const DEFAULT: Self = Self::TRACE.union(Self::ABBREV).union(Self::VERBOSE);
}

/// Action kinds, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Trace,
    Inject,
    Fault,
    Read,
    Write,
    Raw,
    Abbrev,
    Verbose,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::Trace,
        ActionKind::Inject,
        ActionKind::Fault,
        ActionKind::Read,
        ActionKind::Write,
        ActionKind::Raw,
        ActionKind::Abbrev,
        ActionKind::Verbose,
    ];

    /// Look up a registry name (exact match, no aliases)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Trace => "trace",
            ActionKind::Inject => "inject",
            ActionKind::Fault => "fault",
            ActionKind::Read => "read",
            ActionKind::Write => "write",
            ActionKind::Raw => "raw",
            ActionKind::Abbrev => "abbrev",
            ActionKind::Verbose => "verbose",
        }
    }

    /// 0 is the highest priority
    pub fn priority(self) -> u32 {
        match self {
            ActionKind::Trace => 0,
            ActionKind::Inject | ActionKind::Fault => 1,
            ActionKind::Read
            | ActionKind::Write
            | ActionKind::Raw
            | ActionKind::Abbrev
            | ActionKind::Verbose => 2,
        }
    }

    pub fn qual_flag(self) -> QualFlags {
        match self {
            ActionKind::Trace => QualFlags::TRACE,
            ActionKind::Inject | ActionKind::Fault => QualFlags::INJECT,
            ActionKind::Read => QualFlags::READ,
            ActionKind::Write => QualFlags::WRITE,
            ActionKind::Raw => QualFlags::RAW,
            ActionKind::Abbrev => QualFlags::ABBREV,
            ActionKind::Verbose => QualFlags::VERBOSE,
        }
    }

    pub fn takes_args(self) -> bool {
        matches!(self, ActionKind::Inject | ActionKind::Fault)
    }

    /// Whether the action is enabled for every call by default
    pub fn default_enabled(self) -> bool {
        QualFlags::DEFAULT.contains(self.qual_flag())
    }

    /// Cheap check run before any filter; `false` skips the action entirely
    pub fn prefilter(self, call: &SyscallStop) -> bool {
        match self {
            ActionKind::Trace => true,
            ActionKind::Inject | ActionKind::Fault => call.not_injected(),
            ActionKind::Read
            | ActionKind::Write
            | ActionKind::Raw
            | ActionKind::Abbrev
            | ActionKind::Verbose => call.is_traced(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action-specific payload handed to the applier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionData {
    None,
    Inject(InjectOpts),
}

impl ActionData {
    pub fn inject_opts(&self) -> Option<&InjectOpts> {
        match self {
            ActionData::Inject(opts) => Some(opts),
            ActionData::None => None,
        }
    }
}

/// Performs the side effect of an action once the engine decided it applies
pub trait ActionHandler {
    fn apply(&mut self, call: &mut SyscallStop, kind: ActionKind, data: &ActionData);
}

impl<F> ActionHandler for F
where
    F: FnMut(&mut SyscallStop, ActionKind, &ActionData),
{
    fn apply(&mut self, call: &mut SyscallStop, kind: ActionKind, data: &ActionData) {
        self(call, kind, data)
    }
}

/// Handler that only records decisions in the call's qualifier flags
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionsOnly;

impl ActionHandler for DecisionsOnly {
    fn apply(&mut self, _call: &mut SyscallStop, _kind: ActionKind, _data: &ActionData) {}
}

/// One action instance with its filters and expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterAction {
    /// Creation order, used to run later instances of equal priority first
    pub id: u32,
    pub kind: ActionKind,
    pub expression: BoolExpression,
    pub filters: Vec<Filter>,
    pub data: ActionData,
}

impl FilterAction {
    pub fn new(id: u32, kind: ActionKind) -> Self {
        Self {
            id,
            kind,
            expression: BoolExpression::new(),
            filters: Vec::new(),
            data: ActionData::None,
        }
    }

    /// Append a filter and return its index
    pub fn add_filter(&mut self, filter: Filter) -> usize {
        self.filters.push(filter);
        self.filters.len() - 1
    }

    /// Append a filter from a qualifier clause as a new alternative
    pub fn add_qualify_filter(&mut self, filter: Filter) -> usize {
        let index = self.add_filter(filter);
        self.expression.or_filter(index);
        index
    }

    /// Whether every filter index in the expression has a filter
    pub fn references_known_filters(&self) -> bool {
        match self.expression.max_filter() {
            Some(max) => max < self.filters.len(),
            None => true,
        }
    }

    /// Evaluate all filters into `variables`, then the expression.
    ///
    /// The engine sizes `variables` to the largest filter list; a shorter
    /// buffer never matches.
    pub(crate) fn matches(
        &self,
        call: &SyscallStop,
        personalities: &Personalities,
        variables: &mut [bool],
    ) -> bool {
        let Some(variables) = variables.get_mut(..self.filters.len()) else {
            return false;
        };
        for (slot, filter) in variables.iter_mut().zip(&self.filters) {
            *slot = filter.run(call, personalities);
        }
        self.expression.run(variables)
    }
}
