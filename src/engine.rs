//! Filter engine: action registry, finalization and per-syscall dispatch
//!
//! Configuration happens on an [`EngineBuilder`]; [`EngineBuilder::finish`]
//! sorts the actions and sizes the evaluation buffer, producing a
//! [`FilterEngine`] whose configuration never changes afterwards.
//!
//! # Example
//!
//! ```
//! use sysqual::action::{ActionKind, ActionData};
//! use sysqual::call::SyscallStop;
//! use sysqual::engine::EngineBuilder;
//! use sysqual::syscalls::Personalities;
//!
//! let mut builder = EngineBuilder::new(Personalities::native());
//! builder.qualify("trace=%network").unwrap();
//! let mut engine = builder.finish();
//!
//! let mut fired = Vec::new();
//! let mut call = SyscallStop::new(0, 41); // socket
//! engine.filter_syscall(&mut call, &mut |_: &mut SyscallStop, kind: ActionKind, _: &ActionData| {
//!     fired.push(kind)
//! });
//! assert_eq!(fired, vec![ActionKind::Trace]);
//! ```

use crate::action::{ActionData, ActionHandler, ActionKind, FilterAction, QualFlags};
use crate::call::SyscallStop;
use crate::error::{QualifyError, Result};
use crate::filter::{Filter, PathSet};
use crate::number_set::NumberSet;
use crate::qualify;
use crate::syscalls::Personalities;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Mutable configuration state, filled while parsing qualifiers
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    personalities: Personalities,
    actions: Vec<FilterAction>,
    default_flags: QualFlags,
    signal_set: NumberSet,
    traced_paths: PathSet,
}

impl EngineBuilder {
    pub fn new(personalities: Personalities) -> Self {
        let mut signal_set = NumberSet::new();
        signal_set.invert();
        Self {
            personalities,
            actions: Vec::new(),
            default_flags: QualFlags::DEFAULT,
            signal_set,
            traced_paths: PathSet::new(),
        }
    }

    pub fn personalities(&self) -> &Personalities {
        &self.personalities
    }

    pub fn actions(&self) -> &[FilterAction] {
        &self.actions
    }

    pub fn default_flags(&self) -> QualFlags {
        self.default_flags
    }

    /// Parse one qualifier clause such as `trace=open` or `fault=read:when=2`
    pub fn qualify(&mut self, expr: &str) -> Result<()> {
        qualify::parse_qualify_filter(self, expr)
    }

    /// Select a path for path tracing (`-P`)
    pub fn trace_path(&mut self, path: impl Into<PathBuf>) {
        self.traced_paths.select(path);
    }

    /// The signal set filled by `signal=`
    pub(crate) fn signal_set_mut(&mut self) -> &mut NumberSet {
        &mut self.signal_set
    }

    /// Create a new action instance, dropping its kind from the defaults
    pub fn add_action(&mut self, kind: ActionKind) -> &mut FilterAction {
        self.default_flags.remove(kind.qual_flag());
        let id = self.actions.len() as u32;
        debug!(action = %kind, id, "created filter action");
        self.actions.push(FilterAction::new(id, kind));
        let last = self.actions.len() - 1;
        &mut self.actions[last]
    }

    /// Reuse the first instance of an argument-less kind, or create one
    pub fn find_or_add(&mut self, kind: ActionKind) -> &mut FilterAction {
        let existing = if kind.takes_args() {
            None
        } else {
            self.actions.iter().position(|action| action.kind == kind)
        };
        match existing {
            Some(index) => &mut self.actions[index],
            None => self.add_action(kind),
        }
    }

    /// [`Self::find_or_add`] by registry name
    pub fn find_or_add_action(&mut self, name: &str) -> Result<&mut FilterAction> {
        let kind =
            ActionKind::from_name(name).ok_or_else(|| QualifyError::InvalidAction(name.to_string()))?;
        Ok(self.find_or_add(kind))
    }

    fn inject_path_tracing(&mut self) {
        let catch_all = Filter::all_syscalls(&self.personalities);
        let paths = self.traced_paths.clone();
        let action = self.find_or_add(ActionKind::Trace);
        if action.filters.is_empty() {
            action.add_qualify_filter(catch_all);
        }
        let index = action.add_filter(Filter::Path { paths });
        action.expression.and_filter(index);
    }

    /// Finish configuration: add path tracing, sort by priority and size
    /// the evaluation buffer.
    pub fn finish(mut self) -> FilterEngine {
        if !self.traced_paths.is_empty() {
            self.inject_path_tracing();
        }

        // Lower priority value first; among equals the later instance first.
        self.actions.sort_by(|a, b| {
            a.kind
                .priority()
                .cmp(&b.kind.priority())
                .then_with(|| b.id.cmp(&a.id))
        });

        debug_assert!(
            self.actions.iter().all(FilterAction::references_known_filters),
            "filter expression references a missing filter"
        );
        let max_filters = self.actions.iter().map(|a| a.filters.len()).max().unwrap_or(0);
        debug!(
            actions = self.actions.len(),
            max_filters,
            default_flags = ?self.default_flags,
            "filter configuration finished"
        );

        FilterEngine {
            personalities: self.personalities,
            actions: self.actions,
            default_flags: self.default_flags,
            signal_set: self.signal_set,
            variables: vec![false; max_filters],
        }
    }
}

/// Finalized filter configuration plus the reusable evaluation buffer
#[derive(Debug, Clone)]
pub struct FilterEngine {
    personalities: Personalities,
    actions: Vec<FilterAction>,
    default_flags: QualFlags,
    signal_set: NumberSet,
    variables: Vec<bool>,
}

impl FilterEngine {
    /// Actions in dispatch order
    pub fn actions(&self) -> &[FilterAction] {
        &self.actions
    }

    pub fn default_flags(&self) -> QualFlags {
        self.default_flags
    }

    pub fn personalities(&self) -> &Personalities {
        &self.personalities
    }

    /// Whether signal `signo` was selected by `signal=` (all by default)
    pub fn is_signal_traced(&self, signo: u32) -> bool {
        self.signal_set.contains(signo)
    }

    /// Decide which actions apply to `call` and invoke `handler` for each,
    /// in dispatch order.
    pub fn filter_syscall<H>(&mut self, call: &mut SyscallStop, handler: &mut H)
    where
        H: ActionHandler + ?Sized,
    {
        call.qual |= self.default_flags;
        for action in &self.actions {
            if !action.kind.prefilter(call) {
                continue;
            }
            if action.matches(call, &self.personalities, &mut self.variables) {
                trace!(pid = call.pid, number = call.number, action = %action.kind, "action applies");
                call.qual |= action.kind.qual_flag();
                handler.apply(call, action.kind, &action.data);
            }
        }
    }

    /// Serializable view of the configuration
    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            default_flags: self.default_flags,
            actions: self
                .actions
                .iter()
                .map(|action| ActionSummary {
                    id: action.id,
                    action: action.kind,
                    priority: action.kind.priority(),
                    expression: action.expression.to_string(),
                    filters: action.filters.iter().map(|f| f.filter_type().name()).collect(),
                    data: action.data,
                })
                .collect(),
        }
    }
}

/// Configuration summary, used for `--format json`
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub default_flags: QualFlags,
    pub actions: Vec<ActionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionSummary {
    pub id: u32,
    pub action: ActionKind,
    pub priority: u32,
    pub expression: String,
    pub filters: Vec<&'static str>,
    pub data: ActionData,
}
