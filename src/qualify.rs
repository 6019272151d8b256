//! Qualifier clauses: `-e action[=main_part][:args]`
//!
//! The action name is resolved through a fixed alias table (`t` for
//! `trace`, `s` for `signal`, ...). A clause without `=` is a `trace=`
//! clause. Actions that take no arguments warn about and ignore `args`.

use crate::action::{ActionData, ActionKind};
use crate::engine::EngineBuilder;
use crate::error::{QualifyError, Result};
use crate::filter::{Filter, FilterType};
use crate::inject::parse_inject_args;
use crate::names::signal_number;
use crate::selector::parse_set;
use tracing::warn;

/// What a qualifier name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Action(ActionKind),
    Signal,
}

static QUAL_OPTIONS: &[(&str, Qualifier)] = &[
    ("trace", Qualifier::Action(ActionKind::Trace)),
    ("t", Qualifier::Action(ActionKind::Trace)),
    ("abbrev", Qualifier::Action(ActionKind::Abbrev)),
    ("a", Qualifier::Action(ActionKind::Abbrev)),
    ("verbose", Qualifier::Action(ActionKind::Verbose)),
    ("v", Qualifier::Action(ActionKind::Verbose)),
    ("raw", Qualifier::Action(ActionKind::Raw)),
    ("x", Qualifier::Action(ActionKind::Raw)),
    ("signal", Qualifier::Signal),
    ("signals", Qualifier::Signal),
    ("s", Qualifier::Signal),
    ("read", Qualifier::Action(ActionKind::Read)),
    ("reads", Qualifier::Action(ActionKind::Read)),
    ("r", Qualifier::Action(ActionKind::Read)),
    ("write", Qualifier::Action(ActionKind::Write)),
    ("writes", Qualifier::Action(ActionKind::Write)),
    ("w", Qualifier::Action(ActionKind::Write)),
    ("fault", Qualifier::Action(ActionKind::Fault)),
    ("inject", Qualifier::Action(ActionKind::Inject)),
];

/// Resolve a qualifier name or alias (case-sensitive)
pub fn lookup_qualifier(name: &str) -> Option<Qualifier> {
    QUAL_OPTIONS
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|&(_, qualifier)| qualifier)
}

/// Split a clause into `(action name, main part, args)`
pub fn split_clause(expr: &str) -> (&str, &str, Option<&str>) {
    let Some((name, rest)) = expr.split_once('=') else {
        return ("trace", expr, None);
    };
    match rest.split_once(':') {
        Some((main_part, args)) => (name, main_part, Some(args)),
        None => (name, rest, None),
    }
}

/// Parse one full qualifier clause into `builder`
pub fn parse_qualify_filter(builder: &mut EngineBuilder, expr: &str) -> Result<()> {
    let (name, main_part, args) = split_clause(expr);
    parse_qualify_action(builder, name, main_part, args)
}

/// Apply an already split clause
pub fn parse_qualify_action(
    builder: &mut EngineBuilder,
    name: &str,
    main_part: &str,
    args: Option<&str>,
) -> Result<()> {
    let qualifier =
        lookup_qualifier(name).ok_or_else(|| QualifyError::InvalidAction(name.to_string()))?;

    match qualifier {
        Qualifier::Signal => qualify_signals(builder, main_part, args),
        Qualifier::Action(kind @ (ActionKind::Read | ActionKind::Write)) => {
            parse_filtered(builder, kind, FilterType::Fd, main_part, args)
        }
        Qualifier::Action(kind @ (ActionKind::Fault | ActionKind::Inject)) => {
            parse_inject_common(builder, kind, main_part, args)
        }
        Qualifier::Action(
            kind @ (ActionKind::Trace | ActionKind::Abbrev | ActionKind::Verbose | ActionKind::Raw),
        ) => parse_filtered(builder, kind, FilterType::Syscall, main_part, args),
    }
}

fn warn_ignored_args(name: &str, args: Option<&str>) {
    if let Some(args) = args {
        warn!("{} action takes no arguments, ignored arguments '{}'", name, args);
    }
}

fn parse_filtered(
    builder: &mut EngineBuilder,
    kind: ActionKind,
    ty: FilterType,
    main_part: &str,
    args: Option<&str>,
) -> Result<()> {
    let filter = Filter::parse(ty, main_part, builder.personalities(), true)?;
    builder.find_or_add(kind).add_qualify_filter(filter);
    warn_ignored_args(kind.name(), args);
    Ok(())
}

fn qualify_signals(builder: &mut EngineBuilder, main_part: &str, args: Option<&str>) -> Result<()> {
    let set = builder.signal_set_mut();
    set.clear();
    parse_set(main_part, set, signal_number, "signal", true)?;
    warn_ignored_args("signal", args);
    Ok(())
}

fn parse_inject_common(
    builder: &mut EngineBuilder,
    kind: ActionKind,
    main_part: &str,
    args: Option<&str>,
) -> Result<()> {
    let fault_tokens_only = kind == ActionKind::Fault;
    let filter = Filter::parse(FilterType::Syscall, main_part, builder.personalities(), true)?;
    let opts = parse_inject_args(args, fault_tokens_only, true).ok_or_else(|| {
        QualifyError::InvalidInjectArgs {
            description: kind.name(),
            args: args.unwrap_or_default().to_string(),
        }
    })?;

    let action = builder.add_action(kind);
    action.add_qualify_filter(filter);
    action.data = ActionData::Inject(opts);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::QualFlags;
    use crate::inject::ForcedResult;
    use crate::syscalls::Personalities;

    fn builder() -> EngineBuilder {
        EngineBuilder::new(Personalities::native())
    }

    #[test]
    fn test_alias_table() {
        let cases = [
            ("t", Qualifier::Action(ActionKind::Trace)),
            ("a", Qualifier::Action(ActionKind::Abbrev)),
            ("v", Qualifier::Action(ActionKind::Verbose)),
            ("x", Qualifier::Action(ActionKind::Raw)),
            ("s", Qualifier::Signal),
            ("signals", Qualifier::Signal),
            ("reads", Qualifier::Action(ActionKind::Read)),
            ("w", Qualifier::Action(ActionKind::Write)),
            ("inject", Qualifier::Action(ActionKind::Inject)),
        ];
        for (alias, expected) in cases {
            assert_eq!(lookup_qualifier(alias), Some(expected), "{alias}");
        }
        assert_eq!(lookup_qualifier("T"), None);
        assert_eq!(lookup_qualifier("f"), None);
    }

    #[test]
    fn test_split_clause() {
        assert_eq!(split_clause("trace=open"), ("trace", "open", None));
        assert_eq!(split_clause("open,close"), ("trace", "open,close", None));
        assert_eq!(
            split_clause("fault=write:error=EIO:when=3+2"),
            ("fault", "write", Some("error=EIO:when=3+2"))
        );
        assert_eq!(split_clause("trace="), ("trace", "", None));
    }

    #[test]
    fn test_unknown_action_is_fatal() {
        let err = builder().qualify("trcae=open").unwrap_err();
        assert_eq!(err.to_string(), "invalid filter action 'trcae'");
    }

    #[test]
    fn test_args_on_plain_action_are_ignored() {
        let mut b = builder();
        b.qualify("trace=open:when=3").unwrap();
        assert_eq!(b.actions().len(), 1);
        assert_eq!(b.actions()[0].data, ActionData::None);
    }

    #[test]
    fn test_bare_clause_is_trace() {
        let mut b = builder();
        b.qualify("open").unwrap();
        assert_eq!(b.actions()[0].kind, ActionKind::Trace);
    }

    #[test]
    fn test_read_write_use_descriptor_filters() {
        let mut b = builder();
        b.qualify("r=3").unwrap();
        b.qualify("writes=!1,2").unwrap();
        assert_eq!(b.actions()[0].filters[0].filter_type(), FilterType::Fd);
        assert_eq!(b.actions()[1].kind, ActionKind::Write);
        let err = b.qualify("read=stdin").unwrap_err();
        assert_eq!(err.to_string(), "invalid descriptor 'stdin'");
    }

    #[test]
    fn test_fault_and_inject_create_distinct_instances() {
        let mut b = builder();
        b.qualify("fault=write").unwrap();
        b.qualify("fault=read:error=EIO").unwrap();
        b.qualify("inject=open:retval=0").unwrap();
        let kinds: Vec<ActionKind> = b.actions().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Fault, ActionKind::Fault, ActionKind::Inject]);
        let opts = b.actions()[2].data.inject_opts().copied().unwrap();
        assert_eq!(opts.result, ForcedResult::Retval(0));
        assert!(!b.default_flags().contains(QualFlags::INJECT));
    }

    #[test]
    fn test_invalid_inject_args_quote_original() {
        let err = builder().qualify("inject=open").unwrap_err();
        assert_eq!(err.to_string(), "invalid inject argument ''");
        let err = builder().qualify("fault=open:retval=0").unwrap_err();
        assert_eq!(err.to_string(), "invalid fault argument 'retval=0'");
    }

    #[test]
    fn test_invalid_syscall_in_fault_clause() {
        let err = builder().qualify("fault=nosuch:error=EIO").unwrap_err();
        assert!(matches!(err, QualifyError::InvalidSyscall(t) if t == "nosuch"));
    }

    #[test]
    fn test_signal_qualifier_replaces_set() {
        let mut b = builder();
        b.qualify("signal=SIGINT,9").unwrap();
        b.qualify("s=!SIGTERM").unwrap();
        let engine = b.finish();
        assert!(!engine.is_signal_traced(15));
        assert!(engine.is_signal_traced(9));
        assert!(engine.is_signal_traced(2));

        let err = builder().qualify("signal=SIGNOPE").unwrap_err();
        assert_eq!(err.to_string(), "invalid signal 'SIGNOPE'");
    }
}
