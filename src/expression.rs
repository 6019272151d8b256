//! Boolean expressions over the filters of one action
//!
//! Expressions are kept in disjunctive normal form: an OR of conjunctions,
//! each conjunction an AND of possibly negated filter results. Filters are
//! referred to by their index within the owning action.

use serde::Serialize;
use std::fmt;

/// A filter result, optionally negated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Literal {
    pub filter: usize,
    pub negated: bool,
}

impl Literal {
    fn eval(self, variables: &[bool]) -> bool {
        variables.get(self.filter).copied().unwrap_or(false) ^ self.negated
    }
}

/// OR of AND-clauses over filter results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoolExpression {
    clauses: Vec<Vec<Literal>>,
}

impl BoolExpression {
    /// An empty expression, which evaluates to false
    pub fn new() -> Self {
        Self::default()
    }

    /// AND filter `index` into every alternative
    pub fn and_filter(&mut self, index: usize) {
        self.and_literal(Literal {
            filter: index,
            negated: false,
        });
    }

    /// AND the negation of filter `index` into every alternative
    pub fn and_not_filter(&mut self, index: usize) {
        self.and_literal(Literal {
            filter: index,
            negated: true,
        });
    }

    fn and_literal(&mut self, literal: Literal) {
        if self.clauses.is_empty() {
            self.clauses.push(Vec::new());
        }
        for clause in &mut self.clauses {
            clause.push(literal);
        }
    }

    /// Start a new alternative consisting of filter `index` alone
    pub fn or_filter(&mut self, index: usize) {
        self.clauses.push(vec![Literal {
            filter: index,
            negated: false,
        }]);
    }

    /// Evaluate against the per-filter results of one call
    pub fn run(&self, variables: &[bool]) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.iter().all(|literal| literal.eval(variables)))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Highest filter index referenced, if any
    pub fn max_filter(&self) -> Option<usize> {
        self.clauses.iter().flatten().map(|l| l.filter).max()
    }
}

impl fmt::Display for BoolExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "false");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " || ")?;
            }
            let multi = self.clauses.len() > 1 && clause.len() > 1;
            if multi {
                write!(f, "(")?;
            }
            for (j, literal) in clause.iter().enumerate() {
                if j > 0 {
                    write!(f, " && ")?;
                }
                if literal.negated {
                    write!(f, "!")?;
                }
                write!(f, "${}", literal.filter)?;
            }
            if multi {
                write!(f, ")")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expression_is_false() {
        let expr = BoolExpression::new();
        assert!(!expr.run(&[true, true]));
        assert_eq!(expr.to_string(), "false");
        assert_eq!(expr.max_filter(), None);
    }

    #[test]
    fn test_and_of_filters() {
        let mut expr = BoolExpression::new();
        expr.and_filter(0);
        expr.and_not_filter(1);
        assert!(expr.run(&[true, false]));
        assert!(!expr.run(&[true, true]));
        assert!(!expr.run(&[false, false]));
        assert_eq!(expr.to_string(), "$0 && !$1");
    }

    #[test]
    fn test_or_then_and_distributes() {
        let mut expr = BoolExpression::new();
        expr.or_filter(0);
        expr.or_filter(1);
        expr.and_filter(2);
        assert!(expr.run(&[true, false, true]));
        assert!(expr.run(&[false, true, true]));
        assert!(!expr.run(&[true, true, false]));
        assert_eq!(expr.to_string(), "($0 && $2) || ($1 && $2)");
        assert_eq!(expr.max_filter(), Some(2));
    }

    #[test]
    fn test_missing_variable_reads_false() {
        let mut expr = BoolExpression::new();
        expr.and_filter(3);
        assert!(!expr.run(&[true]));
    }
}
