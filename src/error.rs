//! Error taxonomy for automaton construction and composition.
//!
//! Validation errors are raised at construction time, never deferred into
//! the algorithms: [`closure`][crate::closure], [`determinize`][crate::determinize]
//! and [`algebra`][crate::algebra] assume validated input and are total over it.

use thiserror::Error;

/// A structural invariant of the automaton descriptor was violated.
///
/// Every variant names the offending identifier so that the editor layer
/// can point at the exact cell of the transition table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// The descriptor declared no states at all.
    #[error("automaton has no states")]
    NoStates,

    /// The same state identifier was declared more than once.
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),

    /// A transition source or final state is not in the declared state list.
    #[error("state `{0}` is referenced but not declared")]
    UndeclaredState(String),

    /// A transition is keyed on a symbol outside the declared alphabet.
    #[error("symbol `{0}` is not in the alphabet")]
    UndeclaredSymbol(String),

    /// A transition targets a state outside the declared state list.
    #[error("transition from `{state}` on `{symbol}` targets undeclared state `{target}`")]
    DanglingTransition {
        state: String,
        symbol: String,
        target: String,
    },

    /// A deterministic cell carries more than one target.
    #[error("deterministic transition from `{state}` on `{symbol}` has multiple targets")]
    AmbiguousTransition { state: String, symbol: String },

    /// The deterministic transition function is not total.
    #[error("missing transition from `{state}` on `{symbol}`")]
    IncompleteTransitionFunction { state: String, symbol: String },

    /// The start state is not in the declared state list.
    #[error("start state `{0}` is not a declared state")]
    InvalidStartState(String),

    /// An epsilon edge starts or ends outside the declared state list.
    #[error("epsilon transition references undeclared state `{0}`")]
    UndeclaredEpsilonState(String),
}

/// Top-level error type of the crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    /// Malformed descriptor, rejected during construction.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// An operation was invoked with operands it does not accept,
    /// e.g. `NOT` with a second operand, or composition of non-DFAs.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A composite separator occurs inside an operand state name and would
    /// make joined identifiers ambiguous. Rejected rather than silently
    /// producing a corrupt state space.
    #[error("separator `{separator}` occurs in state name `{state}`")]
    SeparatorCollision { separator: String, state: String },

    /// Grammar analysis hit a variable with no entry in the rule table.
    #[error("variable `{0}` is referenced but has no production rules")]
    UndeclaredVariable(String),
}
