//! # automata-rs: finite automata and context-free grammars in Rust
//!
//! **`automata-rs`** is a small, pure library for working with **finite
//! automata** (deterministic and non-deterministic) and **context-free
//! grammars**: epsilon closures, string acceptance, subset construction,
//! boolean composition of DFAs, and grammar terminability analysis.
//!
//! ## Design
//!
//! - **Validate once, compute freely**: an [`Automaton`][crate::automaton::Automaton]
//!   is checked against every structural invariant (declared states and
//!   symbols, totality of deterministic transition functions) at
//!   construction; the algorithms assume validated input and never fail on it.
//! - **Immutable values**: automata and grammars are never mutated. Every
//!   transformation (determinization, AND/OR/NOT composition) returns a
//!   new value that owns its own tables.
//! - **Iterative closures**: epsilon closures and the grammar fixpoint run
//!   with explicit work-lists, so cyclic graphs cannot exhaust the stack.
//! - **Plain data at the boundary**: editors exchange serde-serializable
//!   [descriptors][crate::descriptor]; composite pair keys and subset
//!   work-lists stay internal.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use automata_rs::automaton::Automaton;
//! use automata_rs::descriptor::{AutomatonDescriptor, TransitionTarget};
//! use automata_rs::algebra::MergeOptions;
//!
//! // A one-state DFA over {a} accepting everything.
//! let descriptor = AutomatonDescriptor {
//!     states: vec!["q".to_string()],
//!     alphabet: vec!["a".to_string()],
//!     transitions: HashMap::from([(
//!         "q".to_string(),
//!         HashMap::from([("a".to_string(), TransitionTarget::Single("q".to_string()))]),
//!     )]),
//!     epsilon_transitions: None,
//!     start_state: "q".to_string(),
//!     final_states: vec!["q".to_string()],
//!     label: "all".to_string(),
//!     description: "accepts every string over {a}".to_string(),
//!     id: None,
//! };
//! let all = Automaton::deterministic(descriptor).unwrap();
//! assert!(all.test("aaa"));
//!
//! // Its complement accepts nothing.
//! let none = all.not(MergeOptions::default()).unwrap();
//! assert!(!none.test("aaa"));
//! ```
//!
//! ## Core Components
//!
//! - **[`automaton`]**: the validated automaton value and acceptance evaluation.
//! - **[`closure`]**: epsilon-closure computation.
//! - **[`determinize`]**: NFA → DFA subset construction.
//! - **[`algebra`]**: AND/OR/NOT composition of DFAs via product construction.
//! - **[`grammar`]**: grammars and the terminability fixpoint.
//! - **[`descriptor`]** / **[`error`]**: the plain-data boundary and the
//!   error taxonomy.

pub mod algebra;
pub mod automaton;
pub mod closure;
pub mod descriptor;
pub mod determinize;
pub mod error;
pub mod grammar;

#[cfg(test)]
pub(crate) mod testutil;
