//! Plain-data descriptors exchanged with the editor layer.
//!
//! Editors hand these to [`Automaton::build`][crate::automaton::Automaton::build]
//! and [`Grammar::build`][crate::grammar::Grammar::build] for validation, and
//! receive them back from [`Automaton::to_descriptor`][crate::automaton::Automaton::to_descriptor]
//! for display. Descriptors carry no behavior and no internal representations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw automaton data as produced by the editors.
///
/// `transitions` maps `state -> symbol -> target(s)`; a missing cell is an
/// empty move for the non-deterministic variant and a validation error for
/// the deterministic one. `epsilon_transitions` is present only for the
/// non-deterministic variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomatonDescriptor {
    pub states: Vec<String>,
    pub alphabet: Vec<String>,
    #[serde(default)]
    pub transitions: HashMap<String, HashMap<String, TransitionTarget>>,
    #[serde(default)]
    pub epsilon_transitions: Option<HashMap<String, Vec<String>>>,
    pub start_state: String,
    pub final_states: Vec<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Composition-key material; defaults to `label` when absent.
    #[serde(default)]
    pub id: Option<String>,
}

/// One cell of the transition table: a single target for deterministic
/// tables, a (possibly empty) list for non-deterministic ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionTarget {
    Single(String),
    Many(Vec<String>),
}

impl TransitionTarget {
    /// The targets of this cell, in listed order.
    pub fn targets(&self) -> &[String] {
        match self {
            TransitionTarget::Single(target) => std::slice::from_ref(target),
            TransitionTarget::Many(targets) => targets,
        }
    }

    /// Whether this cell is single-valued.
    pub fn is_single(&self) -> bool {
        match self {
            TransitionTarget::Single(_) => true,
            TransitionTarget::Many(targets) => targets.len() == 1,
        }
    }
}

/// Raw grammar data: one entry per variable, each with its list of
/// alternatives. An empty token sequence denotes an epsilon alternative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrammarDescriptor {
    #[serde(default)]
    pub label: String,
    pub rules: Vec<GrammarRule>,
}

/// Production rules of a single variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarRule {
    pub variable: String,
    pub substitutions: Vec<Vec<String>>,
}
