//! Subset construction: converting an NFA into an equivalent DFA.
//!
//! Reachable subsets of NFA states become single DFA states. Discovery is
//! work-list driven, so subsets unreachable from the start closure are never
//! materialized; termination is guaranteed because at most `2^n` distinct
//! subsets exist, and in practice far fewer are reached.
//!
//! Subsets are keyed internally by their sorted member indices, which makes
//! two subsets with identical members the same DFA state regardless of the
//! order in which they were discovered. The joined string identifiers are
//! rendered only for the output state list.

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};

use crate::automaton::{Automaton, StateId, TransitionTable, Variant};
use crate::closure::closure_set;
use crate::error::AutomatonError;

/// Separator used when rendering a subset into a DFA state identifier.
const SUBSET_SEPARATOR: &str = ",";
/// Identifier of the empty subset, the trap state for dead moves.
const EMPTY_SUBSET: &str = "\u{2205}";

/// Converts a validated NFA into an equivalent DFA.
///
/// The result accepts exactly the same language; it also carries the
/// input's decision hook, so equivalence holds under custom hooks as well.
/// Moves with no NFA target lead to an explicit trap state, keeping the
/// output transition function total.
pub fn determinize(nfa: &Automaton) -> Result<Automaton, AutomatonError> {
    let (moves, epsilon) = match &nfa.table {
        TransitionTable::NonDeterministic { moves, epsilon } => (moves, epsilon),
        TransitionTable::Deterministic(_) => {
            return Err(AutomatonError::InvalidOperation(
                "determinize expects a non-deterministic automaton".to_string(),
            ))
        }
    };
    let n_symbols = nfa.alphabet.len();

    let mut worklist = Worklist::default();
    let start_subset = worklist.intern(closure_set(epsilon, [nfa.start]));

    let mut table: Vec<Vec<usize>> = Vec::new();
    while let Some(current) = worklist.queue.pop_front() {
        let mut row = Vec::with_capacity(n_symbols);
        for symbol in 0..n_symbols {
            let seed = worklist.subsets[current]
                .iter()
                .flat_map(|&s| moves[s][symbol].iter().copied())
                .collect::<Vec<_>>();
            row.push(worklist.intern(closure_set(epsilon, seed)));
        }
        // Queue ids are assigned in discovery order, so rows line up.
        debug_assert_eq!(table.len(), current);
        table.push(row);
    }
    let subsets = worklist.subsets;

    let states = subsets
        .iter()
        .map(|members| render_subset(nfa, members))
        .collect::<Vec<_>>();
    let finals = subsets
        .iter()
        .map(|members| members.iter().any(|&s| nfa.finals[s]))
        .collect();

    Ok(Automaton::from_parts(
        format!("det({})", nfa.id),
        format!("det({})", nfa.label),
        format!("DET({})", nfa.description),
        Variant::Deterministic,
        states,
        nfa.alphabet.clone(),
        start_subset,
        finals,
        TransitionTable::Deterministic(table),
        nfa.decide.clone(),
    ))
}

/// Discovered subsets, keyed by their canonical (sorted) member lists.
#[derive(Default)]
struct Worklist {
    ids: HashMap<Vec<StateId>, usize>,
    subsets: Vec<Vec<StateId>>,
    queue: VecDeque<usize>,
}

impl Worklist {
    /// Returns the id of the subset, enqueueing it when seen first.
    fn intern(&mut self, mut members: Vec<StateId>) -> usize {
        members.sort_unstable();
        members.dedup();
        if let Some(&id) = self.ids.get(&members) {
            return id;
        }
        let id = self.subsets.len();
        debug!("subset {} = {:?}", id, members);
        self.ids.insert(members.clone(), id);
        self.subsets.push(members);
        self.queue.push_back(id);
        id
    }
}

fn render_subset(nfa: &Automaton, members: &[StateId]) -> String {
    if members.is_empty() {
        return EMPTY_SUBSET.to_string();
    }
    let names = members
        .iter()
        .map(|&s| nfa.states[s].as_str())
        .collect::<Vec<_>>();
    for name in &names {
        if name.contains(SUBSET_SEPARATOR) {
            warn!(
                "state name `{}` contains the subset separator `{}`; rendered identifiers may be ambiguous",
                name, SUBSET_SEPARATOR
            );
        }
    }
    names.join(SUBSET_SEPARATOR)
}
