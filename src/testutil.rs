//! Descriptor builders shared by the test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::descriptor::{AutomatonDescriptor, TransitionTarget};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn fresh_id() -> String {
    format!("m{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

pub(crate) fn dfa_descriptor(
    states: &[&str],
    alphabet: &[&str],
    transitions: &[(&str, &str, &str)],
    start: &str,
    finals: &[&str],
) -> AutomatonDescriptor {
    let mut table: HashMap<String, HashMap<String, TransitionTarget>> = HashMap::new();
    for &(state, symbol, target) in transitions {
        table
            .entry(state.to_string())
            .or_default()
            .insert(symbol.to_string(), TransitionTarget::Single(target.to_string()));
    }
    AutomatonDescriptor {
        states: states.iter().map(|s| s.to_string()).collect(),
        alphabet: alphabet.iter().map(|s| s.to_string()).collect(),
        transitions: table,
        epsilon_transitions: None,
        start_state: start.to_string(),
        final_states: finals.iter().map(|s| s.to_string()).collect(),
        label: "test".to_string(),
        description: String::new(),
        id: Some(fresh_id()),
    }
}

pub(crate) fn nfa_descriptor(
    states: &[&str],
    alphabet: &[&str],
    moves: &[(&str, &str, &[&str])],
    epsilon: &[(&str, &[&str])],
    start: &str,
    finals: &[&str],
) -> AutomatonDescriptor {
    let mut table: HashMap<String, HashMap<String, TransitionTarget>> = HashMap::new();
    for &(state, symbol, targets) in moves {
        table.entry(state.to_string()).or_default().insert(
            symbol.to_string(),
            TransitionTarget::Many(targets.iter().map(|s| s.to_string()).collect()),
        );
    }
    let epsilon_transitions = Some(
        epsilon
            .iter()
            .map(|&(state, targets)| {
                (
                    state.to_string(),
                    targets.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect(),
    );
    AutomatonDescriptor {
        states: states.iter().map(|s| s.to_string()).collect(),
        alphabet: alphabet.iter().map(|s| s.to_string()).collect(),
        transitions: table,
        epsilon_transitions,
        start_state: start.to_string(),
        final_states: finals.iter().map(|s| s.to_string()).collect(),
        label: "test".to_string(),
        description: String::new(),
        id: Some(fresh_id()),
    }
}

/// All strings over `alphabet` of length at most `max_len`.
pub(crate) fn strings_up_to(alphabet: &[&str], max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for symbol in alphabet {
                let mut s = prefix.clone();
                s.push_str(symbol);
                next.push(s);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}
