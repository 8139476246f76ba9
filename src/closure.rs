//! Epsilon-closure computation.
//!
//! The closure of a state is the smallest set containing it and closed
//! under epsilon transitions. Both entry points traverse the epsilon graph
//! breadth-first with an explicit frontier: epsilon graphs may contain
//! cycles, and recursive descent could exhaust the stack on adversarial
//! inputs. The output order is the discovery order (seed first, then
//! epsilon targets in listed order, ties broken by first sighting), which
//! makes the result deterministic and deduplicated.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::automaton::StateId;

/// Computes the epsilon closure of `state` over a string-keyed epsilon map.
///
/// The result is ordered by discovery and always starts with `state`
/// itself. States reached through a name absent from the map contribute no
/// further targets.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use automata_rs::closure::epsilon_closure;
///
/// let map = HashMap::from([
///     ("A".to_string(), vec!["B".to_string()]),
///     ("B".to_string(), vec!["C".to_string(), "D".to_string()]),
/// ]);
/// assert_eq!(epsilon_closure(&map, "A"), ["A", "B", "C", "D"]);
/// ```
pub fn epsilon_closure(epsilon_map: &HashMap<String, Vec<String>>, state: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();
    let mut frontier = VecDeque::new();

    seen.insert(state.to_string());
    frontier.push_back(state.to_string());

    while let Some(current) = frontier.pop_front() {
        if let Some(targets) = epsilon_map.get(&current) {
            for target in targets {
                if seen.insert(target.clone()) {
                    frontier.push_back(target.clone());
                }
            }
        }
        result.push(current);
    }

    debug!("closure({}) = {:?}", state, result);
    result
}

/// Closure of a seed set over an index-based epsilon graph.
///
/// `epsilon[s]` lists the epsilon targets of state `s`. Seed states appear
/// first, in seed order; the rest follow in breadth-first discovery order.
pub(crate) fn closure_set(
    epsilon: &[Vec<StateId>],
    seed: impl IntoIterator<Item = StateId>,
) -> Vec<StateId> {
    let mut seen = vec![false; epsilon.len()];
    let mut result = Vec::new();
    let mut frontier = VecDeque::new();

    for s in seed {
        if !seen[s] {
            seen[s] = true;
            frontier.push_back(s);
        }
    }

    while let Some(current) = frontier.pop_front() {
        for &target in &epsilon[current] {
            if !seen[target] {
                seen[target] = true;
                frontier.push_back(target);
            }
        }
        result.push(current);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn map(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_closure_discovery_order() {
        let m = map(&[("A", &["B"]), ("B", &["C", "D"])]);
        assert_eq!(epsilon_closure(&m, "A"), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_closure_without_epsilon_edges() {
        let m = map(&[]);
        assert_eq!(epsilon_closure(&m, "Q"), ["Q"]);
    }

    #[test]
    fn test_closure_on_cycle() {
        let m = map(&[("A", &["B"]), ("B", &["A", "C"]), ("C", &["A"])]);
        assert_eq!(epsilon_closure(&m, "A"), ["A", "B", "C"]);
        assert_eq!(epsilon_closure(&m, "B"), ["B", "A", "C"]);
    }

    #[test]
    fn test_closure_is_idempotent() {
        let m = map(&[("A", &["B"]), ("B", &["C", "D"]), ("D", &["A"])]);
        let once = epsilon_closure(&m, "A");
        // Re-closing every member discovers nothing new.
        for member in &once {
            let again = epsilon_closure(&m, member);
            for s in &again {
                assert!(once.contains(s), "closure grew on second pass: {}", s);
            }
        }
    }

    #[test]
    fn test_closure_set_seed_order() {
        // 0 -> 1, 2 -> 3, 3 -> 0
        let epsilon = vec![vec![1], vec![], vec![3], vec![0]];
        assert_eq!(closure_set(&epsilon, [2, 0]), [2, 0, 3, 1]);
        assert_eq!(closure_set(&epsilon, [0]), [0, 1]);
        assert_eq!(closure_set(&epsilon, []), Vec::<StateId>::new());
    }

    #[test]
    fn test_closure_set_is_idempotent() {
        let epsilon = vec![vec![1, 2], vec![3], vec![], vec![0]];
        for seed in [vec![0], vec![2], vec![3, 1], vec![0, 1, 2, 3]] {
            let once = closure_set(&epsilon, seed);
            let twice = closure_set(&epsilon, once.clone());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_closure_set_deduplicates_seed() {
        let epsilon = vec![vec![], vec![0]];
        assert_eq!(closure_set(&epsilon, [1, 1, 0]), [1, 0]);
    }
}
