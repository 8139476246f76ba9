//! The validated automaton value and its acceptance evaluation.
//!
//! An [`Automaton`] is built once from an [`AutomatonDescriptor`], checked
//! against every structural invariant, and never mutated afterwards. Every
//! transformation ([`determinize`][crate::determinize::determinize],
//! [`and`][Automaton::and], [`or`][Automaton::or], [`not`][Automaton::not])
//! returns a new value.
//!
//! Internally states and symbols are dense indices into the declaration
//! order; string identifiers only appear at the descriptor boundary.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use log::debug;

use crate::closure::closure_set;
use crate::descriptor::{AutomatonDescriptor, TransitionTarget};
use crate::error::{AutomatonError, StructuralError};

/// Index of a state in declaration order.
pub(crate) type StateId = usize;
/// Index of an alphabet symbol in declaration order.
pub(crate) type SymbolId = usize;

/// The overridable decision hook: `(input, structural_acceptance) -> accepted`.
///
/// An automaton without a hook answers with the structural result directly;
/// composed automata install hooks that recurse into their operands where
/// the structural product alone is not enough (see [`crate::algebra`]).
pub type DecideFn = Arc<dyn Fn(&str, bool) -> bool + Send + Sync>;

/// Whether the transition relation is a total function or a relation with
/// optional epsilon moves.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Variant {
    Deterministic,
    NonDeterministic,
}

/// Dense transition tables, one shape per variant.
#[derive(Debug, Clone)]
pub(crate) enum TransitionTable {
    /// `[state][symbol] -> state`, total.
    Deterministic(Vec<Vec<StateId>>),
    /// `moves[state][symbol] -> targets` (possibly empty),
    /// `epsilon[state] -> targets`.
    NonDeterministic {
        moves: Vec<Vec<Vec<StateId>>>,
        epsilon: Vec<Vec<StateId>>,
    },
}

/// A validated, immutable finite automaton.
#[derive(Clone)]
pub struct Automaton {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) description: String,
    pub(crate) variant: Variant,
    pub(crate) states: Vec<String>,
    pub(crate) alphabet: Vec<String>,
    pub(crate) symbol_ids: HashMap<String, SymbolId>,
    pub(crate) start: StateId,
    pub(crate) finals: Vec<bool>,
    pub(crate) table: TransitionTable,
    pub(crate) decide: Option<DecideFn>,
}

impl Debug for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("variant", &self.variant)
            .field("states", &self.states.len())
            .field("alphabet", &self.alphabet.len())
            .finish()
    }
}

impl Automaton {
    /// Builds an automaton from a descriptor, inferring the variant.
    ///
    /// The result is non-deterministic iff the descriptor carries an
    /// epsilon map, a multi-target cell, or leaves some `(state, symbol)`
    /// cell undefined; otherwise it is deterministic.
    pub fn build(descriptor: AutomatonDescriptor) -> Result<Self, AutomatonError> {
        let variant = infer_variant(&descriptor);
        Self::construct(variant, descriptor, None)
    }

    /// Builds a deterministic automaton; the transition function must be
    /// total and single-valued, and no epsilon map may be present.
    pub fn deterministic(descriptor: AutomatonDescriptor) -> Result<Self, AutomatonError> {
        Self::construct(Variant::Deterministic, descriptor, None)
    }

    /// Builds a non-deterministic automaton.
    pub fn non_deterministic(descriptor: AutomatonDescriptor) -> Result<Self, AutomatonError> {
        Self::construct(Variant::NonDeterministic, descriptor, None)
    }

    /// Builds an automaton with a caller-supplied decision hook.
    pub fn with_decide(
        variant: Variant,
        descriptor: AutomatonDescriptor,
        decide: DecideFn,
    ) -> Result<Self, AutomatonError> {
        Self::construct(variant, descriptor, Some(decide))
    }

    fn construct(
        variant: Variant,
        descriptor: AutomatonDescriptor,
        decide: Option<DecideFn>,
    ) -> Result<Self, AutomatonError> {
        let automaton = validate(variant, descriptor, decide)?;
        debug!(
            "built {:?} automaton `{}` with {} states",
            automaton.variant,
            automaton.id,
            automaton.states.len()
        );
        Ok(automaton)
    }

    /// Assembles an automaton from already-validated parts.
    ///
    /// Used by determinization and composition, whose outputs satisfy the
    /// structural invariants by construction.
    pub(crate) fn from_parts(
        id: String,
        label: String,
        description: String,
        variant: Variant,
        states: Vec<String>,
        alphabet: Vec<String>,
        start: StateId,
        finals: Vec<bool>,
        table: TransitionTable,
        decide: Option<DecideFn>,
    ) -> Self {
        let symbol_ids = alphabet
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self {
            id,
            label,
            description,
            variant,
            states,
            alphabet,
            symbol_ids,
            start,
            finals,
            table,
            decide,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn variant(&self) -> Variant {
        self.variant
    }
    pub fn states(&self) -> &[String] {
        &self.states
    }
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }
    pub fn start_state(&self) -> &str {
        &self.states[self.start]
    }

    /// Final states, in declaration order.
    pub fn final_states(&self) -> Vec<&str> {
        self.states
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.finals[i])
            .map(|(_, name)| name.as_str())
            .collect()
    }

    pub(crate) fn symbol_id(&self, symbol: &str) -> Option<SymbolId> {
        self.symbol_ids.get(symbol).copied()
    }

    pub(crate) fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s == name)
    }

    /// The deterministic transition table, if this is a DFA.
    pub(crate) fn det_table(&self) -> Option<&Vec<Vec<StateId>>> {
        match &self.table {
            TransitionTable::Deterministic(table) => Some(table),
            TransitionTable::NonDeterministic { .. } => None,
        }
    }

    fn char_symbol(&self, ch: char) -> Option<SymbolId> {
        let mut buf = [0u8; 4];
        self.symbol_id(ch.encode_utf8(&mut buf))
    }

    /// Runs the automaton over `input` and reports structural acceptance,
    /// before the decision hook is applied.
    ///
    /// A character outside the alphabet is an immediate reject; this is the
    /// only way a run over a declared alphabet can short-circuit.
    pub(crate) fn structural_accept(&self, input: &str) -> bool {
        match &self.table {
            TransitionTable::Deterministic(table) => {
                let mut current = self.start;
                for ch in input.chars() {
                    match self.char_symbol(ch) {
                        Some(symbol) => current = table[current][symbol],
                        None => return false,
                    }
                }
                self.finals[current]
            }
            TransitionTable::NonDeterministic { moves, epsilon } => {
                let mut current = closure_set(epsilon, [self.start]);
                for ch in input.chars() {
                    let symbol = match self.char_symbol(ch) {
                        Some(symbol) => symbol,
                        None => return false,
                    };
                    let seed = current
                        .iter()
                        .flat_map(|&s| moves[s][symbol].iter().copied())
                        .collect::<Vec<_>>();
                    current = closure_set(epsilon, seed);
                }
                current.iter().any(|&s| self.finals[s])
            }
        }
    }

    /// Decides acceptance of `input`: the structural run result passed
    /// through the automaton's decision hook, if one is installed.
    pub fn test(&self, input: &str) -> bool {
        let structural = self.structural_accept(input);
        match &self.decide {
            Some(decide) => decide(input, structural),
            None => structural,
        }
    }

    /// Renders the automaton back into a plain descriptor for display.
    pub fn to_descriptor(&self) -> AutomatonDescriptor {
        let mut transitions: HashMap<String, HashMap<String, TransitionTarget>> = HashMap::new();
        let mut epsilon_transitions = None;
        match &self.table {
            TransitionTable::Deterministic(table) => {
                for (s, row) in table.iter().enumerate() {
                    let cells = transitions.entry(self.states[s].clone()).or_default();
                    for (a, &target) in row.iter().enumerate() {
                        cells.insert(
                            self.alphabet[a].clone(),
                            TransitionTarget::Single(self.states[target].clone()),
                        );
                    }
                }
            }
            TransitionTable::NonDeterministic { moves, epsilon } => {
                for (s, row) in moves.iter().enumerate() {
                    for (a, targets) in row.iter().enumerate() {
                        if targets.is_empty() {
                            continue;
                        }
                        transitions.entry(self.states[s].clone()).or_default().insert(
                            self.alphabet[a].clone(),
                            TransitionTarget::Many(
                                targets.iter().map(|&t| self.states[t].clone()).collect(),
                            ),
                        );
                    }
                }
                let mut map = HashMap::new();
                for (s, targets) in epsilon.iter().enumerate() {
                    if !targets.is_empty() {
                        map.insert(
                            self.states[s].clone(),
                            targets.iter().map(|&t| self.states[t].clone()).collect(),
                        );
                    }
                }
                epsilon_transitions = Some(map);
            }
        }
        AutomatonDescriptor {
            states: self.states.clone(),
            alphabet: self.alphabet.clone(),
            transitions,
            epsilon_transitions,
            start_state: self.states[self.start].clone(),
            final_states: self
                .final_states()
                .into_iter()
                .map(str::to_string)
                .collect(),
            label: self.label.clone(),
            description: self.description.clone(),
            id: Some(self.id.clone()),
        }
    }
}

fn infer_variant(descriptor: &AutomatonDescriptor) -> Variant {
    if descriptor.epsilon_transitions.is_some() {
        return Variant::NonDeterministic;
    }
    for state in &descriptor.states {
        let cells = descriptor.transitions.get(state);
        for symbol in &descriptor.alphabet {
            match cells.and_then(|c| c.get(symbol)) {
                Some(cell) if cell.is_single() => {}
                // A missing or multi-target cell forces the NFA reading.
                _ => return Variant::NonDeterministic,
            }
        }
    }
    Variant::Deterministic
}

fn validate(
    variant: Variant,
    descriptor: AutomatonDescriptor,
    decide: Option<DecideFn>,
) -> Result<Automaton, AutomatonError> {
    if descriptor.states.is_empty() {
        return Err(StructuralError::NoStates.into());
    }

    let mut state_ids: HashMap<&str, StateId> = HashMap::new();
    for (i, state) in descriptor.states.iter().enumerate() {
        if state_ids.insert(state.as_str(), i).is_some() {
            return Err(StructuralError::DuplicateState(state.clone()).into());
        }
    }
    // Repeated alphabet entries collapse onto the first occurrence.
    let mut alphabet: Vec<String> = Vec::new();
    let mut symbol_ids: HashMap<String, SymbolId> = HashMap::new();
    for symbol in &descriptor.alphabet {
        if !symbol_ids.contains_key(symbol) {
            symbol_ids.insert(symbol.clone(), alphabet.len());
            alphabet.push(symbol.clone());
        }
    }

    let start = *state_ids
        .get(descriptor.start_state.as_str())
        .ok_or_else(|| StructuralError::InvalidStartState(descriptor.start_state.clone()))?;

    let mut finals = vec![false; descriptor.states.len()];
    for state in &descriptor.final_states {
        let i = *state_ids
            .get(state.as_str())
            .ok_or_else(|| StructuralError::UndeclaredState(state.clone()))?;
        finals[i] = true;
    }

    // Reject unknown transition sources and symbols up front, so the table
    // construction below only has to resolve targets.
    for (state, cells) in &descriptor.transitions {
        if !state_ids.contains_key(state.as_str()) {
            return Err(StructuralError::UndeclaredState(state.clone()).into());
        }
        for symbol in cells.keys() {
            if !symbol_ids.contains_key(symbol) {
                return Err(StructuralError::UndeclaredSymbol(symbol.clone()).into());
            }
        }
    }

    let n_states = descriptor.states.len();
    let n_symbols = alphabet.len();

    let resolve = |state: &str, symbol: &str, target: &str| -> Result<StateId, AutomatonError> {
        state_ids.get(target).copied().ok_or_else(|| {
            StructuralError::DanglingTransition {
                state: state.to_string(),
                symbol: symbol.to_string(),
                target: target.to_string(),
            }
            .into()
        })
    };

    let table = match variant {
        Variant::Deterministic => {
            if descriptor
                .epsilon_transitions
                .as_ref()
                .is_some_and(|map| !map.is_empty())
            {
                return Err(AutomatonError::InvalidOperation(
                    "deterministic automaton cannot carry epsilon transitions".to_string(),
                ));
            }
            let mut table = vec![vec![0; n_symbols]; n_states];
            for (s, state) in descriptor.states.iter().enumerate() {
                let cells = descriptor.transitions.get(state);
                for (a, symbol) in alphabet.iter().enumerate() {
                    let cell = cells.and_then(|c| c.get(symbol)).ok_or_else(|| {
                        StructuralError::IncompleteTransitionFunction {
                            state: state.clone(),
                            symbol: symbol.clone(),
                        }
                    })?;
                    let targets = cell.targets();
                    if targets.len() != 1 {
                        return Err(StructuralError::AmbiguousTransition {
                            state: state.clone(),
                            symbol: symbol.clone(),
                        }
                        .into());
                    }
                    table[s][a] = resolve(state, symbol, &targets[0])?;
                }
            }
            TransitionTable::Deterministic(table)
        }
        Variant::NonDeterministic => {
            let mut moves = vec![vec![Vec::new(); n_symbols]; n_states];
            for (s, state) in descriptor.states.iter().enumerate() {
                if let Some(cells) = descriptor.transitions.get(state) {
                    for (a, symbol) in alphabet.iter().enumerate() {
                        if let Some(cell) = cells.get(symbol) {
                            // Repeated targets collapse onto the first
                            // occurrence, keeping rendered descriptors stable.
                            for target in cell.targets() {
                                let t = resolve(state, symbol, target)?;
                                if !moves[s][a].contains(&t) {
                                    moves[s][a].push(t);
                                }
                            }
                        }
                    }
                }
            }
            let mut epsilon = vec![Vec::new(); n_states];
            if let Some(map) = &descriptor.epsilon_transitions {
                for (state, targets) in map {
                    let s = *state_ids
                        .get(state.as_str())
                        .ok_or_else(|| StructuralError::UndeclaredEpsilonState(state.clone()))?;
                    for target in targets {
                        let t = *state_ids.get(target.as_str()).ok_or_else(|| {
                            StructuralError::UndeclaredEpsilonState(target.clone())
                        })?;
                        if !epsilon[s].contains(&t) {
                            epsilon[s].push(t);
                        }
                    }
                }
            }
            TransitionTable::NonDeterministic { moves, epsilon }
        }
    };

    let id = descriptor
        .id
        .clone()
        .unwrap_or_else(|| descriptor.label.clone());
    Ok(Automaton {
        id,
        label: descriptor.label,
        description: descriptor.description,
        variant,
        states: descriptor.states,
        alphabet,
        symbol_ids,
        start,
        finals,
        table,
        decide,
    })
}
