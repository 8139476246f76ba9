//! Context-free grammars and the terminability fixpoint.
//!
//! A variable is *terminable* (productive) when it can derive a string of
//! terminals only. The classical fixpoint marks a variable as soon as one
//! of its alternatives consists entirely of terminals or already-terminable
//! variables, and repeats until a full pass adds nothing; each productive
//! pass adds at least one variable, so at most `|variables|` passes run.
//! An epsilon alternative is vacuously terminable.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::descriptor::GrammarDescriptor;
use crate::error::AutomatonError;

/// Outcome of a terminability analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationCheck {
    /// Every declared variable can derive a terminal string.
    AllTerminable,
    /// The variables that never became terminable, in declaration order.
    /// A non-empty list indicates an unproductive grammar.
    NonTerminable(Vec<String>),
}

impl TerminationCheck {
    pub fn is_terminable(&self) -> bool {
        matches!(self, TerminationCheck::AllTerminable)
    }
}

/// A validated context-free grammar.
///
/// Variables are the rule keys, in declaration order; terminals are
/// inferred as the alternative tokens that are not variables.
#[derive(Debug, Clone)]
pub struct Grammar {
    label: String,
    variables: Vec<String>,
    terminals: Vec<String>,
    rules: HashMap<String, Vec<Vec<String>>>,
}

impl Grammar {
    /// Builds a grammar from a descriptor. Rules listed twice for the same
    /// variable are merged in order.
    pub fn build(descriptor: GrammarDescriptor) -> Self {
        let mut variables = Vec::new();
        let mut rules: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for rule in descriptor.rules {
            if !rules.contains_key(&rule.variable) {
                variables.push(rule.variable.clone());
            }
            rules
                .entry(rule.variable)
                .or_default()
                .extend(rule.substitutions);
        }

        let variable_set: HashSet<&String> = variables.iter().collect();
        let mut terminals = Vec::new();
        let mut seen = HashSet::new();
        for variable in &variables {
            for alternative in &rules[variable] {
                for token in alternative {
                    if !variable_set.contains(token) && seen.insert(token.clone()) {
                        terminals.push(token.clone());
                    }
                }
            }
        }

        Grammar {
            label: descriptor.label,
            variables,
            terminals,
            rules,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    /// Alternatives of `variable`, in declaration order.
    pub fn alternatives(&self, variable: &str) -> Option<&[Vec<String>]> {
        self.rules.get(variable).map(Vec::as_slice)
    }

    /// Runs the terminability fixpoint over this grammar's rules.
    pub fn check_termination(&self) -> Result<TerminationCheck, AutomatonError> {
        run_fixpoint(
            &self.terminals.iter().cloned().collect(),
            &self.variables,
            &self.rules,
        )
    }
}

/// Determines which variables of `transition_record` can derive a string of
/// terminals only. Alternatives are flat strings; each character is one
/// symbol.
///
/// Returns [`TerminationCheck::AllTerminable`] when every declared variable
/// is terminable, otherwise the ordered list of variables that never became
/// terminable. A referenced symbol that is neither a terminal nor a key of
/// the record fails with [`AutomatonError::UndeclaredVariable`].
pub fn check_for_termination(
    terminals: &[String],
    variables: &[String],
    transition_record: &HashMap<String, Vec<String>>,
) -> Result<TerminationCheck, AutomatonError> {
    // Tokenize the flat words: one character, one symbol.
    let rules = transition_record
        .iter()
        .map(|(variable, words)| {
            let alternatives = words
                .iter()
                .map(|word| word.chars().map(String::from).collect())
                .collect();
            (variable.clone(), alternatives)
        })
        .collect();
    run_fixpoint(&terminals.iter().cloned().collect(), variables, &rules)
}

fn run_fixpoint(
    terminals: &HashSet<String>,
    variables: &[String],
    rules: &HashMap<String, Vec<Vec<String>>>,
) -> Result<TerminationCheck, AutomatonError> {
    // Validate references before iterating, so the fixpoint itself is total.
    for alternatives in rules.values() {
        for alternative in alternatives {
            for token in alternative {
                if !terminals.contains(token) && !rules.contains_key(token) {
                    return Err(AutomatonError::UndeclaredVariable(token.clone()));
                }
            }
        }
    }

    let mut terminable: HashSet<&str> = HashSet::new();
    loop {
        let mut changed = false;
        for variable in variables {
            if terminable.contains(variable.as_str()) {
                continue;
            }
            let alternatives = match rules.get(variable) {
                Some(alternatives) => alternatives,
                // Declared but ruleless: can never terminate.
                None => continue,
            };
            let derives_terminals = alternatives.iter().any(|alternative| {
                alternative
                    .iter()
                    .all(|token| terminals.contains(token) || terminable.contains(token.as_str()))
            });
            if derives_terminals {
                debug!("variable `{}` is terminable", variable);
                terminable.insert(variable.as_str());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let defective: Vec<String> = variables
        .iter()
        .filter(|v| !terminable.contains(v.as_str()))
        .cloned()
        .collect();
    if defective.is_empty() {
        Ok(TerminationCheck::AllTerminable)
    } else {
        Ok(TerminationCheck::NonTerminable(defective))
    }
}
