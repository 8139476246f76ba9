//! Boolean composition of deterministic automata.
//!
//! [`and`][Automaton::and] and [`or`][Automaton::or] build the full product
//! of the two operand state spaces: every pair is materialized eagerly,
//! even pairs unreachable from the composite start state. That costs
//! `|S1| * |S2|` states regardless of reachability and is a deliberate
//! simplicity trade-off, unlike the lazy discovery in
//! [`determinize`][crate::determinize::determinize].
//!
//! Internally a pair is a pair of indices; the joined `stateA.stateB` names
//! exist only in the rendered state list. A separator occurring inside an
//! operand state name would make those names ambiguous and is rejected.
//!
//! Composition acts on the decision hook too. When neither operand carries
//! a custom hook the product finals already encode the operator and the
//! result needs no hook of its own; otherwise the result's hook closes over
//! clones of the operands and combines their full `test` verdicts with the
//! same operator. Structural product and hook composition therefore agree
//! at any nesting depth, and `NOT` complements acceptance exactly once.

use std::sync::Arc;

use log::debug;

use crate::automaton::{Automaton, DecideFn, TransitionTable, Variant};
use crate::error::AutomatonError;

/// Boolean operator applied by [`Automaton::merge`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MergeOp {
    And,
    Or,
    /// Unary; rejects a second operand.
    Not,
}

impl MergeOp {
    fn name(self) -> &'static str {
        match self {
            MergeOp::And => "and",
            MergeOp::Or => "or",
            MergeOp::Not => "not",
        }
    }

    fn apply(self, a: bool, b: bool) -> bool {
        match self {
            MergeOp::And => a && b,
            MergeOp::Or => a || b,
            MergeOp::Not => !a,
        }
    }
}

/// Presentation overrides for a composed automaton.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Separator between the operand parts of composite identifiers;
    /// defaults to `"."`.
    pub separator: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl Automaton {
    /// Intersection: accepts a string iff both operands accept it.
    pub fn and(
        &self,
        other: &Automaton,
        options: MergeOptions,
    ) -> Result<Automaton, AutomatonError> {
        self.merge(Some(other), MergeOp::And, options)
    }

    /// Union: accepts a string iff either operand accepts it.
    pub fn or(
        &self,
        other: &Automaton,
        options: MergeOptions,
    ) -> Result<Automaton, AutomatonError> {
        self.merge(Some(other), MergeOp::Or, options)
    }

    /// Complement: accepts exactly the strings this automaton rejects.
    pub fn not(&self, options: MergeOptions) -> Result<Automaton, AutomatonError> {
        self.merge(None, MergeOp::Not, options)
    }

    /// Composes deterministic automata under `op`.
    ///
    /// `MergeOp::Not` is strictly unary and fails with
    /// [`AutomatonError::InvalidOperation`] when a second operand is
    /// supplied; `And`/`Or` require one. Operands sharing the same identity
    /// skip the product and operate on the single state space directly,
    /// since the cross product degenerates to the diagonal.
    pub fn merge(
        &self,
        other: Option<&Automaton>,
        op: MergeOp,
        options: MergeOptions,
    ) -> Result<Automaton, AutomatonError> {
        if self.variant != Variant::Deterministic {
            return Err(AutomatonError::InvalidOperation(
                "boolean composition requires deterministic operands".to_string(),
            ));
        }
        match op {
            MergeOp::Not => {
                if other.is_some() {
                    return Err(AutomatonError::InvalidOperation(
                        "NOT is a unary operation and takes no second operand".to_string(),
                    ));
                }
                Ok(self.complement(options))
            }
            MergeOp::And | MergeOp::Or => {
                let other = other.ok_or_else(|| {
                    AutomatonError::InvalidOperation(format!(
                        "{} requires a second operand",
                        op.name().to_uppercase()
                    ))
                })?;
                if other.variant != Variant::Deterministic {
                    return Err(AutomatonError::InvalidOperation(
                        "boolean composition requires deterministic operands".to_string(),
                    ));
                }
                if self.alphabet != other.alphabet {
                    return Err(AutomatonError::InvalidOperation(
                        "composed automata must share an alphabet".to_string(),
                    ));
                }
                if self.id == other.id {
                    Ok(self.merge_diagonal(other, op, options))
                } else {
                    self.product(other, op, options)
                }
            }
        }
    }

    /// Unary complement over this automaton's own state space.
    fn complement(&self, options: MergeOptions) -> Automaton {
        debug!("not({})", self.id);
        let inner = self.clone();
        // The flipped finals cannot stand alone: a structural run rejects
        // inputs with symbols outside the alphabet, and the complement must
        // accept exactly those.
        let decide: Option<DecideFn> =
            Some(Arc::new(move |input, _structural| !inner.test(input)));
        Automaton::from_parts(
            self.id.clone(),
            options.label.unwrap_or_else(|| format!("not({})", self.label)),
            options
                .description
                .unwrap_or_else(|| format!("NOT({})", self.description)),
            Variant::Deterministic,
            self.states.clone(),
            self.alphabet.clone(),
            self.start,
            self.finals.iter().map(|&f| !f).collect(),
            self.table.clone(),
            decide,
        )
    }

    /// Binary merge of two automata with the same identity: the product of
    /// an automaton with itself collapses to its own state space.
    fn merge_diagonal(&self, other: &Automaton, op: MergeOp, options: MergeOptions) -> Automaton {
        debug!("{}({}, {}) over the diagonal", op.name(), self.id, other.id);
        let finals = self
            .states
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let other_final = other
                    .state_id(name)
                    .map(|j| other.finals[j])
                    .unwrap_or(false);
                op.apply(self.finals[i], other_final)
            })
            .collect();
        Automaton::from_parts(
            self.id.clone(),
            options
                .label
                .unwrap_or_else(|| format!("{}({}, {})", op.name(), self.label, other.label)),
            options.description.unwrap_or_else(|| {
                format!(
                    "{}({}, {})",
                    op.name().to_uppercase(),
                    self.description,
                    other.description
                )
            }),
            Variant::Deterministic,
            self.states.clone(),
            self.alphabet.clone(),
            self.start,
            finals,
            self.table.clone(),
            compose_decide(self, other, op),
        )
    }

    /// Full product construction for operands with distinct identities.
    fn product(
        &self,
        other: &Automaton,
        op: MergeOp,
        options: MergeOptions,
    ) -> Result<Automaton, AutomatonError> {
        let separator = options.separator.unwrap_or_else(|| ".".to_string());
        for state in self.states.iter().chain(&other.states) {
            if state.contains(&separator) {
                return Err(AutomatonError::SeparatorCollision {
                    separator,
                    state: state.clone(),
                });
            }
        }

        // These tables exist: both operands passed the variant check.
        let (t1, t2) = match (self.det_table(), other.det_table()) {
            (Some(t1), Some(t2)) => (t1, t2),
            _ => {
                return Err(AutomatonError::InvalidOperation(
                    "boolean composition requires deterministic operands".to_string(),
                ))
            }
        };

        let n1 = self.states.len();
        let n2 = other.states.len();
        let n_symbols = self.alphabet.len();
        debug!(
            "{}({}, {}): product of {} x {} states",
            op.name(),
            self.id,
            other.id,
            n1,
            n2
        );

        // Pair (i, j) lives at index i * n2 + j; names are rendered
        // row-major in the same order.
        let mut states = Vec::with_capacity(n1 * n2);
        let mut finals = Vec::with_capacity(n1 * n2);
        let mut table = Vec::with_capacity(n1 * n2);
        for i in 0..n1 {
            for j in 0..n2 {
                states.push(format!(
                    "{}{}{}",
                    self.states[i], separator, other.states[j]
                ));
                finals.push(op.apply(self.finals[i], other.finals[j]));
                let mut row = Vec::with_capacity(n_symbols);
                for a in 0..n_symbols {
                    // Step both operands independently and re-pair.
                    row.push(t1[i][a] * n2 + t2[j][a]);
                }
                table.push(row);
            }
        }

        Ok(Automaton::from_parts(
            format!("{}{}{}", self.id, separator, other.id),
            options
                .label
                .unwrap_or_else(|| format!("{}({}, {})", op.name(), self.label, other.label)),
            options.description.unwrap_or_else(|| {
                format!(
                    "{}({}, {})",
                    op.name().to_uppercase(),
                    self.description,
                    other.description
                )
            }),
            Variant::Deterministic,
            states,
            self.alphabet.clone(),
            self.start * n2 + other.start,
            finals,
            TransitionTable::Deterministic(table),
            compose_decide(self, other, op),
        ))
    }
}

/// Builds the composed decision hook, if the composite needs one.
///
/// When neither operand carries a custom hook, its `test` equals its
/// structural run, and the combined finals already realize the operator,
/// symbols outside the alphabet included (both sides reject them, and so
/// does the product). Otherwise the hook re-tests both operands in full and
/// combines the verdicts, which keeps deeply nested compositions exact.
fn compose_decide(a: &Automaton, b: &Automaton, op: MergeOp) -> Option<DecideFn> {
    if matches!(op, MergeOp::And | MergeOp::Or) && a.decide.is_none() && b.decide.is_none() {
        return None;
    }
    let a = a.clone();
    let b = b.clone();
    match op {
        MergeOp::And => Some(Arc::new(move |input, _| a.test(input) && b.test(input))),
        MergeOp::Or => Some(Arc::new(move |input, _| a.test(input) || b.test(input))),
        MergeOp::Not => Some(Arc::new(move |input, _| !a.test(input))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::{dfa_descriptor, strings_up_to};

    use test_log::test;

    /// DFA over {a, b} accepting strings with an even number of `a`s.
    fn even_a() -> Automaton {
        Automaton::deterministic(dfa_descriptor(
            &["e", "o"],
            &["a", "b"],
            &[("e", "a", "o"), ("e", "b", "e"), ("o", "a", "e"), ("o", "b", "o")],
            "e",
            &["e"],
        ))
        .unwrap()
    }

    /// DFA over {a, b} accepting strings ending in `b`.
    fn ends_in_b() -> Automaton {
        Automaton::deterministic(dfa_descriptor(
            &["s", "t"],
            &["a", "b"],
            &[("s", "a", "s"), ("s", "b", "t"), ("t", "a", "s"), ("t", "b", "t")],
            "s",
            &["t"],
        ))
        .unwrap()
    }

    #[test]
    fn test_or_law() {
        let a = even_a();
        let b = ends_in_b();
        let or = a.or(&b, MergeOptions::default()).unwrap();
        for input in strings_up_to(&["a", "b"], 4) {
            assert_eq!(
                or.test(&input),
                a.test(&input) || b.test(&input),
                "input = {:?}",
                input
            );
        }
    }

    #[test]
    fn test_and_law() {
        let a = even_a();
        let b = ends_in_b();
        let and = a.and(&b, MergeOptions::default()).unwrap();
        for input in strings_up_to(&["a", "b"], 4) {
            assert_eq!(
                and.test(&input),
                a.test(&input) && b.test(&input),
                "input = {:?}",
                input
            );
        }
    }

    #[test]
    fn test_not_law() {
        let a = even_a();
        let not = a.not(MergeOptions::default()).unwrap();
        for input in strings_up_to(&["a", "b"], 4) {
            assert_eq!(not.test(&input), !a.test(&input), "input = {:?}", input);
        }
        // Symbols outside the alphabet: the operand rejects, so the
        // complement accepts.
        assert!(!a.test("xz"));
        assert!(not.test("xz"));
    }

    #[test]
    fn test_double_negation() {
        let a = even_a();
        let back = a
            .not(MergeOptions::default())
            .unwrap()
            .not(MergeOptions::default())
            .unwrap();
        for input in strings_up_to(&["a", "b"], 4) {
            assert_eq!(back.test(&input), a.test(&input), "input = {:?}", input);
        }
    }

    #[test]
    fn test_nested_composition() {
        // (A AND B) OR NOT B
        let a = even_a();
        let b = ends_in_b();
        let and = a.and(&b, MergeOptions::default()).unwrap();
        let not_b = b.not(MergeOptions::default()).unwrap();

        // The inner composite's state names contain the default separator,
        // so the outer level needs a separator of its own.
        let err = and.or(&not_b, MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::SeparatorCollision { .. }));

        let composed = and
            .or(
                &not_b,
                MergeOptions {
                    separator: Some("|".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        for input in strings_up_to(&["a", "b"], 4) {
            let expected = (a.test(&input) && b.test(&input)) || !b.test(&input);
            assert_eq!(composed.test(&input), expected, "input = {:?}", input);
        }
    }

    #[test]
    fn test_default_hook_operands_compose_structurally() {
        let a = even_a();
        let b = ends_in_b();

        // Hook-free operands answer through their tables alone, so the
        // product finals carry the operator and no hook is installed. Each
        // `test` then runs the product table once instead of re-testing
        // both operands.
        let and = a.and(&b, MergeOptions::default()).unwrap();
        assert!(and.decide.is_none());
        let nested = and
            .or(
                &b,
                MergeOptions {
                    separator: Some("|".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(nested.decide.is_none());
        for input in strings_up_to(&["a", "b"], 4) {
            let expected = (a.test(&input) && b.test(&input)) || b.test(&input);
            assert_eq!(nested.test(&input), expected, "input = {:?}", input);
        }
        assert!(!and.test("xz"));
        assert!(!nested.test("xz"));

        // A custom hook on either operand forces hook composition.
        let c = Automaton::with_decide(
            Variant::Deterministic,
            dfa_descriptor(
                &["p"],
                &["a", "b"],
                &[("p", "a", "p"), ("p", "b", "p")],
                "p",
                &["p"],
            ),
            Arc::new(|input, structural| structural && input.len() < 3),
        )
        .unwrap();
        let with_hook = a.and(&c, MergeOptions::default()).unwrap();
        assert!(with_hook.decide.is_some());
        for input in strings_up_to(&["a", "b"], 4) {
            assert_eq!(
                with_hook.test(&input),
                a.test(&input) && c.test(&input),
                "input = {:?}",
                input
            );
        }
    }

    #[test]
    fn test_not_rejects_second_operand() {
        let a = even_a();
        let b = ends_in_b();
        let err = a.merge(Some(&b), MergeOp::Not, MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidOperation(_)));
    }

    #[test]
    fn test_binary_requires_second_operand() {
        let a = even_a();
        let err = a.merge(None, MergeOp::And, MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidOperation(_)));
    }

    #[test]
    fn test_product_state_space_is_eager() {
        let a = even_a();
        let b = ends_in_b();
        let or = a.or(&b, MergeOptions::default()).unwrap();
        // Full Cartesian product, reachable or not.
        assert_eq!(or.states().len(), 4);
        assert_eq!(or.start_state(), "e.s");
        assert!(or.states().contains(&"o.t".to_string()));
    }

    #[test]
    fn test_self_merge_skips_product() {
        let a = even_a();
        let same = a.or(&a, MergeOptions::default()).unwrap();
        // Diagonal fast path: no blow-up to |S|^2.
        assert_eq!(same.states().len(), a.states().len());
        for input in strings_up_to(&["a", "b"], 3) {
            assert_eq!(same.test(&input), a.test(&input));
        }
    }

    #[test]
    fn test_separator_collision_is_rejected() {
        let a = Automaton::deterministic(dfa_descriptor(
            &["x.y"],
            &["a"],
            &[("x.y", "a", "x.y")],
            "x.y",
            &[],
        ))
        .unwrap();
        let b = Automaton::deterministic(dfa_descriptor(
            &["z"],
            &["a"],
            &[("z", "a", "z")],
            "z",
            &["z"],
        ))
        .unwrap();
        let err = a.or(&b, MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::SeparatorCollision { .. }));

        // A custom separator that avoids the collision works.
        let or = a
            .or(
                &b,
                MergeOptions {
                    separator: Some("|".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(or.start_state(), "x.y|z");
    }

    #[test]
    fn test_composite_metadata_defaults() {
        let mut desc_a = dfa_descriptor(&["p"], &["a"], &[("p", "a", "p")], "p", &["p"]);
        desc_a.label = "A".to_string();
        desc_a.description = "all strings".to_string();
        let mut desc_b = dfa_descriptor(&["q"], &["a"], &[("q", "a", "q")], "q", &[]);
        desc_b.label = "B".to_string();
        desc_b.description = "nothing".to_string();
        let a = Automaton::deterministic(desc_a).unwrap();
        let b = Automaton::deterministic(desc_b).unwrap();

        let and = a.and(&b, MergeOptions::default()).unwrap();
        assert_eq!(and.label(), "and(A, B)");
        assert_eq!(and.description(), "AND(all strings, nothing)");

        let not = a.not(MergeOptions::default()).unwrap();
        assert_eq!(not.label(), "not(A)");

        let labeled = a
            .and(
                &b,
                MergeOptions {
                    label: Some("custom".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(labeled.label(), "custom");
    }

    #[test]
    fn test_mismatched_alphabets_rejected() {
        let a = even_a();
        let b = Automaton::deterministic(dfa_descriptor(
            &["z"],
            &["x"],
            &[("z", "x", "z")],
            "z",
            &["z"],
        ))
        .unwrap();
        let err = a.and(&b, MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidOperation(_)));
    }

    #[test]
    fn test_composition_rejects_nfa_operand() {
        use crate::testutil::nfa_descriptor;
        let a = even_a();
        let nfa = Automaton::non_deterministic(nfa_descriptor(
            &["A"],
            &["a", "b"],
            &[("A", "a", &["A"])],
            &[],
            "A",
            &["A"],
        ))
        .unwrap();
        let err = a.and(&nfa, MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidOperation(_)));
        let err = nfa.not(MergeOptions::default()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidOperation(_)));
    }

    #[test]
    fn test_merge_copies_operand_tables() {
        // The composed automaton owns its tables; dropping the operands
        // must leave it fully functional.
        let composed = {
            let a = even_a();
            let b = ends_in_b();
            a.and(&b, MergeOptions::default()).unwrap()
        };
        assert!(composed.test("aab"));
        assert!(!composed.test("ab"));
    }
}
