//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Specificity ordering of wildcard patterns
//! - Self-reference and determinism of classification
//! - Bounded, ordered issue output

use crate::edge::DependencyEdge;
use crate::engine::{Evaluator, analyze};
use crate::model::{PathExclusions, Rule, RuleModel, RuleVerdict};
use crate::pattern::{Namespace, NamespacePattern};
use crate::policy::{PolicySettings, Verdict};
use crate::report::{Issue, IssueReporter};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Small alphabet so generated patterns and namespaces overlap often.
fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![Just("A"), Just("B"), Just("C"), Just("Core")].prop_map(str::to_string)
}

fn arb_namespace() -> impl Strategy<Value = Namespace> {
    prop::collection::vec(arb_segment(), 0..4).prop_map(|segs| Namespace::new(segs.join(".")))
}

/// Patterns: literals and `*` anywhere, optional `**` at either end.
fn arb_pattern() -> impl Strategy<Value = NamespacePattern> {
    let inner = prop::collection::vec(
        prop_oneof![3 => arb_segment(), 1 => Just("*".to_string())],
        0..3,
    );
    (any::<bool>(), inner, any::<bool>()).prop_map(|(lead, mut segs, trail)| {
        if lead {
            segs.insert(0, "**".to_string());
        }
        if trail && !segs.is_empty() {
            segs.push("**".to_string());
        }
        NamespacePattern::parse(&segs.join(".")).expect("generated pattern is valid")
    })
}

fn arb_rule_verdict() -> impl Strategy<Value = RuleVerdict> {
    prop_oneof![Just(RuleVerdict::Allowed), Just(RuleVerdict::Disallowed)]
}

fn arb_rule() -> impl Strategy<Value = Rule> {
    (arb_pattern(), arb_pattern(), arb_rule_verdict()).prop_map(|(s, t, v)| Rule::new(s, t, v))
}

fn arb_default() -> impl Strategy<Value = Verdict> {
    prop_oneof![Just(Verdict::Allowed), Just(Verdict::Disallowed)]
}

/// Rule sets that compile (ambiguous ones are discarded).
fn arb_rules() -> impl Strategy<Value = Vec<Rule>> {
    prop::collection::vec(arb_rule(), 0..6).prop_filter("rule set must be unambiguous", |rules| {
        RuleModel::new(rules.clone(), PolicySettings::default(), PathExclusions::none()).is_ok()
    })
}

fn build(rules: Vec<Rule>, default_verdict: Verdict) -> RuleModel {
    RuleModel::new(
        rules,
        PolicySettings {
            default_verdict,
            ..PolicySettings::default()
        },
        PathExclusions::none(),
    )
    .expect("filtered to unambiguous")
}

fn edge(from: &Namespace, to: &Namespace) -> DependencyEdge {
    DependencyEdge::new(from.clone(), to.clone(), "src/x.cs")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn more_leading_literals_is_strictly_more_specific(a in arb_pattern(), b in arb_pattern()) {
        let sa = a.specificity();
        let sb = b.specificity();
        if sa.leading_literals() > sb.leading_literals() {
            prop_assert!(sa > sb);
        }
    }

    #[test]
    fn specificity_is_antisymmetric(a in arb_pattern(), b in arb_pattern()) {
        let ab = a.specificity().cmp(&b.specificity());
        let ba = b.specificity().cmp(&a.specificity());
        prop_assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn overlap_is_symmetric(a in arb_pattern(), b in arb_pattern()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn a_common_match_implies_overlap(a in arb_pattern(), b in arb_pattern(), ns in arb_namespace()) {
        if a.matches(&ns) && b.matches(&ns) {
            prop_assert!(a.overlaps(&b));
        }
    }

    #[test]
    fn self_reference_is_always_allowed(
        rules in arb_rules(),
        default in arb_default(),
        ns in arb_namespace(),
    ) {
        let model = build(rules, default);
        let ev = Evaluator::new(&model);
        prop_assert_eq!(ev.classify(&edge(&ns, &ns)), Verdict::Allowed);
    }

    #[test]
    fn declaration_order_does_not_change_verdicts(
        rules in arb_rules(),
        default in arb_default(),
        from in arb_namespace(),
        to in arb_namespace(),
    ) {
        let mut reversed = rules.clone();
        reversed.reverse();
        let forward = build(rules, default);
        let backward = build(reversed, default);

        let e = edge(&from, &to);
        prop_assert_eq!(
            Evaluator::new(&forward).classify(&e),
            Evaluator::new(&backward).classify(&e)
        );
    }

    #[test]
    fn winning_rule_is_a_most_specific_match(
        rules in arb_rules(),
        from in arb_namespace(),
        to in arb_namespace(),
    ) {
        let model = build(rules, Verdict::Disallowed);
        let ev = Evaluator::new(&model);
        let decision = ev.evaluate(&edge(&from, &to));
        if let Some(winner) = decision.rule {
            for other in model.rules() {
                if other.source.matches(&from) && other.target.matches(&to) {
                    prop_assert!(winner.specificity() >= other.specificity());
                }
            }
        }
    }

    #[test]
    fn issue_output_is_bounded_and_ordered(
        max in 1usize..5,
        targets in prop::collection::vec(arb_namespace(), 0..12),
    ) {
        let model = build(Vec::new(), Verdict::Disallowed);
        let ev = Evaluator::new(&model);
        let from = Namespace::new("Source.Only");
        let edges: Vec<_> = targets.iter().map(|t| edge(&from, t)).collect();

        let mut reporter = IssueReporter::new(max);
        let summary = analyze(&ev, edges, &mut reporter);
        let issues = reporter.drain();

        let dependency_issues: Vec<_> = issues.iter().filter_map(Issue::edge).collect();
        prop_assert!(dependency_issues.len() <= max);
        prop_assert_eq!(summary.truncated, targets.len() > max);

        let expected: Vec<_> = targets.iter().take(max).collect();
        let actual: Vec<_> = dependency_issues.iter().map(|e| &e.to_namespace).collect();
        prop_assert_eq!(actual, expected);
    }
}
