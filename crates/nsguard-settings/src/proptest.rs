//! Property-based tests for declaration handling.
//!
//! - exported declarations rebuild an equivalent model
//! - the TOML rendering parses back to the same declaration
//! - parsing never panics on arbitrary input

use crate::{
    ConfigBuilder, NsguardConfigV1, RuleConfig, VisibleMembersConfig, export_config,
    parse_config_toml, to_config_toml,
};
use nsguard_domain::{Namespace, RuleModel};
use proptest::prelude::*;

fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![Just("App"), Just("Core"), Just("Ui"), Just("*")].prop_map(str::to_string)
}

fn arb_pattern_text() -> impl Strategy<Value = String> {
    (any::<bool>(), prop::collection::vec(arb_segment(), 0..3)).prop_map(|(tail, mut segs)| {
        if tail {
            segs.push("**".to_string());
        }
        segs.join(".")
    })
}

fn arb_rule_config() -> impl Strategy<Value = RuleConfig> {
    (arb_pattern_text(), arb_pattern_text()).prop_map(|(from, to)| RuleConfig { from, to })
}

fn arb_declaration() -> impl Strategy<Value = NsguardConfigV1> {
    (
        prop::option::of(prop_oneof![Just("allowed"), Just("disallowed")]),
        prop::option::of(1u32..50),
        prop::option::of(any::<bool>()),
        prop::collection::vec(arb_rule_config(), 0..4),
        prop::collection::vec(arb_rule_config(), 0..4),
        prop::collection::vec(
            (arb_rule_config(), prop::collection::vec("[A-Z][a-z]{0,5}", 0..3)),
            0..2,
        ),
    )
        .prop_map(|(default, max, child_parent, allowed, disallowed, visible)| {
            NsguardConfigV1 {
                default: default.map(str::to_string),
                max_issue_count: max,
                child_can_depend_on_parent_implicitly: child_parent,
                allowed,
                disallowed,
                visible_members: visible
                    .into_iter()
                    .map(|(r, types)| VisibleMembersConfig {
                        from: r.from,
                        to: r.to,
                        types,
                    })
                    .collect(),
                ..NsguardConfigV1::default()
            }
        })
}

fn arb_namespace() -> impl Strategy<Value = Namespace> {
    prop::collection::vec(prop_oneof![Just("App"), Just("Core"), Just("Ui")], 0..4)
        .prop_map(|segs| Namespace::new(segs.join(".")))
}

fn rule_lines(model: &RuleModel) -> Vec<String> {
    let mut lines: Vec<String> = model
        .rules()
        .iter()
        .map(|r| format!("{r} {:?}", r.visible_members))
        .collect();
    lines.sort();
    lines
}

proptest! {
    #[test]
    fn exported_declaration_rebuilds_equivalent_model(
        cfg in arb_declaration(),
        from in arb_namespace(),
        to in arb_namespace(),
    ) {
        // Duplicate pairs and ambiguous sets are legitimately rejected.
        let Ok(builder) = ConfigBuilder::new().merge(&cfg, None) else { return Ok(()); };
        let Ok(model) = builder.build() else { return Ok(()); };

        let exported = export_config(&model);
        let rebuilt = ConfigBuilder::new()
            .merge(&exported, None)
            .expect("exported declaration merges")
            .build()
            .expect("exported declaration builds");

        prop_assert_eq!(rebuilt.settings(), model.settings());
        prop_assert_eq!(rebuilt.exclusions(), model.exclusions());
        prop_assert_eq!(rule_lines(&rebuilt), rule_lines(&model));

        let edge = nsguard_domain::DependencyEdge::new(from, to, "src/a.cs");
        prop_assert_eq!(
            nsguard_domain::Evaluator::new(&rebuilt).classify(&edge),
            nsguard_domain::Evaluator::new(&model).classify(&edge)
        );
    }

    #[test]
    fn toml_rendering_parses_back(cfg in arb_declaration()) {
        let text = to_config_toml(&cfg).expect("serializable");
        prop_assert_eq!(parse_config_toml(&text).expect("parses"), cfg);
    }

    #[test]
    fn parse_never_panics(input in "\\PC{0,200}") {
        let _ = parse_config_toml(&input);
    }
}
