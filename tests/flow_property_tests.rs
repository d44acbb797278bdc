// Copyright 2025 Cowboy AI, LLC.

//! Property tests for the composer round-trip laws over randomly generated
//! wrapping chains and option values.

use proptest::prelude::*;

use cim_flow::{
    compose, count_flow_components, decompose, join_options, split_options, AlgorithmInstance,
    AlgorithmRegistry,
};

const LEAF_CLASSES: &[&str] = &[
    "learn.tree.RepTree",
    "learn.tree.Cart",
    "learn.rule.OneRule",
    "learn.bayes.NaiveBayes",
    "learn.fn.Logistic",
];

const META_CLASSES: &[&str] = &["learn.meta.Bagging", "learn.meta.Boosting"];

#[derive(Debug, Clone)]
struct ChainSpec {
    leaf: usize,
    leaf_flag: bool,
    levels: Vec<(usize, u8, u8)>,
}

fn chain_strategy() -> impl Strategy<Value = ChainSpec> {
    (
        0..LEAF_CLASSES.len(),
        any::<bool>(),
        prop::collection::vec((0..META_CLASSES.len(), 1u8..=100, 1u8..=50), 0..4),
    )
        .prop_map(|(leaf, leaf_flag, levels)| ChainSpec {
            leaf,
            leaf_flag,
            levels,
        })
}

fn build_chain(registry: &AlgorithmRegistry, spec: &ChainSpec) -> AlgorithmInstance {
    let mut current = registry.instantiate(LEAF_CLASSES[spec.leaf]).unwrap();
    // NaiveBayes carries flags instead of scalars
    if spec.leaf_flag && LEAF_CLASSES[spec.leaf] == "learn.bayes.NaiveBayes" {
        current.set_flag("K", true).unwrap();
    }
    for &(meta, p, i) in &spec.levels {
        let mut wrapper = registry.instantiate(META_CLASSES[meta]).unwrap();
        wrapper.set_option("P", p.to_string()).unwrap();
        wrapper.set_option("I", i.to_string()).unwrap();
        wrapper.set_slot("W", current).unwrap();
        current = wrapper;
    }
    current
}

proptest! {
    /// Instance option arrays survive compose then decompose unchanged.
    #[test]
    fn options_round_trip(spec in chain_strategy()) {
        let registry = AlgorithmRegistry::with_catalog();
        let instance = build_chain(&registry, &spec);

        let flow = compose(&instance, &[]).unwrap();
        let rebuilt = decompose(&registry, &flow).unwrap();

        prop_assert_eq!(rebuilt.options(), instance.options());
        prop_assert_eq!(&rebuilt, &instance);
    }

    /// Canonical text is a fixed point of decompose then compose.
    #[test]
    fn canonical_text_round_trip(spec in chain_strategy()) {
        let registry = AlgorithmRegistry::with_catalog();
        let instance = build_chain(&registry, &spec);

        let text = compose(&instance, &[]).unwrap().canonical_text().unwrap();
        let reparsed = serde_json::from_str(&text).unwrap();
        let rebuilt = decompose(&registry, &reparsed).unwrap();
        let text_again = compose(&rebuilt, &[]).unwrap().canonical_text().unwrap();

        prop_assert_eq!(text_again, text);
    }

    /// A chain of d wrappers has d+1 components and d nested name levels.
    #[test]
    fn component_count_matches_depth(spec in chain_strategy()) {
        let registry = AlgorithmRegistry::with_catalog();
        let instance = build_chain(&registry, &spec);

        let flow = compose(&instance, &[]).unwrap();
        prop_assert_eq!(count_flow_components(&flow), spec.levels.len() + 1);
        prop_assert_eq!(flow.name.matches('(').count(), spec.levels.len());
    }

    /// The separator count in the wrapped-learner default value equals the
    /// nesting level of the wrapped sub-tree.
    #[test]
    fn separator_count_matches_level(spec in chain_strategy()) {
        prop_assume!(!spec.levels.is_empty());

        let registry = AlgorithmRegistry::with_catalog();
        let instance = build_chain(&registry, &spec);

        let flow = compose(&instance, &[]).unwrap();
        let w_default = &flow
            .parameters
            .iter()
            .find(|p| p.name == "W")
            .unwrap()
            .default_value;

        prop_assert_eq!(w_default.matches("--").count(), spec.levels.len() - 1);
    }

    /// split_options inverts join_options for arbitrary token lists.
    #[test]
    fn split_inverts_join(tokens in prop::collection::vec("[ -~]{0,12}", 0..8)) {
        let joined = join_options(&tokens);
        let split = split_options(&joined).unwrap();
        prop_assert_eq!(split, tokens);
    }
}
