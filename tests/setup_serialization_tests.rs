// Copyright 2025 Cowboy AI, LLC.

//! Setup serialization tests: capture the values of configured instances,
//! round-trip the flow through a store, and rebuild the configured instance
//! from the flow's structure plus the setup's values.

use cim_flow::{
    compose, instance_from_setup, setup_from_instance, AlgorithmInstance, AlgorithmRegistry,
    FlowStore, InMemoryFlowStore, PlatformConfig,
};

const CONFIG_STRING: &str = "server=https://flows.example.org/; avoid_duplicate_uploads=false; \
                             api_key=8baa83ecddfe44b561fd3d92442e3319; tags=cim-flow";

fn store_for(config: &PlatformConfig) -> InMemoryFlowStore {
    if config.avoid_duplicate_uploads {
        InMemoryFlowStore::rejecting_duplicates()
    } else {
        InMemoryFlowStore::new()
    }
}

/// Round-trip one configured instance: flow through the store, values
/// through a setup, and verify the reconstruction matches.
async fn round_trip_setup(
    registry: &AlgorithmRegistry,
    store: &InMemoryFlowStore,
    tags: &[String],
    instance: &AlgorithmInstance,
) -> AlgorithmInstance {
    let flow_orig = compose(instance, tags).unwrap();
    let receipt = store.upload(&flow_orig).await.unwrap();
    let flow = store.get(receipt.flow_id).await.unwrap();

    let setup = setup_from_instance(instance);
    let retrieved = instance_from_setup(registry, &setup, &flow).unwrap();

    // the stored flow reproduces the original descriptor exactly
    assert_eq!(
        flow.canonical_text().unwrap(),
        flow_orig.canonical_text().unwrap()
    );

    // the reconstructed instance carries the configured values
    assert_eq!(retrieved.options(), instance.options());
    assert_eq!(retrieved, *instance);

    retrieved
}

#[tokio::test]
async fn cart_setup_round_trip() {
    let config: PlatformConfig = CONFIG_STRING.parse().unwrap();
    let registry = AlgorithmRegistry::with_catalog();
    let store = store_for(&config);

    let mut cart = registry.instantiate("learn.tree.Cart").unwrap();
    cart.set_option("C", "0.03").unwrap();
    cart.set_option("M", "10").unwrap();

    round_trip_setup(&registry, &store, &config.tags, &cart).await;
}

/// Wrap the base in bagging ensembles level by level, configuring each level
/// differently so the setup carries values the flow defaults do not.
async fn add_level(
    registry: &AlgorithmRegistry,
    store: &InMemoryFlowStore,
    base: AlgorithmInstance,
    current_level: usize,
    max_level: usize,
) {
    if current_level > max_level {
        return;
    }
    let mut meta = registry.instantiate("learn.meta.Bagging").unwrap();
    meta.set_slot("W", base).unwrap();
    meta.set_option("P", ((current_level + 1) * 7).to_string())
        .unwrap();
    meta.set_option("I", (current_level + 2).to_string())
        .unwrap();

    let retrieved = round_trip_setup(registry, store, &[], &meta).await;
    assert_eq!(
        retrieved.option_value("P"),
        Some(((current_level + 1) * 7).to_string().as_str())
    );

    Box::pin(add_level(registry, store, meta, current_level + 1, max_level)).await;
}

#[tokio::test]
async fn multi_level_bagging_tree_setup() {
    let registry = AlgorithmRegistry::with_catalog();
    let store = InMemoryFlowStore::new();

    let mut cart = registry.instantiate("learn.tree.Cart").unwrap();
    cart.set_option("C", "0.03").unwrap();
    cart.set_option("M", "10").unwrap();

    add_level(&registry, &store, cart, 0, 3).await;
}

#[tokio::test]
async fn multi_level_bagging_svm_setup() {
    let registry = AlgorithmRegistry::with_catalog();
    let store = InMemoryFlowStore::new();

    let mut rbf = registry.instantiate("kernel.Rbf").unwrap();
    rbf.set_option("G", "0.32").unwrap();
    let mut svm = registry.instantiate("learn.fn.Svm").unwrap();
    svm.set_slot("K", rbf).unwrap();
    svm.set_option("C", "0.21").unwrap();

    add_level(&registry, &store, svm, 0, 2).await;
}

/// Flags set on a nested component survive the setup round trip.
#[tokio::test]
async fn nested_flag_setup_round_trip() {
    let registry = AlgorithmRegistry::with_catalog();
    let store = InMemoryFlowStore::new();

    let mut bayes = registry.instantiate("learn.bayes.NaiveBayes").unwrap();
    bayes.set_flag("K", true).unwrap();
    let mut meta = registry.instantiate("learn.meta.Boosting").unwrap();
    meta.set_slot("W", bayes).unwrap();
    meta.set_flag("Q", true).unwrap();

    let retrieved = round_trip_setup(&registry, &store, &[], &meta).await;
    assert!(retrieved.flag_enabled("Q"));
    assert!(retrieved.slot_child("W").unwrap().flag_enabled("K"));
}
