// Copyright 2025 Cowboy AI, LLC.

//! Compose a nested ensemble into a flow descriptor, store it, and rebuild
//! an equivalent instance from the downloaded descriptor.

use cim_flow::{compose, decompose, join_options, AlgorithmRegistry, FlowStore, InMemoryFlowStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let registry = AlgorithmRegistry::with_catalog();

    let mut tree = registry.instantiate("learn.tree.Cart")?;
    tree.set_option("M", "10")?;

    let mut inner = registry.instantiate("learn.meta.Boosting")?;
    inner.set_slot("W", tree)?;

    let mut outer = registry.instantiate("learn.meta.Bagging")?;
    outer.set_slot("W", inner)?;

    let flow = compose(&outer, &["demo".to_string()])?;
    println!("flow name: {}", flow.name);
    if let Some(parameter) = flow.parameter("W") {
        println!("wrapped-learner default: {}", parameter.default_value);
    }

    let store = InMemoryFlowStore::new();
    let receipt = store.upload(&flow).await?;
    println!("stored as flow {}", receipt.flow_id);

    let downloaded = store.get(receipt.flow_id).await?;
    let rebuilt = decompose(&registry, &downloaded)?;
    println!("rebuilt options: {}", join_options(&rebuilt.options()));

    assert_eq!(rebuilt.options(), outer.options());
    println!("round trip ok");
    Ok(())
}
