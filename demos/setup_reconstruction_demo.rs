// Copyright 2025 Cowboy AI, LLC.

//! Rebuild a configured instance from a flow's structure plus a setup's
//! recorded values, the way a stored run is replayed.

use cim_flow::{
    compose, instance_from_setup, setup_from_instance, AlgorithmRegistry, PlatformConfig,
};

fn main() -> anyhow::Result<()> {
    let config: PlatformConfig =
        "server=https://flows.example.org/; tags=demo,replay".parse()?;
    let registry = AlgorithmRegistry::with_catalog();

    // the flow is derived from a default-configured tree
    let mut default_instance = registry.instantiate("learn.meta.Bagging")?;
    default_instance.set_slot("W", registry.instantiate("learn.fn.Svm")?)?;
    let flow = compose(&default_instance, &config.tags)?;
    println!("flow: {}", flow.name);

    // a run used different values for the same structure
    let configured = {
        let mut svm = registry.instantiate("learn.fn.Svm")?;
        svm.set_option("C", "0.21")?;
        let mut kernel = registry.instantiate("kernel.Poly")?;
        kernel.set_option("E", "2.0")?;
        svm.set_slot("K", kernel)?;
        let mut bagging = registry.instantiate("learn.meta.Bagging")?;
        bagging.set_option("P", "66")?;
        bagging.set_slot("W", svm)?;
        bagging
    };

    let setup = setup_from_instance(&configured);
    println!("setup entries: {}", setup.parameters.len());

    let replayed = instance_from_setup(&registry, &setup, &flow)?;
    assert_eq!(replayed.options(), configured.options());
    println!("replayed bag size: {:?}", replayed.option_value("P"));
    Ok(())
}
