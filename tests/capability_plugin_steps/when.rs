//! When steps for capability plugin BDD scenarios.

use super::world::{PluginWorld, run_async};
use caplink::capability::{
    adapters::{LoopbackLauncher, memory::InMemoryCapabilityInfoRepository},
    domain::{GenericObject, TypeDescriptor},
    ports::DependentResource,
    services::{PluginHost, PluginHostConfig},
};
use camino::Utf8PathBuf;
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::when;
use serde_json::json;
use std::sync::Arc;

#[when("the host loads every plugin")]
fn host_loads_every_plugin(world: &mut PluginWorld) -> Result<(), eyre::Report> {
    let launcher = world
        .pending_plugins
        .iter()
        .fold(LoopbackLauncher::new(), |launcher, plugin| {
            launcher.with_plugin(plugin.name.clone(), Arc::clone(&plugin.resource))
        });
    let host = PluginHost::new(
        PluginHostConfig::new(),
        Arc::new(launcher),
        Arc::new(InMemoryCapabilityInfoRepository::new()),
        Arc::new(DefaultClock),
    );
    for plugin in &world.pending_plugins {
        let path = Utf8PathBuf::from("/opt/caplink/plugins").join(&plugin.name);
        let result = run_async(host.load_plugin(&path));
        world.load_results.push((plugin.name.clone(), result));
    }
    world.host = Some(host);
    Ok(())
}

#[when(r#"the owner "{owner}" updates its first dependent resource with a malformed object"#)]
fn owner_updates_with_malformed_object(
    world: &mut PluginWorld,
    owner: String,
) -> Result<(), eyre::Report> {
    let capability_owner = world.owner_named(&owner)?;
    let host = world.host()?;
    let dependents = tokio::task::block_in_place(|| {
        host.dependents_for(&capability_owner, &world.store)
    })
    .wrap_err("resolve dependent resources")?;
    let first = dependents
        .first()
        .ok_or_else(|| eyre::eyre!("owner '{owner}' has no dependent resources"))?;

    let descriptor = TypeDescriptor::new("", "v1", "Secret")?;
    let mut malformed = GenericObject::new(&descriptor);
    malformed.insert("metadata", json!({ "name": ["not", "a", "name"] }));
    let result = tokio::task::block_in_place(|| first.update(&mut malformed));
    world.last_update_result = Some(result);
    Ok(())
}
