//! Then steps for capability plugin BDD scenarios.

use super::world::PluginWorld;
use caplink::capability::{
    ports::{DependentResource, DependentResourceError, PluginCallError},
    services::{PluginHostError, PluginRegistryError},
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then(r#"resolving "{category}" "{capability_type}" returns plugin "{plugin}""#)]
fn resolving_returns_plugin(
    world: &PluginWorld,
    category: String,
    capability_type: String,
    plugin: String,
) -> Result<(), eyre::Report> {
    let resolved = world
        .host()?
        .resolve(&category, &capability_type)
        .wrap_err_with(|| format!("resolve {category}/{capability_type}"))?;
    if resolved.name() != plugin {
        return Err(eyre::eyre!(
            "expected plugin '{plugin}', resolved '{}'",
            resolved.name()
        ));
    }
    Ok(())
}

#[then(r#"the owner "{owner}" needs at least {count:usize} dependent resource"#)]
fn owner_needs_dependents(
    world: &PluginWorld,
    owner: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let capability_owner = world.owner_named(&owner)?;
    let plugin = world.host()?.resolve(
        capability_owner.category().as_str(),
        capability_owner.capability_type().as_str(),
    )?;
    let descriptors = tokio::task::block_in_place(|| {
        plugin.dependent_resource_types(&capability_owner)
    })
    .wrap_err("fetch dependent resource types")?;
    if descriptors.len() < count {
        return Err(eyre::eyre!(
            "expected at least {count} descriptors, found {}",
            descriptors.len()
        ));
    }
    Ok(())
}

#[then(r#"the first dependent resource built for "{owner}" is named with prefix "{prefix}""#)]
fn first_dependent_named_with_prefix(
    world: &PluginWorld,
    owner: String,
    prefix: String,
) -> Result<(), eyre::Report> {
    let capability_owner = world.owner_named(&owner)?;
    let host = world.host()?;
    let name = tokio::task::block_in_place(|| -> Result<String, eyre::Report> {
        let dependents = host.dependents_for(&capability_owner, &world.store)?;
        let first = dependents
            .first()
            .ok_or_else(|| eyre::eyre!("owner '{owner}' has no dependent resources"))?;
        let built = first.build(false)?;
        Ok(first.name_from(built.as_ref())?)
    })?;
    if !name.starts_with(&prefix) {
        return Err(eyre::eyre!("expected '{name}' to start with '{prefix}'"));
    }
    Ok(())
}

#[then(r#"loading plugin "{plugin}" fails with a registration conflict"#)]
fn loading_fails_with_conflict(world: &PluginWorld, plugin: String) -> Result<(), eyre::Report> {
    let (_, result) = world
        .load_results
        .iter()
        .find(|(name, _)| *name == plugin)
        .ok_or_else(|| eyre::eyre!("plugin '{plugin}' was never loaded"))?;
    if !matches!(
        result,
        Err(PluginHostError::Registry(PluginRegistryError::Conflict { .. }))
    ) {
        return Err(eyre::eyre!("expected registration conflict, got {result:?}"));
    }
    Ok(())
}

#[then("the update fails with a protocol violation")]
fn update_fails_with_protocol_violation(world: &PluginWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result in scenario world"))?;
    if !matches!(
        result,
        Err(DependentResourceError::Call(PluginCallError::Protocol { .. }))
    ) {
        return Err(eyre::eyre!("expected protocol violation, got {result:?}"));
    }
    Ok(())
}
