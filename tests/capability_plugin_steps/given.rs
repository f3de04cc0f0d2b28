//! Given steps for capability plugin BDD scenarios.

use super::database_plugin::DatabasePlugin;
use super::world::{PendingPlugin, PluginWorld};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use std::sync::Arc;

#[given(
    r#"a plugin "{name}" providing "{capability_type}" versions "{versions}" in category "{category}""#
)]
fn a_plugin_providing(
    world: &mut PluginWorld,
    name: String,
    capability_type: String,
    versions: String,
    category: String,
) -> Result<(), eyre::Report> {
    let version_list: Vec<String> = versions.split(',').map(str::to_owned).collect();
    let plugin = DatabasePlugin::new(&category, &capability_type, &version_list)
        .wrap_err_with(|| format!("declare plugin '{name}'"))?;
    world.pending_plugins.push(PendingPlugin {
        name,
        resource: Arc::new(plugin),
        category,
    });
    Ok(())
}
