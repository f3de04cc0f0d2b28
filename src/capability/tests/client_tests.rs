//! Remote call client tests against a mocked transport.

use super::fixtures::{ConfigMap, owner};
use crate::capability::{
    adapters::memory::InMemoryResourceStore,
    domain::{CapabilityOwner, DomainObject, GenericObject, ObjectMeta, TypeDescriptor},
    ports::{MockPluginTransport, PluginCallError, ResourceStore, TransportError},
    services::{PluginClient, PluginDependentResource},
    wire::{PluginMethod, PluginResponse, RemoteFault},
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

fn client_over(mock: MockPluginTransport) -> PluginClient {
    PluginClient::new("redis-plugin", Arc::new(mock))
}

fn config_map(name: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta::new(name, "prod"),
        ..ConfigMap::default()
    }
}

#[rstest]
fn category_is_fetched_once() {
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .withf(|method, request| {
            *method == PluginMethod::GetCategory
                && request.owner().is_none()
                && request.target().is_none()
        })
        .times(1)
        .returning(|_, _| Ok(PluginResponse::Ok(json!("cache"))));
    let client = client_over(mock);

    for _ in 0..3 {
        let category = client.category().expect("category");
        assert_eq!(category.as_str(), "cache");
    }
}

#[rstest]
fn types_are_fetched_once_and_shared_with_bound_copies(owner: CapabilityOwner) {
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .withf(|method, _| *method == PluginMethod::GetTypes)
        .times(1)
        .returning(|_, _| {
            Ok(PluginResponse::Ok(
                json!([{"type": "redis", "versions": ["6", "7"]}]),
            ))
        });
    let client = client_over(mock);

    let types = client.types().expect("types");
    let bound_types = client.bound_to(owner).types().expect("types");

    assert_eq!(types, bound_types);
    assert_eq!(types.first().map(|info| info.versions().len()), Some(2));
}

#[rstest]
fn more_than_one_argument_is_refused_without_sending() {
    let mut mock = MockPluginTransport::new();
    mock.expect_call().never();
    let client = client_over(mock);
    let first = config_map("a");
    let second = config_map("b");

    let result: Result<String, _> = client.call(
        PluginMethod::NameFrom,
        &ConfigMap::type_descriptor(),
        &[&first, &second],
    );

    assert!(matches!(
        result,
        Err(PluginCallError::TooManyArguments { count: 2, .. })
    ));
    assert!(client.is_alive());
}

#[rstest]
fn transport_failure_marks_plugin_unusable() {
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .times(1)
        .returning(|_, _| Err(TransportError::Disconnected));
    let client = client_over(mock);

    let first = client.category();
    let second = client.category();

    assert!(matches!(first, Err(PluginCallError::Transport { .. })));
    assert!(matches!(second, Err(PluginCallError::Unavailable(_))));
    assert!(!client.is_alive());
}

#[rstest]
#[case(RemoteFault::business("quota exceeded"), false)]
#[case(RemoteFault::protocol("unknown target"), true)]
fn remote_faults_keep_their_classification(#[case] fault: RemoteFault, #[case] fatal: bool) {
    let mut mock = MockPluginTransport::new();
    let reply = PluginResponse::Fault(fault.clone());
    mock.expect_call()
        .returning(move |_, _| Ok(reply.clone()));
    let client = client_over(mock);

    let err = client
        .call::<String>(PluginMethod::Name, &ConfigMap::type_descriptor(), &[])
        .expect_err("fault should surface");

    assert_eq!(err.is_fatal(), fatal);
    assert!(err.to_string().contains(fault.message()));
    assert!(client.is_alive());
}

#[rstest]
fn undecodable_reply_is_a_protocol_violation() {
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .returning(|_, _| Ok(PluginResponse::Ok(json!(42))));
    let client = client_over(mock);

    let result = client.call::<String>(PluginMethod::Name, &ConfigMap::type_descriptor(), &[]);

    assert!(matches!(result, Err(PluginCallError::Protocol { .. })));
}

#[rstest]
fn bound_envelope_carries_owner_target_and_encoded_argument(owner: CapabilityOwner) {
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .withf(|method, request| {
            let descriptor = ConfigMap::type_descriptor();
            *method == PluginMethod::NameFrom
                && request.owner().map(CapabilityOwner::name) == Some("myapp")
                && request.target() == Some(&descriptor)
                && request.arg().and_then(GenericObject::name) == Some("myapp-cache")
                && request.arg().and_then(GenericObject::type_descriptor) == Some(descriptor)
        })
        .times(1)
        .returning(|_, _| Ok(PluginResponse::Ok(json!("myapp-cache"))));
    let client = client_over(mock).bound_to(owner);

    let name: String = client
        .call(
            PluginMethod::NameFrom,
            &ConfigMap::type_descriptor(),
            &[&config_map("myapp-cache")],
        )
        .expect("name");

    assert_eq!(name, "myapp-cache");
}

#[rstest]
fn argument_without_descriptor_is_stamped_with_target() {
    let target = TypeDescriptor::new("", "v1", "Secret").expect("valid descriptor");
    let expected = target.clone();
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .withf(move |_, request| {
            request.arg().and_then(GenericObject::type_descriptor) == Some(expected.clone())
        })
        .times(1)
        .returning(|_, _| Ok(PluginResponse::Ok(json!("raw"))));
    let client = client_over(mock);
    let mut raw = GenericObject::default();
    raw.set_name("raw");

    let name: String = client
        .call(PluginMethod::NameFrom, &target, &[&raw])
        .expect("name");

    assert_eq!(name, "raw");
}

#[rstest]
fn kill_reaches_the_transport_once_for_all_copies(owner: CapabilityOwner) {
    let mut mock = MockPluginTransport::new();
    mock.expect_kill().times(1).return_const(());
    mock.expect_call().never();
    let client = client_over(mock);
    let bound = client.bound_to(owner);

    bound.kill();
    client.kill();

    assert!(!client.is_alive());
    assert!(matches!(
        client.category(),
        Err(PluginCallError::Unavailable(_))
    ));
}

#[rstest]
fn ready_for_asks_once_for_the_owner_bound_descriptors(owner: CapabilityOwner) {
    let mut mock = MockPluginTransport::new();
    mock.expect_call()
        .withf(|method, request| {
            *method == PluginMethod::GetDependentResourceTypes
                && request.owner().map(CapabilityOwner::name) == Some("myapp")
                && request.target().is_none()
                && request.arg().is_none()
        })
        .times(1)
        .returning(|_, _| {
            Ok(PluginResponse::Ok(json!([{
                "group": "",
                "version": "v1",
                "kind": "ConfigMap"
            }])))
        });
    let client = client_over(mock);
    let store: Arc<dyn ResourceStore> = Arc::new(InMemoryResourceStore::new());

    let proxies = client.ready_for(&owner, &store).expect("proxies");

    assert_eq!(proxies.len(), 1);
    assert_eq!(
        proxies.first().map(PluginDependentResource::descriptor),
        Some(&ConfigMap::type_descriptor())
    );
}
