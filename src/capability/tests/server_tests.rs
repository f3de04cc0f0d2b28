//! Plugin-side dispatch tests.

use super::fixtures::{CachePlugin, ConfigMap, URL_KEY, cache_url, owner, owner_with, redis_plugin};
use crate::capability::{
    domain::{
        CapabilityCategory, CapabilityDomainError, CapabilityOwner, CapabilityType, DomainObject,
        GenericObject, ObjectMeta, TypeDescriptor, decode_into, encode,
    },
    ports::PluginResource,
    services::{AggregatePluginResource, PluginServer},
    wire::{FaultKind, PluginMethod, PluginRequest, PluginResponse, UpdateResponse},
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

#[fixture]
fn server() -> PluginServer {
    PluginServer::new(redis_plugin())
}

fn targeted(owner: CapabilityOwner) -> PluginRequest {
    PluginRequest::new()
        .with_owner(owner)
        .with_target(ConfigMap::type_descriptor())
}

fn ok_body(response: PluginResponse) -> Value {
    match response {
        PluginResponse::Ok(body) => body,
        PluginResponse::Fault(fault) => panic!("unexpected fault: {}", fault.message()),
    }
}

fn fault_kind(response: &PluginResponse) -> Option<FaultKind> {
    match response {
        PluginResponse::Ok(_) => None,
        PluginResponse::Fault(fault) => Some(fault.kind()),
    }
}

#[rstest]
fn category_level_calls_need_no_owner(server: PluginServer) {
    let category = server.handle(PluginMethod::GetCategory, &PluginRequest::new());
    let types = server.handle(PluginMethod::GetTypes, &PluginRequest::new());

    assert_eq!(ok_body(category), json!("cache"));
    assert_eq!(
        ok_body(types),
        json!([{"type": "redis", "versions": ["6", "7"]}])
    );
}

#[rstest]
fn dependent_types_require_an_owner(server: PluginServer) {
    let response = server.handle(PluginMethod::GetDependentResourceTypes, &PluginRequest::new());

    assert_eq!(fault_kind(&response), Some(FaultKind::Protocol));
}

#[rstest]
fn targeted_calls_require_a_target(server: PluginServer, owner: CapabilityOwner) {
    let request = PluginRequest::new().with_owner(owner);

    let response = server.handle(PluginMethod::Name, &request);

    assert_eq!(fault_kind(&response), Some(FaultKind::Protocol));
}

#[rstest]
fn unknown_targets_are_protocol_violations(server: PluginServer, owner: CapabilityOwner) {
    let unknown = TypeDescriptor::new("apps", "v1", "Deployment").expect("valid descriptor");
    let request = PluginRequest::new().with_owner(owner).with_target(unknown);

    let response = server.handle(PluginMethod::GetConfig, &request);

    let PluginResponse::Fault(fault) = response else {
        panic!("expected a fault");
    };
    assert_eq!(fault.kind(), FaultKind::Protocol);
    assert!(fault.message().contains("Deployment"));
}

#[rstest]
fn arguments_are_required_where_declared(server: PluginServer, owner: CapabilityOwner) {
    let response = server.handle(PluginMethod::NameFrom, &targeted(owner));

    assert_eq!(fault_kind(&response), Some(FaultKind::Protocol));
}

#[rstest]
fn undecodable_update_argument_is_a_protocol_violation(
    server: PluginServer,
    owner: CapabilityOwner,
) {
    let mut malformed = GenericObject::new(&ConfigMap::type_descriptor());
    malformed.insert("metadata", json!({"name": ["not", "a", "string"]}));
    let request = targeted(owner).with_arg(malformed);

    let response = server.handle(PluginMethod::Update, &request);

    assert_eq!(fault_kind(&response), Some(FaultKind::Protocol));
}

#[rstest]
fn update_returns_the_mutated_object(server: PluginServer, owner: CapabilityOwner) {
    let live = ConfigMap {
        metadata: ObjectMeta::new("myapp-cache", "prod"),
        ..ConfigMap::default()
    };
    let arg = encode(&live, &ConfigMap::type_descriptor()).expect("encodable");
    let request = targeted(owner.clone()).with_arg(arg);

    let body = ok_body(server.handle(PluginMethod::Update, &request));

    let response: UpdateResponse = serde_json::from_value(body).expect("update response");
    assert!(response.needs_update);
    assert_eq!(response.error, None);
    let updated = response.updated.expect("updated object");
    let typed = decode_into::<ConfigMap>(&updated).expect("config map");
    assert_eq!(typed.data.get(URL_KEY), Some(&cache_url(&owner)));
}

#[rstest]
fn update_business_errors_travel_in_the_result(server: PluginServer) {
    let owner = owner_with("myapp", &[("locked", "true")]);
    let arg = encode(&ConfigMap::default(), &ConfigMap::type_descriptor()).expect("encodable");
    let request = targeted(owner).with_arg(arg);

    let body = ok_body(server.handle(PluginMethod::Update, &request));

    let response: UpdateResponse = serde_json::from_value(body).expect("update response");
    assert!(!response.needs_update);
    assert_eq!(response.error.as_deref(), Some("cache config is locked"));
    assert_eq!(response.updated, None);
}

#[rstest]
fn build_failures_are_business_faults(server: PluginServer) {
    let owner = owner_with("myapp", &[("broken", "true")]);

    let response = server.handle(PluginMethod::Build, &targeted(owner));

    assert_eq!(fault_kind(&response), Some(FaultKind::Business));
}

fn owner_of_type(capability_type: &str) -> CapabilityOwner {
    CapabilityOwner::new(
        "myapp",
        "prod",
        CapabilityCategory::new("cache").expect("valid category"),
        CapabilityType::new(capability_type).expect("valid type"),
    )
    .expect("valid owner")
}

fn cache_suite() -> AggregatePluginResource {
    AggregatePluginResource::new(vec![
        Arc::new(CachePlugin::new("cache", "redis")) as Arc<dyn PluginResource>,
        Arc::new(CachePlugin::new("Cache", "memcached")) as Arc<dyn PluginResource>,
    ])
    .expect("same category")
}

#[rstest]
#[case("memcached", 2)]
#[case("Redis", 2)]
#[case("etcd", 0)]
fn aggregates_route_by_owner_type(#[case] capability_type: &str, #[case] expected: usize) {
    let suite = cache_suite();

    let dependents = suite.dependent_resources_with(&owner_of_type(capability_type));

    assert_eq!(dependents.len(), expected);
    assert_eq!(suite.supported_types().len(), 2);
}

#[rstest]
fn aggregates_reject_mixed_categories() {
    let result = AggregatePluginResource::new(vec![
        Arc::new(CachePlugin::new("cache", "redis")) as Arc<dyn PluginResource>,
        Arc::new(CachePlugin::new("database", "postgresql")) as Arc<dyn PluginResource>,
    ]);

    assert!(matches!(
        result,
        Err(CapabilityDomainError::MixedCategories { .. })
    ));
}

#[rstest]
fn aggregates_need_at_least_one_resource() {
    let result = AggregatePluginResource::new(Vec::new());

    assert!(matches!(
        result,
        Err(CapabilityDomainError::NoAggregatedResources)
    ));
}
