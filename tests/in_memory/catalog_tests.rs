//! In-memory integration tests for capability metadata records.

use std::sync::Arc;

use caplink::capability::{
    adapters::memory::InMemoryCapabilityInfoRepository,
    domain::{CapabilityCategory, CapabilityInfo, CapabilityInfoName, CapabilityType, TypeInfo},
    ports::{CapabilityInfoRepository, CapabilityInfoRepositoryError},
    services::{CapabilityCatalogService, CatalogOutcome},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestCatalog = CapabilityCatalogService<InMemoryCapabilityInfoRepository, DefaultClock>;

#[fixture]
fn repository() -> Arc<InMemoryCapabilityInfoRepository> {
    Arc::new(InMemoryCapabilityInfoRepository::new())
}

fn catalog_over(repository: &Arc<InMemoryCapabilityInfoRepository>) -> TestCatalog {
    CapabilityCatalogService::new(Arc::clone(repository), Arc::new(DefaultClock))
}

fn database() -> CapabilityCategory {
    CapabilityCategory::new("database").expect("valid category")
}

fn engine(name: &str, versions: &[&str]) -> TypeInfo {
    TypeInfo::new(CapabilityType::new(name).expect("valid type"))
        .with_versions(versions.iter().copied())
        .expect("valid versions")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creating_a_record_twice_is_a_duplicate(
    repository: Arc<InMemoryCapabilityInfoRepository>,
) {
    let info = CapabilityInfo::new(database(), &engine("postgresql", &["11"]), &DefaultClock);
    repository.create(&info).await.expect("first create");

    let result = repository.create(&info).await;

    assert!(matches!(
        result,
        Err(CapabilityInfoRepositoryError::Duplicate(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_a_missing_record_is_not_found(
    repository: Arc<InMemoryCapabilityInfoRepository>,
) {
    let info = CapabilityInfo::new(database(), &engine("mysql", &["8"]), &DefaultClock);

    let result = repository.update(&info).await;

    assert!(matches!(
        result,
        Err(CapabilityInfoRepositoryError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn records_are_named_after_their_pair(repository: Arc<InMemoryCapabilityInfoRepository>) {
    let catalog = catalog_over(&repository);
    let postgres = engine("PostgreSQL", &["11", "12"]);

    let outcome = catalog.record(&database(), &postgres).await.expect("record");

    assert_eq!(outcome, CatalogOutcome::Created);
    let name = CapabilityInfoName::for_pair(&database(), postgres.capability_type());
    let stored = catalog
        .find(&name)
        .await
        .expect("lookup")
        .expect("record exists");
    assert_eq!(stored.name(), &name);
    assert_eq!(stored.versions(), ["11", "12"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn changed_versions_update_the_record(repository: Arc<InMemoryCapabilityInfoRepository>) {
    let catalog = catalog_over(&repository);
    catalog
        .record(&database(), &engine("postgresql", &["11"]))
        .await
        .expect("initial record");

    let outcome = catalog
        .record(&database(), &engine("postgresql", &["11", "12"]))
        .await
        .expect("second record");

    assert_eq!(outcome, CatalogOutcome::Updated);
    let all = catalog.list_all().await.expect("listing");
    assert_eq!(all.len(), 1);
    let stored = all.first().expect("one record");
    assert!(stored.updated_at() >= stored.created_at());
    assert_eq!(stored.versions(), ["11", "12"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_pair_gets_its_own_record(repository: Arc<InMemoryCapabilityInfoRepository>) {
    let catalog = catalog_over(&repository);
    for capability_type in ["postgresql", "mysql", "mariadb"] {
        catalog
            .record(&database(), &engine(capability_type, &["1"]))
            .await
            .expect("record");
    }

    let all = repository.list_all().await.expect("listing");

    assert_eq!(all.len(), 3);
}
