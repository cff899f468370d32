//! End-to-end tests over the service catalog.

use memtab_core::{AuthToken, Error, Key, Record, Value};
use memtab_entities::{Catalog, Entity, Service, ServiceType, SysCluster};
use memtab_storage::SchemaOptions;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn catalog() -> Catalog {
    init_logger();
    Catalog::new(SchemaOptions::default()).unwrap()
}

#[test]
fn test_service_type_lifecycle() {
    let catalog = catalog();
    let auth = AuthToken::new("operator");
    let service_types = catalog.service_types().unwrap();
    let clusters = catalog.clusters().unwrap();
    let services = catalog.services().unwrap();

    service_types.create(&auth, &ServiceType::new(1, "Auth")).unwrap();
    assert!(matches!(
        service_types.create(&auth, &ServiceType::new(2, "Auth")),
        Err(Error::UniqueIndexViolation { .. })
    ));
    assert_eq!(service_types.len(), 1);

    let mut renamed = ServiceType::new(1, "AuthV2");
    service_types.update(&auth, &mut renamed).unwrap();
    assert_eq!(renamed.revision, 1);
    assert!(service_types.read_by_description(&auth, "Auth").unwrap().is_none());
    assert_eq!(
        service_types.read_by_description(&auth, "AuthV2").unwrap(),
        Some(renamed.clone())
    );

    // Dependents: two clusters, services of type 1 with children, one service of
    // another type on the same cluster.
    service_types.create(&auth, &ServiceType::new(2, "Billing")).unwrap();
    clusters.create(&auth, &SysCluster::new(100, "eu-1", "prod")).unwrap();
    clusters.create(&auth, &SysCluster::new(101, "us-1", "prod")).unwrap();
    services
        .create(&auth, &Service::new(10, "auth-api", 1).on_cluster(100))
        .unwrap();
    services
        .create(&auth, &Service::new(11, "auth-worker", 2).on_cluster(100).with_parent(10))
        .unwrap();
    services
        .create(&auth, &Service::new(12, "auth-cron", 2).with_parent(11))
        .unwrap();
    services
        .create(&auth, &Service::new(20, "billing-api", 2).on_cluster(101))
        .unwrap();

    let stale = ServiceType::new(1, "AuthV2");
    assert!(matches!(
        service_types.delete(&auth, &stale),
        Err(Error::RevisionConflict { expected: 0, actual: 1, .. })
    ));
    assert_eq!(services.len(), 4);
    assert_eq!(service_types.reload(&auth, &stale).unwrap(), Some(renamed.clone()));

    service_types.delete(&auth, &renamed).unwrap();
    assert!(service_types.read(&auth, 1i64).unwrap().is_none());

    // Service 10 goes with its type; 11 and 12 go as its descendants even though
    // their own type survives.
    let remaining: Vec<i64> = services.read_all(&auth).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![20]);
    assert_eq!(clusters.read_all(&auth).unwrap().len(), 2);
    assert!(services.read_by_cluster(&auth, 100).unwrap().is_empty());
}

#[test]
fn test_service_references_are_checked() {
    let catalog = catalog();
    let auth = AuthToken::system();
    let services = catalog.services().unwrap();

    assert!(matches!(
        services.create(&auth, &Service::new(10, "auth-api", 1)),
        Err(Error::UnresolvedRelation { .. })
    ));

    catalog
        .service_types()
        .unwrap()
        .create(&auth, &ServiceType::new(1, "Auth"))
        .unwrap();
    assert!(matches!(
        services.create(&auth, &Service::new(10, "auth-api", 1).on_cluster(5)),
        Err(Error::UnresolvedRelation { .. })
    ));
    assert!(matches!(
        services.create(&auth, &Service::new(10, "auth-api", 1).with_parent(3)),
        Err(Error::UnresolvedRelation { .. })
    ));
    services.create(&auth, &Service::new(10, "auth-api", 1)).unwrap();

    let mut moved = services.read(&auth, 10i64).unwrap().unwrap();
    moved.cluster_id = Some(5);
    assert!(matches!(
        services.update(&auth, &mut moved),
        Err(Error::UnresolvedRelation { .. })
    ));
    assert_eq!(moved.revision, 0);
}

#[test]
fn test_cluster_subtype_isolation() {
    let catalog = catalog();
    let auth = AuthToken::system();
    let clusters = catalog.clusters().unwrap();
    clusters.create(&auth, &SysCluster::new(1, "eu-1", "prod")).unwrap();

    // Another kind of cluster written straight into the shared table.
    let raw = catalog.schema().table(SysCluster::TABLE).unwrap();
    raw.create(
        &auth,
        Record::new(
            "UserCluster",
            vec![Value::Int64(2), Value::from("dev-1"), Value::from("prod")],
        ),
    )
    .unwrap();

    assert_eq!(clusters.len(), 2);
    assert!(clusters.read(&auth, 2i64).unwrap().is_none());
    assert_eq!(clusters.read_all(&auth).unwrap().len(), 1);
    let tagged = clusters.read_by_tag(&auth, "prod").unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].name, "eu-1");

    // Typed writes cannot reach the other kind either.
    let mut intruder = SysCluster::new(2, "dev-1", "prod");
    assert!(matches!(
        clusters.update(&auth, &mut intruder),
        Err(Error::RecordNotFound { .. })
    ));
    clusters.delete(&auth, &intruder).unwrap();
    let stored = raw.read(&auth, &Key::from(2i64)).unwrap();
    assert_eq!(stored.class_code().as_str(), "UserCluster");
    assert_eq!(
        clusters.delete_by_index(&auth, SysCluster::IDX_TAG, "prod").unwrap(),
        1
    );
    assert_eq!(clusters.len(), 1);
    assert!(raw.contains_key(&auth, &Key::from(2i64)));

    // Services may still reference the other kind: relations use the table.
    catalog
        .service_types()
        .unwrap()
        .create(&auth, &ServiceType::new(1, "Auth"))
        .unwrap();
    catalog
        .services()
        .unwrap()
        .create(&auth, &Service::new(10, "auth-api", 1).on_cluster(2))
        .unwrap();
}

#[test]
fn test_delete_by_service_type() {
    let catalog = catalog();
    let auth = AuthToken::system();
    let service_types = catalog.service_types().unwrap();
    let services = catalog.services().unwrap();

    service_types.create(&auth, &ServiceType::new(1, "Auth")).unwrap();
    service_types.create(&auth, &ServiceType::new(2, "Billing")).unwrap();
    services.create(&auth, &Service::new(10, "a", 1)).unwrap();
    services.create(&auth, &Service::new(11, "b", 1)).unwrap();
    services.create(&auth, &Service::new(12, "c", 2).with_parent(11)).unwrap();
    services.create(&auth, &Service::new(13, "d", 2)).unwrap();

    let removed = services.delete_by_service_type(&auth, 1).unwrap();
    assert_eq!(removed, 2);
    let remaining: Vec<i64> = services.read_all(&auth).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![13]);
    assert_eq!(service_types.len(), 2);
    assert_eq!(services.read_by_service_type(&auth, 1).unwrap().len(), 0);
}

#[test]
fn test_service_children() {
    let catalog = catalog();
    let auth = AuthToken::system();
    catalog
        .service_types()
        .unwrap()
        .create(&auth, &ServiceType::new(1, "Auth"))
        .unwrap();
    let services = catalog.services().unwrap();
    services.create(&auth, &Service::new(10, "root", 1)).unwrap();
    services.create(&auth, &Service::new(11, "left", 1).with_parent(10)).unwrap();
    services.create(&auth, &Service::new(12, "right", 1).with_parent(10)).unwrap();

    let mut children = services.read_children(&auth, 10).unwrap();
    children.sort_by_key(|s| s.id);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].name, "left");
    assert_eq!(
        services.read_by_name(&auth, "right").unwrap().map(|s| s.primary_key()),
        Some(Key::from(12i64))
    );

    let root = services.read(&auth, 10i64).unwrap().unwrap();
    services.delete(&auth, &root).unwrap();
    assert!(services.is_empty());
}

#[test]
fn test_entities_round_trip_json() {
    let service = Service::new(10, "auth-api", 1).on_cluster(100);
    let json = serde_json::to_string(&service).unwrap();
    assert_eq!(serde_json::from_str::<Service>(&json).unwrap(), service);

    let minimal: Service =
        serde_json::from_str(r#"{ "id": 1, "name": "x", "service_type_id": 2 }"#).unwrap();
    assert_eq!(minimal, Service::new(1, "x", 2));
}
