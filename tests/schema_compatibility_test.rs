//! End-to-end checks for the topic schema gate
//!
//! These tests exercise the orderings a broker actually sees: producer after
//! producer, producer after consumer, consumer after producer, consumer
//! after consumer, plus the ALWAYS_COMPATIBLE sweep over every supported
//! type tag, transitive strategies, and concurrent first registrations.

use schemagate::{
    CompatibilityStrategy, FieldType, MemoryPolicyStore, SchemaData, SchemaError, SchemaField,
    SchemaRegistry, SchemaTypeTag, TopicName, TopicSchemaService,
};
use std::sync::Arc;
use uuid::Uuid;

const TENANT: &str = "public";
const NAMESPACE: &str = "test-namespace";

fn setup(strategy: CompatibilityStrategy) -> (TopicSchemaService, Arc<MemoryPolicyStore>) {
    let policies = Arc::new(MemoryPolicyStore::new());
    policies.set_strategy(format!("{}/{}", TENANT, NAMESPACE), strategy);
    let registry = Arc::new(SchemaRegistry::in_memory(policies.clone()));
    (TopicSchemaService::new(registry), policies)
}

fn topic(local: &str) -> TopicName {
    format!("persistent://{}/{}/{}", TENANT, NAMESPACE, local)
        .parse()
        .unwrap()
}

fn unique_topic(prefix: &str) -> TopicName {
    topic(&format!("{}-{}", prefix, Uuid::new_v4()))
}

fn person_fields() -> Vec<SchemaField> {
    vec![
        SchemaField::new("name", FieldType::String),
        SchemaField::new("age", FieldType::Int32).with_default("0"),
    ]
}

fn person_json() -> SchemaData {
    SchemaData::structured(SchemaTypeTag::Json, person_fields())
}

fn person_avro() -> SchemaData {
    SchemaData::structured(SchemaTypeTag::Avro, person_fields())
}

fn assert_incompatible(err: &SchemaError, existing: &str, incoming: &str) {
    assert!(matches!(err, SchemaError::IncompatibleSchema(_)));
    assert_eq!(
        err.to_string(),
        format!(
            "Incompatible schema: exists schema type {}, new schema type {}",
            existing, incoming
        )
    );
}

#[tokio::test]
async fn struct_type_producer_producer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("struct-producer-producer");

    service
        .on_producer_connect(&topic, Some(person_json()))
        .await
        .unwrap();

    let err = service
        .on_producer_connect(&topic, Some(person_avro()))
        .await
        .unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");
}

#[tokio::test]
async fn struct_type_producer_consumer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("struct-producer-consumer");

    service
        .on_producer_connect(&topic, Some(person_json()))
        .await
        .unwrap();

    let err = service
        .on_consumer_subscribe(&topic, "my-sub", Some(person_avro()))
        .await
        .unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");
}

#[tokio::test]
async fn struct_type_consumer_producer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("struct-consumer-producer");

    service
        .on_consumer_subscribe(&topic, "my-sub", Some(person_json()))
        .await
        .unwrap();

    let err = service
        .on_producer_connect(&topic, Some(person_avro()))
        .await
        .unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");
}

#[tokio::test]
async fn struct_type_consumer_consumer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("struct-consumer-consumer");

    service
        .on_consumer_subscribe(&topic, "my-sub1", Some(person_json()))
        .await
        .unwrap();

    let err = service
        .on_consumer_subscribe(&topic, "my-sub2", Some(person_avro()))
        .await
        .unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");
}

#[tokio::test]
async fn primitive_type_producer_producer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("primitive-producer-producer");

    service
        .on_producer_connect(&topic, Some(SchemaData::primitive(SchemaTypeTag::Int32)))
        .await
        .unwrap();

    let err = service
        .on_producer_connect(&topic, Some(SchemaData::primitive(SchemaTypeTag::String)))
        .await
        .unwrap_err();
    assert_incompatible(&err, "INT32", "STRING");
}

#[tokio::test]
async fn primitive_type_producer_consumer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("primitive-producer-consumer");

    service
        .on_producer_connect(&topic, Some(SchemaData::primitive(SchemaTypeTag::Int32)))
        .await
        .unwrap();

    let err = service
        .on_consumer_subscribe(&topic, "my-sub", Some(SchemaData::primitive(SchemaTypeTag::String)))
        .await
        .unwrap_err();
    assert_incompatible(&err, "INT32", "STRING");
}

#[tokio::test]
async fn primitive_type_consumer_producer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("primitive-consumer-producer");

    service
        .on_consumer_subscribe(&topic, "my-sub", Some(SchemaData::primitive(SchemaTypeTag::Int32)))
        .await
        .unwrap();

    let err = service
        .on_producer_connect(&topic, Some(SchemaData::primitive(SchemaTypeTag::String)))
        .await
        .unwrap_err();
    assert_incompatible(&err, "INT32", "STRING");
}

#[tokio::test]
async fn primitive_type_consumer_consumer_undefined_incompatible() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("primitive-consumer-consumer");

    service
        .on_consumer_subscribe(&topic, "my-sub1", Some(SchemaData::primitive(SchemaTypeTag::Int32)))
        .await
        .unwrap();

    let err = service
        .on_consumer_subscribe(&topic, "my-sub2", Some(SchemaData::primitive(SchemaTypeTag::String)))
        .await
        .unwrap_err();
    assert_incompatible(&err, "INT32", "STRING");
}

/// Every supported tag, structured and primitive, in one ledger.
fn all_schemas() -> Vec<SchemaData> {
    let person_four = vec![
        SchemaField::new("name", FieldType::String),
        SchemaField::new("age", FieldType::Int32).with_default("0"),
        SchemaField::new("email", FieldType::String).with_default(""),
        SchemaField::new("phone", FieldType::String).with_default(""),
    ];
    vec![
        SchemaData::structured(SchemaTypeTag::Avro, person_fields()),
        SchemaData::structured(SchemaTypeTag::Avro, person_four.clone()),
        SchemaData::structured(SchemaTypeTag::Json, person_fields()),
        SchemaData::structured(SchemaTypeTag::Json, person_four),
        SchemaData::primitive(SchemaTypeTag::Int8),
        SchemaData::primitive(SchemaTypeTag::Int16),
        SchemaData::primitive(SchemaTypeTag::Int32),
        SchemaData::primitive(SchemaTypeTag::Int64),
        SchemaData::primitive(SchemaTypeTag::Date),
        SchemaData::primitive(SchemaTypeTag::Bool),
        SchemaData::primitive(SchemaTypeTag::Double),
        SchemaData::primitive(SchemaTypeTag::String),
        SchemaData::primitive(SchemaTypeTag::Bytes),
        SchemaData::primitive(SchemaTypeTag::Float),
        SchemaData::primitive(SchemaTypeTag::Instant),
        SchemaData::primitive(SchemaTypeTag::ByteBuffer),
        SchemaData::primitive(SchemaTypeTag::Time),
        SchemaData::primitive(SchemaTypeTag::Timestamp),
        SchemaData::primitive(SchemaTypeTag::LocalDate),
        SchemaData::primitive(SchemaTypeTag::LocalDateTime),
        SchemaData::primitive(SchemaTypeTag::LocalTime),
    ]
}

#[tokio::test]
async fn always_compatible_accepts_heterogeneous_schemas() {
    let (service, _) = setup(CompatibilityStrategy::AlwaysCompatible);
    let topic = unique_topic("always-compatible");

    for schema in all_schemas() {
        service
            .on_producer_connect(&topic, Some(schema))
            .await
            .unwrap();
    }

    // Every previously registered type remains usable by new consumers
    for schema in all_schemas() {
        service
            .on_consumer_subscribe(&topic, &Uuid::new_v4().to_string(), Some(schema))
            .await
            .unwrap();
    }

    // Sequence numbers stayed gapless throughout
    let versions = service.registry().versions(&topic).await.unwrap();
    let sequence: Vec<u64> = versions.iter().map(|v| v.version).collect();
    let expected: Vec<u64> = (0..versions.len() as u64).collect();
    assert_eq!(sequence, expected);
}

#[tokio::test]
async fn reregistering_current_schema_is_idempotent() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("idempotent");

    let first = service
        .on_producer_connect(&topic, Some(person_json()))
        .await
        .unwrap()
        .unwrap();

    // Same producer schema again, then a consumer with the same schema
    let second = service
        .on_producer_connect(&topic, Some(person_json()))
        .await
        .unwrap()
        .unwrap();
    let third = service
        .on_consumer_subscribe(&topic, "my-sub", Some(person_json()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.version, 0);
    assert_eq!(second.version, 0);
    assert_eq!(third.version, 0);
    assert_eq!(service.registry().versions(&topic).await.unwrap().len(), 1);
}

#[tokio::test]
async fn transitive_checks_every_prior_version() {
    // Same evolution under both strategies: v0 requires 'age', v1 relaxes it
    // with a default, the candidate drops it. Compatible with v1 only.
    let v0 = SchemaData::structured(
        SchemaTypeTag::Avro,
        vec![
            SchemaField::new("name", FieldType::String),
            SchemaField::new("age", FieldType::Int32),
        ],
    );
    let v1 = SchemaData::structured(
        SchemaTypeTag::Avro,
        vec![
            SchemaField::new("name", FieldType::String),
            SchemaField::new("age", FieldType::Int32).with_default("0"),
        ],
    );
    let candidate = SchemaData::structured(
        SchemaTypeTag::Avro,
        vec![SchemaField::new("name", FieldType::String)],
    );

    let (service, _) = setup(CompatibilityStrategy::Backward);
    let topic_latest = topic("transitive-latest-only");
    service.register(&topic_latest, v0.clone()).await.unwrap();
    service.register(&topic_latest, v1.clone()).await.unwrap();
    // Non-transitive only checks the tail: accepted
    let accepted = service.register(&topic_latest, candidate.clone()).await.unwrap();
    assert_eq!(accepted.version, 2);

    let (service, _) = setup(CompatibilityStrategy::BackwardTransitive);
    let topic_full = topic("transitive-full-history");
    service.register(&topic_full, v0).await.unwrap();
    service.register(&topic_full, v1).await.unwrap();
    // Transitive walks the whole history and trips on v0
    let err = service.register(&topic_full, candidate).await.unwrap_err();
    assert!(matches!(err, SchemaError::IncompatibleSchema(_)));
    assert!(err.to_string().contains("version 0"));
    assert_eq!(service.registry().versions(&topic_full).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unset_namespace_defaults_to_strict_undefined() {
    // No policy for public/default at all
    let registry = Arc::new(SchemaRegistry::in_memory(Arc::new(MemoryPolicyStore::new())));
    let service = TopicSchemaService::new(registry);
    let topic: TopicName = "persistent://public/default/no-policy".parse().unwrap();

    service
        .on_producer_connect(&topic, Some(person_json()))
        .await
        .unwrap();

    // Even an addition with a default is a structural delta under UNDEFINED
    let evolved = SchemaData::structured(
        SchemaTypeTag::Json,
        vec![
            SchemaField::new("name", FieldType::String),
            SchemaField::new("age", FieldType::Int32).with_default("0"),
            SchemaField::new("email", FieldType::String).with_default(""),
        ],
    );
    let err = service
        .on_producer_connect(&topic, Some(evolved))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::IncompatibleSchema(_)));
}

#[tokio::test]
async fn admin_registration_uses_identical_check_semantics() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("admin-path");

    service.register(&topic, person_json()).await.unwrap();

    // A producer hits the same wall an admin registration would
    let err = service
        .on_producer_connect(&topic, Some(person_avro()))
        .await
        .unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");

    let err = service.register(&topic, person_avro()).await.unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");
}

#[tokio::test]
async fn concurrent_identical_first_registrations_all_succeed() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let service = Arc::new(service);
    let topic = unique_topic("concurrent-identical");

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        let topic = topic.clone();
        handles.push(tokio::spawn(async move {
            service
                .on_producer_connect(&topic, Some(SchemaData::primitive(SchemaTypeTag::Int32)))
                .await
        }));
    }

    for handle in handles {
        let version = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(version.version, 0);
    }
    assert_eq!(service.registry().versions(&topic).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_mixed_first_registrations_yield_one_winner() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let service = Arc::new(service);
    let topic = unique_topic("concurrent-mixed");

    let mut handles = Vec::new();
    for i in 0..16u32 {
        let service = service.clone();
        let topic = topic.clone();
        handles.push(tokio::spawn(async move {
            let tag = if i % 2 == 0 {
                SchemaTypeTag::Int32
            } else {
                SchemaTypeTag::String
            };
            let outcome = service
                .on_producer_connect(&topic, Some(SchemaData::primitive(tag)))
                .await;
            (tag, outcome)
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    // Exactly one type won the ledger
    let versions = service.registry().versions(&topic).await.unwrap();
    assert_eq!(versions.len(), 1);
    let winner = versions[0].schema.type_tag;

    for (tag, outcome) in outcomes {
        if tag == winner {
            // All attempts with the winning tag succeeded idempotently
            assert_eq!(outcome.unwrap().unwrap().version, 0);
        } else {
            // Every loser saw the winner and the fixed rejection message
            let err = outcome.unwrap_err();
            assert_incompatible(&err, &winner.to_string(), &tag.to_string());
        }
    }
}

#[tokio::test]
async fn registrations_on_different_topics_are_independent() {
    let (service, _) = setup(CompatibilityStrategy::Undefined);
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for i in 0..8u32 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let topic = topic(&format!("parallel-{}", i));
            service
                .on_producer_connect(&topic, Some(SchemaData::primitive(SchemaTypeTag::Int64)))
                .await
        }));
    }

    for handle in handles {
        let version = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(version.version, 0);
    }
}

#[tokio::test]
async fn strategy_change_applies_to_subsequent_registrations() {
    let (service, policies) = setup(CompatibilityStrategy::Undefined);
    let topic = topic("policy-change");

    service
        .on_producer_connect(&topic, Some(person_json()))
        .await
        .unwrap();

    // Rejected under UNDEFINED
    let err = service
        .on_producer_connect(&topic, Some(person_avro()))
        .await
        .unwrap_err();
    assert_incompatible(&err, "JSON", "AVRO");

    // Admin relaxes the namespace policy; the same candidate now passes
    policies.set_strategy(
        format!("{}/{}", TENANT, NAMESPACE),
        CompatibilityStrategy::AlwaysCompatible,
    );
    let version = service
        .on_producer_connect(&topic, Some(person_avro()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(version.version, 1);
}
