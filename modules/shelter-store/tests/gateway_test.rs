//! Gateway behaviour against an in-process collection and a collection whose
//! every call fails.
//!
//! Run with: cargo test -p shelter-store --test gateway_test

use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, Document};

use shelter_common::{AnimalRecord, RecordQuery, RescueProfile};
use shelter_store::{AnimalShelter, MemoryCollection, RecordCollection, StoreError};

/// Every call fails the way a dropped connection does.
struct UnreachableCollection;

fn unreachable() -> StoreError {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    StoreError::Driver(io.into())
}

#[async_trait]
impl RecordCollection for UnreachableCollection {
    async fn insert_one(&self, _doc: Document) -> Result<bool, StoreError> {
        Err(unreachable())
    }

    async fn find(&self, _query: &RecordQuery) -> Result<Vec<Document>, StoreError> {
        Err(unreachable())
    }

    async fn update_many(&self, _query: &RecordQuery, _changes: Document) -> Result<u64, StoreError> {
        Err(unreachable())
    }

    async fn delete_many(&self, _query: &RecordQuery) -> Result<u64, StoreError> {
        Err(unreachable())
    }
}

fn dog(rec_num: i64, breed: &str, sex: &str, weeks: f64, name: &str) -> Document {
    doc! {
        "rec_num": rec_num,
        "animal_type": "Dog",
        "breed": breed,
        "name": name,
        "sex_upon_outcome": sex,
        "location_lat": 30.5,
        "location_long": -97.5,
        "age_upon_outcome_in_weeks": weeks,
    }
}

fn shelter_with(docs: Vec<Document>) -> AnimalShelter {
    AnimalShelter::with_collection(Arc::new(MemoryCollection::with_documents(docs)))
}

fn fixture() -> Vec<Document> {
    vec![
        dog(1, "Newfoundland", "Intact Female", 52.0, "Bear"),
        dog(2, "Newfoundland", "Intact Male", 52.0, "Moose"),
        dog(3, "Labrador Retriever Mix", "Intact Female", 10.0, "Pup"),
        dog(4, "Chesapeake Bay Retriever", "Intact Female", 156.0, "Chessie"),
        dog(5, "German Shepherd", "Intact Male", 100.0, "Rin"),
        dog(6, "Rottweiler", "Intact Male", 250.0, "Tank"),
        dog(7, "Bloodhound", "Intact Male", 20.0, "Sniff"),
        dog(8, "Beagle", "Neutered Male", 80.0, "Snoopy"),
    ]
}

#[tokio::test]
async fn read_with_empty_query_returns_every_record_in_order() {
    let shelter = shelter_with(fixture());
    let docs = shelter.read(&RecordQuery::all()).await;
    let nums: Vec<i64> = docs.iter().map(|d| d.get_i64("rec_num").unwrap()).collect();
    assert_eq!(nums, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn profile_results_satisfy_every_constraint() {
    let shelter = shelter_with(fixture());
    let everything = shelter.read(&RecordQuery::all()).await;

    for profile in RescueProfile::ALL {
        let hits = shelter.read(&profile.query()).await;
        let (min, max) = profile.age_weeks();

        for doc in &hits {
            assert!(profile.breeds().contains(&doc.get_str("breed").unwrap()));
            assert_eq!(doc.get_str("sex_upon_outcome").unwrap(), profile.sex_label());
            let weeks = doc.get_f64("age_upon_outcome_in_weeks").unwrap();
            assert!(weeks >= min && weeks <= max, "{profile}: {weeks} weeks");
        }

        // Nothing that satisfies the profile is left out.
        let expected = everything.iter().filter(|d| profile.query().matches(d)).count();
        assert_eq!(hits.len(), expected, "{profile}");
    }
}

#[tokio::test]
async fn profile_hits_are_the_expected_animals() {
    let shelter = shelter_with(fixture());
    let names = |docs: Vec<Document>| -> Vec<String> {
        docs.iter().map(|d| d.get_str("name").unwrap().to_string()).collect()
    };

    assert_eq!(
        names(shelter.read(&RescueProfile::Water.query()).await),
        vec!["Bear", "Chessie"]
    );
    assert_eq!(
        names(shelter.read(&RescueProfile::Mountain.query()).await),
        vec!["Rin"]
    );
    assert_eq!(
        names(shelter.read(&RescueProfile::Disaster.query()).await),
        vec!["Rin", "Tank", "Sniff"]
    );
}

#[tokio::test]
async fn create_acknowledges_and_persists() {
    let shelter = shelter_with(vec![]);
    let record = AnimalRecord {
        animal_id: Some("A746874".to_string()),
        breed: Some("Bloodhound".to_string()),
        name: Some("Hank".to_string()),
        ..Default::default()
    };

    assert!(shelter.create_record(&record).await);
    let docs = shelter.read(&RecordQuery::all().equals("animal_id", "A746874")).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get_str("name").unwrap(), "Hank");
}

#[tokio::test]
async fn create_rejects_empty_record() {
    let shelter = shelter_with(vec![]);

    assert!(!shelter.create(Document::new()).await);
    assert!(!shelter.create_record(&AnimalRecord::default()).await);
    assert!(matches!(
        shelter.try_create(Document::new()).await,
        Err(StoreError::InvalidInput(_))
    ));
    assert!(shelter.read(&RecordQuery::all()).await.is_empty());
}

#[tokio::test]
async fn update_sets_fields_and_counts_modifications() {
    let shelter = shelter_with(fixture());
    let query = RecordQuery::all().equals("breed", "Newfoundland");

    assert_eq!(shelter.update(&query, doc! { "outcome_type": "Transfer" }).await, 2);
    // Same change again modifies nothing.
    assert_eq!(shelter.update(&query, doc! { "outcome_type": "Transfer" }).await, 0);

    let updated = shelter.read(&query).await;
    for doc in &updated {
        assert_eq!(doc.get_str("outcome_type").unwrap(), "Transfer");
        assert_eq!(doc.get_str("animal_type").unwrap(), "Dog");
    }
}

#[tokio::test]
async fn update_without_changes_is_invalid_input() {
    let shelter = shelter_with(fixture());
    assert_eq!(shelter.update(&RecordQuery::all(), Document::new()).await, 0);
    assert!(matches!(
        shelter.try_update(&RecordQuery::all(), Document::new()).await,
        Err(StoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn delete_removes_matches_and_reports_count() {
    let shelter = shelter_with(fixture());
    let removed = shelter
        .delete(&RecordQuery::all().equals("sex_upon_outcome", "Intact Male"))
        .await;
    assert_eq!(removed, 4);
    assert_eq!(shelter.read(&RecordQuery::all()).await.len(), 4);
    assert_eq!(
        shelter
            .delete(&RecordQuery::all().equals("breed", "Poodle"))
            .await,
        0
    );
}

#[tokio::test]
async fn store_failures_degrade_to_sentinels() {
    let shelter = AnimalShelter::with_collection(Arc::new(UnreachableCollection));
    let query = RecordQuery::all();

    assert!(!shelter.create(doc! { "name": "Rex" }).await);
    assert!(shelter.read(&query).await.is_empty());
    assert_eq!(shelter.update(&query, doc! { "name": "Max" }).await, 0);
    assert_eq!(shelter.delete(&query).await, 0);
}

#[tokio::test]
async fn typed_operations_expose_the_cause() {
    let shelter = AnimalShelter::with_collection(Arc::new(UnreachableCollection));
    let query = RecordQuery::all();

    assert!(matches!(shelter.try_read(&query).await, Err(StoreError::Driver(_))));
    assert!(matches!(
        shelter.try_delete(&query).await,
        Err(StoreError::Driver(_))
    ));
    // Input validation happens before the store is touched.
    assert!(matches!(
        shelter.try_create(Document::new()).await,
        Err(StoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn close_without_client_is_a_no_op() {
    shelter_with(fixture()).close().await;
}
