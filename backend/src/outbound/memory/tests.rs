//! Behaviour of the in-memory users adapter.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::MAX_USER_ID;

struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

#[fixture]
fn clock() -> Arc<FixtureClock> {
    let start = Utc
        .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    Arc::new(FixtureClock {
        now: Mutex::new(start),
    })
}

fn facade_with(clock: &Arc<FixtureClock>) -> InMemoryUsersFacade {
    InMemoryUsersFacade::new(clock.clone())
}

fn draft(value: Value) -> UserDraft {
    UserDraft::from_value(value).expect("object draft")
}

fn id(value: u64) -> UserId {
    UserId::new(value).expect("valid id")
}

#[rstest]
#[tokio::test]
async fn create_assigns_sequential_ids_and_timestamps(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);

    let first = facade.create(draft(json!({ "name": "Ada", "id": 99 }))).await;
    let second = facade.create(draft(json!({ "name": "Grace" }))).await;

    assert_eq!(first.status_code(), 201);
    assert_eq!(first.payload()["id"], json!(1));
    assert_eq!(second.payload()["id"], json!(2));
    assert_eq!(first.payload()["createdAt"], json!("2026-03-01T09:00:00.000Z"));
    assert_eq!(first.payload()["updatedAt"], first.payload()["createdAt"]);
}

#[rstest]
#[tokio::test]
async fn deleted_ids_are_not_reused(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);
    facade.create(draft(json!({ "name": "Ada" }))).await;

    let removed = facade.delete_by_id(id(1)).await;
    let next = facade.create(draft(json!({ "name": "Grace" }))).await;

    assert_eq!(removed.status_code(), 200);
    assert_eq!(removed.payload()["name"], json!("Ada"));
    assert_eq!(next.payload()["id"], json!(2));
    assert_eq!(facade.get_by_id(id(1)).await.status_code(), 404);
}

#[rstest]
#[tokio::test]
async fn bulk_create_stores_every_entry(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);

    let created = facade
        .bulk_create(vec![draft(json!({ "name": "Ada" })), draft(json!({ "name": "Grace" }))])
        .await;

    assert_eq!(created.status_code(), 201);
    let ids: Vec<&Value> = created
        .payload()
        .as_array()
        .expect("array payload")
        .iter()
        .map(|user| &user["id"])
        .collect();
    assert_eq!(ids, vec![&json!(1), &json!(2)]);
    let listed = facade.list_all().await;
    assert_eq!(listed.payload().as_array().map(Vec::len), Some(2));
}

#[rstest]
#[tokio::test]
async fn bulk_create_rejects_empty_batches(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);

    let envelope = facade.bulk_create(Vec::new()).await;

    assert_eq!(envelope.status_code(), 400);
    assert_eq!(envelope.payload()["code"], json!("invalid_request"));
}

#[rstest]
#[tokio::test]
async fn bulk_create_past_the_id_space_stores_nothing(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);
    facade.store.write().expect("store lock").next_id = MAX_USER_ID;

    let envelope = facade
        .bulk_create(vec![draft(json!({ "name": "Ada" })), draft(json!({ "name": "Grace" }))])
        .await;

    assert_eq!(envelope.status_code(), 500);
    assert_eq!(facade.list_all().await.payload(), &json!([]));
    let last = facade.create(draft(json!({ "name": "Linus" }))).await;
    assert_eq!(last.status_code(), 201);
    assert_eq!(last.payload()["id"], json!(MAX_USER_ID));
}

#[rstest]
#[case(&[("role", "admin")], &[1])]
#[case(&[("role", "member"), ("active", "true")], &[2])]
#[case(&[("id", "3")], &[3])]
#[case(&[("id", "003")], &[3])]
#[case(&[("id", "three")], &[])]
#[case(&[("age", "36")], &[1])]
#[case(&[("missing", "x")], &[])]
#[case(&[], &[1, 2, 3])]
#[tokio::test]
async fn find_matches_every_criterion(
    clock: Arc<FixtureClock>,
    #[case] criteria: &[(&str, &str)],
    #[case] expected: &[u64],
) {
    let facade = facade_with(&clock);
    facade
        .bulk_create(vec![
            draft(json!({ "role": "admin", "age": 36 })),
            draft(json!({ "role": "member", "active": true })),
            draft(json!({ "role": "member", "active": false })),
        ])
        .await;
    let filter: UserFilter = criteria
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();

    let found = facade.find(&filter).await;

    assert_eq!(found.status_code(), 200);
    let ids: Vec<u64> = found
        .payload()
        .as_array()
        .expect("array payload")
        .iter()
        .filter_map(|user| user["id"].as_u64())
        .collect();
    assert_eq!(ids, expected);
}

#[rstest]
#[tokio::test]
async fn update_merges_fields_and_refreshes_timestamp(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);
    facade
        .create(draft(json!({ "name": "Ada", "role": "member" })))
        .await;
    clock.advance(Duration::minutes(5));

    let updated = facade
        .update(
            id(1),
            draft(json!({ "role": "admin", "id": 7, "createdAt": "never" })),
        )
        .await;

    assert_eq!(updated.status_code(), 200);
    let payload = updated.payload();
    assert_eq!(payload["id"], json!(1));
    assert_eq!(payload["name"], json!("Ada"));
    assert_eq!(payload["role"], json!("admin"));
    assert_eq!(payload["createdAt"], json!("2026-03-01T09:00:00.000Z"));
    assert_eq!(payload["updatedAt"], json!("2026-03-01T09:05:00.000Z"));
}

#[rstest]
#[tokio::test]
async fn unknown_ids_are_reported_as_not_found(clock: Arc<FixtureClock>) {
    let facade = facade_with(&clock);

    for envelope in [
        facade.get_by_id(id(5)).await,
        facade.update(id(5), UserDraft::default()).await,
        facade.delete_by_id(id(5)).await,
    ] {
        assert_eq!(envelope.status_code(), 404);
        assert_eq!(envelope.payload()["code"], json!("not_found"));
    }
}

#[rstest]
#[tokio::test]
async fn poisoned_store_reports_internal_error(clock: Arc<FixtureClock>) {
    let facade = Arc::new(facade_with(&clock));
    let poisoner = Arc::clone(&facade);
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.store.write().expect("first lock");
        panic!("poison the store");
    })
    .join();

    let envelope = facade.list_all().await;

    assert_eq!(envelope.status_code(), 500);
    assert_eq!(envelope.payload()["message"], json!("Internal server error"));
}
