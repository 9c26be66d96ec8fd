//! Tests for CollectionView: fetching, local filtering, pagination,
//! mutations, notices and the discarding of stale or late outcomes.

use std::sync::Arc;

use jobboard::api::{ApiResponse, MemoryTransport, Method, ResourceClient};
use jobboard::managers::collection_view::{CollectionView, ViewConfig};
use jobboard::types::errors::{ApiError, ViewError};
use jobboard::types::job::{EmployerJob, Job};
use jobboard::types::record::RecordId;
use jobboard::types::view::{NoticeLevel, ViewState};
use serde_json::{json, Value};

fn job(id: i64, title: &str, company: &str) -> Value {
    json!({"id": id, "title": title, "company": company, "location": "Nairobi", "employmentType": "Full-time"})
}

fn seeded(count: i64) -> Arc<MemoryTransport> {
    let t = Arc::new(MemoryTransport::new());
    t.seed(
        "job",
        (1..=count).map(|i| job(i, &format!("Job {}", i), "Acme")).collect(),
    );
    t
}

fn view(transport: Arc<MemoryTransport>, page_size: usize) -> CollectionView<Job> {
    CollectionView::new(
        ViewConfig::new("jobs", "job", page_size)
            .with_label("Job")
            .with_search_fields(&["title", "company", "location"]),
        ResourceClient::new(transport, "job"),
    )
}

fn ids(view: &CollectionView<Job>) -> Vec<RecordId> {
    view.collection().iter().map(|j| j.id.clone()).collect()
}

// ─── Fetch ───

#[tokio::test]
async fn test_load_replaces_collection_and_marks_loaded() {
    let t = seeded(3);
    let mut v = view(t, 10);
    assert_eq!(v.state(), ViewState::Idle);

    v.load().await.unwrap();
    assert_eq!(v.state(), ViewState::Loaded);
    assert_eq!(ids(&v), vec![RecordId::Int(1), RecordId::Int(2), RecordId::Int(3)]);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_collection() {
    let t = seeded(2);
    let mut v = view(t.clone(), 10);
    v.load().await.unwrap();

    t.fail_next(Method::Get, "job", 500);
    let err = v.load().await.unwrap_err();
    assert!(matches!(err, ViewError::Api(ApiError::Status { status: 500, .. })));
    assert!(matches!(v.state(), ViewState::Errored(_)));
    assert_eq!(v.collection().len(), 2);

    let notices = v.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("Failed to load job"), "{}", notices[0].message);
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let t = seeded(1);
    let mut v = view(t.clone(), 10);
    t.garble_next(Method::Get, "job");
    let err = v.load().await.unwrap_err();
    assert!(matches!(err, ViewError::Api(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_transport_failure_surfaces() {
    let t = seeded(1);
    let mut v = view(t.clone(), 10);
    t.drop_next(Method::Get, "job");
    assert!(matches!(v.load().await, Err(ViewError::Api(ApiError::Transport(_)))));
}

#[tokio::test]
async fn test_superseded_load_is_discarded() {
    let t = seeded(2);
    let mut v = view(t.clone(), 10);

    let first = v.begin_load().unwrap();
    let first_outcome = first.run().await;

    t.seed("job", vec![job(9, "Newer", "Globex")]);
    let second = v.begin_load().unwrap();
    assert!(second.generation() > 0);
    let second_outcome = second.run().await;

    assert!(v.finish_load(second_outcome).unwrap());
    assert!(!v.finish_load(first_outcome).unwrap());
    assert_eq!(ids(&v), vec![RecordId::Int(9)]);
}

#[tokio::test]
async fn test_outcome_after_close_is_discarded() {
    let t = seeded(2);
    let mut v = view(t, 10);
    let ticket = v.begin_load().unwrap();
    v.close();

    let outcome = ticket.run().await;
    assert!(!v.finish_load(outcome).unwrap());
    assert!(v.collection().is_empty());
    assert!(v.is_closed());
    assert!(matches!(v.load().await, Err(ViewError::Closed(_))));
}

#[tokio::test]
async fn test_list_path_and_params_are_sent() {
    let t = Arc::new(MemoryTransport::new());
    t.route(Method::Get, "job/getJobByUserId", |_| {
        ApiResponse::ok(json!({"jobs": [{"id": 1, "title": "Mine"}]}))
    });
    let mut v = CollectionView::<Job>::new(
        ViewConfig::new("employer_jobs", "job", 5).with_list_path("job/getJobByUserId"),
        ResourceClient::new(t.clone(), "job"),
    );

    v.set_params(vec![("userId".to_string(), "42".to_string())]).await.unwrap();
    assert_eq!(v.collection().len(), 1);

    let sent = t.requests();
    let last = sent.last().unwrap();
    assert_eq!(last.path, "job/getJobByUserId");
    assert_eq!(last.query, vec![("userId".to_string(), "42".to_string())]);

    v.set_params(vec![("userId".to_string(), "42".to_string())]).await.unwrap();
    assert_eq!(t.requests().len(), sent.len(), "unchanged params must not refetch");
}

#[tokio::test]
async fn test_set_resource_clears_and_refetches() {
    let t = Arc::new(MemoryTransport::new());
    t.seed("users", vec![json!({"id": 1, "title": "user"})]);
    t.seed("employers", vec![json!({"id": 7, "title": "employer"}), json!({"id": 8, "title": "employer"})]);
    let mut v = CollectionView::<Job>::new(
        ViewConfig::new("admin", "users", 1),
        ResourceClient::new(t.clone(), "users"),
    );
    v.load().await.unwrap();

    v.set_resource("employers").await.unwrap();
    assert_eq!(v.config().resource, "employers");
    assert_eq!(ids(&v), vec![RecordId::Int(7), RecordId::Int(8)]);
    assert_eq!(v.page(), 1);
}

// ─── Filter and pagination ───

#[tokio::test]
async fn test_query_filters_and_resets_page() {
    let t = Arc::new(MemoryTransport::new());
    t.seed(
        "job",
        vec![
            job(1, "Rust Engineer", "Acme"),
            job(2, "Accountant", "Globex"),
            job(3, "Senior RUST dev", "Initech"),
            job(4, "Designer", "rustic studio"),
        ],
    );
    let mut v = view(t, 1);
    v.load().await.unwrap();
    v.go_to_page(3);
    assert_eq!(v.page(), 3);

    v.set_query("rust");
    assert_eq!(v.page(), 1);
    let window = v.window();
    assert_eq!(window.filtered_count, 3);
    assert_eq!(window.total_count, 4);
    assert_eq!(window.total_pages, 3);
    assert_eq!(window.items[0].title, "Rust Engineer");

    v.set_query("zzz");
    let empty = v.window();
    assert!(empty.items.is_empty());
    assert_eq!(empty.total_pages, 1);
    assert_eq!(empty.page, 1);
}

#[tokio::test]
async fn test_page_navigation_is_clamped() {
    let t = seeded(7);
    let mut v = view(t, 5);
    v.load().await.unwrap();
    assert_eq!(v.total_pages(), 2);

    v.previous_page();
    assert_eq!(v.page(), 1);
    v.next_page();
    v.next_page();
    assert_eq!(v.page(), 2);
    assert_eq!(v.window().items.len(), 2);
    v.go_to_page(0);
    assert_eq!(v.page(), 1);
    v.go_to_page(99);
    assert_eq!(v.page(), 2);
}

// ─── Mutations ───

#[tokio::test]
async fn test_delete_removes_record_and_clamps_page() {
    let t = seeded(6);
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();
    v.go_to_page(2);

    v.delete(RecordId::Int(6)).await.unwrap();
    assert_eq!(v.collection().len(), 5);
    assert_eq!(v.page(), 1);
    assert_eq!(t.records("job").len(), 5);

    let notices = v.drain_notices();
    assert_eq!(notices[0].message, "Job deleted");
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_failed_delete_leaves_collection_untouched() {
    let t = seeded(3);
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();

    t.fail_next(Method::Delete, "job/2", 403);
    assert!(v.delete(RecordId::Int(2)).await.is_err());
    assert_eq!(v.collection().len(), 3);
    assert_eq!(v.state(), ViewState::Loaded);
    let notices = v.drain_notices();
    assert!(notices[0].message.starts_with("Failed to delete job"));
}

#[tokio::test]
async fn test_update_merges_server_record() {
    let t = seeded(2);
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let updated = v
        .update(RecordId::Int(2), json!({"title": "Renamed"}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.company, "Acme");
    assert_eq!(v.find(&RecordId::Int(2)).unwrap().title, "Renamed");
}

#[tokio::test]
async fn test_update_without_echo_applies_patch_locally() {
    let t = seeded(1);
    t.route(Method::Patch, "job/1", |_| ApiResponse::new(204, None));
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let updated = v.update(RecordId::Int(1), json!({"featured": true})).await.unwrap();
    assert!(updated.unwrap().featured);
}

#[tokio::test]
async fn test_update_of_absent_record_is_noop() {
    let t = seeded(1);
    t.route(Method::Patch, "job/5", |_| ApiResponse::ok(json!({"id": 5, "title": "Ghost"})));
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let updated = v.update(RecordId::Int(5), json!({"title": "Ghost"})).await.unwrap();
    assert!(updated.is_none());
    assert_eq!(v.collection().len(), 1);
}

#[tokio::test]
async fn test_string_and_numeric_ids_match() {
    let t = seeded(2);
    let mut v = view(t, 5);
    v.load().await.unwrap();
    assert!(v.find(&RecordId::Text("2".to_string())).is_some());
}

#[tokio::test]
async fn test_create_appends_server_record_with_idempotency_key() {
    let t = seeded(2);
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();

    let created = v.create(json!({"title": "Fresh", "company": "Acme"})).await.unwrap();
    assert_eq!(created.id, RecordId::Int(3));
    assert_eq!(v.collection().last().unwrap().title, "Fresh");

    let post = t.requests().into_iter().find(|r| r.method == Method::Post).unwrap();
    assert!(post.idempotency_key.is_some());
}

#[tokio::test]
async fn test_create_retry_reuses_key() {
    let t = seeded(0);
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();

    t.drop_next(Method::Post, "job");
    let ticket = v.begin_create(json!({"title": "Retry me"})).unwrap();
    let key = ticket.idempotency_key().unwrap().to_string();
    let outcome = ticket.run().await;
    assert!(v.finish_mutation(outcome).is_err());
    assert!(v.collection().is_empty());

    let retry = v.begin_create_with_key(json!({"title": "Retry me"}), &key).unwrap();
    let outcome = retry.run().await;
    assert!(v.finish_mutation(outcome).unwrap().is_some());

    let keys: Vec<_> = t
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Post)
        .map(|r| r.idempotency_key)
        .collect();
    assert_eq!(keys, vec![Some(key.clone()), Some(key)]);
}

#[tokio::test]
async fn test_state_is_mutating_while_request_in_flight() {
    let t = seeded(2);
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let ticket = v.begin_delete(RecordId::Int(1)).unwrap();
    assert_eq!(v.state(), ViewState::Mutating);
    let outcome = ticket.run().await;
    v.finish_mutation(outcome).unwrap();
    assert_eq!(v.state(), ViewState::Loaded);
}

#[tokio::test]
async fn test_mutations_apply_in_arrival_order() {
    let t = seeded(3);
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let first = v.begin_update(RecordId::Int(1), json!({"title": "A"})).unwrap();
    let second = v.begin_update(RecordId::Int(1), json!({"title": "B"})).unwrap();
    let second_outcome = second.run().await;
    let first_outcome = first.run().await;

    v.finish_mutation(second_outcome).unwrap();
    v.finish_mutation(first_outcome).unwrap();
    assert_eq!(v.find(&RecordId::Int(1)).unwrap().title, "A");
}

#[tokio::test]
async fn test_mutation_finished_after_close_changes_nothing() {
    let t = seeded(2);
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let ticket = v.begin_delete(RecordId::Int(1)).unwrap();
    v.close();
    let outcome = ticket.run().await;
    assert!(v.finish_mutation(outcome).unwrap().is_none());
    assert!(v.notices().is_empty());
    assert!(matches!(v.begin_delete(RecordId::Int(2)), Err(ViewError::Closed(_))));
}

#[tokio::test]
async fn test_clear_supersedes_in_flight_load() {
    let t = seeded(2);
    let mut v = view(t, 5);
    let ticket = v.begin_load().unwrap();
    v.clear();
    let outcome = ticket.run().await;
    assert!(!v.finish_load(outcome).unwrap());
    assert_eq!(v.state(), ViewState::Idle);
    assert!(!v.is_closed());
}

#[tokio::test]
async fn test_dropped_mutation_ticket_does_not_outlive_clear() {
    let t = seeded(2);
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let ticket = v.begin_update(RecordId::Int(1), json!({"title": "Never sent"})).unwrap();
    drop(ticket);
    assert_eq!(v.state(), ViewState::Mutating);
    v.clear();
    assert_eq!(v.state(), ViewState::Idle);
}

#[tokio::test]
async fn test_create_overtaken_by_reload_keeps_ids_unique() {
    let t = seeded(1);
    let mut v = view(t, 5);
    v.load().await.unwrap();

    let create = v.begin_create(json!({"title": "Fresh", "company": "Acme"})).unwrap();
    let created = create.run().await;
    let reload = v.begin_load().unwrap().run().await;
    assert!(v.finish_load(reload).unwrap());
    assert_eq!(ids(&v), vec![RecordId::Int(1), RecordId::Int(2)]);

    let record = v.finish_mutation(created).unwrap().unwrap();
    assert_eq!(record.title, "Fresh");
    assert_eq!(ids(&v), vec![RecordId::Int(1), RecordId::Int(2)]);
}

#[tokio::test]
async fn test_text_id_is_escaped_in_item_route() {
    let t = Arc::new(MemoryTransport::new());
    t.seed("job", vec![json!({"id": "ops/lead 1", "title": "Ops Lead", "company": "Acme"})]);
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();

    let id = RecordId::Text("ops/lead 1".to_string());
    let updated = v.update(id.clone(), json!({"title": "Ops Manager"})).await.unwrap().unwrap();
    assert_eq!(updated.title, "Ops Manager");

    let patch = t.requests().into_iter().find(|r| r.method == Method::Patch).unwrap();
    assert_eq!(patch.path, "job/ops%2Flead%201");
    assert_eq!(t.records("job")[0]["title"], "Ops Manager");
}

#[tokio::test]
async fn test_list_route_switch_sends_search_and_restores_listing() {
    let t = seeded(3);
    t.route(Method::Get, "job/search", |_| ApiResponse::ok(json!([job(2, "Rust Dev", "Acme")])));
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();
    v.set_query("acme");

    let params = vec![
        ("query".to_string(), "rust".to_string()),
        ("location".to_string(), "Nairobi".to_string()),
    ];
    v.set_list_route(Some("job/search"), params.clone()).await.unwrap();
    assert_eq!(ids(&v), vec![RecordId::Int(2)]);
    assert_eq!(v.query(), "acme");
    let last = t.requests().last().cloned().unwrap();
    assert_eq!(last.path, "job/search");
    assert_eq!(last.query, params);

    let sent = t.requests().len();
    v.set_list_route(Some("job/search"), params).await.unwrap();
    assert_eq!(t.requests().len(), sent);

    v.set_list_route(None, Vec::new()).await.unwrap();
    assert_eq!(v.collection().len(), 3);
    assert_eq!(t.requests().last().unwrap().path, "job");
}

// ─── Partial server replies ───

fn employer_view(transport: Arc<MemoryTransport>) -> CollectionView<EmployerJob> {
    CollectionView::new(
        ViewConfig::new("employer_jobs", "jobs", 5).with_label("Job"),
        ResourceClient::new(transport, "jobs"),
    )
}

#[tokio::test]
async fn test_partial_update_reply_keeps_unmentioned_fields() {
    let t = Arc::new(MemoryTransport::new());
    t.seed(
        "jobs",
        vec![json!({"id": 5, "name": "Old", "description": "Keep me", "location": "Nairobi"})],
    );
    t.route(Method::Patch, "jobs/5", |_| ApiResponse::ok(json!({"id": 5, "name": "New Title"})));
    let mut v = employer_view(t);
    v.load().await.unwrap();

    let updated = v.update(RecordId::Int(5), json!({"name": "New Title"})).await.unwrap().unwrap();
    assert_eq!(updated.name, "New Title");
    assert_eq!(updated.description, "Keep me");
    assert_eq!(updated.location, "Nairobi");
    assert_eq!(v.find(&RecordId::Int(5)).unwrap(), &updated);
}

#[tokio::test]
async fn test_reply_fields_beyond_patch_are_taken() {
    let t = Arc::new(MemoryTransport::new());
    t.seed("jobs", vec![json!({"id": 5, "name": "Old", "location": "Nairobi"})]);
    t.route(Method::Patch, "jobs/5", |_| {
        ApiResponse::ok(json!({"id": 5, "name": "New", "posted_at": "2026-10-01"}))
    });
    let mut v = employer_view(t);
    v.load().await.unwrap();

    let updated = v.update(RecordId::Int(5), json!({"name": "New"})).await.unwrap().unwrap();
    assert_eq!(updated.posted_at.as_deref(), Some("2026-10-01"));
    assert_eq!(updated.location, "Nairobi");
}

#[tokio::test]
async fn test_reply_for_another_record_is_ignored() {
    let t = Arc::new(MemoryTransport::new());
    t.seed("jobs", vec![json!({"id": 5, "name": "Old", "location": "Nairobi"})]);
    t.route(Method::Patch, "jobs/5", |_| ApiResponse::ok(json!({"id": 6, "name": "Other", "location": "Mombasa"})));
    let mut v = employer_view(t);
    v.load().await.unwrap();

    let updated = v.update(RecordId::Int(5), json!({"name": "New"})).await.unwrap().unwrap();
    assert_eq!(updated.id, RecordId::Int(5));
    assert_eq!(updated.name, "New");
    assert_eq!(updated.location, "Nairobi");
}

// ─── Lettered listing ───

fn lettered() -> Arc<MemoryTransport> {
    let t = Arc::new(MemoryTransport::new());
    t.seed(
        "job",
        ('A'..='L')
            .enumerate()
            .map(|(i, c)| job(i as i64 + 1, &format!("Job {}", c), "Acme"))
            .collect(),
    );
    t
}

fn titles(items: &[Job]) -> Vec<&str> {
    items.iter().map(|j| j.title.as_str()).collect()
}

#[tokio::test]
async fn test_twelve_jobs_in_pages_of_five() {
    let mut v = view(lettered(), 5);
    v.load().await.unwrap();
    assert_eq!(v.total_pages(), 3);
    assert_eq!(titles(&v.window().items), ["Job A", "Job B", "Job C", "Job D", "Job E"]);

    v.go_to_page(3);
    assert_eq!(titles(&v.window().items), ["Job K", "Job L"]);
    v.next_page();
    assert_eq!(v.page(), 3);
}

#[tokio::test]
async fn test_query_narrows_to_single_job_from_last_page() {
    let mut v = view(lettered(), 5);
    v.load().await.unwrap();
    v.go_to_page(3);

    v.set_query("ob B");
    let window = v.window();
    assert_eq!(titles(&window.items), ["Job B"]);
    assert_eq!(window.total_pages, 1);
    assert_eq!(window.page, 1);
}

#[tokio::test]
async fn test_update_by_string_id_touches_one_field_of_one_record() {
    let t = lettered();
    let mut v = view(t, 5);
    v.load().await.unwrap();
    let before = serde_json::to_value(v.collection()).unwrap();

    v.update(RecordId::from("5"), json!({"title": "New Title"})).await.unwrap();

    let after = serde_json::to_value(v.collection()).unwrap();
    for (i, (old, new)) in before.as_array().unwrap().iter().zip(after.as_array().unwrap()).enumerate() {
        if i == 4 {
            assert_eq!(new["title"], "New Title");
            let mut expected = old.clone();
            expected["title"] = json!("New Title");
            assert_eq!(new, &expected);
        } else {
            assert_eq!(old, new);
        }
    }
}

#[tokio::test]
async fn test_failed_update_leaves_collection_identical() {
    let t = lettered();
    let mut v = view(t.clone(), 5);
    v.load().await.unwrap();
    let before = serde_json::to_value(v.collection()).unwrap();

    t.fail_next(Method::Patch, "job/5", 500);
    let err = v.update(RecordId::Int(5), json!({"title": "New Title"})).await.unwrap_err();
    assert!(matches!(err, ViewError::Api(ApiError::Status { status: 500, .. })));
    assert_eq!(serde_json::to_value(v.collection()).unwrap(), before);

    let notices = v.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}
