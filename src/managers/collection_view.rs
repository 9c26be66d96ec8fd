//! Collection view for the jobboard client.
//!
//! A `CollectionView` owns one remote collection together with the local
//! filter query, the page position and the queue of user-visible notices.
//! Network work is split into tickets: `begin_*` snapshots what the request
//! needs, the ticket is awaited without borrowing the view, and `finish_*`
//! applies the outcome. The one-shot helpers (`load`, `update`, `delete`,
//! `create`) chain the three steps.
//!
//! Outcomes that arrive after `close()` are discarded. A load outcome is also
//! discarded when a newer load was begun after it. Mutation outcomes apply in
//! arrival order.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::client::{merge_reply, ResourceClient};
use crate::managers::filter::filter;
use crate::managers::paginator::{paginate, total_pages, Paginator};
use crate::types::errors::{ApiError, ViewError};
use crate::types::record::{Record, RecordId};
use crate::types::view::{Notice, PageWindow, ViewState};

/// Static description of a list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Name used in logs, notices and RPC dispatch.
    pub name: String,
    /// Singular label for notices, e.g. `Job`.
    pub label: String,
    /// REST resource for item routes (`/<resource>/<id>`) and creates.
    pub resource: String,
    /// Collection route when it differs from the resource.
    pub list_path: Option<String>,
    pub page_size: usize,
    /// Fields the filter query is matched against.
    pub search_fields: Vec<String>,
}

impl ViewConfig {
    pub fn new(name: &str, resource: &str, page_size: usize) -> Self {
        Self {
            name: name.to_string(),
            label: "Item".to_string(),
            resource: resource.to_string(),
            list_path: None,
            page_size,
            search_fields: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_list_path(mut self, path: &str) -> Self {
        self.list_path = Some(path.to_string());
        self
    }

    pub fn with_search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

// === Tickets ===

/// An issued but not yet awaited collection fetch.
pub struct LoadTicket<R> {
    client: ResourceClient,
    list_path: Option<String>,
    params: Vec<(String, String)>,
    generation: u64,
    _record: PhantomData<fn() -> R>,
}

/// The result of a fetch, to be handed back to [`CollectionView::finish_load`].
pub struct LoadOutcome<R> {
    generation: u64,
    result: Result<Vec<R>, ApiError>,
}

impl<R: Record> LoadTicket<R> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run(self) -> LoadOutcome<R> {
        let result = self
            .client
            .list(self.list_path.as_deref(), &self.params)
            .await;
        LoadOutcome {
            generation: self.generation,
            result,
        }
    }
}

#[derive(Debug, Clone)]
enum Operation {
    Update { id: RecordId, patch: Value },
    Delete { id: RecordId },
    Create { fields: Value, idempotency_key: String },
}

enum Reply<R> {
    Updated(Option<Value>),
    Deleted,
    Created(R),
}

/// An issued but not yet awaited mutation.
pub struct MutationTicket<R> {
    client: ResourceClient,
    op: Operation,
    _record: PhantomData<fn() -> R>,
}

/// The result of a mutation, to be handed back to
/// [`CollectionView::finish_mutation`].
pub struct MutationOutcome<R> {
    op: Operation,
    result: Result<Reply<R>, ApiError>,
}

impl<R: Record> MutationTicket<R> {
    /// Idempotency key sent with a create; `None` for other mutations.
    pub fn idempotency_key(&self) -> Option<&str> {
        match &self.op {
            Operation::Create { idempotency_key, .. } => Some(idempotency_key),
            _ => None,
        }
    }

    pub async fn run(self) -> MutationOutcome<R> {
        let result = match &self.op {
            Operation::Update { id, patch } => self.client.update(id, patch).await.map(Reply::Updated),
            Operation::Delete { id } => self.client.delete(id).await.map(|_| Reply::Deleted),
            Operation::Create {
                fields,
                idempotency_key,
            } => self
                .client
                .create(fields, idempotency_key)
                .await
                .map(Reply::Created),
        };
        MutationOutcome { op: self.op, result }
    }
}

// === CollectionView ===

/// One list view: fetched collection, filter query, page position, notices.
pub struct CollectionView<R: Record> {
    config: ViewConfig,
    client: ResourceClient,
    params: Vec<(String, String)>,
    collection: Vec<R>,
    query: String,
    paginator: Paginator,
    state: ViewState,
    pending_mutations: usize,
    generation: u64,
    notices: Vec<Notice>,
    closed: bool,
}

impl<R: Record> CollectionView<R> {
    pub fn new(config: ViewConfig, mut client: ResourceClient) -> Self {
        client.set_resource(&config.resource);
        let paginator = Paginator::new(config.page_size);
        Self {
            config,
            client,
            params: Vec::new(),
            collection: Vec::new(),
            query: String::new(),
            paginator,
            state: ViewState::Idle,
            pending_mutations: 0,
            generation: 0,
            notices: Vec::new(),
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Current state; `Mutating` while any mutation is in flight.
    pub fn state(&self) -> ViewState {
        if self.pending_mutations > 0 {
            ViewState::Mutating
        } else {
            self.state.clone()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The whole fetched collection, unfiltered.
    pub fn collection(&self) -> &[R] {
        &self.collection
    }

    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.collection.iter().find(|r| &r.id() == id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn set_bearer(&mut self, token: Option<String>) {
        self.client.set_bearer(token);
    }

    fn ensure_open(&self) -> Result<(), ViewError> {
        if self.closed {
            return Err(ViewError::Closed(self.config.name.clone()));
        }
        Ok(())
    }

    fn fail(&mut self, action: &str, err: &ApiError) {
        warn!(view = %self.config.name, action, error = %err, "request failed");
        self.notices
            .push(Notice::error(format!("Failed to {} {}: {}", action, self.config.label.to_lowercase(), err)));
    }

    // --- fetch ---

    /// Marks the view loading and returns the request to await.
    pub fn begin_load(&mut self) -> Result<LoadTicket<R>, ViewError> {
        self.ensure_open()?;
        self.generation += 1;
        self.state = ViewState::Loading;
        debug!(view = %self.config.name, generation = self.generation, "load started");
        Ok(LoadTicket {
            client: self.client.clone(),
            list_path: self.config.list_path.clone(),
            params: self.params.clone(),
            generation: self.generation,
            _record: PhantomData,
        })
    }

    /// Applies a fetch result.
    ///
    /// Returns `Ok(false)` when the outcome was discarded because the view is
    /// closed or a newer load superseded it.
    pub fn finish_load(&mut self, outcome: LoadOutcome<R>) -> Result<bool, ViewError> {
        if self.closed || outcome.generation != self.generation {
            debug!(
                view = %self.config.name,
                generation = outcome.generation,
                current = self.generation,
                "discarding stale load"
            );
            return Ok(false);
        }
        match outcome.result {
            Ok(records) => {
                info!(view = %self.config.name, count = records.len(), "collection loaded");
                self.collection = records;
                self.state = ViewState::Loaded;
                self.clamp_page();
                Ok(true)
            }
            Err(err) => {
                self.fail("load", &err);
                self.state = ViewState::Errored(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Fetches the collection, replacing it on success.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let ticket = self.begin_load()?;
        let outcome = ticket.run().await;
        self.finish_load(outcome).map(|_| ())
    }

    /// Changes the query parameters and refetches when they differ.
    pub async fn set_params(&mut self, params: Vec<(String, String)>) -> Result<(), ViewError> {
        if params == self.params {
            return Ok(());
        }
        self.params = params;
        self.load().await
    }

    /// Switches the collection route together with its query parameters and
    /// refetches when either changed. `None` restores the resource route.
    pub async fn set_list_route(
        &mut self,
        list_path: Option<&str>,
        params: Vec<(String, String)>,
    ) -> Result<(), ViewError> {
        self.ensure_open()?;
        let list_path = list_path.map(|p| p.trim_matches('/').to_string());
        if list_path == self.config.list_path && params == self.params {
            return Ok(());
        }
        debug!(view = %self.config.name, route = ?list_path, "list route changed");
        self.config.list_path = list_path;
        self.params = params;
        self.paginator.reset();
        self.load().await
    }

    /// Points the view at another resource (route parameter) and refetches.
    ///
    /// The old collection belongs to a different resource, so it is dropped
    /// before the fetch.
    pub async fn set_resource(&mut self, resource: &str) -> Result<(), ViewError> {
        self.ensure_open()?;
        if resource == self.config.resource {
            return Ok(());
        }
        self.config.resource = resource.to_string();
        self.client.set_resource(resource);
        self.collection.clear();
        self.paginator.reset();
        self.load().await
    }

    // --- filter and pages ---

    fn search_fields(&self) -> Vec<&str> {
        self.config.search_fields.iter().map(String::as_str).collect()
    }

    /// Records matching the current query, in collection order.
    pub fn filtered(&self) -> Vec<&R> {
        filter(&self.collection, &self.query, &self.search_fields())
    }

    pub fn set_query(&mut self, query: &str) {
        if query != self.query {
            self.query = query.to_string();
            self.paginator.reset();
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered().len(), self.paginator.page_size())
    }

    pub fn page(&self) -> usize {
        self.paginator.current().min(self.total_pages())
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        self.paginator.next(total);
    }

    pub fn previous_page(&mut self) {
        self.paginator.previous();
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        self.paginator.go_to(page, total);
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        self.paginator.clamp(total);
    }

    /// Snapshot of the visible page.
    pub fn window(&self) -> PageWindow<R> {
        let matching = self.filtered();
        let (items, total) = paginate(&matching, self.paginator.current(), self.paginator.page_size());
        PageWindow {
            items: items.iter().map(|r| (*r).clone()).collect(),
            page: self.paginator.current().clamp(1, total),
            total_pages: total,
            page_size: self.paginator.page_size(),
            filtered_count: matching.len(),
            total_count: self.collection.len(),
            query: self.query.clone(),
            state: self.state(),
        }
    }

    // --- mutations ---

    fn begin_mutation(&mut self, op: Operation) -> Result<MutationTicket<R>, ViewError> {
        self.ensure_open()?;
        self.pending_mutations += 1;
        Ok(MutationTicket {
            client: self.client.clone(),
            op,
            _record: PhantomData,
        })
    }

    pub fn begin_update(&mut self, id: RecordId, patch: Value) -> Result<MutationTicket<R>, ViewError> {
        self.begin_mutation(Operation::Update { id, patch })
    }

    pub fn begin_delete(&mut self, id: RecordId) -> Result<MutationTicket<R>, ViewError> {
        self.begin_mutation(Operation::Delete { id })
    }

    /// Starts a create with a fresh idempotency key.
    pub fn begin_create(&mut self, fields: Value) -> Result<MutationTicket<R>, ViewError> {
        self.begin_create_with_key(fields, &Uuid::new_v4().to_string())
    }

    /// Starts a create that retries an earlier attempt under the same key.
    pub fn begin_create_with_key(&mut self, fields: Value, key: &str) -> Result<MutationTicket<R>, ViewError> {
        self.begin_mutation(Operation::Create {
            fields,
            idempotency_key: key.to_string(),
        })
    }

    /// Applies a mutation result.
    ///
    /// On success returns the affected record (`None` for deletes and for
    /// updates of records no longer in the collection). On failure the
    /// collection is left untouched and an error notice is queued.
    pub fn finish_mutation(&mut self, outcome: MutationOutcome<R>) -> Result<Option<R>, ViewError> {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        if self.closed {
            debug!(view = %self.config.name, "discarding mutation on closed view");
            return Ok(None);
        }

        let action = match &outcome.op {
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
            Operation::Create { .. } => "create",
        };
        let reply = match outcome.result {
            Ok(reply) => reply,
            Err(err) => {
                self.fail(action, &err);
                return Err(err.into());
            }
        };

        match (outcome.op, reply) {
            (Operation::Update { id, patch }, Reply::Updated(echoed)) => self.apply_update(&id, &patch, echoed),
            (Operation::Delete { id }, _) => {
                self.collection.retain(|r| r.id() != id);
                self.clamp_page();
                self.notices
                    .push(Notice::success(format!("{} deleted", self.config.label)));
                Ok(None)
            }
            (Operation::Create { .. }, Reply::Created(record)) => {
                // A reload that finished first may already hold the new record.
                let id = record.id();
                match self.collection.iter().position(|r| r.id() == id) {
                    Some(idx) => self.collection[idx] = record.clone(),
                    None => self.collection.push(record.clone()),
                }
                self.notices
                    .push(Notice::success(format!("{} created", self.config.label)));
                Ok(Some(record))
            }
            _ => Ok(None),
        }
    }

    fn apply_update(&mut self, id: &RecordId, patch: &Value, reply: Option<Value>) -> Result<Option<R>, ViewError> {
        let Some(idx) = self.collection.iter().position(|r| &r.id() == id) else {
            debug!(view = %self.config.name, id = %id, "updated record not in collection");
            return Ok(None);
        };
        let updated = match merge_reply(&self.collection[idx], patch, reply.as_ref()) {
            Ok(record) => record,
            Err(e) => {
                let err = ApiError::Decode(format!("patch does not fit record {}: {}", id, e));
                self.fail("update", &err);
                return Err(err.into());
            }
        };
        self.collection[idx] = updated.clone();
        self.notices
            .push(Notice::success(format!("{} updated", self.config.label)));
        Ok(Some(updated))
    }

    /// `PATCH /<resource>/<id>` and merge on success.
    pub async fn update(&mut self, id: RecordId, patch: Value) -> Result<Option<R>, ViewError> {
        let outcome = self.begin_update(id, patch)?.run().await;
        self.finish_mutation(outcome)
    }

    /// `DELETE /<resource>/<id>` and drop the record on success.
    pub async fn delete(&mut self, id: RecordId) -> Result<(), ViewError> {
        let outcome = self.begin_delete(id)?.run().await;
        self.finish_mutation(outcome).map(|_| ())
    }

    /// `POST /<resource>` and add the server's record on success.
    pub async fn create(&mut self, fields: Value) -> Result<R, ViewError> {
        let outcome = self.begin_create(fields)?.run().await;
        self.finish_mutation(outcome)?
            .ok_or_else(|| ViewError::Closed(self.config.name.clone()))
    }

    // --- notices and teardown ---

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Forgets everything fetched or typed and returns to `Idle`.
    ///
    /// Loads already in flight are superseded and mutations still pending no
    /// longer count towards `Mutating`; the view stays usable.
    pub fn clear(&mut self) {
        self.collection.clear();
        self.query.clear();
        self.paginator.reset();
        self.notices.clear();
        self.state = ViewState::Idle;
        self.pending_mutations = 0;
        self.generation += 1;
    }

    /// Tears the view down. Outcomes of requests still in flight are ignored.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        info!(view = %self.config.name, "view closed");
        self.clear();
        self.closed = true;
    }
}

// === ListView ===

/// Type-erased view operations, for dispatch by view name.
#[async_trait]
pub trait ListView: Send {
    fn name(&self) -> &str;
    async fn load(&mut self) -> Result<(), ViewError>;
    async fn set_params(&mut self, params: Vec<(String, String)>) -> Result<(), ViewError>;
    fn set_query(&mut self, query: &str);
    fn next_page(&mut self);
    fn previous_page(&mut self);
    fn go_to_page(&mut self, page: usize);
    fn window_json(&self) -> Result<Value, ViewError>;
    async fn update_json(&mut self, id: RecordId, patch: Value) -> Result<Value, ViewError>;
    async fn delete(&mut self, id: RecordId) -> Result<(), ViewError>;
    async fn create_json(&mut self, fields: Value) -> Result<Value, ViewError>;
    fn drain_notices(&mut self) -> Vec<Notice>;
    fn close(&mut self);
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ViewError> {
    serde_json::to_value(value).map_err(|e| ViewError::Api(ApiError::Decode(e.to_string())))
}

#[async_trait]
impl<R: Record> ListView for CollectionView<R> {
    fn name(&self) -> &str {
        CollectionView::name(self)
    }

    async fn load(&mut self) -> Result<(), ViewError> {
        CollectionView::load(self).await
    }

    async fn set_params(&mut self, params: Vec<(String, String)>) -> Result<(), ViewError> {
        CollectionView::set_params(self, params).await
    }

    fn set_query(&mut self, query: &str) {
        CollectionView::set_query(self, query)
    }

    fn next_page(&mut self) {
        CollectionView::next_page(self)
    }

    fn previous_page(&mut self) {
        CollectionView::previous_page(self)
    }

    fn go_to_page(&mut self, page: usize) {
        CollectionView::go_to_page(self, page)
    }

    fn window_json(&self) -> Result<Value, ViewError> {
        to_json(&self.window())
    }

    async fn update_json(&mut self, id: RecordId, patch: Value) -> Result<Value, ViewError> {
        let updated = CollectionView::update(self, id, patch).await?;
        match updated {
            Some(record) => to_json(&record),
            None => Ok(Value::Null),
        }
    }

    async fn delete(&mut self, id: RecordId) -> Result<(), ViewError> {
        CollectionView::delete(self, id).await
    }

    async fn create_json(&mut self, fields: Value) -> Result<Value, ViewError> {
        let created = CollectionView::create(self, fields).await?;
        to_json(&created)
    }

    fn drain_notices(&mut self) -> Vec<Notice> {
        CollectionView::drain_notices(self)
    }

    fn close(&mut self) {
        CollectionView::close(self)
    }
}
