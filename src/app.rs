//! App Core for the jobboard client.
//!
//! Central struct holding every list view, the session context and the
//! services, wired to one set of backend transports.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::api::client::ResourceClient;
use crate::api::transport::Transport;
use crate::managers::blog_reader::BlogReader;
use crate::managers::bookmark_tracker::{
    BookmarkTracker, BookmarkTrackerTrait, LIKED_COMMENTS_KEY, SAVED_BLOGS_KEY, SAVED_JOBS_KEY,
};
use crate::managers::collection_view::{CollectionView, ListView, ViewConfig};
use crate::managers::job_wizard::JobWizard;
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::services::auth_service::{AuthService, AuthServiceTrait};
use crate::services::employer_service::{EmployerService, EmployerServiceTrait, ProfileDetails};
use crate::services::payment_service::{MockPaymentProcessor, PaymentProcessor, RestPaymentProcessor};
use crate::services::preference_store::PreferenceStore;
use crate::services::pricing;
use crate::services::settings_engine::SettingsEngine;
use crate::types::blog::Blog;
use crate::types::errors::{PaymentError, PreferenceError, SessionError, ViewError, WizardError};
use crate::types::job::{EmployerJob, Job};
use crate::types::payment::{BillingCycle, Currency, PaymentMethod, PaymentReceipt, PaymentRequest};
use crate::types::record::RecordId;
use crate::types::session::Session;
use crate::types::settings::{ClientSettings, PaymentMode};
use crate::types::user::{AdminItem, EmployerProfile, Role};
use crate::types::view::ViewState;

pub const JOBS_VIEW: &str = "jobs";
pub const EMPLOYER_JOBS_VIEW: &str = "employer_jobs";
pub const BLOGS_VIEW: &str = "blogs";
pub const ADMIN_VIEW: &str = "admin";

/// Server-side job search route (`?query=&location=`).
pub const JOB_SEARCH_PATH: &str = "job/search";

/// One transport per backend service.
#[derive(Clone)]
pub struct Transports {
    pub jobs: Arc<dyn Transport>,
    pub blogs: Arc<dyn Transport>,
    pub admin: Arc<dyn Transport>,
    pub auth: Arc<dyn Transport>,
    pub payments: Arc<dyn Transport>,
}

impl Transports {
    /// Routes every service through the same transport.
    pub fn shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            jobs: transport.clone(),
            blogs: transport.clone(),
            admin: transport.clone(),
            auth: transport.clone(),
            payments: transport,
        }
    }

    /// HTTP transports for the configured service URLs.
    #[cfg(feature = "network")]
    pub fn http(api: &crate::types::settings::ApiSettings) -> Result<Self, crate::types::errors::ApiError> {
        use crate::api::http::HttpTransport;
        let make = |url: &str| -> Result<Arc<dyn Transport>, crate::types::errors::ApiError> {
            Ok(Arc::new(HttpTransport::new(url, api.timeout_secs)?))
        };
        Ok(Self {
            jobs: make(api.jobs())?,
            blogs: make(api.blogs())?,
            admin: make(api.admin())?,
            auth: make(api.auth())?,
            payments: make(api.payments())?,
        })
    }
}

/// Figures shown on the employer dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub active_jobs: usize,
    pub plan: Option<String>,
    pub remaining_quota: Option<i64>,
    pub subscription_end: Option<String>,
}

/// Central application struct.
pub struct App {
    pub settings: ClientSettings,
    pub transports: Transports,
    pub preferences: Arc<dyn PreferenceStore>,
    pub sessions: SessionManager,
    pub auth: AuthService,
    pub employer: EmployerService,
    pub jobs: CollectionView<Job>,
    pub employer_jobs: CollectionView<EmployerJob>,
    pub blogs: CollectionView<Blog>,
    pub admin: CollectionView<AdminItem>,
    pub saved_jobs: BookmarkTracker,
    pub saved_blogs: BookmarkTracker,
    pub blog_reader: BlogReader,
    pub wizard: JobWizard,
    pub payments: Box<dyn PaymentProcessor>,
    /// Backing file of `settings`; changes apply at the next start.
    pub settings_engine: Option<SettingsEngine>,
}

impl App {
    /// Builds the views and services. Nothing is fetched yet.
    pub fn new(
        settings: ClientSettings,
        transports: Transports,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Result<Self, PreferenceError> {
        let views = &settings.views;

        let jobs = CollectionView::new(
            ViewConfig::new(JOBS_VIEW, "job", views.jobs_page_size)
                .with_label("Job")
                .with_search_fields(&["title", "company", "location", "employmentType"]),
            ResourceClient::new(transports.jobs.clone(), "job"),
        );
        let employer_jobs = CollectionView::new(
            ViewConfig::new(EMPLOYER_JOBS_VIEW, "jobs", views.employer_jobs_page_size)
                .with_label("Job")
                .with_list_path("job/getJobByUserId")
                .with_search_fields(&["name", "location", "description"]),
            ResourceClient::new(transports.jobs.clone(), "jobs"),
        );
        let blogs = CollectionView::new(
            ViewConfig::new(BLOGS_VIEW, "blogs", views.blogs_page_size)
                .with_label("Blog")
                .with_search_fields(&["name", "author"]),
            ResourceClient::new(transports.blogs.clone(), "blogs"),
        );
        let admin = CollectionView::new(
            ViewConfig::new(ADMIN_VIEW, "users", views.admin_page_size)
                .with_label("Item")
                .with_search_fields(&["name", "description"]),
            ResourceClient::new(transports.admin.clone(), "users"),
        );

        let saved_jobs = BookmarkTracker::open(preferences.clone(), SAVED_JOBS_KEY)?;
        let saved_blogs = BookmarkTracker::open(preferences.clone(), SAVED_BLOGS_KEY)?;
        let liked_comments = BookmarkTracker::open(preferences.clone(), LIKED_COMMENTS_KEY)?;
        let blog_reader = BlogReader::new(ResourceClient::new(transports.blogs.clone(), "blogs"), liked_comments);

        let payments: Box<dyn PaymentProcessor> = match settings.payment.mode {
            PaymentMode::Mock => Box::new(MockPaymentProcessor::new()),
            PaymentMode::Live => Box::new(RestPaymentProcessor::new(transports.payments.clone())),
        };

        Ok(Self {
            auth: AuthService::new(transports.auth.clone()),
            employer: EmployerService::new(transports.jobs.clone()),
            sessions: SessionManager::new(preferences.clone()),
            jobs,
            employer_jobs,
            blogs,
            admin,
            saved_jobs,
            saved_blogs,
            blog_reader,
            wizard: JobWizard::new(),
            payments,
            settings,
            transports,
            preferences,
            settings_engine: None,
        })
    }

    pub fn with_settings_engine(mut self, engine: SettingsEngine) -> Self {
        self.settings_engine = Some(engine);
        self
    }

    /// Restores a persisted session. Returns whether one was found.
    pub fn startup(&mut self) -> Result<bool, SessionError> {
        let restored = self.sessions.restore()?;
        self.apply_bearer();
        info!(restored, payment_mode = ?self.settings.payment.mode, "client started");
        Ok(restored)
    }

    fn apply_bearer(&mut self) {
        let token = self.sessions.token();
        self.jobs.set_bearer(token.clone());
        self.employer_jobs.set_bearer(token.clone());
        self.blogs.set_bearer(token.clone());
        self.admin.set_bearer(token);
    }

    /// Signs in; an employer's company profile is fetched right after.
    ///
    /// A profile that fails to load does not fail the login; the dashboard
    /// shows no plan until [`App::load_employer_profile`] succeeds.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Role, SessionError> {
        let session = self.auth.login(email, password).await?;
        let role = session.role;
        self.sessions.start(session)?;
        self.apply_bearer();
        if role == Role::Employer {
            if let Err(e) = self.load_employer_profile().await {
                warn!(error = %e, "employer profile not loaded after login");
            }
        }
        Ok(role)
    }

    /// `GET /employer/profile` into the session context.
    pub async fn load_employer_profile(&mut self) -> Result<&EmployerProfile, SessionError> {
        let token = self.sessions.require_role(Role::Employer)?.bearer().to_string();
        let profile = self.employer.fetch_profile(&token).await?;
        self.sessions.set_employer_profile(profile)?;
        self.sessions.employer_profile().ok_or(SessionError::NotAuthenticated)
    }

    /// `PUT /employer/update-details`, then keeps the merged profile.
    ///
    /// The current profile is fetched first when none is held yet.
    pub async fn update_employer_profile(&mut self, details: &ProfileDetails) -> Result<&EmployerProfile, SessionError> {
        let token = self.sessions.require_role(Role::Employer)?.bearer().to_string();
        let current = match self.sessions.employer_profile() {
            Some(profile) => profile.clone(),
            None => self.employer.fetch_profile(&token).await?,
        };
        let updated = self.employer.update_details(&token, &current, details).await?;
        self.sessions.set_employer_profile(updated)?;
        self.sessions.employer_profile().ok_or(SessionError::NotAuthenticated)
    }

    /// Ends the session and forgets data that belonged to it.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.sessions.logout()?;
        self.apply_bearer();
        self.employer_jobs.clear();
        self.admin.clear();
        self.wizard.reset();
        Ok(())
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// Looks a list view up by name for type-erased dispatch.
    ///
    /// The admin view is only handed to an admin session.
    pub fn view_mut(&mut self, name: &str) -> Result<&mut dyn ListView, ViewError> {
        match name {
            JOBS_VIEW => Ok(&mut self.jobs),
            EMPLOYER_JOBS_VIEW => Ok(&mut self.employer_jobs),
            BLOGS_VIEW => Ok(&mut self.blogs),
            ADMIN_VIEW => {
                self.sessions.require_role(Role::Admin)?;
                Ok(&mut self.admin)
            }
            other => Err(ViewError::UnknownView(other.to_string())),
        }
    }

    pub fn tracker_mut(&mut self, key: &str) -> Result<&mut BookmarkTracker, ViewError> {
        match key {
            SAVED_JOBS_KEY => Ok(&mut self.saved_jobs),
            SAVED_BLOGS_KEY => Ok(&mut self.saved_blogs),
            other => Err(ViewError::UnknownView(other.to_string())),
        }
    }

    /// Asks the server for matching jobs (`GET /job/search`).
    ///
    /// Blank `query` and `location` go back to the full listing. The local
    /// filter query is left as it is and narrows the server's answer further.
    pub async fn search_jobs(&mut self, query: &str, location: &str) -> Result<(), ViewError> {
        let (query, location) = (query.trim(), location.trim());
        if query.is_empty() && location.is_empty() {
            return self.jobs.set_list_route(None, Vec::new()).await;
        }
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("location".to_string(), location.to_string()),
        ];
        self.jobs.set_list_route(Some(JOB_SEARCH_PATH), params).await
    }

    /// Jobs in the loaded collection that the seeker saved, in collection order.
    pub fn saved_job_list(&self) -> Vec<Job> {
        self.jobs
            .collection()
            .iter()
            .filter(|j| self.saved_jobs.contains(&j.id))
            .cloned()
            .collect()
    }

    /// Switches the admin view to another item type (`users`, `employers`, ...).
    pub async fn open_admin_items(&mut self, item_type: &str) -> Result<(), ViewError> {
        self.sessions.require_role(Role::Admin)?;
        let item_type = item_type.trim_matches('/');
        if self.admin.config().resource == item_type {
            self.admin.load().await
        } else {
            self.admin.set_resource(item_type).await
        }
    }

    /// Flips the `featured` flag of a job.
    pub async fn toggle_featured(&mut self, id: RecordId) -> Result<Option<Job>, ViewError> {
        let featured = self
            .jobs
            .find(&id)
            .map(|j| j.featured)
            .ok_or_else(|| ViewError::MissingRecord(format!("job {}", id)))?;
        self.jobs.update(id, json!({ "featured": !featured })).await
    }

    pub fn dashboard_summary(&self) -> DashboardSummary {
        let profile = self.sessions.employer_profile();
        DashboardSummary {
            active_jobs: self.employer_jobs.collection().len(),
            plan: profile.and_then(|p| p.subscription_plan.clone()),
            remaining_quota: profile.map(|p| p.job_post_quota),
            subscription_end: profile.and_then(|p| p.subscription_end_date.clone()),
        }
    }

    /// Posts the wizard's draft and, on success, refreshes the employer's jobs.
    pub async fn submit_job(&mut self) -> Result<String, WizardError> {
        let transport = self.transports.jobs.clone();
        let message = self.wizard.submit(transport.as_ref(), &self.sessions).await?;
        if self.employer_jobs.state() != ViewState::Idle {
            if let Err(e) = self.employer_jobs.load().await {
                warn!(error = %e, "could not refresh employer jobs after posting");
            }
        }
        Ok(message)
    }

    /// Buys `plan_name` for `cycle`, charged in `currency`.
    pub async fn purchase_plan(
        &self,
        plan_name: &str,
        cycle: BillingCycle,
        currency: Currency,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt, PaymentError> {
        let plan = pricing::find_plan(plan_name, cycle)
            .ok_or_else(|| PaymentError::InvalidPlan(plan_name.to_string()))?;
        if plan.annual_only && cycle != BillingCycle::Annual {
            return Err(PaymentError::InvalidPlan(format!("{} is billed annually only", plan.name)));
        }
        let request = PaymentRequest {
            amount: pricing::charge_amount(&plan, currency, self.settings.payment.usd_to_kes_rate),
            currency,
            method,
            plan_name: Some(plan.name),
        };
        self.payments.process_payment(self.sessions.current(), &request).await
    }
}
