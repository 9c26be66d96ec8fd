use serde::{Deserialize, Serialize};

/// Top-level client settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientSettings {
    pub api: ApiSettings,
    pub views: ViewSettings,
    pub payment: PaymentSettings,
    pub storage: StorageSettings,
}

/// Backend endpoints.
///
/// The application talks to several services; each falls back to
/// `base_url` when it has no override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub jobs_url: Option<String>,
    pub blogs_url: Option<String>,
    pub admin_url: Option<String>,
    pub auth_url: Option<String>,
    pub payments_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            jobs_url: None,
            blogs_url: None,
            admin_url: None,
            auth_url: None,
            payments_url: None,
            timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    pub fn jobs(&self) -> &str {
        self.jobs_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn blogs(&self) -> &str {
        self.blogs_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn admin(&self) -> &str {
        self.admin_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn auth(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn payments(&self) -> &str {
        self.payments_url.as_deref().unwrap_or(&self.base_url)
    }
}

/// Page sizes of the list views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewSettings {
    pub jobs_page_size: usize,
    pub blogs_page_size: usize,
    pub employer_jobs_page_size: usize,
    pub admin_page_size: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            jobs_page_size: 10,
            blogs_page_size: 5,
            employer_jobs_page_size: 5,
            admin_page_size: 10,
        }
    }
}

/// Whether payments hit the real provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Mock,
    Live,
}

/// Payment settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSettings {
    pub mode: PaymentMode,
    /// Kenyan shillings per US dollar, used for KES pricing and M-Pesa amounts.
    pub usd_to_kes_rate: f64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            mode: PaymentMode::Mock,
            usd_to_kes_rate: 129.0,
        }
    }
}

/// Local storage locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StorageSettings {
    /// Path of the preference database; `None` means the platform data dir.
    pub preferences_db: Option<String>,
}
