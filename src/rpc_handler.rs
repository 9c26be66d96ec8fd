//! RPC method handler for the jobboard JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_method` dispatches one call to the views and services of [`App`].

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::managers::bookmark_tracker::BookmarkTrackerTrait;
use crate::managers::collection_view::ListView;
use crate::managers::session_manager::SessionManagerTrait;
use crate::services::auth_service::{AuthServiceTrait, RegisterForm};
use crate::services::employer_service::ProfileDetails;
use crate::services::pricing;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::payment::{BillingCycle, Currency, PaymentMethod, PaymentQuery};
use crate::types::record::RecordId;

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing {}", key))
}

fn id_param(params: &Value, key: &str) -> Result<RecordId, String> {
    params
        .get(key)
        .and_then(RecordId::from_json)
        .ok_or_else(|| format!("missing {}", key))
}

fn typed_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, String> {
    let raw = params.get(key).cloned().ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(raw).map_err(|e| format!("invalid {}: {}", key, e))
}

fn cycle_param(params: &Value) -> Result<BillingCycle, String> {
    match params.get("cycle") {
        None => Ok(BillingCycle::Monthly),
        Some(_) => typed_param(params, "cycle"),
    }
}

fn currency_param(params: &Value) -> Result<Currency, String> {
    match params.get("currency").and_then(Value::as_str) {
        None => Ok(Currency::Usd),
        Some(raw) => Currency::parse(raw).ok_or_else(|| format!("unknown currency {}", raw)),
    }
}

/// Reads `{"name": "value", ...}` as ordered query pairs. Numbers and
/// booleans are sent in their JSON text form.
fn query_params(params: &Value) -> Result<Vec<(String, String)>, String> {
    let Some(map) = params.get("params").and_then(Value::as_object) else {
        return Err("missing params".to_string());
    };
    map.iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            Value::Number(_) | Value::Bool(_) => Ok((k.clone(), v.to_string())),
            _ => Err(format!("invalid params.{}: expected a string", k)),
        })
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatches one JSON-RPC call.
///
/// Returns the result value, or an error message for the response's `error`.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── List views ───
        "view.load" => {
            let name = str_param(params, "view")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.load().await.map_err(|e| e.to_string())?;
            view.window_json().map_err(|e| e.to_string())
        }
        "view.window" => {
            let name = str_param(params, "view")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.window_json().map_err(|e| e.to_string())
        }
        "view.query" => {
            let name = str_param(params, "view")?;
            let query = str_param(params, "query")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.set_query(query);
            view.window_json().map_err(|e| e.to_string())
        }
        "view.params" => {
            let name = str_param(params, "view")?;
            let query = query_params(params)?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.set_params(query).await.map_err(|e| e.to_string())?;
            view.window_json().map_err(|e| e.to_string())
        }
        "view.next" | "view.previous" | "view.page" => {
            let name = str_param(params, "view")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            match method {
                "view.next" => view.next_page(),
                "view.previous" => view.previous_page(),
                _ => {
                    let page = params.get("page").and_then(Value::as_u64).ok_or("missing page")?;
                    view.go_to_page(page as usize);
                }
            }
            view.window_json().map_err(|e| e.to_string())
        }
        "view.update" => {
            let name = str_param(params, "view")?;
            let id = id_param(params, "id")?;
            let patch = params.get("patch").cloned().ok_or("missing patch")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.update_json(id, patch).await.map_err(|e| e.to_string())
        }
        "view.delete" => {
            let name = str_param(params, "view")?;
            let id = id_param(params, "id")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.delete(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "view.create" => {
            let name = str_param(params, "view")?;
            let fields = params.get("fields").cloned().ok_or("missing fields")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            view.create_json(fields).await.map_err(|e| e.to_string())
        }
        "view.notices" => {
            let name = str_param(params, "view")?;
            let mut a = app.lock().await;
            let view = a.view_mut(name).map_err(|e| e.to_string())?;
            to_json(&view.drain_notices())
        }
        "admin.open" => {
            let item_type = str_param(params, "type")?;
            let mut a = app.lock().await;
            a.open_admin_items(item_type).await.map_err(|e| e.to_string())?;
            ListView::window_json(&a.admin).map_err(|e| e.to_string())
        }

        // ─── Bookmarks ───
        "bookmark.toggle" => {
            let key = str_param(params, "key")?;
            let id = id_param(params, "id")?;
            let mut a = app.lock().await;
            let tracker = a.tracker_mut(key).map_err(|e| e.to_string())?;
            let saved = tracker.toggle(&id).map_err(|e| e.to_string())?;
            Ok(json!({"id": id, "saved": saved}))
        }
        "bookmark.list" => {
            let key = str_param(params, "key")?;
            let mut a = app.lock().await;
            let tracker = a.tracker_mut(key).map_err(|e| e.to_string())?;
            to_json(&tracker.ids())
        }
        "jobs.saved" => {
            let a = app.lock().await;
            to_json(&a.saved_job_list())
        }
        "jobs.search" => {
            let query = params.get("query").and_then(Value::as_str).unwrap_or("");
            let location = params.get("location").and_then(Value::as_str).unwrap_or("");
            let mut a = app.lock().await;
            a.search_jobs(query, location).await.map_err(|e| e.to_string())?;
            ListView::window_json(&a.jobs).map_err(|e| e.to_string())
        }
        "jobs.toggle_featured" => {
            let id = id_param(params, "id")?;
            let mut a = app.lock().await;
            let job = a.toggle_featured(id).await.map_err(|e| e.to_string())?;
            to_json(&job)
        }

        // ─── Auth ───
        "auth.login" => {
            let email = str_param(params, "email")?;
            let password = str_param(params, "password")?;
            let mut a = app.lock().await;
            let role = a.login(email, password).await.map_err(|e| e.to_string())?;
            Ok(json!({"role": role}))
        }
        "auth.register" => {
            let form: RegisterForm = serde_json::from_value(params.clone()).map_err(|e| format!("invalid form: {}", e))?;
            let a = app.lock().await;
            let reply = a.auth.register(&form).await.map_err(|e| e.to_string())?;
            Ok(json!({"user": reply.user_data, "message": reply.message}))
        }
        "auth.verify" => {
            let email = str_param(params, "email")?;
            let code = str_param(params, "code")?;
            let a = app.lock().await;
            let message = a.auth.verify_email(email, code).await.map_err(|e| e.to_string())?;
            Ok(json!({"message": message}))
        }
        "auth.logout" => {
            let mut a = app.lock().await;
            a.logout().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.session" => {
            let a = app.lock().await;
            Ok(match a.sessions.current() {
                Some(s) => json!({
                    "authenticated": true,
                    "user_id": s.user_id,
                    "role": s.role,
                    "name": s.name,
                    "email": s.email,
                }),
                None => json!({"authenticated": false}),
            })
        }

        // ─── Blog reader ───
        "blog.open" => {
            let id = id_param(params, "id")?;
            let mut a = app.lock().await;
            let blog = a.blog_reader.open(&id).await.map_err(|e| e.to_string())?;
            to_json(blog)
        }
        "blog.like" => {
            let mut a = app.lock().await;
            let blog = a.blog_reader.like().await.map_err(|e| e.to_string())?;
            to_json(blog)
        }
        "blog.comment" => {
            let text = str_param(params, "text")?;
            let mut a = app.lock().await;
            let blog = a.blog_reader.add_comment(text).await.map_err(|e| e.to_string())?;
            to_json(blog)
        }
        "blog.like_comment" => {
            let id = id_param(params, "id")?;
            let mut a = app.lock().await;
            let blog = a.blog_reader.toggle_comment_like(&id).await.map_err(|e| e.to_string())?;
            to_json(blog)
        }
        "blog.notices" => {
            let mut a = app.lock().await;
            to_json(&a.blog_reader.drain_notices())
        }

        // ─── Post-job wizard ───
        "wizard.get" => {
            let a = app.lock().await;
            Ok(json!({"step": a.wizard.step(), "draft": a.wizard.draft()}))
        }
        "wizard.update" => {
            let fields = params.get("fields").ok_or("missing fields")?;
            let mut a = app.lock().await;
            a.wizard.update(fields).map_err(|e| e.to_string())?;
            Ok(json!({"step": a.wizard.step(), "draft": a.wizard.draft()}))
        }
        "wizard.next" => {
            let mut a = app.lock().await;
            let step = a.wizard.next().map_err(|e| e.to_string())?;
            Ok(json!({"step": step}))
        }
        "wizard.back" => {
            let mut a = app.lock().await;
            Ok(json!({"step": a.wizard.back()}))
        }
        "wizard.submit" => {
            let mut a = app.lock().await;
            let message = a.submit_job().await.map_err(|e| e.to_string())?;
            Ok(json!({"message": message, "step": a.wizard.step()}))
        }

        // ─── Pricing and payments ───
        "pricing.plans" => {
            let cycle = cycle_param(params)?;
            let currency = currency_param(params)?;
            let a = app.lock().await;
            let rate = a.settings.payment.usd_to_kes_rate;
            let plans: Vec<Value> = pricing::catalog(cycle)
                .into_iter()
                .map(|p| {
                    json!({
                        "display_price": pricing::format_price(p.price, currency, rate),
                        "plan": p,
                    })
                })
                .collect();
            Ok(json!(plans))
        }
        "payment.purchase" => {
            let plan = str_param(params, "plan")?;
            let cycle = cycle_param(params)?;
            let currency = currency_param(params)?;
            let method: PaymentMethod = typed_param(params, "method")?;
            let a = app.lock().await;
            let receipt = a
                .purchase_plan(plan, cycle, currency, method)
                .await
                .map_err(|e| e.to_string())?;
            to_json(&receipt)
        }
        "payment.verify_mpesa" => {
            let checkout = str_param(params, "checkout_request_id")?;
            let a = app.lock().await;
            let status = a
                .payments
                .verify_mpesa(a.sessions.current(), checkout)
                .await
                .map_err(|e| e.to_string())?;
            to_json(&status)
        }
        "payment.history" => {
            let query: PaymentQuery = match params.get("filters") {
                Some(_) => typed_param(params, "filters")?,
                None => PaymentQuery::default(),
            };
            let a = app.lock().await;
            let payments = a
                .payments
                .query_payments(a.sessions.current(), &query)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!(payments))
        }

        // ─── Employer profile ───
        "employer.profile" => {
            let mut a = app.lock().await;
            let profile = a.load_employer_profile().await.map_err(|e| e.to_string())?;
            to_json(profile)
        }
        "employer.update" => {
            let details: ProfileDetails = typed_param(params, "details")?;
            let mut a = app.lock().await;
            let profile = a.update_employer_profile(&details).await.map_err(|e| e.to_string())?;
            to_json(profile)
        }

        // ─── Dashboard ───
        "dashboard.summary" => {
            let a = app.lock().await;
            to_json(&a.dashboard_summary())
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().await;
            to_json(&a.settings)
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().await;
            let engine = a.settings_engine.as_mut().ok_or("settings are not backed by a file")?;
            engine.set_value(key, value).map_err(|e| e.to_string())?;
            let stored = to_json(engine.get_settings())?;
            Ok(json!({"ok": true, "settings": stored, "applies": "next start"}))
        }

        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        _ => Err(format!("unknown method: {}", method)),
    }
}
