//! Jobboard console demo.
//!
//! Runs the client core against an in-memory backend: listings, search,
//! bookmarks, employer posting, blog reading, the admin board and payments.

use std::error::Error;
use std::sync::Arc;

use serde_json::{json, Value};

use jobboard::api::{ApiResponse, MemoryTransport, Method};
use jobboard::app::{App, Transports};
use jobboard::managers::bookmark_tracker::BookmarkTrackerTrait;
use jobboard::services::employer_service::ProfileDetails;
use jobboard::services::preference_store::MemoryPreferenceStore;
use jobboard::types::record::RecordId;
use jobboard::types::settings::ClientSettings;

type DemoResult = Result<(), Box<dyn Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("jobboard=warn"))
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Jobboard v{} (demo mode)                  ║", env!("CARGO_PKG_VERSION"));
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let backend = Arc::new(demo_backend());
    let mut app = match App::new(
        ClientSettings::default(),
        Transports::shared(backend.clone()),
        Arc::new(MemoryPreferenceStore::new()),
    ) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("  ✗ failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let steps = [
        ("Job Listings", demo_listings(&mut app).await),
        ("Employer Posting", demo_employer(&mut app, &backend).await),
        ("Blog Reader", demo_blog(&mut app).await),
        ("Admin Board", demo_admin(&mut app).await),
        ("Payments", demo_payments(&mut app).await),
    ];

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    let failed: Vec<_> = steps.iter().filter(|(_, r)| r.is_err()).collect();
    for (name, result) in &failed {
        if let Err(e) = result {
            println!("  ✗ {}: {}", name, e);
        }
    }
    if failed.is_empty() {
        println!("  ✅ All {} components demonstrated successfully!", steps.len());
    }
    println!("═══════════════════════════════════════════════════════════════");
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn demo_backend() -> MemoryTransport {
    let backend = MemoryTransport::new();
    backend.seed(
        "job",
        (1..=12)
            .map(|i| {
                json!({
                    "id": i,
                    "title": if i % 3 == 0 { format!("Rust Engineer {}", i) } else { format!("Accountant {}", i) },
                    "company": if i % 2 == 0 { "Acme" } else { "Globex" },
                    "location": "Nairobi",
                    "employmentType": "Full-time",
                    "featured": i == 1,
                })
            })
            .collect(),
    );
    backend.seed(
        "blogs",
        vec![json!({
            "id": 1,
            "name": "Writing a CV that gets read",
            "author": "Wanjiku",
            "comments": [{"id": 10, "comment_description": "Helpful!", "likes_count": 2}],
            "comments_count": 1,
        })],
    );
    backend.seed("users", vec![json!({"id": "u1", "name": "Ann", "description": "jobseeker"})]);
    backend.seed("employers", vec![json!({"id": "e1", "name": "Acme", "description": "employer"})]);
    backend.seed("jobs", vec![json!({"id": 100, "name": "Rust Engineer", "location": "Remote"})]);

    backend.route(Method::Post, "login", |req| {
        let email = req
            .body
            .as_ref()
            .and_then(|b| b.get("email"))
            .and_then(|e| e.as_str())
            .unwrap_or_default()
            .to_string();
        let role = if email.starts_with("admin") { "ADMIN" } else { "EMPLOYER" };
        ApiResponse::ok(json!({
            "userData": {"id": "42", "name": "Demo", "email": email, "role": role},
            "accessToken": "demo-token",
        }))
    });
    backend.route(Method::Get, "job/getJobByUserId", |_| {
        ApiResponse::ok(json!({"jobs": [{"id": 100, "name": "Rust Engineer", "location": "Remote"}]}))
    });
    backend.route(Method::Get, "job/search", |req| {
        let query = req
            .query
            .iter()
            .find(|(k, _)| k == "query")
            .map(|(_, v)| v.to_lowercase())
            .unwrap_or_default();
        let hits = if "rust engineer".contains(&query) {
            vec![json!({"id": 3, "title": "Rust Engineer 3", "company": "Globex", "location": "Nairobi"})]
        } else {
            Vec::new()
        };
        ApiResponse::ok(Value::Array(hits))
    });
    backend.route(Method::Get, "employer/profile", |_| {
        ApiResponse::ok(json!({
            "id": "42",
            "name": "Demo",
            "email": "employer@acme.test",
            "subscriptionPlan": "basic",
            "jobPostQuota": 5,
            "subscriptionEndDate": "2026-12-31",
            "companyName": "Acme",
        }))
    });
    backend.route(Method::Put, "employer/update-details", |_| {
        ApiResponse::ok(json!({"message": "Profile updated"}))
    });
    backend.route(Method::Post, "job/postJob", |_| {
        ApiResponse::new(201, Some(json!({"message": "Your job has been posted successfully."})))
    });
    backend
}

async fn demo_listings(app: &mut App) -> DemoResult {
    section("Job Listings");
    app.jobs.load().await?;
    let window = app.jobs.window();
    println!("  Loaded {} jobs, {} pages of {}", window.total_count, window.total_pages, window.page_size);

    app.jobs.set_query("rust");
    let hits: Vec<_> = app.jobs.window().items.iter().map(|j| j.title.clone()).collect();
    println!("  Search 'rust' → {}", hits.join(", "));

    app.jobs.set_query("");
    app.jobs.next_page();
    println!("  Page {} of {}", app.jobs.page(), app.jobs.total_pages());

    app.search_jobs("rust", "Nairobi").await?;
    println!("  Server search 'rust' in Nairobi → {} job(s)", app.jobs.collection().len());
    app.search_jobs("", "").await?;

    let saved = app.saved_jobs.toggle(&RecordId::Int(3))?;
    println!("  Saved job 3: {} ({} saved)", saved, app.saved_jobs.len());

    let featured = app.toggle_featured(RecordId::Int(1)).await?;
    println!("  Job 1 featured: {:?}", featured.map(|j| j.featured));
    println!("  ✓ Listings OK");
    println!();
    Ok(())
}

async fn demo_employer(app: &mut App, backend: &MemoryTransport) -> DemoResult {
    section("Employer Posting");
    let role = app.login("employer@acme.test", "secret1").await?;
    println!("  Signed in as {}", role);

    let mut details = app
        .sessions
        .employer_profile()
        .map(ProfileDetails::from_profile)
        .ok_or("employer profile not loaded")?;
    details.company_location = "Westlands, Nairobi".to_string();
    let location = app.update_employer_profile(&details).await?.company_location.clone();
    println!("  Company location: {:?}", location);

    app.employer_jobs.load().await?;
    let summary = app.dashboard_summary();
    println!(
        "  Employer has {} job(s) on plan {:?}, {:?} posts left",
        summary.active_jobs, summary.plan, summary.remaining_quota
    );

    app.wizard.update(&json!({
        "title": "Platform Engineer",
        "company": "Acme",
        "description": "Own the deploy pipeline",
        "location": "Nairobi",
        "employmentType": "Full-time",
        "category": "Engineering",
        "salaryRange": {"min": "150,000", "max": "250,000"},
    }))?;
    app.wizard.next()?;
    app.wizard.update(&json!({"applicationInstructions": "Email your CV"}))?;
    app.wizard.next()?;
    let message = app.submit_job().await?;
    println!("  {}", message);
    println!("  Wizard back at step {}", app.wizard.step());

    let posted = backend.requests().iter().filter(|r| r.path == "job/postJob").count();
    println!("  POST job/postJob sent {} time(s)", posted);
    println!("  ✓ Employer flow OK");
    println!();
    Ok(())
}

async fn demo_blog(app: &mut App) -> DemoResult {
    section("Blog Reader");
    app.blogs.load().await?;
    let id = app
        .blogs
        .collection()
        .first()
        .map(|b| b.id.clone())
        .ok_or("no blog posts")?;
    let title = app.blog_reader.open(&id).await?.name.clone();
    println!("  Opened \"{}\"", title);

    let likes = app.blog_reader.like().await?.likes_count;
    println!("  Likes: {}", likes);

    let comments = app.blog_reader.add_comment("Thanks for this").await?.comments_count;
    println!("  Comments: {}", comments);

    let comment = RecordId::Int(10);
    let liked = app.blog_reader.toggle_comment_like(&comment).await?;
    let count = liked.comments.iter().find(|c| c.id == comment).map(|c| c.likes_count);
    println!("  Comment 10 likes: {:?}", count);
    println!("  ✓ Blog reader OK");
    println!();
    Ok(())
}

async fn demo_admin(app: &mut App) -> DemoResult {
    section("Admin Board");
    app.logout()?;
    app.login("admin@jobboard.test", "secret1").await?;
    app.open_admin_items("users").await?;
    println!("  users: {}", app.admin.collection().len());
    app.open_admin_items("employers").await?;
    let names: Vec<_> = app.admin.collection().iter().map(|i| i.name.clone()).collect();
    println!("  employers: {}", names.join(", "));
    app.admin.delete("e1".into()).await?;
    for notice in app.admin.drain_notices() {
        println!("  [{:?}] {}", notice.level, notice.message);
    }
    println!("  ✓ Admin OK");
    println!();
    Ok(())
}

async fn demo_payments(app: &mut App) -> DemoResult {
    use jobboard::services::pricing;
    use jobboard::types::payment::{BillingCycle, Currency, PaymentMethod};

    section("Payments");
    for plan in pricing::catalog(BillingCycle::Monthly) {
        let price = pricing::format_price(plan.price, Currency::Kes, app.settings.payment.usd_to_kes_rate);
        println!("  {:<12} {}{}", plan.name, price, plan.period);
    }
    let receipt = app
        .purchase_plan(
            "Starter",
            BillingCycle::Monthly,
            Currency::Kes,
            PaymentMethod::Mpesa {
                phone_number: "0712 345 678".to_string(),
            },
        )
        .await?;
    println!("  M-Pesa: {} (pending: {})", receipt.message, receipt.pending);
    println!("  ✓ Payments OK");
    println!();
    Ok(())
}
