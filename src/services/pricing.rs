//! Subscription plan catalog and price formatting.

use crate::types::payment::{BillingCycle, Currency, Plan};

/// Percentage off monthly plans billed annually.
pub const ANNUAL_DISCOUNT_PERCENT: f64 = 15.0;

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn plan(name: &str, subtitle: &str, price: f64, period: &str, items: &[&str]) -> Plan {
    Plan {
        name: name.to_string(),
        subtitle: subtitle.to_string(),
        price,
        period: period.to_string(),
        features: features(items),
        popular: false,
        annual_only: false,
    }
}

/// Plans as offered for `cycle`. Enterprise is always billed yearly.
pub fn catalog(cycle: BillingCycle) -> Vec<Plan> {
    let annual = cycle == BillingCycle::Annual;
    let recurring = |monthly: f64| {
        if annual {
            monthly * (100.0 - ANNUAL_DISCOUNT_PERCENT) / 100.0
        } else {
            monthly
        }
    };
    let period = if annual { "/year" } else { "/month" };

    let mut starter = plan(
        "Starter",
        "Most popular",
        recurring(100.0),
        period,
        &["20 Job postings", "5 Featured jobs", "Jobs displayed for 30 days", "Priority support"],
    );
    starter.popular = true;

    let mut enterprise = plan(
        "Enterprise",
        "For large organizations",
        1000.0,
        "/year",
        &[
            "Unlimited job postings",
            "Unlimited featured jobs",
            "Custom listing duration",
            "Dedicated account manager",
            "Custom integration options",
            "Advanced reporting & analytics",
        ],
    );
    enterprise.annual_only = true;

    vec![
        plan(
            "Free Trial",
            "For new employers",
            0.0,
            "",
            &["3 Free job posts", "Basic job listing", "Standard support", "15 days listing duration"],
        ),
        plan(
            "One Off",
            "Single job post",
            15.0,
            "",
            &["1 Job posting", "Standard listing", "Basic support", "30 days listing duration"],
        ),
        starter,
        plan(
            "Pro",
            "For growing teams",
            recurring(150.0),
            period,
            &[
                "Unlimited job postings",
                "15 Featured jobs",
                "Jobs displayed for 45 days",
                "24/7 Premium support",
                "Advanced analytics",
            ],
        ),
        enterprise,
    ]
}

/// Looks a plan up by name, ignoring case.
pub fn find_plan(name: &str, cycle: BillingCycle) -> Option<Plan> {
    catalog(cycle)
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// USD amount in whole Kenyan shillings.
pub fn convert_to_kes(usd: f64, rate: f64) -> f64 {
    (usd * rate).round()
}

/// Amount to charge for `plan` in `currency`.
pub fn charge_amount(plan: &Plan, currency: Currency, rate: f64) -> f64 {
    match currency {
        Currency::Usd => plan.price,
        Currency::Kes => convert_to_kes(plan.price, rate),
    }
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Display price: `$127.50` for dollars, `Ksh 12,900` for shillings.
///
/// `usd` is converted with `rate` when `currency` is KES.
pub fn format_price(usd: f64, currency: Currency, rate: f64) -> String {
    match currency {
        Currency::Usd => {
            let cents = (usd * 100.0).round().max(0.0) as u64;
            format!("${}.{:02}", group_thousands(cents / 100), cents % 100)
        }
        Currency::Kes => {
            let shillings = convert_to_kes(usd, rate).max(0.0) as u64;
            format!("Ksh {}", group_thousands(shillings))
        }
    }
}
