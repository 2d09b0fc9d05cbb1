use async_trait::async_trait;
use clap::Args;
use loan_intake::config::AdmissionConfig;
use loan_intake::error::AppError;
use loan_intake::loans::{
    AdmissionController, CountryCode, CountryLookup, InMemoryLoanStore, LoanRequest,
    LoanResponse, LookupError, OriginAddress,
};
use std::sync::Arc;
use std::time::Duration;

const DEMO_BLACKLISTED_ID: &str = "BL-0001";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Per-country ceiling inside the rate window
    #[arg(long, default_value_t = 2)]
    pub(crate) count_limit: u64,
    /// Rate window length in milliseconds
    #[arg(long, default_value_t = 60_000)]
    pub(crate) window_ms: u64,
    /// Country used when the lookup cannot place an address
    #[arg(long, default_value = "lv")]
    pub(crate) default_country: String,
}

/// Offline lookup resolving a few Baltic prefixes; anything else is unknown.
pub(crate) struct DemoLookup;

#[async_trait]
impl CountryLookup for DemoLookup {
    async fn lookup_country(&self, address: &str) -> Result<String, LookupError> {
        let code = if address.starts_with("85.254.") {
            "LV"
        } else if address.starts_with("90.190.") {
            "EE"
        } else if address.starts_with("78.56.") {
            "LT"
        } else {
            return Err(LookupError::Rejected(format!("no demo entry for {address}")));
        };
        Ok(code.to_string())
    }
}

fn demo_request(personal_id: &str, first_name: &str, last_name: &str) -> LoanRequest {
    LoanRequest {
        amount: 1200.0,
        term: 12,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        personal_id: personal_id.to_string(),
    }
}

fn render(label: &str, response: &LoanResponse) {
    println!("- {label}");
    match serde_json::to_string(response) {
        Ok(json) => println!("  {json}"),
        Err(err) => println!("  envelope unavailable: {err}"),
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        count_limit,
        window_ms,
        default_country,
    } = args;

    let default_country = CountryCode::parse(&default_country)
        .ok_or(loan_intake::config::ConfigError::BlankDefaultCountry)?;
    let config = AdmissionConfig {
        window_ms,
        count_limit,
        default_country,
        blacklist_path: None,
    };

    let store = InMemoryLoanStore::with_blacklist([DEMO_BLACKLISTED_ID]);
    let controller = AdmissionController::new(
        Arc::new(store.clone()),
        Arc::new(DemoLookup),
        &config,
        Duration::from_millis(250),
    );

    println!(
        "Loan admission demo (window {} ms, limit {} per country, fallback '{}')",
        config.window_ms, config.count_limit, config.default_country
    );

    let estonia = OriginAddress::from_parts(Some("90.190.12.4"), Some("10.0.0.2"));
    let response = controller
        .respond_to_application(demo_request("EE-1001", "Kadri", "Tamm"), &estonia)
        .await;
    render("clean applicant via X-Forwarded-For (EE)", &response);

    let latvia = OriginAddress::direct("85.254.3.9");
    let response = controller
        .respond_to_application(demo_request(DEMO_BLACKLISTED_ID, "Peteris", "Ozols"), &latvia)
        .await;
    render("blacklisted applicant (attempt still counted)", &response);

    let unknown = OriginAddress::direct("203.0.113.50");
    for index in 1..=count_limit.saturating_add(1) {
        let response = controller
            .respond_to_application(
                demo_request(&format!("LV-{index:04}"), "Anna", "Liepa"),
                &unknown,
            )
            .await;
        render(
            &format!("unresolvable address, application #{index} (fallback country)"),
            &response,
        );
    }

    let response = controller
        .respond_to_application(demo_request("LT-1", "Rasa", "Jonaite"), &OriginAddress::unknown())
        .await;
    render("request without any origin address", &response);

    render("all admitted loans", &controller.respond_with_all());
    render("loans for last name 'Liepa'", &controller.respond_with_last_name("Liepa"));

    Ok(())
}
