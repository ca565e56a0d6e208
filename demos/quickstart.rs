//! Authenticates with the partner credentials from the environment (or a `.env` file), lists a
//! few funds, and verifies a locally signed webhook.
//!
//! Requires `COWC_CLIENT_ID`, `COWC_CLIENT_SECRET`, and `COWC_API_KEY`; `COWC_BASE_URL` defaults
//! to the staging environment.

// crates.io
use color_eyre::Result;
use time::OffsetDateTime;
// self
use cowc_client::{
	CowcClient, WebhookVerifier,
	api::{FundCategory, FundFilter},
	webhook,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();

	let client = CowcClient::from_env()?;

	client.authenticate_default().await?;

	let funds =
		client.list_funds(&FundFilter::default().category(FundCategory::Equity).limit(5)).await?;

	for fund in &funds.funds {
		println!(
			"{} {} nav={}",
			fund.fund_id,
			fund.fund_name.as_deref().unwrap_or("-"),
			fund.current_nav.map(|nav| nav.to_string()).unwrap_or_else(|| "-".into()),
		);
	}

	let verifier = WebhookVerifier::new("test_webhook_secret");
	let payload = br#"{"event_id":"evt_demo","event_type":"order.settled","data":{"order_id":"ord_demo"}}"#;
	let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
	let signature = verifier.sign(&timestamp, payload)?;
	let event = verifier.verify_and_parse(payload, &signature, &timestamp)?;

	println!("Verified {} ({}).", event.event_id, event.event_type);
	println!(
		"Free-function check: {}.",
		cowc_client::verify_webhook(
			payload,
			&signature,
			&timestamp,
			"test_webhook_secret",
			webhook::DEFAULT_MAX_AGE,
		)
	);

	Ok(())
}
