use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use truedose_core::{Config, Database, ExplanationQuota};

#[derive(Subcommand)]
pub enum SubscriptionAction {
    /// Unlock unlimited explanations
    On,
    /// Return to the daily free limit
    Off,
    /// Show subscription and today's explanation count
    Status,
}

#[derive(Serialize)]
struct QuotaStatus {
    subscribed: bool,
    viewed_today: u32,
    daily_limit: u32,
    remaining_today: Option<u32>,
}

pub fn run(action: SubscriptionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut quota =
        ExplanationQuota::from_state(db.load_quota()?, config.quota.daily_explanation_limit);

    match action {
        SubscriptionAction::On | SubscriptionAction::Off => {
            quota.set_subscribed(matches!(action, SubscriptionAction::On));
            db.save_quota(quota.state())?;
        }
        SubscriptionAction::Status => {}
    }

    let remaining_today = quota.remaining_today(Utc::now());
    let status = QuotaStatus {
        subscribed: quota.is_subscribed(),
        viewed_today: quota.state().explanations_viewed_today,
        daily_limit: quota.daily_limit(),
        remaining_today,
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
