//! Station to webhook routing.

use std::collections::HashMap;

use maintdesk_core::station::Station;

use crate::error::NotifyError;

/// Webhook URL per station.
#[derive(Debug, Clone, Default)]
pub struct StationRoutes {
    webhooks: HashMap<Station, String>,
}

impl StationRoutes {
    pub fn new(webhooks: HashMap<Station, String>) -> Self {
        Self { webhooks }
    }

    /// Resolve a raw station code to its webhook.
    ///
    /// Fails for codes outside the known set and for known stations whose
    /// URL is not configured.
    pub fn resolve(&self, raw: &str) -> Result<(Station, &str), NotifyError> {
        let station: Station = raw
            .parse()
            .map_err(|_| NotifyError::UnknownStation(raw.to_string()))?;
        let url = self
            .webhooks
            .get(&station)
            .filter(|url| !url.is_empty())
            .ok_or(NotifyError::MissingWebhook(station))?;
        Ok((station, url.as_str()))
    }
}

/// Notification settings.
#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    pub routes: StationRoutes,
    /// Link to the report form appended to every message.
    pub add_more_case_url: Option<String>,
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `DINGTALK_WEBHOOK_SSW`   | unset   |
    /// | `DINGTALK_WEBHOOK_TPK`   | unset   |
    /// | `ADD_MORE_CASE_URL`      | unset   |
    ///
    /// A station without a webhook is logged at startup; reports for it fail
    /// at the notification step.
    pub fn from_env() -> Self {
        let mut webhooks = HashMap::new();
        for station in Station::ALL {
            match non_empty_var(&format!("DINGTALK_WEBHOOK_{station}")) {
                Some(url) => {
                    webhooks.insert(station, url);
                }
                None => tracing::warn!(%station, "No DingTalk webhook configured"),
            }
        }
        Self {
            routes: StationRoutes::new(webhooks),
            add_more_case_url: non_empty_var("ADD_MORE_CASE_URL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
