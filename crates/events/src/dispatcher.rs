//! Routes a report to its station channel and posts the announcement.

use maintdesk_core::report::ReportFields;
use maintdesk_core::station::Station;

use crate::error::NotifyError;
use crate::message::{render_markdown, NotificationKind};
use crate::routes::NotifyConfig;
use crate::transport::TransportHandle;

pub struct NotificationDispatcher {
    config: NotifyConfig,
    transport: TransportHandle,
}

impl NotificationDispatcher {
    pub fn new(config: NotifyConfig, transport: TransportHandle) -> Self {
        Self { config, transport }
    }

    /// Announce a report in the channel of its station.
    ///
    /// The station is resolved before anything is rendered or sent, so an
    /// unknown or unconfigured station fails without any request going out.
    pub async fn dispatch(
        &self,
        kind: NotificationKind,
        fields: &ReportFields,
        image_urls: &[String],
    ) -> Result<Station, NotifyError> {
        let (station, webhook_url) = self.config.routes.resolve(&fields.station)?;

        let message = render_markdown(
            kind,
            fields,
            image_urls,
            self.config.add_more_case_url.as_deref(),
        );
        self.transport.send(webhook_url, &message).await?;

        tracing::info!(%station, title = %message.title, images = image_urls.len(), "Notification sent");
        Ok(station)
    }
}
