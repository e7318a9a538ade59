//! Report notifications for the station chat channels.
//!
//! - [`routes::StationRoutes`] -- which webhook belongs to which station.
//! - [`message`] -- the markdown message announcing a report.
//! - [`transport::ChatTransport`] -- the seam to the chat service, with
//!   [`dingtalk::DingTalkWebhook`] as the real implementation.
//! - [`NotificationDispatcher`] -- routes, renders and sends.

pub mod dingtalk;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod routes;
pub mod transport;

pub use dingtalk::DingTalkWebhook;
pub use dispatcher::NotificationDispatcher;
pub use error::NotifyError;
pub use message::{ChatMessage, NotificationKind};
pub use routes::{NotifyConfig, StationRoutes};
pub use transport::{ChatTransport, TransportHandle};
