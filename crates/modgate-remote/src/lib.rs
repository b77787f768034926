pub mod panel;
pub mod webhook;

pub use panel::{PanelClient, PanelSettings};
pub use webhook::WebhookSink;
