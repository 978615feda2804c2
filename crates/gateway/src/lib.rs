pub mod client;
pub mod error;
pub mod record;

use async_trait::async_trait;
use railrefund_core::{PnrNumber, ReservationSnapshot};
use serde_json::Value;

pub use client::RapidApiGateway;
pub use error::GatewayError;
pub use record::{parse_status_payload, PnrRecord, PnrStatusEnvelope};

/// Source of reservation records. The refund core never talks to the network
/// itself; it only sees the normalized snapshot returned by [`lookup`].
///
/// [`lookup`]: PnrGateway::lookup
#[async_trait]
pub trait PnrGateway: Send + Sync {
    /// Upstream body exactly as the provider returned it.
    async fn fetch_raw(&self, pnr: &PnrNumber) -> Result<Value, GatewayError>;

    async fn lookup(&self, pnr: &PnrNumber) -> Result<ReservationSnapshot, GatewayError> {
        let payload = self.fetch_raw(pnr).await?;
        parse_status_payload(payload, pnr)
    }
}
