use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StudioError;
use crate::types::{CampaignReceipt, Client, Gallery, Invoice, InvoiceSummary, Voucher};

/// Narrow query interface to the studio's relational store.
///
/// The agent core never touches CRM tables directly; everything it needs
/// goes through this seam so the backing store can be swapped without
/// touching tool handlers.
#[async_trait]
pub trait StudioDirectory: Send + Sync {
    async fn search_clients(&self, query: &str) -> Result<Vec<Client>, StudioError>;

    async fn client(&self, client_id: &str) -> Result<Option<Client>, StudioError>;

    async fn update_client_contact(
        &self,
        client_id: &str,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<Client, StudioError>;

    async fn invoice_summary(&self) -> Result<InvoiceSummary, StudioError>;

    async fn issue_invoice(
        &self,
        client_id: &str,
        amount_cents: i64,
        memo: Option<String>,
    ) -> Result<Invoice, StudioError>;

    async fn issue_voucher(
        &self,
        client_id: Option<String>,
        value_cents: i64,
    ) -> Result<Voucher, StudioError>;

    async fn redeem_voucher(&self, code: &str) -> Result<Voucher, StudioError>;

    async fn publish_gallery(&self, gallery_id: &str) -> Result<Gallery, StudioError>;

    async fn enqueue_campaign(
        &self,
        segment: &str,
        subject: &str,
    ) -> Result<CampaignReceipt, StudioError>;
}

pub type SharedDirectory = Arc<dyn StudioDirectory>;
