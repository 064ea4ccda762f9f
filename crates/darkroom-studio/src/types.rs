//! Domain records exposed by the studio directory.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Issued,
    Paid,
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub client_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
    pub memo: Option<String>,
    pub issued_at: String,
}

/// Aggregate revenue view over all invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub invoice_count: u64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub outstanding_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub code: String,
    pub client_id: Option<String>,
    pub value_cents: i64,
    pub redeemed: bool,
    pub issued_at: String,
    pub redeemed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub photo_count: u64,
    pub published: bool,
    pub published_at: Option<String>,
}

/// Acknowledgement returned when a campaign is handed to the mail queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReceipt {
    pub campaign_id: String,
    pub segment: String,
    pub subject: String,
    pub recipient_count: u64,
    pub enqueued_at: String,
}
