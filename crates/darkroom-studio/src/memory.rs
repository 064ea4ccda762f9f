//! In-memory directory used by tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::StudioDirectory;
use crate::error::StudioError;
use crate::types::{CampaignReceipt, Client, Gallery, Invoice, InvoiceStatus, InvoiceSummary, Voucher};

#[derive(Default)]
struct DirectoryState {
    clients: HashMap<String, Client>,
    invoices: HashMap<String, Invoice>,
    vouchers: HashMap<String, Voucher>,
    galleries: HashMap<String, Gallery>,
    campaigns: Vec<CampaignReceipt>,
}

#[derive(Default)]
pub struct MemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_client(&self, name: &str, email: &str) -> Client {
        let client = Client {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            created_at: now_rfc3339(),
        };
        let mut state = self.state.write().await;
        state.clients.insert(client.id.clone(), client.clone());
        client
    }

    pub async fn add_gallery(&self, client_id: &str, title: &str, photo_count: u64) -> Gallery {
        let gallery = Gallery {
            id: Uuid::now_v7().to_string(),
            client_id: client_id.to_string(),
            title: title.to_string(),
            photo_count,
            published: false,
            published_at: None,
        };
        let mut state = self.state.write().await;
        state.galleries.insert(gallery.id.clone(), gallery.clone());
        gallery
    }

    pub async fn mark_invoice_paid(&self, invoice_id: &str) -> Result<Invoice, StudioError> {
        let mut state = self.state.write().await;
        let invoice = state
            .invoices
            .get_mut(invoice_id)
            .ok_or_else(|| StudioError::NotFound(format!("invoice {invoice_id}")))?;
        invoice.status = InvoiceStatus::Paid;
        Ok(invoice.clone())
    }

    pub async fn invoice_count(&self) -> usize {
        self.state.read().await.invoices.len()
    }

    pub async fn campaign_count(&self) -> usize {
        self.state.read().await.campaigns.len()
    }

    pub async fn gallery(&self, gallery_id: &str) -> Option<Gallery> {
        self.state.read().await.galleries.get(gallery_id).cloned()
    }

    pub async fn voucher(&self, code: &str) -> Option<Voucher> {
        self.state.read().await.vouchers.get(code).cloned()
    }
}

#[async_trait]
impl StudioDirectory for MemoryDirectory {
    async fn search_clients(&self, query: &str) -> Result<Vec<Client>, StudioError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut matches: Vec<Client> = state
            .clients
            .values()
            .filter(|client| {
                client.name.to_lowercase().contains(&needle)
                    || client.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }

    async fn client(&self, client_id: &str) -> Result<Option<Client>, StudioError> {
        Ok(self.state.read().await.clients.get(client_id).cloned())
    }

    async fn update_client_contact(
        &self,
        client_id: &str,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<Client, StudioError> {
        let mut state = self.state.write().await;
        let client = state
            .clients
            .get_mut(client_id)
            .ok_or_else(|| StudioError::NotFound(format!("client {client_id}")))?;
        if let Some(email) = email {
            client.email = email;
        }
        if let Some(phone) = phone {
            client.phone = Some(phone);
        }
        Ok(client.clone())
    }

    async fn invoice_summary(&self) -> Result<InvoiceSummary, StudioError> {
        let state = self.state.read().await;
        let mut summary = InvoiceSummary {
            invoice_count: 0,
            total_cents: 0,
            paid_cents: 0,
            outstanding_cents: 0,
        };
        for invoice in state.invoices.values() {
            if invoice.status == InvoiceStatus::Void {
                continue;
            }
            summary.invoice_count += 1;
            summary.total_cents += invoice.amount_cents;
            match invoice.status {
                InvoiceStatus::Paid => summary.paid_cents += invoice.amount_cents,
                InvoiceStatus::Issued => summary.outstanding_cents += invoice.amount_cents,
                InvoiceStatus::Void => {}
            }
        }
        Ok(summary)
    }

    async fn issue_invoice(
        &self,
        client_id: &str,
        amount_cents: i64,
        memo: Option<String>,
    ) -> Result<Invoice, StudioError> {
        let mut state = self.state.write().await;
        if !state.clients.contains_key(client_id) {
            return Err(StudioError::NotFound(format!("client {client_id}")));
        }
        let invoice = Invoice {
            id: Uuid::now_v7().to_string(),
            client_id: client_id.to_string(),
            amount_cents,
            status: InvoiceStatus::Issued,
            memo,
            issued_at: now_rfc3339(),
        };
        state.invoices.insert(invoice.id.clone(), invoice.clone());
        Ok(invoice)
    }

    async fn issue_voucher(
        &self,
        client_id: Option<String>,
        value_cents: i64,
    ) -> Result<Voucher, StudioError> {
        let mut state = self.state.write().await;
        if let Some(ref client_id) = client_id {
            if !state.clients.contains_key(client_id) {
                return Err(StudioError::NotFound(format!("client {client_id}")));
            }
        }
        let voucher = Voucher {
            code: voucher_code(),
            client_id,
            value_cents,
            redeemed: false,
            issued_at: now_rfc3339(),
            redeemed_at: None,
        };
        state.vouchers.insert(voucher.code.clone(), voucher.clone());
        Ok(voucher)
    }

    async fn redeem_voucher(&self, code: &str) -> Result<Voucher, StudioError> {
        let mut state = self.state.write().await;
        let voucher = state
            .vouchers
            .get_mut(code)
            .ok_or_else(|| StudioError::NotFound(format!("voucher {code}")))?;
        if voucher.redeemed {
            return Err(StudioError::Conflict(format!("voucher {code} already redeemed")));
        }
        voucher.redeemed = true;
        voucher.redeemed_at = Some(now_rfc3339());
        Ok(voucher.clone())
    }

    async fn publish_gallery(&self, gallery_id: &str) -> Result<Gallery, StudioError> {
        let mut state = self.state.write().await;
        let gallery = state
            .galleries
            .get_mut(gallery_id)
            .ok_or_else(|| StudioError::NotFound(format!("gallery {gallery_id}")))?;
        if gallery.published {
            return Err(StudioError::Conflict(format!(
                "gallery {gallery_id} already published"
            )));
        }
        gallery.published = true;
        gallery.published_at = Some(now_rfc3339());
        Ok(gallery.clone())
    }

    async fn enqueue_campaign(
        &self,
        segment: &str,
        subject: &str,
    ) -> Result<CampaignReceipt, StudioError> {
        let mut state = self.state.write().await;
        let receipt = CampaignReceipt {
            campaign_id: Uuid::now_v7().to_string(),
            segment: segment.to_string(),
            subject: subject.to_string(),
            recipient_count: state.clients.len() as u64,
            enqueued_at: now_rfc3339(),
        };
        state.campaigns.push(receipt.clone());
        Ok(receipt)
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn voucher_code() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("DR-{}", raw[..8].to_uppercase())
}
