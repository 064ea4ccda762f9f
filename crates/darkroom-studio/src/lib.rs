pub mod directory;
pub mod error;
pub mod memory;
pub mod types;

pub use crate::directory::{SharedDirectory, StudioDirectory};
pub use crate::error::StudioError;
pub use crate::memory::MemoryDirectory;
pub use crate::types::{
    CampaignReceipt, Client, Gallery, Invoice, InvoiceStatus, InvoiceSummary, Voucher,
};
