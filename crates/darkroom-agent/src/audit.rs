pub mod log;
pub mod record;

pub use log::{AuditLog, AuditQuery};
pub use record::AuditRecord;
