//! Domain models for taxfile-service.

mod refund;
mod refund_event;
mod tax_file;
mod user;

pub use refund::{ErrorDetail, RefundStatus, RefundWithFile};
pub use refund_event::{NewRefundEvent, RefundEventType};
pub use tax_file::{CreateTaxFile, TaxFileWithRefund, TaxStatus};
pub use user::{CreateUser, User};
