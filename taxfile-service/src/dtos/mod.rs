//! Request and response bodies for the HTTP surface. Field names follow the
//! service's published camelCase contract.

mod refund_events;
mod refunds;
mod tax_files;
mod users;

pub use refund_events::{EventData, ProcessRefundEventRequest};
pub use refunds::{RefundQueryParams, RefundResponse};
pub use tax_files::{
    CreateTaxFileRequest, GetTaxFileParams, TaxFileResponse, TaxFileSummary, TaxUserParams,
    TaxUserResponse,
};
pub use users::{AllUsersResponse, CreateUserRequest, UserResponse};
