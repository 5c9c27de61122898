pub mod client;
pub mod error;
pub mod types;

pub use client::{OcmConnection, QuotaCostClient, ACCOUNTS_MGMT_PATH};
pub use error::OcmError;
pub use types::{CurrentAccount, QuotaCostItem, QuotaCostPage, RelatedResource};
