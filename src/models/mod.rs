pub mod bill;
pub mod receipt;
pub mod result;

pub use bill::{Bill, Item, ItemClaim, PersonClaim};
pub use receipt::ParsedReceipt;
pub use result::PersonResult;
