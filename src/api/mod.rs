pub mod handlers;

pub use handlers::{health_check, split, split_pdf, upload_parse};
