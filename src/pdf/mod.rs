pub mod extract;
pub mod render;

pub use extract::extract_receipt;
pub use render::render_settlement;
