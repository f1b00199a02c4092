pub mod allocator;
pub mod ancillary;

pub use allocator::allocate;
pub use ancillary::extract_sentinels;
