pub mod bounded;

pub use bounded::BoundedBuffer;
