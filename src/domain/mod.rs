pub mod battery;
pub mod market;
pub mod performance;
pub mod types;
pub mod weather;

pub use battery::*;
pub use market::*;
pub use performance::*;
pub use types::*;
pub use weather::*;
