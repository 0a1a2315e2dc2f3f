pub mod detect;
pub mod output;
pub mod select;

pub use detect::*;
pub use output::*;
pub use select::*;
