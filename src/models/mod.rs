pub mod utterance;
pub mod variant;

pub use utterance::*;
pub use variant::*;
