pub mod facility;
pub mod patient;

pub use facility::*;
pub use patient::*;
