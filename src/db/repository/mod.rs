//! Repository layer — entity-scoped database operations.
//!
//! Functions take a `&Connection` so callers can run them inside a
//! `Transaction` (which derefs to `Connection`) when several must commit
//! together.

mod facility;
mod patient;

pub use facility::*;
pub use patient::*;
