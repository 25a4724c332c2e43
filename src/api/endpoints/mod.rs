pub mod facilities;
pub mod health;
pub mod patients;
pub mod predict;
