pub mod consolidations;
pub mod dashboard;
pub mod fee;
pub mod orders;
pub mod payments;
pub mod permission;
pub mod products;
pub mod suppliers;
