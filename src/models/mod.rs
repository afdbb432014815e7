pub mod common;
pub mod consolidation;
pub mod dashboard;
pub mod fee;
pub mod lifecycle;
pub mod order;
pub mod payment;
pub mod permission;
pub mod product;
pub mod supplier;
