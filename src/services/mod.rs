pub mod access_policy;
pub mod consolidation;
pub mod fee_calculator;
pub mod repository;
pub mod scope;
