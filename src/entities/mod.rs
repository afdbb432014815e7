pub mod prelude;

pub mod consolidations;
pub mod orders;
pub mod payments;
pub mod products;
pub mod suppliers;
