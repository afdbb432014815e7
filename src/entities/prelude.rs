pub use super::consolidations::Entity as Consolidations;
pub use super::orders::Entity as Orders;
pub use super::payments::Entity as Payments;
pub use super::products::Entity as Products;
pub use super::suppliers::Entity as Suppliers;
