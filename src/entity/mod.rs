pub mod categories;
pub mod dining_tables;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod roles;
pub mod users;

pub use categories::Entity as Categories;
pub use dining_tables::Entity as DiningTables;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use roles::Entity as Roles;
pub use users::Entity as Users;
