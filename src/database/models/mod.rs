pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, OrderStatus, ShippingAddress};
pub use product::Product;
pub use user::{PublicUser, User};
