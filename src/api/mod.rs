pub mod extract;
pub mod requests;
pub mod validate;

pub use extract::JsonBody;
pub use requests::{
    CreateOrderRequest, CreateProductRequest, LoginRequest, RegisterRequest, UpdateProductRequest,
};
pub use validate::{ValidationError, Validator};
