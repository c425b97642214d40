//! Typed request bodies. Each is deserialized at the HTTP boundary and
//! validated before any domain logic runs.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::database::models::{Order, OrderItem, ShippingAddress};

use super::extract::shape_error_message;
use super::validate::{
    length_between, validate_email_format, validate_http_url, validate_password_strength,
    validate_positive_amount, ValidationError, Validator, NAME_MAX_LENGTH, NAME_MIN_LENGTH,
};

pub const PRODUCT_NAME_MAX_LENGTH: usize = 200;
pub const PRODUCT_DESCRIPTION_MAX_LENGTH: usize = 2000;
pub const CATEGORY_MAX_LENGTH: usize = 100;
pub const ORDER_MAX_ITEMS: usize = 100;

/// Fields a product update may never name.
const PRODUCT_IMMUTABLE_FIELDS: &[&str] = &["id", "type", "createdAt", "updatedAt"];

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    /// Trimmed and lowercased copy; validation runs on this form.
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
            name: self.name.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.rule("email", validate_email_format(&self.email))
            .rule("password", validate_password_strength(&self.password))
            .rule("name", length_between(&self.name, NAME_MIN_LENGTH, NAME_MAX_LENGTH));
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.rule("email", validate_email_format(&normalize_email(&self.email)))
            .check(!self.password.is_empty(), "password", "must not be empty");
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.rule("name", length_between(self.name.trim(), 1, PRODUCT_NAME_MAX_LENGTH))
            .rule("price", validate_positive_amount(self.price))
            .rule("category", length_between(self.category.trim(), 1, CATEGORY_MAX_LENGTH))
            .check(self.stock >= 0, "stock", "must be greater than or equal to 0");
        if let Some(description) = &self.description {
            v.rule("description", length_between(description, 0, PRODUCT_DESCRIPTION_MAX_LENGTH));
        }
        if let Some(image_url) = &self.image_url {
            v.rule("imageUrl", validate_http_url(image_url));
        }
        v.finish()
    }
}

/// Partial product update: every field optional, same rules when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
}

impl UpdateProductRequest {
    /// Parse a raw body, naming any immutable field before serde sees it.
    pub fn from_value(body: Value) -> Result<Self, ValidationError> {
        let fields = match &body {
            Value::Object(fields) => fields,
            _ => return Err(ValidationError::field("body", "must be a JSON object")),
        };

        let mut v = Validator::new();
        for field in PRODUCT_IMMUTABLE_FIELDS {
            v.check(!fields.contains_key(*field), *field, "cannot be updated");
        }
        v.finish()?;

        serde_json::from_value(body).map_err(|e| ValidationError::field("body", shape_error_message(&e)))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.rule("name", length_between(name.trim(), 1, PRODUCT_NAME_MAX_LENGTH));
        }
        if let Some(description) = &self.description {
            v.rule("description", length_between(description, 0, PRODUCT_DESCRIPTION_MAX_LENGTH));
        }
        if let Some(price) = self.price {
            v.rule("price", validate_positive_amount(price));
        }
        if let Some(category) = &self.category {
            v.rule("category", length_between(category.trim(), 1, CATEGORY_MAX_LENGTH));
        }
        if let Some(stock) = self.stock {
            v.check(stock >= 0, "stock", "must be greater than or equal to 0");
        }
        if let Some(image_url) = &self.image_url {
            v.rule("imageUrl", validate_http_url(image_url));
        }
        v.finish()?;

        if self.is_empty() {
            return Err(ValidationError::field("body", "must contain at least one field"));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
    }

    /// The present fields, keyed by their stored attribute names.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = self.name {
            fields.insert("name".to_string(), Value::from(name.trim()));
        }
        if let Some(description) = self.description {
            fields.insert("description".to_string(), Value::from(description));
        }
        if let Some(price) = self.price {
            fields.insert("price".to_string(), Value::from(price));
        }
        if let Some(category) = self.category {
            fields.insert("category".to_string(), Value::from(category.trim()));
        }
        if let Some(stock) = self.stock {
            fields.insert("stock".to_string(), Value::from(stock));
        }
        if let Some(image_url) = self.image_url {
            fields.insert("imageUrl".to_string(), Value::from(image_url));
        }
        fields
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.check(!self.items.is_empty(), "items", "must contain at least 1 item")
            .check(
                self.items.len() <= ORDER_MAX_ITEMS,
                "items",
                format!("must contain at most {} items", ORDER_MAX_ITEMS),
            );

        for (index, item) in self.items.iter().enumerate() {
            v.check(
                !item.product_id.trim().is_empty(),
                format!("items[{}].productId", index),
                "must not be empty",
            )
            .check(
                item.quantity >= 1,
                format!("items[{}].quantity", index),
                "must be greater than or equal to 1",
            )
            .rule(format!("items[{}].price", index), validate_positive_amount(item.price))
            .check(
                item.line_total().is_finite(),
                format!("items[{}].price", index),
                "line total is too large",
            );
        }
        v.check(
            Order::total_of(&self.items).is_finite(),
            "items",
            "order total is too large",
        );

        let address = &self.shipping_address;
        for (field, value) in [
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("zipCode", &address.zip_code),
            ("country", &address.country),
        ] {
            v.check(
                !value.trim().is_empty(),
                format!("shippingAddress.{}", field),
                "must not be empty",
            );
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_normalizes_then_validates() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "  Ann@X.com ",
            "password": "Abc12345!",
            "name": " Ann "
        }))
        .unwrap();
        let req = req.normalized();
        assert_eq!(req.email, "ann@x.com");
        assert_eq!(req.name, "Ann");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn register_reports_each_bad_field() {
        let req = RegisterRequest {
            email: "nope".to_string(),
            password: "short".to_string(),
            name: "A".to_string(),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.field_errors.len(), 3);
        assert!(err.message.starts_with("email:"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<CreateProductRequest, _> = serde_json::from_value(json!({
            "name": "Pen", "price": 1.5, "category": "office", "stock": 10, "id": "x"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn product_rules() {
        let mut req: CreateProductRequest = serde_json::from_value(json!({
            "name": "Pen", "price": 1.5, "category": "office", "stock": 10
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        req.price = 0.0;
        req.stock = -1;
        req.image_url = Some("javascript:alert(1)".to_string());
        let err = req.validate().unwrap_err();
        assert!(err.field_errors.contains_key("price"));
        assert!(err.field_errors.contains_key("stock"));
        assert!(err.field_errors.contains_key("imageUrl"));
    }

    #[test]
    fn fractional_stock_does_not_deserialize() {
        let result: Result<CreateProductRequest, _> = serde_json::from_value(json!({
            "name": "Pen", "price": 1.5, "category": "office", "stock": 1.5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn update_rejects_key_and_timestamp_fields_by_name() {
        let err = UpdateProductRequest::from_value(json!({"id": "other", "stock": 1})).unwrap_err();
        assert_eq!(err.field_errors["id"], "cannot be updated");

        let err = UpdateProductRequest::from_value(json!({"type": "order"})).unwrap_err();
        assert!(err.field_errors.contains_key("type"));

        let err = UpdateProductRequest::from_value(json!({"updatedAt": "2020-01-01T00:00:00Z"})).unwrap_err();
        assert!(err.field_errors.contains_key("updatedAt"));
    }

    #[test]
    fn update_type_errors_do_not_repeat_the_value() {
        let err = UpdateProductRequest::from_value(json!({"name": 424242})).unwrap_err();
        assert!(!err.field_errors["body"].contains("424242"));
    }

    #[test]
    fn update_requires_a_field_and_keeps_only_present_ones() {
        let empty = UpdateProductRequest::from_value(json!({})).unwrap();
        assert!(empty.validate().is_err());

        let req = UpdateProductRequest::from_value(json!({"stock": 5})).unwrap();
        assert!(req.validate().is_ok());
        let fields = req.into_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["stock"], 5);
    }

    #[test]
    fn order_rules_point_at_offending_paths() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "items": [
                {"productId": "p1", "quantity": 2, "price": 1.5},
                {"productId": "", "quantity": 0, "price": -1}
            ],
            "shippingAddress": {
                "street": "1 Main St", "city": "Springfield", "state": "IL",
                "zipCode": " ", "country": "US"
            }
        }))
        .unwrap();

        let err = req.validate().unwrap_err();
        assert!(err.field_errors.contains_key("items[1].productId"));
        assert!(err.field_errors.contains_key("items[1].quantity"));
        assert!(err.field_errors.contains_key("items[1].price"));
        assert!(err.field_errors.contains_key("shippingAddress.zipCode"));
        assert!(!err.field_errors.contains_key("items[0].quantity"));
    }

    #[test]
    fn order_total_must_stay_finite() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "items": [
                {"productId": "p1", "quantity": 1, "price": 1e308},
                {"productId": "p2", "quantity": 1, "price": 1e308}
            ],
            "shippingAddress": {
                "street": "1 Main St", "city": "Springfield", "state": "IL",
                "zipCode": "62701", "country": "US"
            }
        }))
        .unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.field_errors["items"], "order total is too large");
        assert!(!err.field_errors.contains_key("items[0].price"));

        let req: CreateOrderRequest = serde_json::from_value(json!({
            "items": [{"productId": "p1", "quantity": 2, "price": 1e308}],
            "shippingAddress": {
                "street": "1 Main St", "city": "Springfield", "state": "IL",
                "zipCode": "62701", "country": "US"
            }
        }))
        .unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.field_errors["items[0].price"], "line total is too large");
    }

    #[test]
    fn order_needs_items() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "items": [],
            "shippingAddress": {
                "street": "1 Main St", "city": "Springfield", "state": "IL",
                "zipCode": "62701", "country": "US"
            }
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err().field_errors["items"], "must contain at least 1 item");
    }
}
