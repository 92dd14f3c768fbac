//! Domain models for the API.
//!
//! Row types derive `sqlx::FromRow` for the runtime queries in [`crate::db`]
//! and `Serialize` for the JSON responses. IDs serialize as `_id`, money as
//! JSON numbers, everything else in camelCase.

pub mod address;
pub mod blog;
pub mod booking;
pub mod cart;
pub mod content;
pub mod coupon;
pub mod doctor;
pub mod order;
pub mod product;
pub mod transaction;
pub mod user;

pub use address::Address;
pub use blog::Blog;
pub use booking::Booking;
pub use cart::{Cart, CartItem};
pub use content::{AboutPage, Contact, ContentItem, ContentSection, CoreValue, Tip};
pub use coupon::Coupon;
pub use doctor::Doctor;
pub use order::{AdminOrder, Order, OrderItem, PaymentResult, ShippingAddress, ShipmentInfo};
pub use product::{Category, Product, ProductDetail, Review};
pub use transaction::Transaction;
pub use user::{User, UserResponse};
