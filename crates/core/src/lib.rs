//! Hridved Core - Shared domain types and pure business rules.
//!
//! This crate provides common types used across the Hridved components:
//! - `api` - JSON API for the storefront, blog and consultation booking
//! - `cli` - Command-line tools for migrations, admin users and content seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Database encoding for the types lives behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money and status enums
//! - [`slug`] - URL slug generation for blog posts
//! - [`pagination`] - Page/offset arithmetic shared by list endpoints
//! - [`pricing`] - Order totals, GST and coupon discounts
//! - [`validation`] - Field validators for addresses, products and contact forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod pricing;
pub mod slug;
pub mod types;
pub mod validation;

pub use pagination::{PageInfo, Pagination};
pub use pricing::{CouponRejection, CouponTerms, OrderTotals};
pub use slug::slugify;
pub use types::*;
pub use validation::FieldErrors;
