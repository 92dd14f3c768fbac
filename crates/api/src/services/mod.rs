//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password and OAuth login, JWT issuing, the session cookie
//! - `checkout` - Order placement and post-payment shipment booking
//! - `payments` - Razorpay, Stripe and PhonePe clients
//! - `fship` - FShip courier API (serviceability, shipments, tracking)
//! - `oauth` - Google and Facebook profile lookups
//! - `cloudinary` - Image uploads

pub mod auth;
pub mod checkout;
pub mod cloudinary;
pub mod fship;
pub mod oauth;
pub mod payments;
