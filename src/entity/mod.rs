//! Database entity models for the storefront.
//!
//! These are the Sea-ORM entity definitions backing every table the
//! services touch. The schema itself is created by [`crate::migration`].

/// Administrator accounts, provisioned out-of-band.
pub mod admin_user;

/// Bearer-token sessions issued to administrators on login.
pub mod admin_session;

/// Catalog products.
pub mod product;

/// Customer order headers.
pub mod order;

/// Line items owned by an order.
pub mod order_item;
