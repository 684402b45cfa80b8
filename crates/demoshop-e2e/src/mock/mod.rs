//! In-memory demo shop for running the suite without a browser.
//!
//! [`MockDriver`] implements [`crate::PageDriver`] over a [`Dom`] rendered
//! by [`DemoStorefront`]. Locators resolve against it with the same role,
//! accessible-name, text, placeholder, test id and CSS rules the CDP driver
//! evaluates in a real page.

mod css;
pub mod dom;
mod driver;
pub mod storefront;

pub use dom::{Dom, Node, NodeId};
pub use driver::MockDriver;
pub use storefront::{DemoStorefront, LoginError, Product, Reaction, Screen, Trigger, SHIPPING_ALERT};
