//! Static hierarchical gazetteer (country → region → city) and the strict
//! name/alias [`Locator`] built on top of it.

pub mod builtin;
pub mod error;
pub mod locator;
pub mod place;

pub use error::*;
pub use locator::*;
pub use place::*;
