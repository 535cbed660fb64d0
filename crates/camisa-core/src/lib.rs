//! # camisa-core
//!
//! Shared domain types for the camisa shirt catalog service.
//!
//! This crate is the vocabulary both the store and the server speak:
//!
//! - **People**: [`Person`] plus the [`NewPerson`] / [`PersonUpdate`] inputs
//! - **Shirts**: [`Shirt`] plus the [`NewShirt`] / [`ShirtPatch`] inputs
//!
//! Wire field names (`imageURL`, `priceInCents`, `personId`) follow the
//! service's public JSON contract, so these types serialize directly in
//! HTTP responses.

#![deny(unsafe_code)]

pub mod person;
pub mod shirt;

pub use person::{NewPerson, Person, PersonUpdate};
pub use shirt::{NewShirt, Shirt, ShirtPatch};
