//! REST route handlers.

pub mod files;
pub mod images;
pub mod people;
pub mod shirts;
