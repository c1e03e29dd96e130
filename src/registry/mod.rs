//! Component registry: declared components and load order validation.

pub mod catalog;
pub mod descriptor;

pub use catalog::main_page_order;
pub use descriptor::{ComponentDescriptor, ComponentRegistry, OrderViolation, RegistryError};
