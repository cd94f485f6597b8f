//! Entity usage display
//!
//! This library renders the usage of an entity (the other entities that
//! reference it) either as a linked count or as a detailed table, depending
//! on how many usages exist and on the formatter's display settings.
//!
//! The usage index, entity storage, routing and translation are collaborators
//! owned by the host and injected through the traits in [`entity`],
//! [`usage`], [`routing`] and [`translation`].

pub mod config;
pub mod entity;
pub mod formatter;
pub mod render;
pub mod routing;
pub mod snapshot;
pub mod translation;
pub mod usage;
