//! Derive a full CRUD GraphQL API schema from type definitions annotated
//! with `@node` and `@relationship` directives.
//!
//! The entry point is [`schema::InputSchema`]: parse the annotated type
//! definitions with [`schema::InputSchema::parse`], then derive the API
//! schema with [`schema::InputSchema::api_schema`]. The resulting
//! [`schema::ApiSchema`] wraps a plain `graphql-parser` document that can
//! be printed as SDL.

pub mod data;
pub mod env;
pub mod prelude;
pub mod schema;
pub mod util;

pub use crate::env::EnvVars;
pub use crate::schema::{ApiSchema, InputSchema, Schema, SchemaValidationError};
