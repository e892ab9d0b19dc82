/// Utilities for working with GraphQL documents and values.
pub mod graphql;
