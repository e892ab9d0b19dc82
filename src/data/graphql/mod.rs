pub mod ext;

pub use ext::{DirectiveExt, DirectiveFinder, DocumentExt, ObjectTypeExt, TypeExt, ValueExt};
