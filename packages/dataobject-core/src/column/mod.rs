//! Column metadata: neutral type tags, lengths, and descriptors.

mod descriptor;
mod types;

pub use descriptor::{ColumnBuilder, ColumnDescriptor};
pub use types::{ColumnLength, ColumnType, TypeClass};
pub(crate) use descriptor::is_identifier;
