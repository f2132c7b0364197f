//! Writer header and variable schema decoding.
//!
//! - [`header`] parses the fixed writer header and its rotating slot table
//! - [`decode`](mod@decode) turns the variable-header table into a [`VariableSchema`](crate::VariableSchema)
//! - [`known`] lists the variables consumers rely on, with their expected shape

pub mod decode;
pub mod header;
pub mod known;

pub use decode::{decode, decode_against, decode_partial, encode_var_header};
pub use header::{SchemaFingerprint, SlotDescriptor, TelemetryHeader};
pub use known::{KNOWN_VARIABLES, KnownVariable};
