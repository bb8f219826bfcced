//! Rule serialization.

mod serializer;

pub use serializer::{rrule_value, serialize, serialize_normalized};
