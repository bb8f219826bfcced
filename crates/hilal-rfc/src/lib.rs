//! Recurrence rule vocabulary, text format and rendering.
//!
//! Rules follow RFC 5545 RRULE syntax with the RFC 7529 `RSCALE` and `SKIP` parts, and all
//! dates in the text form are lunar.

pub mod error;
pub mod rfc;
