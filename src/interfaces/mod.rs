//! Edges of the crate: CSV seed files in, CSV reports out.

pub mod csv;
