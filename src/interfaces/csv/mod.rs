pub mod discount_reader;
pub mod discount_writer;
pub mod seed;
