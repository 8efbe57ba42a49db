mod arbitrary;
mod exception_safety;
mod parse_bad;
mod parse_good;
mod property_partition;
pub mod utils;
