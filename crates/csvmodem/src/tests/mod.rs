mod property_partition;
mod read_bad;
pub(crate) mod utils;
