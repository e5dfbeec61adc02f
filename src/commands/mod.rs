pub mod aggregate;
pub mod cluster;
