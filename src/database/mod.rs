pub mod connection;
pub mod word;
