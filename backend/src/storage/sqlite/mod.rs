pub mod connection;
pub mod repositories;

#[cfg(test)]
pub mod test_utils;

pub use connection::DbConnection;
