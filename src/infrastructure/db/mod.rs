pub mod connection;
pub mod maintenance;
pub mod syllabi;
pub mod users;
