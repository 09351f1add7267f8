pub mod routes;
pub mod slug;
pub mod store;
