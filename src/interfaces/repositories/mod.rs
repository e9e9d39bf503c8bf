pub mod object_store;
pub mod relation_store;
