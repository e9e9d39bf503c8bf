pub mod booking;
pub mod comment;
pub mod event;
pub mod photo;
