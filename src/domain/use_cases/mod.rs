pub mod bookings;
pub mod comments;
pub mod events;
pub mod extractors;
pub mod photos;
