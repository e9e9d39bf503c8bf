pub mod admin;
pub mod bookings;
pub mod comments;
pub mod events;
pub mod photos;
pub mod system;
