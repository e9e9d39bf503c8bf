pub mod email;
pub mod limiter;
pub mod supabase;
pub mod utils;
