pub mod cache_steps;
pub mod shortener_steps;
