pub mod codec;
pub mod serve;
