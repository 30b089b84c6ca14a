pub mod executor;
pub mod submit;
