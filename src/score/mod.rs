pub mod keywords;
pub mod priority;
