pub mod grid;
pub mod multi_layer;
pub mod vision;
pub mod window_dump;
