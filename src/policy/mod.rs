pub mod app_state;
pub mod policy;
pub mod recovery;
pub mod session;
