pub mod adb;
pub mod channel;
pub mod scripted;
