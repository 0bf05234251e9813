pub mod actions;
pub mod gesture;
pub mod scroll;
pub mod wait;
