pub mod optimize;
pub mod tool;
