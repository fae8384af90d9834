pub mod banner_frames;
pub mod bracket;
pub mod splash;
