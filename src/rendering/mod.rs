pub mod palette;
pub mod sprite_frames;
