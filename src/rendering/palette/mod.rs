pub mod palette;

pub use palette::DoctorColor;
