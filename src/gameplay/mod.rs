pub mod doctor;
pub mod manager;
