pub mod page_input;
pub mod session;
