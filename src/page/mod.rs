//! Page boundary: the document the doctors walk on.

pub mod document;
pub mod handles;
pub mod layout;
pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use document::{ElementHandle, Page, PageDocument, PageEvent};
pub use layout::PageLayout;
pub use memory::MemoryPage;
