pub mod client;
pub mod config;
pub mod dom;
pub mod error;
pub mod listing;
pub mod mapping;
pub mod modal;
pub mod pager;
pub mod render;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::client::{HttpSearchClient, SearchClient};
    pub use crate::config::ListingSettings;
    pub use crate::dom::{MemoryDom, ModalElement, PagerControl, Region, SectionDom};
    pub use crate::error::{ListingError, ListingResult};
    pub use crate::listing::{ListingSection, PageOutcome, PageSummary};
    pub use crate::modal::{ModalState, OpenPolicy};
    pub use crate::types::{CardModel, ListingConfig, ModalDescriptor, RawResult};
}

pub use client::{HttpSearchClient, SearchClient};
pub use config::ListingSettings;
pub use error::{ListingError, ListingResult};
pub use listing::{render_page, ListingSection, PageOutcome, PageSummary, RenderedPage};
pub use mapping::normalize;
pub use pager::{page_to_offset, render_pager, PagerState};
pub use render::{render_card, LayoutKind};
