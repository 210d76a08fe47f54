pub mod engine;
pub mod state;

pub use engine::apply_filters;
pub use state::{FilterState, FilterStore, PriceBound, SectionKey};
