pub mod global_context;

pub use global_context::AppGlobalContext;
