pub mod event;
pub mod label;

pub use event::{LoadStatus, PageEvent};
pub use label::ClassificationLabel;
