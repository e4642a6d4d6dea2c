pub mod decision;
mod page_monitor;

pub use page_monitor::PageMonitor;
