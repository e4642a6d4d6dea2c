mod sink;
pub mod state;

pub use sink::UiSink;
pub use state::{Alert, BadgeState, UiUpdate};
