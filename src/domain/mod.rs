pub mod attachment;
pub mod message;
pub mod event;
pub mod announcement;
pub mod ordering;
pub mod validation;

pub use attachment::*;
pub use message::*;
pub use event::*;
pub use announcement::*;
pub use ordering::Sort;
