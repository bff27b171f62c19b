pub mod attachments;
pub mod data;
pub mod root;
