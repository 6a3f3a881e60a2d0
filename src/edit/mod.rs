mod history;
mod request;

pub use history::{EditTicket, VersionStore};
pub use request::{AspectRatio, Attachment, EditKind, EditRequest};
