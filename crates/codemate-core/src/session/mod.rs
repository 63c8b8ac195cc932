//! Chat sessions and their persistence
//!
//! The [`SessionStore`] owns the ordered session list and the current session
//! id. It is mutated only by the workflow controller; persistence goes through
//! an opaque [`BlobStore`] holding a single [`PersistedState`] value.

mod storage;
mod store;
mod types;

pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore, STATE_KEY};
pub use store::SessionStore;
pub use types::{
    DEFAULT_TITLE, FileContext, Message, MessageId, PersistedState, Role, Session, SessionId,
    SessionSummary,
};
