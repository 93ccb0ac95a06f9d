/**
 * Names that never show up in a listing and are
 *  never served, however they are requested.
 */
pub mod hidden;
/**
 * Persisted marker of the most recent note or
 *  file mutation.
 */
pub mod last_change;
/**
 * The single shared text note.
 */
pub mod note;
/**
 * Resolution of request paths against the
 *  shared root. Every filesystem access in
 *  this crate goes through here first.
 */
pub mod path;
/**
 * Listing, reading and writing files inside
 *  the shared root.
 */
pub mod store;
/**
 * Helper for reporting build version information.
 */
pub mod version;

mod atomic;

pub mod prelude {
    pub use crate::hidden::HiddenPatternSet;
    pub use crate::last_change::LastChange;
    pub use crate::note::{Note, NoteStore};
    pub use crate::path::{PathResolver, PathTraversal};
    pub use crate::store::{FileEntry, FileStore, StoreError};
    pub use crate::version::BuildInfo;
}
