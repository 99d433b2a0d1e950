mod archive;
mod ownership;
mod release_id;

pub use archive::ArchiveType;
pub use ownership::{OwnerSpec, Ownership};
pub use release_id::{
    find_release_id, is_release_id, new_release_id, release_id_at, CURRENT_LINK_NAME,
    DEFAULT_KEEP, RELEASE_ID_FORMAT,
};
