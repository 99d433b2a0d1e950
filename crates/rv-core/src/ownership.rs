/// Numeric owner applied to every extracted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub uid: u32,
    pub gid: u32,
}

impl Ownership {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    pub fn with_gid(self, gid: u32) -> Self {
        Self { gid, ..self }
    }
}

/// Requested owner by name. Empty names are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerSpec {
    pub user: Option<String>,
    pub group: Option<String>,
}

impl OwnerSpec {
    pub fn new(user: Option<String>, group: Option<String>) -> Self {
        Self {
            user: user.filter(|value| !value.trim().is_empty()),
            group: group.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn is_process_identity(&self) -> bool {
        self.user.is_none() && self.group.is_none()
    }
}
