use anyhow::Result;
use rv_core::{OwnerSpec, Ownership};
use tracing::debug;

/// Source of numeric identities for the owner of extracted files.
pub trait IdentityResolver {
    /// Identity of the invoking process.
    fn process_identity(&self) -> Result<Ownership>;

    /// Uid and primary gid of a named user.
    fn user(&self, name: &str) -> Result<Ownership>;

    fn group_id(&self, name: &str) -> Result<u32>;
}

/// Resolves `spec` into a numeric owner. A group name overrides the gid whether or not a user
/// was named.
pub fn resolve_ownership(resolver: &dyn IdentityResolver, spec: &OwnerSpec) -> Result<Ownership> {
    let mut owner = match spec.user.as_deref() {
        Some(user) => resolver.user(user)?,
        None => resolver.process_identity()?,
    };
    if let Some(group) = spec.group.as_deref() {
        owner = owner.with_gid(resolver.group_id(group)?);
    }
    debug!(uid = owner.uid, gid = owner.gid, "resolved release ownership");
    Ok(owner)
}

/// Looks identities up in the system passwd and group databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

#[cfg(unix)]
impl IdentityResolver for SystemIdentity {
    fn process_identity(&self) -> Result<Ownership> {
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };
        Ok(Ownership::new(uid, gid))
    }

    fn user(&self, name: &str) -> Result<Ownership> {
        unix::lookup_user(name)
    }

    fn group_id(&self, name: &str) -> Result<u32> {
        unix::lookup_group(name)
    }
}

#[cfg(not(unix))]
impl IdentityResolver for SystemIdentity {
    fn process_identity(&self) -> Result<Ownership> {
        Ok(Ownership::new(0, 0))
    }

    fn user(&self, name: &str) -> Result<Ownership> {
        Err(anyhow::anyhow!(
            "cannot resolve user {name}: ownership is only supported on unix"
        ))
    }

    fn group_id(&self, name: &str) -> Result<u32> {
        Err(anyhow::anyhow!(
            "cannot resolve group {name}: ownership is only supported on unix"
        ))
    }
}

#[cfg(unix)]
mod unix {
    use std::ffi::CString;
    use std::io;
    use std::ptr;

    use anyhow::{anyhow, Context, Result};
    use rv_core::Ownership;

    const FALLBACK_BUFFER_LEN: usize = 1024;
    const MAX_BUFFER_LEN: usize = 1 << 20;

    fn initial_buffer_len(key: libc::c_int) -> usize {
        let suggested = unsafe { libc::sysconf(key) };
        if suggested > 0 {
            suggested as usize
        } else {
            FALLBACK_BUFFER_LEN
        }
    }

    // Platforms disagree on how a missing entry is reported.
    fn is_not_found(rc: libc::c_int) -> bool {
        rc == 0 || rc == libc::ENOENT || rc == libc::ESRCH
    }

    fn c_name(kind: &str, name: &str) -> Result<CString> {
        CString::new(name).map_err(|_| anyhow!("invalid {kind} name: {name:?}"))
    }

    pub(super) fn lookup_user(name: &str) -> Result<Ownership> {
        let c_name = c_name("user", name)?;
        let mut buffer = vec![0 as libc::c_char; initial_buffer_len(libc::_SC_GETPW_R_SIZE_MAX)];
        loop {
            let mut record: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = ptr::null_mut();
            let rc = unsafe {
                libc::getpwnam_r(
                    c_name.as_ptr(),
                    &mut record,
                    buffer.as_mut_ptr(),
                    buffer.len(),
                    &mut result,
                )
            };
            if rc == libc::ERANGE && buffer.len() < MAX_BUFFER_LEN {
                buffer.resize(buffer.len() * 2, 0);
                continue;
            }
            if result.is_null() && is_not_found(rc) {
                return Err(anyhow!("unknown user: {name}"));
            }
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc))
                    .with_context(|| format!("failed to look up user {name}"));
            }
            return Ok(Ownership::new(record.pw_uid, record.pw_gid));
        }
    }

    pub(super) fn lookup_group(name: &str) -> Result<u32> {
        let c_name = c_name("group", name)?;
        let mut buffer = vec![0 as libc::c_char; initial_buffer_len(libc::_SC_GETGR_R_SIZE_MAX)];
        loop {
            let mut record: libc::group = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::group = ptr::null_mut();
            let rc = unsafe {
                libc::getgrnam_r(
                    c_name.as_ptr(),
                    &mut record,
                    buffer.as_mut_ptr(),
                    buffer.len(),
                    &mut result,
                )
            };
            if rc == libc::ERANGE && buffer.len() < MAX_BUFFER_LEN {
                buffer.resize(buffer.len() * 2, 0);
                continue;
            }
            if result.is_null() && is_not_found(rc) {
                return Err(anyhow!("unknown group: {name}"));
            }
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc))
                    .with_context(|| format!("failed to look up group {name}"));
            }
            return Ok(record.gr_gid);
        }
    }
}
