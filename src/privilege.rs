//! Effective-UID checks for privileged operations.

/// The identity the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privilege {
    euid: u32,
}

impl Privilege {
    /// Read the effective UID of the running process.
    pub fn current() -> Self {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        Self { euid }
    }

    /// An explicit identity, for callers that already know the UID.
    pub fn from_uid(euid: u32) -> Self {
        Self { euid }
    }

    pub fn root() -> Self {
        Self { euid: 0 }
    }

    pub fn euid(&self) -> u32 {
        self.euid
    }

    pub fn is_root(&self) -> bool {
        self.euid == 0
    }
}
