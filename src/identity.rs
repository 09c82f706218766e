//! Holder identity.
//!
//! A holder is `{hostname, optional thread tag, pid}`. The serialized form
//! `<hostname>.<tag->pid` names the holder-unique file used by the link and
//! mkdir backends, so two concurrent holders never produce the same name.
//!
//! Without a thread tag the identity is process-scoped: every thread of the
//! process is the same holder. Acquiring twice is then a no-op, and one thread
//! releasing unlocks for all of them.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Identity of a lock holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HolderIdentity {
    hostname: String,
    thread_tag: Option<String>,
    pid: u32,
}

impl HolderIdentity {
    /// Build an identity from explicit parts.
    pub fn new(hostname: impl Into<String>, pid: u32, thread_tag: Option<String>) -> Self {
        Self {
            hostname: hostname.into(),
            thread_tag,
            pid,
        }
    }

    /// Identity of the calling process, tagged with the calling thread when
    /// `threaded` is set.
    pub fn current(threaded: bool) -> Self {
        let tag = threaded.then(current_thread_tag);
        Self::new(local_hostname(), std::process::id(), tag)
    }

    /// Process-scoped identity of the calling process.
    pub fn for_process() -> Self {
        Self::current(false)
    }

    /// Replace the thread tag.
    pub fn with_thread_tag(mut self, tag: impl Into<String>) -> Self {
        self.thread_tag = Some(tag.into());
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn thread_tag(&self) -> Option<&str> {
        self.thread_tag.as_deref()
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether this identity distinguishes threads of the same process.
    pub fn is_threaded(&self) -> bool {
        self.thread_tag.is_some()
    }

    /// File name that uniquely identifies this holder.
    pub fn unique_name(&self) -> String {
        match &self.thread_tag {
            Some(tag) => format!("{}.{}-{}", self.hostname, tag, self.pid),
            None => format!("{}.{}", self.hostname, self.pid),
        }
    }
}

impl fmt::Display for HolderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unique_name())
    }
}

/// Stable hex tag for the calling thread.
///
/// Derived from `ThreadId`, which is never reused within a process.
pub fn current_thread_tag() -> String {
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    format!("{:x}", hasher.finish() & 0xffff_ffff)
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_without_thread_tag() {
        let id = HolderIdentity::new("box", 4242, None);
        assert_eq!(id.unique_name(), "box.4242");
        assert!(!id.is_threaded());
    }

    #[test]
    fn unique_name_with_thread_tag() {
        let id = HolderIdentity::new("box", 4242, Some("1f".to_string()));
        assert_eq!(id.unique_name(), "box.1f-4242");
        assert_eq!(id.to_string(), "box.1f-4242");
    }

    #[test]
    fn current_identity_uses_process_id() {
        let id = HolderIdentity::current(false);
        assert_eq!(id.pid(), std::process::id());
        assert!(!id.hostname().is_empty());
        assert_eq!(id.thread_tag(), None);
    }

    #[test]
    fn thread_tag_is_stable_within_a_thread() {
        assert_eq!(current_thread_tag(), current_thread_tag());
        let a = HolderIdentity::current(true);
        let b = HolderIdentity::current(true);
        assert_eq!(a, b);
    }

    #[test]
    fn threads_get_distinct_identities() {
        let here = HolderIdentity::current(true);
        let there = std::thread::spawn(|| HolderIdentity::current(true))
            .join()
            .unwrap();
        assert_ne!(here, there);
        assert_ne!(here.unique_name(), there.unique_name());
    }

    #[test]
    fn process_identity_is_shared_across_threads() {
        let here = HolderIdentity::for_process();
        let there = std::thread::spawn(HolderIdentity::for_process)
            .join()
            .unwrap();
        assert_eq!(here, there);
    }
}
