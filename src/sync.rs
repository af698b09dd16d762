use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use crate::{Error, Result};

static THREAD_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Runs `f` on a named background thread that nobody joins. Sessions spawned
/// through here can outlive their spawner; they must never hold up process
/// shutdown.
pub fn spawn_detached<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    let seq = THREAD_SEQ.fetch_add(1, Ordering::SeqCst);
    thread::Builder::new()
        .name(format!("{}-{}", name, seq))
        .spawn(f)
        .map(|_| ())
        .map_err(Error::as_sync_error)
}

/// Process-wide mutual exclusion for enrollment sessions; clones share the
/// same flag. Acquisition is a single compare-and-swap, so two racing callers
/// can never both win it.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentLock(Arc<AtomicBool>);

impl EnrollmentLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking observation. It can be stale by the time the caller acts
    /// on it; acquisition itself always goes through `try_acquire`.
    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Option<EnrollmentGuard> {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then(|| EnrollmentGuard(Arc::clone(&self.0)))
    }
}

/// Holds the enrollment lock. Releasing on drop covers every exit path of a
/// session, prompt and write failures included.
pub struct EnrollmentGuard(Arc<AtomicBool>);

impl Drop for EnrollmentGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod test {
    use std::sync::mpsc;

    use super::{spawn_detached, EnrollmentLock};

    #[test]
    fn second_acquire_fails_while_held() {
        let lock = EnrollmentLock::new();
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.is_held());
        assert!(lock.try_acquire().is_none());
    }

    #[test]
    fn dropping_the_guard_releases() {
        let lock = EnrollmentLock::new();
        drop(lock.try_acquire());
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn detached_threads_run_their_task() {
        let (sender, receiver) = mpsc::channel();
        spawn_detached("test-task", move || {
            sender.send(42).expect("Failed to send from task");
        })
        .expect("Failed to spawn");
        assert_eq!(
            receiver
                .recv_timeout(std::time::Duration::from_secs(2))
                .expect("Task never ran"),
            42
        );
    }
}
