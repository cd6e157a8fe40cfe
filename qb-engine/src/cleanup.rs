use std::sync::Mutex;

use lazy_static::lazy_static;
use qb_core::errors::*;
use tracing::*;

type Closer = Box<dyn FnOnce() -> EmptyResult + Send>;

// Process-wide registry of things that must be torn down before exit (open
// watches, data-source subprocesses, profiling handles).  Drained once on
// normal exit and from the signal handler; never rely on lifetimes tied to
// process termination.
pub struct CleanupRegistry {
    closers: Mutex<Vec<(String, Closer)>>,
}

lazy_static! {
    static ref REGISTRY: CleanupRegistry = CleanupRegistry { closers: Mutex::new(vec![]) };
}

pub fn register(name: impl Into<String>, closer: impl FnOnce() -> EmptyResult + Send + 'static) {
    REGISTRY.closers.lock().unwrap().push((name.into(), Box::new(closer)));
}

// Runs every registered closer in reverse registration order; failures are
// logged as they happen and the last one is returned.
pub fn drain() -> EmptyResult {
    let mut closers = {
        let mut guard = REGISTRY.closers.lock().unwrap();
        std::mem::take(&mut *guard)
    };

    let mut last_err = Ok(());
    while let Some((name, closer)) = closers.pop() {
        debug!("closing {name}");
        if let Err(err) = closer() {
            warn!("error closing {name}: {err:#}");
            last_err = Err(err);
        }
    }
    last_err
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    use assertables::*;

    use super::*;

    #[test]
    fn test_drain_runs_closers_in_reverse_and_keeps_last_error() {
        let count = Arc::new(AtomicUsize::new(0));

        let c1 = count.clone();
        register("first", move || {
            c1.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("first failed"))
        });
        let c2 = count.clone();
        register("second", move || {
            c2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let err = drain().unwrap_err();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_contains!(format!("{err}"), "first failed");

        // the registry is empty afterwards
        assert_ok!(drain());
    }
}
