//! Before/after run callbacks
//!
//! Hooks fire only for admitted runs. They run on the scheduler task and
//! must not block.

use super::descriptor::RunDescriptor;
use crate::domain::JobKind;
use std::fmt;
use std::sync::Arc;

pub type BeforeRunHook = Arc<dyn Fn(JobKind) + Send + Sync>;
pub type AfterRunHook = Arc<dyn Fn(JobKind, &RunDescriptor) + Send + Sync>;

/// Registered callbacks
#[derive(Clone, Default)]
pub struct RunHooks {
    before: Vec<BeforeRunHook>,
    after: Vec<AfterRunHook>,
}

impl RunHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback fired after admission, before the flow starts
    pub fn on_before_run(mut self, hook: impl Fn(JobKind) + Send + Sync + 'static) -> Self {
        self.before.push(Arc::new(hook));
        self
    }

    /// Register a callback fired after the post-run file transition
    pub fn on_after_run(
        mut self,
        hook: impl Fn(JobKind, &RunDescriptor) + Send + Sync + 'static,
    ) -> Self {
        self.after.push(Arc::new(hook));
        self
    }

    pub(crate) fn fire_before(&self, job: JobKind) {
        for hook in &self.before {
            hook(job);
        }
    }

    pub(crate) fn fire_after(&self, job: JobKind, descriptor: &RunDescriptor) {
        for hook in &self.after {
            hook(job, descriptor);
        }
    }
}

impl fmt::Debug for RunHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHooks")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[test]
    fn test_hooks_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let hooks = RunHooks::new()
            .on_before_run(move |job| a.lock().unwrap().push(format!("first {job}")))
            .on_before_run(move |job| b.lock().unwrap().push(format!("second {job}")))
            .on_after_run(move |job, d| {
                c.lock().unwrap().push(format!("after {job} {}", d.status))
            });

        hooks.fire_before(JobKind::Ingest);
        let mut descriptor = RunDescriptor::started(JobKind::Ingest, Uuid::new_v4(), Utc::now());
        descriptor.record_failure("boom");
        hooks.fire_after(JobKind::Ingest, &descriptor);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first ingest", "second ingest", "after ingest failed"]
        );
    }
}
