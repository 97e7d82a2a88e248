use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owner of every timer and background task of the client.
///
/// Tasks are registered under a name; registering a name again replaces (and
/// aborts) the previous task. `cancel_all` tears everything down and refuses
/// new registrations afterwards.
pub struct Scheduler {
    timers: Arc<DashMap<String, (u64, JoinHandle<()>)>>,
    generation: AtomicU64,
    disposed: AtomicBool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            timers: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Runs `task` once after `delay`.
    pub fn schedule_once<F, Fut>(&self, name: &str, delay: Duration, task: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_disposed() {
            return false;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let timers = Arc::clone(&self.timers);
        let key = name.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Deregister before running so the task may reschedule itself.
            timers.remove_if(&key, |_, (g, _)| *g == generation);
            task().await;
        });

        self.register(name, generation, handle);
        true
    }

    /// Runs `task` every `period`, first run one period from now. A slow run
    /// delays the following ticks instead of bursting.
    pub fn schedule_interval<F, Fut>(&self, name: &str, period: Duration, mut task: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_disposed() {
            return false;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                interval.tick().await;
                task().await;
            }
        });

        self.register(name, generation, handle);
        true
    }

    /// Runs a long-lived listener until it finishes or is cancelled.
    pub fn spawn<Fut>(&self, name: &str, future: Fut) -> bool
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_disposed() {
            return false;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let handle = tokio::spawn(future);
        self.register(name, generation, handle);
        true
    }

    pub fn cancel(&self, name: &str) -> bool {
        match self.timers.remove(name) {
            Some((_, (_, handle))) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    log::debug!("⏹️ Cancelled timer '{}'", name);
                }
                was_running
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let names: Vec<String> = self.timers.iter().map(|entry| entry.key().clone()).collect();
        for name in names {
            self.cancel(&name);
        }
        log::debug!("🧹 Scheduler disposed");
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.timers
            .get(name)
            .map_or(false, |entry| !entry.value().1.is_finished())
    }

    pub fn active_count(&self) -> usize {
        self.timers.iter().filter(|entry| !entry.value().1.is_finished()).count()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn register(&self, name: &str, generation: u64, handle: JoinHandle<()>) {
        if let Some((_, previous)) = self.timers.insert(name.to_string(), (generation, handle)) {
            previous.abort();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for entry in self.timers.iter() {
            entry.value().1.abort();
        }
    }
}
