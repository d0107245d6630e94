use log::{debug, info, warn};
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use wedding_shared::error::StoreError;
use wedding_shared::store::{LikeStore, LikeSubscription};

pub const BURST_DURATION: Duration = Duration::from_secs(3);
pub const BURST_TICK: Duration = Duration::from_millis(100);
pub const PARTICLES_PER_TICK: usize = 3;
pub const PARTICLE_LIFETIME: Duration = Duration::from_secs(1);

const SPREAD: f32 = 250.0;
const PALETTE: [&str; 5] = ["#88A874", "#A4C639", "#8EB4C9", "#A0C3D2", "#94AC7F"];

/// The "send your congratulations" counter.
///
/// The displayed count is always the last value pushed by the store; an
/// increment is never predicted locally.
pub struct LikeCounter<S: LikeStore + ?Sized> {
    store: Arc<S>,
    subscription: LikeSubscription,
    celebration: Celebration,
}

impl<S: LikeStore + ?Sized> LikeCounter<S> {
    /// Subscribes to the counter, creating it at zero if it does not exist.
    pub async fn connect(store: Arc<S>) -> Result<Self, StoreError> {
        let subscription = store.watch_likes().await?;

        if store.get_likes().await?.is_none() {
            info!("Like counter missing, initializing at zero");
            store.init_likes().await?;
        }

        Ok(Self {
            store,
            subscription,
            celebration: Celebration::new(),
        })
    }

    pub fn count(&self) -> Option<u64> {
        self.subscription.current()
    }

    /// Waits for the store to push a new value.
    pub async fn changed(&mut self) -> Result<Option<u64>, StoreError> {
        self.subscription.changed().await
    }

    /// Starts the celebration and asks the store for an atomic +1. The
    /// celebration runs whether or not the increment succeeds.
    pub async fn increment(&self) -> Result<(), StoreError> {
        self.celebration.start();

        match self.store.increment_likes(1).await {
            Ok(count) => {
                debug!("Store acknowledged like, count={}", count);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to send like: {}", e);
                Err(e)
            }
        }
    }

    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
    pub color: &'static str,
    born: Instant,
}

#[derive(Debug, Default)]
struct Burst {
    active: bool,
    next_id: u64,
    particles: Vec<Particle>,
}

impl Burst {
    fn spawn(&mut self, now: Instant) {
        let mut rng = rand::thread_rng();
        let half = SPREAD / 2.0;
        self.next_id += 1;
        self.particles.push(Particle {
            id: self.next_id,
            x: rng.gen_range(-half..half),
            y: rng.gen_range(-half..half),
            scale: rng.gen_range(0.8..2.0),
            rotation: rng.gen_range(0.0..360.0),
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            born: now,
        });
    }

    fn expire(&mut self, now: Instant) {
        self.particles
            .retain(|p| now.duration_since(p.born) < PARTICLE_LIFETIME);
    }
}

/// Decorative burst of hearts shown after a like. Starting a new burst
/// cancels the running one; dropping the celebration cancels its timer.
pub struct Celebration {
    burst: Arc<Mutex<Burst>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            burst: Arc::new(Mutex::new(Burst::default())),
            timer: Mutex::new(None),
        }
    }

    pub fn start(&self) {
        let mut timer = lock(&self.timer);
        if let Some(running) = timer.take() {
            running.abort();
        }

        lock(&self.burst).active = true;

        let burst = self.burst.clone();
        *timer = Some(tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(BURST_TICK);
            loop {
                ticker.tick().await;
                let now = Instant::now();
                let finished = {
                    let mut state = lock(&burst);
                    state.expire(now);
                    if now.duration_since(started) > BURST_DURATION {
                        state.active = false;
                        state.particles.is_empty()
                    } else {
                        for _ in 0..PARTICLES_PER_TICK {
                            state.spawn(now);
                        }
                        false
                    }
                };
                if finished {
                    break;
                }
            }
        }));
    }

    pub fn is_active(&self) -> bool {
        lock(&self.burst).active
    }

    /// Particles currently on screen.
    pub fn particles(&self) -> Vec<Particle> {
        lock(&self.burst).particles.clone()
    }

    /// True while the timer task is still running.
    pub fn is_running(&self) -> bool {
        lock(&self.timer)
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Celebration {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
    }
}
