//! Monitor loop: owns the polling cadence and the provider lifecycle, and
//! broadcasts per-category snapshots once per tick.
//!
//! One background task runs the loop and exclusively owns the provider
//! handle (opened on start, closed on stop). Publication is fire-and-forget
//! over broadcast channels, so a slow or failed subscriber can never stall
//! the loop or starve other subscribers.

pub mod builder;

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::ModuleToggles;
use crate::constants::{EVENT_CHANNEL_CAPACITY, MIN_UPDATE_INTERVAL_MS};
use crate::models::{
    BatterySnapshot, CpuSnapshot, DiskSnapshot, FanReading, GpuSnapshot, MemorySnapshot,
    NetworkSnapshot, SensorReading, SnapshotSet,
};
use crate::provider::{ProviderError, SensorProvider};

/// Lifecycle state of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Per-category broadcast channels. Cloning shares the underlying senders.
#[derive(Clone)]
pub struct EventBus {
    cpu: broadcast::Sender<CpuSnapshot>,
    gpu: broadcast::Sender<GpuSnapshot>,
    memory: broadcast::Sender<MemorySnapshot>,
    disks: broadcast::Sender<Vec<DiskSnapshot>>,
    networks: broadcast::Sender<Vec<NetworkSnapshot>>,
    battery: broadcast::Sender<BatterySnapshot>,
    sensors: broadcast::Sender<Vec<SensorReading>>,
    fans: broadcast::Sender<Vec<FanReading>>,
}

impl EventBus {
    fn new() -> Self {
        Self {
            cpu: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            gpu: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            memory: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            disks: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            networks: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            battery: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            sensors: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            fans: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe_cpu(&self) -> broadcast::Receiver<CpuSnapshot> {
        self.cpu.subscribe()
    }

    pub fn subscribe_gpu(&self) -> broadcast::Receiver<GpuSnapshot> {
        self.gpu.subscribe()
    }

    pub fn subscribe_memory(&self) -> broadcast::Receiver<MemorySnapshot> {
        self.memory.subscribe()
    }

    pub fn subscribe_disks(&self) -> broadcast::Receiver<Vec<DiskSnapshot>> {
        self.disks.subscribe()
    }

    pub fn subscribe_networks(&self) -> broadcast::Receiver<Vec<NetworkSnapshot>> {
        self.networks.subscribe()
    }

    pub fn subscribe_battery(&self) -> broadcast::Receiver<BatterySnapshot> {
        self.battery.subscribe()
    }

    pub fn subscribe_sensors(&self) -> broadcast::Receiver<Vec<SensorReading>> {
        self.sensors.subscribe()
    }

    pub fn subscribe_fans(&self) -> broadcast::Receiver<Vec<FanReading>> {
        self.fans.subscribe()
    }

    /// Publish one tick's snapshots. Scalar categories go out whenever
    /// present; list categories only when non-empty. Send errors mean "no
    /// subscribers right now" and are ignored.
    fn publish(&self, set: SnapshotSet, modules: &ModuleToggles) {
        if modules.cpu {
            if let Some(cpu) = set.cpu {
                let _ = self.cpu.send(cpu);
            }
        }
        if modules.gpu {
            if let Some(gpu) = set.gpu {
                let _ = self.gpu.send(gpu);
            }
        }
        if modules.memory {
            if let Some(memory) = set.memory {
                let _ = self.memory.send(memory);
            }
        }
        if modules.battery {
            if let Some(battery) = set.battery {
                let _ = self.battery.send(battery);
            }
        }
        if modules.disks && !set.disks.is_empty() {
            let _ = self.disks.send(set.disks);
        }
        if modules.networks && !set.networks.is_empty() {
            let _ = self.networks.send(set.networks);
        }
        if modules.sensors && !set.sensors.is_empty() {
            let _ = self.sensors.send(set.sensors);
        }
        if modules.fans && !set.fans.is_empty() {
            let _ = self.fans.send(set.fans);
        }
    }
}

/// Polling monitor over one sensor provider.
///
/// `start`/`stop` are no-ops when already in the requested state. Dropping
/// the monitor signals the loop to exit (best effort); `stop()` is the
/// graceful path and hands the provider back for a later restart.
pub struct HardwareMonitor<P: SensorProvider> {
    /// Present while stopped; moved into the loop task while running.
    provider: Option<P>,
    events: EventBus,
    modules: ModuleToggles,
    state: MonitorState,
    interval_tx: watch::Sender<Duration>,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<P>>,
}

impl<P: SensorProvider> HardwareMonitor<P> {
    pub fn new(provider: P, update_interval: Duration, modules: ModuleToggles) -> Self {
        let (interval_tx, _) = watch::channel(clamp_interval(update_interval));
        Self {
            provider: Some(provider),
            events: EventBus::new(),
            modules,
            state: MonitorState::Stopped,
            interval_tx,
            shutdown_tx: None,
            task: None,
        }
    }

    /// The event channels consumers subscribe to. Subscriptions made before
    /// `start()` see the first tick.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == MonitorState::Running
    }

    pub fn update_interval(&self) -> Duration {
        *self.interval_tx.borrow()
    }

    /// Change the polling cadence. Takes effect immediately when running:
    /// the loop re-arms its ticker on the next scheduling point.
    pub fn set_update_interval(&self, interval: Duration) {
        let _ = self.interval_tx.send(clamp_interval(interval));
    }

    /// Open the provider and launch the polling loop. A no-op when already
    /// running; an open failure leaves the monitor stopped.
    pub async fn start(&mut self) -> Result<(), ProviderError> {
        if self.state == MonitorState::Running {
            return Ok(());
        }
        let Some(mut provider) = self.provider.take() else {
            return Ok(());
        };

        self.state = MonitorState::Starting;
        if let Err(err) = provider.open().await {
            self.provider = Some(provider);
            self.state = MonitorState::Stopped;
            return Err(err);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(
            provider,
            self.events.clone(),
            self.modules,
            self.interval_tx.subscribe(),
            shutdown_rx,
        ));

        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);
        self.state = MonitorState::Running;
        Ok(())
    }

    /// Signal the loop, await its exit, and close the provider. A no-op
    /// when not running. Callers needing a deadline wrap this in
    /// `tokio::time::timeout`.
    pub async fn stop(&mut self) {
        if self.state != MonitorState::Running {
            return;
        }
        self.state = MonitorState::Stopping;

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(mut provider) => {
                    provider.close();
                    self.provider = Some(provider);
                }
                Err(err) => warn!(error = %err, "monitor loop task failed during stop"),
            }
        }

        self.state = MonitorState::Stopped;
    }
}

impl<P: SensorProvider> Drop for HardwareMonitor<P> {
    fn drop(&mut self) {
        // Best-effort teardown; safe to run after stop() already did this.
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(MIN_UPDATE_INTERVAL_MS))
}

/// The polling loop. Owns the provider for its whole lifetime and returns
/// it on exit so the monitor can close and reuse it.
async fn run_loop<P: SensorProvider>(
    mut provider: P,
    events: EventBus,
    modules: ModuleToggles,
    mut interval_rx: watch::Receiver<Duration>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> P {
    let mut ticker = new_ticker(*interval_rx.borrow());

    loop {
        tokio::select! {
            // Fires on stop() and when the monitor itself is dropped.
            _ = shutdown_rx.changed() => break,
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let interval = *interval_rx.borrow();
                ticker = new_ticker(interval);
                debug!(interval_ms = interval.as_millis() as u64, "ticker re-armed");
            }
            _ = ticker.tick() => {
                match provider.refresh().await {
                    Ok(roots) => events.publish(builder::build(&roots), &modules),
                    // A bad tick publishes nothing and the loop moves on.
                    Err(err) => warn!(error = %err, "provider refresh failed; skipping tick"),
                }
            }
        }
    }

    provider
}

/// A ticker whose first tick comes one full period from now.
fn new_ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
