//! In-process fake brokers for exercising the coordinators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use airlink_core::{
    AttachSpecifier, BrokerEvent, ConfigStore, LinkProperties, ListenerId, NetError,
    NetworkBroker, NetworkHandle, RegistrationId, ScanBroker, ScanSignal,
};
use airlink_model::{ConfigId, NetworkDescriptor, SavedNetwork, ScanRecord};

/// Poll `cond` until it holds or a short deadline passes.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not met within timeout");
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct NetworkState {
    registrations: HashMap<RegistrationId, mpsc::Sender<BrokerEvent>>,
    specs: Vec<AttachSpecifier>,
}

/// Fake platform network broker with scripted behavior.
pub struct FakeNetworkBroker {
    state: Mutex<NetworkState>,
    reject_requests: AtomicBool,
    default_bind_ok: AtomicBool,
    link: Mutex<Option<LinkProperties>>,
    release_calls: AtomicUsize,
    max_live: AtomicUsize,
}

impl FakeNetworkBroker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NetworkState::default()),
            reject_requests: AtomicBool::new(false),
            default_bind_ok: AtomicBool::new(true),
            link: Mutex::new(Some(LinkProperties {
                gateway: Some("192.168.1.1".parse::<IpAddr>().unwrap()),
            })),
            release_calls: AtomicUsize::new(0),
            max_live: AtomicUsize::new(0),
        }
    }

    pub fn reject_requests(&self) {
        self.reject_requests.store(true, Ordering::SeqCst);
    }

    pub fn fail_default_bind(&self) {
        self.default_bind_ok.store(false, Ordering::SeqCst);
    }

    pub fn set_link(&self, link: Option<LinkProperties>) {
        *self.link.lock().unwrap() = link;
    }

    pub fn live_registrations(&self) -> usize {
        self.state.lock().unwrap().registrations.len()
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Highest number of registrations that were ever live at once.
    pub fn max_live_registrations(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn recorded_specs(&self) -> Vec<AttachSpecifier> {
        self.state.lock().unwrap().specs.clone()
    }

    /// Deliver an event to every live registration.
    pub async fn emit(&self, event: BrokerEvent) {
        let senders: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .registrations
            .values()
            .cloned()
            .collect();
        for sender in senders {
            let _ = sender.send(event).await;
        }
    }

    /// Drop event channels without counting a release, as a broker-side
    /// timeout would.
    pub fn expire_all(&self) {
        self.state.lock().unwrap().registrations.clear();
    }
}

#[async_trait]
impl NetworkBroker for FakeNetworkBroker {
    async fn request_attach(
        &self,
        spec: &AttachSpecifier,
        events: mpsc::Sender<BrokerEvent>,
        _timeout: Duration,
    ) -> Result<RegistrationId, NetError> {
        if self.reject_requests.load(Ordering::SeqCst) {
            return Err(NetError::Rejected("scripted rejection".into()));
        }
        // Widen the window for interleaving with competing callers.
        tokio::task::yield_now().await;
        let id = RegistrationId::generate();
        let live = {
            let mut state = self.state.lock().unwrap();
            state.registrations.insert(id, events);
            state.specs.push(spec.clone());
            state.registrations.len()
        };
        self.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(id)
    }

    async fn release_attach(&self, id: RegistrationId) {
        self.state.lock().unwrap().registrations.remove(&id);
        self.release_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn set_default_network(&self, _handle: NetworkHandle) -> bool {
        self.default_bind_ok.load(Ordering::SeqCst)
    }

    async fn link_properties(&self, _handle: NetworkHandle) -> Option<LinkProperties> {
        self.link.lock().unwrap().clone()
    }
}

/// Fake scan broker with a scripted result set.
pub struct FakeScanBroker {
    results: Mutex<Vec<ScanRecord>>,
    listeners: Mutex<HashMap<ListenerId, mpsc::Sender<ScanSignal>>>,
    trigger_ok: AtomicBool,
    trigger_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    max_live: AtomicUsize,
}

impl FakeScanBroker {
    pub fn new(results: Vec<ScanRecord>) -> Self {
        Self {
            results: Mutex::new(results),
            listeners: Mutex::new(HashMap::new()),
            trigger_ok: AtomicBool::new(true),
            trigger_calls: AtomicUsize::new(0),
            unregister_calls: AtomicUsize::new(0),
            max_live: AtomicUsize::new(0),
        }
    }

    pub fn reject_triggers(&self) {
        self.trigger_ok.store(false, Ordering::SeqCst);
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }

    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    /// Highest number of listeners that were ever live at once.
    pub fn max_live_listeners(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    /// Fire the results-ready signal at every registered listener.
    pub async fn signal(&self, fresh: bool) {
        let senders: Vec<_> = self.listeners.lock().unwrap().values().cloned().collect();
        for sender in senders {
            let _ = sender.send(ScanSignal { fresh }).await;
        }
    }
}

#[async_trait]
impl ScanBroker for FakeScanBroker {
    async fn trigger_scan(&self) -> bool {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        self.trigger_ok.load(Ordering::SeqCst)
    }

    async fn register_results_listener(&self, signal: mpsc::Sender<ScanSignal>) -> ListenerId {
        tokio::task::yield_now().await;
        let id = ListenerId::generate();
        let live = {
            let mut listeners = self.listeners.lock().unwrap();
            listeners.insert(id, signal);
            listeners.len()
        };
        self.max_live.fetch_max(live, Ordering::SeqCst);
        id
    }

    async fn unregister_results_listener(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id);
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn scan_results(&self) -> Vec<ScanRecord> {
        self.results.lock().unwrap().clone()
    }
}

/// Fake saved-configuration store for the legacy path.
pub struct FakeConfigStore {
    configs: Mutex<HashMap<String, ConfigId>>,
    next_id: AtomicI32,
    enable_ok: AtomicBool,
    enabled: Mutex<Vec<ConfigId>>,
    disabled: Mutex<Vec<ConfigId>>,
    add_calls: AtomicUsize,
}

impl FakeConfigStore {
    pub fn new() -> Self {
        Self {
            configs: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
            enable_ok: AtomicBool::new(true),
            enabled: Mutex::new(Vec::new()),
            disabled: Mutex::new(Vec::new()),
            add_calls: AtomicUsize::new(0),
        }
    }

    pub fn seed(&self, ssid: &str) -> ConfigId {
        let id = ConfigId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.configs.lock().unwrap().insert(ssid.to_owned(), id);
        id
    }

    pub fn fail_enable(&self) {
        self.enable_ok.store(false, Ordering::SeqCst);
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn enabled(&self) -> Vec<ConfigId> {
        self.enabled.lock().unwrap().clone()
    }

    pub fn disabled(&self) -> Vec<ConfigId> {
        self.disabled.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigStore for FakeConfigStore {
    async fn find(&self, ssid: &str) -> Option<ConfigId> {
        self.configs.lock().unwrap().get(ssid).copied()
    }

    async fn add(&self, descriptor: &NetworkDescriptor) -> Result<ConfigId, NetError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let id = ConfigId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.configs
            .lock()
            .unwrap()
            .insert(descriptor.ssid().to_owned(), id);
        Ok(id)
    }

    async fn enable(&self, id: ConfigId) -> bool {
        self.enabled.lock().unwrap().push(id);
        self.enable_ok.load(Ordering::SeqCst)
    }

    async fn disable(&self, id: ConfigId) {
        self.disabled.lock().unwrap().push(id);
    }

    async fn list(&self) -> Vec<SavedNetwork> {
        let mut saved: Vec<SavedNetwork> = self
            .configs
            .lock()
            .unwrap()
            .iter()
            .map(|(ssid, id)| SavedNetwork {
                id: *id,
                ssid: ssid.clone(),
            })
            .collect();
        saved.sort_by_key(|network| network.id);
        saved
    }
}
