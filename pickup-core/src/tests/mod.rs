//! Test doubles shared by the unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    future::Future,
    rc::Rc,
    time::Duration,
};

use async_trait::async_trait;
use futures::{
    channel::oneshot,
    executor::{LocalPool, LocalSpawner},
    future::{self, FutureExt as _, LocalBoxFuture},
    task::LocalSpawnExt as _,
};

use crate::{
    entities::{CarrierId, MapPoint, PickupPoint},
    gateways::*,
    headless::{HeadlessDocument, HeadlessMapLibrary, MapState},
    map_renderer::{MapRenderer, GOOGLE_MAPS_SEARCH_URL},
    PickupInfoWidget, Ports, Rendered, Result, Settings,
};

pub const MAP_SEARCH: &str = GOOGLE_MAPS_SEARCH_URL;

type Timer = (Duration, u64, Box<dyn FnOnce()>);

/// Virtual clock: scheduled callbacks only run on [`MockRuntime::advance`]
/// and sleeping completes immediately.
#[derive(Default)]
pub struct MockRuntime {
    spawner: Option<LocalSpawner>,
    now: Cell<Duration>,
    slept: Cell<Duration>,
    timers: RefCell<Vec<Timer>>,
    next_timer: Cell<u64>,
}

impl MockRuntime {
    pub fn new(spawner: LocalSpawner) -> Self {
        Self {
            spawner: Some(spawner),
            ..Default::default()
        }
    }

    pub fn slept(&self) -> Duration {
        self.slept.get()
    }

    pub fn advance(&self, duration: Duration) {
        let until = self.now.get() + duration;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, (due, _, _))| *due <= until)
                    .min_by_key(|(_, (due, seq, _))| (*due, *seq))
                    .map(|(i, _)| i);
                index.map(|i| timers.remove(i))
            };
            let Some((due, _, callback)) = next else {
                break;
            };
            self.now.set(due);
            callback();
        }
        self.now.set(until);
    }
}

impl Runtime for MockRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner
            .as_ref()
            .expect("spawner")
            .spawn_local(task)
            .expect("spawn task");
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.slept.set(self.slept.get() + duration);
        future::ready(()).boxed_local()
    }

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let seq = self.next_timer.get();
        self.next_timer.set(seq + 1);
        self.timers
            .borrow_mut()
            .push((self.now.get() + delay, seq, callback));
    }
}

#[derive(Default)]
pub struct MockAssetHost {
    pub ready: Cell<bool>,
    pub loading: Cell<bool>,
    /// Becomes ready after the given number of readiness checks.
    pub ready_after_polls: Cell<Option<usize>>,
    /// The library is not usable even after loading it.
    pub broken_after_load: Cell<bool>,
    pub stylesheet_error: RefCell<Option<String>>,
    pub script_error: RefCell<Option<String>>,
    pub attached_stylesheets: Cell<usize>,
    pub attached_scripts: Cell<usize>,
    polls: Cell<usize>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl MockAssetHost {
    /// Holds back the script until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gate.replace(Some(rx));
        tx
    }
}

#[async_trait(?Send)]
impl AssetHost for MockAssetHost {
    fn is_ready(&self) -> bool {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        self.ready.get() || self.ready_after_polls.get().is_some_and(|n| polls > n)
    }

    fn is_loading(&self) -> bool {
        self.loading.get()
    }

    async fn attach_stylesheet(&self, asset: &Asset) -> std::result::Result<(), AssetError> {
        self.attached_stylesheets
            .set(self.attached_stylesheets.get() + 1);
        match self.stylesheet_error.borrow().clone() {
            Some(reason) => Err(AssetError {
                url: asset.url.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }

    async fn attach_script(&self, asset: &Asset) -> std::result::Result<(), AssetError> {
        self.attached_scripts.set(self.attached_scripts.get() + 1);
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.await.map_err(|_| AssetError {
                url: asset.url.clone(),
                reason: "cancelled".into(),
            })?;
        }
        if let Some(reason) = self.script_error.borrow().clone() {
            return Err(AssetError {
                url: asset.url.clone(),
                reason,
            });
        }
        if !self.broken_after_load.get() {
            self.ready.set(true);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockGeocoder {
    answer: Cell<Option<MapPoint>>,
    queries: RefCell<Vec<String>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl MockGeocoder {
    pub fn answer(&self, pos: Option<MapPoint>) {
        self.answer.set(pos);
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// Holds back the next answer until the returned sender fires.
    pub fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gate.replace(Some(rx));
        tx
    }
}

#[async_trait(?Send)]
impl GeoCodingGateway for MockGeocoder {
    async fn resolve_address_lat_lng(&self, addr: &str) -> Option<MapPoint> {
        self.queries.borrow_mut().push(addr.to_owned());
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.await.ok()?;
        }
        self.answer.get()
    }
}

type FetchResult = std::result::Result<Option<PickupPoint>, FetchError>;

#[derive(Default)]
pub struct MockPickupPoints {
    responses: RefCell<HashMap<u64, FetchResult>>,
    pending: RefCell<HashMap<u64, oneshot::Receiver<FetchResult>>>,
    requests: RefCell<Vec<CarrierId>>,
}

impl MockPickupPoints {
    pub fn insert(&self, carrier: u64, response: FetchResult) {
        self.responses.borrow_mut().insert(carrier, response);
    }

    /// The next request for the carrier waits for the response
    /// that is sent through the returned channel.
    pub fn hold(&self, carrier: u64) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().insert(carrier, rx);
        tx
    }

    pub fn requests(&self) -> Vec<CarrierId> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PickupPointGateway for MockPickupPoints {
    async fn pickup_point(&self, carrier: CarrierId) -> FetchResult {
        self.requests.borrow_mut().push(carrier);
        let pending = self.pending.borrow_mut().remove(&carrier.get());
        if let Some(response) = pending {
            return response
                .await
                .unwrap_or_else(|_| Err(FetchError("request cancelled".into())));
        }
        self.responses
            .borrow()
            .get(&carrier.get())
            .cloned()
            .unwrap_or(Ok(None))
    }
}

/// A headless map library that can be told to fail.
#[derive(Default)]
pub struct MockMapLibrary {
    maps: HeadlessMapLibrary,
    failure: RefCell<Option<MapError>>,
}

impl MockMapLibrary {
    pub fn fail_with(&self, err: Option<MapError>) {
        self.failure.replace(err);
    }

    pub fn maps(&self) -> Vec<MapState> {
        self.maps.maps()
    }

    pub fn live_maps(&self) -> usize {
        self.maps.live_maps()
    }
}

impl MapLibrary for MockMapLibrary {
    fn create_map(
        &self,
        center: MapPoint,
        zoom: u8,
    ) -> std::result::Result<Rc<dyn MapHandle>, MapError> {
        if let Some(err) = self.failure.borrow().clone() {
            return Err(err);
        }
        self.maps.create_map(center, zoom)
    }
}

pub struct Harness {
    pool: RefCell<LocalPool>,
    pub runtime: Rc<MockRuntime>,
    pub document: Rc<HeadlessDocument>,
    pub maps: Rc<MockMapLibrary>,
    pub assets: Rc<MockAssetHost>,
    pub geocoder: Rc<MockGeocoder>,
    pub pickup_points: Rc<MockPickupPoints>,
    pub widget: Rc<PickupInfoWidget>,
    pub renderer: Rc<MapRenderer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_regions(Region::ALL)
    }

    pub fn with_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        let pool = LocalPool::new();
        let runtime = Rc::new(MockRuntime::new(pool.spawner()));
        let document = Rc::new(HeadlessDocument::with_regions(regions));
        let maps = Rc::new(MockMapLibrary::default());
        let assets = Rc::new(MockAssetHost::default());
        let geocoder = Rc::new(MockGeocoder::default());
        let pickup_points = Rc::new(MockPickupPoints::default());
        let ports = Ports {
            document: document.clone(),
            runtime: runtime.clone(),
            pickup_points: pickup_points.clone(),
            geocoder: geocoder.clone(),
            assets: assets.clone(),
            map_library: maps.clone(),
        };
        let widget = PickupInfoWidget::new(ports, Settings::default());
        let renderer = Rc::clone(widget.renderer());
        Self {
            pool: RefCell::new(pool),
            runtime,
            document,
            maps,
            assets,
            geocoder,
            pickup_points,
            widget,
            renderer,
        }
    }

    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.pool.borrow_mut().run_until(future)
    }

    /// Runs all spawned tasks until they are stuck.
    pub fn settle(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub fn advance(&self, duration: Duration) {
        self.runtime.advance(duration);
        self.settle();
    }

    pub fn trigger(&self, carrier_id: Option<&str>) -> Result<Rendered> {
        self.run(self.widget.handle_trigger(carrier_id))
    }
}
