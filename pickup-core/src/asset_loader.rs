//! Loads the map library into the page exactly once.

use std::{cell::RefCell, fmt, rc::Rc, time::Duration};

use futures::future::{FutureExt as _, LocalBoxFuture, Shared};

use crate::{
    gateways::{Asset, AssetHost, Runtime},
    LoadError,
};

const LEAFLET_CSS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_CSS_INTEGRITY: &str = "sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY=";
const LEAFLET_JS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_JS_INTEGRITY: &str = "sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    pub stylesheet: Asset,
    pub script: Asset,
    /// How long to wait for a load that was started by someone else.
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for AssetBundle {
    fn default() -> Self {
        Self {
            stylesheet: Asset {
                url: LEAFLET_CSS_URL.into(),
                integrity: Some(LEAFLET_CSS_INTEGRITY.into()),
            },
            script: Asset {
                url: LEAFLET_JS_URL.into(),
                integrity: Some(LEAFLET_JS_INTEGRITY.into()),
            },
            ready_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl AssetBundle {
    fn max_poll_attempts(&self) -> u128 {
        self.ready_timeout.as_millis() / self.poll_interval.as_millis().max(1)
    }
}

type SharedLoad = Shared<LocalBoxFuture<'static, Result<(), LoadError>>>;

enum LoadState {
    Idle,
    Loading(SharedLoad),
    Ready,
}

/// Cloning the loader shares its state.
#[derive(Clone)]
pub struct AssetLoader {
    host: Rc<dyn AssetHost>,
    runtime: Rc<dyn Runtime>,
    bundle: Rc<AssetBundle>,
    state: Rc<RefCell<LoadState>>,
}

impl fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            LoadState::Idle => "idle",
            LoadState::Loading(_) => "loading",
            LoadState::Ready => "ready",
        };
        f.debug_struct("AssetLoader")
            .field("bundle", &self.bundle)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl AssetLoader {
    pub fn new(host: Rc<dyn AssetHost>, runtime: Rc<dyn Runtime>, bundle: AssetBundle) -> Self {
        Self {
            host,
            runtime,
            bundle: Rc::new(bundle),
            state: Rc::new(RefCell::new(LoadState::Idle)),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Ready)
    }

    /// Resolves once the map library can be used.
    ///
    /// Concurrent callers share a single load. A failed load
    /// is not retried until the next call.
    pub async fn ensure_ready(&self) -> Result<(), LoadError> {
        let load = {
            let mut state = self.state.borrow_mut();
            match &*state {
                LoadState::Ready => return Ok(()),
                LoadState::Loading(load) => load.clone(),
                LoadState::Idle => {
                    if self.host.is_ready() {
                        log::debug!("Map library is already available");
                        *state = LoadState::Ready;
                        return Ok(());
                    }
                    let load = self.load().shared();
                    *state = LoadState::Loading(load.clone());
                    load
                }
            }
        };
        let result = load.clone().await;
        self.settle(&load, &result);
        result
    }

    fn settle(&self, load: &SharedLoad, result: &Result<(), LoadError>) {
        let mut state = self.state.borrow_mut();
        let LoadState::Loading(current) = &*state else {
            return;
        };
        if !current.ptr_eq(load) {
            return;
        }
        *state = match result {
            Ok(()) => {
                log::info!("Loaded map library");
                LoadState::Ready
            }
            Err(err) => {
                log::warn!("{err}");
                LoadState::Idle
            }
        };
    }

    fn load(&self) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        let host = Rc::clone(&self.host);
        let runtime = Rc::clone(&self.runtime);
        let bundle = Rc::clone(&self.bundle);
        async move {
            if host.is_loading() {
                log::debug!("Map library is being loaded elsewhere");
                return wait_until_ready(&*host, &*runtime, &bundle).await;
            }
            log::debug!(
                "Loading map library from {} and {}",
                bundle.stylesheet.url,
                bundle.script.url
            );
            let (stylesheet, script) = futures::join!(
                host.attach_stylesheet(&bundle.stylesheet),
                host.attach_script(&bundle.script)
            );
            stylesheet?;
            script?;
            if host.is_ready() {
                Ok(())
            } else {
                Err(LoadError::Failed(format!(
                    "{} has been loaded but the library is not available",
                    bundle.script.url
                )))
            }
        }
        .boxed_local()
    }
}

async fn wait_until_ready(
    host: &dyn AssetHost,
    runtime: &dyn Runtime,
    bundle: &AssetBundle,
) -> Result<(), LoadError> {
    for _ in 0..bundle.max_poll_attempts() {
        if host.is_ready() {
            return Ok(());
        }
        runtime.sleep(bundle.poll_interval).await;
    }
    if host.is_ready() {
        Ok(())
    } else {
        Err(LoadError::Timeout(bundle.ready_timeout))
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::tests::{MockAssetHost, MockRuntime};

    fn loader(host: &Rc<MockAssetHost>, runtime: &Rc<MockRuntime>) -> AssetLoader {
        AssetLoader::new(host.clone(), runtime.clone(), AssetBundle::default())
    }

    #[test]
    fn default_bundle_is_leaflet_with_integrity() {
        let bundle = AssetBundle::default();
        assert!(bundle.stylesheet.url.ends_with("leaflet@1.9.4/dist/leaflet.css"));
        assert!(bundle.script.url.ends_with("leaflet@1.9.4/dist/leaflet.js"));
        assert!(bundle.stylesheet.integrity.as_deref().unwrap().starts_with("sha256-"));
        assert!(bundle.script.integrity.as_deref().unwrap().starts_with("sha256-"));
        assert_eq!(bundle.max_poll_attempts(), 100);
    }

    #[test]
    fn skip_loading_if_library_is_present() {
        let host = Rc::new(MockAssetHost::default());
        host.ready.set(true);
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        assert_eq!(block_on(assets.ensure_ready()), Ok(()));
        assert!(assets.is_ready());
        assert_eq!(host.attached_stylesheets.get(), 0);
        assert_eq!(host.attached_scripts.get(), 0);
    }

    #[test]
    fn concurrent_calls_share_one_load() {
        let host = Rc::new(MockAssetHost::default());
        let gate = host.gate();
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        let first = assets.ensure_ready();
        let second = assets.ensure_ready();
        let third = assets.clone();
        let third = third.ensure_ready();
        let (a, b, c) = block_on(async {
            let release = async {
                gate.send(()).ok();
            };
            let (a, b, c, ()) = futures::join!(first, second, third, release);
            (a, b, c)
        });
        assert_eq!((a, b, c), (Ok(()), Ok(()), Ok(())));
        assert_eq!(host.attached_stylesheets.get(), 1);
        assert_eq!(host.attached_scripts.get(), 1);
        assert!(assets.is_ready());

        // Ready for the rest of the process lifetime
        assert_eq!(block_on(assets.ensure_ready()), Ok(()));
        assert_eq!(host.attached_scripts.get(), 1);
    }

    #[test]
    fn wait_for_load_started_elsewhere() {
        let host = Rc::new(MockAssetHost::default());
        host.loading.set(true);
        host.ready_after_polls.set(Some(5));
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        assert_eq!(block_on(assets.ensure_ready()), Ok(()));
        assert_eq!(host.attached_scripts.get(), 0);
        assert_eq!(runtime.slept(), Duration::from_millis(400));
    }

    #[test]
    fn time_out_waiting_for_load_started_elsewhere() {
        let host = Rc::new(MockAssetHost::default());
        host.loading.set(true);
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        assert_eq!(
            block_on(assets.ensure_ready()),
            Err(LoadError::Timeout(Duration::from_secs(10)))
        );
        assert_eq!(runtime.slept(), Duration::from_secs(10));
        assert!(!assets.is_ready());
    }

    #[test]
    fn fail_if_an_asset_fails() {
        let host = Rc::new(MockAssetHost::default());
        host.script_error.replace(Some("404 Not Found".into()));
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        let err = block_on(assets.ensure_ready()).unwrap_err();
        assert!(matches!(err, LoadError::Failed(ref msg) if msg.contains("404 Not Found")));
        assert!(!assets.is_ready());

        let host = Rc::new(MockAssetHost::default());
        host.stylesheet_error.replace(Some("blocked".into()));
        let assets = loader(&host, &runtime);
        assert!(matches!(
            block_on(assets.ensure_ready()),
            Err(LoadError::Failed(_))
        ));
    }

    #[test]
    fn fail_if_library_is_unusable_after_load() {
        let host = Rc::new(MockAssetHost::default());
        host.broken_after_load.set(true);
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        assert!(matches!(
            block_on(assets.ensure_ready()),
            Err(LoadError::Failed(_))
        ));
    }

    #[test]
    fn retry_after_failed_load() {
        let host = Rc::new(MockAssetHost::default());
        host.script_error.replace(Some("offline".into()));
        let runtime = Rc::new(MockRuntime::default());
        let assets = loader(&host, &runtime);
        assert!(block_on(assets.ensure_ready()).is_err());
        assert_eq!(host.attached_scripts.get(), 1);

        host.script_error.replace(None);
        assert_eq!(block_on(assets.ensure_ready()), Ok(()));
        assert_eq!(host.attached_scripts.get(), 2);
        assert!(assets.is_ready());
    }
}
