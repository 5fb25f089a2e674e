//! Page bootstrap: wait for content, size panels, start the module
//!
//! The order of events mirrors a browser page load. Panels are sized as soon
//! as the page content is ready, then the module is initialized, and once it
//! is up the panels are measured again and handed over. A module that fails
//! to initialize is reported to the log and to the registered error sink, and
//! nothing is handed off. There is no retry.

use std::sync::Arc;

use log::{error, info};
use tokio::sync::oneshot;
use url::Url;

use crate::builder::{PanelConfig, PanelConfigBuilder};
use crate::config::PageConfig;
use crate::handoff::{RenderModule, RunConfig};
use crate::module::{LoadedModule, ModuleLoader, ModuleSource, DEFAULT_MODULE_PATH};
use crate::surface::SurfaceLookup;
use crate::{Error, Result};

type OnErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// Fires the content-ready event
pub struct ReadySignal(oneshot::Sender<()>);

impl ReadySignal {
    pub fn fire(self) {
        let _ = self.0.send(());
    }
}

/// Resolves once the page's structural content is ready
pub struct ContentReady(oneshot::Receiver<()>);

impl ContentReady {
    /// Already-ready content, for pages that are fully parsed up front
    pub fn immediate() -> Self {
        let (signal, ready) = content_ready();
        signal.fire();
        ready
    }

    pub async fn wait(self) -> Result<()> {
        self.0
            .await
            .map_err(|_| Error::LoadError("page content never became ready".into()))
    }
}

/// A connected content-ready signal and its receiver
pub fn content_ready() -> (ReadySignal, ContentReady) {
    let (tx, rx) = oneshot::channel();
    (ReadySignal(tx), ContentReady(rx))
}

/// One page load: a validated config plus the surfaces it sizes
pub struct Page<L: SurfaceLookup> {
    config: PageConfig,
    lookup: L,
    base_url: Option<Url>,
    on_error: Option<OnErrorHandler>,
}

impl<L: SurfaceLookup> Page<L> {
    pub fn new(config: PageConfig, lookup: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lookup,
            base_url: None,
            on_error: None,
        })
    }

    /// Resolve relative module locations against `url`.
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Register a sink for module initialization failures.
    pub fn on_error<F>(&mut self, cb: F)
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(cb));
    }

    pub fn clear_on_error(&mut self) {
        self.on_error = None;
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn into_lookup(self) -> L {
        self.lookup
    }

    pub fn module_source(&self) -> Result<ModuleSource> {
        let location = self.config.module_location().unwrap_or(DEFAULT_MODULE_PATH);
        ModuleSource::resolve(location, self.base_url.as_ref())
    }

    /// Run one sizing pass over the page's surfaces.
    pub fn measure(&mut self) -> Result<Vec<PanelConfig>> {
        PanelConfigBuilder::new(&self.config).build(&mut self.lookup)
    }

    /// Drive the page load to the module handoff and return the panels that
    /// were handed over.
    pub async fn start(
        &mut self,
        ready: ContentReady,
        loader: &dyn ModuleLoader,
        module: &mut dyn RenderModule,
    ) -> Result<Vec<PanelConfig>> {
        ready.wait().await?;
        let sized = self.measure()?;
        info!("content ready, sized {} panel(s)", sized.len());

        let loaded = match self.init_module(loader).await {
            Ok(m) => m,
            Err(err) => {
                error!("{}", err);
                if let Some(cb) = &self.on_error {
                    cb(&err);
                }
                return Err(err);
            }
        };
        info!(
            "module {} ready (wasm v{}, sha256 {})",
            loaded.source,
            loaded.version,
            loaded.short_digest()
        );

        let panels = self.measure()?;
        let run = RunConfig::new(self.config.bgcolor.clone(), &panels);
        module.run(&loaded, &run)?;
        Ok(panels)
    }

    async fn init_module(&self, loader: &dyn ModuleLoader) -> Result<LoadedModule> {
        let source = self.module_source().map_err(into_init_error)?;
        loader.load(&source).await.map_err(into_init_error)
    }
}

fn into_init_error(err: Error) -> Error {
    match err {
        Error::ModuleInitError(_) => err,
        other => Error::ModuleInitError(other.to_string()),
    }
}
