//! Page load sequencing with in-memory loaders and modules

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use wavepanels::module::WASM_MAGIC;
use wavepanels::{
    content_ready, ContentReady, Error, LoadedModule, MemorySurfaces, ModuleLoader, ModuleSource,
    Page, PageConfig, PanelSpec, RenderModule, Result, RunConfig,
};

fn wasm_bytes() -> Vec<u8> {
    let mut b = WASM_MAGIC.to_vec();
    b.extend_from_slice(&1u32.to_le_bytes());
    b
}

/// Serves a fixed binary and remembers what it was asked for
#[derive(Default)]
struct FakeLoader {
    bytes: Option<Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl ModuleLoader for FakeLoader {
    fn load<'a>(&'a self, source: &'a ModuleSource) -> BoxFuture<'a, Result<LoadedModule>> {
        async move {
            self.requested.lock().unwrap().push(source.to_string());
            match &self.bytes {
                Some(b) => LoadedModule::from_bytes(source.clone(), b.clone()),
                None => Err(Error::ModuleInitError(format!("{} not found", source))),
            }
        }
        .boxed()
    }
}

#[derive(Default)]
struct RecordingModule {
    runs: Vec<RunConfig>,
}

impl RenderModule for RecordingModule {
    fn run(&mut self, _module: &LoadedModule, config: &RunConfig) -> Result<()> {
        self.runs.push(config.clone());
        Ok(())
    }
}

fn wave_page() -> Page<MemorySurfaces> {
    let config = PageConfig {
        panels: vec![
            PanelSpec::new("wave", 3.0, "#759203"),
            PanelSpec::new("missing", 2.0, "#000"),
        ],
        ..Default::default()
    };
    Page::new(config, MemorySurfaces::new().with_surface("wave", 600.0)).unwrap()
}

#[tokio::test]
async fn successful_load_hands_panels_to_module() {
    let mut page = wave_page();
    let loader = FakeLoader {
        bytes: Some(wasm_bytes()),
        ..Default::default()
    };
    let mut module = RecordingModule::default();

    let panels = page
        .start(ContentReady::immediate(), &loader, &mut module)
        .await
        .unwrap();

    assert_eq!(panels.len(), 1);
    assert_eq!(module.runs.len(), 1);
    let run = &module.runs[0];
    assert_eq!(run.bgcolor, "#222");
    assert_eq!(run.panels[0].id, "wave");
    assert_eq!(run.panels[0].width, 600.0);
    assert_eq!(run.panels[0].height, 200.0);

    // Sized once on content ready and again after the module came up.
    let wave = page.lookup().get("wave").unwrap();
    assert_eq!(wave.writes, 2);
    assert_eq!(wave.height, Some(200.0));
    assert_eq!(loader.requested.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn init_failure_is_reported_and_halts_handoff() {
    let mut page = wave_page();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    page.on_error(move |e| sink.lock().unwrap().push(e.to_string()));

    let loader = FakeLoader::default();
    let mut module = RecordingModule::default();
    let err = page
        .start(ContentReady::immediate(), &loader, &mut module)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ModuleInitError(_)));
    assert!(module.runs.is_empty());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("not found"));
    // Only the content-ready pass touched the surface.
    assert_eq!(page.lookup().get("wave").unwrap().writes, 1);
}

#[tokio::test]
async fn non_wasm_payload_is_an_init_failure() {
    let mut page = wave_page();
    let loader = FakeLoader {
        bytes: Some(b"<!DOCTYPE html>".to_vec()),
        ..Default::default()
    };
    let mut module = RecordingModule::default();
    let err = page
        .start(ContentReady::immediate(), &loader, &mut module)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ModuleInitError(_)));
    assert!(module.runs.is_empty());
}

#[tokio::test]
async fn waits_for_content_ready() {
    let mut page = wave_page();
    let loader = FakeLoader {
        bytes: Some(wasm_bytes()),
        ..Default::default()
    };
    let mut module = RecordingModule::default();
    let (signal, ready) = content_ready();

    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        signal.fire();
    });

    let panels = page.start(ready, &loader, &mut module).await.unwrap();
    assert_eq!(panels.len(), 1);
}

#[tokio::test]
async fn content_never_ready_skips_everything() {
    let mut page = wave_page();
    let loader = FakeLoader {
        bytes: Some(wasm_bytes()),
        ..Default::default()
    };
    let mut module = RecordingModule::default();
    let (signal, ready) = content_ready();
    drop(signal);

    let err = page.start(ready, &loader, &mut module).await.unwrap_err();
    assert!(matches!(err, Error::LoadError(_)));
    assert_eq!(page.lookup().total_writes(), 0);
    assert!(loader.requested.lock().unwrap().is_empty());
}
