#![cfg(feature = "fetch")]

use tiny_http::{Response, Server};
use url::Url;
use wavepanels::module::WASM_MAGIC;
use wavepanels::{Error, ModuleLoader, ModuleSource, WasmLoader};

/// Serve `/m.wasm` with a minimal wasm header; everything else is a 404.
fn start_module_server() -> Url {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let response = if request.url() == "/wasm/m.wasm" {
                let mut body = WASM_MAGIC.to_vec();
                body.extend_from_slice(&1u32.to_le_bytes());
                Response::from_data(body)
            } else {
                Response::from_data(b"Not Found".to_vec()).with_status_code(404)
            };
            let _ = request.respond(response);
        }
    });

    Url::parse(&format!("http://{}/", addr)).unwrap()
}

#[tokio::test]
async fn fetches_module_relative_to_base_url() {
    let base = start_module_server();
    let source = ModuleSource::resolve("wasm/m.wasm", Some(&base)).unwrap();
    assert!(matches!(source, ModuleSource::Url(_)));

    let loader = WasmLoader::new(5000).unwrap();
    let module = loader.load(&source).await.expect("module loads");
    assert_eq!(module.version, 1);
    assert_eq!(
        module.digest,
        "93a44bbb96c751218e4c00d479e4c14358122a389acca16205b1e4d0dc5f9476"
    );
}

#[tokio::test]
async fn http_404_is_an_init_error() {
    let base = start_module_server();
    let source = ModuleSource::resolve("wasm/missing.wasm", Some(&base)).unwrap();

    let loader = WasmLoader::new(5000).unwrap();
    let err = loader.load(&source).await.unwrap_err();
    assert!(matches!(err, Error::ModuleInitError(_)));
}
