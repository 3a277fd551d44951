use std::{future::Future, io::Result as IoResult, sync::Arc};

use content::{ContentPresentationFactory, DocumentPatcher, MemoryContentStore};
use poem::{
    endpoint::make_sync,
    get,
    listener::TcpListener,
    middleware::{NormalizePath, TrailingSlash},
    Endpoint, EndpointExt, Route, Server,
};

use crate::{
    error::ServerError,
    handler_content::{handler_get, handler_patch},
    handler_migrations::handler_migrations,
    startup::{load_content, migrate},
    state::State,
    ServerConfig,
};

/// Migrates the schema, then returns the server future.
///
/// A failed migration is returned as an error so that nothing is served
/// from a partially migrated schema.
pub fn create_server(
    config: ServerConfig,
) -> Result<impl Future<Output = IoResult<()>>, ServerError> {
    let migrated = migrate(config.data_dir.as_deref())?;

    let items = match &config.content {
        Some(path) => load_content(path)?,
        None => Vec::new(),
    };
    let store = Arc::new(MemoryContentStore::new(items));
    let patcher = DocumentPatcher::new(store.clone(), Arc::new(ContentPresentationFactory));

    let app = routes(State {
        store,
        patcher: Arc::new(patcher),
        install: Arc::new(migrated.install),
        entries: Arc::new(migrated.entries),
        last_run: Arc::new(migrated.report),
    });

    tracing::info!(bind = config.bind.as_str(), "listening");
    let server = Server::new(TcpListener::bind(config.bind));
    Ok(server.run(app))
}

pub(crate) fn routes(state: State) -> impl Endpoint {
    Route::new()
        .at("/content/:key", get(handler_get).patch(handler_patch))
        .at("/migrations", get(handler_migrations))
        .at("/health", get(make_sync(|_| "OK")))
        .with(NormalizePath::new(TrailingSlash::Trim))
        .data(state)
}
