use crate::api::{RegistryGateway, RegistryHandler};
use crate::conf::SupervisorConfig;
use crate::filter::{FilterStore, SnapshotFile};
use crate::server::SnapshotSaver;
use crate::server::pid;
use anyhow::{Context, Error, Result};
use pingora::prelude::*;
use pingora::server::Server;
use pingora::server::configuration::ServerConf;
use std::sync::Arc;

/// Run the supervisor until it is signalled to stop.
pub fn run(config: SupervisorConfig) -> Result<()> {
    use tokio::runtime::Builder;

    // Attempt to write pid file (best-effort)
    if let Some(pid_file) = &config.server.pid_file {
        if let Err(e) = pid::write_pid(pid_file) {
            tracing::warn!(error = %e, pid_file, "failed to write pid file; continuing");
        } else {
            tracing::info!(pid_file, "pid file written");
        }
    }

    let store = Arc::new(load_store(&config)?);

    let saver = config
        .store
        .snapshot_path
        .as_ref()
        .map(|path| Arc::new(SnapshotSaver::new(SnapshotFile::new(path), store.clone())));

    // Control-plane runtime (snapshot loop only)
    let control_rt = Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to build control-plane Tokio runtime")?;

    if let Some(saver) = &saver {
        control_rt.spawn(saver.clone().run(config.store.snapshot_interval()));
    }

    let server = build_pingora_server(&config, store)?;

    // The `termination` feature routes SIGTERM and SIGHUP here as well as SIGINT.
    let pid_file = config.server.pid_file.clone();
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        shutdown(saver.as_deref(), pid_file.as_deref());
        std::process::exit(0);
    })?;

    tracing::info!(listen = %config.server.listen, "supervisor starting");

    // control_rt must stay in scope so the snapshot loop keeps running.
    server.run_forever();
}

/// Write the final snapshot and remove the pid file. Failures are logged.
pub fn shutdown(saver: Option<&SnapshotSaver>, pid_file: Option<&str>) {
    if let Some(saver) = saver {
        match saver.save() {
            Ok(count) => tracing::info!(filters = count, "final snapshot written"),
            Err(e) => tracing::error!(error = %e, "final snapshot failed"),
        }
    }
    if let Some(pid_file) = pid_file {
        pid::remove_pid(pid_file);
    }
}

/// Seed the registry from the snapshot file, if one is configured.
pub fn load_store(config: &SupervisorConfig) -> Result<FilterStore> {
    let Some(path) = &config.store.snapshot_path else {
        return Ok(FilterStore::new());
    };

    let filters = SnapshotFile::new(path)
        .load()
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), filters = filters.len(), "registry restored");

    Ok(FilterStore::from_filters(filters))
}

/// Build the Pingora server with the registry gateway as its only service.
pub fn build_pingora_server(
    config: &SupervisorConfig,
    store: Arc<FilterStore>,
) -> Result<Server, Error> {
    let mut server = if let Some(threads) = config.server.threads {
        tracing::debug!(
            threads,
            "Creating Pingora server with overridden worker threads"
        );
        let mut conf =
            ServerConf::new().context("Could not construct pingora server configuration")?;
        conf.threads = threads;
        Server::new_with_opt_and_conf(None, conf)
    } else {
        // "None" is required here to truly tell Pingora to use its default settings.
        Server::new(None)?
    };

    server.bootstrap();

    let handler = RegistryHandler::new(store, config.auth.clone());
    let gateway = RegistryGateway::new(handler);

    let mut svc = http_proxy_service(&server.configuration, gateway);
    svc.add_tcp(&config.server.listen);
    server.add_service(svc);

    Ok(server)
}
