//! Main entry point for the apiary back office.
//!
//! Connects the store and the message bus, then runs the HTTP API, the gRPC
//! facade, the bus consumers and the snapshot cache side by side until a
//! signal arrives or one of them fails.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use apiary_bus::{AmqpPublisher, BusWorker, Reconciler};
use apiary_cache::{CacheWorker, KvStore, MokaKvStore};
use apiary_persistence::ExternalDbPersistService;
use apiary_server::{
    grpc::GrpcAuth,
    metrics,
    middleware::{RateLimiter, rate_limit},
    model::{AppState, Configuration},
    startup::{self, Supervisor},
};
use lapin::{Connection, ConnectionProperties};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::new()?;
    configuration.validate()?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let prometheus = metrics::install_prometheus()?;
    metrics::init_metrics();

    info!(
        env = %configuration.app_env(),
        "Starting apiary server"
    );

    let shutdown = CancellationToken::new();
    let signal_handle = startup::spawn_signal_listener(shutdown.clone());
    let supervisor = Supervisor::new(shutdown.clone());
    let shutdown_timeout = configuration.shutdown_timeout();

    // Store: connect, then apply the schema before anything reads from it
    let Some(db) = startup::run_with_shutdown(configuration.database_connection(), &shutdown)
        .await
        .transpose()?
    else {
        return Ok(());
    };
    if startup::run_with_shutdown(apiary_migration::run_migrations(&db), &shutdown)
        .await
        .transpose()
        .context("Failed to apply database schema")?
        .is_none()
    {
        return Ok(());
    }
    info!("Database schema is up to date");
    let store = Arc::new(ExternalDbPersistService::new(db));

    // Message bus
    let amqp = Arc::new(
        Connection::connect(&configuration.amqp_url(), ConnectionProperties::default())
            .await
            .context("Failed to connect to message bus")?,
    );
    let publisher = Arc::new(
        AmqpPublisher::new(&amqp)
            .await
            .context("Failed to open bus publisher")?,
    );
    info!("Connected to message bus");

    let app_state = Arc::new(
        AppState::new(configuration.clone(), store.clone(), publisher.clone())
            .with_prometheus(prometheus),
    );

    // Workers stop after the servers have drained
    let workers = CancellationToken::new();

    // HTTP API
    let rate_limiter = RateLimiter::new(configuration.rate_limit_config());
    let cleanup_handle = rate_limit::start_cleanup_task(rate_limiter.state(), workers.clone());

    let server_address = configuration.server_address();
    let http_port = configuration.http_port();
    info!("Starting HTTP server on {}:{}", server_address, http_port);
    let http_server = startup::http_server(
        app_state.clone(),
        rate_limiter,
        server_address.clone(),
        http_port,
        shutdown_timeout,
    )?;
    let http_handle = http_server.handle();
    let http_task = actix_web::rt::spawn(
        supervisor.watch("HTTP server", async move { Ok(http_server.await?) }),
    );

    // gRPC facade
    let grpc_addr: SocketAddr = format!("{}:{}", server_address, configuration.grpc_port())
        .parse()
        .context("Invalid gRPC listen address")?;
    let grpc_auth = if configuration.grpc_auth_enabled() {
        GrpcAuth::enabled(&configuration.token_secret_key())
    } else {
        GrpcAuth::disabled()
    };
    let grpc_task = tokio::spawn(supervisor.watch(
        "gRPC server",
        startup::serve_grpc(store.clone(), grpc_auth, grpc_addr, shutdown.clone()),
    ));

    // Bus consumers
    let bus_worker = BusWorker::new(amqp.clone(), Reconciler::new(store.clone()));
    let bus_token = workers.clone();
    let bus_task = tokio::spawn(supervisor.watch("bus worker", async move {
        Ok(bus_worker.run(bus_token).await?)
    }));

    // Snapshot cache
    let cache_task = if configuration.cache_enabled() {
        let kv: Arc<dyn KvStore> = Arc::new(MokaKvStore::new(configuration.cache_capacity()));
        let (cache_worker, mut cache_errors) =
            CacheWorker::new(store.clone(), kv, configuration.cache_settings());
        tokio::spawn(async move {
            while let Some(e) = cache_errors.recv().await {
                warn!("Cache worker error: {}", e);
            }
        });
        Some(tokio::spawn(
            supervisor.watch("cache worker", cache_worker.run(workers.clone())),
        ))
    } else {
        info!("Snapshot cache is disabled");
        None
    };

    shutdown.cancelled().await;
    let deadline = Instant::now() + shutdown_timeout;
    info!("Shutting down, waiting up to {:?}...", shutdown_timeout);

    startup::drain(
        "HTTP server",
        async {
            http_handle.stop(true).await;
            let _ = http_task.await;
        },
        deadline,
    )
    .await;
    startup::drain(
        "gRPC server",
        async {
            let _ = grpc_task.await;
        },
        deadline,
    )
    .await;

    workers.cancel();
    startup::drain(
        "Bus worker",
        async {
            let _ = bus_task.await;
        },
        deadline,
    )
    .await;
    if let Some(cache_task) = cache_task {
        startup::drain(
            "Cache worker",
            async {
                let _ = cache_task.await;
            },
            deadline,
        )
        .await;
    }
    startup::drain(
        "Rate limiter cleanup",
        async {
            let _ = cleanup_handle.await;
        },
        deadline,
    )
    .await;

    if let Err(e) = publisher.close().await {
        warn!("Failed to close bus publisher: {}", e);
    }
    if let Err(e) = amqp.close(200, "shutdown").await {
        warn!("Failed to close bus connection: {}", e);
    }

    // The store client goes last, once every task holding it has finished
    drop(app_state);
    match Arc::try_unwrap(store) {
        Ok(store) => {
            if let Err(e) = store.into_db().close().await {
                warn!("Failed to close database connection: {}", e);
            }
        }
        Err(_) => warn!("Database pool still in use after shutdown, dropping it"),
    }
    signal_handle.abort();

    if let Some(failure) = supervisor.failure() {
        error!("Apiary server stopped after a failure");
        anyhow::bail!("{}", failure);
    }

    info!("Apiary server shutdown complete");
    Ok(())
}
