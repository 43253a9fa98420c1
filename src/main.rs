use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use asset_ledger::config::{BlobConfig, Config};
use asset_ledger::db::create_pool;
use asset_ledger::ledger::Ledger;
use asset_ledger::middleware::AuthInterceptor;
use asset_ledger::proto::evidence::evidence_service_server::EvidenceServiceServer;
use asset_ledger::proto::health::health_server::HealthServer;
use asset_ledger::proto::inventory::inventory_service_server::InventoryServiceServer;
use asset_ledger::proto::loans::loan_service_server::LoanServiceServer;
use asset_ledger::proto::sync::sync_service_server::SyncServiceServer;
use asset_ledger::services::{
    EvidenceServiceImpl, HealthServiceImpl, InventoryServiceImpl, LoanServiceImpl,
    SyncServiceImpl,
};
use asset_ledger::storage::{GcsBackend, LocalBackend, R2Backend, StorageBackend};
use asset_ledger::store::{LedgerStore, MemoryLedgerStore, PgLedgerStore};

use tonic::transport::Server;
use tonic_reflection::server::Builder as ReflectionBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Include file descriptor for gRPC reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("ledger_descriptor");

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(url, config.db_max_connections)
                .await
                .context("failed to connect to database")?;
            let store = PgLedgerStore::new(pool);
            store.migrate().await.context("failed to run migrations")?;
            tracing::info!("Database connection established, migrations applied");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryLedgerStore::new()))
        }
    }
}

async fn open_blobs(config: &BlobConfig) -> anyhow::Result<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match config {
        BlobConfig::Local { root } => {
            tracing::info!("Local blob storage: {}", root.display());
            Arc::new(LocalBackend::new(root.clone()))
        }
        BlobConfig::Gcs { bucket } => {
            tracing::info!("GCS storage enabled: bucket={}", bucket);
            Arc::new(GcsBackend::new(bucket.clone()).await?)
        }
        BlobConfig::R2 {
            bucket,
            account_id,
            access_key,
            secret_key,
        } => {
            tracing::info!("R2 storage enabled: bucket={}", bucket);
            Arc::new(R2Backend::new(
                bucket.clone(),
                account_id.clone(),
                access_key.clone(),
                secret_key.clone(),
            )?)
        }
    };
    Ok(backend)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!("Starting asset-ledger gRPC server...");

    let store = open_store(&config).await?;
    let blobs = open_blobs(&config.blob).await?;
    tracing::info!("Blob storage ready: {}", blobs.bucket());
    let ledger = Ledger::new(store, blobs);
    let auth = AuthInterceptor::new(&config.jwt_secret);

    // CORS layer for gRPC-Web
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers(Any);

    let reflection_service = ReflectionBuilder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!("Listening on {}", addr);

    // Health and reflection stay public; every ledger service needs a token.
    Server::builder()
        .accept_http1(true) // Required for gRPC-Web
        .layer(TraceLayer::new_for_grpc())
        .layer(cors)
        .layer(tonic_web::GrpcWebLayer::new())
        .add_service(reflection_service)
        .add_service(HealthServer::new(HealthServiceImpl::new()))
        .add_service(InventoryServiceServer::with_interceptor(
            InventoryServiceImpl::new(ledger.clone()),
            auth.clone(),
        ))
        .add_service(LoanServiceServer::with_interceptor(
            LoanServiceImpl::new(ledger.clone()),
            auth.clone(),
        ))
        .add_service(EvidenceServiceServer::with_interceptor(
            EvidenceServiceImpl::new(ledger.clone()),
            auth.clone(),
        ))
        .add_service(SyncServiceServer::with_interceptor(
            SyncServiceImpl::new(ledger),
            auth,
        ))
        .serve(addr)
        .await?;

    Ok(())
}
