use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::{device_router, reading_router, DeviceState, ReadingState};
use crate::repositories::{DeviceRepository, EnergyDataRepository};
use crate::services::{DeviceService, EnergyDataService};

pub async fn create_app(settings: &Arc<Settings>) -> Router {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .unwrap(),
    );

    build_router(storage)
}

pub fn build_router(storage: Arc<Storage>) -> Router {
    let device_repository = Arc::new(DeviceRepository::new(storage.clone()));
    let energy_data_repository = Arc::new(EnergyDataRepository::new(storage.clone()));

    let device_service = Arc::new(DeviceService::new(
        device_repository.clone(),
        energy_data_repository.clone(),
    ));
    let energy_data_service = Arc::new(EnergyDataService::new(
        energy_data_repository,
        device_repository,
    ));

    Router::new()
        .merge(device_router(DeviceState { device_service }))
        .merge(reading_router(ReadingState { energy_data_service }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
