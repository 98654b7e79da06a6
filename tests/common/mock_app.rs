use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use time::OffsetDateTime;

use gridmeter::app::build_router;
use gridmeter::configs::schema::SchemaManager;
use gridmeter::configs::settings::Database;
use gridmeter::configs::storage::Storage;
use gridmeter::models::Device;

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = Arc::new(
            Storage::new(
                Database {
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );

        let router = build_router(storage.clone());

        Self { storage, router }
    }

    pub async fn create_test_device(&self, serial: &str, device_type: &str) -> Device {
        sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (serial_number, device_type, status, last_report_time)
                VALUES ($1, $2, 'ACTIVE', $3)
                RETURNING *;
            "#,
        )
        .bind(serial)
        .bind(device_type)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.storage.get_pool())
        .await
        .unwrap()
    }

    pub async fn create_test_reading(
        &self,
        device_id: i64,
        value: f64,
        timestamp: OffsetDateTime,
    ) -> i64 {
        sqlx::query(
            r#"
            INSERT INTO energy_data (device_id, energy_consumed, timestamp)
                VALUES ($1, $2, $3);
            "#,
        )
        .bind(device_id)
        .bind(value)
        .bind(timestamp)
        .execute(self.storage.get_pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).unwrap()
}
