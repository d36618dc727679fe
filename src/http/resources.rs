//! Demo catalog API.
//!
//! Cars link to their manufacturer and dealer through `<name>_url`
//! properties, so `GET /api/cars?include=manufacturer,dealer` exercises the
//! include middleware against this same server.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
pub struct Car {
    pub id: u32,
    pub name: String,
    pub manufacturer_id: String,
    pub manufacturer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dealer {
    pub id: String,
    pub name: String,
    pub city: String,
}

/// In-memory catalog served by the demo API.
#[derive(Debug, Clone)]
pub struct Catalog {
    cars: Vec<Car>,
    manufacturers: Vec<Manufacturer>,
    dealers: Vec<Dealer>,
}

impl Catalog {
    /// Seed data whose links point at `base_url`.
    pub fn demo(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let car = |id: u32, name: &str, manufacturer: &str, dealer: Option<&str>| Car {
            id,
            name: name.to_string(),
            manufacturer_id: manufacturer.to_string(),
            manufacturer_url: format!("{base}/api/manufacturers/{manufacturer}"),
            dealer_url: dealer.map(|d| format!("{base}/api/dealers/{d}")),
        };

        Self {
            cars: vec![
                car(1, "Model S", "tesla", Some("downtown")),
                car(2, "Leaf", "nissan", None),
                car(3, "Model 3", "tesla", Some("airport")),
            ],
            manufacturers: vec![
                Manufacturer {
                    id: "tesla".into(),
                    name: "Tesla".into(),
                    country: "US".into(),
                },
                Manufacturer {
                    id: "nissan".into(),
                    name: "Nissan".into(),
                    country: "JP".into(),
                },
            ],
            dealers: vec![
                Dealer {
                    id: "downtown".into(),
                    name: "Downtown Motors".into(),
                    city: "Oslo".into(),
                },
                Dealer {
                    id: "airport".into(),
                    name: "Airport Cars".into(),
                    city: "Gardermoen".into(),
                },
            ],
        }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: u32) -> Option<&Car> {
        self.cars.iter().find(|c| c.id == id)
    }

    pub fn manufacturer(&self, id: &str) -> Option<&Manufacturer> {
        self.manufacturers.iter().find(|m| m.id == id)
    }

    pub fn dealer(&self, id: &str) -> Option<&Dealer> {
        self.dealers.iter().find(|d| d.id == id)
    }
}

/// Routes of the demo catalog.
pub fn routes(catalog: Arc<Catalog>) -> Router {
    Router::new()
        .route("/api/cars", get(list_cars))
        .route("/api/cars/{id}", get(get_car))
        .route("/api/manufacturers/{id}", get(get_manufacturer))
        .route("/api/dealers/{id}", get(get_dealer))
        .with_state(catalog)
}

async fn list_cars(State(catalog): State<Arc<Catalog>>) -> Json<Vec<Car>> {
    Json(catalog.cars().to_vec())
}

async fn get_car(State(catalog): State<Arc<Catalog>>, Path(id): Path<u32>) -> Response {
    match catalog.car(id) {
        Some(car) => (StatusCode::OK, Json(car.clone())).into_response(),
        None => not_found("car"),
    }
}

async fn get_manufacturer(State(catalog): State<Arc<Catalog>>, Path(id): Path<String>) -> Response {
    match catalog.manufacturer(&id) {
        Some(m) => Json(m.clone()).into_response(),
        None => not_found("manufacturer"),
    }
}

async fn get_dealer(State(catalog): State<Arc<Catalog>>, Path(id): Path<String>) -> Response {
    match catalog.dealer(&id) {
        Some(d) => Json(d.clone()).into_response(),
        None => not_found("dealer"),
    }
}

fn not_found(kind: &str) -> Response {
    let body = json!({"code": "NotFound", "message": format!("{kind} not found")});
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_links_use_base_url() {
        let catalog = Catalog::demo("http://api.example.com/");
        let car = catalog.car(1).unwrap();
        assert_eq!(car.manufacturer_url, "http://api.example.com/api/manufacturers/tesla");
        assert_eq!(
            car.dealer_url.as_deref(),
            Some("http://api.example.com/api/dealers/downtown")
        );
        assert!(catalog.car(2).unwrap().dealer_url.is_none());
    }

    #[test]
    fn every_link_resolves() {
        let catalog = Catalog::demo("http://localhost");
        for car in catalog.cars() {
            assert!(catalog.manufacturer(&car.manufacturer_id).is_some());
            if let Some(url) = &car.dealer_url {
                let id = url.rsplit('/').next().unwrap();
                assert!(catalog.dealer(id).is_some());
            }
        }
    }
}
