//! In-memory transport and sleeper for tests

use std::cell::RefCell;
use std::time::Duration;

use serde_json::{json, Value};

use super::retry::Sleeper;
use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::error::EtlResult;

type Handler = Box<dyn Fn(&ApiRequest) -> EtlResult<ApiResponse>>;

/// Answers requests with a closure and records every request it sees
pub struct FakeTransport {
    handler: Handler,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> EtlResult<ApiResponse> + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, endpoint: &str) -> Vec<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl HttpTransport for FakeTransport {
    fn get(&self, request: &ApiRequest) -> EtlResult<ApiResponse> {
        self.requests.borrow_mut().push(request.clone());
        (self.handler)(request)
    }
}

/// Records requested delays instead of sleeping
#[derive(Default)]
pub struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

/// A 200 response wrapping items the way the API does
pub fn items_response(items: Vec<Value>) -> ApiResponse {
    ApiResponse::new(200, json!({ "data": { "items": items } }).to_string())
}

/// A raw ledger entry with the fields the API sends
pub fn ledger_item(cuenta: &str, credito: i64, debito: i64, detalles: &str, asiento: i64) -> Value {
    json!({
        "cuenta": cuenta,
        "credito": credito,
        "debito": debito,
        "detalles": detalles,
        "fecha_contabilizacion_humana": "15/01/2024",
        "numero_asiento": asiento,
        "contraparte": "Proveedor Uno",
    })
}

/// A chart-of-accounts item
pub fn plan_item(codigo: &str, nombre: &str, nivel: u8) -> Value {
    json!({ "codigo": codigo, "nombre": nombre, "nivel": nivel })
}
