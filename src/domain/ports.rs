//! Backend port consumed by the application services

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::charge_point::Evse;
use crate::domain::location::Location;
use crate::domain::receipt::ReceiptData;
use crate::domain::session::{CheckoutCreated, CheckoutRequest, Session};
use crate::domain::tariff::Tariff;
use crate::shared::errors::ApiResult;

/// REST operations of the charging backend, abstracted so flow logic can
/// be driven by scripted fakes in tests.
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// `GET evses/{evse_id}` by the public EVSE identifier.
    async fn get_evse(&self, evse_id: &str) -> ApiResult<Evse>;

    /// `GET locations/{id}`.
    async fn get_location(&self, id: i64) -> ApiResult<Location>;

    /// `GET tariffs/{id}`.
    async fn get_tariff(&self, id: i64) -> ApiResult<Tariff>;

    /// `POST checkouts/`: create a payment checkout.
    async fn create_checkout(&self, request: &CheckoutRequest) -> ApiResult<CheckoutCreated>;

    /// `GET checkouts/{id}`: poll one session snapshot.
    async fn get_session(&self, session_id: i64) -> ApiResult<Session>;

    /// `GET receipts/{id}`: fetch the receipt of a closed session.
    async fn get_receipt(&self, session_id: i64) -> ApiResult<ReceiptData>;
}

pub type SharedCheckoutApi = Arc<dyn CheckoutApi>;
