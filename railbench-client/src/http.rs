//! reqwest implementation of the service client

use crate::errors::{classify_transport_error, undecodable_body, unexpected_status};
use crate::service::{ReservationService, ServiceFactory};
use crate::types::{
    CardInformation, CardTokenResponse, InitializeResponse, Reservation, ReserveResponse,
    SeatListing, SeatQuery, StationInfo, Train, TrainSearchQuery, TrainSeat,
};
use async_trait::async_trait;
use railbench_config::HttpConfig;
use railbench_core::{BenchError, Endpoint};
use railbench_ledger::{ReservationId, ReservationRequest, User};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// One cookie-backed session against the service under test
#[derive(Debug, Clone)]
pub struct HttpReservationClient {
    client: Client,
    base_url: Url,
    payment_url: Url,
    card: CardInformation,
}

impl HttpReservationClient {
    pub fn new(
        target_url: &str,
        payment_url: &str,
        config: &HttpConfig,
        timeout: Duration,
    ) -> Result<Self, BenchError> {
        let base_url = parse_base(target_url)?;
        let payment_url = parse_base(payment_url)?;

        debug!("Creating service session with {}s timeout", timeout.as_secs());

        // Redirects are surfaced as responses so they can be reported
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .map_err(|e| {
                BenchError::critical("could not create the benchmark HTTP client")
                    .with_detail(e.to_string())
            })?;

        Ok(Self {
            client,
            base_url,
            payment_url,
            card: CardInformation::default(),
        })
    }

    fn url(&self, endpoint: Endpoint, path: &str) -> Result<Url, BenchError> {
        join(&self.base_url, endpoint, path)
    }

    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response, BenchError> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unexpected_status(endpoint, status, &body));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, BenchError> {
        let response = self.send(endpoint, request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(endpoint, &e))?;
        serde_json::from_slice(&body).map_err(|e| undecodable_body(endpoint, e))
    }

    async fn register_card(&self) -> Result<String, BenchError> {
        let endpoint = Endpoint::CommitReservation;
        let url = join(&self.payment_url, endpoint, "/card")?;
        let response: CardTokenResponse = self
            .send_json(
                endpoint,
                self.client
                    .post(url)
                    .json(&json!({ "card_information": self.card })),
            )
            .await
            .map_err(|e| e.context("payment service"))?;

        Ok(response.card_token)
    }

    async fn initialize_payment(&self) -> Result<(), BenchError> {
        let endpoint = Endpoint::Initialize;
        let url = join(&self.payment_url, endpoint, "/initialize")?;
        self.send(endpoint, self.client.post(url))
            .await
            .map_err(|e| e.context("payment service"))?;
        Ok(())
    }
}

#[async_trait]
impl ReservationService for HttpReservationClient {
    /// Resets the payment service, then the application
    async fn initialize(&self) -> Result<InitializeResponse, BenchError> {
        self.initialize_payment().await?;

        let endpoint = Endpoint::Initialize;
        let url = self.url(endpoint, "/initialize")?;
        self.send_json(endpoint, self.client.post(url)).await
    }

    async fn signup(&self, user: &User) -> Result<(), BenchError> {
        let endpoint = Endpoint::Signup;
        let url = self.url(endpoint, "/api/auth/signup")?;
        self.send(endpoint, self.client.post(url).json(user)).await?;
        Ok(())
    }

    async fn login(&self, user: &User) -> Result<(), BenchError> {
        let endpoint = Endpoint::Login;
        let url = self.url(endpoint, "/api/auth/login")?;
        self.send(endpoint, self.client.post(url).json(user)).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), BenchError> {
        let endpoint = Endpoint::Logout;
        let url = self.url(endpoint, "/api/auth/logout")?;
        self.send(endpoint, self.client.post(url)).await?;
        Ok(())
    }

    async fn list_stations(&self) -> Result<Vec<StationInfo>, BenchError> {
        let endpoint = Endpoint::ListStations;
        let url = self.url(endpoint, "/api/stations")?;
        self.send_json(endpoint, self.client.get(url)).await
    }

    async fn search_trains(&self, query: &TrainSearchQuery) -> Result<Vec<Train>, BenchError> {
        let endpoint = Endpoint::SearchTrains;
        let url = self.url(endpoint, "/api/train/search")?;
        self.send_json(endpoint, self.client.get(url).query(&query.to_params()))
            .await
    }

    async fn list_train_seats(&self, query: &SeatQuery) -> Result<Vec<TrainSeat>, BenchError> {
        let endpoint = Endpoint::ListTrainSeats;
        let url = self.url(endpoint, "/api/train/seats")?;
        let listing: SeatListing = self
            .send_json(endpoint, self.client.get(url).query(&query.to_params()))
            .await?;
        Ok(listing.seats)
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<ReserveResponse, BenchError> {
        let endpoint = Endpoint::Reserve;
        let url = self.url(endpoint, "/api/train/reserve")?;
        self.send_json(endpoint, self.client.post(url).json(request))
            .await
    }

    async fn commit_reservation(&self, id: ReservationId) -> Result<(), BenchError> {
        let card_token = self.register_card().await?;

        let endpoint = Endpoint::CommitReservation;
        let url = self.url(endpoint, "/api/train/reservation/commit")?;
        let body = json!({ "reservation_id": id, "card_token": card_token });
        self.send(endpoint, self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn cancel_reservation(&self, id: ReservationId) -> Result<(), BenchError> {
        let endpoint = Endpoint::CancelReservation;
        let url = self.url(endpoint, &format!("/api/user/reservations/{}/cancel", id))?;
        self.send(endpoint, self.client.post(url)).await?;
        Ok(())
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, BenchError> {
        let endpoint = Endpoint::ListReservations;
        let url = self.url(endpoint, "/api/user/reservations")?;
        self.send_json(endpoint, self.client.get(url)).await
    }
}

/// Creates HTTP sessions for the configured target
#[derive(Debug, Clone)]
pub struct HttpServiceFactory {
    target_url: String,
    payment_url: String,
    config: HttpConfig,
}

impl HttpServiceFactory {
    pub fn new(target_url: impl Into<String>, payment_url: impl Into<String>, config: HttpConfig) -> Self {
        Self {
            target_url: target_url.into(),
            payment_url: payment_url.into(),
            config,
        }
    }
}

impl ServiceFactory for HttpServiceFactory {
    fn session(&self) -> Result<Arc<dyn ReservationService>, BenchError> {
        let client = HttpReservationClient::new(
            &self.target_url,
            &self.payment_url,
            &self.config,
            self.config.api_timeout,
        )?;
        Ok(Arc::new(client))
    }

    fn initialize_session(&self) -> Result<Arc<dyn ReservationService>, BenchError> {
        let client = HttpReservationClient::new(
            &self.target_url,
            &self.payment_url,
            &self.config,
            self.config.initialize_timeout,
        )?;
        Ok(Arc::new(client))
    }
}

fn parse_base(raw: &str) -> Result<Url, BenchError> {
    Url::parse(raw).map_err(|e| {
        BenchError::critical(format!("invalid service URL: {}", raw)).with_detail(e.to_string())
    })
}

fn join(base: &Url, endpoint: Endpoint, path: &str) -> Result<Url, BenchError> {
    base.join(path).map_err(|e| {
        BenchError::critical("could not build request URL")
            .context(endpoint)
            .with_detail(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbench_core::ErrorKind;

    #[test]
    fn test_invalid_target_is_critical() {
        let err = HttpReservationClient::new(
            "not a url",
            "http://localhost:5000",
            &HttpConfig::default(),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Critical);
    }

    #[test]
    fn test_factory_builds_sessions() {
        let factory = HttpServiceFactory::new(
            "https://10.0.0.1:443",
            "http://localhost:5000",
            HttpConfig::default(),
        );
        assert!(factory.session().is_ok());
        assert!(factory.initialize_session().is_ok());
    }
}
