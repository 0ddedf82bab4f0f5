use std::fmt;
use std::io::Write;
use std::time::Duration;

use mealcard_core::{
    Credentials, Decimal, LoginRequest, LoginResponse, Movement, TransactionsResponse,
    write_movements, write_summary,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://www.myedenred.pt/edenred-customer/api";
pub const DEFAULT_CARD_ID: &str = "537781";

const LOGIN_PATH: &str = "/authenticate/default?appVersion=1.0&appType=PORTAL&channel=WEB";
const USER_AGENT_STR: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:73.0) Gecko/20100101 Firefox/73.0";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const TCP_KEEPALIVE: Duration = Duration::from_secs(2);

/// Largest response body read from the provider
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Client settings shared by the login and the transactions call.
///
/// Cookies live in memory for the lifetime of the client. Proxies come from
/// the usual `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` variables and certificates
/// are always verified. The connect timeout covers the TLS handshake.
pub fn http_client_builder() -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STR));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
}

pub fn build_http_client() -> Result<Client, ClientError> {
    http_client_builder()
        .build()
        .map_err(|source| ClientError::Network {
            context: "client setup",
            source,
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    pub card_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            card_id: DEFAULT_CARD_ID.to_string(),
        }
    }
}

/// Token handed out by [`Session::login()`], sent as-is in the
/// `Authorization` header of [`Session::fetch_transactions()`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// A session with the meal-card provider
///
/// Holds the HTTP client (and with it the cookie jar) used by both calls.
/// Authenticate with [`Session::login()`], then pass the token to
/// [`Session::fetch_transactions()`], or do both with
/// [`Session::check_balance()`].
pub struct Session {
    config: SessionConfig,
    client: Client,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ClientError> {
        Ok(Self::with_client(config, build_http_client()?))
    }

    pub fn with_client(config: SessionConfig, client: Client) -> Self {
        Session { config, client }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Exchanges the user id and password for a token
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] if the request cannot be completed
    /// - [`ClientError::Api`] for any status other than 200
    /// - [`ClientError::Decode`] if the body is not the expected JSON
    ///
    /// A 200 response without a token is not an error; the empty token is
    /// returned and a warning logged.
    pub async fn login(&self, creds: &Credentials) -> Result<AuthToken, ClientError> {
        let body = LoginRequest {
            user_id: &creds.user_id,
            password: &creds.password,
        };

        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|source| ClientError::Network {
                context: "login",
                source,
            })?;

        let (status, body) = read_body(response, "login").await?;
        if status != StatusCode::OK {
            return Err(api_error(status, &body));
        }

        let login: LoginResponse =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                context: "login",
                source,
            })?;

        if login.data.token.is_empty() {
            log::warn!("login answered 200 without a token");
        }

        Ok(AuthToken(login.data.token))
    }

    /// Fetches the card's movements and balance
    ///
    /// Every movement is written to `out` as one JSON line, in the order the
    /// provider lists them. A movement that cannot be serialised is logged
    /// and skipped. Returns the available balance.
    ///
    /// The status code is not checked: the body is decoded whatever it is,
    /// and an error page fails as a decode error.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] if the request cannot be completed
    /// - [`ClientError::TooLarge`] if the body exceeds [`MAX_BODY_BYTES`]
    /// - [`ClientError::Decode`] if the body is not the expected JSON; nothing
    ///   is written to `out` in that case
    /// - [`ClientError::Output`] if writing to `out` fails
    pub async fn fetch_transactions<W: Write>(
        &self,
        token: &AuthToken,
        out: &mut W,
    ) -> Result<Decimal, ClientError> {
        self.fetch_transactions_as::<Movement, W>(token, out).await
    }

    /// [`Session::fetch_transactions()`] with the movement list decoded into `M`
    pub async fn fetch_transactions_as<M, W>(
        &self,
        token: &AuthToken,
        out: &mut W,
    ) -> Result<Decimal, ClientError>
    where
        M: DeserializeOwned + Serialize,
        W: Write,
    {
        let path = format!("/protected/card/{}/accountmovement", self.config.card_id);

        let response = self
            .client
            .get(self.url(&path))
            .header(AUTHORIZATION, token.as_str())
            .send()
            .await
            .map_err(|source| ClientError::Network {
                context: "transactions",
                source,
            })?;

        let (status, body) = read_body(response, "transactions").await?;
        if !status.is_success() {
            log::warn!("transactions answered {status}");
        }

        let transactions: TransactionsResponse<M> =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                context: "transactions",
                source,
            })?;

        let data = transactions.data;
        let written = write_movements(out, &data.movement_list)?;
        log::debug!(
            "wrote {written} of {} movements for card {} ({})",
            data.movement_list.len(),
            data.account.card_number,
            data.account.holder_name()
        );

        Ok(data.account.available_balance)
    }

    /// Logs in, then fetches the movements with the new token.
    pub async fn check_balance<W: Write>(
        &self,
        creds: &Credentials,
        out: &mut W,
    ) -> Result<Decimal, ClientError> {
        self.check_balance_as::<Movement, W>(creds, out).await
    }

    pub async fn check_balance_as<M, W>(
        &self,
        creds: &Credentials,
        out: &mut W,
    ) -> Result<Decimal, ClientError>
    where
        M: DeserializeOwned + Serialize,
        W: Write,
    {
        let token = self.login(creds).await?;
        log::info!("logged in");

        let balance = self.fetch_transactions_as::<M, W>(&token, out).await?;
        log::info!("retrieved all transactions, balance={balance}");

        Ok(balance)
    }

    /// The whole run: movement lines, then the balance summary line.
    pub async fn report<W: Write>(
        &self,
        creds: &Credentials,
        out: &mut W,
    ) -> Result<Decimal, ClientError> {
        let balance = self.check_balance(creds, out).await?;
        write_summary(out, balance)?;
        Ok(balance)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

// The body is always read to the end so the connection goes back to the pool
// in a clean state, whatever the status. Past MAX_BODY_BYTES the response is
// dropped and its connection closed.
async fn read_body(
    mut response: Response,
    context: &'static str,
) -> Result<(StatusCode, Vec<u8>), ClientError> {
    let status = response.status();
    let too_large = || ClientError::TooLarge {
        context,
        limit: MAX_BODY_BYTES,
    };

    if response
        .content_length()
        .is_some_and(|len| len > MAX_BODY_BYTES as u64)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| ClientError::Network { context, source })?
    {
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok((status, body))
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    ClientError::Api {
        status,
        body: String::from_utf8_lossy(body).trim().to_string(),
    }
}
