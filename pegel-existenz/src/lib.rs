//! pegel-existenz
//!
//! Connector that implements [`HydroSource`] against the public Existenz
//! hydrology mirror (api.existenz.ch), an InfluxDB 2.x instance queried over
//! the Flux HTTP API. The crate owns the protocol details: Flux script
//! assembly ([`flux`]), HTTP transport, and annotated-CSV decoding.
#![warn(missing_docs)]

/// Flux script assembly, including the equality-chaining predicate builder.
pub mod flux;

mod decode;

use std::time::Duration;

use async_trait::async_trait;
use pegel_core::{Column, Frame, HydroQuery, HydroSource, LOCATION_COLUMN, PegelError};
use url::Url;

/// Default endpoint of the public Existenz InfluxDB mirror.
pub const DEFAULT_BASE_URL: &str = "https://influx.konzept.space";
/// Organization of the public endpoint.
pub const DEFAULT_ORG: &str = "api.existenz.ch";
/// Bucket holding the hydrology measurements.
pub const DEFAULT_BUCKET: &str = "existenzApi";
/// Published read-only community token of the public endpoint. Hard-coding a
/// read-only token carries no risk; override it for private deployments.
pub const PUBLIC_READ_TOKEN: &str =
    "0yLbh-D7RMe1sX1iIudFel8CcqCI8sVfuRTaliUp56MgE6kub8-nSd05_EJ4zTTKt0lUzw8zcO73zL9QhC3jtA==";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// [`HydroSource`] backed by the Existenz Flux endpoint.
///
/// ```no_run
/// use pegel_core::{Every, HydroQuery, HydroSource, Period};
/// use pegel_existenz::ExistenzStore;
///
/// # async fn run() -> Result<(), pegel_core::PegelError> {
/// let store = ExistenzStore::new()?;
/// let query = HydroQuery::builder()
///     .period(Period::last(Every::days(2).unwrap()))
///     .location("2030")
///     .build()?;
/// let frame = store.query_hydro(&query).await?;
/// # let _ = frame;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExistenzStore {
    http: reqwest::Client,
    query_url: Url,
    token: String,
    bucket: String,
}

impl ExistenzStore {
    /// Store name used in diagnostics and `Store`-tagged errors.
    pub const KEY: &'static str = "existenz";

    /// Store against the public endpoint with default settings.
    ///
    /// # Errors
    /// Returns `Store` when the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, PegelError> {
        Self::builder().build()
    }

    /// Start building a store with custom settings.
    #[must_use]
    pub fn builder() -> ExistenzStoreBuilder {
        ExistenzStoreBuilder::default()
    }
}

/// Builder for [`ExistenzStore`]; every setting defaults to the public
/// endpoint's values.
pub struct ExistenzStoreBuilder {
    base_url: String,
    org: String,
    bucket: String,
    token: String,
    timeout: Duration,
    client: Option<reqwest::Client>,
}

impl Default for ExistenzStoreBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            org: DEFAULT_ORG.to_owned(),
            bucket: DEFAULT_BUCKET.to_owned(),
            token: PUBLIC_READ_TOKEN.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }
}

impl ExistenzStoreBuilder {
    /// Override the endpoint base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the InfluxDB organization.
    #[must_use]
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// Override the bucket queried for hydrology data.
    #[must_use]
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Override the API token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Override the request timeout (ignored when a custom client is given).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a pre-configured `reqwest::Client` instead of building one.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validate the endpoint URL and build the store.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a base URL that does not parse or cannot take
    /// path segments, `Store` when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ExistenzStore, PegelError> {
        let mut query_url = Url::parse(&self.base_url).map_err(|e| {
            PegelError::invalid_arg(format!("invalid base URL '{}': {e}", self.base_url))
        })?;
        query_url
            .path_segments_mut()
            .map_err(|()| {
                PegelError::invalid_arg(format!("base URL '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "v2", "query"]);
        query_url.query_pairs_mut().append_pair("org", &self.org);

        let http = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| {
                    PegelError::store(ExistenzStore::KEY, format!("cannot build HTTP client: {e}"))
                })?,
        };

        Ok(ExistenzStore {
            http,
            query_url,
            token: self.token,
            bucket: self.bucket,
        })
    }
}

/// The endpoint always returns the `loc` tag; whether the caller gets it
/// depends on the request, not the payload.
fn apply_location_rule(frame: Frame, query: &HydroQuery) -> Frame {
    if query.keep_location() || query.locations().len() > 1 {
        return frame;
    }
    let index = frame.timestamps().to_vec();
    let columns: Vec<Column> = frame
        .columns()
        .iter()
        .filter(|c| c.name() != LOCATION_COLUMN)
        .cloned()
        .collect();
    // Dropping a column from a valid frame keeps it valid.
    Frame::new(index, columns).unwrap_or(frame)
}

#[async_trait]
impl HydroSource for ExistenzStore {
    fn name(&self) -> &'static str {
        Self::KEY
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, query), fields(store = "existenz"))
    )]
    async fn query_hydro(&self, query: &HydroQuery) -> Result<Frame, PegelError> {
        let script = flux::script(query, &self.bucket)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%script, "executing Flux query");

        let response = self
            .http
            .post(self.query_url.clone())
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(script)
            .send()
            .await
            .map_err(|e| PegelError::store(Self::KEY, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PegelError::store(
                Self::KEY,
                format!("query returned {status}: {}", body.trim()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PegelError::store(Self::KEY, e.to_string()))?;
        let frame = decode::decode_frame(&body)?;
        Ok(apply_location_rule(frame, query))
    }
}
