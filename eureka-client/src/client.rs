//! Eureka registry client.

use crate::applications::{
    Application, ApplicationEnvelope, Applications, ApplicationsEnvelope, InstanceEnvelope,
};
use crate::error::{EurekaError, Result};
use crate::failover::{FailoverPolicy, Operation, endpoint, failover};
use crate::instance::{Identity, InstanceRecord};
use crate::metadata::{Ec2MetadataProvider, MetadataProvider, NoMetadata};
use crate::server_urls::{ServerUrls, resolve_server_urls};
use crate::status::Status;
use eureka_config::{ClientConfig, Discovery, Validate};
use eureka_discovery::{DnsZoneResolver, ZoneResolver};
use eureka_http_client::{
    HttpClient, HttpClientConfig, HttpClientError, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span, debug, info, info_span};

/// Default per-request timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one application's registration with a Eureka cluster.
///
/// The server list is resolved once when the client is built. Every
/// operation walks that list in order and stops at the first server that
/// accepts the request.
///
/// ```rust,ignore
/// use eureka_client::{RegistryClient, Status};
/// use eureka_config::ClientConfig;
///
/// let config = ClientConfig::builder("my-service")
///     .eureka_url("http://eureka:8080/eureka/v2")
///     .port(8080)
///     .build()?;
///
/// let client = RegistryClient::new(config).await?;
/// client.register(Status::Starting).await?;
/// client.update_status(Status::Up).await?;
/// client.heartbeat().await?;
/// ```
pub struct RegistryClient {
    config: ClientConfig,
    http: HttpClient,
    metadata: Arc<dyn MetadataProvider>,
    resolver: Option<Arc<dyn ZoneResolver>>,
    server_urls: ServerUrls,
    policy: FailoverPolicy,
    span: Span,
}

impl RegistryClient {
    /// Build a client with default collaborators.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build().await
    }

    pub fn builder(config: ClientConfig) -> RegistryClientBuilder {
        RegistryClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Registry base URLs, primary first.
    pub fn server_urls(&self) -> &ServerUrls {
        &self.server_urls
    }

    /// Span every operation runs in.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Resolve the server list again and replace the current one.
    ///
    /// On failure the current list is kept.
    pub async fn refresh_server_urls(&mut self) -> Result<()> {
        let urls = resolve_server_urls(&self.config, self.resolver.as_deref(), self.metadata.as_ref())
            .instrument(self.span.clone())
            .await?;
        info!(parent: &self.span, servers = %urls, "Registry servers refreshed");
        self.server_urls = urls;
        Ok(())
    }

    /// Instance id used in registry paths.
    pub async fn instance_id(&self) -> String {
        Identity::resolve(&self.config, self.metadata.as_ref())
            .await
            .instance_id
    }

    /// The record [`RegistryClient::register`] would send.
    pub async fn instance_record(&self, status: Status) -> InstanceRecord {
        InstanceRecord::local(&self.config, self.metadata.as_ref(), status).await
    }

    /// Register this instance with `status`.
    ///
    /// Sends `PUT apps/<app>` with `{"instance": <record>}`. The record is
    /// rebuilt, and instance metadata re-read, on every call.
    pub async fn register(&self, status: Status) -> Result<()> {
        async {
            let record = self.instance_record(status).await;
            let body = &InstanceEnvelope { instance: &record };
            let app = self.config.app_name.as_str();

            self.run(Operation::Register, |base, timeout| async move {
                let url = endpoint(base, &["apps", app])?;
                send(self.http.put(url).json(body)?, timeout).await.map(drop)
            })
            .await?;

            info!(instance_id = %record.instance_id, status = %status, "Registered instance");
            Ok::<_, EurekaError>(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Register with [`Status::Starting`].
    pub async fn register_default(&self) -> Result<()> {
        self.register(Status::Starting).await
    }

    /// Change the registered status: `PUT apps/<app>/<id>/status?value=<status>`.
    pub async fn update_status(&self, status: Status) -> Result<()> {
        async {
            let instance_id = self.instance_id().await;
            let segments = &["apps", self.config.app_name.as_str(), instance_id.as_str(), "status"];

            self.run(Operation::UpdateStatus, |base, timeout| async move {
                let url = endpoint(base, segments)?;
                let request = self
                    .http
                    .put(url)
                    .json_content_type()
                    .query("value", status.as_str());
                send(request, timeout).await.map(drop)
            })
            .await?;

            info!(instance_id = %instance_id, status = %status, "Updated instance status");
            Ok::<_, EurekaError>(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Renew the lease: `PUT apps/<app>/<id>`.
    pub async fn heartbeat(&self) -> Result<()> {
        async {
            let instance_id = self.instance_id().await;
            let segments = &["apps", self.config.app_name.as_str(), instance_id.as_str()];

            self.run(Operation::Heartbeat, |base, timeout| async move {
                let url = endpoint(base, segments)?;
                send(self.http.put(url).json_content_type(), timeout)
                    .await
                    .map(drop)
            })
            .await?;

            debug!(instance_id = %instance_id, "Heartbeat sent");
            Ok::<_, EurekaError>(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Remove the registration: `DELETE apps/<app>/<id>`.
    pub async fn deregister(&self) -> Result<()> {
        async {
            let instance_id = self.instance_id().await;
            let segments = &["apps", self.config.app_name.as_str(), instance_id.as_str()];

            self.run(Operation::Deregister, |base, timeout| async move {
                let url = endpoint(base, segments)?;
                send(self.http.delete(url), timeout).await.map(drop)
            })
            .await?;

            info!(instance_id = %instance_id, "Deregistered instance");
            Ok::<_, EurekaError>(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// `GET apps`
    pub async fn get_apps(&self) -> Result<Applications> {
        let envelope: ApplicationsEnvelope = self.fetch(&["apps"]).await?;
        Ok(envelope.applications)
    }

    /// `GET apps/<app_id>`
    pub async fn get_app(&self, app_id: &str) -> Result<Application> {
        let envelope: ApplicationEnvelope = self.fetch(&["apps", app_id]).await?;
        Ok(envelope.application)
    }

    /// `GET vips/<vip_address>`
    pub async fn get_vip(&self, vip_address: &str) -> Result<Applications> {
        let envelope: ApplicationsEnvelope = self.fetch(&["vips", vip_address]).await?;
        Ok(envelope.applications)
    }

    /// `GET svips/<svip_address>`
    pub async fn get_svip(&self, svip_address: &str) -> Result<Applications> {
        let envelope: ApplicationsEnvelope = self.fetch(&["svips", svip_address]).await?;
        Ok(envelope.applications)
    }

    /// `GET instances/<instance_id>`
    pub async fn get_instance(&self, instance_id: &str) -> Result<InstanceRecord> {
        let envelope: InstanceEnvelope<InstanceRecord> =
            self.fetch(&["instances", instance_id]).await?;
        Ok(envelope.instance)
    }

    /// `GET apps/<app_id>/<instance_id>`
    pub async fn get_app_instance(&self, app_id: &str, instance_id: &str) -> Result<InstanceRecord> {
        let envelope: InstanceEnvelope<InstanceRecord> =
            self.fetch(&["apps", app_id, instance_id]).await?;
        Ok(envelope.instance)
    }

    /// GET with failover. A body that does not parse counts as a failed
    /// attempt.
    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.run(Operation::Fetch, |base, timeout| async move {
            let url = endpoint(base, segments)?;
            send(self.http.get(url).accept_json(), timeout).await?.json::<T>()
        })
        .instrument(self.span.clone())
        .await
    }

    async fn run<'a, T, F, Fut>(&'a self, operation: Operation, attempt: F) -> Result<T>
    where
        F: FnMut(&'a str, Option<Duration>) -> Fut,
        Fut: Future<Output = std::result::Result<T, HttpClientError>>,
    {
        failover(&self.server_urls, self.policy, operation, attempt).await
    }
}

/// Send one request; non-2xx responses are errors.
async fn send(
    request: RequestBuilder<'_>,
    timeout: Option<Duration>,
) -> std::result::Result<Response, HttpClientError> {
    let request = match timeout {
        Some(timeout) => request.timeout(timeout),
        None => request,
    };
    request.send().await?.error_for_status()
}

/// Builder for [`RegistryClient`].
///
/// Collaborators left unset get defaults: an HTTP client using the
/// configured request timeout, the EC2 metadata service on Amazon (none
/// elsewhere), and the system DNS resolver when DNS discovery is configured.
pub struct RegistryClientBuilder {
    config: ClientConfig,
    http: Option<HttpClient>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    resolver: Option<Arc<dyn ZoneResolver>>,
    server_urls: Option<ServerUrls>,
    span: Option<Span>,
}

impl RegistryClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: None,
            metadata: None,
            resolver: None,
            server_urls: None,
            span: None,
        }
    }

    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn metadata(mut self, metadata: impl MetadataProvider + 'static) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    pub fn resolver(mut self, resolver: impl ZoneResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Use `urls` as-is instead of resolving them at build time.
    /// [`RegistryClient::refresh_server_urls`] still resolves from the
    /// configuration.
    pub fn server_urls(mut self, urls: ServerUrls) -> Self {
        self.server_urls = Some(urls);
        self
    }

    /// Span to run operations in. Defaults to an `eureka_client` info span
    /// carrying the application name.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Validate the configuration, then resolve the server list.
    ///
    /// Configuration errors are reported before any network access.
    pub async fn build(self) -> Result<RegistryClient> {
        let config = self.config;
        config.validate()?;

        let span = self
            .span
            .unwrap_or_else(|| info_span!("eureka_client", app = %config.app_name));

        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new(
                HttpClientConfig::builder()
                    .timeout(config.request_timeout().unwrap_or(DEFAULT_REQUEST_TIMEOUT))
                    .user_agent(format!("eureka-client/{}", env!("CARGO_PKG_VERSION")))
                    .build(),
            )?,
        };

        let metadata: Arc<dyn MetadataProvider> = match self.metadata {
            Some(metadata) => metadata,
            None if config.datacenter.is_amazon() => Arc::new(Ec2MetadataProvider::new()?),
            None => Arc::new(NoMetadata),
        };

        let resolver = match (self.resolver, config.discovery()?) {
            (Some(resolver), _) => Some(resolver),
            (None, Discovery::Dns { .. }) => {
                Some(Arc::new(DnsZoneResolver::from_system_conf()?) as Arc<dyn ZoneResolver>)
            }
            (None, Discovery::Static { .. }) => None,
        };

        let server_urls = match self.server_urls {
            Some(urls) => urls,
            None => {
                resolve_server_urls(&config, resolver.as_deref(), metadata.as_ref())
                    .instrument(span.clone())
                    .await?
            }
        };
        info!(parent: &span, servers = %server_urls, "Registry client ready");

        let policy = FailoverPolicy {
            request_timeout: config.request_timeout(),
            deadline: config.failover_deadline(),
        };

        Ok(RegistryClient {
            config,
            http,
            metadata,
            resolver,
            server_urls,
            policy,
            span,
        })
    }
}
