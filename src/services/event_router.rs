// src/services/event_router.rs
//! Routing of inbound credential events.
//!
//! Each event is classified once. A crypto-key request backed by a locally
//! stored profile resolves synchronously with a signed verifiable profile
//! (the fast path). Everything else is proxied into an isolated handler
//! window for interactive resolution (the slow path), and the remote
//! outcome is relayed untranslated.
//!
//! A missing profile is not an error: the event falls through to the slow
//! path. Every other failure along the pipeline settles the event as a
//! rejection.

use log::debug;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{MediationError, Result};
use crate::host::{EventSource, ProxyConfig, ProxyFunction, WindowContext};
use crate::models::event::{CredentialEvent, HandlerResponse, ProxiedEvent};
use crate::models::profile::IDENTITY_CONTEXT;
use crate::services::profile_builder::{BuildOptions, VerifiableProfileBuilder};
use crate::wallet::profile_store::ProfileKeyStore;

/// Name of the proxy interface exposed by handler windows.
const EVENT_PROXY_NAME: &str = "credentialEventProxy";

/// Router settling credential events against the profile store or a handler
/// window.
pub struct CredentialEventRouter {
    store: Arc<ProfileKeyStore>,
    builder: Arc<VerifiableProfileBuilder>,
    host: Arc<dyn EventSource>,
    windows: Arc<dyn WindowContext>,
    window_timeout: Option<Duration>,
}

impl CredentialEventRouter {
    /// Creates a router.
    ///
    /// # Arguments
    /// * `store` - Local profile store consulted on the fast path
    /// * `builder` - Verifiable profile assembly for fast-path responses
    /// * `host` - Capability for opening handler windows
    /// * `windows` - RPC transport into opened windows
    pub fn new(
        store: Arc<ProfileKeyStore>,
        builder: Arc<VerifiableProfileBuilder>,
        host: Arc<dyn EventSource>,
        windows: Arc<dyn WindowContext>,
    ) -> Self {
        CredentialEventRouter {
            store,
            builder,
            host,
            windows,
            window_timeout: None,
        }
    }

    /// Bounds the wait for handler-window readiness. Without a bound the
    /// router waits as long as the window lifecycle allows.
    pub fn with_window_timeout(mut self, timeout: Duration) -> Self {
        self.window_timeout = Some(timeout);
        self
    }

    /// Settles one credential event.
    ///
    /// The returned result is the event's outcome: `Ok` resolves it, `Err`
    /// rejects it. The router never leaves an event pending on error and
    /// never resolves with a malformed payload.
    pub async fn handle(&self, event: &CredentialEvent) -> Result<HandlerResponse> {
        if Self::is_crypto_key_request(event) {
            if let Some(response) = self.try_fast_path(event).await? {
                return Ok(response);
            }
        }
        self.slow_path(event).await
    }

    /// Whether an event is a crypto-key request: a request event whose
    /// `VerifiableProfile` query asks for exactly an empty `publicKey`,
    /// under the identity context or no context at all. An `id` member on
    /// the query does not affect the outcome. Store events never qualify.
    pub fn is_crypto_key_request(event: &CredentialEvent) -> bool {
        let CredentialEvent::Request(request) = event else {
            return false;
        };
        let Some(query) = request
            .request_options
            .pointer("/web/VerifiableProfile")
            .and_then(Value::as_object)
        else {
            return false;
        };
        let public_key_is_empty_string =
            query.get("publicKey").and_then(Value::as_str) == Some("");
        let context_matches = match query.get("@context") {
            None => true,
            Some(context) => context.as_str() == Some(IDENTITY_CONTEXT),
        };
        public_key_is_empty_string && context_matches
    }

    /// Attempts to answer a crypto-key request from the local store.
    /// Returns `Ok(None)` when no profile matches the hint key.
    async fn try_fast_path(&self, event: &CredentialEvent) -> Result<Option<HandlerResponse>> {
        let CredentialEvent::Request(request) = event else {
            return Ok(None);
        };
        let Some(hint_key) = request.hint_key.as_deref() else {
            return Ok(None);
        };
        let Some(profile) = self.store.get(hint_key).await? else {
            debug!("no stored profile for hint key {}, deferring to window", hint_key);
            return Ok(None);
        };

        let data = self
            .builder
            .build(BuildOptions {
                profile: &profile,
                domain: &request.origin,
                sign: true,
            })
            .await?;
        debug!("answered crypto-key request for {} from the store", hint_key);
        Ok(Some(HandlerResponse {
            data_type: "VerifiableProfile".to_string(),
            data,
        }))
    }

    /// Proxies an event into an isolated handler window and relays its
    /// outcome.
    async fn slow_path(&self, event: &CredentialEvent) -> Result<HandlerResponse> {
        let window_url = format!("/{}", event.event_type());
        debug!("opening handler window at {}", window_url);

        let handle = self.host.open_window(&window_url).await?;
        let ready = self.windows.create_window(&window_url, handle);
        let injector = match self.window_timeout {
            Some(bound) => tokio::time::timeout(bound, ready)
                .await
                .map_err(|_| MediationError::WindowTimeout)??,
            None => ready.await?,
        };

        let proxy = injector.get(
            EVENT_PROXY_NAME,
            &ProxyConfig {
                functions: vec![ProxyFunction {
                    name: "send".to_string(),
                    // The remote handler is interactive; wait indefinitely.
                    timeout: None,
                }],
            },
        )?;
        proxy.send(ProxiedEvent::from_event(event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::crypto::did::{DidEnv, DidGenerationOptions, DidGenerator, Ed25519DidGenerator};
    use crate::host::{
        EventProxy, PermissionState, ProxyInjector, StaticPermissions, WindowHandle,
    };
    use crate::models::event::{CredentialRequestEvent, CredentialStoreEvent};
    use crate::models::profile::Profile;
    use crate::services::signer::CredentialSigner;
    use crate::storage::memory::MemoryStorageProvider;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Host fake recording opened window URLs.
    struct FakeHost {
        opened: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn new() -> Self {
            FakeHost {
                opened: Mutex::new(Vec::new()),
            }
        }

        fn opened_urls(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventSource for FakeHost {
        async fn open_window(&self, url: &str) -> Result<WindowHandle> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(WindowHandle::new(format!("window:{}", url)))
        }
    }

    /// Proxy fake answering with a scripted response and recording payloads.
    struct ScriptedProxy {
        response: std::result::Result<HandlerResponse, String>,
        received: Mutex<Vec<ProxiedEvent>>,
    }

    #[async_trait]
    impl EventProxy for ScriptedProxy {
        async fn send(&self, event: ProxiedEvent) -> Result<HandlerResponse> {
            self.received.lock().unwrap().push(event);
            self.response
                .clone()
                .map_err(MediationError::Remote)
        }
    }

    struct ScriptedInjector {
        proxy: Arc<ScriptedProxy>,
        requested: Mutex<Vec<(String, ProxyConfig)>>,
    }

    impl ProxyInjector for ScriptedInjector {
        fn get(&self, name: &str, config: &ProxyConfig) -> Result<Arc<dyn EventProxy>> {
            self.requested
                .lock()
                .unwrap()
                .push((name.to_string(), config.clone()));
            Ok(self.proxy.clone())
        }
    }

    struct FakeWindows {
        injector: Arc<ScriptedInjector>,
        connects: AtomicUsize,
        hang: bool,
    }

    impl FakeWindows {
        fn responding_with(response: HandlerResponse) -> Self {
            Self::build(Ok(response), false)
        }

        fn rejecting_with(message: &str) -> Self {
            Self::build(Err(message.to_string()), false)
        }

        fn hanging() -> Self {
            Self::build(
                Ok(HandlerResponse {
                    data_type: "unused".to_string(),
                    data: json!(null),
                }),
                true,
            )
        }

        fn build(response: std::result::Result<HandlerResponse, String>, hang: bool) -> Self {
            FakeWindows {
                injector: Arc::new(ScriptedInjector {
                    proxy: Arc::new(ScriptedProxy {
                        response,
                        received: Mutex::new(Vec::new()),
                    }),
                    requested: Mutex::new(Vec::new()),
                }),
                connects: AtomicUsize::new(0),
                hang,
            }
        }

        fn received_events(&self) -> Vec<ProxiedEvent> {
            self.injector.proxy.received.lock().unwrap().clone()
        }

        fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WindowContext for FakeWindows {
        async fn create_window(
            &self,
            _url: &str,
            _handle: WindowHandle,
        ) -> Result<Arc<dyn ProxyInjector>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(self.injector.clone())
        }
    }

    struct Fixture {
        router: CredentialEventRouter,
        store: Arc<ProfileKeyStore>,
        host: Arc<FakeHost>,
        windows: Arc<FakeWindows>,
    }

    fn fixture(windows: FakeWindows) -> Fixture {
        init_logging();
        let provider = MemoryStorageProvider::new();
        let store = Arc::new(
            ProfileKeyStore::new(
                "/mediator",
                &provider,
                Arc::new(StaticPermissions(PermissionState::Granted)),
            )
            .unwrap(),
        );
        let builder = Arc::new(VerifiableProfileBuilder::new(Arc::new(
            CredentialSigner::with_default_suites(),
        )));
        let host = Arc::new(FakeHost::new());
        let windows = Arc::new(windows);
        let router = CredentialEventRouter::new(
            store.clone(),
            builder,
            host.clone(),
            windows.clone(),
        );
        Fixture {
            router,
            store,
            host,
            windows,
        }
    }

    async fn stored_profile(store: &ProfileKeyStore) -> Profile {
        let profile = Ed25519DidGenerator::new()
            .generate(&DidGenerationOptions::nym(DidEnv::Test))
            .await
            .unwrap();
        store.set(&profile).await.unwrap();
        profile
    }

    fn crypto_key_request(hint_key: Option<&str>) -> CredentialEvent {
        CredentialEvent::Request(CredentialRequestEvent {
            request_options: json!({"web": {"VerifiableProfile": {"publicKey": ""}}}),
            origin: "https://example.test".to_string(),
            hint_key: hint_key.map(str::to_string),
        })
    }

    fn remote_response() -> HandlerResponse {
        HandlerResponse {
            data_type: "VerifiableProfile".to_string(),
            data: json!({"id": "did:remote"}),
        }
    }

    #[test]
    fn test_classification_of_query_shapes() {
        let request = |query: Value| {
            CredentialEvent::Request(CredentialRequestEvent {
                request_options: json!({"web": {"VerifiableProfile": query}}),
                origin: "https://example.test".to_string(),
                hint_key: None,
            })
        };

        assert!(CredentialEventRouter::is_crypto_key_request(&request(
            json!({"publicKey": ""})
        )));
        // An id on the query never affects classification.
        assert!(CredentialEventRouter::is_crypto_key_request(&request(
            json!({"publicKey": "", "id": "did:abc"})
        )));
        assert!(CredentialEventRouter::is_crypto_key_request(&request(
            json!({"publicKey": "", "@context": IDENTITY_CONTEXT})
        )));

        // An object-valued publicKey asks for something else.
        assert!(!CredentialEventRouter::is_crypto_key_request(&request(
            json!({"publicKey": {}})
        )));
        assert!(!CredentialEventRouter::is_crypto_key_request(&request(
            json!({"publicKey": "", "@context": "https://w3id.org/other/v1"})
        )));
        assert!(!CredentialEventRouter::is_crypto_key_request(&request(
            json!({"name": ""})
        )));

        let no_query = CredentialEvent::Request(CredentialRequestEvent {
            request_options: json!({"web": {}}),
            origin: "https://example.test".to_string(),
            hint_key: None,
        });
        assert!(!CredentialEventRouter::is_crypto_key_request(&no_query));

        let store_event = CredentialEvent::Store(CredentialStoreEvent {
            credential: json!({"id": "urn:uuid:1"}),
            origin: "https://example.test".to_string(),
            hint_key: None,
        });
        assert!(!CredentialEventRouter::is_crypto_key_request(&store_event));
    }

    #[tokio::test]
    async fn test_fast_path_resolves_from_the_store() {
        let fixture = fixture(FakeWindows::responding_with(remote_response()));
        let profile = stored_profile(&fixture.store).await;

        let response = fixture
            .router
            .handle(&crypto_key_request(Some(&profile.id)))
            .await
            .unwrap();

        assert_eq!(response.data_type, "VerifiableProfile");
        assert_eq!(response.data["id"], profile.id.as_str());
        assert_eq!(
            response.data["credential"][0]["@graph"]["signature"]["domain"],
            "https://example.test"
        );
        // The profile-level signature is present and domain-scoped too.
        assert_eq!(response.data["signature"]["domain"], "https://example.test");

        assert!(fixture.host.opened_urls().is_empty());
        assert_eq!(fixture.windows.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_profile_falls_through_to_window() {
        let fixture = fixture(FakeWindows::responding_with(remote_response()));

        let response = fixture
            .router
            .handle(&crypto_key_request(Some("did:abc")))
            .await
            .unwrap();

        assert_eq!(response, remote_response());
        assert_eq!(fixture.host.opened_urls(), vec!["/credentialrequest"]);
        assert_eq!(fixture.windows.connect_count(), 1);

        let received = fixture.windows.received_events();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].event_type, "credentialrequest");
        assert_eq!(received[0].hint_key.as_deref(), Some("did:abc"));
    }

    #[tokio::test]
    async fn test_non_crypto_key_request_ignores_store_contents() {
        let fixture = fixture(FakeWindows::responding_with(remote_response()));
        let profile = stored_profile(&fixture.store).await;

        let event = CredentialEvent::Request(CredentialRequestEvent {
            request_options: json!({"web": {"VerifiableProfile": {"publicKey": {}}}}),
            origin: "https://example.test".to_string(),
            hint_key: Some(profile.id.clone()),
        });
        let response = fixture.router.handle(&event).await.unwrap();

        assert_eq!(response, remote_response());
        assert_eq!(fixture.host.opened_urls(), vec!["/credentialrequest"]);
    }

    #[tokio::test]
    async fn test_store_event_goes_to_store_window() {
        let fixture = fixture(FakeWindows::responding_with(HandlerResponse {
            data_type: "Acknowledgement".to_string(),
            data: json!({"stored": true}),
        }));
        stored_profile(&fixture.store).await;

        let event = CredentialEvent::Store(CredentialStoreEvent {
            credential: json!({"id": "urn:uuid:1", "type": "Credential"}),
            origin: "https://example.test".to_string(),
            hint_key: None,
        });
        let response = fixture.router.handle(&event).await.unwrap();

        assert_eq!(response.data["stored"], true);
        assert_eq!(fixture.host.opened_urls(), vec!["/credentialstore"]);
        let received = fixture.windows.received_events();
        assert_eq!(received[0].event_type, "credentialstore");
        assert_eq!(
            received[0].credential.as_ref().unwrap()["id"],
            "urn:uuid:1"
        );
    }

    #[tokio::test]
    async fn test_proxy_requests_unlimited_send_timeout() {
        let fixture = fixture(FakeWindows::responding_with(remote_response()));
        fixture
            .router
            .handle(&crypto_key_request(None))
            .await
            .unwrap();

        let requested = fixture.windows.injector.requested.lock().unwrap().clone();
        assert_eq!(requested.len(), 1);
        let (name, config) = &requested[0];
        assert_eq!(name, "credentialEventProxy");
        assert_eq!(config.functions.len(), 1);
        assert_eq!(config.functions[0].name, "send");
        assert_eq!(config.functions[0].timeout, None);
    }

    #[tokio::test]
    async fn test_remote_rejection_is_relayed_untranslated() {
        let fixture = fixture(FakeWindows::rejecting_with("user declined"));

        let result = fixture.router.handle(&crypto_key_request(None)).await;
        match result {
            Err(MediationError::Remote(message)) => assert_eq!(message, "user declined"),
            other => panic!("expected remote rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_window_timeout_bounds_readiness_wait() {
        let fixture = fixture(FakeWindows::hanging());
        let router = fixture
            .router
            .with_window_timeout(Duration::from_millis(10));

        let result = router.handle(&crypto_key_request(None)).await;
        assert!(matches!(result, Err(MediationError::WindowTimeout)));
    }
}
