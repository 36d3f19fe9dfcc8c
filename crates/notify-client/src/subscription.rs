//! Push subscription lifecycle.
//!
//! `ensure_subscribed` is idempotent and invoked on every connection
//! establishment, so the server can re-associate the subscription with
//! the user identity after its own restart. Both the push platform and
//! the server API are injected traits, keeping the lifecycle testable
//! without a browser or a server.

use serde::{Deserialize, Serialize};

use crate::{NotifyError, keys};

/// Opaque push subscription handle: an endpoint plus cryptographic
/// keys this system never interprets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Options for creating a new subscription.
#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    /// Every push must surface a user-visible notification; silent
    /// pushes are not requested.
    pub user_visible_only: bool,
    /// The server's decoded application key.
    pub application_server_key: Vec<u8>,
}

/// The platform's push manager, as seen by the subscription manager.
pub trait PushPlatform {
    fn existing_subscription(
        &self,
    ) -> impl Future<Output = Result<Option<PushSubscription>, NotifyError>> + Send;

    fn subscribe(
        &self,
        options: &SubscribeOptions,
    ) -> impl Future<Output = Result<PushSubscription, NotifyError>> + Send;
}

/// The server's subscription endpoints.
pub trait SubscriptionApi {
    /// `GET /api/vapid-public-key` -> the URL-safe base64 public key.
    fn fetch_server_key(&self) -> impl Future<Output = Result<String, NotifyError>> + Send;

    /// `POST /api/subscribe` with `{userId, subscription}`.
    fn submit(
        &self,
        user_id: &str,
        subscription: &PushSubscription,
    ) -> impl Future<Output = Result<serde_json::Value, NotifyError>> + Send;
}

/// Owns the register/subscribe/submit sequence.
pub struct SubscriptionManager<A> {
    api: A,
}

#[derive(Debug, Deserialize)]
struct ServerKeyResponse {
    #[serde(rename = "publicKey")]
    public_key: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    subscription: &'a PushSubscription,
}

impl<A: SubscriptionApi> SubscriptionManager<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Make sure a subscription exists and the server knows about it.
    ///
    /// Reuses an existing subscription when the platform has one;
    /// otherwise fetches and decodes the server key and creates one.
    /// The `{userId, subscription}` pair is submitted exactly once per
    /// call either way.
    pub async fn ensure_subscribed<P: PushPlatform>(
        &self,
        platform: &P,
        user_id: &str,
    ) -> Result<(), NotifyError> {
        let subscription = match platform.existing_subscription().await? {
            Some(existing) => {
                tracing::debug!(endpoint = %existing.endpoint, "Reusing existing push subscription");
                existing
            }
            None => {
                let server_key = self.api.fetch_server_key().await?;
                let options = SubscribeOptions {
                    user_visible_only: true,
                    application_server_key: keys::decode_server_key(&server_key)?,
                };
                let created = platform.subscribe(&options).await?;
                tracing::info!(endpoint = %created.endpoint, "Created new push subscription");
                created
            }
        };

        self.api.submit(user_id, &subscription).await?;
        tracing::debug!(user_id, "Push subscription submitted to server");
        Ok(())
    }
}

/// reqwest-backed [`SubscriptionApi`].
pub struct HttpSubscriptionApi {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpSubscriptionApi {
    pub fn new(base_url: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: url::Url::parse(base_url)?,
        })
    }
}

impl SubscriptionApi for HttpSubscriptionApi {
    async fn fetch_server_key(&self) -> Result<String, NotifyError> {
        let url = self.base_url.join("/api/vapid-public-key")?;
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::ApiError {
                status: status.as_u16(),
                message: resp.text().await?,
            });
        }

        let body: ServerKeyResponse = resp.json().await?;
        Ok(body.public_key)
    }

    async fn submit(
        &self,
        user_id: &str,
        subscription: &PushSubscription,
    ) -> Result<serde_json::Value, NotifyError> {
        let url = self.base_url.join("/api/subscribe")?;
        let resp = self
            .http
            .post(url)
            .json(&SubmitRequest {
                user_id,
                subscription,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(NotifyError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    fn subscription(endpoint: &str) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: "p256dh-key".to_string(),
                auth: "auth-secret".to_string(),
            },
        }
    }

    #[derive(Default)]
    struct FakePlatform {
        existing: Option<PushSubscription>,
        subscribe_calls: Mutex<Vec<SubscribeOptions>>,
    }

    impl PushPlatform for FakePlatform {
        async fn existing_subscription(&self) -> Result<Option<PushSubscription>, NotifyError> {
            Ok(self.existing.clone())
        }

        async fn subscribe(
            &self,
            options: &SubscribeOptions,
        ) -> Result<PushSubscription, NotifyError> {
            self.subscribe_calls.lock().unwrap().push(options.clone());
            Ok(subscription("https://push.example/new"))
        }
    }

    #[derive(Default)]
    struct FakeApi {
        key_fetches: Mutex<u32>,
        submissions: Mutex<Vec<(String, PushSubscription)>>,
    }

    impl SubscriptionApi for FakeApi {
        async fn fetch_server_key(&self) -> Result<String, NotifyError> {
            *self.key_fetches.lock().unwrap() += 1;
            Ok(URL_SAFE_NO_PAD.encode(b"server-key-bytes"))
        }

        async fn submit(
            &self,
            user_id: &str,
            subscription: &PushSubscription,
        ) -> Result<serde_json::Value, NotifyError> {
            self.submissions
                .lock()
                .unwrap()
                .push((user_id.to_string(), subscription.clone()));
            Ok(serde_json::json!({"ok": true}))
        }
    }

    #[tokio::test]
    async fn existing_subscription_is_reused_but_still_submitted() {
        let platform = FakePlatform {
            existing: Some(subscription("https://push.example/existing")),
            ..Default::default()
        };
        let manager = SubscriptionManager::new(FakeApi::default());

        manager.ensure_subscribed(&platform, "user-1").await.unwrap();

        assert!(platform.subscribe_calls.lock().unwrap().is_empty());
        assert_eq!(*manager.api.key_fetches.lock().unwrap(), 0);
        let submissions = manager.api.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].0, "user-1");
        assert_eq!(submissions[0].1.endpoint, "https://push.example/existing");
    }

    #[tokio::test]
    async fn missing_subscription_is_created_with_decoded_key() {
        let platform = FakePlatform::default();
        let manager = SubscriptionManager::new(FakeApi::default());

        manager.ensure_subscribed(&platform, "user-2").await.unwrap();

        let calls = platform.subscribe_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].user_visible_only);
        assert_eq!(calls[0].application_server_key, b"server-key-bytes");

        let submissions = manager.api.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].1.endpoint, "https://push.example/new");
    }

    #[tokio::test]
    async fn repeated_calls_stay_idempotent_one_submission_each() {
        let platform = FakePlatform {
            existing: Some(subscription("https://push.example/existing")),
            ..Default::default()
        };
        let manager = SubscriptionManager::new(FakeApi::default());

        manager.ensure_subscribed(&platform, "user-3").await.unwrap();
        manager.ensure_subscribed(&platform, "user-3").await.unwrap();

        assert!(platform.subscribe_calls.lock().unwrap().is_empty());
        assert_eq!(manager.api.submissions.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_server_key_surfaces_as_error() {
        struct BadKeyApi;
        impl SubscriptionApi for BadKeyApi {
            async fn fetch_server_key(&self) -> Result<String, NotifyError> {
                Ok("not*base64!".to_string())
            }
            async fn submit(
                &self,
                _user_id: &str,
                _subscription: &PushSubscription,
            ) -> Result<serde_json::Value, NotifyError> {
                panic!("submit must not be reached when the key is malformed");
            }
        }

        let platform = FakePlatform::default();
        let manager = SubscriptionManager::new(BadKeyApi);
        let result = manager.ensure_subscribed(&platform, "user-4").await;
        assert!(matches!(result, Err(NotifyError::Base64(_))));
    }
}
