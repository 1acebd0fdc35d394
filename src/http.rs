//! The REST/CDN collaborator.
//!
//! All outbound HTTP calls go through [`Http`] so that auth headers,
//! rate-limit back-off, and error handling live in one place. The `reqwest`
//! types are an implementation detail — swapping HTTP backends only requires
//! touching this module.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_lock::Mutex;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Error;
use crate::snowflake::Snowflake;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = "DiscordBot (https://github.com/sidewinder-rs/sidewinder, 0.1)";

/// Header carrying the audit-log reason for moderation-adjacent calls.
const AUDIT_LOG_REASON: &str = "x-audit-log-reason";

// ---------------------------------------------------------------------------
// Rate-limit tracker (per-bucket)
// ---------------------------------------------------------------------------

/// Rate-limit info parsed from response headers.
#[derive(Debug, Clone)]
struct RateLimitInfo {
    remaining: Option<u32>,
    reset_after: Option<f64>,
    bucket: Option<String>,
    is_global: bool,
}

#[derive(Debug, Clone)]
struct BucketState {
    remaining: u32,
    resets_at: Instant,
}

#[derive(Debug, Clone)]
struct RateLimiter {
    /// Route-key → bucket id mapping.
    route_buckets: HashMap<String, String>,
    /// Bucket id → state.
    buckets: HashMap<String, BucketState>,
    /// Global rate-limit: if set, no requests may be sent until this instant.
    global_until: Option<Instant>,
}

impl RateLimiter {
    fn new() -> Self {
        Self {
            route_buckets: HashMap::new(),
            buckets: HashMap::new(),
            global_until: None,
        }
    }

    /// Returns how long we should wait before sending a request on
    /// `route_key`, or `None` if we can send immediately.
    fn delay_for(&self, route_key: &str) -> Option<Duration> {
        // Global rate limit takes priority.
        if let Some(until) = self.global_until {
            let now = Instant::now();
            if until > now {
                return Some(until - now);
            }
        }

        let bucket_id = self.route_buckets.get(route_key)?;
        let state = self.buckets.get(bucket_id)?;

        if state.remaining == 0 {
            let now = Instant::now();
            if state.resets_at > now {
                return Some(state.resets_at - now);
            }
        }

        None
    }

    /// Update internal state from response headers.
    fn update(&mut self, route_key: &str, info: &RateLimitInfo) {
        if info.is_global {
            if let Some(reset_after) = info.reset_after {
                self.global_until = Some(Instant::now() + Duration::from_secs_f64(reset_after));
            }
        }

        if let Some(ref bucket) = info.bucket {
            self.route_buckets
                .insert(route_key.to_string(), bucket.clone());

            let resets_at = match info.reset_after {
                Some(reset_after) => Instant::now() + Duration::from_secs_f64(reset_after),
                None => Instant::now() + Duration::from_secs(1),
            };

            self.buckets.insert(
                bucket.clone(),
                BucketState {
                    remaining: info.remaining.unwrap_or(1),
                    resets_at,
                },
            );
        }
    }
}

fn parse_rate_limit_headers(headers: &HeaderMap) -> RateLimitInfo {
    fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    RateLimitInfo {
        remaining: header(headers, "x-ratelimit-remaining"),
        reset_after: header(headers, "x-ratelimit-reset-after"),
        bucket: headers
            .get("x-ratelimit-bucket")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        is_global: headers
            .get("x-ratelimit-global")
            .and_then(|value| value.to_str().ok())
            .map(|value| value == "true")
            .unwrap_or(false),
    }
}

// ---------------------------------------------------------------------------
// Http
// ---------------------------------------------------------------------------

/// A thin, rate-limit–aware client for the Discord REST API and CDN.
///
/// Cheap to clone (internals are behind `Arc`). Performs no retries beyond
/// the 429 back-off loop; API failures propagate unchanged to the caller.
#[derive(Clone)]
pub struct Http {
    token: String,
    client: reqwest::Client,
    limiter: Arc<Mutex<RateLimiter>>,
}

impl Http {
    /// Create a new client with the given bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: reqwest::Client::new(),
            limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }

    // ------------------------------------------------------------------
    // Low-level: the single request method everything funnels through
    // ------------------------------------------------------------------

    /// Send a request to `{BASE_URL}/{path}`.
    ///
    /// `route_key` is used for per-route rate-limit bucketing. It should be
    /// a template like `PATCH /guilds/{guild_id}/emojis`.
    ///
    /// Returns the raw response body as bytes on success.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        route_key: &str,
        body: Option<&Value>,
        reason: Option<&str>,
    ) -> Result<Vec<u8>, Error> {
        let max_retries = 5;
        for attempt in 0..=max_retries {
            // Pre-request: wait if the rate limiter says so.
            {
                let limiter = self.limiter.lock().await;
                if let Some(delay) = limiter.delay_for(route_key) {
                    let delay = delay.min(Duration::from_secs(60));
                    drop(limiter);
                    debug!(
                        route = route_key,
                        delay_ms = delay.as_millis() as u64,
                        "rate-limit pre-emptive backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            let url = format!("{}/{}", BASE_URL, path.trim_start_matches('/'));

            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("authorization", format!("Bot {}", self.token))
                .header("user-agent", USER_AGENT);
            if let Some(reason) = reason {
                request = request.header(AUDIT_LOG_REASON, reason);
            }
            if let Some(json) = body {
                request = request.json(json);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::Transport(e.to_string()))?;

            let status = response.status();
            let rl_info = parse_rate_limit_headers(response.headers());

            // Update the limiter regardless of status.
            {
                let mut limiter = self.limiter.lock().await;
                limiter.update(route_key, &rl_info);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = rl_info.reset_after.unwrap_or(1.0);
                let delay = Duration::from_secs_f64(retry_after.min(60.0));
                warn!(
                    route = route_key,
                    attempt,
                    retry_after_s = retry_after,
                    global = rl_info.is_global,
                    "rate-limited by Discord, backing off"
                );

                if rl_info.is_global {
                    let mut limiter = self.limiter.lock().await;
                    limiter.global_until = Some(Instant::now() + delay);
                }

                if attempt < max_retries {
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::Transport(e.to_string()))?;

            if status.is_success() {
                return Ok(bytes.to_vec());
            }

            return Err(Error::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).to_string(),
                route: route_key.to_string(),
            });
        }

        Err(Error::Api {
            status: 429,
            body: "rate-limited after max retries".to_string(),
            route: route_key.to_string(),
        })
    }

    /// Like [`Http::request`] but deserialises the response body as JSON.
    pub async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        route_key: &str,
        body: Option<&Value>,
        reason: Option<&str>,
    ) -> Result<T, Error> {
        let bytes = self.request(method, path, route_key, body, reason).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            let raw = String::from_utf8_lossy(&bytes);
            Error::Serde(format!("{}: {}", e, &raw[..raw.len().min(200)]))
        })
    }

    /// Fetch raw asset bytes from a fully constructed CDN URL.
    ///
    /// CDN requests carry no auth and sit outside the per-route buckets.
    pub async fn request_cdn(&self, url: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(url)
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).to_string(),
                route: format!("GET {url}"),
            })
        }
    }

    // ------------------------------------------------------------------
    // Emojis
    // ------------------------------------------------------------------

    /// List a guild's custom emojis.
    pub async fn list_guild_emojis(&self, guild_id: Snowflake) -> Result<Vec<Value>, Error> {
        let path = format!("guilds/{guild_id}/emojis");
        let route_key = format!("GET /guilds/{guild_id}/emojis");
        self.request_json(Method::GET, &path, &route_key, None, None)
            .await
    }

    /// Get a single guild emoji.
    pub async fn get_guild_emoji(
        &self,
        guild_id: Snowflake,
        emoji_id: Snowflake,
    ) -> Result<Value, Error> {
        let path = format!("guilds/{guild_id}/emojis/{emoji_id}");
        let route_key = format!("GET /guilds/{guild_id}/emojis");
        self.request_json(Method::GET, &path, &route_key, None, None)
            .await
    }

    /// Partially update a guild emoji, returning the canonical updated
    /// state.
    pub async fn modify_guild_emoji(
        &self,
        payload: &Value,
        guild_id: Snowflake,
        emoji_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<Value, Error> {
        let path = format!("guilds/{guild_id}/emojis/{emoji_id}");
        let route_key = format!("PATCH /guilds/{guild_id}/emojis");
        self.request_json(Method::PATCH, &path, &route_key, Some(payload), reason)
            .await
    }

    /// Delete a guild emoji.
    pub async fn delete_guild_emoji(
        &self,
        guild_id: Snowflake,
        emoji_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        let path = format!("guilds/{guild_id}/emojis/{emoji_id}");
        let route_key = format!("DELETE /guilds/{guild_id}/emojis");
        // Discord returns 204 No Content on success — don't parse JSON.
        self.request(Method::DELETE, &path, &route_key, None, reason)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stickers
    // ------------------------------------------------------------------

    /// Get a sticker by ID.
    pub async fn get_sticker(&self, sticker_id: Snowflake) -> Result<Value, Error> {
        let path = format!("stickers/{sticker_id}");
        let route_key = format!("GET /stickers/{sticker_id}");
        self.request_json(Method::GET, &path, &route_key, None, None)
            .await
    }

    /// List a guild's custom stickers.
    pub async fn list_guild_stickers(&self, guild_id: Snowflake) -> Result<Vec<Value>, Error> {
        let path = format!("guilds/{guild_id}/stickers");
        let route_key = format!("GET /guilds/{guild_id}/stickers");
        self.request_json(Method::GET, &path, &route_key, None, None)
            .await
    }

    /// Partially update a guild sticker, returning the canonical updated
    /// state.
    pub async fn modify_guild_sticker(
        &self,
        payload: &Value,
        guild_id: Snowflake,
        sticker_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<Value, Error> {
        let path = format!("guilds/{guild_id}/stickers/{sticker_id}");
        let route_key = format!("PATCH /guilds/{guild_id}/stickers");
        self.request_json(Method::PATCH, &path, &route_key, Some(payload), reason)
            .await
    }

    /// Delete a guild sticker.
    pub async fn delete_guild_sticker(
        &self,
        guild_id: Snowflake,
        sticker_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        let path = format!("guilds/{guild_id}/stickers/{sticker_id}");
        let route_key = format!("DELETE /guilds/{guild_id}/stickers");
        self.request(Method::DELETE, &path, &route_key, None, reason)
            .await?;
        Ok(())
    }

    /// Upload a new guild sticker (multipart form data), returning the
    /// created sticker payload.
    pub async fn create_guild_sticker(
        &self,
        guild_id: Snowflake,
        name: &str,
        description: &str,
        tags: &str,
        filename: &str,
        file: Vec<u8>,
        reason: Option<&str>,
    ) -> Result<Value, Error> {
        let path = format!("guilds/{guild_id}/stickers");
        let route_key = format!("POST /guilds/{guild_id}/stickers");
        let url = format!("{BASE_URL}/{path}");

        // Pre-request rate-limit wait.
        {
            let limiter = self.limiter.lock().await;
            if let Some(delay) = limiter.delay_for(&route_key) {
                let delay = delay.min(Duration::from_secs(60));
                drop(limiter);
                debug!(
                    route = route_key,
                    delay_ms = delay.as_millis() as u64,
                    "rate-limit pre-emptive backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }

        // Build the multipart body manually.
        let boundary = format!("SidewinderBoundary{:016x}", rand::random::<u64>());
        let fields = [("name", name), ("description", description), ("tags", tags)];
        let body = build_multipart(&boundary, &fields, filename, &file);

        let mut request = self
            .client
            .post(&url)
            .header("authorization", format!("Bot {}", self.token))
            .header("user-agent", USER_AGENT)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(body);
        if let Some(reason) = reason {
            request = request.header(AUDIT_LOG_REASON, reason);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let rl_info = parse_rate_limit_headers(response.headers());

        {
            let mut limiter = self.limiter.lock().await;
            limiter.update(&route_key, &rl_info);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(|e| {
                let raw = String::from_utf8_lossy(&bytes);
                Error::Serde(format!("{}: {}", e, &raw[..raw.len().min(200)]))
            })
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).to_string(),
                route: route_key,
            })
        }
    }

    // ------------------------------------------------------------------
    // Applications
    // ------------------------------------------------------------------

    /// Get the current bot application's info.
    pub async fn get_current_application(&self) -> Result<Value, Error> {
        self.request_json(
            Method::GET,
            "applications/@me",
            "GET /applications/@me",
            None,
            None,
        )
        .await
    }
}

impl std::fmt::Debug for Http {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Http").field("token", &"<redacted>").finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a multipart/form-data body as raw bytes: one part per text field
/// plus a required file part named `"file"`.
fn build_multipart(
    boundary: &str,
    fields: &[(&str, &str)],
    filename: &str,
    file_data: &[u8],
) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();

    for (name, value) in fields {
        buf.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        buf.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // File part.
    buf.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    buf.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    buf.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    buf.extend_from_slice(file_data);
    buf.extend_from_slice(b"\r\n");

    // Closing boundary.
    buf.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
