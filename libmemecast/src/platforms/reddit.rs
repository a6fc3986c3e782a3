//! Reddit platform implementation
//!
//! Talks to the Reddit API directly over HTTP using the script-app password
//! grant, which is what the username/client_id/client_secret/password
//! quadruple in the account config maps to. One instance per account.
//!
//! Submission mechanics Reddit makes awkward are contained here and only
//! here: flair text-to-id resolution, the media asset lease dance for image
//! uploads, and the long-standing quirk where the transport reports a
//! failure for an image submission that was in fact created server-side.
//! The latter surfaces to callers as `SubmitOutcome::SubmittedWithWarning`,
//! never as an error and never as message-text matching.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{ContentRecord, SubmitOutcome};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_BASE: &str = "https://oauth.reddit.com";
const WWW_BASE: &str = "https://www.reddit.com";

/// Script-app credentials for one Reddit account
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    pub password: String,
}

/// A newly created submission, as far as the API let us see it
#[derive(Debug, Clone)]
struct CreatedSubmission {
    fullname: Option<String>,
    permalink: String,
}

/// One authenticated Reddit account
pub struct RedditPlatform {
    http: reqwest::Client,
    credentials: RedditCredentials,
    token: Option<String>,
}

impl RedditPlatform {
    /// Create an unauthenticated client for the given account
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Network` if the HTTP client cannot be built.
    pub fn new(credentials: RedditCredentials) -> Result<Self> {
        // Same user-agent shape the platform documents for script apps.
        let user_agent = format!("script:memecast:v0.1 (by /u/{})", credentials.username);
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| PlatformError::Network(e.to_string()))?;
        Ok(Self {
            http,
            credentials,
            token: None,
        })
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| PlatformError::Authentication("Not authenticated".to_string()).into())
    }

    /// Resolve human-readable flair text to a flair template id
    ///
    /// Matching is case-insensitive. A missing flair, or any failure to list
    /// the forum's flairs, downgrades to a warning: the post proceeds
    /// without one.
    async fn flair_id(&self, forum: &str, flair_text: &str) -> Result<Option<String>> {
        let token = self.token()?;
        let url = format!("{}/r/{}/api/link_flair_v2", OAUTH_BASE, forum);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let flairs: Vec<Value> = match response {
            Ok(r) => match r.json().await {
                Ok(flairs) => flairs,
                Err(e) => {
                    warn!("Could not list flairs for r/{}: {}", forum, e);
                    return Ok(None);
                }
            },
            Err(e) => {
                warn!("Could not list flairs for r/{}: {}", forum, e);
                return Ok(None);
            }
        };

        let id = match_flair(&flairs, flair_text);
        if id.is_none() {
            warn!("Flair '{}' not found in r/{}", flair_text, forum);
        }
        Ok(id)
    }

    /// Upload an image through the media asset lease and return its URL
    async fn upload_image(&self, path: &std::path::Path) -> Result<String> {
        let token = self.token()?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PlatformError::Media(format!("Bad image path: {}", path.display())))?
            .to_string();
        let mimetype = mimetype_for(&filename)
            .ok_or_else(|| PlatformError::Media(format!("Unrecognized image type: {}", filename)))?;

        // Ask for an upload lease.
        let lease: Value = self
            .http
            .post(format!("{}/api/media/asset.json", OAUTH_BASE))
            .bearer_auth(token)
            .form(&[("filepath", filename.as_str()), ("mimetype", mimetype)])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let action = lease
            .pointer("/args/action")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::Media("Upload lease missing action URL".to_string()))?;
        let upload_url = format!("https:{}", action);

        let fields = lease
            .pointer("/args/fields")
            .and_then(Value::as_array)
            .ok_or_else(|| PlatformError::Media("Upload lease missing fields".to_string()))?;

        let mut key = None;
        let mut form = reqwest::multipart::Form::new();
        for field in fields {
            let name = field.get("name").and_then(Value::as_str).unwrap_or_default();
            let value = field.get("value").and_then(Value::as_str).unwrap_or_default();
            if name == "key" {
                key = Some(value.to_string());
            }
            form = form.text(name.to_string(), value.to_string());
        }
        let key = key
            .ok_or_else(|| PlatformError::Media("Upload lease missing object key".to_string()))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PlatformError::Media(format!("Failed to read {}: {}", path.display(), e)))?;
        form = form.part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(filename),
        );

        self.http
            .post(&upload_url)
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PlatformError::Media(e.to_string()))?;

        Ok(format!("{}/{}", upload_url, key))
    }

    /// POST /api/submit and surface API-level errors
    async fn api_submit(&self, form: &[(&str, &str)]) -> Result<Value> {
        let token = self.token()?;
        let response: Value = self
            .http
            .post(format!("{}/api/submit", OAUTH_BASE))
            .bearer_auth(token)
            .form(form)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if let Some(errors) = response.pointer("/json/errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(PlatformError::Submission(errors[0].to_string()).into());
            }
        }
        Ok(response)
    }

    /// Fetch the caller's most recent submission
    ///
    /// Image submissions report their result over a websocket rather than in
    /// the submit response, so the created post is recovered from the
    /// account's submission listing instead.
    async fn latest_submission(&self) -> Result<CreatedSubmission> {
        let token = self.token()?;
        let url = format!(
            "{}/user/{}/submitted?limit=1&sort=new",
            OAUTH_BASE, self.credentials.username
        );

        let listing: Value = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let post = listing
            .pointer("/data/children/0/data")
            .ok_or_else(|| PlatformError::Network("Submission listing is empty".to_string()))?;

        let permalink = post
            .get("permalink")
            .and_then(Value::as_str)
            .map(|p| format!("{}{}", WWW_BASE, p))
            .ok_or_else(|| PlatformError::Network("Submission has no permalink".to_string()))?;

        Ok(CreatedSubmission {
            fullname: post.get("name").and_then(Value::as_str).map(String::from),
            permalink,
        })
    }

    async fn submit_self(&self, record: &ContentRecord, flair_id: Option<&str>) -> Result<SubmitOutcome> {
        let mut form = vec![
            ("sr", record.forum.as_str()),
            ("kind", "self"),
            ("title", record.title.as_str()),
            ("text", record.body.as_str()),
            ("api_type", "json"),
        ];
        if let Some(id) = flair_id {
            form.push(("flair_id", id));
        }

        let response = self.api_submit(&form).await?;
        let permalink = response
            .pointer("/json/data/url")
            .and_then(Value::as_str)
            .map(String::from);

        match permalink {
            Some(permalink) => Ok(SubmitOutcome::Submitted { permalink }),
            // The API accepted the post but returned no URL; recover it.
            None => match self.latest_submission().await {
                Ok(created) => Ok(SubmitOutcome::Submitted {
                    permalink: created.permalink,
                }),
                Err(e) => Ok(SubmitOutcome::SubmittedWithWarning {
                    permalink: format!("{}/r/{}/new", WWW_BASE, record.forum),
                    warning: format!("submitted, but permalink lookup failed: {}", e),
                }),
            },
        }
    }

    async fn submit_image(&self, record: &ContentRecord, flair_id: Option<&str>) -> Result<SubmitOutcome> {
        let image = record
            .image
            .as_deref()
            .ok_or_else(|| PlatformError::Media("Image record has no file".to_string()))?;

        let asset_url = self.upload_image(image).await?;

        let mut form = vec![
            ("sr", record.forum.as_str()),
            ("kind", "image"),
            ("title", record.title.as_str()),
            ("url", asset_url.as_str()),
            ("api_type", "json"),
        ];
        if let Some(id) = flair_id {
            form.push(("flair_id", id));
        }

        // The submit call itself can fail at the transport layer even when
        // the submission was created; confirm against the account's listing
        // before declaring failure.
        let submit_error = match self.api_submit(&form).await {
            Ok(_) => None,
            Err(e @ crate::MemecastError::Platform(PlatformError::Network(_))) => Some(e),
            Err(e) => return Err(e),
        };

        let created = match (self.latest_submission().await, submit_error) {
            (Ok(created), None) if created_matches(&created, record) => {
                debug!("Confirmed submission {}", created.permalink);
                created
            }
            (Ok(created), Some(transport)) if created_matches(&created, record) => {
                // The handle exists despite the error: transient success.
                let warning = format!("transport error after submission: {}", transport);
                warn!("{}", warning);
                self.reply_with_body(record, &created).await;
                return Ok(SubmitOutcome::SubmittedWithWarning {
                    permalink: created.permalink,
                    warning,
                });
            }
            (_, Some(transport)) => return Err(transport),
            (Ok(_), None) => {
                return Err(PlatformError::Submission(
                    "Submit accepted but the post never appeared".to_string(),
                )
                .into())
            }
            (Err(e), None) => {
                return Ok(SubmitOutcome::SubmittedWithWarning {
                    permalink: format!("{}/r/{}/new", WWW_BASE, record.forum),
                    warning: format!("submitted, but permalink lookup failed: {}", e),
                })
            }
        };

        self.reply_with_body(record, &created).await;
        Ok(SubmitOutcome::Submitted {
            permalink: created.permalink,
        })
    }

    /// Post the record body as a top-level comment on an image submission
    ///
    /// Failures are logged and swallowed: the post itself already succeeded.
    async fn reply_with_body(&self, record: &ContentRecord, created: &CreatedSubmission) {
        if record.body.is_empty() {
            return;
        }
        let Some(fullname) = created.fullname.as_deref() else {
            warn!("No fullname for {}; skipping description comment", created.permalink);
            return;
        };
        let token = match self.token() {
            Ok(t) => t,
            Err(_) => return,
        };

        let result = self
            .http
            .post(format!("{}/api/comment", OAUTH_BASE))
            .bearer_auth(token)
            .form(&[
                ("thing_id", fullname),
                ("text", record.body.as_str()),
                ("api_type", "json"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        if let Err(e) = result {
            warn!("Description comment on {} failed: {}", created.permalink, e);
        }
    }
}

/// Find the template id whose text matches, ignoring case
fn match_flair(flairs: &[Value], flair_text: &str) -> Option<String> {
    flairs.iter().find_map(|flair| {
        let text = flair.get("text")?.as_str()?;
        if text.eq_ignore_ascii_case(flair_text) {
            flair.get("id")?.as_str().map(String::from)
        } else {
            None
        }
    })
}

/// Does the listed submission look like the one we just sent?
fn created_matches(created: &CreatedSubmission, record: &ContentRecord) -> bool {
    created
        .permalink
        .to_lowercase()
        .contains(&format!("/r/{}/", record.forum.to_lowercase()))
}

fn mimetype_for(filename: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(filename).extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[async_trait::async_trait]
impl Platform for RedditPlatform {
    async fn authenticate(&mut self) -> Result<()> {
        let response: Value = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let token = response
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PlatformError::Authentication(format!(
                    "Token exchange for u/{} returned no access token",
                    self.credentials.username
                ))
            })?;

        self.token = Some(token.to_string());
        info!("Authenticated u/{}", self.credentials.username);
        Ok(())
    }

    async fn submit(&self, record: &ContentRecord) -> Result<SubmitOutcome> {
        let flair_id = match &record.flair_text {
            Some(text) => self.flair_id(&record.forum, text).await?,
            None => None,
        };

        match record.image {
            Some(_) => self.submit_image(record, flair_id.as_deref()).await,
            None => self.submit_self(record, flair_id.as_deref()).await,
        }
    }

    fn name(&self) -> &str {
        "reddit"
    }
}
