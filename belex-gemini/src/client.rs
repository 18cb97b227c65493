use crate::{
    filestore::{CustomMetadata, ListDocumentsResponse, Operation, StoreDocument},
    generation::{ContentBuilder, GenerateContentRequest, GenerationResponse},
};
use futures::Stream;
use mime::Mime;
use reqwest::{
    Client, ClientBuilder, RequestBuilder, Response,
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use snafu::{OptionExt, ResultExt, Snafu};
use std::{
    fmt::{self, Formatter},
    sync::{Arc, LazyLock},
};
use tracing::{Level, Span, instrument};
use url::Url;

static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("unreachable error: failed to parse default base URL")
});

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Model {
    #[default]
    #[serde(rename = "models/gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "models/gemini-2.5-pro")]
    Gemini25Pro,
    #[serde(untagged)]
    Custom(String),
}

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini25Flash => "models/gemini-2.5-flash",
            Model::Gemini25Pro => "models/gemini-2.5-pro",
            Model::Custom(model) => model,
        }
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Self::Custom(model)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Model::Gemini25Flash => write!(f, "models/gemini-2.5-flash"),
            Model::Gemini25Pro => write!(f, "models/gemini-2.5-pro"),
            Model::Custom(model) => write!(f, "{}", model),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to parse API key"))]
    InvalidApiKey {
        source: InvalidHeaderValue,
    },

    #[snafu(display("failed to construct URL: {suffix}"))]
    ConstructUrl {
        source: url::ParseError,
        suffix: String,
    },

    #[snafu(display("failed to perform request"))]
    PerformRequest {
        source: reqwest::Error,
    },

    #[snafu(display("failed to upload content to '{url}'"))]
    UploadContent {
        source: reqwest::Error,
        url: Url,
    },

    #[snafu(display(
        "bad response from server; code {code}; description: {}",
        description.as_deref().unwrap_or("none")
    ))]
    BadResponse {
        /// HTTP status code
        code: u16,
        /// HTTP error description
        description: Option<String>,
    },

    MissingResponseHeader {
        header: String,
    },

    #[snafu(display("failed to decode JSON response"))]
    DecodeResponse {
        source: reqwest::Error,
    },

    #[snafu(display("failed to parse URL"))]
    UrlParse {
        source: url::ParseError,
    },
}

/// Internal client for making requests to the Gemini API
pub struct GeminiClient {
    http_client: Client,
    pub model: Model,
    base_url: Url,
}

impl GeminiClient {
    /// Create a new client with custom base URL
    fn with_base_url<M: Into<Model>>(
        client_builder: ClientBuilder,
        api_key: &str,
        model: M,
        base_url: Url,
    ) -> Result<Self, Error> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("x-goog-api-key"),
            HeaderValue::from_str(api_key).context(InvalidApiKeySnafu)?,
        )]);

        let http_client =
            client_builder.default_headers(headers).build().expect("all parameters must be valid");

        Ok(Self { http_client, model: model.into(), base_url })
    }

    /// Check the response status code and return an error if it is not successful
    #[tracing::instrument(skip_all, err)]
    async fn check_response(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.ok();
            BadResponseSnafu { code: status.as_u16(), description }.fail()
        } else {
            Ok(response)
        }
    }

    /// Performs an HTTP request to the Gemini API with standardized error handling.
    ///
    /// Builds the request with `builder`, sends it, checks the status code and
    /// hands the successful response to `deserializer`. The `AsyncFn` bound is
    /// stable Rust as of 1.85.
    #[tracing::instrument(skip_all)]
    async fn perform_request<
        B: FnOnce(&Client) -> RequestBuilder,
        D: AsyncFn(Response) -> Result<T, Error>,
        T,
    >(
        &self,
        builder: B,
        deserializer: D,
    ) -> Result<T, Error> {
        let request = builder(&self.http_client);
        tracing::debug!("request built successfully");
        let response = request.send().await.context(PerformRequestSnafu)?;
        tracing::debug!("response received successfully");
        let response = Self::check_response(response).await?;
        tracing::debug!("response ok");
        deserializer(response).await
    }

    /// Perform a GET request and deserialize the JSON response.
    ///
    /// This is a convenience wrapper around [`perform_request`](Self::perform_request).
    #[tracing::instrument(skip(self), fields(request.type = "get", request.url = %url))]
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        self.perform_request(|c| c.get(url), async |r| r.json().await.context(DecodeResponseSnafu))
            .await
    }

    /// Perform a POST request with JSON body and deserialize the JSON response.
    ///
    /// This is a convenience wrapper around [`perform_request`](Self::perform_request).
    #[tracing::instrument(skip(self, body), fields(request.type = "post", request.url = %url))]
    async fn post_json<Req: serde::Serialize, Res: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &Req,
    ) -> Result<Res, Error> {
        self.perform_request(
            |c| c.post(url).json(body),
            async |r| r.json().await.context(DecodeResponseSnafu),
        )
        .await
    }

    /// Generate content
    #[instrument(skip_all, fields(
        model = %self.model,
        messages.parts.count = request.contents.len(),
        tools.present = request.tools.is_some(),
        system.instruction.present = request.system_instruction.is_some(),
        usage.prompt_tokens,
        usage.candidates_tokens,
        usage.total_tokens,
    ), ret(level = Level::TRACE), err)]
    pub(crate) async fn generate_content_raw(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerationResponse, Error> {
        let url = self.build_url("generateContent")?;
        let response: GenerationResponse = self.post_json(url, &request).await?;

        // Record usage metadata
        if let Some(usage) = &response.usage_metadata {
            #[rustfmt::skip]
            Span::current()
                .record("usage.prompt_tokens", usage.prompt_token_count)
                .record("usage.candidates_tokens", usage.candidates_token_count)
                .record("usage.total_tokens", usage.total_token_count);

            tracing::debug!("generation usage evaluated");
        }

        Ok(response)
    }

    /// List one page of documents in a File Search store
    #[instrument(skip_all, fields(
        store.name = store_name,
        page.size = page_size,
        page.token.present = page_token.is_some(),
    ))]
    pub(crate) async fn list_store_documents(
        &self,
        store_name: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> Result<ListDocumentsResponse, Error> {
        let mut url = self.build_store_url(store_name, "documents")?;

        if let Some(size) = page_size {
            url.query_pairs_mut().append_pair("pageSize", &size.to_string());
        }
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", &token);
        }

        self.get_json(url).await
    }

    async fn create_store_upload(
        &self,
        store_name: &str,
        bytes: usize,
        display_name: Option<String>,
        mime_type: Mime,
        custom_metadata: &[CustomMetadata],
    ) -> Result<Url, Error> {
        let suffix = format!("/upload/v1beta/{store_name}:uploadToFileSearchStore");
        let url =
            self.base_url.join(&suffix).context(ConstructUrlSnafu { suffix: suffix.clone() })?;

        let mut body = json!({});
        if let Some(display_name) = display_name {
            body["displayName"] = json!(display_name);
        }
        if !custom_metadata.is_empty() {
            body["customMetadata"] = json!(custom_metadata);
        }

        self.perform_request(
            |c| {
                c.post(url)
                    .header("X-Goog-Upload-Protocol", "resumable")
                    .header("X-Goog-Upload-Command", "start")
                    .header("X-Goog-Upload-Content-Length", bytes.to_string())
                    .header("X-Goog-Upload-Header-Content-Type", mime_type.to_string())
                    .json(&body)
            },
            async |r| {
                r.headers()
                    .get("X-Goog-Upload-URL")
                    .context(MissingResponseHeaderSnafu { header: "X-Goog-Upload-URL" })
                    .and_then(|upload_url| {
                        upload_url.to_str().map(str::to_string).map_err(|_| Error::BadResponse {
                            code: 500,
                            description: Some("Missing upload URL in response".to_string()),
                        })
                    })
                    .and_then(|url| Url::parse(&url).context(UrlParseSnafu))
            },
        )
        .await
    }

    /// Upload a document into a File Search store using the resumable upload protocol.
    ///
    /// Returns the long-running operation that tracks ingestion. The upload being
    /// accepted does not mean the document is searchable yet; indexing completes
    /// in the background.
    #[instrument(skip_all, fields(
        store.name = store_name,
        file.size = file_bytes.len(),
        mime.type = %mime_type,
        file.display_name = display_name.as_deref(),
    ))]
    pub(crate) async fn upload_store_document(
        &self,
        store_name: &str,
        display_name: Option<String>,
        file_bytes: Vec<u8>,
        mime_type: Mime,
        custom_metadata: Vec<CustomMetadata>,
    ) -> Result<Operation, Error> {
        // Step 1: Create resumable upload session
        let upload_url = self
            .create_store_upload(
                store_name,
                file_bytes.len(),
                display_name,
                mime_type,
                &custom_metadata,
            )
            .await?;

        // Step 2: Upload file content
        let upload_response = self
            .http_client
            .post(upload_url.clone())
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(file_bytes)
            .send()
            .await
            .context(UploadContentSnafu { url: upload_url })?;

        let final_response = Self::check_response(upload_response).await?;
        final_response.json().await.context(DecodeResponseSnafu)
    }

    /// Delete a document from a File Search store.
    ///
    /// With `force` set, chunks derived from the document are deleted along
    /// with it. The server answers 200 with an empty object or 204.
    #[instrument(skip_all, fields(
        document.name = document_name,
        force,
    ))]
    pub(crate) async fn delete_store_document(
        &self,
        document_name: &str,
        force: bool,
    ) -> Result<(), Error> {
        let mut url = self
            .base_url
            .join(document_name)
            .context(ConstructUrlSnafu { suffix: document_name.to_string() })?;
        if force {
            url.query_pairs_mut().append_pair("force", "true");
        }

        self.perform_request(|c| c.delete(url), async |_r| Ok(())).await
    }

    /// Build a URL with the given suffix
    #[tracing::instrument(skip(self), ret(level = Level::DEBUG))]
    fn build_url_with_suffix(&self, suffix: &str) -> Result<Url, Error> {
        self.base_url.join(suffix).context(ConstructUrlSnafu { suffix: suffix.to_string() })
    }

    /// Build a URL for the API
    #[tracing::instrument(skip(self), ret(level = Level::DEBUG))]
    fn build_url(&self, endpoint: &str) -> Result<Url, Error> {
        let suffix = format!("{}:{endpoint}", self.model);
        self.build_url_with_suffix(&suffix)
    }

    /// Build a URL for a File Search store sub-resource
    fn build_store_url(&self, store_name: &str, resource: &str) -> Result<Url, Error> {
        let suffix = format!("{}/{resource}", store_name.trim_matches('/'));
        self.build_url_with_suffix(&suffix)
    }
}

/// A builder for the `Gemini` client.
///
/// # Examples
///
/// ```no_run
/// use belex_gemini::{GeminiBuilder, Model};
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let gemini = GeminiBuilder::new("YOUR_API_KEY")
///     .with_model(Model::Gemini25Pro)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiBuilder {
    api_key: String,
    model: Model,
    client_builder: ClientBuilder,
    base_url: Url,
}

impl GeminiBuilder {
    /// Creates a new `GeminiBuilder` with the given API key.
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self {
            api_key: key.into(),
            model: Model::default(),
            client_builder: ClientBuilder::default(),
            base_url: DEFAULT_BASE_URL.clone(),
        }
    }

    /// Sets the model for the client.
    pub fn with_model<M: Into<Model>>(mut self, model: M) -> Self {
        self.model = model.into();
        self
    }

    /// Sets a custom `reqwest::ClientBuilder`.
    pub fn with_http_client(mut self, client_builder: ClientBuilder) -> Self {
        self.client_builder = client_builder;
        self
    }

    /// Sets a custom base URL for the API.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Builds the `Gemini` client.
    pub fn build(self) -> Result<Gemini, Error> {
        Ok(Gemini {
            client: Arc::new(GeminiClient::with_base_url(
                self.client_builder,
                &self.api_key,
                self.model,
                self.base_url,
            )?),
        })
    }
}

/// Client for the Gemini API
#[derive(Clone)]
pub struct Gemini {
    client: Arc<GeminiClient>,
}

impl Gemini {
    /// Create a new client with the specified API key
    pub fn new<K: AsRef<str>>(api_key: K) -> Result<Self, Error> {
        Self::with_model(api_key, Model::default())
    }

    /// Create a new client with the specified API key and model
    pub fn with_model<K: AsRef<str>, M: Into<Model>>(api_key: K, model: M) -> Result<Self, Error> {
        Self::with_model_and_base_url(api_key, model, DEFAULT_BASE_URL.clone())
    }

    /// Create a new client with the specified API key, model, and base URL
    pub fn with_model_and_base_url<K: AsRef<str>, M: Into<Model>>(
        api_key: K,
        model: M,
        base_url: Url,
    ) -> Result<Self, Error> {
        let client =
            GeminiClient::with_base_url(Default::default(), api_key.as_ref(), model, base_url)?;
        Ok(Self { client: Arc::new(client) })
    }

    /// Start building a content generation request
    pub fn generate_content(&self) -> ContentBuilder {
        ContentBuilder::new(self.client.clone())
    }

    /// Lists documents in a File Search store.
    ///
    /// This method returns a stream that handles pagination automatically.
    pub fn list_documents(
        &self,
        store_name: impl Into<String>,
        page_size: impl Into<Option<u32>>,
    ) -> impl Stream<Item = Result<StoreDocument, Error>> + Send {
        let client = self.client.clone();
        let store_name = store_name.into();
        let page_size = page_size.into();
        async_stream::try_stream! {
            let mut page_token: Option<String> = None;
            loop {
                let response = client
                    .list_store_documents(&store_name, page_size, page_token.clone())
                    .await?;

                for document in response.documents {
                    yield document;
                }

                if let Some(next_page_token) = response.next_page_token {
                    page_token = Some(next_page_token);
                } else {
                    break;
                }
            }
        }
    }

    /// Upload a document into a File Search store.
    pub async fn upload_document(
        &self,
        store_name: &str,
        display_name: Option<String>,
        file_bytes: Vec<u8>,
        mime_type: Mime,
        custom_metadata: Vec<CustomMetadata>,
    ) -> Result<Operation, Error> {
        self.client
            .upload_store_document(store_name, display_name, file_bytes, mime_type, custom_metadata)
            .await
    }

    /// Delete a document from a File Search store.
    pub async fn delete_document(&self, document_name: &str, force: bool) -> Result<(), Error> {
        self.client.delete_store_document(document_name, force).await
    }
}
