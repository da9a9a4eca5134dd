//! Collaborators that materialize asset payloads.
//!
//! Each asset is fetched at most once; there is no retry. Errors here never
//! end a conversion, they are recorded on the asset that failed.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("downloads are disabled")]
    Disabled,

    #[error("unsupported URL `{0}`")]
    UnsupportedUrl(String),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("{url} is {size} bytes, over the {limit} byte limit")]
    TooLarge { url: String, size: u64, limit: u64 },

    #[error("request failed: {0}")]
    Request(String),

    #[error("path `{0}` escapes the local asset root")]
    OutsideRoot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fetched payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub data: Vec<u8>,
    /// `Content-Type` reported by the source, if any.
    pub mime_type: Option<String>,
}

impl Fetched {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }
}

/// Materializes one resolved URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Fetched, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        (**self).fetch(url)
    }
}

/// Refuses every request. Used when downloads are turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

impl Fetcher for NoFetcher {
    fn fetch(&self, _url: &str) -> Result<Fetched, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Reads local references from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a local reference under the root, rejecting `..` escapes.
    pub fn path_for(&self, url: &str) -> Result<PathBuf, FetchError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let relative = Path::new(decoded.trim_start_matches('/'));

        let mut out = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                _ => return Err(FetchError::OutsideRoot(url.to_string())),
            }
        }
        Ok(out)
    }
}

impl Fetcher for LocalFetcher {
    fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        let path = self.path_for(url)?;
        Ok(Fetched::new(std::fs::read(path)?))
    }
}

/// Blocking HTTP(S) downloads through reqwest.
#[cfg(all(feature = "download", not(target_arch = "wasm32")))]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_size: Option<u64>,
}

#[cfg(all(feature = "download", not(target_arch = "wasm32")))]
impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("jsxkit/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self {
            client,
            max_size: None,
        })
    }

    pub fn with_max_size(mut self, max_size: Option<u64>) -> Self {
        self.max_size = max_size;
        self
    }
}

#[cfg(all(feature = "download", not(target_arch = "wasm32")))]
impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if let (Some(limit), Some(size)) = (self.max_size, response.content_length())
            && size > limit
        {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size,
                limit,
            });
        }
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response
            .bytes()
            .map_err(|e| FetchError::Request(e.to_string()))?
            .to_vec();
        Ok(Fetched { data, mime_type })
    }
}

/// Routes remote URLs to one fetcher and local paths to another.
pub struct RoutingFetcher<'a> {
    pub remote: &'a dyn Fetcher,
    pub local: Option<LocalFetcher>,
}

impl Fetcher for RoutingFetcher<'_> {
    fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        if super::is_remote(url) {
            return self.remote.fetch(url);
        }
        match &self.local {
            Some(local) => local.fetch(url),
            None => Err(FetchError::UnsupportedUrl(url.to_string())),
        }
    }
}
