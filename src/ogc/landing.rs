use url::Url;

use crate::error::SourceError;

/// An OGC API landing page, optionally narrowed to one collection.
///
/// Immutable once built. Also resolves the root-relative hrefs found in the
/// documents the service returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingPage {
    /// Landing page URL without trailing slash
    url: String,

    /// `http` or `https`
    scheme: String,

    /// `scheme://host[:port]` of the landing page
    origin: String,

    /// Collection identifier, if the source serves a single collection
    collection: Option<String>,
}

impl LandingPage {
    /// Create a landing page from its URL and an optional collection identifier.
    ///
    /// The URL must be an absolute `http` or `https` URL.
    pub fn new(url: &str, collection: Option<&str>) -> Result<Self, SourceError> {
        let trimmed = url.trim().trim_end_matches('/');
        let invalid = |message: &str| SourceError::InvalidLandingPage {
            url: url.to_string(),
            message: message.to_string(),
        };

        let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("URL has no host"));
        }

        Ok(Self {
            url: trimmed.to_string(),
            scheme: parsed.scheme().to_string(),
            origin: parsed.origin().ascii_serialization(),
            collection: collection
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }

    /// Landing page URL, without trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Collection identifier, if any.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// URL of the resource that carries the `tilesets-map` link.
    ///
    /// `{landing}/collections/{id}` for a collection, the landing page otherwise.
    pub fn collection_url(&self) -> String {
        match &self.collection {
            Some(collection) => format!("{}/collections/{}", self.url, collection),
            None => self.url.clone(),
        }
    }

    /// Make an href absolute.
    ///
    /// Root-relative hrefs keep only the scheme and host of the landing page, the
    /// landing page's own path is discarded. Scheme-relative hrefs (`//host/...`)
    /// get the landing page scheme. Everything else is returned as is. This is plain
    /// string concatenation so URL templates keep their braces.
    pub fn resolve_href(&self, href: &str) -> String {
        if href.starts_with("//") {
            format!("{}:{}", self.scheme, href)
        } else if href.starts_with('/') {
            format!("{}{}", self.origin, href)
        } else {
            href.to_string()
        }
    }
}
