// src/fetch/source.rs
// =============================================================================
// Where the listing page and image bytes come from.
//
// The rest of the crate only needs three things from the network:
// - "give me the listing page at this path"   -> ListingSource
// - "open this image path"                     -> ImageSource
// - "give me the next chunk of the body"      -> ImageBody
//
// HttpSite is the real implementation on top of reqwest; tests plug in an
// in-memory site instead.
//
// Rust concepts:
// - Traits with async fns: the fetcher is generic over where bytes come from
// - Associated types: each source picks its own body type
// =============================================================================

use bytes::Bytes;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::error::FetchError;

// Sent with every request, e.g. "item-harvest/0.1.0"
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A body being streamed, one chunk at a time.
#[allow(async_fn_in_trait)]
pub trait ImageBody {
    /// Next chunk, or `None` once the body is exhausted.
    async fn chunk(&mut self) -> Result<Option<Bytes>, FetchError>;
}

/// Anything that can open an image by its path relative to the source host.
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    type Body: ImageBody;

    async fn open(&self, remote_path: &str) -> Result<Self::Body, FetchError>;
}

/// Anything that can hand out the item listing page as text.
#[allow(async_fn_in_trait)]
pub trait ListingSource {
    async fn fetch_listing(&self, path: &str) -> Result<String, FetchError>;
}

/// The source website: one pooled HTTP client plus the host everything is
/// relative to.
#[derive(Debug, Clone)]
pub struct HttpSite {
    client: Client,
    base: Url,
}

impl HttpSite {
    // Creates a site with a default client
    //
    // Parameters:
    //   base: the host all paths are joined onto (e.g. "https://www.digminecraft.com")
    //
    // Returns: Err only if reqwest cannot set up its TLS backend
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        // No timeout: a download runs until it finishes or fails
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, base))
    }

    // Creates a site around an already configured client
    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    // Turns a site-relative path into an absolute URL
    //
    // Example:
    //   base = "https://www.digminecraft.com"
    //   path = "/basic_recipes/images/stone.png"
    //   -> "https://www.digminecraft.com/basic_recipes/images/stone.png"
    fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base.join(path).map_err(|source| FetchError::BadPath {
            path: path.to_string(),
            source,
        })
    }

    // Sends a GET and checks the status
    //
    // Parameters:
    //   path: site-relative path of the page or image
    //
    // Returns: (absolute url, response) for any 2xx answer
    //
    // Non-2xx answers become FetchError::Status, so callers never see the
    // body of an error page.
    async fn get(&self, path: &str) -> Result<(String, Response), FetchError> {
        let url = self.resolve(path)?;
        // Keep the text form around for error messages
        let url_text = url.to_string();
        debug!(url = %url_text, "GET");

        // Connection, DNS and TLS problems all end up here
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(source) => return Err(FetchError::Request { url: url_text, source }),
        };

        // 3xx are followed by reqwest itself, so anything left that is not
        // 2xx is a real failure
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }

        Ok((url_text, response))
    }
}

impl ListingSource for HttpSite {
    // Downloads the whole listing page and decodes it as text
    async fn fetch_listing(&self, path: &str) -> Result<String, FetchError> {
        let (url, response) = self.get(path).await?;
        response
            .text()
            .await
            .map_err(|source| FetchError::Request { url, source })
    }
}

/// A streaming reqwest response body.
#[derive(Debug)]
pub struct HttpBody {
    // Remembered for error messages while streaming
    url: String,
    response: Response,
}

impl ImageBody for HttpBody {
    // Pulls the next piece of the body off the connection
    // Returns Ok(None) once the server has sent everything
    async fn chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        self.response
            .chunk()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })
    }
}

impl ImageSource for HttpSite {
    type Body = HttpBody;

    // Starts the download; the body is read later, chunk by chunk
    async fn open(&self, remote_path: &str) -> Result<HttpBody, FetchError> {
        let (url, response) = self.get(remote_path).await?;
        Ok(HttpBody { url, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Answers exactly one request with the given status line and body.
    async fn serve_once(status: &'static str, body: &'static [u8]) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    // Local responder only; ignore any proxy set in the environment
    fn local_site(base: Url) -> HttpSite {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpSite::with_client(client, base)
    }

    #[tokio::test]
    async fn test_fetch_listing_returns_page_text() {
        let base = serve_once("200 OK", b"<table></table>").await;
        let site = local_site(base);

        let html = site.fetch_listing("/lists/items.php").await.unwrap();

        assert_eq!(html, "<table></table>");
    }

    #[tokio::test]
    async fn test_open_streams_whole_body() {
        let base = serve_once("200 OK", b"\x89PNG fake image bytes").await;
        let site = local_site(base);

        let mut body = site.open("/images/stone.png").await.unwrap();
        let mut received = Vec::new();
        while let Some(chunk) = body.chunk().await.unwrap() {
            received.extend_from_slice(&chunk);
        }

        assert_eq!(received, b"\x89PNG fake image bytes");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let base = serve_once("404 Not Found", b"not here").await;
        let site = local_site(base);

        let err = site.open("/images/missing.png").await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
