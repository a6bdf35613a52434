/// Image URL validator
///
/// A listing image must be an absolute http(s) URL whose path ends in an image
/// extension, and the server behind it must answer a HEAD request with an
/// `image/*` content type. The network check goes through [`ImageProbe`] so
/// callers can swap the transport.
///
/// # Example
///
/// ```no_run
/// use gavel_shared::validation::image_url::{validate_image_url, HttpImageProbe};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let probe = HttpImageProbe::new(Duration::from_secs(5))?;
/// validate_image_url("https://example.com/cat.png", &probe).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use std::time::Duration;

/// Extensions accepted at the end of the URL path (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"];

/// Why an image URL was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUrlError {
    #[error("Enter a valid URL.")]
    InvalidUrl,

    #[error("URL does not point to a valid image file extension.")]
    BadExtension,

    #[error("URL does not point to a valid image.")]
    NotAnImage,

    #[error("URL could not be reached.")]
    Unreachable,
}

/// Transport failure while probing
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),
}

/// Looks up the content type a URL serves
#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Returns the `Content-Type` header of the final response, if any
    async fn content_type(&self, url: &Url) -> Result<Option<String>, ProbeError>;
}

/// [`ImageProbe`] backed by a reqwest client sending HEAD requests
///
/// Redirects are followed (up to reqwest's default limit).
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gavel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn content_type(&self, url: &Url) -> Result<Option<String>, ProbeError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Transport(e.to_string())
                }
            })?;

        Ok(response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string))
    }
}

/// Parses an absolute http(s) URL
///
/// # Errors
///
/// Returns [`ImageUrlError::InvalidUrl`] for anything else.
pub fn parse_web_url(raw: &str) -> Result<Url, ImageUrlError> {
    let url = Url::parse(raw.trim()).map_err(|_| ImageUrlError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|host| !host.is_empty()) => Ok(url),
        _ => Err(ImageUrlError::InvalidUrl),
    }
}

/// Whether the URL path ends in a known image extension
pub fn has_image_extension(url: &Url) -> bool {
    let file_name = url.path().rsplit('/').next().unwrap_or_default();

    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty()
                && IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Validates an image URL, probing it over the network last
///
/// # Errors
///
/// See [`ImageUrlError`]; checks run in declaration order and stop at the first failure.
pub async fn validate_image_url(raw: &str, probe: &dyn ImageProbe) -> Result<Url, ImageUrlError> {
    let url = parse_web_url(raw)?;

    if !has_image_extension(&url) {
        return Err(ImageUrlError::BadExtension);
    }

    let content_type = probe.content_type(&url).await.map_err(|e| {
        tracing::debug!(url = %url, error = %e, "Image probe failed");
        ImageUrlError::Unreachable
    })?;

    let is_image = content_type
        .map(|value| value.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false);

    if !is_image {
        return Err(ImageUrlError::NotAnImage);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::header,
        response::{IntoResponse, Redirect},
        routing::get,
        Router,
    };
    use std::net::SocketAddr;

    /// Probe that answers without touching the network
    struct FixedProbe(Result<Option<&'static str>, ()>);

    #[async_trait]
    impl ImageProbe for FixedProbe {
        async fn content_type(&self, _url: &Url) -> Result<Option<String>, ProbeError> {
            match self.0 {
                Ok(value) => Ok(value.map(str::to_string)),
                Err(()) => Err(ProbeError::Transport("connection refused".into())),
            }
        }
    }

    async fn serve_images() -> SocketAddr {
        let app = Router::new()
            .route(
                "/cat.png",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], "png").into_response() }),
            )
            .route(
                "/page.png",
                get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html>").into_response() }),
            )
            .route("/moved.JPG", get(|| async { Redirect::temporary("/cat.png") }))
            .route(
                "/slow.png",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    ([(header::CONTENT_TYPE, "image/png")], "png").into_response()
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[test]
    fn test_parse_web_url() {
        assert!(parse_web_url("https://example.com/a.png").is_ok());
        assert!(parse_web_url("  http://example.com/a.png ").is_ok());

        for raw in ["", "not a url", "example.com/a.png", "ftp://example.com/a.png", "file:///tmp/a.png"] {
            assert_eq!(parse_web_url(raw), Err(ImageUrlError::InvalidUrl), "{raw:?}");
        }
    }

    #[test]
    fn test_has_image_extension() {
        let ok = [
            "https://x.io/a.jpg",
            "https://x.io/a.JPEG",
            "https://x.io/dir/a.b.webp",
            "https://x.io/a.tiff?size=large",
        ];
        for raw in ok {
            assert!(has_image_extension(&Url::parse(raw).unwrap()), "{raw}");
        }

        let bad = [
            "https://x.io/a.svg",
            "https://x.io/a",
            "https://x.io/",
            "https://x.io/a.png/",
            "https://x.io/.png",
            "https://x.io/page?file=a.png",
        ];
        for raw in bad {
            assert!(!has_image_extension(&Url::parse(raw).unwrap()), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_validation_order_with_fixed_probe() {
        let image = FixedProbe(Ok(Some("image/jpeg")));
        let html = FixedProbe(Ok(Some("text/html; charset=utf-8")));
        let missing = FixedProbe(Ok(None));
        let down = FixedProbe(Err(()));

        assert!(validate_image_url("https://x.io/a.jpg", &image).await.is_ok());
        assert_eq!(
            validate_image_url("nope", &image).await,
            Err(ImageUrlError::InvalidUrl)
        );
        assert_eq!(
            validate_image_url("https://x.io/a.txt", &down).await,
            Err(ImageUrlError::BadExtension)
        );
        assert_eq!(
            validate_image_url("https://x.io/a.jpg", &html).await,
            Err(ImageUrlError::NotAnImage)
        );
        assert_eq!(
            validate_image_url("https://x.io/a.jpg", &missing).await,
            Err(ImageUrlError::NotAnImage)
        );
        assert_eq!(
            validate_image_url("https://x.io/a.jpg", &down).await,
            Err(ImageUrlError::Unreachable)
        );
    }

    #[tokio::test]
    async fn test_http_probe_against_local_server() {
        let addr = serve_images().await;
        let probe = HttpImageProbe::new(Duration::from_secs(5)).unwrap();

        let ok = format!("http://{addr}/cat.png");
        assert!(validate_image_url(&ok, &probe).await.is_ok());

        let redirected = format!("http://{addr}/moved.JPG");
        assert!(validate_image_url(&redirected, &probe).await.is_ok());

        let html = format!("http://{addr}/page.png");
        assert_eq!(
            validate_image_url(&html, &probe).await,
            Err(ImageUrlError::NotAnImage)
        );
    }

    #[tokio::test]
    async fn test_http_probe_unreachable_and_timeout() {
        let closed = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let probe = HttpImageProbe::new(Duration::from_secs(5)).unwrap();
        assert_eq!(
            validate_image_url(&format!("http://{closed}/a.png"), &probe).await,
            Err(ImageUrlError::Unreachable)
        );

        let addr = serve_images().await;
        let impatient = HttpImageProbe::new(Duration::from_millis(100)).unwrap();
        assert_eq!(
            validate_image_url(&format!("http://{addr}/slow.png"), &impatient).await,
            Err(ImageUrlError::Unreachable)
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ImageUrlError::InvalidUrl.to_string(), "Enter a valid URL.");
        assert_eq!(
            ImageUrlError::BadExtension.to_string(),
            "URL does not point to a valid image file extension."
        );
        assert_eq!(ImageUrlError::Unreachable.to_string(), "URL could not be reached.");
    }
}
