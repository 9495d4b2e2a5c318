//! Page location: the URL a document was loaded from.

use std::fmt;

use url::Url;

use crate::errors::LocationError;

/// How the page was opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// Opened straight from disk (`file:`).
    LocalFile,
    /// Served over the network.
    Network,
}

/// Parsed page URL. Immutable for the life of a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parse an absolute URL.
    pub fn parse(href: &str) -> Result<Self, LocationError> {
        let url = Url::parse(href).map_err(|source| LocationError::Invalid {
            href: href.to_string(),
            source,
        })?;
        Self::from_url(url)
    }

    /// Wrap an already parsed URL.
    pub fn from_url(url: Url) -> Result<Self, LocationError> {
        if url.cannot_be_a_base() {
            return Err(LocationError::NotHierarchical(url.to_string()));
        }
        Ok(Self { url })
    }

    /// Location of a file on disk.
    pub fn from_file_path(path: &std::path::Path) -> Result<Self, LocationError> {
        let url = Url::from_file_path(path)
            .map_err(|()| LocationError::NotAbsolute(path.display().to_string()))?;
        Self::from_url(url)
    }

    /// Scheme family.
    pub fn origin(&self) -> Origin {
        if self.url.scheme() == "file" {
            Origin::LocalFile
        } else {
            Origin::Network
        }
    }

    /// Path component, percent-encoded as it appears in the URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Full URL string.
    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// The underlying URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolve a reference against this page, the way a browser resolves an
    /// `href` attribute.
    pub fn resolve(&self, reference: &str) -> Result<Url, LocationError> {
        self.url
            .join(reference)
            .map_err(|source| LocationError::Invalid {
                href: reference.to_string(),
                source,
            })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn origin_from_scheme() {
        let net = Location::parse("https://websoul.co.kr/about/").unwrap();
        assert_eq!(net.origin(), Origin::Network);
        let file = Location::parse("file:///srv/site/index.html").unwrap();
        assert_eq!(file.origin(), Origin::LocalFile);
    }

    #[test]
    fn path_is_url_path() {
        let loc = Location::parse("https://websoul.co.kr/project/guide.html?x=1#top").unwrap();
        assert_eq!(loc.path(), "/project/guide.html");
    }

    #[test]
    fn resolve_relative_reference() {
        let loc = Location::parse("https://websoul.co.kr/about/team.html").unwrap();
        let url = loc.resolve("../components/header.html").unwrap();
        assert_eq!(url.as_str(), "https://websoul.co.kr/components/header.html");
    }

    #[test]
    fn resolve_against_file_directory() {
        let loc = Location::parse("file:///srv/site/about/team.html").unwrap();
        let url = loc.resolve("../components/footer.html").unwrap();
        assert_eq!(url.as_str(), "file:///srv/site/components/footer.html");
    }

    #[test]
    fn rejects_relative_and_opaque() {
        assert_matches!(
            Location::parse("about/index.html"),
            Err(LocationError::Invalid { .. })
        );
        assert_matches!(
            Location::parse("mailto:support@websoul.co.kr"),
            Err(LocationError::NotHierarchical(_))
        );
    }
}
