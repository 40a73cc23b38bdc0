/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Launch descriptors: immutable "ask the OS to open this" values.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use url::Url;

/// Auxiliary-data key under which a non-web descriptor declares a nested
/// web fallback.
pub const BROWSER_FALLBACK_KEY: &str = "browser_fallback_url";

/// Query key carrying an explicit application-package hint.
pub const PACKAGE_KEY: &str = "package";

/// Opaque identifier for an installed application (platform package or
/// bundle id). Only ever used for set-membership tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Which handler population a descriptor's target URI addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeClass {
    /// http or https; handled by browsers and verified-link apps.
    Web,
    /// Any other scheme; an app-specific registration.
    External,
    /// The input parsed but carried no URI data at all.
    None,
}

/// A request to open a URI, possibly with an app-package hint and an
/// embedded web fallback. Immutable once constructed.
///
/// Identity (`Eq`/`Hash`) covers the target URI, package hint, and
/// fallback URL. The browsable flag only widens which handlers the OS
/// reports and is deliberately excluded from comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    target: Option<Url>,
    package: Option<String>,
    fallback_url: Option<String>,
    browsable: bool,
}

/// The input string is not a URI under any recognized scheme grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorParseError {
    input: String,
    source: url::ParseError,
}

impl fmt::Display for DescriptorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a launchable uri {:?}: {}", self.input, self.source)
    }
}

impl std::error::Error for DescriptorParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl LaunchDescriptor {
    /// Parse a navigated URL string.
    ///
    /// A scheme-less string (no URI data) yields a descriptor with no
    /// target; that is the normal "nothing to redirect" shape, not an
    /// error. Anything else that fails the URI grammar is a parse error.
    pub fn parse(input: &str) -> Result<Self, DescriptorParseError> {
        match Url::parse(input) {
            Ok(url) => Ok(Self::from_url(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Self {
                target: None,
                package: None,
                fallback_url: None,
                browsable: false,
            }),
            Err(source) => Err(DescriptorParseError {
                input: input.to_string(),
                source,
            }),
        }
    }

    /// Wrap an already-parsed URL, lifting the `browser_fallback_url` and
    /// `package` auxiliary keys out of its query.
    pub fn from_url(url: Url) -> Self {
        let fallback_url = query_param(&url, BROWSER_FALLBACK_KEY);
        let package = query_param(&url, PACKAGE_KEY);
        Self {
            target: Some(url),
            package,
            fallback_url,
            browsable: false,
        }
    }

    pub fn target(&self) -> Option<&Url> {
        self.target.as_ref()
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn fallback_url(&self) -> Option<&str> {
        self.fallback_url.as_deref()
    }

    pub fn is_browsable(&self) -> bool {
        self.browsable
    }

    pub fn scheme_class(&self) -> SchemeClass {
        match self.target.as_ref().map(Url::scheme) {
            Some("http") | Some("https") => SchemeClass::Web,
            Some(_) => SchemeClass::External,
            None => SchemeClass::None,
        }
    }

    /// Add the platform's "browsable" category so generic browsers appear
    /// in the handler set. Identity is unaffected.
    pub fn into_browsable(mut self) -> Self {
        self.browsable = true;
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_fallback_url(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_url = Some(fallback.into());
        self
    }
}

impl PartialEq for LaunchDescriptor {
    fn eq(&self, other: &Self) -> bool {
        // Browsable flag excluded: it widens handler queries, it does not
        // change which launch this descriptor denotes.
        self.target == other.target
            && self.package == other.package
            && self.fallback_url == other.fallback_url
    }
}

impl Eq for LaunchDescriptor {}

impl Hash for LaunchDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.package.hash(state);
        self.fallback_url.hash(state);
    }
}

impl fmt::Display for LaunchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(url) => write!(f, "{url}"),
            None => f.write_str("<no uri>"),
        }
    }
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find_map(|(k, v)| (k == key).then(|| v.into_owned()))
}
