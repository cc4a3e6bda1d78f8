//! Platform locator normalization.
//!
//! A creator hands us "platform + something" where the something may be a
//! raw identifier or any of the platform's URL spellings. Both must
//! normalize to one canonical form per platform so later equality checks
//! are locator-format-independent.
//!
//! Normalization is a pure string/URL transform. No network calls. Each
//! platform owns one entry in an open strategy table; adding a platform
//! never touches another platform's logic. A URL-shaped input whose host
//! or path shape is not recognized is an error, never silently treated as
//! an opaque identifier.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::BindingError;

/// A platform name: lowercase ASCII, the key of the strategy table.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform(String);

impl Platform {
    /// Create a platform name. Lowercases the input; rejects anything
    /// outside `[a-z0-9_-]`.
    pub fn new(name: &str) -> Result<Self, BindingError> {
        let lowered = name.trim().to_ascii_lowercase();
        if lowered.is_empty()
            || !lowered
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(BindingError::InvalidPlatform(name.to_string()));
        }
        Ok(Self(lowered))
    }

    /// The platform name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Platform({})", self.0)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A normalized platform locator: `platform:id`.
///
/// Equality on this type is the "is this the bound video?" check, which is
/// why construction only happens through [`PlatformResolver::normalize`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalLocator {
    /// The (alias-resolved) platform.
    pub platform: Platform,
    /// The platform-native identifier.
    pub id: String,
}

impl fmt::Debug for CanonicalLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalLocator({}:{})", self.platform, self.id)
    }
}

impl fmt::Display for CanonicalLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.id)
    }
}

/// A platform's normalize function: raw input to canonical identifier.
pub type NormalizeFn = fn(&str) -> Result<String, BindingError>;

/// The open strategy table mapping platform names to normalizers.
pub struct PlatformResolver {
    table: HashMap<String, NormalizeFn>,
    aliases: HashMap<String, String>,
}

impl PlatformResolver {
    /// A resolver with the built-in platform table.
    pub fn new() -> Self {
        let mut resolver = Self::empty();
        resolver.register("youtube", normalize_youtube);
        resolver.register("vimeo", normalize_vimeo);
        resolver.register("twitter", normalize_twitter);
        resolver.register("instagram", normalize_instagram);
        resolver.register("tiktok", normalize_tiktok);
        resolver.register("soundcloud", normalize_soundcloud);
        resolver.alias("x", "twitter");
        resolver
    }

    /// A resolver with no platforms registered.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Register (or replace) a platform normalizer.
    pub fn register(&mut self, platform: &str, normalize: NormalizeFn) {
        self.table.insert(platform.to_ascii_lowercase(), normalize);
    }

    /// Register a platform name alias, e.g. `x` for `twitter`.
    pub fn alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_ascii_lowercase(), canonical.to_ascii_lowercase());
    }

    /// Normalize a raw locator for a platform.
    ///
    /// Unknown platforms still get generic handling: a bare identifier is
    /// accepted opaquely, but a URL is rejected since we know none of the
    /// platform's URL shapes.
    pub fn normalize(&self, platform: &str, raw: &str) -> Result<CanonicalLocator, BindingError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BindingError::EmptyLocator);
        }

        let platform = Platform::new(platform)?;
        let name = self
            .aliases
            .get(platform.name())
            .cloned()
            .unwrap_or_else(|| platform.name().to_string());

        let id = match self.table.get(&name) {
            Some(normalize) => normalize(raw)?,
            None => normalize_opaque(&name, raw)?,
        };

        Ok(CanonicalLocator {
            platform: Platform(name),
            id,
        })
    }
}

impl Default for PlatformResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn unrecognized(platform: &str, input: &str) -> BindingError {
    BindingError::UnrecognizedFormat {
        platform: platform.to_string(),
        input: input.to_string(),
    }
}

/// Parse an http(s) URL if the input is URL-shaped.
///
/// Returns `None` for non-URL input. URL-shaped input that does not parse
/// as http(s)-with-host yields `Some(None)`: the caller must error out,
/// not fall through to opaque handling.
fn parse_http_url(raw: &str) -> Option<Option<Url>> {
    if !raw.contains("://") {
        return None;
    }
    let parsed = Url::parse(raw).ok().filter(|u| {
        (u.scheme() == "http" || u.scheme() == "https") && u.host_str().is_some()
    });
    Some(parsed)
}

/// Host with any leading `www.` stripped.
fn bare_host(url: &Url) -> &str {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host)
}

/// Non-empty path segments.
fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default()
}

fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Generic opaque identifier: non-empty, no whitespace, not URL-shaped.
fn normalize_opaque(platform: &str, raw: &str) -> Result<String, BindingError> {
    if raw.contains("://") || raw.chars().any(char::is_whitespace) {
        return Err(unrecognized(platform, raw));
    }
    Ok(raw.to_string())
}

// ─────────────────────────────────────────────────────────────────────────
// Built-in platform normalizers
// ─────────────────────────────────────────────────────────────────────────

fn normalize_youtube(raw: &str) -> Result<String, BindingError> {
    const P: &str = "youtube";

    if let Some(url) = parse_http_url(raw) {
        let url = url.ok_or_else(|| unrecognized(P, raw))?;
        let segs = segments(&url);

        let id = match bare_host(&url) {
            "youtube.com" | "m.youtube.com" | "music.youtube.com" => match segs.as_slice() {
                ["watch"] => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                ["shorts", id] | ["embed", id] | ["live", id] | ["v", id] => {
                    Some((*id).to_string())
                }
                _ => None,
            },
            "youtu.be" => match segs.as_slice() {
                [id] => Some((*id).to_string()),
                _ => None,
            },
            _ => None,
        };

        return match id {
            Some(id) if is_slug(&id) => Ok(id),
            _ => Err(unrecognized(P, raw)),
        };
    }

    if is_slug(raw) {
        Ok(raw.to_string())
    } else {
        Err(unrecognized(P, raw))
    }
}

fn normalize_vimeo(raw: &str) -> Result<String, BindingError> {
    const P: &str = "vimeo";

    if let Some(url) = parse_http_url(raw) {
        let url = url.ok_or_else(|| unrecognized(P, raw))?;
        let segs = segments(&url);

        let id = match bare_host(&url) {
            "vimeo.com" => match segs.as_slice() {
                [id] => Some(*id),
                _ => None,
            },
            "player.vimeo.com" => match segs.as_slice() {
                ["video", id] => Some(*id),
                _ => None,
            },
            _ => None,
        };

        return match id {
            Some(id) if is_digits(id) => Ok(id.to_string()),
            _ => Err(unrecognized(P, raw)),
        };
    }

    if is_digits(raw) {
        Ok(raw.to_string())
    } else {
        Err(unrecognized(P, raw))
    }
}

fn normalize_twitter(raw: &str) -> Result<String, BindingError> {
    const P: &str = "twitter";

    if let Some(url) = parse_http_url(raw) {
        let url = url.ok_or_else(|| unrecognized(P, raw))?;
        let segs = segments(&url);

        let id = match bare_host(&url) {
            "twitter.com" | "mobile.twitter.com" | "x.com" => match segs.as_slice() {
                // /<user>/status/<id> with optional trailing noise
                // (/photo/1 and friends).
                [_, "status", id, ..] => Some(*id),
                ["i", "web", "status", id] => Some(*id),
                _ => None,
            },
            _ => None,
        };

        return match id {
            Some(id) if is_digits(id) => Ok(id.to_string()),
            _ => Err(unrecognized(P, raw)),
        };
    }

    if is_digits(raw) {
        Ok(raw.to_string())
    } else {
        Err(unrecognized(P, raw))
    }
}

fn normalize_instagram(raw: &str) -> Result<String, BindingError> {
    const P: &str = "instagram";

    if let Some(url) = parse_http_url(raw) {
        let url = url.ok_or_else(|| unrecognized(P, raw))?;
        let segs = segments(&url);

        let id = match bare_host(&url) {
            "instagram.com" | "instagr.am" => match segs.as_slice() {
                ["p", code] | ["reel", code] | ["reels", code] | ["tv", code] => Some(*code),
                _ => None,
            },
            _ => None,
        };

        return match id {
            Some(code) if is_slug(code) => Ok(code.to_string()),
            _ => Err(unrecognized(P, raw)),
        };
    }

    if is_slug(raw) {
        Ok(raw.to_string())
    } else {
        Err(unrecognized(P, raw))
    }
}

fn normalize_tiktok(raw: &str) -> Result<String, BindingError> {
    const P: &str = "tiktok";

    if let Some(url) = parse_http_url(raw) {
        let url = url.ok_or_else(|| unrecognized(P, raw))?;
        let segs = segments(&url);

        // vm.tiktok.com short links only resolve over the network, which
        // normalization must not do.
        let id = match bare_host(&url) {
            "tiktok.com" | "m.tiktok.com" => match segs.as_slice() {
                [user, "video", id] if user.starts_with('@') => Some(*id),
                _ => None,
            },
            _ => None,
        };

        return match id {
            Some(id) if is_digits(id) => Ok(id.to_string()),
            _ => Err(unrecognized(P, raw)),
        };
    }

    if is_digits(raw) {
        Ok(raw.to_string())
    } else {
        Err(unrecognized(P, raw))
    }
}

fn normalize_soundcloud(raw: &str) -> Result<String, BindingError> {
    const P: &str = "soundcloud";

    let slug_pair = |user: &str, track: &str| {
        if is_slug(user) && is_slug(track) {
            Some(format!("{user}/{track}"))
        } else {
            None
        }
    };

    if let Some(url) = parse_http_url(raw) {
        let url = url.ok_or_else(|| unrecognized(P, raw))?;
        let segs = segments(&url);

        let id = match bare_host(&url) {
            "soundcloud.com" => match segs.as_slice() {
                [user, track] => slug_pair(user, track),
                _ => None,
            },
            _ => None,
        };

        return id.ok_or_else(|| unrecognized(P, raw));
    }

    match raw.split('/').collect::<Vec<_>>().as_slice() {
        [user, track] => slug_pair(user, track).ok_or_else(|| unrecognized(P, raw)),
        _ => Err(unrecognized(P, raw)),
    }
}
