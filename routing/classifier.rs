// =============================================================================
// SWCACHE - Storefront Worker Cache
// File: routing/classifier.rs
// Role: Request classifier (fixed rule schema, deterministic precedence)
// Philosophy: One immutable policy per deployment, first and last.
// -----------------------------------------------------------------------------
// Responsibilities:
// - Fixed rule schema: origin/destination/path matchers per resource class.
// - Deterministic evaluation order: image -> cdn (unless excluded) -> static.
// - Pure function of (origin, destination, path); never looks at responses.
// =============================================================================

use crate::config::RouteTable;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceClass {
    Image,
    ThirdPartyCdn,
    StaticFont,
    /// No strategy: forwarded to the network untouched.
    Other,
}

impl ResourceClass {
    pub const HANDLED: [ResourceClass; 3] =
        [ResourceClass::Image, ResourceClass::ThirdPartyCdn, ResourceClass::StaticFont];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Image => "image",
            ResourceClass::ThirdPartyCdn => "cdn",
            ResourceClass::StaticFont => "static",
            ResourceClass::Other => "other",
        }
    }

    pub fn meta_flag(&self) -> u32 {
        match self {
            ResourceClass::Image => crate::meta::ROUTE_IMAGE,
            ResourceClass::ThirdPartyCdn => crate::meta::ROUTE_CDN,
            ResourceClass::StaticFont => crate::meta::ROUTE_STATIC,
            ResourceClass::Other => crate::meta::ROUTE_OTHER,
        }
    }
}

/// Intercepted request as seen by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub origin: String,
    pub path: String,
    /// Query string including the leading '?', or empty.
    pub query: String,
    /// Fetch destination ("font", "image", "script", ... or empty).
    pub destination: String,
}

impl Request {
    pub fn new(origin: &str, path: &str, destination: &str) -> Self {
        Self {
            origin: origin.to_string(),
            path: path.to_string(),
            query: String::new(),
            destination: destination.to_string(),
        }
    }

    /// Split an absolute url into origin, path and query. Fragments are dropped.
    ///
    /// The origin is serialized the way a browser does: lowercase scheme and
    /// host, no userinfo, no default port.
    pub fn from_url(url: &str, destination: &str) -> Option<Self> {
        let url = url.split('#').next().unwrap_or(url);
        let scheme_at = url.find("://")?;
        let scheme = url[..scheme_at].to_ascii_lowercase();
        let rest = &url[scheme_at + 3..];
        let host_len = rest.find(['/', '?']).unwrap_or(rest.len());
        let authority = &rest[..host_len];
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        if scheme.is_empty() || host_port.is_empty() {
            return None;
        }
        let mut host = host_port.to_ascii_lowercase();
        let default_port = match scheme.as_str() {
            "https" => Some(":443"),
            "http" => Some(":80"),
            _ => None,
        };
        if let Some(port) = default_port {
            if let Some(bare) = host.strip_suffix(port) {
                host = bare.to_string();
            }
        }
        let origin = format!("{}://{}", scheme, host);
        let tail = &rest[host_len..];
        let (path, query) = match tail.find('?') {
            Some(q) => (&tail[..q], &tail[q..]),
            None => (tail, ""),
        };
        let path = if path.is_empty() { "/" } else { path };
        Some(Self {
            origin,
            path: path.to_string(),
            query: query.to_string(),
            destination: destination.to_string(),
        })
    }

    /// Cache key: the full url.
    pub fn url(&self) -> String {
        format!("{}{}{}", self.origin, self.path, self.query)
    }
}

#[derive(Clone, Debug)]
pub enum Field {
    Origin,
    Destination,
    Path,
}

#[derive(Clone, Debug)]
pub enum Matcher {
    Eq(String),
    Contains(String),
    /// Trailing suffix, ASCII case-insensitive.
    SuffixCi(String),
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub field: Field,
    pub matcher: Matcher,
}

impl Rule {
    fn new(field: Field, matcher: Matcher) -> Self {
        Self { field, matcher }
    }

    fn matches(&self, req: &Request) -> bool {
        let hay = match self.field {
            Field::Origin => req.origin.as_str(),
            Field::Destination => req.destination.as_str(),
            Field::Path => req.path.as_str(),
        };
        match &self.matcher {
            Matcher::Eq(x) => hay == x,
            Matcher::Contains(needle) => hay.contains(needle.as_str()),
            Matcher::SuffixCi(s) => ends_with_ci(hay, s),
        }
    }

    fn describe(&self) -> String {
        let field = match self.field {
            Field::Origin => "origin",
            Field::Destination => "destination",
            Field::Path => "path",
        };
        match &self.matcher {
            Matcher::Eq(s) => format!("{} eq({})", field, s),
            Matcher::Contains(s) => format!("{} contains({})", field, s),
            Matcher::SuffixCi(s) => format!("{} suffix({})", field, s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub class: ResourceClass,
    pub reason: String,
}

pub struct Classifier {
    image: Vec<Rule>,
    cdn: Vec<Rule>,
    cdn_exclusions: Vec<Rule>,
    statics: Vec<Rule>,
}

impl Classifier {
    pub fn new(routes: &RouteTable) -> Self {
        let eq = |field: fn() -> Field, items: &[String]| -> Vec<Rule> {
            items.iter().map(|s| Rule::new(field(), Matcher::Eq(s.clone()))).collect()
        };
        let mut statics = eq(|| Field::Destination, &routes.static_destinations);
        statics.extend(
            routes
                .static_extensions
                .iter()
                .map(|ext| Rule::new(Field::Path, Matcher::SuffixCi(ext.clone()))),
        );
        Self {
            image: eq(|| Field::Origin, &routes.image_origins),
            cdn: eq(|| Field::Origin, &routes.cdn_origins),
            cdn_exclusions: routes
                .exclude_path_substrings
                .iter()
                .map(|s| Rule::new(Field::Path, Matcher::Contains(s.clone())))
                .collect(),
            statics,
        }
    }

    /// Hot path: no allocation.
    pub fn classify(&self, req: &Request) -> ResourceClass {
        return self.matched(req).map(|(class, _)| class).unwrap_or(ResourceClass::Other);
    }

    /// Classification with the rule that produced it, for diagnostics.
    pub fn decide(&self, req: &Request) -> Decision {
        match self.matched(req) {
            Some((class, rule)) => Decision { class, reason: rule.describe() },
            None => Decision { class: ResourceClass::Other, reason: "no rule matched".to_string() },
        }
    }

    fn matched(&self, req: &Request) -> Option<(ResourceClass, &Rule)> {
        if let Some(r) = first_match(&self.image, req) {
            return Some((ResourceClass::Image, r));
        }
        // excluded paths may still land in the static bucket
        if let Some(r) = first_match(&self.cdn, req) {
            if first_match(&self.cdn_exclusions, req).is_none() {
                return Some((ResourceClass::ThirdPartyCdn, r));
            }
        }
        return first_match(&self.statics, req).map(|r| (ResourceClass::StaticFont, r));
    }
}

fn first_match<'a>(rules: &'a [Rule], req: &Request) -> Option<&'a Rule> {
    rules.iter().find(|r| r.matches(req))
}

fn ends_with_ci(hay: &str, suffix: &str) -> bool {
    let (h, s) = (hay.as_bytes(), suffix.as_bytes());
    h.len() >= s.len() && h[h.len() - s.len()..].eq_ignore_ascii_case(s)
}
