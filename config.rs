// ============================================================================
// SWCACHE - Storefront Worker Cache
// File: config.rs
// Role: Immutable worker policy (bucket names, routes, limits, flags)
// ----------------------------------------------------------------------------
// Built once at startup and handed to the classifier, the strategies and the
// lifecycle manager. Nothing here is reloaded while the worker runs.
// ============================================================================

use crate::cache::Expiration;
use crate::routing::classifier::ResourceClass;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cache name prefix must not be empty")]
    EmptyPrefix,
    #[error("bucket '{0}' must allow at least one entry")]
    ZeroCapacity(&'static str),
    #[error("static extension '{0}' must start with '.'")]
    BadExtension(String),
    #[error("origin '{0}' must be scheme://host without a trailing slash")]
    BadOrigin(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheNames {
    pub prefix: String,
    /// Embedded in every bucket name so a new deployment starts fresh.
    pub build_tag: String,
    pub precache_revision: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub image_origins: Vec<String>,
    pub cdn_origins: Vec<String>,
    pub static_destinations: Vec<String>,
    pub static_extensions: Vec<String>,
    /// Payment SDK / checkout preload paths kept out of the CDN bucket.
    pub exclude_path_substrings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerClass<T> {
    pub images: T,
    pub cdn: T,
    #[serde(rename = "static")]
    pub static_assets: T,
}

impl<T> PerClass<T> {
    pub fn get(&self, class: ResourceClass) -> Option<&T> {
        match class {
            ResourceClass::Image => Some(&self.images),
            ResourceClass::ThirdPartyCdn => Some(&self.cdn),
            ResourceClass::StaticFont => Some(&self.static_assets),
            ResourceClass::Other => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    pub names: CacheNames,
    pub routes: RouteTable,
    pub expiration: PerClass<Expiration>,
    #[serde(default)]
    pub monitoring_enabled: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            names: CacheNames {
                prefix: "bestShort".to_string(),
                build_tag: "0709".to_string(),
                precache_revision: "v2".to_string(),
            },
            routes: RouteTable {
                image_origins: strings(&["https://img.staticdj.com"]),
                cdn_origins: strings(&[
                    "https://app-assets.staticdj.com",
                    "https://cn.static.shoplazza.com",
                    "https://static.staticdj.com",
                ]),
                static_destinations: strings(&["font"]),
                static_extensions: strings(&[".woff", ".woff2", ".ttf", ".eot"]),
                exclude_path_substrings: strings(&["pm", "apple-pay-sdk.js", "pay.js"]),
            },
            expiration: PerClass {
                images: Expiration::new(200),
                cdn: Expiration::new(100),
                static_assets: Expiration::new(100),
            },
            monitoring_enabled: false,
        }
    }
}

impl WorkerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: WorkerConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.names.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        for (label, exp) in [
            ("images", &self.expiration.images),
            ("cdn", &self.expiration.cdn),
            ("static", &self.expiration.static_assets),
        ] {
            if exp.max_entries == 0 {
                return Err(ConfigError::ZeroCapacity(label));
            }
        }
        if let Some(ext) = self.routes.static_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ConfigError::BadExtension(ext.clone()));
        }
        let origins = self.routes.image_origins.iter().chain(self.routes.cdn_origins.iter());
        for origin in origins {
            let has_scheme = origin.starts_with("https://") || origin.starts_with("http://");
            if !has_scheme || origin.ends_with('/') {
                return Err(ConfigError::BadOrigin(origin.clone()));
            }
        }
        Ok(())
    }

    /// Versioned bucket name for a handled class, `None` for `Other`.
    pub fn bucket_name(&self, class: ResourceClass) -> Option<String> {
        let segment = match class {
            ResourceClass::Image => "images",
            ResourceClass::ThirdPartyCdn => "cdn",
            ResourceClass::StaticFont => "static",
            ResourceClass::Other => return None,
        };
        Some(self.versioned(segment))
    }

    pub fn precache_name(&self) -> String {
        format!("{}-precache-{}", self.names.prefix, self.names.precache_revision)
    }

    /// Cache generation whitelist: every bucket this build owns.
    pub fn whitelist(&self) -> Vec<String> {
        let mut names: Vec<String> = ResourceClass::HANDLED
            .iter()
            .filter_map(|c| self.bucket_name(*c))
            .collect();
        names.push(self.precache_name());
        names
    }

    fn versioned(&self, segment: &str) -> String {
        if self.names.build_tag.is_empty() {
            return format!("{}-{}", self.names.prefix, segment);
        }
        format!("{}-{}-{}", self.names.prefix, segment, self.names.build_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bucket_names_embed_build_tag() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.bucket_name(ResourceClass::Image).unwrap(), "bestShort-images-0709");
        assert_eq!(cfg.bucket_name(ResourceClass::ThirdPartyCdn).unwrap(), "bestShort-cdn-0709");
        assert_eq!(cfg.bucket_name(ResourceClass::StaticFont).unwrap(), "bestShort-static-0709");
        assert_eq!(cfg.bucket_name(ResourceClass::Other), None);
        assert_eq!(
            cfg.whitelist(),
            vec!["bestShort-images-0709", "bestShort-cdn-0709", "bestShort-static-0709", "bestShort-precache-v2"]
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn loads_partial_json_with_defaults() {
        let raw = r#"{
            "names": { "prefix": "shop", "buildTag": "0801", "precacheRevision": "v3" },
            "routes": {
                "imageOrigins": ["https://img.example.com"],
                "cdnOrigins": [],
                "staticDestinations": ["font"],
                "staticExtensions": [".woff2"],
                "excludePathSubstrings": ["pay.js"]
            },
            "expiration": {
                "images": { "maxEntries": 10 },
                "cdn": { "maxEntries": 5, "purgeOnQuotaError": false },
                "static": { "maxEntries": 5 }
            }
        }"#;
        let cfg = WorkerConfig::from_json_str(raw).unwrap();
        assert!(!cfg.monitoring_enabled);
        assert!(cfg.expiration.images.purge_on_quota_error);
        assert!(!cfg.expiration.cdn.purge_on_quota_error);
        assert_eq!(cfg.precache_name(), "shop-precache-v3");
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = WorkerConfig::default();
        cfg.expiration.cdn.max_entries = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroCapacity("cdn"))));

        let mut cfg = WorkerConfig::default();
        cfg.routes.static_extensions.push("woff".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::BadExtension(_))));

        let mut cfg = WorkerConfig::default();
        cfg.routes.cdn_origins.push("https://cdn.example.com/".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::BadOrigin(_))));

        assert!(matches!(WorkerConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    }
}
