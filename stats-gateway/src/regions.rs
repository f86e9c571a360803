use crate::config::RegionsConfig;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// A routing region together with the platform that serves it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedRegion {
    pub region: String,
    pub platform: String,
}

/// Routing region to platform lookup table.
#[derive(Clone, Debug)]
pub struct Regions {
    inner: Arc<RegionsInner>,
}

#[derive(Debug)]
struct RegionsInner {
    default: ResolvedRegion,
    platforms: IndexMap<String, String>,
}

impl Regions {
    /// Expects a validated config: the default region must be in `platforms`.
    pub fn new(config: &RegionsConfig) -> Self {
        let platforms: IndexMap<String, String> = config
            .platforms
            .iter()
            .map(|(region, platform)| (region.to_lowercase(), platform.clone()))
            .collect();
        let default_region = config.default.to_lowercase();
        let default = ResolvedRegion {
            platform: platforms
                .get(&default_region)
                .cloned()
                .unwrap_or_default(),
            region: default_region,
        };

        Self {
            inner: Arc::new(RegionsInner { default, platforms }),
        }
    }

    /// Looks up a region case-insensitively. Absent or unknown regions fall
    /// back to the default one.
    pub fn resolve(&self, region: Option<&str>) -> ResolvedRegion {
        let requested = region.map(|r| r.trim().to_lowercase());
        match requested.and_then(|r| self.inner.platforms.get_key_value(&r)) {
            Some((region, platform)) => ResolvedRegion {
                region: region.clone(),
                platform: platform.clone(),
            },
            None => {
                if let Some(region) = region {
                    tracing::debug!(region, fallback = %self.inner.default.region, "unknown region");
                }
                self.inner.default.clone()
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.platforms.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let regions = Regions::new(&RegionsConfig::default());

        assert_eq!(
            regions.resolve(Some("asia")),
            ResolvedRegion {
                region: "asia".into(),
                platform: "kr".into()
            }
        );
        assert_eq!(regions.resolve(Some("EUROPE")).platform, "euw1");
        assert_eq!(regions.resolve(None).platform, "na1");
        assert_eq!(regions.resolve(Some("oceania")).region, "americas");
        assert_eq!(regions.resolve(Some("")).region, "americas");
    }

    #[test]
    fn test_configured_order_and_default() {
        let config: RegionsConfig = serde_yaml::from_str(
            r#"
default: Europe
platforms:
    europe: eun1
    asia: jp1
"#,
        )
        .unwrap();
        let regions = Regions::new(&config);

        assert_eq!(regions.names().collect::<Vec<_>>(), ["europe", "asia"]);
        assert_eq!(regions.resolve(Some("americas")).platform, "eun1");
    }
}
