//! Locale-keyed routing table that decides which sites to scrape.
//!
//! The table is plain data, loaded once at startup from YAML (the built-in copy
//! lives in `config/routes.yaml`) and never mutated afterwards. Resolution
//! follows a fixed precedence:
//!
//! 1. a city with a dedicated section in [`RoutingTable`]'s major-city table,
//! 2. a state route (or region, where the route allows it) for any other city,
//!    then the generic city route,
//! 3. a named region with no city,
//! 4. the generic route's per-language list, then its default list.
//!
//! The same file carries the place-name exclusion lists used by the
//! small-city relevance filter.

use crate::models::LanguageCode;
use crate::utils::upcase;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

const BUILTIN_ROUTES: &str = include_str!("../config/routes.yaml");

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("failed to read routing table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse routing table: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("route {route} references unknown group {group:?}")]
    UnknownGroup { route: String, group: String },
}

/// A page to scrape and the CSS selector that yields one headline per match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEndpoint {
    pub url: String,
    pub selector: String,
    /// Label shown before article text when no city is requested.
    #[serde(default)]
    pub label: String,
    /// Fixed language of the site; `None` means "whatever was requested".
    #[serde(default)]
    pub language: Option<LanguageCode>,
}

#[derive(Debug, Clone, Deserialize)]
struct Route {
    groups: Vec<String>,
    #[serde(default)]
    languages: BTreeMap<LanguageCode, Vec<String>>,
}

impl Route {
    fn groups_for(&self, language: LanguageCode) -> &[String] {
        self.languages.get(&language).unwrap_or(&self.groups)
    }

    fn all_groups(&self) -> impl Iterator<Item = &String> {
        self.groups.iter().chain(self.languages.values().flatten())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MajorCity {
    slug: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CityExtra {
    state: String,
    route: Route,
}

#[derive(Debug, Clone, Deserialize)]
struct StateRoute {
    names: Vec<String>,
    #[serde(default)]
    regions: Vec<String>,
    route: Route,
}

/// Place names whose mention marks an article as being about somewhere else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExclusionTable {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
}

/// The composite locale a query is routed by. All parts are lowercased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleKey {
    pub region: String,
    pub city: String,
    pub state: String,
    pub language: LanguageCode,
}

impl LocaleKey {
    pub fn new(region: &str, city: &str, state: &str, language: LanguageCode) -> Self {
        Self {
            region: region.trim().to_lowercase(),
            city: city.trim().to_lowercase(),
            state: state.trim().to_lowercase(),
            language,
        }
    }
}

/// Which precedence branch produced a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteScope {
    MajorCity { slug: String },
    State { name: String },
    CityDefault,
    Region { name: String },
    Language(LanguageCode),
    Generic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub scope: RouteScope,
    pub endpoints: Vec<SourceEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingTable {
    groups: BTreeMap<String, Vec<SourceEndpoint>>,
    major_cities: BTreeMap<String, MajorCity>,
    city_templates: Vec<SourceEndpoint>,
    #[serde(default)]
    city_extras: Vec<CityExtra>,
    #[serde(default)]
    states: Vec<StateRoute>,
    city_default: Route,
    #[serde(default)]
    regions: BTreeMap<String, Route>,
    generic: Route,
    #[serde(default)]
    exclusions: ExclusionTable,
}

impl RoutingTable {
    /// The table shipped with the binary.
    pub fn builtin() -> Result<Self, RoutingError> {
        Self::from_yaml(BUILTIN_ROUTES)
    }

    pub fn from_path(path: &Path) -> Result<Self, RoutingError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RoutingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, RoutingError> {
        let table: Self = serde_yaml::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), RoutingError> {
        let named_routes = self
            .city_extras
            .iter()
            .map(|e| (format!("city_extras.{}", e.state), &e.route))
            .chain(
                self.states
                    .iter()
                    .map(|s| (format!("states.{}", s.names.join("/")), &s.route)),
            )
            .chain(
                self.regions
                    .iter()
                    .map(|(name, r)| (format!("regions.{name}"), r)),
            )
            .chain([
                ("city_default".to_string(), &self.city_default),
                ("generic".to_string(), &self.generic),
            ]);

        for (route, r) in named_routes {
            if let Some(group) = r.all_groups().find(|g| !self.groups.contains_key(*g)) {
                return Err(RoutingError::UnknownGroup {
                    route,
                    group: group.clone(),
                });
            }
        }
        Ok(())
    }

    /// True when `city` has a dedicated city section.
    pub fn is_major_city(&self, city: &str) -> bool {
        self.major_cities.contains_key(&city.trim().to_lowercase())
    }

    pub fn exclusions(&self) -> &ExclusionTable {
        &self.exclusions
    }

    /// Resolve the endpoints to scrape for `key`.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, key: &LocaleKey) -> ResolvedRoute {
        let (scope, endpoints) = if !key.city.is_empty() {
            self.resolve_city(key)
        } else if let Some(route) = self.regions.get(&key.region) {
            (
                RouteScope::Region {
                    name: key.region.clone(),
                },
                self.expand(route.groups_for(key.language)),
            )
        } else if self.generic.languages.contains_key(&key.language) {
            (
                RouteScope::Language(key.language),
                self.expand(self.generic.groups_for(key.language)),
            )
        } else {
            (RouteScope::Generic, self.expand(&self.generic.groups))
        };

        let endpoints: Vec<SourceEndpoint> =
            endpoints.into_iter().unique_by(|e| e.url.clone()).collect();
        debug!(?scope, count = endpoints.len(), "Resolved source route");
        ResolvedRoute { scope, endpoints }
    }

    fn resolve_city(&self, key: &LocaleKey) -> (RouteScope, Vec<SourceEndpoint>) {
        if let Some(city) = self.major_cities.get(&key.city) {
            let mut endpoints: Vec<SourceEndpoint> = self
                .city_templates
                .iter()
                .map(|t| SourceEndpoint {
                    url: t
                        .url
                        .replace("{slug}", &city.slug)
                        .replace("{Slug}", &upcase(&city.slug)),
                    ..t.clone()
                })
                .collect();

            let extra = self.city_extras.iter().find(|e| {
                e.state == key.state || city.state.as_deref() == Some(e.state.as_str())
            });
            if let Some(extra) = extra {
                endpoints.extend(self.expand(extra.route.groups_for(key.language)));
            }
            return (
                RouteScope::MajorCity {
                    slug: city.slug.clone(),
                },
                endpoints,
            );
        }

        let state_route = self.states.iter().find(|s| {
            s.names.contains(&key.state) || (!key.region.is_empty() && s.regions.contains(&key.region))
        });
        match state_route {
            Some(s) => (
                RouteScope::State {
                    name: s.names.first().cloned().unwrap_or_default(),
                },
                self.expand(s.route.groups_for(key.language)),
            ),
            None => (
                RouteScope::CityDefault,
                self.expand(self.city_default.groups_for(key.language)),
            ),
        }
    }

    fn expand(&self, groups: &[String]) -> Vec<SourceEndpoint> {
        groups
            .iter()
            .filter_map(|g| self.groups.get(g))
            .flatten()
            .cloned()
            .collect()
    }
}
