//! Panel catalogue and named-layout table.
//!
//! A panel's data dependencies are plain data (`groups`) so the collector can
//! plan fetches without touching any rendering logic.

#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};

use crate::collector::{DataGroup, GroupSet, Selection};
use crate::core::errors::{MonError, Result};

use super::layout::{self, Layout};

/// Name of the layout used when none is given.
pub const DEFAULT_LAYOUT: &str = "default";

const BUILTIN_LAYOUTS: &[(&str, &str)] = &[
    (
        DEFAULT_LAYOUT,
        "members,health-summary:services,caches:proxies,http-servers:network-stats",
    ),
    ("default-service", "services:service-members:caches"),
    ("default-cache", "caches:cache-details"),
    ("default-topic", "topics:topic-subscribers"),
    ("default-federation", "federation-dest:federation-origins"),
    ("default-health", "health-summary:members-summary:services"),
];

/// Content produced by a panel; selects the content function in
/// [`super::content::produce_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Caches,
    DepartedMembers,
    ElasticData,
    Executors,
    HealthSummary,
    FederationAll,
    FederationDestinations,
    FederationOrigins,
    HttpServers,
    HttpSessions,
    MembersSummary,
    Machines,
    Members,
    MembersShort,
    NetworkStats,
    Persistence,
    Proxies,
    Reporters,
    Services,
    Topics,
    ViewCaches,
    ServiceMembers,
    CacheDetails,
    TopicSubscribers,
}

impl PanelKind {
    /// Selection parts this panel cannot render without.
    #[must_use]
    pub const fn required_selection(self) -> &'static [&'static str] {
        match self {
            Self::ServiceMembers => &["service"],
            Self::CacheDetails => &["service", "cache"],
            Self::TopicSubscribers => &["service", "topic"],
            _ => &[],
        }
    }
}

/// A named, titled unit of dashboard content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub name: String,
    /// May contain `%SERVICE`, `%CACHE`, `%TOPIC` and `%SUBSCRIBER` tokens.
    pub title: String,
    pub description: String,
    /// Declared content height in rows, excluding the border.
    pub max_height: usize,
    pub groups: Vec<DataGroup>,
    pub kind: PanelKind,
}

impl Panel {
    pub fn new(
        kind: PanelKind,
        name: &str,
        title: &str,
        max_height: usize,
        groups: &[DataGroup],
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: format!("show {}", title.to_lowercase()),
            max_height,
            groups: groups.to_vec(),
            kind,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Title with selection tokens substituted.
    pub fn title_for(&self, selection: &Selection) -> String {
        let mut title = self.title.clone();
        for (token, value) in [
            ("%SERVICE", selection.service()),
            ("%CACHE", selection.cache()),
            ("%TOPIC", selection.topic()),
            ("%SUBSCRIBER", selection.subscriber()),
        ] {
            if title.contains(token) {
                title = title.replace(token, value.unwrap_or("?"));
            }
        }
        title
    }

    /// Fail when the selection lacks a part this panel depends on.
    pub fn check_selection(&self, selection: &Selection) -> Result<()> {
        for what in self.kind.required_selection() {
            let present = match *what {
                "service" => selection.service().is_some(),
                "cache" => selection.cache().is_some(),
                "topic" => selection.topic().is_some(),
                _ => true,
            };
            if !present {
                return Err(MonError::MissingSelection {
                    panel: self.name.clone(),
                    what,
                });
            }
        }
        Ok(())
    }
}

fn catalogue() -> Vec<Panel> {
    use DataGroup as G;
    use PanelKind as K;
    vec![
        Panel::new(K::Caches, "caches", "Caches", 10, &[G::Caches]),
        Panel::new(
            K::DepartedMembers,
            "departed-members",
            "Departed Members",
            8,
            &[G::Members],
        ),
        Panel::new(K::ElasticData, "elastic-data", "Elastic Data", 5, &[G::ElasticData]),
        Panel::new(K::Executors, "executors", "Executors", 8, &[G::Executors]),
        Panel::new(K::HealthSummary, "health-summary", "Health Summary", 10, &[G::Health]),
        Panel::new(K::FederationAll, "federation-all", "Federation All", 5, &[G::Federation])
            .with_description("show all federation details"),
        Panel::new(
            K::FederationDestinations,
            "federation-dest",
            "Federation Destinations",
            5,
            &[G::Federation],
        ),
        Panel::new(
            K::FederationOrigins,
            "federation-origins",
            "Federation Origins",
            5,
            &[G::Federation],
        ),
        Panel::new(K::HttpServers, "http-servers", "HTTP Servers", 8, &[G::Proxies]),
        Panel::new(K::HttpSessions, "http-sessions", "HTTP Sessions", 8, &[G::HttpSessions]),
        Panel::new(
            K::MembersSummary,
            "members-summary",
            "Members Summary",
            7,
            &[G::Members, G::Storage],
        ),
        Panel::new(K::Machines, "machines", "Machines", 5, &[G::Machines]),
        Panel::new(K::Members, "members", "Members", 10, &[G::Members, G::Storage]),
        Panel::new(K::MembersShort, "members-short", "Members (Short)", 7, &[G::Members]),
        Panel::new(K::NetworkStats, "network-stats", "Network Stats", 8, &[G::Members]),
        Panel::new(K::Persistence, "persistence", "Persistence", 6, &[G::Services]),
        Panel::new(K::Proxies, "proxies", "Proxy Servers", 8, &[G::Proxies]),
        Panel::new(K::Reporters, "reporters", "Reporters", 6, &[G::Reporters]),
        Panel::new(K::Services, "services", "Services", 10, &[G::Services]),
        Panel::new(K::Topics, "topics", "Topics", 8, &[G::Topics]),
        Panel::new(K::ViewCaches, "view-caches", "View Caches", 8, &[G::ViewCaches]),
        Panel::new(
            K::ServiceMembers,
            "service-members",
            "Service Members (%SERVICE)",
            10,
            &[G::ServiceMembers],
        )
        .with_description("show members of the selected service"),
        Panel::new(
            K::CacheDetails,
            "cache-details",
            "Cache Details (%SERVICE/%CACHE)",
            10,
            &[G::CacheMembers],
        )
        .with_description("show per-member details of the selected cache"),
        Panel::new(
            K::TopicSubscribers,
            "topic-subscribers",
            "Topic Subscribers (%SERVICE/%TOPIC)",
            8,
            &[G::Topics],
        )
        .with_description("show subscribers of the selected topic"),
    ]
}

/// Registered panels plus named layouts (built-in and user defined).
#[derive(Debug, Clone, Default)]
pub struct PanelRegistry {
    panels: Vec<Panel>,
    layouts: BTreeMap<String, String>,
    builtin_layouts: BTreeSet<String>,
}

impl PanelRegistry {
    /// Registry with no panels and no layouts.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shipped panel catalogue and built-in named layouts.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, spec) in BUILTIN_LAYOUTS {
            registry.layouts.insert((*name).to_string(), (*spec).to_string());
            registry.builtin_layouts.insert((*name).to_string());
        }
        registry.panels = catalogue();
        registry
    }

    /// Add a panel. Names must be unique and must not shadow a named layout,
    /// and the panel must depend on at least one data group.
    pub fn register(&mut self, panel: Panel) -> Result<()> {
        if panel.groups.is_empty() {
            return Err(MonError::PanelWithoutData { panel: panel.name });
        }
        if self.panel(&panel.name).is_some() {
            return Err(MonError::DuplicatePanel { panel: panel.name });
        }
        if self.layouts.contains_key(&panel.name) {
            return Err(MonError::InvalidConfig {
                details: format!("panel name {:?} is reserved by a named layout", panel.name),
            });
        }
        self.panels.push(panel);
        Ok(())
    }

    #[must_use]
    pub fn panel(&self, name: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.name == name)
    }

    /// Panels in registration order.
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    #[must_use]
    pub fn is_builtin_layout(&self, name: &str) -> bool {
        self.builtin_layouts.contains(name)
    }

    /// Named layouts as `(name, spec, is_builtin)`, sorted by name.
    pub fn named_layouts(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.layouts
            .iter()
            .map(|(name, spec)| (name.as_str(), spec.as_str(), self.is_builtin_layout(name)))
    }

    #[must_use]
    pub fn named_layout(&self, name: &str) -> Option<&str> {
        self.layouts.get(name).map(String::as_str)
    }

    /// Add one user layout. The spec is checked when it is resolved.
    pub fn add_named_layout(&mut self, name: &str, spec: &str) -> Result<()> {
        if self.is_builtin_layout(name) {
            return Err(MonError::InvalidConfig {
                details: format!("layout name {name:?} is reserved for a built-in layout"),
            });
        }
        if self.panel(name).is_some() {
            return Err(MonError::InvalidConfig {
                details: format!("layout name {name:?} collides with a panel name"),
            });
        }
        self.layouts.insert(name.to_string(), spec.to_string());
        Ok(())
    }

    pub fn add_named_layouts(&mut self, layouts: &BTreeMap<String, String>) -> Result<()> {
        for (name, spec) in layouts {
            self.add_named_layout(name, spec)?;
        }
        Ok(())
    }

    /// Parse `spec` into rows of registered panel names, expanding named layouts.
    pub fn resolve_layout(&self, spec: &str) -> Result<Layout> {
        let rows = self.expand(spec, 0)?;
        let layout = Layout::new(spec.trim(), rows);
        if layout.panel_count() > layout::MAX_PANELS {
            return Err(MonError::InvalidLayout {
                spec: spec.to_string(),
                details: format!(
                    "{} panels exceed the maximum of {}",
                    layout.panel_count(),
                    layout::MAX_PANELS
                ),
            });
        }
        Ok(layout)
    }

    fn expand(&self, spec: &str, depth: usize) -> Result<Vec<Vec<String>>> {
        if depth > layout::MAX_NESTING {
            return Err(MonError::InvalidLayout {
                spec: spec.to_string(),
                details: "named layouts nest too deeply".to_string(),
            });
        }
        let mut rows = Vec::new();
        for row in layout::parse_rows(spec)? {
            if let [only] = row.as_slice()
                && self.panel(only).is_none()
                && let Some(named) = self.layouts.get(only)
            {
                rows.extend(self.expand(named, depth + 1)?);
                continue;
            }
            for name in &row {
                if self.panel(name).is_some() {
                    continue;
                }
                if self.layouts.contains_key(name) {
                    return Err(MonError::InvalidLayout {
                        spec: spec.to_string(),
                        details: format!("named layout {name:?} must be alone in its row"),
                    });
                }
                return Err(MonError::UnknownPanel {
                    panel: name.clone(),
                });
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Union of the data groups every panel in `layout` depends on.
    #[must_use]
    pub fn required_data_groups(&self, layout: &Layout) -> GroupSet {
        layout
            .panels()
            .filter_map(|name| self.panel(name))
            .flat_map(|panel| panel.groups.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layouts_resolve() {
        let registry = PanelRegistry::builtin();
        for (name, _, builtin) in registry.named_layouts() {
            assert!(builtin);
            let layout = registry.resolve_layout(name).expect(name);
            assert!(layout.panel_count() > 0);
        }
    }

    #[test]
    fn default_layout_shape() {
        let registry = PanelRegistry::builtin();
        let layout = registry.resolve_layout(DEFAULT_LAYOUT).unwrap();
        assert_eq!(layout.rows.len(), 4);
        assert_eq!(layout.rows[0], vec!["members", "health-summary"]);
        assert_eq!(layout.rows[3], vec!["network-stats"]);
    }

    #[test]
    fn named_layout_rows_are_spliced() {
        let registry = PanelRegistry::builtin();
        let layout = registry.resolve_layout("machines:default-topic").unwrap();
        assert_eq!(
            layout.rows,
            vec![
                vec!["machines".to_string()],
                vec!["topics".to_string()],
                vec!["topic-subscribers".to_string()],
            ]
        );
    }

    #[test]
    fn named_layout_beside_panel_rejected() {
        let registry = PanelRegistry::builtin();
        let err = registry.resolve_layout("members,default").unwrap_err();
        assert_eq!(err.code(), "MON-1101");
    }

    #[test]
    fn self_referencing_layout_is_bounded() {
        let mut registry = PanelRegistry::builtin();
        registry.add_named_layout("loop", "loop").unwrap();
        let err = registry.resolve_layout("loop").unwrap_err();
        assert!(matches!(err, MonError::InvalidLayout { .. }));
    }

    #[test]
    fn register_rejects_duplicates_and_layout_names() {
        let mut registry = PanelRegistry::builtin();
        let dup = Panel::new(PanelKind::Members, "members", "Again", 5, &[DataGroup::Members]);
        assert!(matches!(
            registry.register(dup),
            Err(MonError::DuplicatePanel { .. })
        ));
        let clash = Panel::new(PanelKind::Members, "default", "Clash", 5, &[DataGroup::Members]);
        assert!(matches!(
            registry.register(clash),
            Err(MonError::InvalidConfig { .. })
        ));
        let fresh = Panel::new(PanelKind::Members, "members-2", "Members 2", 5, &[DataGroup::Members]);
        registry.register(fresh).unwrap();
        assert!(registry.resolve_layout("members-2").is_ok());
    }

    #[test]
    fn register_rejects_panel_without_groups() {
        let mut registry = PanelRegistry::builtin();
        let static_panel = Panel::new(PanelKind::Members, "static", "Static", 5, &[]);
        let err = registry.register(static_panel).unwrap_err();
        assert_eq!(err.code(), "MON-1105");
        assert!(registry.panel("static").is_none());
    }

    #[test]
    fn every_builtin_panel_declares_groups() {
        for panel in PanelRegistry::builtin().panels() {
            assert!(!panel.groups.is_empty(), "{} has no data groups", panel.name);
        }
    }

    #[test]
    fn required_groups_follow_panels() {
        let registry = PanelRegistry::builtin();
        let layout = registry.resolve_layout("members,caches").unwrap();
        let groups = registry.required_data_groups(&layout);
        assert_eq!(
            groups.into_iter().collect::<Vec<_>>(),
            vec![DataGroup::Members, DataGroup::Caches, DataGroup::Storage]
                .into_iter()
                .collect::<GroupSet>()
                .into_iter()
                .collect::<Vec<_>>()
        );
        let layout = registry.resolve_layout("departed-members").unwrap();
        assert!(!registry.required_data_groups(&layout).is_empty());
    }

    #[test]
    fn title_tokens_substitute_selection() {
        let registry = PanelRegistry::builtin();
        let panel = registry.panel("cache-details").unwrap();
        let selection = Selection {
            service: Some("Dist".to_string()),
            cache: Some("orders".to_string()),
            ..Selection::default()
        };
        assert_eq!(panel.title_for(&selection), "Cache Details (Dist/orders)");
        assert_eq!(
            panel.title_for(&Selection::default()),
            "Cache Details (?/?)"
        );
        assert!(panel.check_selection(&selection).is_ok());
        assert!(matches!(
            panel.check_selection(&Selection::default()),
            Err(MonError::MissingSelection { what: "service", .. })
        ));
    }
}
