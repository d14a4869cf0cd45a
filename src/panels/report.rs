//! One-shot text reports built from the same panels the dashboard draws.

#![allow(missing_docs)]

use crate::collector::{ClusterSnapshot, GroupSet, Selection};
use crate::core::errors::Result;
use crate::format::{Rendered, StyledLine, Table};

use super::content::{ContentContext, produce_lines};
use super::layout::Layout;
use super::registry::PanelRegistry;

/// Panels whose content is a subset of another panel's, left out of the
/// full-catalogue report.
const CATALOGUE_ALIASES: &[&str] = &[
    "members-short",
    "members-summary",
    "federation-dest",
    "federation-origins",
];

/// One-column layout of every panel renderable with `selection`.
pub fn catalogue_layout(registry: &PanelRegistry, selection: &Selection) -> Result<Layout> {
    let names: Vec<&str> = registry
        .panels()
        .iter()
        .filter(|p| !CATALOGUE_ALIASES.contains(&p.name.as_str()))
        .filter(|p| p.check_selection(selection).is_ok())
        .map(|p| p.name.as_str())
        .collect();
    registry.resolve_layout(&names.join(":"))
}

/// Every panel of `layout` as a titled section.
///
/// Panels depending on a failed group print a placeholder; a panel whose
/// content function fails prints the error in its section.
pub fn describe(
    registry: &PanelRegistry,
    layout: &Layout,
    snapshot: &ClusterSnapshot,
    ctx: &ContentContext<'_>,
) -> Rendered {
    let mut out = Rendered::default();
    for name in layout.panels() {
        let Some(panel) = registry.panel(name) else {
            continue;
        };
        if !out.lines.is_empty() {
            out.lines.push(StyledLine::default());
        }
        let title = panel.title_for(ctx.selection);
        out.lines.push(StyledLine::plain(title.clone()));
        out.lines
            .push(StyledLine::plain("-".repeat(title.chars().count())));

        if panel.groups.iter().any(|g| snapshot.failed.contains(g)) {
            out.lines.push(StyledLine::plain("Unable to retrieve data"));
            continue;
        }
        match produce_lines(panel, snapshot, ctx) {
            Ok(section) if section.is_empty() => {
                out.warnings.extend(section.warnings);
                out.lines.push(StyledLine::plain("No Content"));
            }
            Ok(section) => out.append(section),
            Err(e) => out.lines.push(StyledLine::plain(e.to_string())),
        }
    }
    out
}

/// Table of registered panels for the `panels` command.
pub fn panel_table(registry: &PanelRegistry) -> Table {
    use crate::format::table::Align::{Left, Right};
    let mut table = Table::new(&["PANEL", "HEIGHT", "GROUPS", "TITLE"]).aligned(&[
        Left,
        Right,
        Left,
        Left,
    ]);
    for panel in registry.panels() {
        let groups: GroupSet = panel.groups.iter().copied().collect();
        let groups: Vec<String> = groups.iter().map(ToString::to_string).collect();
        table.add_row([
            panel.name.clone(),
            panel.max_height.to_string(),
            groups.join(","),
            panel.title.clone(),
        ]);
    }
    table
}

/// Table of named layouts for `layouts list`.
pub fn layout_table(registry: &PanelRegistry) -> Table {
    let mut table = Table::new(&["LAYOUT", "SOURCE", "SPEC"]);
    for (name, spec, builtin) in registry.named_layouts() {
        table.add_row([
            name.to_string(),
            if builtin { "built-in" } else { "user" }.to_string(),
            spec.to_string(),
        ]);
    }
    table
}
