//! Property tests for the layout grammar, code assignment and grid geometry.

use clustermon::collector::DataGroup;
use clustermon::core::errors::MonError;
use clustermon::panels::layout::MAX_PANELS;
use clustermon::panels::{PanelRegistry, assign_codes, compute_grid, panel_code};
use proptest::prelude::*;

fn panel_names() -> Vec<String> {
    PanelRegistry::builtin()
        .panels()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

/// Layout spec built from 1..=3 rows of 1..=4 registered panels each.
fn layout_spec() -> impl Strategy<Value = String> {
    let names = panel_names();
    let row = prop::collection::vec(prop::sample::select(names), 1..=4)
        .prop_map(|panels| panels.join(","));
    prop::collection::vec(row, 1..=3).prop_map(|rows| rows.join(":"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn required_groups_cover_every_panel(spec in layout_spec()) {
        let registry = PanelRegistry::builtin();
        let layout = registry.resolve_layout(&spec).unwrap();
        let required = registry.required_data_groups(&layout);

        prop_assert!(!required.is_empty());
        for group in &required {
            prop_assert!(DataGroup::ALL.contains(group));
        }
        for name in layout.panels() {
            let panel = registry.panel(name).unwrap();
            for group in &panel.groups {
                prop_assert!(required.contains(group));
            }
        }
    }

    #[test]
    fn codes_are_deterministic_and_unique(spec in layout_spec()) {
        let registry = PanelRegistry::builtin();
        let first = registry.resolve_layout(&spec).unwrap();
        let second = registry.resolve_layout(&spec).unwrap();
        let codes = assign_codes(&first);

        prop_assert_eq!(&codes, &assign_codes(&second));
        prop_assert_eq!(codes.len(), first.panel_count());
        let mut chars: Vec<char> = codes.iter().map(|(c, _)| *c).collect();
        chars.sort_unstable();
        chars.dedup();
        prop_assert_eq!(chars.len(), codes.len());
        for (index, (code, _)) in codes.iter().enumerate() {
            prop_assert_eq!(panel_code(index), Some(*code));
        }
    }

    #[test]
    fn grid_slots_tile_the_width(
        width in 0usize..400,
        rows in prop::collection::vec(1usize..6, 1..5),
    ) {
        let grid = compute_grid(width, &rows);
        prop_assert_eq!(grid.len(), rows.len());
        for (slots, &count) in grid.iter().zip(&rows) {
            prop_assert_eq!(slots.len(), count);
            prop_assert_eq!(slots.iter().map(|s| s.width).sum::<usize>(), width);
            let mut x = 0;
            for slot in slots {
                prop_assert_eq!(slot.x, x);
                x += slot.width;
            }
            let widest = slots.iter().map(|s| s.width).max().unwrap_or(0);
            let narrowest = slots.iter().map(|s| s.width).min().unwrap_or(0);
            prop_assert!(widest - narrowest <= 1);
        }
    }

    #[test]
    fn unknown_names_are_rejected(suffix in "[a-z]{3,8}") {
        let registry = PanelRegistry::builtin();
        let bogus = format!("zz{suffix}");
        let spec = format!("members,{bogus}");
        let is_unknown_panel = matches!(
            registry.resolve_layout(&spec),
            Err(MonError::UnknownPanel { .. })
        );
        prop_assert!(is_unknown_panel);
    }
}

#[test]
fn malformed_specs_are_rejected() {
    let registry = PanelRegistry::builtin();
    for spec in ["", "   ", "members,,caches", "members::caches", "a,b:c"] {
        assert!(registry.resolve_layout(spec).is_err(), "{spec:?} accepted");
    }
}

#[test]
fn code_sequence_skips_command_keys() {
    let codes: Vec<char> = (0..MAX_PANELS).filter_map(panel_code).collect();
    assert_eq!(codes.len(), MAX_PANELS);
    assert_eq!(codes[0], '1');
    assert!(!codes.contains(&'p'));
    assert!(!codes.contains(&'0'));
    assert_eq!(panel_code(MAX_PANELS), None);
}

#[test]
fn oversized_layouts_are_rejected() {
    let registry = PanelRegistry::builtin();
    let spec = vec!["members"; MAX_PANELS + 1].join(":");
    assert!(matches!(
        registry.resolve_layout(&spec),
        Err(MonError::InvalidLayout { .. })
    ));
}
