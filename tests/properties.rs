//! Property-based tests for plan and argument construction.
//!
//! These tests use proptest to generate random inputs and verify
//! that core invariants hold.

use std::path::PathBuf;
use std::sync::Arc;

use emuctl::command_runner::MockCommandRunner;
use emuctl::config::{InstallConfig, StyleCheckConfig};
use emuctl::effects::Effect;
use emuctl::installer::Installer;
use emuctl::service_manager::SystemctlManager;
use emuctl::stylecheck::StyleCheck;
use proptest::prelude::*;

/// Generate a valid unit name.
fn unit_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}\\.(service|socket)"
}

/// Generate a unique, non-empty list of units plus a start subset mask.
fn units_strategy() -> impl Strategy<Value = (Vec<String>, Vec<bool>)> {
    prop::collection::btree_set(unit_strategy(), 1..6).prop_flat_map(|set| {
        let units: Vec<String> = set.into_iter().collect();
        let len = units.len();
        (Just(units), prop::collection::vec(any::<bool>(), len))
    })
}

/// Generate a diagnostic code such as E741.
fn code_strategy() -> impl Strategy<Value = String> {
    "[EWC][0-9]{3}"
}

/// Generate a relative source path.
fn target_strategy() -> impl Strategy<Value = PathBuf> {
    "[a-z]{1,8}(/[a-z]{1,8}){0,3}\\.py".prop_map(PathBuf::from)
}

proptest! {
    // ========================================================================
    // Installer plan properties
    // ========================================================================

    #[test]
    fn plan_enables_every_unit_after_copying_it((units, mask) in units_strategy(), mode in 0u32..0o1000) {
        let start_units: Vec<String> = units
            .iter()
            .zip(&mask)
            .filter(|(_, start)| **start)
            .map(|(u, _)| u.clone())
            .collect();
        let config = InstallConfig {
            units: units.clone(),
            start_units: start_units.clone(),
            unit_mode: mode,
            ..Default::default()
        };
        let manager = SystemctlManager::new(&config, Arc::new(MockCommandRunner::new()));
        let plan = Installer::new(&config, &manager).plan();

        prop_assert_eq!(plan.len(), 3 + 2 * units.len() + 1 + start_units.len());

        for unit in &units {
            let copy = plan.iter().position(|e| matches!(
                e,
                Effect::CopyFile { destination, mode: Some(m), .. }
                    if destination.ends_with(unit) && *m == mode
            ));
            let enable = plan.iter().position(|e| e == &Effect::Enable { unit: unit.clone() });
            prop_assert!(copy.is_some(), "unit {} is never copied", unit);
            prop_assert!(enable.is_some(), "unit {} is never enabled", unit);
            prop_assert!(copy < enable);
        }

        let started: Vec<String> = plan
            .iter()
            .filter_map(|e| match e {
                Effect::Start { unit } => Some(unit.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(started, start_units);
    }

    #[test]
    fn plan_starts_only_after_final_reload((units, mask) in units_strategy()) {
        let start_units: Vec<String> = units
            .iter()
            .zip(&mask)
            .filter(|(_, start)| **start)
            .map(|(u, _)| u.clone())
            .collect();
        let config = InstallConfig {
            units,
            start_units,
            ..Default::default()
        };
        let manager = SystemctlManager::new(&config, Arc::new(MockCommandRunner::new()));
        let plan = Installer::new(&config, &manager).plan();

        let last_reload = plan.iter().rposition(|e| *e == Effect::DaemonReload).unwrap();
        let last_enable = plan
            .iter()
            .rposition(|e| matches!(e, Effect::Enable { .. }))
            .unwrap();
        prop_assert!(last_enable < last_reload);
        for (index, effect) in plan.iter().enumerate() {
            if matches!(effect, Effect::Start { .. }) {
                prop_assert!(index > last_reload);
            }
        }
    }

    // ========================================================================
    // Style-check argument properties
    // ========================================================================

    #[test]
    fn arguments_keep_options_before_targets(
        max in 1u32..10_000,
        ignore in prop::collection::vec(code_strategy(), 0..5),
        targets in prop::collection::vec(target_strategy(), 0..10),
    ) {
        let config = StyleCheckConfig {
            max_line_length: max,
            ignore: ignore.clone(),
            ..Default::default()
        };
        let args = StyleCheck::new(&config).arguments(&targets);

        prop_assert_eq!(args.len(), 2 + targets.len());
        prop_assert_eq!(&args[0], &format!("--max-line-length={}", max));
        prop_assert_eq!(&args[1], &format!("--ignore={}", ignore.join(",")));
        for (arg, target) in args[2..].iter().zip(&targets) {
            prop_assert_eq!(arg, &target.to_string_lossy().into_owned());
        }
    }
}
