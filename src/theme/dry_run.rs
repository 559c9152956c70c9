//! Applier that only logs what it would do.

use std::sync::Mutex;

use super::{ApplyError, ThemeApplier};
use crate::common::utils::lock_or_recover;
use crate::core::classification::Classification;

pub struct DryRunApplier {
    last: Mutex<Option<Classification>>,
}

impl DryRunApplier {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }
}

impl Default for DryRunApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeApplier for DryRunApplier {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn apply(&self, classification: Classification) -> Result<(), ApplyError> {
        log_indented!("[dry-run] Would switch desktop to {classification} theme");
        *lock_or_recover(&self.last) = Some(classification);
        Ok(())
    }

    fn describe_current(&self) -> Result<String, ApplyError> {
        Ok(match *lock_or_recover(&self.last) {
            Some(c) => format!("Dry run (last applied: {c})"),
            None => "Dry run (nothing applied yet)".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_remembers_last_apply() {
        crate::common::logger::Log::set_enabled(false);
        let applier = DryRunApplier::new();
        assert_eq!(
            applier.describe_current().unwrap(),
            "Dry run (nothing applied yet)"
        );
        applier.apply(Classification::Night).unwrap();
        applier.apply(Classification::Night).unwrap();
        assert_eq!(
            applier.describe_current().unwrap(),
            "Dry run (last applied: Night)"
        );
    }
}
