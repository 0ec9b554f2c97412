//! Orchestrates the strategies and validates the reckoned version.
//!
//! Everything here is a pure function of the inventory and the strategies:
//! no logging, no I/O. Callers own presentation.
use crate::error::{ReckonError, Result};
use crate::inventory::Inventory;
use crate::normal::NormalStrategy;
use crate::pre_release::PreReleaseStrategy;
use crate::version::{StageOrder, Version};
use std::cmp::Ordering;

/// Reckon the version for `inventory`. The canonical string is `Display`.
pub fn reckon(
    inventory: &Inventory,
    normal: &NormalStrategy,
    pre_release: &PreReleaseStrategy,
) -> Result<Version> {
    reckon_with(inventory, normal, pre_release, false)
}

fn reckon_with(
    inventory: &Inventory,
    normal: &NormalStrategy,
    pre_release: &PreReleaseStrategy,
    strict_ordering: bool,
) -> Result<Version> {
    let requests_change = normal.requests_change(inventory)?;
    let requests_qualifier = pre_release.requests_qualifier()?;
    if let Some(released) = inventory.released_version() {
        if !requests_change && !requests_qualifier {
            return Ok(released.clone());
        }
    }

    let candidate = normal.normal(inventory)?;
    let version = pre_release.version(inventory, candidate)?;
    check_claims(inventory, &version)?;
    if strict_ordering {
        check_ordering(inventory, &version, &pre_release.stage_order())?;
    }
    Ok(version)
}

/// A claimed version may only be reissued for the commit that claimed it.
fn check_claims(inventory: &Inventory, version: &Version) -> Result<()> {
    if !inventory.is_claimed(version) {
        return Ok(());
    }
    let current = inventory.current_commit();
    match inventory.claimed_by(version) {
        Some(commit) if commit == current => Ok(()),
        claimed_by => Err(ReckonError::VersionConflict {
            version: version.to_string(),
            claimed_by: claimed_by
                .map(ToString::to_string)
                .unwrap_or_else(|| "<unknown commit>".to_string()),
            current: current.to_string(),
        }),
    }
}

fn check_ordering(inventory: &Inventory, version: &Version, order: &StageOrder) -> Result<()> {
    let Some(base) = inventory.base_version() else {
        return Ok(());
    };
    if version.cmp_with(base, order) == Ordering::Less {
        return Err(ReckonError::VersionRegression {
            version: version.to_string(),
            base: base.to_string(),
        });
    }
    Ok(())
}

/// Strategies configured once and reused for any number of inventories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reckoner {
    normal: NormalStrategy,
    pre_release: PreReleaseStrategy,
    strict_ordering: bool,
}

impl Reckoner {
    pub fn builder() -> ReckonerBuilder {
        ReckonerBuilder::default()
    }

    pub fn normal(&self) -> &NormalStrategy {
        &self.normal
    }

    pub fn pre_release(&self) -> &PreReleaseStrategy {
        &self.pre_release
    }

    pub fn reckon(&self, inventory: &Inventory) -> Result<Version> {
        reckon_with(
            inventory,
            &self.normal,
            &self.pre_release,
            self.strict_ordering,
        )
    }
}

#[derive(Debug, Default)]
pub struct ReckonerBuilder {
    normal: Option<NormalStrategy>,
    pre_release: Option<PreReleaseStrategy>,
    strict_ordering: bool,
}

impl ReckonerBuilder {
    pub fn normal(mut self, strategy: NormalStrategy) -> Self {
        self.normal = Some(strategy);
        self
    }

    pub fn pre_release(mut self, strategy: PreReleaseStrategy) -> Self {
        self.pre_release = Some(strategy);
        self
    }

    /// Reject results that order below the base version.
    pub fn strict_ordering(mut self, strict: bool) -> Self {
        self.strict_ordering = strict;
        self
    }

    pub fn build(self) -> Result<Reckoner> {
        let normal = self.normal.ok_or_else(|| {
            ReckonError::Configuration("a normal strategy must be configured".to_string())
        })?;
        let pre_release = self.pre_release.ok_or_else(|| {
            ReckonError::Configuration("a pre-release strategy must be configured".to_string())
        })?;
        Ok(Reckoner {
            normal,
            pre_release,
            strict_ordering: self.strict_ordering,
        })
    }
}

#[cfg(test)]
#[path = "reckoner_tests.rs"]
mod tests;
