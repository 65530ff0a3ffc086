//! The update decision.

use super::version::compare_versions;
use crate::models::{Release, UpdateNotice};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Produce a notice when `release` is newer than `installed_version`.
///
/// A release without a version never produces a notice, and neither does a
/// pair of versions that cannot be compared.
pub fn decide(installed_version: &str, release: &Release) -> Option<UpdateNotice> {
    if !release.has_version() {
        return None;
    }

    match compare_versions(&release.version, installed_version) {
        Some(Ordering::Greater) => {
            debug!(
                "{} {} is newer than installed {}",
                release.slug, release.version, installed_version
            );
            Some(UpdateNotice::from(release))
        }
        Some(_) => None,
        None => {
            warn!(
                "Cannot compare versions {:?} and {:?} for {}",
                release.version, installed_version, release.slug
            );
            None
        }
    }
}
