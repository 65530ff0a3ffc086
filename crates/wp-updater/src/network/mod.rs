//! Network side of the updater.
//!
//! This module provides:
//! - Platform detection and endpoint resolution for source URLs
//! - An HTTP client for polling update sources
//! - Response normalization for GitHub tags and custom release documents
//! - The `ReleaseFetcher` seam used by the updater

mod adapters;
mod client;
mod fetcher;
mod platform;

pub use adapters::{normalize, normalize_custom, normalize_github_tags, PackageContext};
pub use client::{extract_domain, HttpClient};
pub use fetcher::{FetchRequest, HttpReleaseFetcher, ReleaseFetcher};
pub use platform::{PlatformKind, PlatformResolver, ResolvedSource};
