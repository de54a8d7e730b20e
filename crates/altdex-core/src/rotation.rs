//! Ad rotation and feed interleaving.
//!
//! Rotation is round-robin: each placement type has an in-process page-view
//! counter, and the eligible pool is rotated left by `counter % len`. Every
//! eligible ad leads equally often in the long run, and no ad leads two
//! consecutive views while more than one is eligible. Interleaving is
//! deterministic so paginated feeds stay stable.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::{
  ad::{AdType, Advertisement},
  listing::Listing,
};

/// Popup placements rotate among at most this many concurrently eligible ads.
pub const POPUP_POOL_LIMIT: usize = 5;

/// Default run length between interleaved card ads in a feed.
pub const DEFAULT_CARD_INTERVAL: usize = 6;

// ─── Rotator ─────────────────────────────────────────────────────────────────

/// Per-placement rotation counters.
///
/// The counters are the only shared mutable state in the core, and they are
/// advisory: losing them on restart merely resets the rotation phase.
#[derive(Debug, Default)]
pub struct AdRotator {
  counters: [AtomicU64; AdType::ALL.len()],
}

impl AdRotator {
  pub fn new() -> Self { Self::default() }

  /// Order `pool` for one page view of `ad_type`.
  ///
  /// Truncates popup pools to [`POPUP_POOL_LIMIT`] before rotating so the
  /// rotation set itself stays bounded. Pools of zero or one entries are
  /// returned as-is without consuming a rotation tick.
  pub fn rotate(&self, ad_type: AdType, mut pool: Vec<Advertisement>) -> Vec<Advertisement> {
    if ad_type == AdType::Popup {
      pool.truncate(POPUP_POOL_LIMIT);
    }
    if pool.len() > 1 {
      let tick = self.counters[ad_type.index()].fetch_add(1, Ordering::Relaxed);
      let k = (tick % pool.len() as u64) as usize;
      pool.rotate_left(k);
    }
    pool
  }
}

// ─── Feed interleaving ───────────────────────────────────────────────────────

/// One entry in a merged listing/ad feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedItem {
  Listing(Listing),
  Advertisement(Advertisement),
}

/// Insert one ad after every `every_n` listings, cycling through `ads`
/// starting at `start_cursor`.
///
/// Listings are never dropped or duplicated. An empty ad pool or a zero
/// interval returns the listings unchanged. `start_cursor` lets paginated
/// callers continue the ad cycle where the previous page left off.
pub fn intersperse_ads(
  items:        Vec<Listing>,
  ads:          &[Advertisement],
  every_n:      usize,
  start_cursor: usize,
) -> Vec<FeedItem> {
  if ads.is_empty() || every_n == 0 {
    return items.into_iter().map(FeedItem::Listing).collect();
  }

  let mut out    = Vec::with_capacity(items.len() + items.len() / every_n);
  let mut cursor = start_cursor;
  for (i, item) in items.into_iter().enumerate() {
    out.push(FeedItem::Listing(item));
    if (i + 1) % every_n == 0 {
      out.push(FeedItem::Advertisement(ads[cursor % ads.len()].clone()));
      cursor += 1;
    }
  }
  out
}
