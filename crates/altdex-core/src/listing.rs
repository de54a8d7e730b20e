//! Listing — a submitted open-source alternative in the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
  Pending,
  Approved,
  Rejected,
}

/// The plan a listing was submitted (or upgraded) under.
///
/// The stored value is not authoritative on its own: a listing counts as a
/// sponsor only while a payment reference exists and its priority window is
/// in the future. Expired sponsors keep `Sponsor` in storage; callers must
/// evaluate [`sponsor_state`](crate::sponsor::sponsor_state) against
/// wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPlan {
  #[default]
  Free,
  Sponsor,
}

/// A submitted open-source alternative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
  pub listing_id:             Uuid,
  pub name:                   String,
  /// Globally unique; derived deterministically from `name` via [`slugify`].
  pub slug:                   String,
  pub url:                    String,
  /// Source repository URL; unique when present, used for duplicate
  /// detection on submission.
  pub repo_url:               Option<String>,
  pub description:            String,
  pub status:                 ModerationStatus,
  pub submission_plan:        SubmissionPlan,
  pub owner_id:               Option<Uuid>,
  pub submitter_email:        Option<String>,
  /// Order reference recorded at upgrade time, before payment capture.
  pub pending_order_ref:      Option<String>,
  /// Order reference of the captured payment, set on activation.
  pub payment_ref:            Option<String>,
  pub sponsor_paid_at:        Option<DateTime<Utc>>,
  pub sponsor_featured_until: Option<DateTime<Utc>>,
  pub sponsor_priority_until: Option<DateTime<Utc>>,
  pub newsletter_included:    bool,
  pub rejection_reason:       Option<String>,
  pub rejected_at:            Option<DateTime<Utc>>,
  pub created_at:             DateTime<Utc>,
}

impl Listing {
  /// Whether `acting` may manage this listing. Matches by owner id or by
  /// submitter email (case-insensitive).
  pub fn is_owned_by(&self, acting: &ActingUser) -> bool {
    if let (Some(owner), Some(user)) = (self.owner_id, acting.user_id)
      && owner == user
    {
      return true;
    }
    if let (Some(mine), Some(theirs)) = (&self.submitter_email, &acting.email)
      && mine.eq_ignore_ascii_case(theirs)
    {
      return true;
    }
    false
  }
}

/// The identity performing a request, as established by the handler layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActingUser {
  pub user_id: Option<Uuid>,
  pub email:   Option<String>,
}

/// Input to [`Directory::submit_listing`](crate::Directory::submit_listing).
/// `listing_id`, `slug`, and `created_at` are assigned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
  pub name:            String,
  pub url:             String,
  pub repo_url:        Option<String>,
  #[serde(default)]
  pub description:     String,
  pub owner_id:        Option<Uuid>,
  pub submitter_email: Option<String>,
}

/// Derive a URL-safe slug from a listing name.
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims leading/trailing hyphens. The same name always yields the same
/// slug.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_hyphen = false;
  for c in name.chars() {
    if c.is_ascii_alphanumeric() {
      if pending_hyphen && !slug.is_empty() {
        slug.push('-');
      }
      pending_hyphen = false;
      slug.push(c.to_ascii_lowercase());
    } else {
      pending_hyphen = true;
    }
  }
  slug
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_lowercases() {
    assert_eq!(slugify("LibreOffice"), "libreoffice");
  }

  #[test]
  fn slugify_collapses_separator_runs() {
    assert_eq!(slugify("GIMP  (Image Editor)"), "gimp-image-editor");
  }

  #[test]
  fn slugify_trims_edges() {
    assert_eq!(slugify("  Nextcloud!  "), "nextcloud");
  }

  #[test]
  fn slugify_is_deterministic() {
    assert_eq!(slugify("Jellyfin Media Server"), slugify("Jellyfin Media Server"));
  }

  fn listing_owned_by(owner_id: Option<Uuid>, email: Option<&str>) -> Listing {
    Listing {
      listing_id:             Uuid::new_v4(),
      name:                   "Test".into(),
      slug:                   "test".into(),
      url:                    "https://example.com".into(),
      repo_url:               None,
      description:            String::new(),
      status:                 ModerationStatus::Pending,
      submission_plan:        SubmissionPlan::Free,
      owner_id,
      submitter_email:        email.map(str::to_owned),
      pending_order_ref:      None,
      payment_ref:            None,
      sponsor_paid_at:        None,
      sponsor_featured_until: None,
      sponsor_priority_until: None,
      newsletter_included:    false,
      rejection_reason:       None,
      rejected_at:            None,
      created_at:             Utc::now(),
    }
  }

  #[test]
  fn ownership_matches_by_user_id() {
    let owner = Uuid::new_v4();
    let l = listing_owned_by(Some(owner), None);
    let acting = ActingUser { user_id: Some(owner), email: None };
    assert!(l.is_owned_by(&acting));
  }

  #[test]
  fn ownership_matches_by_email_case_insensitive() {
    let l = listing_owned_by(None, Some("Maintainer@Example.com"));
    let acting = ActingUser {
      user_id: None,
      email:   Some("maintainer@example.com".into()),
    };
    assert!(l.is_owned_by(&acting));
  }

  #[test]
  fn ownership_rejects_strangers() {
    let l = listing_owned_by(Some(Uuid::new_v4()), Some("owner@example.com"));
    let acting = ActingUser {
      user_id: Some(Uuid::new_v4()),
      email:   Some("someone-else@example.com".into()),
    };
    assert!(!l.is_owned_by(&acting));
  }

  #[test]
  fn ownership_rejects_anonymous_even_when_listing_has_no_owner() {
    let l = listing_owned_by(None, None);
    assert!(!l.is_owned_by(&ActingUser::default()));
  }
}
