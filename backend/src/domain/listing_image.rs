//! Images attached to a listing.
//!
//! Only paths are tracked here; bytes live in the image store. At most one
//! image per listing is primary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{ImageId, ListingId};

/// Raised when an image path is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImagePathError {
    #[error("image path must not be empty")]
    Empty,
    #[error("image path must be relative and stay inside the image root: {0}")]
    Escapes(String),
}

/// Relative path under the image root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImagePath(String);

impl ImagePath {
    /// Validate a relative path without `..` or root components.
    pub fn new(raw: impl Into<String>) -> Result<Self, ImagePathError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ImagePathError::Empty);
        }
        let escapes = trimmed.starts_with('/')
            || trimmed.starts_with('\\')
            || trimmed.contains(':')
            || trimmed
                .split(['/', '\\'])
                .any(|segment| segment == "..");
        if escapes {
            return Err(ImagePathError::Escapes(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ImagePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Paths supplied when attaching an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub image_path: ImagePath,
    pub thumbnail_path: Option<ImagePath>,
}

/// Stored image metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    pub id: ImageId,
    pub listing_id: ListingId,
    pub image_path: ImagePath,
    pub thumbnail_path: Option<ImagePath>,
    pub display_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl ListingImage {
    /// Every file backing this image.
    pub fn file_paths(&self) -> impl Iterator<Item = &ImagePath> {
        std::iter::once(&self.image_path).chain(self.thumbnail_path.as_ref())
    }
}

/// Build rows for `uploads`, continuing after `existing`.
///
/// The first new image becomes primary when none of `existing` is.
pub fn plan_additions(
    listing_id: ListingId,
    existing: &[ListingImage],
    uploads: Vec<NewImage>,
    now: DateTime<Utc>,
) -> Vec<ListingImage> {
    let mut next_order = existing
        .iter()
        .map(|image| image.display_order.saturating_add(1))
        .max()
        .unwrap_or(0);
    let mut needs_primary = !existing.iter().any(|image| image.is_primary);

    uploads
        .into_iter()
        .map(|upload| {
            let image = ListingImage {
                id: ImageId::random(),
                listing_id,
                image_path: upload.image_path,
                thumbnail_path: upload.thumbnail_path,
                display_order: next_order,
                is_primary: needs_primary,
                created_at: now,
            };
            next_order = next_order.saturating_add(1);
            needs_primary = false;
            image
        })
        .collect()
}

/// Image to promote after `removed` is deleted from `remaining`.
pub fn successor_primary<'a>(
    removed: &ListingImage,
    remaining: &'a [ListingImage],
) -> Option<&'a ListingImage> {
    if !removed.is_primary {
        return None;
    }
    remaining
        .iter()
        .filter(|image| image.id != removed.id)
        .min_by_key(|image| (image.display_order, image.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn upload(path: &str) -> NewImage {
        NewImage {
            image_path: ImagePath::new(path).expect("valid path"),
            thumbnail_path: None,
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("/etc/passwd")]
    #[case("../secrets.png")]
    #[case("listings/../../x.png")]
    #[case("C:\\images\\x.png")]
    fn rejects_unsafe_paths(#[case] raw: &str) {
        assert!(ImagePath::new(raw).is_err());
    }

    #[rstest]
    fn first_upload_becomes_primary() {
        let listing = ListingId::random();
        let planned = plan_additions(
            listing,
            &[],
            vec![upload("a.png"), upload("b.png")],
            Utc::now(),
        );

        let flags: Vec<_> = planned
            .iter()
            .map(|image| (image.display_order, image.is_primary))
            .collect();
        assert_eq!(flags, vec![(0, true), (1, false)]);
    }

    #[rstest]
    fn additions_continue_existing_order() {
        let listing = ListingId::random();
        let existing = plan_additions(listing, &[], vec![upload("a.png")], Utc::now());
        let planned = plan_additions(listing, &existing, vec![upload("b.png")], Utc::now());

        assert_eq!(planned[0].display_order, 1);
        assert!(!planned[0].is_primary);
    }

    #[rstest]
    fn removing_primary_promotes_lowest_order() {
        let listing = ListingId::random();
        let images = plan_additions(
            listing,
            &[],
            vec![upload("a.png"), upload("b.png"), upload("c.png")],
            Utc::now(),
        );

        let successor = successor_primary(&images[0], &images).expect("successor");

        assert_eq!(successor.id, images[1].id);
        assert!(successor_primary(&images[2], &images).is_none());
    }

    #[rstest]
    fn file_paths_include_thumbnail() {
        let image = ListingImage {
            id: ImageId::random(),
            listing_id: ListingId::random(),
            image_path: ImagePath::new("full.png").expect("path"),
            thumbnail_path: Some(ImagePath::new("thumb.png").expect("path")),
            display_order: 0,
            is_primary: true,
            created_at: Utc::now(),
        };
        let paths: Vec<_> = image.file_paths().map(ImagePath::as_str).collect();
        assert_eq!(paths, vec!["full.png", "thumb.png"]);
    }
}
