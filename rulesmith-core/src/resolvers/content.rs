use super::ResolvedLocation;
use crate::error::ContentError;
use crate::reference::RuleSetReferenceId;
use std::fs;

/// Strategy that reads the bytes behind a resolved location.
///
/// The loader wraps it in a per-reference closure carrying the location and
/// the reference, so hosts can swap in their own transport (remote fetch,
/// archive lookup) without touching the resolution logic.
pub type ContentOpener<'a> =
    dyn Fn(&ResolvedLocation, &RuleSetReferenceId) -> Result<Vec<u8>, ContentError> + 'a;

/// Default opener: reads local files, rejects URLs.
pub fn open_location(
    location: &ResolvedLocation,
    _reference: &RuleSetReferenceId,
) -> Result<Vec<u8>, ContentError> {
    match location {
        ResolvedLocation::File(path) => fs::read(path).map_err(|e| ContentError::NotFound {
            location: path.display().to_string(),
            reason: e.to_string(),
        }),
        ResolvedLocation::Url(url) => Err(ContentError::Unsupported(url.clone())),
    }
}
