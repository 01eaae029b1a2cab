use chrono::NaiveDate;
use serde_json::Value;

use crate::document::{DetailDocument, Nav};
use crate::types::{Location, RawMatch, Summary, DATE_FORMAT};

const IDENTIFICATION: &[&str] = &["protocolSection", "identificationModule"];
const LAST_UPDATE: &[&str] = &[
    "protocolSection",
    "statusModule",
    "lastUpdatePostDateStruct",
    "date",
];
const LEAD_SPONSOR: &[&str] = &[
    "protocolSection",
    "sponsorCollaboratorsModule",
    "leadSponsor",
    "name",
];
const CONDITIONS: &[&str] = &["protocolSection", "conditionsModule", "conditions"];
const LOCATIONS: &[&str] = &["protocolSection", "contactsLocationsModule", "locations"];

/// Reduces a detail document to a [`Summary`].
///
/// Total over any JSON object: absent paths become `None`, an empty
/// `conditions`/`locations` list, or `has_results == false`. When the
/// document carries no id the returned summary has an empty `id`.
pub fn extract(document: &DetailDocument) -> Summary {
    let root = document.nav();
    let identification = root.path(IDENTIFICATION);

    Summary {
        id: identification.get("nctId").string().unwrap_or_default(),
        organization: identification.path(&["organization", "fullName"]).string(),
        title: identification.get("briefTitle").string(),
        last_update: root.path(LAST_UPDATE).string(),
        lead_sponsor: root.path(LEAD_SPONSOR).string(),
        conditions: root
            .path(CONDITIONS)
            .items()
            .filter_map(Nav::string)
            .collect(),
        locations: root.path(LOCATIONS).items().map(extract_location).collect(),
        has_results: root.get("hasResults").bool().unwrap_or(false),
    }
}

fn extract_location(entry: Nav<'_>) -> Location {
    let geo = entry.get("geoPoint");
    Location {
        state: entry.get("state").string(),
        country: entry.get("country").string(),
        lat: geo.get("lat").f64(),
        lon: geo.get("lon").f64(),
    }
}

/// Reads the match reference out of one `studies[]` entry of a search page.
/// `None` when the entry carries no usable identifier.
pub fn extract_match(study: &Value) -> Option<RawMatch> {
    let study = Nav::new(study);
    let id = study
        .path(IDENTIFICATION)
        .get("nctId")
        .str()
        .map(str::trim)
        .filter(|id| !id.is_empty())?;
    let last_update = study
        .path(LAST_UPDATE)
        .str()
        .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok());

    Some(RawMatch {
        id: id.to_string(),
        last_update,
    })
}
