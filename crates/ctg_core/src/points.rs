use crate::types::{Point, Summary};

/// Flattens every geo-located location of every summary into map points,
/// in result order then location order. Locations missing either coordinate
/// are skipped.
pub fn points(summaries: &[Summary]) -> Vec<Point> {
    summaries
        .iter()
        .flat_map(|summary| {
            summary.locations.iter().filter_map(move |location| {
                let (lat, lon) = location.coordinates()?;
                Some(Point {
                    lat,
                    lon,
                    organization: summary.organization.clone(),
                    title: summary.title.clone(),
                    state: location.state.clone(),
                    country: location.country.clone(),
                })
            })
        })
        .collect()
}
