//! Hyperlinks of OGC API documents and relation lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Relation of the collection resource pointing at its map tilesets list.
pub const REL_TILESETS_MAP: &str = "http://www.opengis.net/def/rel/ogc/1.0/tilesets-map";

/// Relation of a tileset pointing at its tile matrix set definition.
pub const REL_TILING_SCHEME: &str = "http://www.opengis.net/def/rel/ogc/1.0/tiling-scheme";

/// Relation of a resource pointing at itself.
pub const REL_SELF: &str = "self";

/// Relation of a tileset pointing at its tile URL template.
pub const REL_ITEM: &str = "item";

/// A typed hyperlink: `{"rel": ..., "type": ..., "href": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Read the `links` array of a JSON document.
///
/// Returns `None` when the document has no `links` array. Individual entries that
/// are not valid links (missing `rel` or `href`) are skipped.
pub fn parse_links(doc: &Value) -> Option<Vec<Link>> {
    let entries = doc.get("links")?.as_array()?;
    let links = entries
        .iter()
        .filter_map(|entry| match Link::deserialize(entry) {
            Ok(link) => Some(link),
            Err(e) => {
                debug!("Ignoring malformed link {}: {}", entry, e);
                None
            }
        })
        .collect();
    Some(links)
}

/// Find the href of the best link with relation `rel`.
///
/// A link whose type equals `preferred_media_type` wins immediately. Otherwise the
/// first link without a declared type is used. Links declaring another type are
/// never selected.
pub fn find_href<'a>(links: &'a [Link], rel: &str, preferred_media_type: &str) -> Option<&'a str> {
    let mut untyped = None;
    for link in links.iter().filter(|l| l.rel == rel) {
        match link.media_type.as_deref() {
            Some(media_type) if media_type == preferred_media_type => {
                return Some(link.href.as_str());
            }
            None if untyped.is_none() => untyped = Some(link.href.as_str()),
            _ => {}
        }
    }
    untyped
}
