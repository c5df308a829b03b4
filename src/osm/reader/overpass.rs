// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;

use serde::Deserialize;

use super::model;
use crate::Node;

/// Body of an [Overpass API](https://wiki.openstreetmap.org/wiki/Overpass_API)
/// response with `[out:json]`.
#[derive(Debug, Deserialize)]
struct Response {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

impl Element {
    fn into_feature(self) -> Option<model::Feature> {
        match self {
            Element::Node { id, lat, lon } if id != 0 => {
                Some(model::Feature::Node(Node { id, lat, lon }))
            }
            Element::Way { id, nodes, tags } if id != 0 => {
                Some(model::Feature::Way(model::Way { id, nodes, tags }))
            }
            _ => None,
        }
    }
}

/// Parses all nodes and ways from an Overpass JSON response.
pub(super) fn features_from_io<R: io::Read>(
    reader: R,
) -> Result<impl Iterator<Item = model::Feature>, serde_json::Error> {
    let response: Response = serde_json::from_reader(reader)?;
    Ok(response.elements.into_iter().filter_map(Element::into_feature))
}

/// Parses all nodes and ways from an in-memory Overpass JSON response.
pub(super) fn features_from_buffer(
    data: &[u8],
) -> Result<impl Iterator<Item = model::Feature>, serde_json::Error> {
    let response: Response = serde_json::from_slice(data)?;
    Ok(response.elements.into_iter().filter_map(Element::into_feature))
}
