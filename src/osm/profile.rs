// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes which OSM ways can be walked on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the routing profile,
    /// customary the most specific [access tag](https://wiki.openstreetmap.org/wiki/Key:access).
    /// Not used for actual OSM data interpretation.
    pub name: &'a str,

    /// Values of the [highway](https://wiki.openstreetmap.org/wiki/Key:highway) tag
    /// of ways which can be used for routing. Ways with any other (or without any)
    /// highway tag are ignored.
    pub highways: &'a [&'a str],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for prohibitions.
    /// See [Profile::is_allowed]. Empty slice disables access checks.
    pub access: &'a [&'a str],
}

impl<'a> Profile<'a> {
    /// Checks if a way with the given tags is both of a whitelisted
    /// path type and not prohibited by the access tags.
    pub fn is_walkable(&self, tags: &HashMap<String, String>) -> bool {
        self.is_path_type(tags) && self.is_allowed(tags)
    }

    /// Checks if the way's highway tag is one of [Profile::highways].
    pub fn is_path_type(&self, tags: &HashMap<String, String>) -> bool {
        tags.get("highway")
            .is_some_and(|highway| self.highways.contains(&highway.as_str()))
    }

    /// Checks if the most specific access tag present (see [Profile::access])
    /// doesn't prohibit using the way.
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }
}

/// Routing [Profile] for hikers: footpaths, tracks and minor roads.
///
/// Only the highway type is checked - access tags are ignored, as trail maps
/// show private and restricted paths as well.
pub const HIKING_PROFILE: Profile = Profile {
    name: "foot",
    highways: &[
        "path",
        "footway",
        "track",
        "bridleway",
        "cycleway",
        "steps",
        "residential",
        "unclassified",
        "tertiary",
        "tertiary_link",
        "secondary",
        "secondary_link",
        "service",
        "pedestrian",
        "living_street",
        "road",
    ],
    access: &[],
};

#[cfg(test)]
mod tests {
    use super::{Profile, HIKING_PROFILE};
    use std::collections::HashMap;

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    const TEST_PROFILE: Profile = Profile {
        name: "cat",
        highways: &["footway", "path"],
        access: &["access", "cat"],
    };

    #[test]
    fn path_type() {
        assert!(TEST_PROFILE.is_path_type(&tags! {"highway": "footway"}));
        assert!(TEST_PROFILE.is_path_type(&tags! {"highway": "path", "surface": "gravel"}));
        assert!(!TEST_PROFILE.is_path_type(&tags! {"highway": "motorway"}));
        assert!(!TEST_PROFILE.is_path_type(&tags! {"building": "yes"}));
        assert!(!TEST_PROFILE.is_path_type(&tags! {}));
    }

    #[test]
    fn allowed() {
        assert!(TEST_PROFILE.is_allowed(&tags! {}));
        assert!(TEST_PROFILE.is_allowed(&tags! {"access": "yes"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"access": "no"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"access": "private"}));
        assert!(TEST_PROFILE.is_allowed(&tags! {"access": "no", "cat": "yes"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"access": "yes", "cat": "no"}));
    }

    #[test]
    fn hiking_profile() {
        assert!(HIKING_PROFILE.is_walkable(&tags! {"highway": "track"}));
        assert!(HIKING_PROFILE.is_walkable(&tags! {"highway": "tertiary_link"}));
        assert!(HIKING_PROFILE.is_walkable(&tags! {"highway": "steps", "foot": "designated"}));
        assert!(!HIKING_PROFILE.is_walkable(&tags! {"highway": "motorway"}));
        assert!(!HIKING_PROFILE.is_walkable(&tags! {"highway": "primary"}));
    }

    #[test]
    fn hiking_profile_ignores_access() {
        assert!(HIKING_PROFILE.is_walkable(&tags! {"highway": "track", "access": "private"}));
        assert!(HIKING_PROFILE.is_walkable(&tags! {"highway": "path", "foot": "no"}));
        assert!(HIKING_PROFILE.is_walkable(&tags! {"highway": "track", "access": "no", "foot": "yes"}));
        assert!(!HIKING_PROFILE.is_walkable(&tags! {"highway": "motorway", "foot": "yes"}));
    }
}
