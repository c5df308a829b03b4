// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::osm::{build_graph, Profile};
use crate::{Coordinate, Graph};

mod model;
mod overpass;
mod xml;

pub use model::Way;

/// Format of the input OSM data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the first bytes of the content
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,

    /// Force [Overpass API JSON](https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL#JSON_(javascript)),
    /// as returned by queries with `[out:json]`
    OverpassJson,
}

impl FileFormat {
    /// Guesses the format from the first bytes of the data. Returns [FileFormat::Unknown]
    /// if the format couldn't be recognized.
    pub fn detect(head: &[u8]) -> Self {
        let trimmed = head.trim_ascii_start();
        if head.starts_with(&[0x1f, 0x8b]) {
            Self::XmlGz
        } else if head.starts_with(b"BZh") {
            Self::XmlBz2
        } else if trimmed.starts_with(b"<") {
            Self::Xml
        } else if trimmed.starts_with(b"{") {
            Self::OverpassJson
        } else {
            Self::Unknown
        }
    }
}

/// Additional controls for loading OSM data.
#[derive(Debug)]
pub struct Options<'a> {
    /// Which OSM ways can be walked on.
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f64; 4],
}

/// Error which can occur when loading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized file format")]
    UnknownFormat,
}

/// Raw geographic data of a loaded area: node positions and all ways between them.
///
/// Nothing is filtered out (apart from nodes outside of the bounding box) -
/// deciding which ways are walkable is left to [build_graph].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawData {
    pub nodes: HashMap<i64, Coordinate>,
    pub ways: Vec<Way>,
}

impl RawData {
    fn from_features<I, E>(features: I, bbox: &[f64; 4]) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
    {
        let ignore_bbox = bbox.iter().all(|&x| x == 0.0) || bbox.iter().any(|x| !x.is_finite());
        if !ignore_bbox && (bbox[0] > bbox[2] || bbox[1] > bbox[3]) {
            log::warn!("bounding box {bbox:?} is empty - no nodes will be loaded");
        }

        let [min_lon, min_lat, max_lon, max_lat] = *bbox;
        let mut data = Self::default();

        for f in features {
            match f? {
                model::Feature::Node(n) => {
                    if ignore_bbox
                        || (n.lat >= min_lat && n.lat <= max_lat && n.lon >= min_lon && n.lon <= max_lon)
                    {
                        data.nodes.insert(n.id, n.coordinate());
                    }
                }
                model::Feature::Way(w) => data.ways.push(w),
            }
        }

        log::debug!("read {} nodes and {} ways", data.nodes.len(), data.ways.len());
        Ok(data)
    }
}

/// Minimum number of non-whitespace bytes needed by [FileFormat::detect].
const MIN_HEAD_LEN: usize = 3;

/// Upper bound of bytes read ahead for [FileFormat::detect].
const MAX_HEAD_LEN: usize = 4096;

/// Reads the beginning of a stream into `head`, until it's long enough for
/// [FileFormat::detect] or the stream ends. Short reads are retried.
fn read_head<R: io::Read>(reader: &mut R, head: &mut Vec<u8>) -> io::Result<()> {
    let mut chunk = [0_u8; 64];
    while head.len() < MAX_HEAD_LEN && head.trim_ascii_start().len() < MIN_HEAD_LEN {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Reads OSM data from a reader as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn read_from_io<R: io::Read>(options: &Options<'_>, mut reader: R) -> Result<RawData, Error> {
    let mut head = Vec::new();
    let format = match options.file_format {
        FileFormat::Unknown => {
            read_head(&mut reader, &mut head)?;
            FileFormat::detect(&head)
        }
        format => format,
    };

    // Bytes consumed by format detection are put back in front of the stream
    let b = io::BufReader::new(io::Cursor::new(head).chain(reader));

    match format {
        FileFormat::Unknown => Err(Error::UnknownFormat),

        FileFormat::Xml => {
            let r = xml::Reader::from_io(b);
            Ok(RawData::from_features(r, &options.bbox)?)
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            Ok(RawData::from_features(r, &options.bbox)?)
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            Ok(RawData::from_features(r, &options.bbox)?)
        }

        FileFormat::OverpassJson => {
            let features = overpass::features_from_io(b)?;
            Ok(RawData::from_features(features.map(Ok::<_, Error>), &options.bbox)?)
        }
    }
}

/// Reads OSM data from a file at the provided path as per the provided [Options].
pub fn read_from_file<P: AsRef<Path>>(options: &Options<'_>, path: P) -> Result<RawData, Error> {
    let f = File::open(path)?;
    read_from_io(options, f)
}

/// Reads OSM data from a static buffer as per the provided [Options].
pub fn read_from_buffer(options: &Options<'_>, data: &[u8]) -> Result<RawData, Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        format => format,
    };

    match format {
        // Fast paths are available for in-memory uncompressed data
        FileFormat::Xml => Ok(RawData::from_features(
            xml::Reader::from_buffer(data),
            &options.bbox,
        )?),

        FileFormat::OverpassJson => {
            let features = overpass::features_from_buffer(data)?;
            Ok(RawData::from_features(features.map(Ok::<_, Error>), &options.bbox)?)
        }

        // Wrap the buffer in a cursor and use the IO path
        format => {
            let options = Options {
                file_format: format,
                ..*options
            };
            read_from_io(&options, io::Cursor::new(data))
        }
    }
}

/// Loads a walkable [Graph] from a reader, see [read_from_io] and [build_graph].
///
/// On failure no graph is created, so any graph the caller already has stays valid.
pub fn load_from_io<R: io::Read>(options: &Options<'_>, reader: R) -> Result<Graph, Error> {
    let data = read_from_io(options, reader)?;
    Ok(build_graph(&data, options.profile))
}

/// Loads a walkable [Graph] from a file, see [read_from_file] and [build_graph].
pub fn load_from_file<P: AsRef<Path>>(options: &Options<'_>, path: P) -> Result<Graph, Error> {
    let data = read_from_file(options, path)?;
    Ok(build_graph(&data, options.profile))
}

/// Loads a walkable [Graph] from a static buffer, see [read_from_buffer] and [build_graph].
pub fn load_from_buffer(options: &Options<'_>, data: &[u8]) -> Result<Graph, Error> {
    let data = read_from_buffer(options, data)?;
    Ok(build_graph(&data, options.profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::HIKING_PROFILE;

    #[test]
    fn detect_format() {
        assert_eq!(FileFormat::detect(b"<?xml version='1.0'?>"), FileFormat::Xml);
        assert_eq!(FileFormat::detect(b"  \n<osm>"), FileFormat::Xml);
        assert_eq!(FileFormat::detect(b"{\"version\": 0.6}"), FileFormat::OverpassJson);
        assert_eq!(FileFormat::detect(&[0x1f, 0x8b, 0x08]), FileFormat::XmlGz);
        assert_eq!(FileFormat::detect(b"BZh91AY"), FileFormat::XmlBz2);
        assert_eq!(FileFormat::detect(b"\x0a\x0d"), FileFormat::Unknown);
        assert_eq!(FileFormat::detect(b""), FileFormat::Unknown);
    }

    /// Reader returning at most one byte per read.
    struct Trickle<'a>(&'a [u8]);

    impl io::Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((&byte, rest)), Some(slot)) => {
                    *slot = byte;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn detect_format_over_short_reads() {
        let options = Options {
            profile: &HIKING_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        };

        for fixture in [
            &include_bytes!("test_fixtures/trail.osm")[..],
            &include_bytes!("test_fixtures/trail.osm.gz")[..],
            &include_bytes!("test_fixtures/trail.osm.bz2")[..],
            &include_bytes!("test_fixtures/trail.json")[..],
        ] {
            let data = read_from_io(&options, Trickle(fixture)).unwrap();
            assert_eq!(data.nodes.len(), 8);
            assert_eq!(data.ways.len(), 7);
        }
    }

    #[test]
    fn detect_format_after_leading_whitespace() {
        let options = Options {
            profile: &HIKING_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        };
        let mut data = b"\n\n   \n".to_vec();
        data.extend_from_slice(include_bytes!("test_fixtures/trail.json"));

        let raw = read_from_io(&options, Trickle(&data)).unwrap();
        assert_eq!(raw.nodes.len(), 8);

        let blank = read_from_io(&options, Trickle(b"\n  ")).unwrap_err();
        assert!(matches!(blank, Error::UnknownFormat));
    }

    #[test]
    fn unknown_format_is_an_error() {
        let options = Options {
            profile: &HIKING_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        };
        let result = read_from_buffer(&options, b"PBF?");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn read_raw_data_with_bbox() {
        let options = Options {
            profile: &HIKING_PROFILE,
            file_format: FileFormat::Xml,
            bbox: [19.975, 49.225, 19.985, 49.2335],
        };
        let data = read_from_buffer(&options, include_bytes!("test_fixtures/trail.osm")).unwrap();
        assert_eq!(data.nodes.len(), 4);
        assert!(data.nodes.contains_key(&-4));
        assert!(!data.nodes.contains_key(&-7));
        assert_eq!(data.ways.len(), 7);
    }
}
