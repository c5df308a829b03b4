// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod graph_builder;
mod profile;
mod reader;

pub use graph_builder::build_graph;
pub use profile::{Profile, HIKING_PROFILE};
pub use reader::{
    load_from_buffer, load_from_file, load_from_io, read_from_buffer, read_from_file,
    read_from_io, Error, FileFormat, Options, RawData, Way,
};

#[cfg(test)]
mod tests {
    use super::super::Graph;
    use super::*;

    macro_rules! assert_edge {
        ($graph:expr, $from:expr, $to:expr) => {
            assert!($graph.get_edge($from, $to).is_finite());
            assert_eq!($graph.get_edge($from, $to), $graph.get_edge($to, $from));
        };
    }

    macro_rules! assert_no_edge {
        ($graph:expr, $from:expr, $to:expr) => {
            assert!($graph.get_edge($from, $to).is_infinite());
        };
    }

    /// Checks the graph of the "trail" fixture. `id` maps fixture ids
    /// (negative in the OSM XML files, positive in the Overpass JSON).
    fn check_trail_graph(g: &Graph, id: impl Fn(i64) -> i64) {
        //   6
        //   │ (private track)
        //   5
        //   ┆ (motorway)
        //   4 ── 7 ┄┄ ?
        //   │
        //   3
        //   │
        //   2
        //   │
        //   1        8

        assert_eq!(g.len(), 7);
        assert_eq!(g.edge_count(), 5);

        assert_edge!(g, id(1), id(2));
        assert_edge!(g, id(2), id(3));
        assert_edge!(g, id(3), id(4));
        assert_edge!(g, id(4), id(7));
        assert_edge!(g, id(5), id(6));
        assert_no_edge!(g, id(4), id(5));

        assert!(g.get_node(id(8)).is_none());

        let route = g.route(id(1), id(7)).unwrap();
        assert_eq!(route.coordinates.len(), 5);
        assert_eq!(g.route(id(1), id(6)), None);
    }

    fn options(file_format: FileFormat) -> Options<'static> {
        Options {
            profile: &HIKING_PROFILE,
            file_format,
            bbox: [0.0; 4],
        }
    }

    #[test]
    fn test_build_graph_xml() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/trail.osm");
        let g = load_from_buffer(&options(FileFormat::Xml), DATA).unwrap();
        check_trail_graph(&g, |id| -id);
    }

    #[test]
    fn test_build_graph_xml_io() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/trail.osm");
        let g = load_from_io(&options(FileFormat::Xml), std::io::Cursor::new(DATA)).unwrap();
        check_trail_graph(&g, |id| -id);
    }

    #[test]
    fn test_build_graph_gz() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/trail.osm.gz");
        let g = load_from_buffer(&options(FileFormat::XmlGz), DATA).unwrap();
        check_trail_graph(&g, |id| -id);
    }

    #[test]
    fn test_build_graph_bz2() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/trail.osm.bz2");
        let g = load_from_buffer(&options(FileFormat::XmlBz2), DATA).unwrap();
        check_trail_graph(&g, |id| -id);
    }

    #[test]
    fn test_build_graph_overpass() {
        const DATA: &[u8] = include_bytes!("reader/test_fixtures/trail.json");
        let g = load_from_buffer(&options(FileFormat::OverpassJson), DATA).unwrap();
        check_trail_graph(&g, |id| id);
    }

    #[test]
    fn test_build_graph_detected_format() {
        const GZ: &[u8] = include_bytes!("reader/test_fixtures/trail.osm.gz");
        const JSON: &[u8] = include_bytes!("reader/test_fixtures/trail.json");

        let g = load_from_buffer(&options(FileFormat::Unknown), GZ).unwrap();
        check_trail_graph(&g, |id| -id);

        let g = load_from_io(&options(FileFormat::Unknown), std::io::Cursor::new(JSON)).unwrap();
        check_trail_graph(&g, |id| id);
    }

    #[test]
    fn test_load_failure() {
        let result = load_from_buffer(&options(FileFormat::OverpassJson), b"{\"elements\": 3}");
        assert!(matches!(result, Err(Error::Json(_))));

        let result = load_from_file(&options(FileFormat::Xml), "/nonexistent/trail.osm");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
