//! Tests for per-cell length and azimuth aggregation

mod common;

use common::{approx_eq, track_points};
use stormfield::aggregate::{
    aggregate_azimuths, aggregate_lengths, split_segment, summarize_cells,
};
use stormfield::{Bounds, Grid, Segment, aggregate_cells, build_tracks, compute_segments};

fn grid(max_lng: f64, max_lat: f64, cell_size: f64) -> Grid {
    let bounds = Bounds {
        min_lat: 0.0,
        max_lat,
        min_lng: 0.0,
        max_lng,
    };
    Grid::covering(&bounds, cell_size).unwrap()
}

fn segment(from: (f64, f64), to: (f64, f64)) -> Segment {
    let points = track_points("Seg", 2000, &[from, to]);
    Segment::between(0, &points[0], &points[1]).unwrap()
}

fn segments(coords: &[(f64, f64)]) -> Vec<Segment> {
    let points = track_points("Path", 2000, coords);
    compute_segments(&build_tracks(&points).tracks).segments
}

#[test]
fn test_length_split_along_row() {
    let g = grid(3.0, 2.0, 1.0);
    let seg = segment((0.5, 0.5), (2.5, 0.5));

    let pieces = split_segment(&g, &seg);
    let ids: Vec<u32> = pieces.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert!(approx_eq(pieces[0].1, seg.length * 0.25, 1e-6));
    assert!(approx_eq(pieces[1].1, seg.length * 0.5, 1e-6));
    assert!(approx_eq(pieces[2].1, seg.length * 0.25, 1e-6));

    let total: f64 = pieces.iter().map(|(_, l)| l).sum();
    assert!(approx_eq(total, seg.length, 1e-6));
}

#[test]
fn test_length_split_diagonal() {
    let g = grid(3.0, 2.0, 1.0);
    let seg = segment((0.2, 0.3), (2.7, 1.6));

    let pieces = split_segment(&g, &seg);
    let ids: Vec<u32> = pieces.iter().map(|(id, _)| *id).collect();
    // Row 0: cols 0, 1; row 1: cols 1, 2 (4 columns per row)
    assert_eq!(ids, vec![0, 1, 5, 6]);

    let total: f64 = pieces.iter().map(|(_, l)| l).sum();
    assert!(approx_eq(total, seg.length, 1e-6));
}

#[test]
fn test_segment_inside_one_cell() {
    let g = grid(3.0, 2.0, 1.0);
    let seg = segment((1.2, 1.2), (1.8, 1.7));
    let pieces = split_segment(&g, &seg);
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].0, 5);
    assert!(approx_eq(pieces[0].1, seg.length, 1e-9));
}

#[test]
fn test_segment_along_shared_edge_counted_once() {
    let g = grid(3.0, 2.0, 1.0);
    // Runs exactly on the line x = 1, the boundary between cols 0 and 1
    let seg = segment((1.0, 0.2), (1.0, 0.8));
    let pieces = split_segment(&g, &seg);
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].0, 1);
    assert!(approx_eq(pieces[0].1, seg.length, 1e-9));
}

#[test]
fn test_lengths_summed_across_segments() {
    let g = grid(3.0, 2.0, 1.0);
    let segs = vec![
        segment((0.5, 0.5), (2.5, 0.5)),
        segment((2.5, 0.6), (0.5, 0.6)),
    ];
    let lengths = aggregate_lengths(&g, &segs);
    assert_eq!(lengths.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

    let total: f64 = lengths.values().sum();
    let expected: f64 = segs.iter().map(|s| s.length).sum();
    assert!(approx_eq(total, expected, 1e-6));
}

#[test]
fn test_azimuths_located_by_centroid() {
    let g = grid(3.0, 2.0, 1.0);
    let segs = vec![
        segment((0.2, 0.5), (1.4, 0.5)),
        segment((0.5, 0.1), (0.5, 0.9)),
    ];
    let azimuths = aggregate_azimuths(&g, &segs);
    assert_eq!(azimuths.len(), 1);
    assert_eq!(azimuths[&0].len(), 2);
}

#[test]
fn test_inner_join_drops_length_only_cells() {
    let g = grid(2.0, 1.0, 1.0);
    let seg = segment((0.2, 0.5), (1.4, 0.5));

    let summaries = summarize_cells(&g, std::slice::from_ref(&seg));
    assert_eq!(summaries.len(), 2);
    assert!(summaries[1].summed_length.is_some());
    assert!(summaries[1].mean_azimuth.is_none());

    let agg = aggregate_cells(&g, &[seg.clone()]);
    assert_eq!(agg.stats.cells_with_length, 2);
    assert_eq!(agg.stats.cells_with_azimuth, 1);
    assert_eq!(agg.stats.qualifying_cells, 1);

    assert_eq!(agg.cells.len(), 1);
    let cell = &agg.cells[0];
    assert_eq!(cell.cell_id, 0);
    assert!(approx_eq(cell.summed_length, seg.length * 2.0 / 3.0, 1e-6));
    assert!(approx_eq(cell.mean_azimuth, 90.0, 1e-6));
    assert_eq!(cell.azimuth_count, 1);
    assert_eq!(cell.centroid.x, 0.5);
    assert_eq!(cell.centroid.y, 0.5);
}

#[test]
fn test_undefined_mean_excluded() {
    // A closed box N, E, S, W: the four azimuths cancel
    let segs = segments(&[(0.4, 0.4), (0.4, 0.6), (0.6, 0.6), (0.6, 0.4), (0.4, 0.4)]);
    assert_eq!(segs.len(), 4);

    let bounds = Bounds {
        min_lat: 0.0,
        max_lat: 1.0,
        min_lng: 0.0,
        max_lng: 1.0,
    };
    let g = Grid::covering(&bounds, 5.0).unwrap();
    let agg = aggregate_cells(&g, &segs);

    assert!(agg.cells.is_empty());
    assert_eq!(agg.stats.cells_with_length, 1);
    assert_eq!(agg.stats.cells_with_azimuth, 1);
    assert_eq!(agg.stats.undefined_mean_cells, 1);
    assert_eq!(agg.stats.qualifying_cells, 0);
}

#[test]
fn test_cells_in_ascending_id_order() {
    let g = grid(3.0, 2.0, 1.0);
    let segs = segments(&[(2.5, 1.5), (2.5, 1.8), (0.5, 0.5), (0.5, 0.8), (1.5, 0.5)]);
    let agg = aggregate_cells(&g, &segs);

    let ids: Vec<u32> = agg.cells.iter().map(|c| c.cell_id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert!(!ids.is_empty());
}

#[test]
fn test_empty_segments() {
    let g = grid(1.0, 1.0, 1.0);
    let agg = aggregate_cells(&g, &[]);
    assert!(agg.cells.is_empty());
    assert_eq!(agg.stats.cells_with_length, 0);
}

#[test]
fn test_antimeridian_crossing_lengths_stay_additive() {
    let seg = segment((179.6, 10.2), (-179.4, 10.7));
    let bounds = Bounds {
        min_lat: 10.0,
        max_lat: 11.0,
        min_lng: -180.0,
        max_lng: 180.0,
    };
    let g = Grid::covering(&bounds, 5.0).unwrap();

    let pieces = split_segment(&g, &seg);
    let ids: Vec<u32> = pieces.iter().map(|(id, _)| *id).collect();
    // West end of the grid and the last column before 180
    assert_eq!(ids, vec![0, 71]);

    let total: f64 = pieces.iter().map(|(_, l)| l).sum();
    assert!(approx_eq(total, seg.length, 1e-6));
    assert!(approx_eq(pieces[1].1, seg.length * 0.4, 1e-3));
}

#[test]
fn test_antimeridian_cell_joins_both_sides() {
    // One track steps across the antimeridian while another moves north
    // just east of it; both land in the same physical cell
    let mut points = track_points("Cross", 2000, &[(178.6, 10.2), (179.6, 10.2), (-179.4, 10.2)]);
    points.extend(track_points("North", 2000, &[(-179.9, 10.6), (-179.9, 11.6)]));
    let table = compute_segments(&build_tracks(&points).tracks);
    let g = Grid::covering(&table.bounds().unwrap(), 5.0).unwrap();

    let agg = aggregate_cells(&g, &table.segments);
    let ids: Vec<u32> = agg.cells.iter().map(|c| c.cell_id).collect();
    assert_eq!(ids, vec![0, 71]);

    let west = &agg.cells[0];
    assert_eq!(west.azimuth_count, 2);
    assert!(approx_eq(west.mean_azimuth, 45.0, 1e-6), "{}", west.mean_azimuth);

    let crossing = &table.segments[1];
    let north = &table.segments[2];
    let expected = crossing.length * 0.6 + north.length;
    assert!(approx_eq(west.summed_length, expected, 1e-3));
}
