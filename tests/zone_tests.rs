//! Behavioural tests for zone masking over labeled, optionally chunked arrays

use gridzone::prelude::*;
use ndarray::{Array, ArrayD, IxDyn, Zip};

const CRS: &str = "+proj=longlat +datum=WGS84 +no_defs";

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
        vec![x0, y0],
        vec![x1, y0],
        vec![x1, y1],
        vec![x0, y1],
        vec![x0, y0],
    ]]))
}

/// time x lat x lon array; lon[0] = 0 is the west edge and lat[last] = 3 the north edge,
/// so pixel (row, col) covers x in [col, col + 1] and y in [2 - row, 3 - row]
fn sample() -> LabeledArray<f64> {
    let data = Array::from_shape_fn(IxDyn(&[3, 4, 6]), |ix| (ix[0] * 100 + ix[1] * 10 + ix[2]) as f64 + 0.5);
    LabeledArray::new(
        data,
        vec!["time".into(), "lat".into(), "lon".into()],
        vec![
            CoordLabels::Numeric(vec![0.0, 31.0, 59.0]),
            CoordLabels::Numeric(vec![0.0, 1.0, 2.0, 3.0]),
            CoordLabels::Numeric(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
        ],
    )
    .unwrap()
}

fn same_values(a: &ArrayD<f64>, b: &ArrayD<f64>) -> bool {
    a.shape() == b.shape()
        && Zip::from(a)
            .and(b)
            .fold(true, |acc, &x, &y| acc && ((x.is_nan() && y.is_nan()) || x == y))
}

#[test]
fn test_zone_partition_recovers_every_cell_once() {
    let data = sample();
    let shapes = [rect(0.0, -1.0, 3.0, 3.0), rect(3.0, -1.0, 6.0, 3.0)];
    let out = add_zone_dim(&data, &["west", "east"], &shapes, CRS, 1.0, 1.0, "zone").unwrap();

    assert_eq!(out.shape(), &[2, 3, 4, 6]);
    for t in 0..3 {
        for r in 0..4 {
            for c in 0..6 {
                let original = data.data()[[t, r, c]];
                let west = out.data()[[0, t, r, c]];
                let east = out.data()[[1, t, r, c]];

                let present: Vec<f64> = [west, east].into_iter().filter(|v| !v.is_nan()).collect();
                assert_eq!(present, vec![original], "cell ({t}, {r}, {c})");
                assert_eq!(!west.is_nan(), c < 3);
            }
        }
    }
}

#[test]
fn test_zone_edges_through_cell_centres_partition_cells() {
    // centre labels 0.5..3.5 put the pixel centres on integer degrees
    let labels = vec![0.5, 1.5, 2.5, 3.5];
    let data = Array::from_shape_fn(IxDyn(&[2, 4, 4]), |ix| (ix[0] * 16 + ix[1] * 4 + ix[2]) as f64);
    let data = LabeledArray::new(
        data,
        vec!["time".into(), "lat".into(), "lon".into()],
        vec![
            CoordLabels::Positional(2),
            CoordLabels::Numeric(labels.clone()),
            CoordLabels::Numeric(labels),
        ],
    )
    .unwrap();

    let halves = [rect(-10.0, -10.0, 2.0, 10.0), rect(2.0, -10.0, 10.0, 10.0)];
    let quadrants = [
        rect(-10.0, -10.0, 2.0, 2.0),
        rect(2.0, -10.0, 10.0, 2.0),
        rect(-10.0, 2.0, 2.0, 10.0),
        rect(2.0, 2.0, 10.0, 10.0),
    ];

    for (zones, shapes) in [(vec!["w", "e"], &halves[..]), (vec!["sw", "se", "nw", "ne"], &quadrants[..])] {
        for array in [data.clone(), data.clone().chunk(&[("lat", 1), ("lon", 2)]).unwrap()] {
            let out = add_zone_dim(&array, &zones, shapes, CRS, 1.0, 1.0, "zone").unwrap();
            for t in 0..2 {
                for r in 0..4 {
                    for c in 0..4 {
                        let present: Vec<f64> = (0..zones.len())
                            .map(|z| out.data()[[z, t, r, c]])
                            .filter(|v| !v.is_nan())
                            .collect();
                        assert_eq!(present, vec![data.data()[[t, r, c]]], "zones {zones:?} cell ({t}, {r}, {c})");
                    }
                }
            }
        }
    }
}

#[test]
fn test_zone_axis_labels_follow_input_order() {
    let data = sample();
    let shapes = [rect(0.0, -1.0, 1.0, 0.0), rect(10.0, 10.0, 11.0, 11.0), rect(0.0, -1.0, 6.0, 3.0)];
    let out = add_zone_dim(&data, &["c", "a", "b"], &shapes, CRS, 1.0, 1.0, "region").unwrap();

    assert_eq!(out.dims()[0], "region");
    assert_eq!(out.coord("region").unwrap(), &CoordLabels::names(&["c", "a", "b"]));

    // a zone outside the raster masks everything
    let outside = out.select("region", "a").unwrap();
    assert!(outside.data().iter().all(|v| v.is_nan()));
}

#[test]
fn test_non_spatial_axes_preserved() {
    let data = sample();
    let out = add_zone_dim(&data, &["all"], &[rect(0.0, -1.0, 6.0, 3.0)], CRS, 1.0, 1.0, "zone").unwrap();

    assert_eq!(&out.dims()[1..], data.dims());
    assert_eq!(&out.coords()[1..], data.coords());
    assert_eq!(out.coord("time").unwrap(), &CoordLabels::Numeric(vec![0.0, 31.0, 59.0]));
}

#[test]
fn test_full_cover_zone_is_identity() {
    let data = sample();
    let out = add_zone_dim(&data, &["all"], &[rect(-1.0, -2.0, 7.0, 4.0)], CRS, 1.0, 1.0, "zone").unwrap();

    let only = out.select("zone", "all").unwrap();
    assert!(same_values(only.data(), data.data()));
    assert!(only.data().iter().all(|v| !v.is_nan()));
}

#[test]
fn test_chunked_matches_unchunked() {
    let data = sample();
    let shapes = [rect(0.0, -1.0, 3.0, 1.5), rect(2.0, 0.0, 6.0, 3.0)];
    let zones = ["south_west", "north_east"];

    let eager = add_zone_dim(&data, &zones, &shapes, CRS, 1.0, 1.0, "zone").unwrap();
    assert!(!eager.is_chunked());

    for sizes in [
        vec![("time", 1)],
        vec![("lat", 3), ("lon", 4)],
        vec![("time", 2), ("lat", 1), ("lon", 1)],
    ] {
        let chunked = data.clone().chunk(&sizes).unwrap();
        let lazy = add_zone_dim(&chunked, &zones, &shapes, CRS, 1.0, 1.0, "zone").unwrap();

        assert!(same_values(lazy.data(), eager.data()), "chunks {sizes:?}");
        let layout = lazy.chunks().unwrap();
        assert_eq!(layout.chunks()[0], vec![2]);
        assert_eq!(&layout.chunks()[1..], chunked.chunks().unwrap().chunks());
    }
}

#[test]
fn test_spatial_axes_need_not_be_trailing() {
    // lon x time x lat ordering of the same values
    let data = sample();
    let permuted = data.data().view().permuted_axes(IxDyn(&[2, 0, 1])).to_owned();
    let reordered = LabeledArray::new(
        permuted,
        vec!["lon".into(), "time".into(), "lat".into()],
        vec![data.coords()[2].clone(), data.coords()[0].clone(), data.coords()[1].clone()],
    )
    .unwrap();

    let shapes = [rect(0.0, -1.0, 3.0, 3.0)];
    let expected = add_zone_dim(&data, &["west"], &shapes, CRS, 1.0, 1.0, "zone").unwrap();
    let out = add_zone_dim(&reordered.chunk(&[("lon", 4)]).unwrap(), &["west"], &shapes, CRS, 1.0, 1.0, "zone")
        .unwrap();

    assert_eq!(out.shape(), &[1, 6, 3, 4]);
    for c in 0..6 {
        for t in 0..3 {
            for r in 0..4 {
                let a = out.data()[[0, c, t, r]];
                let b = expected.data()[[0, t, r, c]];
                assert!((a.is_nan() && b.is_nan()) || a == b);
            }
        }
    }
}

#[test]
fn test_single_precision_data() {
    let data = Array::from_elem(IxDyn(&[2, 2]), 7.0_f32);
    let array = LabeledArray::new(
        data,
        vec!["lat".into(), "lon".into()],
        vec![CoordLabels::Numeric(vec![0.0, 1.0]), CoordLabels::Numeric(vec![0.0, 1.0])],
    )
    .unwrap();

    // northern row only
    let out = add_zone_dim(&array, &["n"], &[rect(0.0, 0.0, 2.0, 1.0)], CRS, 1.0, 1.0, "zone").unwrap();
    assert_eq!(out.data()[[0, 0, 0]], 7.0);
    assert_eq!(out.data()[[0, 0, 1]], 7.0);
    assert!(out.data()[[0, 1, 0]].is_nan());
}

#[test]
fn test_all_touched_and_invert_options() {
    let data = sample();
    let transform = GeoTransform::from_origin(0.0, 3.0, 1.0, 1.0).unwrap();
    // a sliver inside pixel (row 0, col 0) that misses its centre
    let sliver = [rect(0.1, 2.1, 0.2, 2.2)];

    let centre = add_zone_dim_with_transform(&data, &["z"], &sliver, CRS, transform, "zone", MaskOptions::default())
        .unwrap();
    assert!(centre.data().iter().all(|v| v.is_nan()));

    let touched = MaskOptions { all_touched: true, invert: false };
    let out = add_zone_dim_with_transform(&data, &["z"], &sliver, CRS, transform, "zone", touched).unwrap();
    assert_eq!(out.data().iter().filter(|v| !v.is_nan()).count(), 3);
    assert_eq!(out.data()[[0, 1, 0, 0]], data.data()[[1, 0, 0]]);

    let inverted = MaskOptions { all_touched: true, invert: true };
    let out = add_zone_dim_with_transform(&data, &["z"], &sliver, CRS, transform, "zone", inverted).unwrap();
    assert_eq!(out.data().iter().filter(|v| v.is_nan()).count(), 3);
}

#[test]
fn test_invalid_inputs_abort() {
    let data = sample();
    let shape = [rect(0.0, 0.0, 1.0, 1.0)];

    assert!(matches!(
        add_zone_dim(&data, &["a"], &shape, "not a crs", 1.0, 1.0, "zone"),
        Err(GridZoneError::InvalidCrs { .. })
    ));
    assert!(matches!(
        add_zone_dim(&data, &["a"], &shape, CRS, 0.0, 1.0, "zone"),
        Err(GridZoneError::InvalidParameter { name: "xsize", .. })
    ));

    let line = geojson::Geometry::new(geojson::Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]));
    assert!(matches!(
        add_zone_dim(&data, &["a"], &[line], CRS, 1.0, 1.0, "zone"),
        Err(GridZoneError::InvalidGeometry(_))
    ));

    let mut names = data.clone();
    names.assign_coords("lat", CoordLabels::names(&["a", "b", "c", "d"])).unwrap();
    assert!(matches!(
        add_zone_dim(&names, &["a"], &shape, CRS, 1.0, 1.0, "zone"),
        Err(GridZoneError::InvalidCoordinate { .. })
    ));
}
