use std::path::PathBuf;

use linetrack::{
    route::{self, Route},
    shared::geo::Coordinate,
};

fn write_fixture(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("linetrack_{}_{name}", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn load_shape_orders_by_sequence() {
    let path = write_fixture(
        "shape_shuffled.csv",
        "shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
         0.0,2.0,3\n\
         0.0,0.0,1\n\
         0.0,1.0,2\n",
    );

    let route = route::load_shape(&path).unwrap();
    assert_eq!(
        route.points(),
        &[
            Coordinate::from((0.0, 0.0)),
            Coordinate::from((0.0, 1.0)),
            Coordinate::from((0.0, 2.0)),
        ]
    );
    std::fs::remove_file(path).ok();
}

#[test]
fn load_shape_rejects_single_point_files() {
    let path = write_fixture(
        "shape_single.csv",
        "shape_pt_lat,shape_pt_lon,shape_pt_sequence\n23.8,90.4,1\n",
    );

    let result = route::load_shape(&path);
    assert!(matches!(result, Err(route::Error::TooShort(1))));
    std::fs::remove_file(path).ok();
}

#[test]
fn load_shape_missing_file_errors() {
    assert!(route::load_shape("/nonexistent/shapes.txt").is_err());
}

#[test]
fn load_stops_keeps_file_order() {
    let path = write_fixture(
        "stops.csv",
        "stop_id,stop_name,stop_lat,stop_lon\n\
         s1,Campus Gate,23.81,90.41\n\
         s2,Market,23.79,90.38\n",
    );

    let stops = route::load_stops(&path).unwrap();
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].stop_id, "s1");
    assert_eq!(stops[1].stop_name, "Market");
    assert_eq!(stops[0].coordinate(), Coordinate::from((23.81, 90.41)));
    std::fs::remove_file(path).ok();
}

#[test]
fn loaded_route_projects_like_a_built_one() {
    let path = write_fixture(
        "shape_project.csv",
        "shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
         0.0,0.0,1\n\
         0.0,1.0,2\n",
    );

    let loaded = route::load_shape(&path).unwrap();
    let built = Route::new(vec![
        Coordinate::from((0.0, 0.0)),
        Coordinate::from((0.0, 1.0)),
    ])
    .unwrap();

    let point = Coordinate::from((0.1, 0.4));
    assert_eq!(loaded.project(&point), built.project(&point));
    std::fs::remove_file(path).ok();
}
