mod common;

use common::{blue, camera, gray, red, square, triangle};
use nalgebra::Vector3;
use raycaster::core::math::numeric::{Exact, Real};
use raycaster::core::math::vector::vector_from_array;
use raycaster::pipeline::renderer::{RenderSettings, Renderer};
use raycaster::scene::light::Lighting;
use raycaster::scene::primitive::{Marker, Tetrahedron};
use raycaster::scene::universe::Universe;

fn scene<T: Real>() -> Universe<T> {
    let mut universe = Universe::new();
    universe.add_facet(square::<T>(4.0, -4.0, gray()));
    universe.add_facet(triangle::<T>(
        [[-1.0, -1.0, 0.0], [1.0, -1.0, 0.5], [0.0, 1.0, -0.5]],
        red(),
    ));
    universe.add_tetrahedron(Tetrahedron::new(
        [
            common::p(1.0, 1.0, -2.0),
            common::p(2.0, 1.0, -2.0),
            common::p(1.0, 2.0, -2.0),
            common::p(1.5, 1.5, -1.0),
        ],
        blue(),
    ));
    universe.add_point(Marker::new(common::p(-0.5, 0.5, 1.0), red()));
    universe
}

fn translation_round_trip<T: Real>() {
    let settings = RenderSettings {
        lighting: Lighting::new(Vector3::new(0.5, -0.25, -1.0), 0.3).unwrap(),
        ..Default::default()
    };
    let renderer = Renderer::new(settings);
    let mut universe = scene::<T>();
    let mut cam = camera::<T>(32);

    let first = renderer.render(&mut cam, &mut universe).unwrap();
    assert!(cam.cached_rays() > 0);

    let offset: Vector3<T> = vector_from_array([0.5, 0.25, -0.75]);
    cam.translate(&offset);
    assert_eq!(cam.cached_rays(), 0);
    let moved = renderer.render(&mut cam, &mut universe).unwrap();
    assert_ne!(first.pixels, moved.pixels);

    cam.translate(&-offset);
    assert_eq!(cam.cached_rays(), 0);
    let back = renderer.render(&mut cam, &mut universe).unwrap();
    assert_eq!(first.pixels, back.pixels);
    assert_eq!(first.stats, back.stats);
}

#[test]
fn translation_round_trip_rational() {
    translation_round_trip::<Exact>();
}

#[test]
fn translation_round_trip_float() {
    // the offsets are dyadic, so float coordinates return exactly as well
    translation_round_trip::<f64>();
}

#[test]
fn rerender_reuses_cached_rays() {
    let renderer = Renderer::new(RenderSettings::<Exact>::default());
    let mut universe = scene::<Exact>();
    let mut cam = camera::<Exact>(16);
    let first = renderer.render(&mut cam, &mut universe).unwrap();
    let cached = cam.cached_rays();
    let second = renderer.render(&mut cam, &mut universe).unwrap();
    assert_eq!(cam.cached_rays(), cached);
    assert_eq!(first.pixels, second.pixels);
}
