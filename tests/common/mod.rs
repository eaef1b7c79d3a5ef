#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use raycaster::core::color::Color;
use raycaster::core::math::numeric::Real;
use raycaster::core::math::vector::point_from_array;
use raycaster::scene::camera::Camera;
use raycaster::scene::primitive::Facet;
use raycaster::scene::viewport::Viewport;

pub fn p<T: Real>(x: f64, y: f64, z: f64) -> Point3<T> {
    point_from_array([x, y, z])
}

/// Focus at `(0, 0, 10)` looking down -z through the square
/// `[-1, 1] x [-1, 1]` at `z = 9`.
pub fn camera<T: Real>(dim: usize) -> Camera<T> {
    camera_with_size(dim, dim)
}

pub fn camera_with_size<T: Real>(width: usize, height: usize) -> Camera<T> {
    let corners = [
        p(-1.0, -1.0, 9.0),
        p(1.0, -1.0, 9.0),
        p(1.0, 1.0, 9.0),
        p(-1.0, 1.0, 9.0),
    ];
    let viewport = Viewport::new(corners, width, height).unwrap();
    Camera::new(p(0.0, 0.0, 10.0), viewport).unwrap()
}

pub fn triangle<T: Real>(points: [[f64; 3]; 3], color: Color) -> Facet<T> {
    let [a, b, c] = points.map(point_from_array::<T>);
    Facet::triangle(a, b, c, color)
}

/// Axis-aligned square `[-half, half]^2` at height `z`, wound counter-clockwise
/// seen from +z.
pub fn square<T: Real>(half: f64, z: f64, color: Color) -> Facet<T> {
    Facet::new(
        vec![
            p(-half, -half, z),
            p(half, -half, z),
            p(half, half, z),
            p(-half, half, z),
        ],
        color,
    )
    .unwrap()
}

pub fn red() -> Color {
    Vector3::new(1.0, 0.0, 0.0)
}

pub fn blue() -> Color {
    Vector3::new(0.0, 0.0, 1.0)
}

pub fn gray() -> Color {
    Vector3::new(0.5, 0.5, 0.5)
}
