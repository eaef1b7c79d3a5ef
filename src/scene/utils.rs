use crate::core::color::Color;
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::{Real, max_of, min_of};
use crate::scene::primitive::Line;
use nalgebra::{Point3, Vector3};

/// Axis overlay colors: x red, y green, z blue.
const AXIS_COLORS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

const GRATICULE_COLOR: [f32; 3] = [0.45, 0.45, 0.45];

/// Three segments along the coordinate axes through the origin, each spanning
/// the bounds on its axis (extended to reach the origin). Axes with no extent
/// are skipped.
pub fn axis_overlay<T: Real>(bounds: Option<&Aabb<T>>) -> Vec<Line<T>> {
    let Some(bounds) = bounds else {
        return Vec::new();
    };
    let mut lines = Vec::with_capacity(3);
    for (axis, rgb) in AXIS_COLORS.iter().enumerate() {
        let lo = min_of(bounds.min[axis].clone(), T::zero());
        let hi = max_of(bounds.max[axis].clone(), T::zero());
        if lo == hi {
            continue;
        }
        let mut start = Point3::<T>::origin();
        let mut end = Point3::<T>::origin();
        start[axis] = lo;
        end[axis] = hi;
        lines.push(Line::new(start, end, Color::from(*rgb)));
    }
    lines
}

/// Grid on the `z = 0` plane spanning the x/y extent of the bounds, with
/// `divisions` cells along each axis.
pub fn graticule<T: Real>(bounds: Option<&Aabb<T>>, divisions: usize) -> Vec<Line<T>> {
    let Some(bounds) = bounds else {
        return Vec::new();
    };
    if divisions == 0 {
        return Vec::new();
    }
    let color = Vector3::from(GRATICULE_COLOR);
    let (x0, x1) = (bounds.min.x.clone(), bounds.max.x.clone());
    let (y0, y1) = (bounds.min.y.clone(), bounds.max.y.clone());
    let steps = T::from_usize(divisions);
    let mut lines = Vec::with_capacity(2 * (divisions + 1));

    if x0 != x1 && y0 != y1 {
        for i in 0..=divisions {
            let k = T::from_usize(i);
            let x = x0.clone() + (x1.clone() - x0.clone()) * k.clone() / steps.clone();
            lines.push(Line::new(
                Point3::new(x.clone(), y0.clone(), T::zero()),
                Point3::new(x, y1.clone(), T::zero()),
                color,
            ));
            let y = y0.clone() + (y1.clone() - y0.clone()) * k / steps.clone();
            lines.push(Line::new(
                Point3::new(x0.clone(), y.clone(), T::zero()),
                Point3::new(x1.clone(), y, T::zero()),
                color,
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_reach_the_origin() {
        let bounds = Aabb::new(Point3::new(1.0, -2.0, 3.0), Point3::new(4.0, 2.0, 3.0));
        let axes = axis_overlay(Some(&bounds));
        assert_eq!(axes.len(), 3);
        assert_eq!(axes[0].segment.start, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(axes[0].segment.end, Point3::new(4.0, 0.0, 0.0));
        assert_eq!(axes[1].segment.start, Point3::new(0.0, -2.0, 0.0));
        assert_eq!(axes[2].segment.end, Point3::new(0.0, 0.0, 3.0));
        assert!(axis_overlay::<f64>(None).is_empty());
    }

    #[test]
    fn graticule_line_count() {
        let bounds = Aabb::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        assert_eq!(graticule(Some(&bounds), 4).len(), 10);
        assert!(graticule(Some(&bounds), 0).is_empty());
        let flat = Aabb::new(Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        assert!(graticule(Some(&flat), 4).is_empty());
    }
}
