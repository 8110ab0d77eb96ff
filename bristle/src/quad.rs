//! # Quads
//! Oriented rectangles, the unit of brush-tip geometry. A quad is stored as
//! its four corners so that scatter transforms compose without accumulating a
//! center/size/rotation decomposition.

use cgmath::{Matrix3, Point2, Rad, SquareMatrix, Vector2, Vector3};

/// An oriented rectangle in 2D.
///
/// Corner order is fixed: index 0 maps from the canonical square's origin,
/// then counterclockwise through (1,0), (1,1), (0,1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    corners: [Point2<f64>; 4],
}

impl Quad {
    /// Corner indices of the two triangles a quad is rendered as.
    pub const TRIANGLE_CORNERS: [usize; 6] = [0, 1, 2, 0, 2, 3];

    pub fn from_corners(corners: [Point2<f64>; 4]) -> Self {
        Self { corners }
    }

    /// An axis-aligned rectangle around `center`.
    pub fn axis_aligned(center: Point2<f64>, size: Vector2<f64>) -> Self {
        Self::rotated_rect(center, size, 0.0)
    }

    /// A rectangle around `center`, rotated by `rotation` radians.
    pub fn rotated_rect(center: Point2<f64>, size: Vector2<f64>, rotation: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        let half = size / 2.0;
        let rotate = |x: f64, y: f64| {
            Point2::new(
                center.x + x * cos - y * sin,
                center.y + x * sin + y * cos,
            )
        };
        Self {
            corners: [
                rotate(-half.x, -half.y),
                rotate(half.x, -half.y),
                rotate(half.x, half.y),
                rotate(-half.x, half.y),
            ],
        }
    }

    /// The unit square from (0, 0) to (1, 1), the identity texture mapping.
    pub fn canonical() -> Self {
        Self {
            corners: [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
        }
    }

    #[must_use]
    pub fn corners(&self) -> &[Point2<f64>; 4] {
        &self.corners
    }

    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        let sum = self
            .corners
            .iter()
            .fold(Vector2::new(0.0, 0.0), |acc, c| {
                acc + Vector2::new(c.x, c.y)
            });
        Point2::new(sum.x / 4.0, sum.y / 4.0)
    }

    /// Edge lengths along the quad's own axes.
    #[must_use]
    pub fn size(&self) -> Vector2<f64> {
        use cgmath::MetricSpace;
        Vector2::new(
            self.corners[0].distance(self.corners[1]),
            self.corners[0].distance(self.corners[3]),
        )
    }

    /// The affine transform mapping the canonical square onto this quad.
    /// Singular for zero-size quads.
    #[must_use]
    pub fn transform(&self) -> Matrix3<f64> {
        let e1 = self.corners[1] - self.corners[0];
        let e2 = self.corners[3] - self.corners[0];
        Matrix3::from_cols(
            Vector3::new(e1.x, e1.y, 0.0),
            Vector3::new(e2.x, e2.y, 0.0),
            Vector3::new(self.corners[0].x, self.corners[0].y, 1.0),
        )
    }

    /// Inverse of [`Quad::transform`], or `None` for zero-size quads.
    #[must_use]
    pub fn inverse_transform(&self) -> Option<Matrix3<f64>> {
        self.transform().invert()
    }

    #[must_use = "returns a new quad without modifying `self`"]
    pub fn translated(&self, offset: Vector2<f64>) -> Self {
        Self {
            corners: self.corners.map(|c| c + offset),
        }
    }

    #[must_use = "returns a new quad without modifying `self`"]
    pub fn rotated_around_center(&self, rotation: f64) -> Self {
        let center = self.center();
        let rotate = cgmath::Basis2::from(Rad(rotation));
        Self {
            corners: self.corners.map(|c| {
                use cgmath::Rotation;
                center + rotate.rotate_vector(c - center)
            }),
        }
    }

    #[must_use = "returns a new quad without modifying `self`"]
    pub fn scaled_around_center(&self, factor: f64) -> Self {
        let center = self.center();
        Self {
            corners: self.corners.map(|c| center + (c - center) * factor),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Quad;
    use cgmath::{Matrix3, Point2, Transform, Vector2};

    fn assert_close(a: Point2<f64>, b: Point2<f64>) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} vs {b:?}");
    }

    #[test]
    fn axis_aligned_corners() {
        let quad = Quad::axis_aligned(Point2::new(1.0, 2.0), Vector2::new(4.0, 2.0));
        assert_close(quad.corners()[0], Point2::new(-1.0, 1.0));
        assert_close(quad.corners()[1], Point2::new(3.0, 1.0));
        assert_close(quad.corners()[2], Point2::new(3.0, 3.0));
        assert_close(quad.corners()[3], Point2::new(-1.0, 3.0));
        assert_close(quad.center(), Point2::new(1.0, 2.0));
        assert!((quad.size().x - 4.0).abs() < 1e-9);
        assert!((quad.size().y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_preserves_center_and_size() {
        let quad = Quad::rotated_rect(
            Point2::new(5.0, -3.0),
            Vector2::new(2.0, 1.0),
            std::f64::consts::FRAC_PI_3,
        );
        assert_close(quad.center(), Point2::new(5.0, -3.0));
        assert!((quad.size().x - 2.0).abs() < 1e-9);
        assert!((quad.size().y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn transform_maps_canonical_corners() {
        let quad = Quad::rotated_rect(Point2::new(1.0, 1.0), Vector2::new(2.0, 2.0), 0.7);
        let transform = quad.transform();
        for (canonical, corner) in Quad::canonical().corners().iter().zip(quad.corners()) {
            assert_close(transform.transform_point(*canonical), *corner);
        }
        let inverse = quad.inverse_transform().unwrap();
        assert_close(
            inverse.transform_point(quad.corners()[2]),
            Point2::new(1.0, 1.0),
        );
    }

    #[test]
    fn zero_size_transform_is_singular() {
        let quad = Quad::axis_aligned(Point2::new(0.0, 0.0), Vector2::new(0.0, 0.0));
        assert!(quad.inverse_transform().is_none());
        let _: Matrix3<f64> = quad.transform();
    }

    #[test]
    fn scatter_transforms_compose() {
        let quad = Quad::axis_aligned(Point2::new(0.0, 0.0), Vector2::new(2.0, 2.0))
            .translated(Vector2::new(3.0, 0.0))
            .rotated_around_center(std::f64::consts::FRAC_PI_2)
            .scaled_around_center(2.0);
        assert_close(quad.center(), Point2::new(3.0, 0.0));
        assert!((quad.size().x - 4.0).abs() < 1e-9);
    }
}
