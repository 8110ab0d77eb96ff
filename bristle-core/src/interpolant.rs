//! # Basic interpolants
//! Per-axis polynomial interpolants and the factories that derive their
//! coefficients from a window of control values. The heavier work (coefficient
//! computation) happens once at construction; evaluation is a Horner pass.

use smallvec::SmallVec;
use std::ops::Range;

/// A polynomial of degree three or lower over the intrinsic parametric range
/// `[0, 1]`, serving as a basic parameterized object for a single property.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialInterpolant {
    /// Coefficients ordered from the highest power to the constant term.
    coefficients: SmallVec<[f64; 4]>,
}

impl PolynomialInterpolant {
    pub fn new(coefficients: impl Into<SmallVec<[f64; 4]>>) -> Self {
        let coefficients = coefficients.into();
        assert!(
            !coefficients.is_empty(),
            "interpolant requires at least a constant coefficient"
        );
        Self { coefficients }
    }

    /// Lower bound of the intrinsic parametric range.
    #[must_use]
    pub fn min_parametric_value(&self) -> f64 {
        0.0
    }
    /// Upper bound of the intrinsic parametric range.
    #[must_use]
    pub fn max_parametric_value(&self) -> f64 {
        1.0
    }

    /// Evaluate at `t`. Values outside `[0, 1]` extrapolate the polynomial.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .fold(0.0, |acc, &c| acc * t + c)
    }
}

/// Factory deriving one [`PolynomialInterpolant`] from a fixed-size window of
/// control values.
pub trait BasicParameterizedObjectFactory {
    /// Number of control values a window must hold. Positive and constant per
    /// factory type.
    fn required_values(&self) -> usize;

    /// Index range into the window identifying the consecutive values that the
    /// intrinsic range `[0, 1]` interpolates between. Non-empty; its end never
    /// exceeds [`BasicParameterizedObjectFactory::required_values`].
    fn intrinsic_range(&self) -> Range<usize>;

    /// Build the interpolant. Panics unless
    /// `values.len() == self.required_values()`.
    fn interpolant_from_values(&self, values: &[f64]) -> PolynomialInterpolant;
}

fn window<const N: usize>(values: &[f64]) -> [f64; N] {
    values.try_into().unwrap_or_else(|_| {
        panic!(
            "interpolant factory requires exactly {N} values, got {}",
            values.len()
        )
    })
}

/// Degenerate interpolant: a single value returned for any parametric value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DegenerateInterpolantFactory;

impl BasicParameterizedObjectFactory for DegenerateInterpolantFactory {
    fn required_values(&self) -> usize {
        1
    }
    fn intrinsic_range(&self) -> Range<usize> {
        0..1
    }
    fn interpolant_from_values(&self, values: &[f64]) -> PolynomialInterpolant {
        let [a] = window::<1>(values);
        PolynomialInterpolant::new([a].as_slice())
    }
}

/// Linear interpolation between two values; `0` maps to the first, `1` to the
/// second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearInterpolantFactory;

impl BasicParameterizedObjectFactory for LinearInterpolantFactory {
    fn required_values(&self) -> usize {
        2
    }
    fn intrinsic_range(&self) -> Range<usize> {
        0..2
    }
    fn interpolant_from_values(&self, values: &[f64]) -> PolynomialInterpolant {
        let [a, b] = window::<2>(values);
        PolynomialInterpolant::new([b - a, a].as_slice())
    }
}

/// Cubic Bezier curve through four control values. Passes through the first
/// and last; the middle two shape the curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CubicBezierInterpolantFactory;

impl BasicParameterizedObjectFactory for CubicBezierInterpolantFactory {
    fn required_values(&self) -> usize {
        4
    }
    fn intrinsic_range(&self) -> Range<usize> {
        0..4
    }
    fn interpolant_from_values(&self, values: &[f64]) -> PolynomialInterpolant {
        let [a, b, c, d] = window::<4>(values);
        PolynomialInterpolant::new(
            [
                -a + 3.0 * b - 3.0 * c + d,
                3.0 * a - 6.0 * b + 3.0 * c,
                -3.0 * a + 3.0 * b,
                a,
            ]
            .as_slice(),
        )
    }
}

/// Uniform Catmull-Rom segment: the outer two of the four values are auxiliary
/// tangent handles, the segment itself runs from the second value to the
/// third.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatmullRomInterpolantFactory;

impl BasicParameterizedObjectFactory for CatmullRomInterpolantFactory {
    fn required_values(&self) -> usize {
        4
    }
    fn intrinsic_range(&self) -> Range<usize> {
        1..3
    }
    fn interpolant_from_values(&self, values: &[f64]) -> PolynomialInterpolant {
        let [a, b, c, d] = window::<4>(values);
        PolynomialInterpolant::new(
            [
                0.5 * (-a + 3.0 * b - 3.0 * c + d),
                0.5 * (2.0 * a - 5.0 * b + 4.0 * c - d),
                0.5 * (-a + c),
                b,
            ]
            .as_slice(),
        )
    }
}

/// Uniform cubic B-spline segment over four values. C^2 continuous when
/// windows are chained; does not, in general, pass through its control values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BSplineInterpolantFactory;

impl BasicParameterizedObjectFactory for BSplineInterpolantFactory {
    fn required_values(&self) -> usize {
        4
    }
    fn intrinsic_range(&self) -> Range<usize> {
        1..3
    }
    fn interpolant_from_values(&self, values: &[f64]) -> PolynomialInterpolant {
        let [a, b, c, d] = window::<4>(values);
        PolynomialInterpolant::new(
            [
                (-a + 3.0 * b - 3.0 * c + d) / 6.0,
                (3.0 * a - 6.0 * b + 3.0 * c) / 6.0,
                (-3.0 * a + 3.0 * c) / 6.0,
                (a + 4.0 * b + c) / 6.0,
            ]
            .as_slice(),
        )
    }
}
