use core::fmt::Debug;
use num_traits::{AsPrimitive, Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types. `Send + Sync` lets the
/// parallel kernels share rows across worker threads; `'static` enables
/// the `TypeId` checks used for SIMD and native-backend dispatch.
pub trait Scalar:
    Copy + PartialEq + PartialOrd + Debug + Zero + One + Num + Send + Sync + 'static
{
}

impl<T> Scalar for T where
    T: Copy + PartialEq + PartialOrd + Debug + Zero + One + Num + Send + Sync + 'static
{
}

/// Trait for floating-point matrix elements.
///
/// Every decomposition computes in a `FloatScalar` type: `sqrt`, division
/// and the pivot tolerance all need a real float. A float promotes to
/// itself, so the kernels accept two operands of the same `FloatScalar`.
pub trait FloatScalar:
    Scalar + Float + AsPrimitive<f64> + AsPrimitive<Self> + Promote<Self, Output = Self>
{
    /// Convert an `f64` constant (tolerances, thresholds) into `Self`.
    fn from_f64(v: f64) -> Self;
}

impl FloatScalar for f32 {
    #[inline]
    fn from_f64(v: f64) -> f32 {
        v as f32
    }
}

impl FloatScalar for f64 {
    #[inline]
    fn from_f64(v: f64) -> f64 {
        v
    }
}

/// A matrix element with a default floating-point result type.
///
/// `Float` is `Self` for `f32`/`f64` and `f64` for every integer type.
/// Decompositions without an explicit result type return `Matrix<T::Float>`.
///
/// ```
/// use rowfact::Element;
///
/// fn float_of<T: Element>(x: T) -> T::Float { x.to_float() }
///
/// let a: f64 = float_of(3_i32);
/// let b: f32 = float_of(1.5_f32);
/// assert_eq!(a, 3.0);
/// assert_eq!(b, 1.5);
/// ```
pub trait Element: Scalar + AsPrimitive<f64> {
    /// Floating-point type decompositions promote to by default.
    type Float: FloatScalar;

    /// Convert into the default float type.
    fn to_float(self) -> Self::Float;

    /// Widen to `f64`, used for tolerance comparisons across element types.
    #[inline]
    fn to_f64(self) -> f64 {
        self.as_()
    }
}

macro_rules! impl_element {
    ($($t:ty => $f:ty),* $(,)?) => {
        $(
            impl Element for $t {
                type Float = $f;

                #[inline]
                fn to_float(self) -> $f {
                    self as $f
                }
            }
        )*
    };
}

impl_element!(
    i8 => f64, i16 => f64, i32 => f64, i64 => f64, isize => f64,
    u8 => f64, u16 => f64, u32 => f64, u64 => f64, usize => f64,
    f32 => f32, f64 => f64,
);

/// Common type of two element types, following the usual arithmetic
/// conversions: any float beats any integer and the wider float wins.
/// Integers narrower than 32 bits widen to `i32` first; after that the
/// wider integer wins, and at equal width the unsigned one does.
///
/// Used by the kernels to type the result of mixed-type products.
///
/// ```
/// use rowfact::Promoted;
///
/// let x: Promoted<i32, f32> = 1.0_f32;
/// let y: Promoted<u32, i64> = -1_i64;
/// let z: Promoted<f32, f64> = 0.5_f64;
/// # let _ = (x, y, z);
/// ```
pub trait Promote<Rhs: Scalar>: Scalar {
    type Output: Scalar;
}

/// Shorthand for `<T as Promote<U>>::Output`.
pub type Promoted<T, U> = <T as Promote<U>>::Output;

macro_rules! promote_table {
    ($($l:ty, $r:ty => $o:ty;)*) => {
        $(
            impl Promote<$r> for $l {
                type Output = $o;
            }
        )*
    };
}

promote_table! {
    i8, i8 => i32; i8, i16 => i32; i8, i32 => i32; i8, i64 => i64; i8, isize => isize; i8, u8 => i32;
    i8, u16 => i32; i8, u32 => u32; i8, u64 => u64; i8, usize => usize; i8, f32 => f32; i8, f64 => f64;
    i16, i8 => i32; i16, i16 => i32; i16, i32 => i32; i16, i64 => i64; i16, isize => isize; i16, u8 => i32;
    i16, u16 => i32; i16, u32 => u32; i16, u64 => u64; i16, usize => usize; i16, f32 => f32; i16, f64 => f64;
    i32, i8 => i32; i32, i16 => i32; i32, i32 => i32; i32, i64 => i64; i32, isize => isize; i32, u8 => i32;
    i32, u16 => i32; i32, u32 => u32; i32, u64 => u64; i32, usize => usize; i32, f32 => f32; i32, f64 => f64;
    i64, i8 => i64; i64, i16 => i64; i64, i32 => i64; i64, i64 => i64; i64, isize => i64; i64, u8 => i64;
    i64, u16 => i64; i64, u32 => i64; i64, u64 => u64; i64, usize => usize; i64, f32 => f32; i64, f64 => f64;
    isize, i8 => isize; isize, i16 => isize; isize, i32 => isize; isize, i64 => isize; isize, isize => isize; isize, u8 => isize;
    isize, u16 => isize; isize, u32 => isize; isize, u64 => u64; isize, usize => usize; isize, f32 => f32; isize, f64 => f64;
    u8, i8 => i32; u8, i16 => i32; u8, i32 => i32; u8, i64 => i64; u8, isize => isize; u8, u8 => i32;
    u8, u16 => i32; u8, u32 => u32; u8, u64 => u64; u8, usize => usize; u8, f32 => f32; u8, f64 => f64;
    u16, i8 => i32; u16, i16 => i32; u16, i32 => i32; u16, i64 => i64; u16, isize => isize; u16, u8 => i32;
    u16, u16 => i32; u16, u32 => u32; u16, u64 => u64; u16, usize => usize; u16, f32 => f32; u16, f64 => f64;
    u32, i8 => u32; u32, i16 => u32; u32, i32 => u32; u32, i64 => i64; u32, isize => isize; u32, u8 => u32;
    u32, u16 => u32; u32, u32 => u32; u32, u64 => u64; u32, usize => usize; u32, f32 => f32; u32, f64 => f64;
    u64, i8 => u64; u64, i16 => u64; u64, i32 => u64; u64, i64 => u64; u64, isize => u64; u64, u8 => u64;
    u64, u16 => u64; u64, u32 => u64; u64, u64 => u64; u64, usize => u64; u64, f32 => f32; u64, f64 => f64;
    usize, i8 => usize; usize, i16 => usize; usize, i32 => usize; usize, i64 => usize; usize, isize => usize; usize, u8 => usize;
    usize, u16 => usize; usize, u32 => usize; usize, u64 => usize; usize, usize => usize; usize, f32 => f32; usize, f64 => f64;
    f32, i8 => f32; f32, i16 => f32; f32, i32 => f32; f32, i64 => f32; f32, isize => f32; f32, u8 => f32;
    f32, u16 => f32; f32, u32 => f32; f32, u64 => f32; f32, usize => f32; f32, f32 => f32; f32, f64 => f64;
    f64, i8 => f64; f64, i16 => f64; f64, i32 => f64; f64, i64 => f64; f64, isize => f64; f64, u8 => f64;
    f64, u16 => f64; f64, u32 => f64; f64, u64 => f64; f64, usize => f64; f64, f32 => f64; f64, f64 => f64;
}

/// `|a - b| < eps` after widening both sides to `f64`.
#[inline]
pub fn is_close<T: AsPrimitive<f64>, U: AsPrimitive<f64>>(a: T, b: U, eps: f64) -> bool {
    let (a, b): (f64, f64) = (a.as_(), b.as_());
    (a - b).abs() < eps
}
