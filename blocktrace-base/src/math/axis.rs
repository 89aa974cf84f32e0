/// One of the three coordinate axes.
///
/// Indexes euclid's 3D vectors and points without bounds checks; pair it with a sign via
/// [`Face6::from_axis`](crate::math::Face6::from_axis) to name a face.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// X, Y, Z.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];
}

macro_rules! impl_index_by_axis {
    ($($ty:ident),*) => {$(
        impl<T, U> core::ops::Index<Axis> for euclid::$ty<T, U> {
            type Output = T;
            #[inline]
            fn index(&self, axis: Axis) -> &T {
                match axis {
                    Axis::X => &self.x,
                    Axis::Y => &self.y,
                    Axis::Z => &self.z,
                }
            }
        }

        impl<T, U> core::ops::IndexMut<Axis> for euclid::$ty<T, U> {
            #[inline]
            fn index_mut(&mut self, axis: Axis) -> &mut T {
                match axis {
                    Axis::X => &mut self.x,
                    Axis::Y => &mut self.y,
                    Axis::Z => &mut self.z,
                }
            }
        }
    )*};
}

impl_index_by_axis!(Vector3D, Point3D);
