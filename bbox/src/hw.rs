use crate::{common::*, Element};

/// The shape of a box, that is, its width and height without position.
///
/// Two shapes are compared as if both were anchored at the same top-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HW<T> {
    w: T,
    h: T,
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    /// Build a shape from `[w, h]`.
    ///
    /// Zero sizes are accepted here. Whether a zero-area shape is usable is
    /// up to the consumer.
    pub fn try_from_wh(wh: [T; 2]) -> Result<Self> {
        let [w, h] = wh;
        let zero = T::zero();
        ensure!(
            w >= zero && h >= zero,
            "width and height parameters must be non-negative"
        );
        Ok(Self { w, h })
    }

    /// Build a shape from `[w, h]`.
    ///
    /// # Panics
    /// If either width or height is negative.
    pub fn from_wh(wh: [T; 2]) -> Self {
        Self::try_from_wh(wh).unwrap()
    }

    pub fn wh(&self) -> [T; 2] {
        [self.w, self.h]
    }

    pub fn area(&self) -> T {
        self.w * self.h
    }

    /// Get the width.
    pub fn w(&self) -> T {
        self.w
    }

    /// Get the height.
    pub fn h(&self) -> T {
        self.h
    }
}

impl<T> HW<T>
where
    T: Element,
{
    /// Width over height.
    pub fn ratio(&self) -> T {
        self.w / self.h
    }

    /// Returns true if both sides are strictly positive and finite.
    pub fn has_area(&self) -> bool {
        let zero = T::zero();
        self.w > zero && self.h > zero && self.w.is_finite() && self.h.is_finite()
    }

    /// The overlapping area of two shapes sharing the same origin.
    pub fn intersection_area_with(&self, other: &Self) -> T {
        self.w.min(other.w) * self.h.min(other.h)
    }

    /// Intersection over union of two shapes sharing the same origin.
    ///
    /// The result is NaN if both shapes have no area. Callers that cannot
    /// tolerate that should check [HW::has_area] first.
    pub fn iou_with(&self, other: &Self) -> T {
        let inter_area = self.intersection_area_with(other);
        let union_area = self.area() + other.area() - inter_area;
        inter_area / union_area
    }

    /// Scale the shape to a new unit, for example from ratio to pixels.
    pub fn scale(&self, sw: T, sh: T) -> Self {
        Self {
            w: self.w * sw,
            h: self.h * sh,
        }
    }
}
