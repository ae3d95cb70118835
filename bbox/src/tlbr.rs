use super::Rect;
use crate::common::*;

/// Bounding box in TLBR format.
///
/// A PASCAL VOC `(xmin, ymin, xmax, ymax)` box maps to `[ymin, xmin, ymax, xmax]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TLBR<T> {
    pub(crate) t: T,
    pub(crate) l: T,
    pub(crate) b: T,
    pub(crate) r: T,
}

impl<T> TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Build from corner coordinates in `[xmin, ymin, xmax, ymax]` order.
    pub fn try_from_xyxy(xyxy: [T; 4]) -> Result<Self> {
        let [xmin, ymin, xmax, ymax] = xyxy;
        Self::try_from_tlbr([ymin, xmin, ymax, xmax])
    }
}

impl<T> Rect for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn t(&self) -> Self::Type {
        self.t
    }

    fn l(&self) -> Self::Type {
        self.l
    }

    fn b(&self) -> Self::Type {
        self.b
    }

    fn r(&self) -> Self::Type {
        self.r
    }

    fn h(&self) -> Self::Type {
        self.b - self.t
    }

    fn w(&self) -> Self::Type {
        self.r - self.l
    }

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self> {
        let [t, l, b, r] = tlbr;
        ensure!(b >= t && r >= l, "b >= t and r >= l must hold");

        Ok(Self { t, l, b, r })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RectFloat, HW};
    use approx::assert_abs_diff_eq;

    #[test]
    fn tlbr_from_xyxy() {
        let rect = TLBR::try_from_xyxy([10.0, 20.0, 50.0, 100.0]).unwrap();
        assert_eq!(
            [rect.t(), rect.l(), rect.b(), rect.r()],
            [20.0, 10.0, 100.0, 50.0]
        );
        assert_abs_diff_eq!(rect.w(), 40.0);
        assert_abs_diff_eq!(rect.h(), 80.0);
    }

    #[test]
    fn tlbr_inverted_corners() {
        assert!(TLBR::try_from_xyxy([50.0, 20.0, 10.0, 100.0]).is_err());
        assert!(TLBR::try_from_xyxy([10.0, 20.0, 10.0, 20.0]).is_ok());
    }

    #[test]
    fn tlbr_normalized_hw() {
        let rect = TLBR::try_from_xyxy([0.0, 0.0, 100.0, 50.0]).unwrap();
        let hw = rect.normalized_hw(&HW::from_wh([400.0, 200.0])).unwrap();
        assert_abs_diff_eq!(hw.w(), 0.25);
        assert_abs_diff_eq!(hw.h(), 0.25);

        assert!(rect.normalized_hw(&HW::from_wh([0.0, 200.0])).is_err());
    }
}
