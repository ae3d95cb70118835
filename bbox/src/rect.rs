use super::HW;
use crate::{common::*, Element};

/// The generic rectangle.
pub trait Rect {
    type Type;

    fn t(&self) -> Self::Type;
    fn l(&self) -> Self::Type;
    fn b(&self) -> Self::Type;
    fn r(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd + Copy,
{
    /// The shape of the rectangle with its position discarded.
    fn to_hw(&self) -> HW<Self::Type> {
        HW::from_wh([self.w(), self.h()])
    }
}

pub trait RectFloat: RectNum
where
    Self::Type: Element,
{
    /// Divide the rectangle shape by the image size.
    ///
    /// The image size must have positive width and height.
    fn normalized_hw(&self, image_size: &HW<Self::Type>) -> Result<HW<Self::Type>> {
        ensure!(
            image_size.has_area(),
            "image size must have positive width and height"
        );
        let one = Self::Type::one();
        Ok(self
            .to_hw()
            .scale(one / image_size.w(), one / image_size.h()))
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Num + PartialOrd + Copy,
{
}

impl<T> RectFloat for T
where
    T: Rect,
    T::Type: Element,
{
}
