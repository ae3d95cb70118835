use crate::common::*;

/// An annotated object in pixel units.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelLabel {
    pub rect: TLBR<f64>,
    pub class: String,
}

/// The record with image path, image size and boxes, but without image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Image size in pixels.
    pub size: HW<f64>,
    /// Bounding box in pixel units.
    pub bboxes: Vec<PixelLabel>,
}

impl FileRecord {
    /// Box shapes divided by the image size.
    ///
    /// Fails if a box does not fit in the image.
    pub fn shapes(&self) -> Result<Vec<HW<f64>>> {
        self.bboxes
            .iter()
            .map(|label| -> Result<_> {
                let shape = label
                    .rect
                    .normalized_hw(&self.size)
                    .with_context(|| format!("invalid image size for '{}'", self.path.display()))?;
                ensure!(
                    shape.w() <= 1.0 && shape.h() <= 1.0,
                    "the '{}' box {:?} exceeds the image size of '{}'",
                    label.class,
                    label.rect,
                    self.path.display()
                );
                Ok(shape)
            })
            .try_collect()
    }
}

/// Read the pixel size of an image from its header.
pub fn image_size(path: impl AsRef<Path>) -> Result<HW<f64>> {
    let path = path.as_ref();
    let imagesize::ImageSize { width, height } = imagesize::size(path)
        .with_context(|| format!("unable to read image '{}'", path.display()))?;
    HW::try_from_wh([width as f64, height as f64])
}

/// Returns true if the class passes the optional whitelist.
pub(crate) fn is_whitelisted(class_whitelist: Option<&HashSet<String>>, class: &str) -> bool {
    class_whitelist
        .map(|whitelist| whitelist.contains(class))
        .unwrap_or(true)
}
