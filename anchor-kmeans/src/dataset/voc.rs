use super::{record::is_whitelisted, *};
use crate::common::*;

/// The PASCAL VOC dataset.
///
/// Annotations are read from `Annotations/*.xml` and images are paired by the
/// `filename` element under `JPEGImages/`.
#[derive(Debug, Clone)]
pub struct VocDataset {
    pub samples: Vec<VocSample>,
    pub records: Vec<Arc<FileRecord>>,
}

/// A parsed annotation file along with its paired image.
#[derive(Debug, Clone, PartialEq)]
pub struct VocSample {
    pub annotation_file: PathBuf,
    pub image_file: PathBuf,
    pub annotation: VocAnnotation,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VocAnnotation {
    pub filename: String,
    pub size: Option<VocSize>,
    #[serde(rename = "object", default)]
    pub objects: Vec<VocObject>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VocSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VocObject {
    pub name: String,
    pub bndbox: VocBndBox,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VocBndBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl FileDataset for VocDataset {
    fn records(&self) -> &[Arc<FileRecord>] {
        &self.records
    }
}

impl VocDataset {
    /// Load the dataset from the directory.
    ///
    /// The image size is read from the image file header unless
    /// `trust_annotation_size` is set, in which case the `size` element of the
    /// annotation is used and images are not opened.
    pub async fn load<P>(
        dataset_dir: P,
        class_whitelist: Option<HashSet<String>>,
        trust_annotation_size: bool,
    ) -> Result<VocDataset>
    where
        P: AsRef<Path>,
    {
        let dataset_dir = dataset_dir.as_ref().to_owned();

        // list annotation files
        let annotation_files = {
            let dataset_dir = dataset_dir.clone();
            tokio::task::spawn_blocking(move || list_annotation_files(&dataset_dir)).await??
        };
        ensure!(
            !annotation_files.is_empty(),
            "no annotation files found in '{}'",
            dataset_dir.display()
        );

        // parse annotations and read image sizes
        let class_whitelist = Arc::new(class_whitelist);
        let pairs: Vec<(VocSample, FileRecord)> = stream::iter(annotation_files)
            .map(|annotation_file| {
                let dataset_dir = dataset_dir.clone();
                let class_whitelist = class_whitelist.clone();

                tokio::task::spawn_blocking(move || {
                    load_voc_sample(
                        &dataset_dir,
                        annotation_file,
                        (*class_whitelist).as_ref(),
                        trust_annotation_size,
                    )
                })
            })
            .buffered(num_cpus::get())
            .map(|result| -> Result<_> { result? })
            .try_collect()
            .await?;

        let (samples, records): (Vec<_>, Vec<_>) = pairs
            .into_iter()
            .map(|(sample, record)| (sample, Arc::new(record)))
            .unzip();

        info!(
            "loaded {} annotation files from '{}'",
            samples.len(),
            dataset_dir.display()
        );

        Ok(VocDataset { samples, records })
    }
}

fn list_annotation_files(dataset_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dataset_dir.join("Annotations").join("*.xml");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| format_err!("the path '{}' is not valid UTF-8", pattern.display()))?;

    let mut files: Vec<PathBuf> = glob::glob(pattern)?.try_collect()?;
    files.sort();
    Ok(files)
}

fn load_voc_sample(
    dataset_dir: &Path,
    annotation_file: PathBuf,
    class_whitelist: Option<&HashSet<String>>,
    trust_annotation_size: bool,
) -> Result<(VocSample, FileRecord)> {
    let text = fs::read_to_string(&annotation_file).with_context(|| {
        format!(
            "unable to read annotation file '{}'",
            annotation_file.display()
        )
    })?;
    let annotation: VocAnnotation = serde_xml_rs::from_str(&text).with_context(|| {
        format!(
            "failed to parse annotation file '{}'",
            annotation_file.display()
        )
    })?;
    let image_file = dataset_dir.join("JPEGImages").join(&annotation.filename);

    let size = if trust_annotation_size {
        let VocSize { width, height } = *annotation.size.as_ref().ok_or_else(|| {
            format_err!(
                "the annotation file '{}' has no size element",
                annotation_file.display()
            )
        })?;
        HW::try_from_wh([width, height])?
    } else {
        image_size(&image_file)?
    };

    let bboxes: Vec<_> = annotation
        .objects
        .iter()
        .filter(|obj| is_whitelisted(class_whitelist, &obj.name))
        .map(|obj| -> Result<_> {
            let VocBndBox {
                xmin,
                ymin,
                xmax,
                ymax,
            } = obj.bndbox;
            let rect = TLBR::try_from_xyxy([xmin, ymin, xmax, ymax]).with_context(|| {
                format!(
                    "invalid bounding box of '{}' in '{}'",
                    obj.name,
                    annotation_file.display()
                )
            })?;
            Ok(PixelLabel {
                rect,
                class: obj.name.clone(),
            })
        })
        .try_collect()?;

    let record = FileRecord {
        path: image_file.clone(),
        size,
        bboxes,
    };
    let sample = VocSample {
        annotation_file,
        image_file,
        annotation,
    };

    Ok((sample, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn fixture_dir(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
    }

    #[tokio::test]
    async fn voc_dataset_test() {
        let dataset = VocDataset::load(fixture_dir("voc_dataset"), None, false)
            .await
            .unwrap();

        assert_eq!(dataset.samples.len(), 2);
        assert_eq!(dataset.records.len(), 2);

        let shapes = dataset.shapes().unwrap();
        assert_eq!(shapes.len(), 3);

        // 000001: 200x100 image, one 50x50 dog and one 100x20 person
        assert_abs_diff_eq!(shapes[0].w(), 0.25);
        assert_abs_diff_eq!(shapes[0].h(), 0.5);
        assert_abs_diff_eq!(shapes[1].w(), 0.5);
        assert_abs_diff_eq!(shapes[1].h(), 0.2);

        // 000002: 64x128 image, one 32x32 cat
        assert_abs_diff_eq!(shapes[2].w(), 0.5);
        assert_abs_diff_eq!(shapes[2].h(), 0.25);
    }

    #[tokio::test]
    async fn voc_dataset_class_whitelist() {
        let whitelist: HashSet<String> = ["dog".to_string(), "cat".to_string()]
            .into_iter()
            .collect();
        let dataset = VocDataset::load(fixture_dir("voc_dataset"), Some(whitelist), false)
            .await
            .unwrap();

        let shapes = dataset.shapes().unwrap();
        assert_eq!(shapes.len(), 2);
    }

    #[tokio::test]
    async fn voc_dataset_trust_annotation_size() {
        // the image is absent, the annotation size is used instead
        let dataset = VocDataset::load(fixture_dir("voc_missing_image"), None, true)
            .await
            .unwrap();

        let shapes = dataset.shapes().unwrap();
        assert_eq!(shapes.len(), 1);
        assert_abs_diff_eq!(shapes[0].w(), 0.1);
        assert_abs_diff_eq!(shapes[0].h(), 0.2);
    }

    #[tokio::test]
    async fn voc_dataset_missing_image() {
        let result = VocDataset::load(fixture_dir("voc_missing_image"), None, false).await;
        assert!(result.is_err());
    }

    #[test]
    fn voc_annotation_missing_bndbox_field() {
        let text = r#"
            <annotation>
                <filename>a.png</filename>
                <object>
                    <name>dog</name>
                    <bndbox><xmin>1</xmin><ymin>2</ymin><xmax>3</xmax></bndbox>
                </object>
            </annotation>
        "#;
        let result: Result<VocAnnotation, _> = serde_xml_rs::from_str(text);
        assert!(result.is_err());
    }
}
