use super::{record::is_whitelisted, *};
use crate::common::*;

/// The dataset described by a CSV label file.
///
/// Each row is one object in `image_file,class_name,xmin,ymin,xmax,ymax`
/// format, in pixel units. Lines starting with `#` are ignored.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    pub samples: Vec<CsvSample>,
    pub records: Vec<Arc<FileRecord>>,
}

impl FileDataset for CsvDataset {
    fn records(&self) -> &[Arc<FileRecord>] {
        &self.records
    }
}

impl CsvDataset {
    pub async fn load(
        image_dir: impl AsRef<Path>,
        label_file: impl AsRef<Path>,
        class_whitelist: Option<HashSet<String>>,
    ) -> Result<Self> {
        let image_dir = image_dir.as_ref().to_owned();
        let label_file = label_file.as_ref().to_owned();

        // parse label file
        let samples = {
            let label_file = label_file.clone();
            tokio::task::spawn_blocking(move || load_csv_dataset(image_dir, label_file)).await??
        };

        // group objects by image
        let groups: Vec<(PathBuf, Vec<CsvSample>)> = samples
            .iter()
            .cloned()
            .map(|sample| (sample.image_file.clone(), sample))
            .into_group_map()
            .into_iter()
            .sorted_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs))
            .collect();

        // read image sizes
        let class_whitelist = Arc::new(class_whitelist);
        let records: Vec<_> = stream::iter(groups)
            .map(|(image_file, samples)| {
                let class_whitelist = class_whitelist.clone();

                tokio::task::spawn_blocking(move || -> Result<_> {
                    let size = image_size(&image_file)?;

                    let bboxes: Vec<_> = samples
                        .into_iter()
                        .filter(|sample| {
                            is_whitelisted((*class_whitelist).as_ref(), &sample.class_name)
                        })
                        .map(|sample| -> Result<_> {
                            let CsvSample {
                                xmin,
                                ymin,
                                xmax,
                                ymax,
                                class_name,
                                ..
                            } = sample;
                            let rect =
                                TLBR::try_from_xyxy([xmin, ymin, xmax, ymax]).with_context(|| {
                                    format!(
                                        "invalid bounding box of '{}' in image '{}'",
                                        class_name,
                                        image_file.display()
                                    )
                                })?;
                            Ok(PixelLabel {
                                rect,
                                class: class_name,
                            })
                        })
                        .try_collect()?;

                    Ok(Arc::new(FileRecord {
                        path: image_file,
                        size,
                        bboxes,
                    }))
                })
            })
            .buffered(num_cpus::get())
            .map(|result| -> Result<_> { result? })
            .try_collect()
            .await?;

        let num_objects: usize = records.iter().map(|record| record.bboxes.len()).sum();
        info!(
            "loaded {} objects in {} images from '{}'",
            num_objects,
            records.len(),
            label_file.display()
        );

        Ok(Self { samples, records })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvSample {
    pub image_file: PathBuf,
    pub class_name: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

pub fn load_csv_dataset(
    image_dir: impl AsRef<Path>,
    label_file: impl AsRef<Path>,
) -> Result<Vec<CsvSample>> {
    let image_dir = image_dir.as_ref();
    let label_file = label_file.as_ref();

    // parse label file
    let records: Vec<CsvSample> = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(::csv::Trim::All)
        .from_path(label_file)
        .with_context(|| format!("unable to open label file '{}'", label_file.display()))?
        .deserialize()
        .try_collect()
        .with_context(|| format!("failed to parse label file '{}'", label_file.display()))?;

    // check existence of image files
    let records: Vec<_> = records
        .into_iter()
        .map(|record| {
            let image_file = image_dir.join(&record.image_file);
            ensure!(
                image_file.is_file(),
                "the image file '{}' does not exist",
                image_file.display()
            );
            Ok(CsvSample {
                image_file,
                ..record
            })
        })
        .try_collect()?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[tokio::test]
    async fn csv_dataset_test() {
        let base_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("csv_dataset");
        let image_dir = base_dir.join("images");
        let label_file = base_dir.join("label.csv");

        let dataset = CsvDataset::load(image_dir, label_file, None).await.unwrap();

        assert_eq!(dataset.samples.len(), 3);
        assert_eq!(dataset.records.len(), 2);

        // a.png is 200x100, b.png is 64x128
        let shapes = dataset.shapes().unwrap();
        assert_eq!(shapes.len(), 3);
        assert_abs_diff_eq!(shapes[0].w(), 0.25);
        assert_abs_diff_eq!(shapes[0].h(), 0.5);
        assert_abs_diff_eq!(shapes[1].w(), 0.5);
        assert_abs_diff_eq!(shapes[1].h(), 0.2);
        assert_abs_diff_eq!(shapes[2].w(), 0.5);
        assert_abs_diff_eq!(shapes[2].h(), 0.25);
    }

    #[tokio::test]
    async fn csv_dataset_class_whitelist() {
        let base_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("csv_dataset");
        let whitelist: HashSet<String> = ["dog", "cat"].iter().map(|s| s.to_string()).collect();

        let dataset = CsvDataset::load(
            base_dir.join("images"),
            base_dir.join("label.csv"),
            Some(whitelist),
        )
        .await
        .unwrap();

        // the person row is parsed but not kept
        assert_eq!(dataset.samples.len(), 3);
        let num_objects: usize = dataset.records.iter().map(|r| r.bboxes.len()).sum();
        assert_eq!(num_objects, 2);
        assert_eq!(dataset.shapes().unwrap().len(), 2);
    }

    #[test]
    fn csv_dataset_missing_image() {
        let base_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("csv_dataset");
        let result = load_csv_dataset(base_dir.join("missing"), base_dir.join("label.csv"));
        assert!(result.is_err());
    }
}
