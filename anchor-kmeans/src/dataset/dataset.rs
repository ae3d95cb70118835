use super::*;
use crate::common::*;

/// The dataset with a list of annotated image files.
pub trait FileDataset
where
    Self: Debug + Send,
{
    /// Get the list of image records in the dataset.
    fn records(&self) -> &[Arc<FileRecord>];

    /// Collect the normalized shapes of all boxes across all records.
    fn shapes(&self) -> Result<Vec<HW<f64>>> {
        let records = self.records();
        let shapes: Vec<Vec<_>> = records
            .iter()
            .map(|record| record.shapes())
            .try_collect()?;
        let shapes: Vec<_> = shapes.into_iter().flatten().collect();

        info!(
            "collected {} boxes from {} images",
            shapes.len(),
            records.len()
        );
        Ok(shapes)
    }
}
