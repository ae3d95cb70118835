//! Estimate anchor boxes for a detection dataset.

mod common;
pub mod config;

use crate::{
    common::*,
    config::{Config, DatasetKind},
};
use anchor_kmeans::{
    dataset::{CsvDataset, FileDataset, VocDataset},
    Aggregate, AnchorReport, Clusters, KMeans, KMeansError,
};
use bbox::HW;
use prettytable::{cell, row, Table};

/// The outcome of clustering with one k.
pub type FitResult = Result<(Clusters, AnchorReport), KMeansError>;

/// Load the normalized box shapes of the configured dataset.
pub async fn load_shapes(config: &Config) -> Result<Vec<HW<f64>>> {
    let class_whitelist = config.dataset.class_whitelist.clone();

    let shapes = match &config.dataset.kind {
        DatasetKind::Voc {
            dataset_dir,
            trust_annotation_size,
        } => VocDataset::load(dataset_dir, class_whitelist, *trust_annotation_size)
            .await
            .with_context(|| {
                format!("failed to load VOC dataset '{}'", dataset_dir.display())
            })?
            .shapes()?,
        DatasetKind::Csv {
            image_dir,
            label_file,
        } => CsvDataset::load(image_dir, label_file, class_whitelist)
            .await
            .with_context(|| format!("failed to load CSV dataset '{}'", label_file.display()))?
            .shapes()?,
    };

    ensure!(!shapes.is_empty(), "the dataset has no bounding boxes");
    Ok(shapes)
}

/// Cluster the dataset into the configured number of anchors and print them.
pub async fn cluster(config: Arc<Config>) -> Result<()> {
    let shapes = load_shapes(&config).await?;
    let k = config.clustering.k.get();
    let kmeans = config.clustering.kmeans();

    info!("clustering {} boxes into {} anchors", shapes.len(), k);

    let (clusters, report) = tokio::task::spawn_blocking(move || fit(&shapes, k, &kmeans))
        .await?
        .with_context(|| format!("failed to estimate {} anchors", k))?;

    info!("converged after {} iterations", clusters.iterations);
    print_anchors(&report, config.report.input_size);

    Ok(())
}

/// Cluster the dataset for each k in the range and compare the scores.
///
/// A failure for one k is reported and does not stop the others.
pub async fn sweep(config: Arc<Config>, ks: RangeInclusive<usize>) -> Result<()> {
    ensure!(
        !ks.is_empty() && *ks.start() >= 1,
        "invalid range of k {}..={}",
        ks.start(),
        ks.end()
    );

    let shapes = Arc::new(load_shapes(&config).await?);
    info!(
        "clustering {} boxes for k in {}..={}",
        shapes.len(),
        ks.start(),
        ks.end()
    );

    let results = fit_each_k(shapes, ks, config.clustering.kmeans()).await?;

    let mut table = Table::new();
    table.add_row(row!["k", "iterations", "avg IoU", "ratios"]);

    let mut num_succeeded = 0;
    for (k, result) in &results {
        match result {
            Ok((clusters, report)) => {
                num_succeeded += 1;
                let ratios = report
                    .anchors
                    .iter()
                    .map(|anchor| format!("{:.2}", anchor.ratio))
                    .collect::<Vec<_>>()
                    .join(" ");
                table.add_row(row![
                    k,
                    clusters.iterations,
                    format!("{:.2}%", report.avg_iou * 100.0),
                    ratios
                ]);
            }
            Err(err) => {
                warn!("clustering with k = {} failed: {}", k, err);
                table.add_row(row![k, "-", "-", format!("failed: {}", err)]);
            }
        }
    }

    table.printstd();
    ensure!(num_succeeded > 0, "clustering failed for every k");

    Ok(())
}

/// Run the clustering once per k, concurrently, and collect the outcomes in
/// ascending k order.
pub async fn fit_each_k<A>(
    shapes: Arc<Vec<HW<f64>>>,
    ks: RangeInclusive<usize>,
    kmeans: KMeans<A>,
) -> Result<Vec<(usize, FitResult)>>
where
    A: 'static + Aggregate + Clone + Send,
{
    let results: Vec<(usize, FitResult)> = stream::iter(ks)
        .map(|k| {
            let shapes = shapes.clone();
            let kmeans = kmeans.clone();
            tokio::task::spawn_blocking(move || (k, fit(&shapes, k, &kmeans)))
        })
        .buffered(num_cpus::get())
        .try_collect()
        .await?;

    Ok(results)
}

fn fit<A>(shapes: &[HW<f64>], k: usize, kmeans: &KMeans<A>) -> FitResult
where
    A: Aggregate,
{
    let clusters = kmeans.fit(shapes, k)?;
    let report = AnchorReport::new(shapes, &clusters.clusters)?;
    Ok((clusters, report))
}

fn print_anchors(report: &AnchorReport, input_size: Option<NonZeroUsize>) {
    let mut table = Table::new();
    table.add_row(row!["index", "width", "height", "ratio"]);

    report.anchors.iter().enumerate().for_each(|(index, anchor)| {
        table.add_row(row![
            index,
            format!("{:.4}", anchor.w),
            format!("{:.4}", anchor.h),
            format!("{:.2}", anchor.ratio)
        ]);
    });

    table.printstd();
    println!("Accuracy: {:.2}%", report.avg_iou * 100.0);

    if let Some(input_size) = input_size {
        let size = input_size.get();
        let anchors = report.darknet_anchors(&HW::from_wh([size, size]));
        println!("anchors = {}", anchors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fit_each_k_continues_after_failure() {
        let shapes = Arc::new(vec![
            HW::from_wh([0.1, 0.1]),
            HW::from_wh([0.5, 0.5]),
            HW::from_wh([0.9, 0.9]),
        ]);

        let results = fit_each_k(shapes, 1..=5, KMeans::new().with_seed(1))
            .await
            .unwrap();

        let ks: Vec<_> = results.iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![1, 2, 3, 4, 5]);

        for (k, result) in &results[..3] {
            let (clusters, report) = result.as_ref().unwrap();
            assert_eq!(clusters.clusters.len(), *k);
            assert_eq!(report.anchors.len(), *k);
        }
        assert!((results[2].1.as_ref().unwrap().1.avg_iou - 1.0).abs() < 1e-12);

        for (k, result) in &results[3..] {
            assert_eq!(
                result.as_ref().unwrap_err(),
                &KMeansError::InsufficientData {
                    boxes: 3,
                    distinct: 3,
                    k: *k
                }
            );
        }
    }
}
