//! Offline accuracy check against a running service.
//!
//! Images are discovered either in a labeled `<root>/Cat`, `<root>/Dog`
//! layout or in a flat directory with an optional `filename,label` CSV.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use inferences::Label;
use log::{debug, warn};
use serde::{Serialize, Serializer};

use crate::models::PredictResponse;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Clone, PartialEq)]
pub struct EvalSample {
    pub path: PathBuf,
    pub true_label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalRow {
    pub file: String,
    pub true_label: Option<Label>,
    pub pred_label: Label,
    pub confidence: f64,
    #[serde(serialize_with = "capitalized_bool")]
    pub correct: Option<bool>,
}

/// Report column written as `True`/`False`, empty when unlabeled.
fn capitalized_bool<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(true) => serializer.serialize_str("True"),
        Some(false) => serializer.serialize_str("False"),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub labeled: usize,
    pub correct: usize,
}

impl Summary {
    /// `None` when no image carried a ground-truth label.
    pub fn accuracy(&self) -> Option<f64> {
        (self.labeled > 0).then(|| self.correct as f64 / self.labeled as f64)
    }
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn list_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_image(p))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads a `filename,label` CSV with a header row.
pub fn read_label_map(path: &Path) -> anyhow::Result<HashMap<String, Label>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open label file {}", path.display()))?;

    let mut labels = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let (Some(name), Some(label)) = (record.get(0), record.get(1)) else {
            warn!("Skipping short label row {:?}", record);
            continue;
        };
        match label.parse::<Label>() {
            Ok(label) => {
                labels.insert(name.to_string(), label);
            }
            Err(e) => warn!("Skipping {}: {}", name, e),
        }
    }
    Ok(labels)
}

pub fn discover_samples(root: &Path, labels: Option<&Path>) -> anyhow::Result<Vec<EvalSample>> {
    let mut samples = Vec::new();
    for label in [Label::Cat, Label::Dog] {
        let dir = root.join(label.as_str());
        if dir.is_dir() {
            samples.extend(list_images(&dir)?.into_iter().map(|path| EvalSample {
                path,
                true_label: Some(label),
            }));
        }
    }
    if !samples.is_empty() {
        return Ok(samples);
    }

    let label_map = labels.map(read_label_map).transpose()?.unwrap_or_default();
    Ok(list_images(root)?
        .into_iter()
        .map(|path| {
            let true_label = label_map.get(&file_name(&path)).copied();
            EvalSample { path, true_label }
        })
        .collect())
}

/// Classifies every sample with `predict`, stopping at the first failure.
pub fn run_evaluation<F>(
    samples: &[EvalSample],
    mut predict: F,
) -> anyhow::Result<(Vec<EvalRow>, Summary)>
where
    F: FnMut(&Path) -> anyhow::Result<PredictResponse>,
{
    let mut rows = Vec::with_capacity(samples.len());
    let mut summary = Summary::default();

    for sample in samples {
        let response = predict(&sample.path)
            .with_context(|| format!("prediction failed for {}", sample.path.display()))?;
        let correct = sample.true_label.map(|t| t == response.prediction);
        debug!(
            "{} -> {} ({})",
            sample.path.display(),
            response.prediction,
            response.confidence
        );

        summary.total += 1;
        if let Some(ok) = correct {
            summary.labeled += 1;
            summary.correct += usize::from(ok);
        }
        rows.push(EvalRow {
            file: file_name(&sample.path),
            true_label: sample.true_label,
            pred_label: response.prediction,
            confidence: response.confidence,
            correct,
        });
    }

    Ok((rows, summary))
}

pub fn write_results(path: &Path, rows: &[EvalRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(["file", "true_label", "pred_label", "confidence", "correct"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Blocking client for a deployed `/predict` endpoint.
pub struct PredictClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PredictClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn predict(&self, path: &Path) -> anyhow::Result<PredictResponse> {
        let form = reqwest::blocking::multipart::Form::new().file("file", path)?;
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    fn response(prediction: Label, confidence: f64) -> PredictResponse {
        PredictResponse {
            filename: String::new(),
            prediction,
            confidence,
        }
    }

    #[test]
    fn labeled_layout() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("Cat/b.jpg"));
        touch(&dir.path().join("Cat/a.PNG"));
        touch(&dir.path().join("Cat/notes.txt"));
        touch(&dir.path().join("Dog/c.jpeg"));

        let samples = discover_samples(dir.path(), None).unwrap();
        let names: Vec<_> = samples
            .iter()
            .map(|s| (file_name(&s.path), s.true_label))
            .collect();
        assert_eq!(
            names,
            vec![
                ("a.PNG".to_string(), Some(Label::Cat)),
                ("b.jpg".to_string(), Some(Label::Cat)),
                ("c.jpeg".to_string(), Some(Label::Dog)),
            ]
        );
    }

    #[test]
    fn flat_layout_with_label_csv() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("images/1.jpg"));
        touch(&dir.path().join("images/2.jpg"));
        touch(&dir.path().join("images/3.png"));
        let csv_path = dir.path().join("labels.csv");
        fs::write(&csv_path, "filename,label\n1.jpg,Cat\n2.jpg, dog\n3.png,hamster\n").unwrap();

        let samples = discover_samples(&dir.path().join("images"), Some(&csv_path)).unwrap();
        let labels: Vec<_> = samples.iter().map(|s| s.true_label).collect();
        assert_eq!(labels, vec![Some(Label::Cat), Some(Label::Dog), None]);
    }

    #[test]
    fn short_label_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("labels.csv");
        fs::write(&csv_path, "filename,label\n1.jpg,Cat\n2.jpg\n3.jpg,Dog\n").unwrap();

        let labels = read_label_map(&csv_path).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("1.jpg"), Some(&Label::Cat));
        assert_eq!(labels.get("2.jpg"), None);
        assert_eq!(labels.get("3.jpg"), Some(&Label::Dog));
    }

    #[test]
    fn flat_layout_without_labels() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("x.jpg"));

        let samples = discover_samples(dir.path(), None).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].true_label, None);
    }

    #[test]
    fn accuracy_counts_only_labeled() {
        let samples = vec![
            EvalSample { path: "a.jpg".into(), true_label: Some(Label::Cat) },
            EvalSample { path: "b.jpg".into(), true_label: Some(Label::Dog) },
            EvalSample { path: "c.jpg".into(), true_label: None },
        ];

        let (rows, summary) =
            run_evaluation(&samples, |_| Ok(response(Label::Cat, 0.75))).unwrap();

        assert_eq!(summary, Summary { total: 3, labeled: 2, correct: 1 });
        assert_eq!(summary.accuracy(), Some(0.5));
        assert_eq!(rows[0].correct, Some(true));
        assert_eq!(rows[1].correct, Some(false));
        assert_eq!(rows[2].correct, None);
    }

    #[test]
    fn no_labels_means_no_accuracy() {
        assert_eq!(Summary { total: 4, labeled: 0, correct: 0 }.accuracy(), None);
    }

    #[test]
    fn first_failure_aborts() {
        let samples = vec![EvalSample { path: "a.jpg".into(), true_label: None }];
        let result = run_evaluation(&samples, |_| anyhow::bail!("HTTP 500"));
        assert!(result.is_err());
    }

    #[test]
    fn results_csv_columns() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("eval_results.csv");
        let rows = vec![
            EvalRow {
                file: "a.jpg".into(),
                true_label: Some(Label::Dog),
                pred_label: Label::Dog,
                confidence: 0.9123,
                correct: Some(true),
            },
            EvalRow {
                file: "b.jpg".into(),
                true_label: None,
                pred_label: Label::Cat,
                confidence: 0.6,
                correct: None,
            },
            EvalRow {
                file: "c.jpg".into(),
                true_label: Some(Label::Cat),
                pred_label: Label::Dog,
                confidence: 0.55,
                correct: Some(false),
            },
        ];

        write_results(&out, &rows).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "file,true_label,pred_label,confidence,correct\na.jpg,Dog,Dog,0.9123,True\nb.jpg,,Cat,0.6,\nc.jpg,Cat,Dog,0.55,False\n"
        );
    }
}
