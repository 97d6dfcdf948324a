// ============================================================
// Layer 6 — Classification Metrics
// ============================================================
// Per-class precision / recall / F1, their support-weighted
// average, and a fixed-width text report.
//
// Conventions (the same as scikit-learn's):
//   - the classes scored are the union of labels appearing in
//     y_true and y_pred, in ascending order
//   - support = number of occurrences in y_true
//   - a 0/0 precision, recall or F1 is reported as 0.0
//   - weighted average = Σ metric_c · support_c / Σ support_c
//
// The argument order matters: swapping y_true and y_pred
// changes the supports and therefore the weighted F1.
//
// Report layout (digits = 3):
//
//                 precision    recall  f1-score   support
//
//              0      0.500     1.000     0.667         1
//              1      1.000     0.667     0.800         3
//
//       accuracy                          0.750         4
//      macro avg      0.750     0.833     0.733         4
//   weighted avg      0.875     0.750     0.767         4

use std::collections::BTreeSet;

use anyhow::{ensure, Result};

/// Scores for one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub label: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged scores over all classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Everything needed for a classification report.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassScores>,
    pub accuracy: f64,
    pub macro_avg: AverageScores,
    pub weighted_avg: AverageScores,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn harmonic(p: f64, r: f64) -> f64 {
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Per-class scores for every label present in either vector.
pub fn class_scores(y_true: &[u8], y_pred: &[u8]) -> Result<Vec<ClassScores>> {
    ensure!(
        y_true.len() == y_pred.len(),
        "y_true has {} labels but y_pred has {}",
        y_true.len(),
        y_pred.len()
    );

    let labels: BTreeSet<u8> = y_true.iter().chain(y_pred).copied().collect();

    Ok(labels
        .into_iter()
        .map(|label| {
            let mut tp = 0usize;
            let mut predicted = 0usize;
            let mut support = 0usize;
            for (&t, &p) in y_true.iter().zip(y_pred) {
                if p == label {
                    predicted += 1;
                }
                if t == label {
                    support += 1;
                    if p == label {
                        tp += 1;
                    }
                }
            }
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            ClassScores {
                label,
                precision,
                recall,
                f1: harmonic(precision, recall),
                support,
            }
        })
        .collect())
}

fn weighted(classes: &[ClassScores]) -> AverageScores {
    let total: usize = classes.iter().map(|c| c.support).sum();
    let avg = |f: fn(&ClassScores) -> f64| {
        if total == 0 {
            0.0
        } else {
            classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
        }
    };
    AverageScores {
        precision: avg(|c| c.precision),
        recall: avg(|c| c.recall),
        f1: avg(|c| c.f1),
        support: total,
    }
}

fn macro_avg(classes: &[ClassScores]) -> AverageScores {
    let n = classes.len();
    let avg = |f: fn(&ClassScores) -> f64| {
        if n == 0 {
            0.0
        } else {
            classes.iter().map(f).sum::<f64>() / n as f64
        }
    };
    AverageScores {
        precision: avg(|c| c.precision),
        recall: avg(|c| c.recall),
        f1: avg(|c| c.f1),
        support: classes.iter().map(|c| c.support).sum(),
    }
}

/// Support-weighted mean F1 over all classes.
pub fn weighted_f1(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    Ok(weighted(&class_scores(y_true, y_pred)?).f1)
}

pub fn classification_report(y_true: &[u8], y_pred: &[u8]) -> Result<ClassificationReport> {
    let classes = class_scores(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();

    Ok(ClassificationReport {
        accuracy: ratio(correct, y_true.len()),
        macro_avg: macro_avg(&classes),
        weighted_avg: weighted(&classes),
        classes,
    })
}

impl ClassificationReport {
    /// Render with `digits` decimal places.
    pub fn render(&self, digits: usize) -> String {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.to_string().len())
            .chain(["weighted avg".len(), digits])
            .max()
            .unwrap_or(0);

        let mut out = format!(
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
            "", "precision", "recall", "f1-score", "support"
        );

        let row = |name: &str, p: f64, r: f64, f: f64, s: usize| {
            format!("{name:>width$}  {p:>9.digits$} {r:>9.digits$} {f:>9.digits$} {s:>9}\n")
        };

        for c in &self.classes {
            out.push_str(&row(&c.label.to_string(), c.precision, c.recall, c.f1, c.support));
        }
        out.push('\n');

        out.push_str(&format!(
            "{:>width$}  {:>9} {:>9} {:>9.digits$} {:>9}\n",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        ));
        let m = &self.macro_avg;
        out.push_str(&row("macro avg", m.precision, m.recall, m.f1, m.support));
        let w = &self.weighted_avg;
        out.push_str(&row("weighted avg", w.precision, w.recall, w.f1, w.support));
        out
    }
}
