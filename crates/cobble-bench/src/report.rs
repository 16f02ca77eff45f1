use std::path::Path;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// A metric that got slower than the baseline allows.
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub scene: String,
    pub metric: &'static str,
    pub pct_change: f64,
}

/// Load a baseline from a JSON file. Returns None if the file is missing or
/// unreadable.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            log::warn!("Ignoring malformed baseline {}: {e}", path.display());
            None
        }
    }
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

fn pct_change(current: f64, base: f64) -> Option<f64> {
    (base > 0.0).then(|| (current - base) / base * 100.0)
}

/// Compare current results against a baseline. Load time and the rebuild,
/// physics and column query means are each checked against `threshold_pct`.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<Regression> {
    let mut regressions = Vec::new();

    for result in current {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.scene_name == result.scene_name)
        else {
            continue;
        };
        let metrics = [
            ("load", result.load_ms, base.load_ms),
            ("rebuild", result.rebuild.mean_ms, base.rebuild.mean_ms),
            ("physics", result.physics.mean_ms, base.physics.mean_ms),
            ("columns", result.columns.mean_ms, base.columns.mean_ms),
        ];
        for (metric, now, then) in metrics {
            if let Some(pct) = pct_change(now, then) {
                if pct > threshold_pct {
                    regressions.push(Regression {
                        scene: result.scene_name.clone(),
                        metric,
                        pct_change: pct,
                    });
                }
            }
        }
    }

    regressions
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Blocks | Chunks | Load (ms) | Rebuild mean (ms) | Rebuild P95 (ms) | Physics mean (ms) | Physics P95 (ms) | Columns mean (ms) |\n");
    out.push_str("|-------|--------|--------|-----------|-------------------|------------------|-------------------|------------------|-------------------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            r.scene_name,
            r.block_count,
            r.chunk_count,
            r.load_ms,
            r.rebuild.mean_ms,
            r.rebuild.p95_ms,
            r.physics.mean_ms,
            r.physics.p95_ms,
            r.columns.mean_ms,
        ));
    }

    out
}

/// Format a comparison report showing regressions.
pub fn format_comparison(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!("No metric slowed down by more than {threshold_pct:.0}%.\n");
    }
    let lines: Vec<String> = regressions
        .iter()
        .map(|r| format!("  - {} {}: +{:.1}%", r.scene, r.metric, r.pct_change))
        .collect();
    format!(
        "Regressions above {threshold_pct:.0}%:\n{}\n",
        lines.join("\n")
    )
}
