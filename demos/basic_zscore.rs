//! Basic example demonstrating expression z-scoring.
//!
//! This example shows how to:
//! 1. Build a small expression matrix
//! 2. Z-score it with a batched thread count
//! 3. Handle degenerate rows
//! 4. Write the result as TSV

use cbio_zscore::prelude::*;

fn main() -> Result<()> {
    println!("=== Expression Z-Score Example ===\n");

    let mut matrix = ExpressionMatrix::from_rows(
        vec![
            vec![120.0, 0.0, 340.0, 95.0, 210.0],
            vec![15.0, 22.0, 0.0, 8.0, 31.0],
            vec![3.0, 3.0, 3.0, 3.0, 3.0], // constant: no standard deviation
            vec![1000.0, 870.0, 1320.0, 640.0, 990.0],
            vec![0.0, 3.0, 1.0, 0.0, 7.0],
        ],
        ["TP53", "EGFR", "FLAT", "GAPDH", "KRAS"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        (1..=5).map(|i| format!("BS_{:03}", i)).collect(),
    )?;

    println!("Data dimensions:");
    println!("  Genes:   {}", matrix.n_rows());
    println!("  Samples: {}", matrix.n_cols());
    println!();

    let summary = norm_zscore(&mut matrix, &ScorerConfig::new(2));
    println!(
        "Scored with {} threads: {} concurrent batches, {} rows inline",
        summary.threads, summary.concurrent_batches, summary.sequential_rows
    );

    println!("Non-finite z-scores: {}", count_non_finite(&matrix));
    let filled = fill_non_finite(&mut matrix, 0.0)?;
    println!("Replaced {} with 0", filled);
    println!();

    let mut out = Vec::new();
    matrix.write_tsv(&mut out, &TsvFormat::with_precision(4))?;
    print!("{}", String::from_utf8_lossy(&out));

    Ok(())
}
