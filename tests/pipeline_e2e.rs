//! End-to-end generate -> merge -> import against the in-memory sink.

use bulk_sink::{MemorySink, ProcedureSink, ProcedureValue, ROW_STATS_PROCEDURE};
use chrono::NaiveDate;
use datafile_pipeline::{ImportSettings, Pipeline, PipelineConfig, RunStatus};
use line_merge::MergeJob;
use pipeline_core::{list_data_files, parse_line, ChannelProgress, NoopProgress, ProgressEvent};
use populate_files::GenerationJob;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn config_in(dir: &TempDir, filter: &str) -> PipelineConfig {
    let data_dir = dir.path().join("GeneratedFiles");
    PipelineConfig {
        generate: GenerationJob {
            output_directory: data_dir.clone(),
            file_count: 3,
            lines_per_file: 10,
            seed: Some(42),
            workers: 2,
            today: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        },
        merge: MergeJob {
            input_directory: Some(data_dir.clone()),
            output_path: dir.path().join("Merged_file.txt"),
            filter_substring: filter.to_string(),
        },
        import: ImportSettings {
            input_directory: Some(data_dir),
            chunk_size: 4,
            workers: 2,
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_full_run_with_memory_sink() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "");
    let sink = Arc::new(MemorySink::new());

    let report = Pipeline::new(config.clone(), Arc::new(NoopProgress), CancellationToken::new())
        .run_all(Arc::clone(&sink))
        .await
        .unwrap();

    assert_eq!(report.generate.files_written, 3);
    assert_eq!(report.generate.rows_written, 30);

    assert_eq!(report.merge.files_merged, 3);
    assert_eq!(report.merge.lines_written, 30);
    assert_eq!(report.merge.lines_dropped, 0);

    assert_eq!(report.import.status, RunStatus::Completed);
    assert_eq!(report.import.files_imported, 3);
    assert_eq!(report.import.rows_imported, 30);

    let files = list_data_files(&config.generate.output_directory).unwrap();
    assert_eq!(files.len(), 3);

    // Merge with an empty filter is a plain concatenation in index order.
    let concatenated: String = files
        .iter()
        .map(|f| fs::read_to_string(&f.path).unwrap())
        .collect();
    let merged = fs::read_to_string(&config.merge.output_path).unwrap();
    assert_eq!(merged, concatenated);

    // Everything in the sink round-trips back to the generated lines.
    let mut imported: Vec<String> = sink.records().await.iter().map(|r| r.to_line()).collect();
    let mut generated: Vec<String> = merged.lines().map(str::to_string).collect();
    imported.sort();
    generated.sort();
    assert_eq!(imported, generated);

    let stats = sink.call_query(ROW_STATS_PROCEDURE).await.unwrap().unwrap();
    assert_eq!(stats.get("row_count"), Some(&ProcedureValue::Int(30)));
}

#[tokio::test]
async fn test_merge_filter_counts_dropped_lines() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "a");
    let pipeline = Pipeline::new(config.clone(), Arc::new(NoopProgress), CancellationToken::new());

    pipeline.generate().await.unwrap();
    let report = pipeline.merge().await.unwrap();

    let total: usize = list_data_files(&config.generate.output_directory)
        .unwrap()
        .iter()
        .map(|f| fs::read_to_string(&f.path).unwrap().lines().count())
        .sum();
    let matching: usize = list_data_files(&config.generate.output_directory)
        .unwrap()
        .iter()
        .map(|f| {
            fs::read_to_string(&f.path)
                .unwrap()
                .lines()
                .filter(|l| l.contains('a'))
                .count()
        })
        .sum();

    assert_eq!(report.lines_dropped, matching as u64);
    assert_eq!(report.lines_written, (total - matching) as u64);

    let merged = fs::read_to_string(&config.merge.output_path).unwrap();
    assert!(merged.lines().all(|l| !l.contains('a')));
    for line in merged.lines() {
        parse_line(line).unwrap();
    }
}

#[tokio::test]
async fn test_import_progress_per_file() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, "");
    config.import.workers = 1;
    let (progress, mut rx) = ChannelProgress::new();
    let pipeline = Pipeline::new(config, Arc::new(progress), CancellationToken::new());

    pipeline.generate().await.unwrap();
    while rx.try_recv().is_ok() {}

    pipeline.import(Arc::new(MemorySink::new())).await.unwrap();

    let mut rows_since_reset: Vec<u64> = Vec::new();
    let mut files = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            ProgressEvent::Rows { current, total, .. } => {
                assert_eq!(total, 10);
                assert!(current <= total);
                if current == 0 {
                    rows_since_reset.clear();
                } else {
                    if let Some(last) = rows_since_reset.last() {
                        assert!(current > *last);
                    }
                    rows_since_reset.push(current);
                }
            }
            ProgressEvent::Files { current, .. } => {
                if current > 0 {
                    files.push(current);
                }
            }
            ProgressEvent::Log(_) => {}
        }
    }

    assert_eq!(files, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_import_stops_on_sink_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, "");
    config.import.workers = 1;
    let pipeline = Pipeline::new(config, Arc::new(NoopProgress), CancellationToken::new());
    pipeline.generate().await.unwrap();

    let sink = Arc::new(MemorySink::new().fail_after_rows(15));
    let report = pipeline.import(Arc::clone(&sink)).await.unwrap();

    assert_eq!(report.status, RunStatus::Aborted);
    assert_eq!(report.files_imported, 1);
    assert_eq!(sink.len().await, 10);
    assert!(!report.errors.is_empty());
}

#[tokio::test]
async fn test_run_reads_generate_output_directory() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("custom-data");

    let config = PipelineConfig {
        generate: GenerationJob {
            output_directory: data_dir.clone(),
            file_count: 2,
            lines_per_file: 5,
            seed: Some(7),
            today: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        },
        merge: MergeJob {
            output_path: dir.path().join("Merged_file.txt"),
            ..Default::default()
        },
        ..Default::default()
    };
    let sink = Arc::new(MemorySink::new());

    let report = Pipeline::new(config.clone(), Arc::new(NoopProgress), CancellationToken::new())
        .run_all(Arc::clone(&sink))
        .await
        .unwrap();

    assert_eq!(report.merge.files_merged, 2);
    assert_eq!(report.merge.lines_written, 10);
    assert_eq!(report.import.status, RunStatus::Completed);
    assert_eq!(report.import.files_imported, 2);
    assert_eq!(sink.len().await, 10);

    let merged = fs::read_to_string(&config.merge.output_path).unwrap();
    assert_eq!(merged.lines().count(), 10);
    for line in merged.lines() {
        parse_line(line).unwrap();
    }
}
