//! Batch lexing of Sub-C source directories
//!
//! Sources are discovered in sorted order and lexed either on the calling
//! thread or on scoped workers, each owning a contiguous slice. Workers share
//! one read-only `Lexicon`; every file gets its own scanner and runs inside a
//! logging file context so its diagnostics land in the collector.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::{FileProcessorPreferences, LexicalPreferences, RuntimeConfig};
use crate::file_processor::{has_source_extension, FileProcessor, FileProcessorError};
use crate::grammar::Lexicon;
use crate::lexical::{LexerError, LexicalAnalyzer};
use crate::logging::{self, codes};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    /// Write `<file>.tokens` with the rendered stream next to each source
    pub write_token_files: bool,
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
                .min(MAX_WORKER_THREADS),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
            write_token_files: false,
            file_processor: FileProcessorPreferences::default(),
            lexical: LexicalPreferences::default(),
        }
    }
}

impl BatchConfig {
    /// Build from runtime preferences; thread count is capped at the compile-time maximum
    pub fn from_runtime(runtime: &RuntimeConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_threads: runtime
                .batch
                .worker_threads
                .unwrap_or(defaults.max_threads)
                .clamp(1, MAX_WORKER_THREADS),
            write_token_files: runtime.batch.write_token_files,
            file_processor: runtime.file_processor.clone(),
            lexical: runtime.lexical.clone(),
            ..defaults
        }
    }

    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

/// Outcome of lexing one file
#[derive(Debug, Clone)]
pub struct FileLexSummary {
    /// Tokens including end-of-input
    pub token_count: usize,
    pub error_tokens: usize,
    pub line_count: usize,
    pub char_count: usize,
    /// Where the rendered stream was written, if requested
    pub tokens_path: Option<PathBuf>,
    pub duration: Duration,
}

/// Why a single file could not be lexed
#[derive(Debug, thiserror::Error)]
pub enum FileLexError {
    #[error(transparent)]
    FileProcessing(#[from] FileProcessorError),

    #[error(transparent)]
    Lexical(#[from] LexerError),

    #[error("Failed to write token file {path}: {message}")]
    OutputWrite { path: String, message: String },
}

impl FileLexError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileLexError::FileProcessing(e) => e.error_code(),
            FileLexError::Lexical(e) => e.error_code(),
            FileLexError::OutputWrite { .. } => codes::file_processing::IO_ERROR,
        }
    }
}

/// Per-file outcomes in discovery order
#[derive(Debug)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, FileLexSummary)>,
    pub failed_files: Vec<(PathBuf, FileLexError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            successful_files: Vec::new(),
            failed_files: Vec::new(),
            processing_duration: Duration::new(0, 0),
            files_processed: 0,
            files_discovered: 0,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn total_tokens(&self) -> usize {
        self.successful_files.iter().map(|(_, s)| s.token_count).sum()
    }

    pub fn total_error_tokens(&self) -> usize {
        self.successful_files.iter().map(|(_, s)| s.error_tokens).sum()
    }

    /// Files that lexed but produced at least one error token
    pub fn files_with_error_tokens(&self) -> usize {
        self.successful_files
            .iter()
            .filter(|(_, s)| s.error_tokens > 0)
            .count()
    }

    pub fn add_success(&mut self, file_path: PathBuf, summary: FileLexSummary) {
        self.successful_files.push((file_path, summary));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: FileLexError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch lexing completed: {} files processed, {} successful ({:.1}%), {} failed, {} tokens ({} error tokens), {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.total_tokens(),
            self.total_error_tokens(),
            self.processing_duration.as_secs_f64()
        )
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

/// Failures that abort a whole batch
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No Sub-C source files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread failed: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::batch::NO_SOURCE_FILES,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::WorkerFailure { .. } => codes::batch::WORKER_FAILURE,
        }
    }

    fn logged(self) -> Self {
        crate::log_error!(self.error_code(), &self.to_string());
        self
    }
}

/// Discover Sub-C source files in a directory, sorted by path
pub fn discover_source_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        }
        .logged());
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config.recursive)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        }
        .logged());
    }

    if files.len() > MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        }
        .logged());
    }

    files.sort();

    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            crate::log_warning!(
                codes::batch::TOO_MANY_FILES,
                "Reached maximum file limit, remaining files skipped",
                "files_found" => files.len(),
                "limit" => max_files
            );
            files.truncate(max_files);
        }
    }

    crate::log_info!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    recursive: bool,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;

        let path = entry.path();

        if path.is_dir() {
            if recursive {
                visit_directory(&path, files, recursive)?;
            }
        } else if is_source_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_source_file(path: &Path) -> bool {
    path.is_file() && has_source_extension(path)
}

/// `<file>.tokens` beside the source
pub fn tokens_path_for(file_path: &Path) -> PathBuf {
    let mut name = OsString::from(file_path.as_os_str());
    name.push(".tokens");
    PathBuf::from(name)
}

/// Load, lex and optionally write the rendered stream for one file
pub fn lex_single_file(
    file_path: &Path,
    config: &BatchConfig,
    lexicon: &Arc<Lexicon>,
) -> Result<FileLexSummary, FileLexError> {
    let start_time = Instant::now();
    let path_str = file_path.display().to_string();

    let file_result =
        FileProcessor::from_preferences(&config.file_processor).process_file(&path_str)?;

    let mut analyzer = LexicalAnalyzer::with_lexicon(Arc::clone(lexicon));
    analyzer.set_preferences(config.lexical.clone());
    let stream = analyzer.tokenize_file_result(&file_result)?;

    let tokens_path = if config.write_token_files {
        let target = tokens_path_for(file_path);
        fs::write(&target, stream.render()).map_err(|e| FileLexError::OutputWrite {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;
        Some(target)
    } else {
        None
    };

    Ok(FileLexSummary {
        token_count: stream.len(),
        error_tokens: stream.error_count(),
        line_count: file_result.metadata.line_count,
        char_count: file_result.char_count(),
        tokens_path,
        duration: start_time.elapsed(),
    })
}

/// Lex one file under its logging context and fold the outcome into `results`
fn lex_and_record(
    results: &mut BatchResults,
    file_path: &Path,
    file_id: usize,
    config: &BatchConfig,
    lexicon: &Arc<Lexicon>,
) -> bool {
    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        let outcome = lex_single_file(file_path, config, lexicon);
        record_outcome(results, file_path, outcome)
    })
}

fn record_outcome(
    results: &mut BatchResults,
    file_path: &Path,
    outcome: Result<FileLexSummary, FileLexError>,
) -> bool {
    match outcome {
        Ok(summary) => {
            crate::log_debug!("File lexed",
                "tokens" => summary.token_count,
                "error_tokens" => summary.error_tokens
            );
            results.add_success(file_path.to_path_buf(), summary);
            true
        }
        Err(error) => {
            crate::log_error!(error.error_code(), "File lexing failed", "reason" => &error);
            results.add_failure(file_path.to_path_buf(), error);
            false
        }
    }
}

/// Lex every source under `dir_path`, on worker threads when more than one is allowed
pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    run_batch(dir_path, config, config.effective_threads())
}

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    run_batch(dir_path, config, 1)
}

/// Results come back in discovery order regardless of thread count.
pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    run_batch(dir_path, config, config.effective_threads().max(2))
}

fn run_batch(
    dir_path: &Path,
    config: &BatchConfig,
    threads: usize,
) -> Result<BatchResults, BatchError> {
    let started = Instant::now();
    crate::log_info!("Batch lexing started",
        "directory" => dir_path.display(),
        "threads" => threads
    );

    let files = discover_source_files(dir_path, config)?;
    let lexicon = Lexicon::shared();

    let mut results = if threads <= 1 || files.len() == 1 {
        lex_in_order(&files, 0, files.len(), config, &lexicon)
    } else {
        lex_on_workers(&files, config, &lexicon, threads)?
    };
    results.files_discovered = files.len();
    results.processing_duration = started.elapsed();

    log_batch_complete(&results, threads);
    Ok(results)
}

/// Lex `files` on the current thread. `first_id` is the batch-wide id of
/// `files[0]`; with fail-fast the run stops at the first failure.
fn lex_in_order(
    files: &[PathBuf],
    first_id: usize,
    total: usize,
    config: &BatchConfig,
    lexicon: &Arc<Lexicon>,
) -> BatchResults {
    let mut results = BatchResults::new();
    for (offset, file_path) in files.iter().enumerate() {
        let file_id = first_id + offset;
        if config.progress_reporting {
            eprintln!("[{}/{}] {}", file_id + 1, total, file_path.display());
        }

        if !lex_and_record(&mut results, file_path, file_id, config, lexicon) && config.fail_fast {
            crate::log_info!("Stopping after first failure", "remaining" => files.len() - offset - 1);
            break;
        }
    }
    results
}

/// Give each worker one contiguous slice of `files` and merge the slices
/// back in worker order.
fn lex_on_workers(
    files: &[PathBuf],
    config: &BatchConfig,
    lexicon: &Arc<Lexicon>,
    threads: usize,
) -> Result<BatchResults, BatchError> {
    let per_worker = files.len().div_ceil(threads).max(1);
    crate::log_debug!("Spawning lexer workers",
        "files" => files.len(),
        "workers" => files.len().div_ceil(per_worker),
        "files_per_worker" => per_worker
    );

    thread::scope(|scope| -> Result<BatchResults, BatchError> {
        let workers = files
            .chunks(per_worker)
            .enumerate()
            .map(|(worker, slice)| {
                thread::Builder::new()
                    .name(format!("subc-lex-{}", worker))
                    .spawn_scoped(scope, move || {
                        lex_in_order(slice, worker * per_worker, files.len(), config, lexicon)
                    })
                    .map_err(|e| {
                        BatchError::WorkerFailure {
                            message: format!("cannot spawn worker {}: {}", worker, e),
                        }
                        .logged()
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = BatchResults::new();
        for worker in workers {
            let slice_results = worker.join().map_err(|_| {
                BatchError::WorkerFailure {
                    message: "worker thread panicked during lexing".to_string(),
                }
                .logged()
            })?;
            results.merge(slice_results);
        }
        Ok(results)
    })
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_PROCESSING_COMPLETE,
        "Batch lexing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "tokens" => results.total_tokens(),
        "error_tokens" => results.total_error_tokens(),
        "threads" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

/// Limits and defaults shown in `--help`
#[derive(Debug, Clone)]
pub struct BatchInfo {
    pub max_recommended_threads: usize,
    pub max_worker_threads: usize,
    pub max_files_per_batch: usize,
    pub supported_file_extensions: Vec<String>,
}

impl BatchInfo {
    pub fn summary(&self) -> String {
        format!(
            "Batch lexer: {} threads (max {}), up to {} files, extensions: {}",
            self.max_recommended_threads,
            self.max_worker_threads,
            self.max_files_per_batch,
            self.supported_file_extensions.join(", ")
        )
    }
}

pub fn get_batch_info() -> BatchInfo {
    BatchInfo {
        max_recommended_threads: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(MAX_WORKER_THREADS),
        max_worker_threads: MAX_WORKER_THREADS,
        max_files_per_batch: MAX_FILES_PER_BATCH,
        supported_file_extensions: crate::file_processor::SOURCE_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
    }
}
