use subc_lexer::config::runtime::RuntimeConfig;
use subc_lexer::file_processor::{self, FileProcessingResult, FileProcessor};
use subc_lexer::lexical::{self, LexicalAnalyzer};
use subc_lexer::tokens::{SourceMap, TokenStream};
use subc_lexer::{batch, logging};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Options for a single-source run, plus the batch configuration
#[derive(Debug)]
struct CliOptions {
    output: Option<PathBuf>,
    errors: Option<PathBuf>,
    json: bool,
    strict: bool,
    log_file: Option<PathBuf>,
    batch: batch::BatchConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.sc|-|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let runtime = RuntimeConfig::default();
    let options = parse_options(&args[2..], &runtime);

    logging::init_global_logging(runtime.logging.clone(), options.log_file.as_deref())?;
    file_processor::init_file_processor_logging()?;
    lexical::init_lexical_analysis_logging()?;
    lexical::validate_tokenization()?;

    let input = args[1].as_str();
    let input_path = Path::new(input);

    let exit_code = if input == "-" {
        let file_result = file_processor::process_stdin()?;
        lex_source(&file_result, &options, &runtime)?
    } else if input_path.is_file() {
        let processor = FileProcessor::from_preferences(&runtime.file_processor);
        match processor.process_file(input) {
            Ok(file_result) => lex_source(&file_result, &options, &runtime)?,
            Err(error) => {
                eprintln!("error[{}]: {}", error.error_code(), error);
                logging::print_cargo_style_summary();
                1
            }
        }
    } else if input_path.is_dir() {
        process_directory_batch(input_path, &options)
    } else {
        eprintln!("Error: Input must be a source file, '-' for stdin, or a directory");
        eprintln!("  Path: {}", input_path.display());
        1
    };

    std::process::exit(exit_code);
}

fn print_help(program_name: &str) {
    println!("Sub-C lexer v{}", env!("CARGO_PKG_VERSION"));
    println!("Error-tolerant lexical analysis with batch processing");
    println!();
    println!("USAGE:");
    println!("    {} <input.sc> [options]       # Lex one file", program_name);
    println!("    {} - [options]                # Lex standard input", program_name);
    println!("    {} <directory> [options]      # Lex every source file", program_name);
    println!();
    println!("SINGLE SOURCE OPTIONS:");
    println!("    --output FILE       Write the token listing to FILE instead of stdout");
    println!("    --errors FILE       Write error-token diagnostics to FILE");
    println!("    --json              Emit tokens as JSON records");
    println!("    --strict            Exit non-zero when any error token is produced");
    println!();
    println!("BATCH OPTIONS:");
    println!("    --sequential        Force sequential processing (no parallelism)");
    println!("    --threads N         Set maximum number of worker threads");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop on first failed file");
    println!("    --write             Write <file>.tokens next to each source");
    println!("    --progress          Report each file on stderr");
    println!();
    println!("LOGGING:");
    println!("    --log-file FILE     Append log events to FILE");
    println!("    SUBC_LOG_CONSOLE=true, SUBC_LOG_LEVEL=debug, SUBC_LOG_STRUCTURED=true");
    println!();
    println!("OUTPUT FORMAT:");
    println!("    [@index,start:stop='text',<KIND>,line:column]");
    println!("    Offsets are character indices; stop is the last character of the token.");
    println!();
    println!("EXAMPLES:");
    println!("    {} prog.sc", program_name);
    println!("    echo 'int a = 1;' | {} -", program_name);
    println!("    {} tests/ --threads 4 --write", program_name);
    println!("    {} tests/ --sequential --strict --fail-fast", program_name);
    println!();

    let limits = lexical::get_lexical_limits();
    println!("LEXICAL LIMITS ({}):", subc_lexer::config::build_info::source_info());
    println!("    Identifier warning length: {}", limits.max_identifier_length);
    println!("    String literal warning size: {}", limits.max_string_size);
    println!("    Comment warning length: {}", limits.max_comment_length);
    println!("    Error tokens reported per file: {}", limits.max_error_tokens_reported);
    println!();

    let batch_info = batch::get_batch_info();
    println!("BATCH PROCESSING CAPABILITIES:");
    println!("    {}", batch_info.summary());
    println!(
        "    Max file size: {} bytes",
        file_processor::get_max_file_size()
    );
}

fn parse_options(args: &[String], runtime: &RuntimeConfig) -> CliOptions {
    let mut options = CliOptions {
        output: None,
        errors: None,
        json: false,
        strict: false,
        log_file: None,
        batch: batch::BatchConfig::from_runtime(runtime),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                if let Some(path) = args.get(i + 1) {
                    options.output = Some(PathBuf::from(path));
                    i += 1;
                } else {
                    eprintln!("Warning: --output requires a file path");
                }
            }
            "--errors" => {
                if let Some(path) = args.get(i + 1) {
                    options.errors = Some(PathBuf::from(path));
                    i += 1;
                } else {
                    eprintln!("Warning: --errors requires a file path");
                }
            }
            "--log-file" => {
                if let Some(path) = args.get(i + 1) {
                    options.log_file = Some(PathBuf::from(path));
                    i += 1;
                } else {
                    eprintln!("Warning: --log-file requires a file path");
                }
            }
            "--json" => {
                options.json = true;
            }
            "--strict" => {
                options.strict = true;
                options.batch.lexical.fail_on_error_tokens = true;
            }
            "--sequential" => {
                options.batch.max_threads = 1;
            }
            "--threads" => {
                if i + 1 < args.len() {
                    if let Ok(threads) = args[i + 1].parse::<usize>() {
                        options.batch.max_threads = threads.max(1);
                        options.batch.max_threads = options.batch.effective_threads();
                    } else {
                        eprintln!(
                            "Warning: Invalid thread count '{}', using default",
                            args[i + 1]
                        );
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --threads requires a number");
                }
            }
            "--no-recursive" => {
                options.batch.recursive = false;
            }
            "--max-files" => {
                if i + 1 < args.len() {
                    if let Ok(max_files) = args[i + 1].parse::<usize>() {
                        options.batch.max_files = Some(max_files);
                    } else {
                        eprintln!("Warning: Invalid max files '{}', ignoring", args[i + 1]);
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --max-files requires a number");
                }
            }
            "--fail-fast" => {
                options.batch.fail_fast = true;
            }
            "--write" => {
                options.batch.write_token_files = true;
            }
            "--progress" => {
                options.batch.progress_reporting = true;
            }
            _ => {
                eprintln!("Warning: Unknown option '{}'", args[i]);
            }
        }
        i += 1;
    }

    options
}

/// Lex one loaded source and emit its listing; returns the exit code
fn lex_source(
    file_result: &FileProcessingResult,
    options: &CliOptions,
    runtime: &RuntimeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    // Strictness only changes the exit code here, so the listing is always produced
    let mut preferences = runtime.lexical.clone();
    preferences.fail_on_error_tokens = false;

    let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
    let stream = analyzer.tokenize_file_result(file_result)?;

    let listing = format_listing(&stream, options.json)?;
    match &options.output {
        Some(path) => fs::write(path, listing)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(listing.as_bytes())?;
            handle.flush()?;
        }
    }

    if stream.has_errors() {
        let diagnostics = stream.format_errors(&SourceMap::new(&file_result.source));
        match &options.errors {
            Some(path) => fs::write(path, &diagnostics)?,
            None => eprint!("{}", diagnostics),
        }
    } else if let Some(path) = &options.errors {
        fs::write(path, "")?;
    }

    logging::print_cargo_style_summary();

    if options.strict && stream.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn format_listing(stream: &TokenStream, json: bool) -> Result<String, serde_json::Error> {
    if json {
        let mut out = serde_json::to_string_pretty(&stream.records())?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(stream.render())
    }
}

fn process_directory_batch(dir_path: &Path, options: &CliOptions) -> i32 {
    let config = &options.batch;
    println!("Starting batch lexing: {}", dir_path.display());
    println!(
        "Configuration: {} threads, recursive={}, fail_fast={}, write={}",
        config.effective_threads(),
        config.recursive,
        config.fail_fast,
        config.write_token_files
    );

    if let Some(max_files) = config.max_files {
        println!("File limit: {} files maximum", max_files);
    }

    match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => {
            print_batch_results(&results);
            logging::print_cargo_style_summary();

            let strict_failure = options.strict && results.total_error_tokens() > 0;
            if results.failure_count() > 0 || strict_failure {
                1
            } else {
                0
            }
        }
        Err(error) => {
            eprintln!("Batch processing failed: {}", error);
            logging::print_cargo_style_summary();
            1
        }
    }
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("\nBatch Lexing Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!(
        "  Successful: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    println!(
        "  Tokens: {} ({} error tokens in {} files)",
        results.total_tokens(),
        results.total_error_tokens(),
        results.files_with_error_tokens()
    );
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    let seconds = results.processing_duration.as_secs_f64();
    if seconds > 0.0 {
        let total_chars: usize = results
            .successful_files
            .iter()
            .map(|(_, summary)| summary.char_count)
            .sum();
        println!(
            "  Processing rate: {:.0} chars/sec, {:.0} tokens/sec",
            total_chars as f64 / seconds,
            results.total_tokens() as f64 / seconds
        );
    }

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!(
                "  {}: [{}] {}",
                file_path.display(),
                error.error_code(),
                error
            );
        }
    }

    let shown = if results.success_count() <= 10 { 10 } else { 5 };
    if results.success_count() > 0 {
        println!("\nLexed Files:");
        for (file_path, summary) in results.successful_files.iter().take(shown) {
            let written = summary
                .tokens_path
                .as_ref()
                .map(|p| format!(" -> {}", p.display()))
                .unwrap_or_default();
            println!(
                "  {}: {} tokens, {} error tokens{}",
                file_path.display(),
                summary.token_count,
                summary.error_tokens,
                written
            );
        }
        if results.success_count() > shown {
            println!("  ... and {} more", results.success_count() - shown);
        }
    }
}
