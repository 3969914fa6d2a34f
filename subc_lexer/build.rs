// Generates `config::compile_time` from config/<profile>.toml at the workspace root.
use serde::Deserialize;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Profile {
    file_processing: FileProcessing,
    lexical: Lexical,
    batch_processing: BatchProcessing,
    logging: Logging,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileProcessing {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count_for_analysis: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Lexical {
    max_identifier_length: usize,
    max_string_size: usize,
    max_comment_length: usize,
    max_error_tokens_reported: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchProcessing {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Logging {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

/// Accumulates `pub mod name { pub const ...; }` blocks
struct ModuleWriter {
    out: String,
}

impl ModuleWriter {
    fn module(&mut self, name: &str, constants: &[(&str, &str, String)]) {
        let _ = writeln!(self.out, "    pub mod {} {{", name);
        for (constant, ty, value) in constants {
            let _ = writeln!(self.out, "        pub const {}: {} = {};", constant, ty, value);
        }
        let _ = writeln!(self.out, "    }}");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SUBC_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SUBC_CONFIG_DIR");

    let profile_name = env::var("SUBC_BUILD_PROFILE").unwrap_or_else(|_| "development".into());
    let path = profile_path(&profile_name);
    println!("cargo:rerun-if-changed={}", path.display());

    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read build profile {}: {}", path.display(), e));
    let profile: Profile = toml::from_str(&text)
        .unwrap_or_else(|e| panic!("invalid build profile {}: {}", path.display(), e));

    if let Err(problem) = check(&profile, &profile_name) {
        panic!("build profile {}: {}", path.display(), problem);
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("constants.rs"), render(&profile, &profile_name))
        .expect("cannot write generated constants");
}

fn profile_path(profile_name: &str) -> PathBuf {
    let config_dir = env::var("SUBC_CONFIG_DIR").unwrap_or_else(|_| "config".into());
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("crate lives inside the workspace");
    workspace_root
        .join(config_dir)
        .join(format!("{}.toml", profile_name))
}

fn check(profile: &Profile, profile_name: &str) -> Result<(), String> {
    let files = &profile.file_processing;
    if files.max_file_size == 0 || files.max_file_size > 1_000_000_000 {
        return Err("max_file_size must be in 1..=1000000000".into());
    }
    if files.large_file_threshold > files.max_file_size {
        return Err("large_file_threshold exceeds max_file_size".into());
    }
    if profile_name == "production" && files.max_file_size > 50_000_000 {
        return Err("production max_file_size is capped at 50000000".into());
    }

    let threads = profile.batch_processing.max_worker_threads;
    if !(1..=256).contains(&threads) {
        return Err(format!("max_worker_threads {} outside 1..=256", threads));
    }
    if profile.batch_processing.max_files_per_batch == 0 {
        return Err("max_files_per_batch must be positive".into());
    }

    if profile.lexical.max_identifier_length == 0 {
        return Err("max_identifier_length must be positive".into());
    }

    if profile.logging.security_min_log_level > 2 {
        return Err("security_min_log_level must be 0, 1 or 2".into());
    }
    Ok(())
}

fn render(profile: &Profile, profile_name: &str) -> String {
    let mut writer = ModuleWriter {
        out: format!(
            "// Generated by build.rs from the `{}` profile.\n\npub mod compile_time {{\n",
            profile_name
        ),
    };

    let files = &profile.file_processing;
    writer.module(
        "file_processing",
        &[
            ("MAX_FILE_SIZE", "u64", files.max_file_size.to_string()),
            ("LARGE_FILE_THRESHOLD", "u64", files.large_file_threshold.to_string()),
            (
                "MAX_LINE_COUNT_FOR_ANALYSIS",
                "usize",
                files.max_line_count_for_analysis.to_string(),
            ),
        ],
    );

    let lexical = &profile.lexical;
    writer.module(
        "lexical",
        &[
            ("MAX_IDENTIFIER_LENGTH", "usize", lexical.max_identifier_length.to_string()),
            ("MAX_STRING_SIZE", "usize", lexical.max_string_size.to_string()),
            ("MAX_COMMENT_LENGTH", "usize", lexical.max_comment_length.to_string()),
            (
                "MAX_ERROR_TOKENS_REPORTED",
                "usize",
                lexical.max_error_tokens_reported.to_string(),
            ),
        ],
    );

    let batch = &profile.batch_processing;
    writer.module(
        "batch_processing",
        &[
            ("MAX_WORKER_THREADS", "usize", batch.max_worker_threads.to_string()),
            ("MAX_FILES_PER_BATCH", "usize", batch.max_files_per_batch.to_string()),
        ],
    );

    let logging = &profile.logging;
    writer.module(
        "logging",
        &[
            ("LOG_BUFFER_SIZE", "usize", logging.log_buffer_size.to_string()),
            ("MAX_LOG_MESSAGE_LENGTH", "usize", logging.max_log_message_length.to_string()),
            ("MAX_LOG_EVENTS_PER_FILE", "usize", logging.max_log_events_per_file.to_string()),
            ("SECURITY_MIN_LOG_LEVEL", "u8", logging.security_min_log_level.to_string()),
        ],
    );

    writer.out.push_str("}\n");
    writer.out
}
