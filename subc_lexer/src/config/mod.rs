//! Compile-time limits and runtime preferences
//!
//! `compile_time` is generated by build.rs from config/<profile>.toml.

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Which profile the limits were generated from
pub mod build_info {
    pub fn profile() -> &'static str {
        option_env!("SUBC_BUILD_PROFILE").unwrap_or("development")
    }

    pub fn config_dir() -> &'static str {
        option_env!("SUBC_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(
            compile_time::file_processing::LARGE_FILE_THRESHOLD
                <= compile_time::file_processing::MAX_FILE_SIZE
        );
        assert!(compile_time::lexical::MAX_IDENTIFIER_LENGTH > 0);
        assert!(compile_time::batch_processing::MAX_WORKER_THREADS > 0);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = super::build_info::source_info();
        assert!(info.contains(super::build_info::profile()));
        assert!(info.ends_with(".toml"));
    }
}
