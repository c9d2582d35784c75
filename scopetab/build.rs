// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    table: TableLimits,
    layout: LayoutDefaults,
    trace: TraceLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct TableLimits {
    max_scope_depth: usize,
    max_entries_per_scope: usize,
    max_identifier_length: usize,
    first_label: u32,
}

#[derive(serde::Deserialize)]
struct LayoutDefaults {
    default_base_offset: i64,
    int_unit_size: i64,
    boolean_unit_size: i64,
    char_unit_size: i64,
}

#[derive(serde::Deserialize)]
struct TraceLimits {
    max_trace_file_size: u64,
    max_trace_steps: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_events_per_file: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SCOPETAB_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SCOPETAB_CONFIG_DIR");

    let profile =
        env::var("SCOPETAB_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SCOPETAB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Config profiles live at the workspace root (parent of the crate directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_SCOPE_DEPTH: usize = 4_096;
    const ABSOLUTE_MAX_TRACE_FILE_SIZE: u64 = 100_000_000;

    if config.table.max_scope_depth == 0 || config.table.max_scope_depth > ABSOLUTE_MAX_SCOPE_DEPTH
    {
        panic!("LIMITS: max_scope_depth must be in 1..={}", ABSOLUTE_MAX_SCOPE_DEPTH);
    }

    if config.table.max_entries_per_scope == 0 {
        panic!("LIMITS: max_entries_per_scope must be positive");
    }

    if config.table.max_identifier_length == 0 {
        panic!("LIMITS: max_identifier_length must be positive");
    }

    if config.layout.int_unit_size <= 0
        || config.layout.boolean_unit_size <= 0
        || config.layout.char_unit_size <= 0
    {
        panic!("LAYOUT: scalar unit sizes must be positive");
    }

    if config.trace.max_trace_file_size > ABSOLUTE_MAX_TRACE_FILE_SIZE {
        panic!("LIMITS: max_trace_file_size exceeds absolute maximum");
    }

    if config.logging.max_log_events_per_file > config.logging.log_buffer_size {
        panic!("LOGGING: max_log_events_per_file exceeds log_buffer_size");
    }

    if profile == "production" && config.table.max_scope_depth > 1_024 {
        panic!("PRODUCTION: max_scope_depth too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod table {{
        pub const MAX_SCOPE_DEPTH: usize = {};
        pub const MAX_ENTRIES_PER_SCOPE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const FIRST_LABEL: u32 = {};
    }}

    pub mod layout {{
        pub const DEFAULT_BASE_OFFSET: i64 = {};
        pub const INT_UNIT_SIZE: i64 = {};
        pub const BOOLEAN_UNIT_SIZE: i64 = {};
        pub const CHAR_UNIT_SIZE: i64 = {};
    }}

    pub mod trace {{
        pub const MAX_TRACE_FILE_SIZE: u64 = {};
        pub const MAX_TRACE_STEPS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        // Table
        config.table.max_scope_depth,
        config.table.max_entries_per_scope,
        config.table.max_identifier_length,
        config.table.first_label,
        // Layout
        config.layout.default_base_offset,
        config.layout.int_unit_size,
        config.layout.boolean_unit_size,
        config.layout.char_unit_size,
        // Trace
        config.trace.max_trace_file_size,
        config.trace.max_trace_steps,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_events_per_file,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
