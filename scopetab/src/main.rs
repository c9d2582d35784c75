use scopetab::config::{self, runtime::RuntimeConfig};
use scopetab::{logging, trace};
use std::env;
use std::path::Path;

struct CliOptions {
    quiet: bool,
    json_logs: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <trace.toml> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[2..]);
    let mut runtime = RuntimeConfig::default();
    if options.quiet {
        runtime.logging.enable_console_logging = false;
    }
    if options.json_logs {
        runtime.logging.use_structured_logging = true;
    }

    // Initialize global logging system
    logging::config::init_runtime_preferences(runtime.logging.clone())
        .and_then(|()| logging::init_global_logging())
        .map_err(|e| format!("[{}] {}", logging::codes::system::INITIALIZATION_FAILURE, e))?;

    let trace_path = Path::new(&args[1]);
    let report = match trace::replay_file(trace_path, &runtime) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            let code = error.error_code();
            eprintln!("  Code: {} ({})", code, logging::codes::get_description(code.as_str()));
            eprintln!("  Help: {}", logging::codes::get_action(code.as_str()));
            std::process::exit(1);
        }
    };

    println!("{}", report.format_text());

    let summary = logging::get_processing_summary();
    if summary.has_errors() || summary.total_warnings > 0 {
        println!();
        println!("{}", logging::cargo_style_summary());
    }

    if report.analysis.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        quiet: false,
        json_logs: false,
    };

    for arg in args {
        match arg.as_str() {
            "--quiet" => options.quiet = true,
            "--json-logs" => options.json_logs = true,
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
    }

    options
}

fn print_help(program_name: &str) {
    println!("scopetab v{}", env!("CARGO_PKG_VERSION"));
    println!("Replay a declaration trace through the nested-scope symbol table");
    println!();
    println!("USAGE:");
    println!("    {} <trace.toml> [options]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <trace.toml>    Declaration trace: [[step]] tables with kind = program,");
    println!("                    procedure, block, end, declare or resolve");
    println!();
    println!("OPTIONS:");
    println!("    --help          Show this help message");
    println!("    --quiet         Suppress console log output");
    println!("    --json-logs     Emit log events as JSON lines");
    println!();
    println!("OUTPUT:");
    println!("    Every closed scope with its entries, offsets and frame size");
    println!("    Cargo-style diagnostics; exit status 1 if any error was reported");
    println!();
    println!("LIMITS:");
    for line in config::limits_report().lines() {
        println!("    {}", line);
    }
}
