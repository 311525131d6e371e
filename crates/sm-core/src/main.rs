//! SentinelMask - Pre-send sensitive data guard
//!
//! The main entry point for sentinel-mask, handling:
//! - Checking a message before it is sent
//! - Settings inspection and per-category policy changes
//! - Guard log listing and clearing

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use sm_common::config::{LOG_FILE, SETTINGS_FILE};
use sm_common::{
    Category, ConfigPaths, ConfigResolver, Error as CommonError, GuardSettings, InputKind,
    MaskMode, OutputFormat, PolicyPatch, PreSendContext, RiskLevel, SendTrigger, SettingsPatch,
};
use sm_core::confirm::{AutoDecision, ConfirmationSurface, TerminalPrompt};
use sm_core::exit_codes::ExitCode;
use sm_core::gateway::{LogSink, PersistentLog, PreSendGateway, SendOutcome};
use sm_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat};
use sm_telemetry::{LogFile, LogStore, LogStoreConfig, LogStoreError};
use std::io::Read;
use std::path::PathBuf;

/// SentinelMask - Mask sensitive data before it reaches a chat assistant
#[derive(Parser)]
#[command(name = "sentinel-mask")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Override config directory (holds settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory (holds guard_logs.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the guard on a message as if it were being sent
    Check(CheckArgs),

    /// Settings management
    Config(ConfigArgs),

    /// Guard log management
    Logs(LogsArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct CheckArgs {
    /// Message text (read from --file or stdin when omitted)
    text: Option<String>,

    /// Read the message from a file
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Host the message is being sent to
    #[arg(long, default_value = "chatgpt.com")]
    site: String,

    /// How the send was triggered
    #[arg(long, default_value = "enter")]
    trigger: SendTrigger,

    /// Kind of input element the text came from
    #[arg(long, default_value = "textarea")]
    input_kind: InputKind,

    /// Treat input as still being composed by an input method
    #[arg(long)]
    composing: bool,

    /// Approve risky sends without prompting
    #[arg(long, conflicts_with = "no")]
    yes: bool,

    /// Decline risky sends without prompting
    #[arg(long)]
    no: bool,

    /// Do not write a guard log entry
    #[arg(long)]
    no_log: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective settings and where they came from
    Show,

    /// Print resolved settings and log paths
    Path,

    /// Restore default settings
    Reset,

    /// Change one category's policy
    SetPolicy {
        /// Category to change (name, phone, bank_card, email, api_key, custom)
        category: Category,

        #[arg(long)]
        enabled: Option<bool>,

        #[arg(long)]
        mask_mode: Option<MaskMode>,

        #[arg(long)]
        risk_level: Option<RiskLevel>,
    },

    /// Turn the guard on
    Enable,

    /// Turn the guard off; sends pass through unchecked
    Disable,
}

#[derive(Args, Debug)]
struct LogsArgs {
    #[command(subcommand)]
    command: LogsCommands,
}

#[derive(Subcommand, Debug)]
enum LogsCommands {
    /// List guard log entries, newest first
    List {
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete all guard log entries
    Clear,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    init_logging(&LogConfig::from_env(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format,
    ));

    let run_id = generate_run_id();
    let _span = tracing::info_span!("run", run_id = %run_id).entered();

    let exit_code = match &cli.command {
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Logs(args) => run_logs(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    tracing::debug!(exit_code = %exit_code, "done");
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

fn resolver(global: &GlobalOpts) -> ConfigResolver {
    ConfigResolver::new(ConfigPaths {
        config_dir: global.config.clone(),
        data_dir: global.data.clone(),
    })
}

/// Print a command payload to stdout in the requested format.
fn emit(global: &GlobalOpts, payload: &serde_json::Value, summary: &str) {
    match global.format {
        OutputFormat::Json => match serde_json::to_string_pretty(payload) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to render output: {}", e),
        },
        OutputFormat::Jsonl => println!("{}", payload),
        OutputFormat::Summary => println!("{}", summary),
    }
}

fn output_common_error(global: &GlobalOpts, error: &CommonError) -> ExitCode {
    let exit_code = match error {
        CommonError::InvalidConfig(_) | CommonError::NoConfigDir | CommonError::Json(_) => {
            ExitCode::ConfigError
        }
        CommonError::Io(_) => ExitCode::IoError,
    };
    output_error(
        global,
        exit_code,
        error.code(),
        &error.to_string(),
        &error.format_human(),
    )
}

fn output_log_error(global: &GlobalOpts, error: &LogStoreError) -> ExitCode {
    let code = match error {
        LogStoreError::Io(_) => 60,
        LogStoreError::Json(_) => 61,
    };
    let human = format!(
        "✗ Guard Log Error\n  Reason: {}\n  Fix: Run 'sentinel-mask logs clear' to start a new log",
        error
    );
    output_error(global, ExitCode::IoError, code, &error.to_string(), &human)
}

fn output_error(
    global: &GlobalOpts,
    exit_code: ExitCode,
    code: u32,
    message: &str,
    human: &str,
) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let response = json!({
                "status": "error",
                "error": {
                    "code": code,
                    "exit_code": exit_code.code_name(),
                    "message": message,
                }
            });
            eprintln!("{}", response);
        }
        OutputFormat::Summary => eprintln!("{}", human),
    }
    exit_code
}

fn load_settings(global: &GlobalOpts) -> Result<GuardSettings, ExitCode> {
    resolver(global)
        .load_settings()
        .map(|(settings, _)| settings)
        .map_err(|e| output_common_error(global, &e))
}

// ============================================================================
// check
// ============================================================================

fn read_message(args: &CheckArgs) -> std::io::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path);
    }
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    let text = match read_message(args) {
        Ok(text) => text,
        Err(e) => return output_common_error(global, &CommonError::Io(e)),
    };

    let settings = match load_settings(global) {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let context = PreSendContext::new(args.site.clone(), args.trigger, text)
        .composing(args.composing)
        .with_input_kind(args.input_kind);

    let log_config = LogStoreConfig::from(&settings);
    let mut log: Box<dyn LogSink> = if args.no_log {
        Box::new(LogStore::new(log_config))
    } else {
        match resolver(global).log_path() {
            Ok(path) => Box::new(PersistentLog::new(LogFile::new(path), log_config)),
            Err(e) => return output_common_error(global, &e),
        }
    };

    let mut surface: Box<dyn ConfirmationSurface> = if args.yes {
        Box::new(AutoDecision(true))
    } else if args.no {
        Box::new(AutoDecision(false))
    } else {
        Box::new(TerminalPrompt::stdio())
    };

    let gateway = PreSendGateway::new(settings);
    let outcome = gateway.run(&context, surface.as_mut(), log.as_mut());

    let exit_code = match outcome.sent_text() {
        None => ExitCode::Blocked,
        Some(_) if outcome.was_confirmed() => ExitCode::SentConfirmed,
        Some(_) => ExitCode::Clean,
    };

    let result = outcome.result();
    let payload = json!({
        "site": context.site,
        "trigger": context.trigger,
        "outcome": outcome.kind(),
        "final_action": outcome.final_action(),
        "confirmed": outcome.was_confirmed(),
        "sent_text": outcome.sent_text(),
        "result": result,
        "fallback_reason": match &outcome {
            SendOutcome::Fallback { message, .. } => Some(message.as_str()),
            _ => None,
        },
    });

    let summary = match result {
        Some(result) => format!(
            "{}: action={} risk={} hits=[{}] warnings={}",
            outcome.kind(),
            outcome.final_action(),
            result.risk_level,
            result.hit_summary(),
            result.warnings.len()
        ),
        None => format!("{}: action={}", outcome.kind(), outcome.final_action()),
    };
    emit(global, &payload, &summary);

    exit_code
}

// ============================================================================
// config
// ============================================================================

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global),
        ConfigCommands::Path => run_config_path(global),
        ConfigCommands::Reset => save_settings(global, "reset", GuardSettings::default()),
        ConfigCommands::SetPolicy {
            category,
            enabled,
            mask_mode,
            risk_level,
        } => {
            let patch = PolicyPatch {
                enabled: *enabled,
                mask_mode: *mask_mode,
                risk_level: *risk_level,
            };
            if patch.is_empty() {
                return output_error(
                    global,
                    ExitCode::ArgsError,
                    10,
                    "set-policy needs at least one of --enabled, --mask-mode, --risk-level",
                    "✗ Nothing to change\n  Fix: Pass --enabled, --mask-mode, or --risk-level",
                );
            }
            update_settings(global, "set-policy", &SettingsPatch::policy(*category, patch))
        }
        ConfigCommands::Enable => update_settings(global, "enable", &SettingsPatch::enabled(true)),
        ConfigCommands::Disable => {
            update_settings(global, "disable", &SettingsPatch::enabled(false))
        }
    }
}

fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let (settings, source) = match resolver(global).load_settings() {
        Ok(loaded) => loaded,
        Err(e) => return output_common_error(global, &e),
    };

    let payload = json!({
        "source": source,
        "settings": settings,
    });
    let summary = format!(
        "enabled={} sites={} source={} fingerprint={}",
        settings.enabled,
        settings.allow_sites.len(),
        source.resolution,
        source.fingerprint.as_deref().unwrap_or("-")
    );
    emit(global, &payload, &summary);
    ExitCode::Clean
}

fn run_config_path(global: &GlobalOpts) -> ExitCode {
    let resolver = resolver(global);
    let Some((config_dir, resolution)) = resolver.resolve_config_dir() else {
        return output_common_error(global, &CommonError::NoConfigDir);
    };
    let data_dir = resolver.resolve_data_dir();

    let payload = json!({
        "config_dir": config_dir.display().to_string(),
        "settings_path": config_dir.join(SETTINGS_FILE).display().to_string(),
        "resolution": resolution,
        "data_dir": data_dir.as_ref().map(|d| d.display().to_string()),
        "log_path": data_dir.as_ref().map(|d| d.join(LOG_FILE).display().to_string()),
    });
    let summary = config_dir.join(SETTINGS_FILE).display().to_string();
    emit(global, &payload, &summary);
    ExitCode::Clean
}

fn update_settings(global: &GlobalOpts, command: &str, patch: &SettingsPatch) -> ExitCode {
    match load_settings(global) {
        Ok(settings) => save_settings(global, command, settings.apply(patch)),
        Err(code) => code,
    }
}

fn save_settings(global: &GlobalOpts, command: &str, settings: GuardSettings) -> ExitCode {
    let saved = settings.validate().and_then(|()| {
        let path = resolver(global).settings_path()?;
        settings.save(&path)?;
        Ok(path)
    });

    match saved {
        Ok(path) => {
            tracing::info!(command, path = %path.display(), "settings saved");
            let payload = json!({
                "status": "ok",
                "command": command,
                "path": path.display().to_string(),
                "settings": settings,
            });
            emit(global, &payload, &format!("{}: saved {}", command, path.display()));
            ExitCode::Clean
        }
        Err(e) => output_common_error(global, &e),
    }
}

// ============================================================================
// logs
// ============================================================================

fn run_logs(global: &GlobalOpts, args: &LogsArgs) -> ExitCode {
    let settings = match load_settings(global) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    let file = match resolver(global).log_path() {
        Ok(path) => LogFile::new(path),
        Err(e) => return output_common_error(global, &e),
    };
    let config = LogStoreConfig::from(&settings);

    match &args.command {
        LogsCommands::List { limit } => {
            let mut store = match file.open_store(config) {
                Ok(store) => store,
                Err(e) => return output_log_error(global, &e),
            };
            let mut entries = store.list();
            let total = entries.len();
            if let Some(limit) = limit {
                entries.truncate(*limit);
            }

            if global.format == OutputFormat::Jsonl {
                for entry in &entries {
                    match serde_json::to_string(entry) {
                        Ok(line) => println!("{}", line),
                        Err(e) => return output_log_error(global, &LogStoreError::Json(e)),
                    }
                }
                return ExitCode::Clean;
            }

            let payload = json!({
                "total": total,
                "entries": entries,
            });
            let summary = format!("{} entries ({} shown)", total, entries.len());
            emit(global, &payload, &summary);
            ExitCode::Clean
        }
        LogsCommands::Clear => {
            let mut store = LogStore::new(config);
            if let Err(e) = file.persist(&mut store) {
                return output_log_error(global, &e);
            }
            tracing::info!(path = %file.path().display(), "guard log cleared");
            let payload = json!({
                "status": "ok",
                "command": "clear",
                "path": file.path().display().to_string(),
            });
            emit(global, &payload, "cleared");
            ExitCode::Clean
        }
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = json!({
        "sentinel_mask_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });
    let summary = format!("sentinel-mask {}", env!("CARGO_PKG_VERSION"));
    emit(global, &version_info, &summary);
}
