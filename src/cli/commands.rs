//! Command dispatch: one handler per subcommand group

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::services::{to_pretty, STDIN_SOURCE};
use crate::application::ApplicationError;
use crate::cli::args::{
    Cli, ColorCommands, Commands, ConfigCommands, DataCommands, FileCommands, NumLayout,
    TimeCommands, TreeArgs, ValidateKind,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{record_label, TreeFields};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::{color, file, time, validate};

/// Entry point: load settings, wire services, run the selected command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run `rsutil --help`".to_string(),
        ));
    };

    // completion needs neither settings nor services
    if let Commands::Completion { shell } = command {
        print_completions(*shell);
        return Ok(());
    }

    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };
    let settings = Settings::load(Some(config_dir.as_path()))?;
    debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings);
    run(&container, command, &config_dir)
}

/// Run `command` against already wired services.
pub fn run(container: &ServiceContainer, command: &Commands, config_dir: &Path) -> CliResult<()> {
    match command {
        Commands::Data { command } => cmd_data(container, command),
        Commands::Color { command } => cmd_color(container, command),
        Commands::Time { command } => cmd_time(container, command),
        Commands::Validate { kind, value } => cmd_validate(*kind, value),
        Commands::File { command } => cmd_file(container, command),
        Commands::Config { command } => cmd_config(container, command, config_dir),
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

// ============================================================
// data
// ============================================================

/// Command-line attribute names win over the configured ones.
fn tree_fields(settings: &Settings, args: &TreeArgs) -> TreeFields {
    let base = settings.tree.fields();
    TreeFields::new(
        args.id.as_deref().or(Some(base.id.as_str())),
        args.parent_id.as_deref().or(Some(base.parent_id.as_str())),
        args.children.as_deref().or(Some(base.children.as_str())),
    )
}

fn emit_json(container: &ServiceContainer, value: &Value, dest: Option<&Path>) -> CliResult<()> {
    match dest {
        Some(path) => {
            container.data.write_json(value, path)?;
            output::success(&format!("wrote {}", path.display()));
        }
        None => output::info(&to_pretty(value)?),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_data(container: &ServiceContainer, command: &DataCommands) -> CliResult<()> {
    let data = &container.data;
    let settings = &container.settings;

    match command {
        DataCommands::Tree {
            args,
            label,
            output: dest,
        } => {
            let records = data.load_records(&args.input)?;
            let fields = tree_fields(settings, args);
            match label {
                Some(label) => {
                    for tree in data.tree_display(&records, &fields, label)? {
                        output::info(&tree);
                    }
                    Ok(())
                }
                None => {
                    let tree = data.tree(&records, &fields)?;
                    emit_json(container, &tree, dest.as_deref())
                }
            }
        }
        DataCommands::Group {
            input,
            key,
            output: dest,
        } => {
            let key = key
                .clone()
                .or_else(|| settings.group.key.clone())
                .ok_or_else(|| {
                    CliError::InvalidArgs("no group key: pass --key or set group.key".to_string())
                })?;
            let records = data.load_records(input)?;
            let groups = data.group(&records, &key)?;
            emit_json(container, &groups, dest.as_deref())
        }
        DataCommands::Branches { args } => {
            let records = data.load_records(&args.input)?;
            for branch in data.branches(&records, &tree_fields(settings, args))? {
                output::info(&branch);
            }
            Ok(())
        }
        DataCommands::Leaves { args, label } => {
            let records = data.load_records(&args.input)?;
            let fields = tree_fields(settings, args);
            let forest = data.forest(&records, &fields)?;
            let label = label.as_deref().unwrap_or(&fields.id);
            for record in forest.leaf_nodes() {
                output::info(&record_label(record, label));
            }
            Ok(())
        }
        DataCommands::Stats { args } => {
            let records = data.load_records(&args.input)?;
            let forest = data.forest(&records, &tree_fields(settings, args))?;
            output::header(&args.input);
            output::action("records", &forest.len());
            output::action("roots", &forest.roots().len());
            output::action("depth", &forest.depth());
            output::action("leaves", &forest.leaf_nodes().len());
            Ok(())
        }
    }
}

// ============================================================
// color
// ============================================================

fn unreadable_color(input: &str) -> CliError {
    CliError::InvalidArgs(format!("cannot read color: {input}"))
}

fn require_hex(hex: &str) -> CliResult<color::Rgb> {
    color::hex_to_rgb(hex).ok_or_else(|| unreadable_color(hex))
}

#[instrument(skip(container))]
fn cmd_color(container: &ServiceContainer, command: &ColorCommands) -> CliResult<()> {
    match command {
        ColorCommands::HexToRgb { hex } => {
            let rgb = require_hex(hex)?;
            output::info(&format!("rgb({}, {}, {})", rgb.r, rgb.g, rgb.b));
        }
        ColorCommands::RgbToHex { r, g, b } => output::info(&color::rgb_to_hex(*r, *g, *b)),
        ColorCommands::HexToHsl { hex } => {
            let hsl = color::hex_to_hsl(hex).ok_or_else(|| unreadable_color(hex))?;
            output::info(&format!("hsl({}, {}%, {}%)", hsl.h, hsl.s, hsl.l));
        }
        ColorCommands::HslToHex { h, s, l } => output::info(&color::hsl_to_hex(*h, *s, *l)),
        ColorCommands::HexToRgba { hex, alpha } => {
            if color::hex_to_rgb(hex).is_none() {
                output::warning(&format!("cannot read color {hex}, using black"));
            }
            output::info(&color::hex_to_rgba(hex, *alpha));
        }
        ColorCommands::RgbaToHex { rgba, alpha } => {
            let hex = color::rgba_to_hex(rgba, *alpha).ok_or_else(|| unreadable_color(rgba))?;
            output::info(&hex);
        }
        ColorCommands::Gradient { start, end, steps } => {
            require_hex(start)?;
            require_hex(end)?;
            let steps = steps.unwrap_or(container.settings.gradient_steps);
            for hex in color::gradient(start, end, steps) {
                output::info(&hex);
            }
        }
        ColorCommands::Complementary { hex } => {
            require_hex(hex)?;
            output::info(&color::complementary(hex));
        }
        ColorCommands::Triadic { hex } => {
            require_hex(hex)?;
            let scheme = color::triadic(hex);
            output::action("primary", &scheme.primary);
            output::action("secondary", &scheme.secondary);
            output::action("tertiary", &scheme.tertiary);
        }
        ColorCommands::Random { dark } => {
            let hex = if *dark {
                color::random_dark_color()
            } else {
                color::random_light_color()
            };
            output::info(&hex);
        }
    }
    Ok(())
}

// ============================================================
// time
// ============================================================

fn parse_date(input: &str) -> CliResult<NaiveDateTime> {
    time::parse_datetime(input)
        .ok_or_else(|| CliError::InvalidArgs(format!("cannot parse date: {input}")))
}

fn num_kind(layout: NumLayout) -> time::NumKind {
    match layout {
        NumLayout::Date => time::NumKind::Date,
        NumLayout::Time => time::NumKind::Time,
        NumLayout::Datetime => time::NumKind::DateTime,
        NumLayout::Auto => time::NumKind::Auto,
    }
}

fn day_label(date: &NaiveDateTime) -> &'static str {
    if time::is_today(date) {
        "today"
    } else if time::is_yesterday(date) {
        "yesterday"
    } else if time::is_tomorrow(date) {
        "tomorrow"
    } else {
        "-"
    }
}

#[instrument(skip(container))]
fn cmd_time(container: &ServiceContainer, command: &TimeCommands) -> CliResult<()> {
    let default_format = container.settings.date_format.as_str();
    let fmt = |date: &NaiveDateTime| time::format_date(date, default_format);

    match command {
        TimeCommands::Now { format } => {
            let pattern = format.as_deref().unwrap_or(default_format);
            output::info(&time::format_date(&time::now(), pattern));
        }
        TimeCommands::Format { date, format } => {
            let pattern = format.as_deref().unwrap_or(default_format);
            output::info(&time::format_date(&parse_date(date)?, pattern));
        }
        TimeCommands::Num { digits, layout } => {
            output::info(&time::format_num(digits, num_kind(*layout)));
        }
        TimeCommands::Relative { date } => {
            output::info(&time::relative_time_from_now(&parse_date(date)?));
        }
        TimeCommands::Add {
            date,
            years,
            months,
            days,
            hours,
            minutes,
        } => {
            let mut shifted = parse_date(date)?;
            shifted = time::add_years(&shifted, *years);
            shifted = time::add_months(&shifted, *months);
            shifted = time::add_days(&shifted, *days);
            shifted = time::add_hours(&shifted, *hours);
            shifted = time::add_minutes(&shifted, *minutes);
            output::info(&fmt(&shifted));
        }
        TimeCommands::Info { date } => {
            let date = parse_date(date)?;
            let kind = if time::is_weekend(&date) {
                "weekend"
            } else {
                "weekday"
            };
            output::header(&fmt(&date));
            output::action(
                "weekday",
                &format!("{} / {}", time::weekday_en(&date, false), time::weekday_zh(&date)),
            );
            output::action(
                "month",
                &format!(
                    "{} / {}",
                    time::month_name_en(&date, false),
                    time::month_name_zh(&date)
                ),
            );
            output::action("quarter", &time::quarter(&date));
            output::action("kind", &kind);
            output::action("day", &day_label(&date));
            output::action(
                "day range",
                &format!("{} .. {}", fmt(&time::date_start(&date)), fmt(&time::date_end(&date))),
            );
            output::action(
                "month range",
                &format!(
                    "{} .. {}",
                    fmt(&time::month_start(&date)),
                    fmt(&time::month_end(&date))
                ),
            );
            output::action(
                "year range",
                &format!(
                    "{} .. {}",
                    fmt(&time::year_start(&date)),
                    fmt(&time::year_end(&date))
                ),
            );
            if let Some(millis) = time::timestamp_millis(&date) {
                output::action("timestamp", &millis);
            }
            output::action("relative", &time::relative_time_from_now(&date));
        }
        TimeCommands::Diff { from, to } => {
            output::info(&time::days_diff(&parse_date(from)?, &parse_date(to)?));
        }
        TimeCommands::Duration { millis } => output::info(&time::format_duration(*millis)),
        TimeCommands::Age { birth } => {
            let birth = parse_date(birth)?.date();
            output::info(&time::age(&birth, &time::now().date()));
        }
        TimeCommands::Range { date, days } => {
            for day in time::date_range(&parse_date(date)?, *days) {
                output::info(&day);
            }
        }
        TimeCommands::Month { date } => {
            for day in time::month_dates(&parse_date(date)?) {
                output::info(&day);
            }
        }
    }
    Ok(())
}

// ============================================================
// validate
// ============================================================

fn cmd_validate(kind: ValidateKind, value: &str) -> CliResult<()> {
    let (name, valid) = match kind {
        ValidateKind::Phone => ("phone number", validate::is_phone(value)),
        ValidateKind::Email => ("email address", validate::is_email(value)),
        ValidateKind::Url => ("url", validate::is_url(value)),
        ValidateKind::IdCard => ("id card number", validate::is_id_card(value)),
        ValidateKind::Numeric => ("number", validate::is_numeric(value)),
    };
    if valid {
        output::success(&format!("{value} is a valid {name}"));
        Ok(())
    } else {
        Err(ApplicationError::InvalidInput {
            message: format!("{value} is not a valid {name}"),
        }
        .into())
    }
}

// ============================================================
// file
// ============================================================

fn read_stdin_or(container: &ServiceContainer, value: &str) -> CliResult<String> {
    if value == STDIN_SOURCE {
        let content = container
            .stdin
            .read_all()
            .map_err(|e| InfraError::io("read stdin", e))?;
        Ok(content.trim().to_string())
    } else {
        Ok(value.to_string())
    }
}

#[instrument(skip(container))]
fn cmd_file(container: &ServiceContainer, command: &FileCommands) -> CliResult<()> {
    let settings = &container.settings;

    match command {
        FileCommands::Info { path } => {
            let meta = std::fs::metadata(path)
                .map_err(|e| InfraError::io(format!("stat {}", path.display()), e))?;
            let display = path.to_string_lossy();
            output::header(file::name(&display));
            output::action("stem", file::name_no_ext(&display));
            output::action("extension", &file::ext(&display));
            output::action("mime", file::mime_type(&display));
            output::action("size", &file::format_size(meta.len(), settings.size_decimals));
        }
        FileCommands::Size { bytes, decimals } => {
            let decimals = decimals.unwrap_or(settings.size_decimals);
            output::info(&file::format_size(*bytes, decimals));
        }
        FileCommands::Unique { filename } => output::info(&file::unique_name(filename)),
        FileCommands::Encode { path } => output::info(&file::read_as_data_url(path)?),
        FileCommands::Decode { data_url, output: dest } => {
            let data_url = read_stdin_or(container, data_url)?;
            let blob = file::write_data_url(&data_url, dest)?;
            output::success(&format!(
                "wrote {} bytes of {} to {}",
                blob.bytes.len(),
                blob.mime,
                dest.display()
            ));
        }
        FileCommands::Compress {
            input,
            output: dest,
            max_width,
            quality,
        } => {
            let quality = quality.or(settings.image.quality);
            if let Some(q) = quality {
                if !(0.0..=1.0).contains(&q) {
                    return Err(CliError::InvalidArgs(format!(
                        "quality must be within 0-1, got {q}"
                    )));
                }
            }
            let max_width = max_width.unwrap_or(settings.image.max_width);

            let source = file::read_as_data_url(input)?;
            let compressed = file::compress_image(&source, max_width, quality)?;
            file::write_data_url(&compressed, dest)?;
            output::success(&format!(
                "{} -> {} ({:.2} MB -> {:.2} MB)",
                input.display(),
                dest.display(),
                file::base64_size_mb(&source),
                file::base64_size_mb(&compressed)
            ));
        }
    }
    Ok(())
}

// ============================================================
// config
// ============================================================

fn config_target(global: bool, config_dir: &Path) -> CliResult<PathBuf> {
    if global {
        global_config_path().ok_or_else(|| {
            ApplicationError::Config {
                message: "cannot determine global config directory".to_string(),
            }
            .into()
        })
    } else {
        Ok(local_config_path(config_dir))
    }
}

#[instrument(skip(container))]
fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    config_dir: &Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Init { global, force } => {
            let path = config_target(*global, config_dir)?;
            if container.fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
        ConfigCommands::Path => {
            let describe = |path: &Path| {
                let state = if container.fs.exists(path) {
                    "exists"
                } else {
                    "missing"
                };
                format!("{} ({})", path.display(), state)
            };
            match global_config_path() {
                Some(path) => output::action("global", &describe(&path)),
                None => output::action("global", "<unavailable>"),
            }
            output::action("local", &describe(&local_config_path(config_dir)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::{RealFileSystem, StdinReader};
    use crate::util::testing;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedStdin(String);

    impl StdinReader for FixedStdin {
        fn read_all(&self) -> io::Result<String> {
            Ok(self.0.clone())
        }
    }

    fn container(stdin: &str) -> ServiceContainer {
        ServiceContainer::with_deps(
            Settings::default(),
            Arc::new(RealFileSystem),
            Arc::new(FixedStdin(stdin.to_string())),
        )
    }

    fn tree_args(input: &str) -> TreeArgs {
        TreeArgs {
            input: input.to_string(),
            id: None,
            parent_id: None,
            children: None,
        }
    }

    #[test]
    fn given_custom_cli_fields_when_resolving_then_override_settings() {
        let mut settings = Settings::default();
        settings.tree.parent_id_field = "pid".into();
        let mut args = tree_args("-");
        args.children = Some("kids".into());

        let fields = tree_fields(&settings, &args);

        assert_eq!(fields.id, "id");
        assert_eq!(fields.parent_id, "pid");
        assert_eq!(fields.children, "kids");
    }

    #[test]
    fn given_stdin_records_when_running_tree_with_output_then_writes_nested_json() {
        testing::init_test_setup();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("tree.json");
        let stdin = serde_json::to_string(&testing::sample_records()).unwrap();
        let command = Commands::Data {
            command: DataCommands::Tree {
                args: tree_args(STDIN_SOURCE),
                label: None,
                output: Some(out.clone()),
            },
        };

        run(&container(&stdin), &command, dir.path()).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 2);
        assert_eq!(written[0]["children"][1]["name"], "Apps");
    }

    #[test]
    fn given_no_group_key_when_grouping_then_rejects_arguments() {
        let dir = TempDir::new().unwrap();
        let command = Commands::Data {
            command: DataCommands::Group {
                input: STDIN_SOURCE.to_string(),
                key: None,
                output: None,
            },
        };

        let err = run(&container("[]"), &command, dir.path()).unwrap_err();

        assert!(matches!(err, CliError::InvalidArgs(_)));
    }

    #[test]
    fn given_invalid_email_when_validating_then_fails_with_data_error() {
        let err = cmd_validate(ValidateKind::Email, "not-an-email").unwrap_err();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
        assert!(cmd_validate(ValidateKind::Email, "dev@example.com").is_ok());
    }

    #[test]
    fn given_bad_color_when_converting_then_rejects_arguments() {
        let command = ColorCommands::Complementary {
            hex: "#zzzzzz".to_string(),
        };
        let err = cmd_color(&container(""), &command).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgs(_)));
    }

    #[test]
    fn given_unparsable_date_when_formatting_then_rejects_arguments() {
        let command = TimeCommands::Format {
            date: "someday".to_string(),
            format: None,
        };
        let err = cmd_time(&container(""), &command).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgs(_)));
    }

    #[test]
    fn given_data_url_on_stdin_when_decoding_then_writes_payload() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("hello.txt");
        let command = FileCommands::Decode {
            data_url: STDIN_SOURCE.to_string(),
            output: out.clone(),
        };

        cmd_file(&container("data:text/plain;base64,aGVsbG8=\n"), &command).unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello");
    }

    #[test]
    fn given_existing_local_config_when_init_without_force_then_refuses() {
        let dir = TempDir::new().unwrap();
        let command = ConfigCommands::Init {
            global: false,
            force: false,
        };
        let svc = container("");

        cmd_config(&svc, &command, dir.path()).unwrap();
        assert!(local_config_path(dir.path()).exists());

        let err = cmd_config(&svc, &command, dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }
}
