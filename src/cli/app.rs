//! Main CLI application

use crate::config::{interpreter_from_env, load_settings, validate_interpreter, validate_settings, Settings};
use crate::error::{TaskmarkError, EXIT_CONFIG};
use crate::preprocess::render;
use crate::runner::{
    list_tasks, load_script, run_script, Context, DefaultHooks, Engine, KeepGoing, Selection,
    TaskHooks, Verbosity,
};
use anyhow::{Context as _, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding the step interpreter
pub const SHELL_ENV: &str = "TASKMARK_SHELL";

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
}

/// Everything a run needs, after layering flags over settings
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub interpreter: Vec<String>,
    pub base_dir: PathBuf,
    pub selection: Selection,
    pub dry_run: bool,
    pub ask: bool,
    pub keep_going: bool,
    pub dotenv: bool,
    pub verbosity: Verbosity,
}

impl App {
    pub fn new() -> Self {
        App {
            command: build_command(),
        }
    }

    /// Run the application with command line arguments
    pub fn run(self) -> Result<()> {
        let matches = self.command.clone().get_matches();
        self.run_matches(&matches)
    }

    /// Run with already parsed arguments
    pub fn run_matches(mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(shell) = matches.get_one::<Shell>("completions").copied() {
            clap_complete::generate(shell, &mut self.command, "taskmark", &mut io::stdout());
            return Ok(());
        }

        let script = match matches.get_one::<PathBuf>("script") {
            Some(script) => script.clone(),
            None => {
                self.command.print_help()?;
                println!();
                return Ok(());
            }
        };

        let script_dir = script_dir(&script);
        let settings = load_settings(
            matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
            &script_dir,
        )
        .context("Failed to load settings")?;
        validate_settings(&settings)?;

        if matches.get_flag("list") {
            for (num, name) in list_tasks(&script)? {
                println!("{:>3}  {}", num, name);
            }
            return Ok(());
        }

        if matches.get_flag("emit") {
            print!("{}", render(&load_script(&script)?));
            return Ok(());
        }

        let options = resolve_options(matches, settings, env::var(SHELL_ENV).ok())?;

        if options.dotenv {
            let env_file = options.base_dir.join(".env");
            if env_file.is_file() {
                dotenvy::from_path(&env_file)
                    .with_context(|| format!("Failed to load {}", env_file.display()))?;
            }
        }

        let hooks: Box<dyn TaskHooks> = if options.keep_going {
            Box::new(KeepGoing::new(DefaultHooks))
        } else {
            Box::new(DefaultHooks)
        };

        let mut ctx = Context::new()
            .with_base_dir(options.base_dir)
            .with_interpreter(options.interpreter)
            .with_selection(options.selection)
            .with_dry_run(options.dry_run)
            .with_ask(options.ask)
            .with_verbosity(options.verbosity);
        let mut engine = Engine::with_hooks(hooks);

        run_script(&mut engine, &mut ctx, &script)?;
        engine.finish(&ctx);

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("taskmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run the tasks of an indentation-based task script")
        .arg(
            Arg::new("script")
                .value_name("SCRIPT")
                .help("Task script to run")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("completions"),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print steps without running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ask")
                .short('a')
                .long("ask")
                .help("Ask before running each task")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("only")
                .long("only")
                .value_name("RANGES")
                .help("Run only these task numbers, e.g. 1,5..8,12..")
                .conflicts_with("skip"),
        )
        .arg(
            Arg::new("skip")
                .long("skip")
                .value_name("RANGES")
                .help("Skip these task numbers, e.g. ..3"),
        )
        .arg(
            Arg::new("keep-going")
                .short('k')
                .long("keep-going")
                .help("Log failed steps and continue")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List numbered tasks and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .help("Print the script as compiled shell code and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("base-dir")
                .short('C')
                .long("base-dir")
                .value_name("DIR")
                .help("Directory every task starts in")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("shell")
                .long("shell")
                .value_name("COMMAND")
                .help("Interpreter for steps, e.g. \"bash -c\""),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a taskmark.yml settings file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print step output, errors and the summary")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no status output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .help("Print shell completions and exit")
                .value_parser(value_parser!(Shell)),
        )
}

/// Get verbosity level from matches, if any flag was given
fn get_verbosity(matches: &ArgMatches) -> Option<Verbosity> {
    if matches.get_flag("silent") {
        Some(Verbosity::Silent)
    } else if matches.get_flag("quiet") {
        Some(Verbosity::Quiet)
    } else if matches.get_flag("verbose") {
        Some(Verbosity::Verbose)
    } else {
        None
    }
}

/// Layer flags, the interpreter override and settings into run options
pub fn resolve_options(
    matches: &ArgMatches,
    settings: Settings,
    shell_env: Option<String>,
) -> Result<RunOptions, TaskmarkError> {
    let selection = Selection::from_flags(
        matches.get_one::<String>("only").map(String::as_str),
        matches.get_one::<String>("skip").map(String::as_str),
    )?;

    let interpreter = match (matches.get_one::<String>("shell"), shell_env) {
        (Some(flag), _) => interpreter_from_env(flag)?,
        (None, Some(value)) => interpreter_from_env(&value)?,
        (None, None) => settings
            .interpreter
            .unwrap_or_else(|| vec!["sh".to_string(), "-c".to_string()]),
    };
    validate_interpreter(&interpreter)?;

    let base_dir = match matches.get_one::<PathBuf>("base-dir") {
        Some(dir) => dir.clone(),
        None => match settings.base_dir {
            Some(dir) => dir,
            None => env::current_dir()?,
        },
    };

    Ok(RunOptions {
        interpreter,
        base_dir,
        selection,
        dry_run: matches.get_flag("dry-run") || settings.dry_run.unwrap_or(false),
        ask: matches.get_flag("ask") || settings.ask.unwrap_or(false),
        keep_going: matches.get_flag("keep-going") || settings.keep_going.unwrap_or(false),
        dotenv: settings.dotenv.unwrap_or(false),
        verbosity: get_verbosity(matches)
            .or(settings.verbosity)
            .unwrap_or_default(),
    })
}

fn script_dir(script: &Path) -> PathBuf {
    match script.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Map an error to the process exit code
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<TaskmarkError>()
        .map_or(EXIT_CONFIG, TaskmarkError::exit_code)
}

/// Run the CLI application
pub fn run() -> Result<()> {
    App::new().run()
}
