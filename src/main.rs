use clap::{Parser, Subcommand};
use construction_utils::export::{ExportCoordinator, ProcessRunner};
use construction_utils::{config, generate, output, project, scan, telemetry};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "construction_utils")]
#[command(about = "README generation and CAD preview export for construction workspaces")]
#[command(long_about = "\
README generation and CAD preview export for construction workspaces

A workspace is a directory of constructions. Every immediate subdirectory
with a construction.json (or legacy things.json) is one construction:

  workspace/
  ├── construction_utils.toml      # Optional tool config
  ├── README.md                    # Generated overview
  └── cable_clip/
      ├── construction.json        # name, id, description, tags, creator
      ├── README.md                # Generated
      ├── source/*.FCStd           # FreeCAD sources
      ├── img/*.{jpeg,jpg,png}     # Photos (first one is the thumbnail)
      ├── img/previews/*.png       # Exported CAD previews
      ├── 3d/*.stl                 # Printable models
      └── gcode/*.{gcode,3mf}      # Sliced prints

Previews are rendered by FreeCAD in one batch, inside xvfb-run when it is
available. Only sources newer than their preview are exported again.

Run 'construction_utils gen_config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Workspace root
    #[arg(long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Show debug output on the console
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Do not write .logs/construction_utils.log
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write all READMEs and export stale CAD previews
    #[command(name = "generate_docs")]
    GenerateDocs {
        /// Export every preview, even when up to date
        #[arg(long)]
        force: bool,
        /// Skip the FreeCAD export
        #[arg(long)]
        no_export: bool,
        /// Exit with an error when the export fails
        #[arg(long)]
        strict_export: bool,
    },
    /// Scaffold a new construction directory
    #[command(name = "create_project")]
    CreateProject {
        /// Directory name of the new construction
        project_name: String,
    },
    /// List constructions and missing previews without writing anything
    Check,
    /// Print a stock construction_utils.toml with all options documented
    #[command(name = "gen_config")]
    GenConfig,
}

/// Load the workspace config and install logging.
fn setup(
    workspace: &Path,
    verbose: bool,
    no_log_file: bool,
) -> Result<config::ToolConfig, Box<dyn std::error::Error>> {
    let mut tool_config = config::load_config(workspace)?;
    if no_log_file {
        tool_config.logging.file = false;
    }
    if let Some(log_path) = telemetry::init_tracing(&tool_config.logging, verbose, workspace)? {
        tracing::debug!(path = %log_path.display(), "Logging to file");
    }
    Ok(tool_config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let root = cli.workspace.as_path();

    match cli.command {
        Command::GenerateDocs {
            force,
            no_export,
            strict_export,
        } => {
            let tool_config = setup(root, cli.verbose, cli.no_log_file)?;
            let report = if tool_config.export.enabled && !no_export {
                let mut coordinator = ExportCoordinator::from_config(&tool_config.export, root);
                generate::generate_docs(root, &tool_config, Some(&mut coordinator), force)?
            } else {
                generate::generate_docs::<ProcessRunner>(root, &tool_config, None, force)?
            };
            output::print_docs_report(&report, root);

            if strict_export && report.export.as_ref().is_some_and(|o| o.is_failure()) {
                return Err("preview export failed".into());
            }
        }
        Command::CreateProject { project_name } => {
            setup(root, cli.verbose, cli.no_log_file)?;
            let outcome = project::create_project(root, &project_name)?;
            output::print_project_outcome(&outcome);
        }
        Command::Check => {
            // Read-only: console logging only
            setup(root, cli.verbose, true)?;
            let workspace = scan::Workspace::scan(root)?;
            output::print_check_output(&workspace);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
