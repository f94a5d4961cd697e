use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "skinforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the project's canvases and create a `.deltaskin` file.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Directory where the skin project is located.
    #[arg(short = 'd', long, default_value = ".")]
    project_dir: PathBuf,

    /// Directory rendered skins are written to (defaults to `<project>/dist`).
    #[arg(short = 'O', long)]
    output_dir: Option<PathBuf>,

    /// Limit the generated representations
    /// (all, iphone, iphone-standard, iphone-e2e, ipad, ipad-standard, ipad-splitview).
    #[arg(short = 'r', long = "representations", default_values_t = [String::from("all")])]
    representations: Vec<String>,

    /// Limit the generated orientations (all, portrait, landscape).
    #[arg(short = 'o', long = "orientations", default_values_t = [String::from("all")])]
    orientations: Vec<String>,

    /// Disable the alternate-skin pass.
    #[arg(short = 'a', long, default_value_t = false)]
    no_alt_skin: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let skin = skinforge::Skin::load(&args.project_dir)?;
    let representations = skinforge::expand_selectors(
        &args.representations,
        &args.orientations,
        !args.no_alt_skin,
    )?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| args.project_dir.join("dist"));

    let path = skin.assemble(&representations, &output_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
