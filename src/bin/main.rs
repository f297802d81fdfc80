//! Voxel Atlas CLI
//!
//! Build color atlases and textured voxel scenes from voxel JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};
use voxel_atlas::{
    build_palette, export_glb, load_voxels, AtlasConfig, AtlasGrid, AtlasPipeline, Completion,
    ObjExport, ObjLayout, Rgb8, Session, VoxelCloud, VoxelScene,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "voxel-atlas")]
#[command(author, version, about = "Build color atlases for voxelized meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the atlas and optionally export textured voxel cubes
    Build {
        /// Input JSON file containing voxel data
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the atlas and scene files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Object name used in file names (defaults to the name in the input)
        #[arg(short, long)]
        name: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "png")]
        format: OutputFormat,

        /// Put every voxel cube in its own OBJ group
        #[arg(long)]
        separate: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show the palette for a voxel file
    Palette {
        /// Input JSON file containing voxel data
        #[arg(short, long)]
        input: PathBuf,

        /// Merge threshold (0 to 255)
        #[arg(short, long, default_value = "5")]
        threshold: u32,
    },

    /// Show the palette size for a range of thresholds
    Sweep {
        /// Input JSON file containing voxel data
        #[arg(short, long)]
        input: PathBuf,

        /// First threshold
        #[arg(long, default_value = "0")]
        from: u32,

        /// Last threshold (inclusive)
        #[arg(long, default_value = "20")]
        to: u32,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Merge threshold (0 to 255)
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Pixels per tile edge
    #[arg(long)]
    tile_scale: Option<u32>,

    /// Fraction of each tile trimmed from face UVs (0.0 to 0.5)
    #[arg(long)]
    uv_inset: Option<f32>,

    /// Voxel cube edge length (defaults to the input's voxel size)
    #[arg(long)]
    voxel_size: Option<f32>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Atlas PNG only
    Png,
    /// Wavefront OBJ with MTL and atlas
    Obj,
    /// Binary glTF with the atlas embedded
    Glb,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output_dir,
            name,
            format,
            separate,
            config,
        } => {
            build(&input, &output_dir, name, format, separate, &config)?;
        }
        Commands::Palette { input, threshold } => {
            show_palette(&input, threshold)?;
        }
        Commands::Sweep { input, from, to } => {
            sweep(&input, from, to)?;
        }
    }

    Ok(())
}

fn resolve_config(args: &ConfigArgs, cloud: &VoxelCloud) -> Result<AtlasConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AtlasConfig::from_json_file(path)?,
        None => AtlasConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(tile_scale) = args.tile_scale {
        config = config.with_tile_scale(tile_scale);
    }
    if let Some(uv_inset) = args.uv_inset {
        config = config.with_uv_inset(uv_inset);
    }
    if let Some(voxel_size) = args.voxel_size.or(cloud.voxel_size) {
        config = config.with_voxel_size(voxel_size);
    }

    config.validate()?;
    Ok(config)
}

fn load(input: &Path) -> Result<VoxelCloud, Box<dyn std::error::Error>> {
    println!("Loading voxel data from {:?}...", input);
    let cloud = load_voxels(input)?;
    println!("  Loaded {} voxels from '{}'", cloud.voxels.len(), cloud.name);
    Ok(cloud)
}

fn build(
    input: &Path,
    output_dir: &Path,
    name: Option<String>,
    format: OutputFormat,
    separate: bool,
    args: &ConfigArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let cloud = load(input)?;
    let config = resolve_config(args, &cloud)?;
    let name = name.unwrap_or_else(|| cloud.name.clone());

    println!("Building atlas with config:");
    println!("  - Threshold: {}", config.threshold);
    println!("  - Tile scale: {}", config.tile_scale);
    if format != OutputFormat::Png {
        println!("  - UV inset: {}", config.uv_inset);
        println!("  - Voxel size: {}", config.voxel_size);
    }

    fs::create_dir_all(output_dir)?;
    let session = Session::new(&name).with_output_dir(output_dir);
    let pipeline = AtlasPipeline::new(config)?;
    let atlas = match pipeline.run_source(&session, &cloud)? {
        Completion::Completed(atlas) => atlas,
        Completion::Cancelled => {
            println!("Cancelled");
            return Ok(());
        }
    };

    println!(
        "  {} palette entries on a {}x{} grid ({} padding tiles)",
        atlas.palette.len(),
        atlas.grid.dimension(),
        atlas.grid.dimension(),
        atlas.grid.padding_tiles()
    );
    match &atlas.atlas_path {
        Some(path) => println!(
            "Wrote {}x{} atlas to {:?}",
            atlas.image.width, atlas.image.height, path
        ),
        None => {
            println!("No voxels; nothing to write");
            return Ok(());
        }
    }

    let scene = || VoxelScene::from_atlas(&atlas, pipeline.config());
    match format {
        OutputFormat::Png => {}
        OutputFormat::Glb => {
            let scene = scene()?;
            let glb_path = output_dir.join(format!("{}.glb", scene.name));
            let glb_data = export_glb(&scene)?;
            fs::write(&glb_path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);
        }
        OutputFormat::Obj => {
            let scene = scene()?;
            let layout = if separate { ObjLayout::PerVoxel } else { ObjLayout::Combined };
            let obj_export = ObjExport::from_scene(&scene, layout)?;

            let obj_path = output_dir.join(format!("{}.obj", scene.name));
            let mtl_path = obj_path.with_extension("mtl");

            // The atlas PNG is already in place under the name the MTL expects
            fs::write(&obj_path, &obj_export.obj)?;
            fs::write(&mtl_path, &obj_export.mtl)?;

            println!("Exported OBJ to {:?}", obj_path);
            println!("  Material: {:?}", mtl_path);
            println!("  Texture: {}", obj_export.texture_file_name);
        }
    }

    Ok(())
}

fn show_palette(input: &Path, threshold: u32) -> Result<(), Box<dyn std::error::Error>> {
    let cloud = load(input)?;
    AtlasConfig::default().with_threshold(threshold).validate()?;

    let colors = palette_colors(&cloud)?;
    let assignment = build_palette(colors, threshold);
    let grid = AtlasGrid::for_palette_len(assignment.palette.len());

    println!("\nPalette (threshold {}):", threshold);
    println!("  Entries: {}", assignment.palette.len());
    println!("  Grid: {}x{}", grid.dimension(), grid.dimension());
    println!("  Padding tiles: {}", grid.padding_tiles());
    for (i, color) in assignment.palette.iter().enumerate() {
        let uses = assignment.indices.iter().filter(|&&index| index == i).count();
        println!("  [{}] {} ({} voxels)", i, color, uses);
    }

    Ok(())
}

fn sweep(input: &Path, from: u32, to: u32) -> Result<(), Box<dyn std::error::Error>> {
    let cloud = load(input)?;
    if from > to {
        return Err(format!("--from ({}) must not exceed --to ({})", from, to).into());
    }
    AtlasConfig::default().with_threshold(to).validate()?;

    let colors = palette_colors(&cloud)?;

    println!("\nThreshold  Entries  Grid");
    for threshold in from..=to {
        let assignment = build_palette(colors.iter().copied(), threshold);
        let grid = AtlasGrid::for_palette_len(assignment.palette.len());
        println!(
            "{:>9}  {:>7}  {}x{}",
            threshold,
            assignment.palette.len(),
            grid.dimension(),
            grid.dimension()
        );
    }

    Ok(())
}

fn palette_colors(cloud: &VoxelCloud) -> Result<Vec<Rgb8>, Box<dyn std::error::Error>> {
    let mut colors = Vec::with_capacity(cloud.voxels.len());
    for (i, sample) in cloud.voxels.iter().enumerate() {
        let color = Rgb8::try_from_unit(sample.color)
            .map_err(|reason| format!("voxel {}: {}", i, reason))?;
        colors.push(color);
    }
    Ok(colors)
}
