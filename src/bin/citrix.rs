//! Command-line front end for the citrix tools.
use citrix::cifti::Direction;
use citrix::tools::{cifti_average, dlabel_to_nifti, dtseries_to_nifti};
use citrix::{load, Image, NiftiVolume, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "citrix", version, about = "Tools for CIFTI-2 and GIFTI files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Average CIFTI matrices of the same type over their common structures
    Average {
        /// Input matrices, such as sub-01.dconn.nii
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output matrix, of the same type as the inputs
        #[arg(short, long)]
        output: PathBuf,
        /// Average in log-odds space
        #[arg(long)]
        logodds: bool,
    },
    /// Paint the labels of a dlabel file into a NIfTI volume
    DlabelToNifti {
        /// Input .dlabel.nii file
        dlabel: PathBuf,
        /// Output .nii or .nii.gz file
        output: PathBuf,
        /// Volume giving the grid when the dlabel has none
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Surface (.surf.gii) of each cortex in the dlabel
        #[arg(long = "surface")]
        surfaces: Vec<PathBuf>,
    },
    /// Project a dtseries file into a 4D NIfTI volume
    DtseriesToNifti {
        /// Input .dtseries.nii file
        dtseries: PathBuf,
        /// Output .nii or .nii.gz file
        output: PathBuf,
        /// Surface (.surf.gii) of each cortex in the dtseries
        #[arg(long = "surface")]
        surfaces: Vec<PathBuf>,
    },
    /// Print a summary of a NIfTI, CIFTI or GIFTI file
    Info {
        /// File to describe
        path: PathBuf,
    },
}

fn info(path: PathBuf) -> Result<()> {
    match load(&path)? {
        Image::Cifti(image) => {
            let (rows, cols) = image.data().dim();
            println!("{:?} {}x{}", image.kind(), rows, cols);
            for direction in Direction::ALL.iter().copied() {
                let map = image.cifti_header().matrix_indices_map(direction)?;
                println!("{}: {}", direction, map.indices_type.as_str());
                for model in &map.brain_models {
                    println!(
                        "  {} {} offset={} count={}",
                        model.structure, model.model_type, model.index_offset, model.index_count
                    );
                }
                for parcel in &map.parcels {
                    println!("  parcel {}", parcel.name);
                }
            }
        }
        Image::Surface(mesh) => println!(
            "{} surface: {} vertices, {} triangles",
            mesh.structure(),
            mesh.vertices().nrows(),
            mesh.triangles().nrows()
        ),
        Image::GiftiFunction(func) => {
            println!("function with {} values", func.function_data().len())
        }
        Image::Gifti(gifti) => {
            for array in &gifti.data_arrays {
                println!("{} {:?}", array.intent.gifti_name(), array.dims);
            }
        }
        Image::Nifti(object) => {
            let volume = object.volume();
            println!("NIfTI {:?} {:?}", volume.data_type(), volume.dim());
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Average {
            inputs,
            output,
            logodds,
        } => cifti_average(&inputs, &output, logodds),
        Command::DlabelToNifti {
            dlabel,
            output,
            reference,
            surfaces,
        } => dlabel_to_nifti(dlabel, output, reference, &surfaces),
        Command::DtseriesToNifti {
            dtseries,
            output,
            surfaces,
        } => dtseries_to_nifti(dtseries, output, &surfaces),
        Command::Info { path } => info(path),
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}
