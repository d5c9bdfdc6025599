use chunks2las::converter::{self, Config};
use chunks2las::writer::header::{LasHeader, HEADER_SIZE};
use chunks2las::Error;
use clap::{Parser, Subcommand};
use log::error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Convert the chunks of a chunk directory into LAS files
	Convert {
		/// Directory holding metadata.json and the *.bin chunks
		#[arg(env = "CHUNK_DIR")]
		chunk_dir: PathBuf,

		/// Metadata file, defaults to <CHUNK_DIR>/metadata.json
		#[arg(long, env)]
		metadata: Option<PathBuf>,

		/// Write LAS files here instead of next to the chunks
		#[arg(long, env)]
		output_dir: Option<PathBuf>,

		/// Only convert these chunk files (repeatable)
		#[arg(long = "chunk")]
		chunks: Vec<String>,

		/// Worker threads, 1 converts sequentially
		#[arg(long, env)]
		threads: Option<usize>,

		/// Refuse chunks larger than this many bytes
		#[arg(long, env)]
		max_chunk_bytes: Option<u64>,

		/// Extra attempts for interrupted writes
		#[arg(long, env, default_value = "2")]
		write_retries: u32,
	},

	/// Print the header of a LAS file
	Inspect { path: PathBuf },
}

fn main() -> ExitCode {
	env_logger::init();
	let args = Args::parse();

	match args.command {
		Command::Convert {
			chunk_dir,
			metadata,
			output_dir,
			chunks,
			threads,
			max_chunk_bytes,
			write_retries,
		} => {
			let config = Config {
				metadata,
				output_dir,
				chunks,
				threads,
				max_chunk_bytes,
				write_retries,
				..Config::new(chunk_dir)
			};
			match converter::run(&config) {
				Ok(summary) => {
					println!("{}", summary);
					if summary.all_converted() {
						ExitCode::SUCCESS
					} else {
						ExitCode::from(1)
					}
				}
				Err(e) => {
					error!("{}", e);
					ExitCode::from(2)
				}
			}
		}
		Command::Inspect { path } => match inspect(&path) {
			Ok(header) => {
				println!("{:#?}", header);
				ExitCode::SUCCESS
			}
			Err(e) => {
				error!("{}", e);
				ExitCode::from(2)
			}
		},
	}
}

fn inspect(path: &Path) -> Result<LasHeader, Error> {
	let mut buffer = vec![0u8; HEADER_SIZE];
	let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
	file.read_exact(&mut buffer).map_err(|e| Error::io(path, e))?;
	LasHeader::from_bytes(&buffer)
}
