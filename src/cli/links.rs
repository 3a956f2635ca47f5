use clap::Parser;
use std::path::PathBuf;
use topolinks::{
    append_summary, get_topo_links, links_to_df, load_model, run_with_threads, write_df_to_file,
    DataFrameFileType, ExternalEngine, LinkError, LinkParams, DIST_CUTOFF, OUTPATH, SCAN_BEGIN,
    SCAN_END, SUMMARY_FILE, THRESH_SCORE, TERMINAL_TRIM,
};
use tracing::{debug, error, info, trace, warn};

#[derive(Parser, Debug, Clone)]
pub(crate) struct Args {
    /// Path to the PDB or mmCIF file to be analyzed
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = OUTPATH)]
    output: PathBuf,

    /// Name of the summary file inside the output directory; lines are appended
    #[arg(short = 's', long = "summary-file", default_value = SUMMARY_FILE)]
    summary_file: String,

    /// Write interface structures, GLN maps and matrices to <OUTPUT>/<input file stem>
    #[arg(long)]
    detail: bool,

    /// Upper limit of the scan windows (backbone points)
    #[arg(long = "scan-end", default_value_t = SCAN_END)]
    scan_end: usize,

    /// Lower limit of the scan windows (backbone points)
    #[arg(long = "scan-begin", default_value_t = SCAN_BEGIN)]
    scan_begin: usize,

    /// Threshold for the absolute GLN of a scan window
    #[arg(long = "thresh-score", default_value_t = THRESH_SCORE)]
    thresh_score: f64,

    /// Distance cutoff for interface selection (Å)
    #[arg(short = 'd', long = "dist-cutoff", default_value_t = DIST_CUTOFF)]
    dist_cutoff: f64,

    /// Number of residues removed from each chain terminus; negative values count as 0
    #[arg(long = "ter-rm", default_value_t = TERMINAL_TRIM as isize, allow_negative_numbers = true)]
    ter_rm: isize,

    /// Program computing GLN matrices, e.g. `python3`
    #[arg(long)]
    engine: PathBuf,

    /// Extra argument passed to the engine program; repeat for more
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub(crate) engine_args: Vec<String>,

    /// Also write the results table in this format
    #[arg(short = 't', long = "output-format", value_enum)]
    output_format: Option<DataFrameFileType>,

    /// Number of threads for the pair loop (0 for all cores)
    #[arg(short = 'j', long = "num-threads", default_value_t = 0)]
    num_threads: usize,
}

impl Args {
    fn file_stem(&self) -> String {
        self.input
            .file_stem()
            .map_or_else(|| "structure".to_string(), |s| s.to_string_lossy().into_owned())
    }

    /// Scan parameters; detail files go to a directory named after the input.
    pub(crate) fn params(&self) -> LinkParams {
        LinkParams {
            dist_cutoff: self.dist_cutoff,
            thresh_score: self.thresh_score,
            scan_begin: self.scan_begin,
            scan_end: self.scan_end,
            terminal_trim: self.ter_rm.max(0) as usize,
            detail: self.detail,
            outpath: self.output.join(self.file_stem()),
        }
    }
}

pub(crate) fn run(args: &Args) -> Result<(), LinkError> {
    trace!("{args:?}");

    let input_file = args.input.to_string_lossy().into_owned();
    let (pdb, pdb_warnings) = load_model(&input_file)?;
    pdb_warnings.iter().for_each(|e| match e.level() {
        pdbtbx::ErrorLevel::BreakingError | pdbtbx::ErrorLevel::InvalidatingError => error!("{e}"),
        _ => warn!("{e}"),
    });
    debug!("Loaded {} chain(s) from {input_file}", pdb.chain_count());

    std::fs::create_dir_all(&args.output)?;
    let params = args.params();
    let engine = ExternalEngine::new(&args.engine, args.engine_args.clone());

    let res = run_with_threads(args.num_threads, || get_topo_links(&pdb, &params, &engine))?;
    let failed = res.iter().filter(|o| o.result.is_err()).count();
    for pair in res.successes() {
        info!("Chains {}: {} link(s)", pair.pair, pair.tln);
    }
    if failed > 0 {
        warn!("{failed} chain pair(s) could not be evaluated");
    }

    let summary = args.output.join(&args.summary_file);
    let n_lines = append_summary(&summary, &input_file, &res)?;
    debug!("Appended {n_lines} line(s) to {}", summary.display());

    if let Some(file_type) = args.output_format {
        let mut df = links_to_df(&res)?;
        info!("Found {} chain pair(s) with results\n{}", df.height(), df);
        let table = args.output.join(format!("{}_links", args.file_stem()));
        write_df_to_file(&mut df, &table, file_type)?;
        debug!(
            "Results table saved to {}",
            table.with_extension(file_type.to_string()).display()
        );
    }
    Ok(())
}
