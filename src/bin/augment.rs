use std::fs;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use clap::Parser;
use slog::{error, info};

use graph_augment::prelude::*;
use graph_augment::schema::InputSchema;
use graph_augment::util::log::guarded_logger;

#[derive(Parser)]
#[clap(
    name = "augment",
    about = "Derive a CRUD GraphQL API schema from @node/@relationship type definitions",
    version
)]
struct Opt {
    /// The file containing the annotated type definitions
    schema: PathBuf,
}

fn main() {
    let (logger, _guard) = guarded_logger();
    let opt = Opt::parse();

    if let Err(e) = run(&logger, &opt) {
        error!(logger, "{:#}", e);
        exit(1);
    }
}

fn run(logger: &slog::Logger, opt: &Opt) -> Result<(), Error> {
    let raw = fs::read_to_string(&opt.schema)
        .with_context(|| format!("failed to read `{}`", opt.schema.display()))?;

    let start = Instant::now();
    let input_schema = InputSchema::parse(&raw)?;
    let api_schema = input_schema.api_schema()?;
    info!(logger, "Generated API schema";
        "node_types" => input_schema.node_types().count(),
        "definitions" => api_schema.document().definitions.len(),
        "elapsed_ms" => start.elapsed().as_millis() as u64);

    println!("{}", api_schema.document());
    Ok(())
}
