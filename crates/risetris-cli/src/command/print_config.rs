use std::path::PathBuf;

use crate::util::{self, ConfigArg};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PrintConfigArg {
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    config: ConfigArg,
}

pub(crate) fn run(arg: &PrintConfigArg) -> anyhow::Result<()> {
    let PrintConfigArg { output, config } = arg;
    let config = config.load()?;
    util::write_json(&config, output.as_deref())
}
