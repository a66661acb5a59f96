use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "article-harvest")]
#[command(about = "Collects new articles from news index pages and annotates them")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the WebDriver URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Override the output directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Skip the annotation service
    #[arg(long)]
    pub no_annotate: bool,
}
