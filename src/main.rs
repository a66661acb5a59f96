use article_harvest::annotate::ArticutClient;
use article_harvest::backend::WebDriverBackend;
use article_harvest::config::TargetConfig;
use article_harvest::credentials::Credentials;
use article_harvest::locator::FieldSelector;
use article_harvest::{DedupStore, HarvestConfig, Pipeline, harvest_target};
use clap::Parser;
use std::error::Error;

mod args;
use args::Args;

/// Targets used when the configuration names none
fn default_targets() -> Vec<TargetConfig> {
    let link_locator = FieldSelector::xpath(r#"//a[@data-content_level="開放閱讀"]"#);
    vec![
        TargetConfig::new(
            "https://house.udn.com/house/index",
            link_locator.clone(),
            "house",
        ),
        TargetConfig::new(
            "https://udn.com/news/cate/2/7225",
            link_locator,
            "international_media",
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => HarvestConfig::from_file(path).unwrap_or_else(|e| {
            ::log::error!(
                "Cannot load configuration {}: {}; using defaults",
                path.display(),
                e
            );
            HarvestConfig::default()
        }),
        None => HarvestConfig::default(),
    };

    // Override the WebDriver URL with an environment variable if provided
    if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
        if !webdriver_url.is_empty() {
            config.webdriver_url = webdriver_url;
        }
    }
    if let Some(webdriver_url) = args.webdriver_url {
        config.webdriver_url = webdriver_url;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if args.no_annotate {
        config.annotation.enabled = false;
    }
    if config.targets.is_empty() {
        config.targets = default_targets();
    }

    let annotator = if config.annotation.enabled {
        let credentials = Credentials::load(&config.credentials_path);
        Some(ArticutClient::new(&config.annotation.endpoint, credentials))
    } else {
        None
    };

    let mut backend = WebDriverBackend::connect(&config.webdriver_url).await?;
    let mut store = DedupStore::open(&config.crawled_links_path, &config.data_dir);
    let pipeline = Pipeline::from_config(&config);

    let start_time = std::time::Instant::now();
    let mut accepted = 0;

    for target in &config.targets {
        let harvest = harvest_target(
            &mut backend,
            &mut store,
            &pipeline,
            target,
            config.field_timeout(),
            annotator.as_ref(),
        )
        .await;

        accepted += harvest.run.articles.len();
        for annotation in harvest.annotations.into_iter().flatten() {
            println!("{}", annotation);
        }
    }

    if let Err(e) = backend.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }

    ::log::info!(
        "Harvest complete - {} new articles in {:.2} seconds",
        accepted,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
