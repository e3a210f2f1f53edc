use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use survey_dashboard::config::Config;
use survey_dashboard::error::Result;
use survey_dashboard::logging;
use survey_dashboard::normalize::{clean_headers, ColumnMapping};
use survey_dashboard::pipeline::ReportPipeline;
use survey_dashboard::sheets::{GoogleSheetsSource, JsonFileSource, SheetSource};

#[derive(Parser)]
#[command(name = "survey-dashboard")]
#[command(about = "Registration survey dashboard generator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Also write JSON logs, rotated daily, into this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Read a saved Sheets API response (or bare JSON rows) instead of calling the API
    #[arg(long)]
    input: Option<PathBuf>,
    /// Spreadsheet id, overriding source.spreadsheet_id
    #[arg(long)]
    spreadsheet_id: Option<String>,
    /// Sheet (tab) name, overriding source.sheet_name
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet and write the HTML dashboard
    Generate {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file, overriding report.output
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write an empty report when the sheet has no data rows
        #[arg(long)]
        allow_empty: bool,
    },
    /// Print the aggregated summary as JSON
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        pretty: bool,
    },
    /// Print cleaned header names and the resolved column mapping
    Headers {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn create_source(args: &SourceArgs, config: &mut Config) -> Result<Box<dyn SheetSource>> {
    if let Some(path) = &args.input {
        return Ok(Box::new(JsonFileSource::new(path)));
    }
    if let Some(id) = &args.spreadsheet_id {
        config.source.spreadsheet_id = Some(id.clone());
    }
    if let Some(sheet) = &args.sheet {
        config.source.sheet_name = sheet.clone();
    }
    let api_key = config.source.api_key()?;
    Ok(Box::new(GoogleSheetsSource::new(&config.source, api_key)?))
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            source,
            output,
            allow_empty,
        } => {
            if let Some(output) = output {
                config.report.output = output;
            }
            config.report.allow_empty |= allow_empty;
            let source = create_source(&source, &mut config)?;

            println!("🔄 Building dashboard from {}...", source.describe());
            let pipeline = ReportPipeline::new(config);
            let result = pipeline.run(source.as_ref()).await?;

            println!("\n📊 Dashboard results:");
            println!("   Submissions: {}", result.stats.rows);
            println!("   Students: {}", result.stats.subjects);
            println!("   Empty student slots: {}", result.stats.empty_slots);
            println!("   Unreadable ages: {}", result.stats.unparsed_ages);
            if let Some(path) = &result.output_file {
                println!("   Output file: {}", path);
            }
            println!("✅ Dashboard generated");
        }
        Commands::Summary { source, pretty } => {
            let source = create_source(&source, &mut config)?;
            let pipeline = ReportPipeline::new(config);
            let (summary, _) = pipeline.build_summary(source.as_ref()).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&summary)?
            } else {
                serde_json::to_string(&summary)?
            };
            println!("{}", json);
        }
        Commands::Headers { source } => {
            let source = create_source(&source, &mut config)?;
            let values = source.fetch().await?;
            info!(columns = values.headers.len(), "read header row");

            println!("Columns:");
            for (index, (raw, cleaned)) in values
                .headers
                .iter()
                .zip(clean_headers(&values.headers))
                .enumerate()
            {
                println!("  {:>3}  {:<30}  {:?}", index, cleaned, raw);
            }

            let mapping = ColumnMapping::resolve(&config.columns, &values.headers)?;
            println!("\nMapping:");
            for (field, index) in mapping.describe() {
                match index {
                    Some(i) => {
                        let header = values
                            .headers
                            .get(i)
                            .map(String::as_str)
                            .unwrap_or("<beyond header row>");
                        println!("  {:<16} {:>3}  {:?}", field, i, header);
                    }
                    None => println!("  {:<16}   -", field),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(cli.log_dir.as_deref(), cli.verbose);

    if let Err(e) = run(cli).await {
        error!("run failed: {}", e);
        eprintln!("❌ {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("   {}", hint);
        }
        return Err(anyhow::Error::new(e).context("dashboard generation failed"));
    }
    Ok(())
}
