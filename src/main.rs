mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use mg_core::config::Config;
use mg_extract::ToolRegistry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediagrab=trace,mg_server=trace,mg_extract=trace,mg_core=debug,tower_http=debug".to_string()
        } else {
            "mediagrab=debug,mg_server=debug,mg_extract=debug,mg_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref());
    config.apply_process_env();

    match cli.command {
        Commands::Start { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(mg_server::start(config))?;
            Ok(())
        }
        Commands::CheckTools => check_tools(&config),
        Commands::Validate => validate_config(&config),
        Commands::Version => {
            println!("mediagrab {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install yt-dlp and ffmpeg to enable downloads.");
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    let warnings = config.validate();

    println!("Server: {}:{}", config.server.host, config.server.port);
    println!(
        "Extraction: {} slot(s), timeout {}s, audio {} kbps",
        config.extraction.worker_slots(),
        config.extraction.timeout_secs,
        config.extraction.audio_quality_kbps
    );
    println!(
        "Default cookies: {}",
        if config.extraction.default_cookies().is_some() {
            "configured"
        } else {
            "none"
        }
    );

    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("! {warning}");
        }
    }

    Ok(())
}
