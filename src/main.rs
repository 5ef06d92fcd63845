use std::{path::PathBuf, rc::Rc, time::Duration};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use pickup_core::{
    entities::CarrierId,
    gateways::GeoCodingGateway,
    headless::{HeadlessDocument, HeadlessMapLibrary},
    Error, PickupInfoWidget, Ports, Rendered,
};
use pickup_gateways::{assets::HttpAssetHost, nominatim::Nominatim, pickup_api::PickupApi};

mod config;
mod runtime;

use self::{config::Config, runtime::TokioRuntime};

/// Additional time to wait after the last scheduled relayout.
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    config_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the pickup point of one or more carriers in a headless dialog.
    ///
    /// If multiple carriers are given, they are triggered
    /// concurrently and only the last one is shown.
    Show {
        #[arg(required = true, value_name = "CARRIER_ID")]
        carrier_ids: Vec<String>,
        /// Close the dialog afterwards.
        #[arg(long)]
        close: bool,
    },
    /// Resolve the coordinates of an address.
    Geocode { address: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let Cli {
        config_file,
        command,
    } = Cli::parse();
    let cfg = Config::try_load_from_file_or_default(config_file)?;
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            match command {
                Command::Show { carrier_ids, close } => show(cfg, &carrier_ids, close).await,
                Command::Geocode { address } => geocode(cfg, &address).await,
            }
        })
        .await
}

fn geocoder(cfg: &Config) -> Result<Nominatim> {
    let config::Geocoding {
        base_url,
        language,
        user_agent,
        timeout,
    } = &cfg.geocoding;
    Ok(Nominatim::new(
        base_url,
        language,
        user_agent.as_deref(),
        *timeout,
    )?)
}

async fn geocode(cfg: Config, address: &str) -> Result<()> {
    let geocoder = geocoder(&cfg)?;
    let pos = geocoder
        .resolve_address_lat_lng(address)
        .await
        .ok_or_else(|| anyhow!("Unable to resolve '{address}'"))?;
    println!("{pos}");
    Ok(())
}

async fn show(cfg: Config, carrier_ids: &[String], close: bool) -> Result<()> {
    let document = Rc::new(HeadlessDocument::default());
    let maps = Rc::new(HeadlessMapLibrary::default());
    let ports = Ports {
        document: document.clone(),
        runtime: Rc::new(TokioRuntime),
        pickup_points: Rc::new(PickupApi::new(&cfg.endpoint.base_url, cfg.endpoint.timeout)?),
        geocoder: Rc::new(geocoder(&cfg)?),
        assets: Rc::new(HttpAssetHost::new(cfg.endpoint.timeout)?),
        map_library: maps.clone(),
    };
    let settle_delay = cfg
        .widget
        .map
        .relayout_delays
        .iter()
        .copied()
        .chain(Some(cfg.widget.dialog.transition))
        .max()
        .unwrap_or_default()
        + SETTLE_MARGIN;
    let widget = PickupInfoWidget::new(ports, cfg.widget);

    let triggers = carrier_ids.iter().map(|id| {
        let widget = Rc::clone(&widget);
        async move { (id, widget.handle_trigger(Some(id.as_str())).await) }
    });
    let mut shown = None;
    for (id, result) in futures::future::join_all(triggers).await {
        match result {
            Ok(rendered) => {
                log_rendered(&rendered);
                shown = Some(rendered.carrier);
            }
            Err(Error::Superseded) => log::info!("Trigger '{id}' has been superseded"),
            Err(err) => log::warn!("Trigger '{id}' failed: {err}"),
        }
    }
    tokio::time::sleep(settle_delay).await;
    print_state(&document, &maps, shown);

    if close {
        widget.close();
        tokio::time::sleep(settle_delay).await;
        println!();
        print_state(&document, &maps, None);
        println!("live maps: {}", maps.live_maps());
    }
    Ok(())
}

fn log_rendered(rendered: &Rendered) {
    let Rendered { carrier, map } = rendered;
    log::info!("Rendered pickup point of carrier {carrier}: {map:?}");
}

fn print_state(document: &HeadlessDocument, maps: &HeadlessMapLibrary, carrier: Option<CarrierId>) {
    if let Some(carrier) = carrier {
        println!("carrier {carrier}");
    }
    println!("{document}");
    for map in maps.maps().iter().filter(|m| !m.removed) {
        println!("{map}");
    }
}
