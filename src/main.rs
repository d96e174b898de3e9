//! Terminal client for the "scan - pay - charge" EV charging flow.
//! Reads configuration from TOML file (~/.config/ampay-checkout/config.toml).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use fluent::fluent_args;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use ampay_checkout::application::checkout::CheckoutService;
use ampay_checkout::application::poller::{
    PollerConfig, SessionPoller, SessionStatus, SessionView,
};
use ampay_checkout::application::receipt::{self, ReceiptService};
use ampay_checkout::application::resolver::LocationResolver;
use ampay_checkout::config::AppConfig;
use ampay_checkout::domain::location::LocationBundle;
use ampay_checkout::domain::pricing::{CostInput, CostSummary};
use ampay_checkout::domain::receipt::{ReceiptLine, ReceiptSummary};
use ampay_checkout::shared::errors::FlowError;
use ampay_checkout::shared::format;
use ampay_checkout::shared::locale::{Language, Locale};
use ampay_checkout::{default_config_path, ApiClient, SharedCheckoutApi};

/// Ampay checkout client for public EV charging.
#[derive(Parser, Debug)]
#[command(
    name = "ampay-checkout",
    version,
    about = "Scan - pay - charge client for public EV charging",
    long_about = "Resolve a scanned charge point, start a payment checkout, \
                  follow the charging session and fetch the receipt.\n\n\
                  Default config: ~/.config/ampay-checkout/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "AMPAY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the backend base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a charge point and start a payment checkout for it.
    Checkout {
        /// Public EVSE identifier from the QR code.
        evse_id: String,

        /// Accept the operator's payment terms.
        #[arg(long)]
        accept_terms: bool,
    },

    /// Follow a charging session until it ends.
    Charge {
        /// Public EVSE identifier from the QR code.
        evse_id: String,

        /// Checkout session id from the payment redirect.
        session_id: i64,
    },

    /// Fetch the receipt of a closed session.
    Receipt {
        /// Checkout session id.
        session_id: i64,

        /// Also write the signed metering record (OCMF) into this directory.
        #[arg(long)]
        ocmf_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            // Initialize logging with configured level
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    // ── Apply environment and CLI overrides ────────────────────
    app_cfg.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(url) = cli.api_url {
        info!("CLI override: api_url = {}", url);
        app_cfg.api.base_url = url;
    }

    let language = app_cfg
        .locale
        .language
        .as_deref()
        .map(Language::from_tag)
        .unwrap_or_else(Language::detect);
    let locale = Locale::new(language)?;

    // Without a subcommand there is nothing to do but explain ourselves.
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let api: SharedCheckoutApi = Arc::new(ApiClient::new(&app_cfg.api)?);

    match command {
        Command::Checkout {
            evse_id,
            accept_terms,
        } => run_checkout(api, &app_cfg, &locale, &evse_id, accept_terms).await?,
        Command::Charge {
            evse_id,
            session_id,
        } => run_charge(api, &app_cfg, &locale, &evse_id, session_id).await?,
        Command::Receipt {
            session_id,
            ocmf_dir,
        } => run_receipt(api, &locale, session_id, ocmf_dir.as_deref()).await?,
    }

    Ok(())
}

// ── Checkout ───────────────────────────────────────────────────────────

async fn run_checkout(
    api: SharedCheckoutApi,
    cfg: &AppConfig,
    locale: &Locale,
    evse_id: &str,
    accept_terms: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = LocationResolver::new(api.clone());
    let bundle = match resolver.resolve(evse_id).await {
        Ok(bundle) => bundle,
        Err(e) => {
            // An unresolvable charge point sends the user back to the start.
            error!("Could not resolve {}: {}", evse_id, e);
            println!(
                "{}",
                locale.message(e.detail().unwrap_or("global-error-generic"))
            );
            return Ok(());
        }
    };

    print_charge_point(&bundle);
    println!();
    println!("{}", bundle.address_line());
    println!(
        "{}: {}",
        locale.message("checkout-operator"),
        bundle.operator.as_deref().unwrap_or("-")
    );

    let tariff = &bundle.tariff;
    let symbol = format::currency_symbol(&tariff.currency);
    println!("{}:", locale.message("checkout-tariffinfo"));
    if let Some(net) = tariff.price_kwh {
        println!(
            "  {}: {:.2} {} ({})",
            locale.message("checkout-pricekwh"),
            tariff.gross_price(net),
            symbol,
            locale.message("checkout-inclvat")
        );
    }
    if let Some(net) = tariff.price_min {
        println!(
            "  {}: {:.2} {} ({})",
            locale.message("checkout-pricemin"),
            tariff.gross_price(net),
            symbol,
            locale.message("checkout-inclvat")
        );
    }
    if let Some(net) = tariff.price_session {
        println!(
            "  {}: {:.2} {} ({})",
            locale.message("checkout-pricesession"),
            tariff.gross_price(net),
            symbol,
            locale.message("checkout-inclvat")
        );
    }
    if let Some(amount) = tariff.authorization_amount {
        let args = fluent_args!["amount" => format!("{amount:.2} {symbol}")];
        println!("{}", locale.format("checkout-authinfo", Some(&args)));
    }

    let service = CheckoutService::new(api, cfg.public.base_url.clone());
    match service.start(evse_id, accept_terms).await {
        Ok(created) => {
            println!();
            println!("{}", locale.message("checkout-connect-vehicle"));
            println!("{}: {}", locale.message("checkout-button-checkout"), created.url);
        }
        Err(FlowError::Validation(key)) => {
            // Inline form error; nothing was sent to the backend.
            println!();
            println!("{}", locale.message(&key));
        }
        Err(FlowError::Api(e)) => {
            error!("Checkout failed: {}", e);
            println!(
                "{}",
                locale.message(e.detail().unwrap_or("global-error-generic"))
            );
        }
    }

    Ok(())
}

// ── Charging ───────────────────────────────────────────────────────────

async fn run_charge(
    api: SharedCheckoutApi,
    cfg: &AppConfig,
    locale: &Locale,
    evse_id: &str,
    session_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    // The charging view still works when the location details are
    // unavailable; the session itself is what matters here.
    let resolver = LocationResolver::new(api.clone());
    let bundle = match resolver.resolve(evse_id).await {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            warn!("Could not resolve {}: {}", evse_id, e);
            None
        }
    };
    if let Some(bundle) = &bundle {
        print_charge_point(bundle);
    }
    println!("{}", locale.message("charging-authorized-waiting"));
    println!("[Enter] {}", locale.message("charging-refresh"));

    let poller_config = PollerConfig {
        poll_interval: Duration::from_secs(cfg.poller.poll_interval_secs),
        retry_delay: Duration::from_secs(cfg.poller.retry_delay_secs),
        max_not_found_retries: cfg.poller.max_not_found_retries,
    };
    let handle = SessionPoller::new(api, poller_config, session_id).start();
    let mut updates = handle.subscribe();

    // Plain thread for the refresh key; a blocked terminal read must not
    // keep the runtime from shutting down once the session ends.
    let (key_tx, mut key_presses) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if line.is_err() || key_tx.send(()).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Leaving the charging view");
                handle.stop().await;
                break;
            }
            Some(()) = key_presses.recv() => handle.refresh(),
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                render_charging(&view, bundle.as_ref(), locale);
                if view.status.is_terminal() {
                    handle.stop().await;
                    break;
                }
            }
        }
    }

    Ok(())
}

fn render_charging(view: &SessionView, bundle: Option<&LocationBundle>, locale: &Locale) {
    println!();
    let caption = match view.status {
        SessionStatus::Waiting => locale.message("charging-authorized-waiting"),
        SessionStatus::Charging => match view.power_kw {
            Some(kw) => format!("{}: {} kW", locale.message("charging-speed"), kw),
            None => locale.message("charging-speed"),
        },
        SessionStatus::Rejected => locale.message("charging-rejected"),
        SessionStatus::Closed => locale.message("charging-finished"),
        SessionStatus::Error => {
            locale.message(view.status_message.as_deref().unwrap_or("global-error-generic"))
        }
    };
    println!("{caption}");

    let stamp = view
        .last_update
        .map(format::format_timestamp)
        .unwrap_or_else(|| "-".to_string());
    println!("{}: {}", locale.message("charging-lastupdate"), stamp);

    if view.status == SessionStatus::Rejected {
        println!("{}", locale.message("charging-dontworry"));
        println!("{}", locale.message("charging-tryagain"));
        return;
    }

    let costs = if let Some(pricing) = &view.pricing {
        format!(
            "{} {}",
            format::format_amount(Decimal::new(pricing.total_costs_gross, 2)),
            pricing.currency
        )
    } else if matches!(view.status, SessionStatus::Charging | SessionStatus::Closed) {
        estimated_costs(view, bundle)
            .map(|(amount, currency)| {
                format!(
                    "{} {} ({})",
                    format::format_amount(amount),
                    currency,
                    locale.message("charging-costs-estimated")
                )
            })
            .unwrap_or_else(|| "-".to_string())
    } else {
        "-".to_string()
    };
    println!(
        "{} ({}): {}",
        locale.message("charging-costs"),
        locale.message("checkout-inclvat"),
        costs
    );

    println!(
        "{}: {}",
        locale.message("charging-time"),
        format::format_hms(view.charging_seconds)
    );
    println!(
        "{}: {} kWh",
        locale.message("charging-energy"),
        view.energy_kwh.unwrap_or(0.0)
    );
    if let Some(soc) = view.soc_percent {
        println!("{}: {} %", locale.message("charging-soc"), soc);
        println!("{}", locale.message("charging-soc-infotext"));
    }
}

/// Running-cost estimate from the tariff while the backend has not
/// attached a pricing snapshot yet.
fn estimated_costs(view: &SessionView, bundle: Option<&LocationBundle>) -> Option<(Decimal, String)> {
    let tariff = &bundle?.tariff;
    let now = chrono::Utc::now();
    let input = CostInput {
        kwh: view.energy_kwh,
        start_time: Some(now - chrono::Duration::seconds(view.charging_seconds)),
        end_time: Some(now),
        currency: tariff.currency.clone(),
        tax_rate: tariff.tax_rate,
        payment_fee: 0.0,
        price_kwh: tariff.price_kwh,
        price_min: tariff.price_min,
        price_session: tariff.price_session,
    };
    let summary = CostSummary::derive(&input, now);
    Some((summary.total_costs_gross, summary.currency))
}

// ── Receipt ────────────────────────────────────────────────────────────

async fn run_receipt(
    api: SharedCheckoutApi,
    locale: &Locale,
    session_id: i64,
    ocmf_dir: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = ReceiptService::new(api);
    let summary = match service.fetch(session_id).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("No receipt for session {}: {}", session_id, e);
            println!(
                "{}",
                locale.message(e.detail().unwrap_or("global-error-generic"))
            );
            return Ok(());
        }
    };

    render_receipt(&summary, locale);

    if let Some(dir) = ocmf_dir {
        match receipt::save_ocmf(&summary, dir)? {
            Some(path) => println!("OCMF: {}", path.display()),
            None => println!("OCMF: -"),
        }
    }

    Ok(())
}

fn render_receipt(summary: &ReceiptSummary, locale: &Locale) {
    let dash = || "-".to_string();

    println!("AMPAY");
    println!("SCAN - PAY - CHARGE");
    println!();
    println!("{}:", locale.message("receipt-sessiondetails"));
    println!(
        "  ID: {}",
        summary.session_id.map(|id| id.to_string()).unwrap_or_else(dash)
    );
    println!("  EVSE: {}", summary.evse_id.as_deref().unwrap_or("-"));
    println!(
        "  {}: {}",
        locale.message("checkout-operator"),
        summary.operator.as_deref().unwrap_or("-")
    );
    println!(
        "  {}: {}",
        locale.message("receipt-starttime"),
        summary.start_time.map(format::format_datetime).unwrap_or_else(dash)
    );
    println!(
        "  {}: {}",
        locale.message("receipt-stoptime"),
        summary.end_time.map(format::format_datetime).unwrap_or_else(dash)
    );
    println!(
        "  {}: {}",
        locale.message("receipt-address"),
        summary.address_line
    );
    if let Some(kwh) = summary.meter_start_kwh {
        println!(
            "  {}: {} kWh",
            locale.message("receipt-meterstart"),
            format::format_amount(kwh)
        );
    }
    if let Some(kwh) = summary.meter_stop_kwh {
        println!(
            "  {}: {} kWh",
            locale.message("receipt-meterstop"),
            format::format_amount(kwh)
        );
    }

    println!();
    println!(
        "{} ({}):",
        locale.message("receipt-sessioncosts"),
        summary.currency
    );
    println!(
        "  {:<10} {:>12} {:>12} {:>12}",
        "",
        locale.message("receipt-measuredvalue"),
        locale.message("receipt-unitprice"),
        locale.message("receipt-netprice")
    );
    print_receipt_line("Session", &summary.session_line);
    print_receipt_line(&locale.message("receipt-consumption"), &summary.energy_line);
    print_receipt_line(&locale.message("receipt-time"), &summary.time_line);
    println!(
        "  {:<36} {:>12}",
        locale.message("receipt-totalnet"),
        format::format_amount(summary.total_net)
    );
    println!(
        "  {:<36} {:>12}",
        format!("{} ({}%)", locale.message("receipt-vat"), summary.tax_rate),
        format::format_amount(summary.vat)
    );
    println!(
        "  {:<36} {:>12}",
        locale.message("receipt-totalgross"),
        format::format_amount(summary.total_gross)
    );
    if let Some(discount) = summary.discount {
        println!(
            "  {:<36} {:>12}",
            locale.message("receipt-discount"),
            format::format_amount(discount)
        );
        println!(
            "  {:<36} {:>12}",
            locale.message("receipt-finalpricing"),
            format::format_amount(summary.final_total)
        );
    }

    println!();
    println!("{}", locale.message("receipt-enjoyedcharging"));
    println!(
        "{}: {}",
        locale.message("receipt-problemsoperator"),
        summary.operator.as_deref().unwrap_or("-")
    );
    println!("{}", locale.message("receipt-footermsg"));
}

fn print_receipt_line(label: &str, line: &ReceiptLine) {
    let unit = line
        .unit_price
        .map(format::format_amount)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<10} {:>12} {:>12} {:>12}",
        label,
        line.quantity,
        unit,
        format::format_amount(line.net_amount)
    );
}

fn print_charge_point(bundle: &LocationBundle) {
    let power = bundle
        .max_power_kw()
        .map(|kw| format!("max. {kw} kW"))
        .unwrap_or_else(|| "-".to_string());
    println!("{} | {} | {}", bundle.evse_id, bundle.power_type, power);
}
