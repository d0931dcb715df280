//! Xarcon CLI
//!
//! Browse the reconciled listing catalog and run the admin write path from
//! the terminal.

mod app;
mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xarcon_admin::{ListingDraft, SubmitMode};
use xarcon_catalog::{
    distinct_cities, distinct_types, featured, geo_properties, map_status, opportunities, recent,
    script_url, sort_properties, Bounds, Counters, ListingFilter, MapFilter, SortOrder,
};
use xarcon_core::{Property, Status};

use app::App;

#[derive(Parser)]
#[command(name = "xarcon")]
#[command(about = "Xarcon real-estate listings: catalog browser and admin panel")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $XARCON_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List published properties
    List {
        /// Free-text search over title, location and description
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long = "type")]
        property_type: Option<String>,

        /// available | sold
        #[arg(long)]
        status: Option<Status>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long)]
        featured: bool,

        #[arg(long)]
        opportunity: bool,

        /// recent | title | price-asc | price-desc
        #[arg(long, default_value = "recent")]
        sort: SortOrder,

        /// Only the N newest listings, as the home page shelf shows them
        #[arg(
            long,
            value_name = "N",
            conflicts_with_all = ["query", "city", "property_type", "status", "max_price", "featured", "opportunity", "sort"]
        )]
        recent: Option<usize>,
    },

    /// Show one property
    Show { id: String },

    /// Catalog counters
    Stats,

    /// Properties with coordinates, as the map page plots them
    Map {
        #[arg(long)]
        city: Option<String>,

        #[arg(long = "type")]
        property_type: Option<String>,

        #[arg(long)]
        max_price: Option<f64>,
    },

    /// Admin panel
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Open an admin session
    Login {
        #[arg(short, long, default_value = "admin")]
        user: String,

        #[arg(short, long)]
        password: String,
    },

    /// Close the admin session
    Logout,

    /// Session state and inventory
    Status,

    /// Change the admin username and password
    Passwd {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create a listing
    Add(ListingFields),

    /// Edit a listing; unset fields keep their current value
    Edit {
        id: String,

        #[command(flatten)]
        fields: ListingFields,
    },

    /// Flip a listing between sold and available
    ToggleSold { id: String },

    /// Remove a listing from the public catalog
    Delete { id: String },

    /// Pin a listing on the map
    SetCoords {
        id: String,

        #[arg(long, allow_negative_numbers = true, required_unless_present = "clear")]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true, required_unless_present = "clear")]
        lng: Option<f64>,

        /// Remove the pin instead
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        clear: bool,
    },
}

#[derive(Args)]
struct ListingFields {
    /// Preferred id; taken ids fall back to the title slug
    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    price: Option<f64>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    address: Option<String>,

    #[arg(long = "type")]
    property_type: Option<String>,

    #[arg(long)]
    bedrooms: Option<f64>,

    #[arg(long)]
    bathrooms: Option<f64>,

    #[arg(long)]
    area: Option<f64>,

    #[arg(long)]
    description: Option<String>,

    /// Image file or URL, repeatable; replaces the current images
    #[arg(long = "image")]
    images: Vec<String>,

    #[arg(long)]
    status: Option<Status>,

    #[arg(long)]
    featured: Option<bool>,

    #[arg(long)]
    opportunity: Option<bool>,

    #[arg(long)]
    agent: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    lng: Option<f64>,
}

impl ListingFields {
    /// Overlay the given fields; images are handled by the caller
    fn apply(self, draft: &mut ListingDraft) -> Vec<String> {
        if let Some(id) = self.id {
            draft.id = id;
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(city) = self.city {
            draft.city = city;
        }
        if let Some(address) = self.address {
            draft.address = address;
        }
        if let Some(property_type) = self.property_type {
            draft.property_type = property_type;
        }
        if let Some(bedrooms) = self.bedrooms {
            draft.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            draft.bathrooms = bathrooms;
        }
        if let Some(area) = self.area {
            draft.area = area;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(featured) = self.featured {
            draft.featured = featured;
        }
        if let Some(opportunity) = self.opportunity {
            draft.opportunity = opportunity;
        }
        if let Some(agent) = self.agent {
            draft.agent = agent;
        }
        if self.lat.is_some() {
            draft.latitude = self.lat;
        }
        if self.lng.is_some() {
            draft.longitude = self.lng;
        }
        self.images
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "xarcon=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let app = App::load(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::List {
            query,
            city,
            property_type,
            status,
            max_price,
            featured,
            opportunity,
            sort,
            recent: newest,
        } => {
            let filter = ListingFilter {
                query,
                city,
                property_type,
                status,
                max_price,
                featured_only: featured,
                opportunity_only: opportunity,
            };
            cmd_list(&app, filter, sort, newest, json).await
        }
        Commands::Show { id } => cmd_show(&app, &id, json).await,
        Commands::Stats => cmd_stats(&app, json).await,
        Commands::Map {
            city,
            property_type,
            max_price,
        } => {
            let filter = MapFilter {
                city,
                property_type,
                max_price,
            };
            cmd_map(&app, filter, json).await
        }
        Commands::Admin { command } => cmd_admin(&app, command, json).await,
    }
}

async fn catalog_properties(app: &App) -> Result<Vec<Property>> {
    app.catalog()
        .properties()
        .await
        .context("No se pudieron cargar las propiedades")
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_list(
    app: &App,
    filter: ListingFilter,
    sort: SortOrder,
    newest: Option<usize>,
    json: bool,
) -> Result<()> {
    let properties = catalog_properties(app).await?;
    let hits = match newest {
        Some(limit) => recent(&properties, limit),
        None => {
            let mut hits = filter.apply(&properties);
            sort_properties(&mut hits, sort);
            hits
        }
    };

    if json {
        return print_json(&hits);
    }
    render::listing_table(&hits);
    Ok(())
}

async fn cmd_show(app: &App, id: &str, json: bool) -> Result<()> {
    let property = app
        .catalog()
        .property(id)
        .await
        .context("No se pudieron cargar las propiedades")?
        .with_context(|| format!("Propiedad no encontrada: {id}"))?;

    if json {
        return print_json(&property);
    }
    render::property_detail(&property);
    Ok(())
}

async fn cmd_stats(app: &App, json: bool) -> Result<()> {
    let properties = catalog_properties(app).await?;
    let counters = Counters::of(&properties);
    let featured_count = featured(&properties).len();
    let opportunity_count = opportunities(&properties).len();

    if json {
        return print_json(&serde_json::json!({
            "total": counters.total,
            "sold": counters.sold,
            "available": counters.available,
            "featured": featured_count,
            "opportunities": opportunity_count,
        }));
    }

    println!("\n  XARCON CATALOG");
    println!("  ==============\n");
    render::counters(&counters);
    println!("  Destacadas:  {}", featured_count);
    println!("  Oportunidad: {}", opportunity_count);
    println!();
    Ok(())
}

async fn cmd_map(app: &App, filter: MapFilter, json: bool) -> Result<()> {
    let properties = catalog_properties(app).await?;
    let geos = geo_properties(&properties);
    let markers = filter.apply(&geos);
    let bounds = Bounds::around(markers.iter().filter_map(|m| m.coordinates));
    let view = &app.config.maps.public_view;
    let widget = script_url(&app.config.maps);

    if json {
        let markers: Vec<_> = markers
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.property.id,
                    "title": m.property.title,
                    "city": m.city,
                    "address": m.address,
                    "price": m.property.price,
                    "type": m.property.property_type,
                    "position": m.coordinates,
                    "image": m.image(),
                    "href": m.detail_href(),
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "status": map_status(markers.len()),
            "center": bounds.map(|b| b.center()),
            "bounds": bounds,
            "default_view": { "lat": view.lat, "lng": view.lng, "zoom": view.zoom },
            "script_url": widget.as_ref().ok().map(|u| u.to_string()),
            "cities": distinct_cities(&geos),
            "types": distinct_types(&geos),
            "markers": markers,
        }));
    }

    println!("\n  {}\n", map_status(markers.len()));
    render::map_markers(&markers);
    println!();
    match bounds {
        Some(b) => {
            let center = b.center();
            println!("  Centro: {:.6}, {:.6}", center.lat, center.lng);
        }
        None => println!("  Centro: {:.6}, {:.6} (zoom {})", view.lat, view.lng, view.zoom),
    }
    println!("  Ciudades: {}", distinct_cities(&geos).join(", "));
    println!("  Tipos:    {}", distinct_types(&geos).join(", "));
    match widget {
        Ok(url) => println!("  Widget:   {}", url),
        Err(e) => println!("  Widget:   no disponible ({})", e),
    }
    Ok(())
}

async fn cmd_admin(app: &App, command: AdminCommands, json: bool) -> Result<()> {
    match command {
        AdminCommands::Login { user, password } => {
            app.auth().login(&user, &password)?;
            println!("  Sesión iniciada.");
            Ok(())
        }
        AdminCommands::Logout => {
            app.auth().logout()?;
            println!("  Sesión cerrada.");
            Ok(())
        }
        AdminCommands::Status => {
            let panel = app.panel().await?;
            let inventory = panel.inventory().await?;
            let counters = Counters::of(&inventory);

            if json {
                return print_json(&serde_json::json!({
                    "authenticated": true,
                    "counters": counters,
                    "inventory": inventory,
                }));
            }
            println!("\n  ADMIN");
            println!("  =====\n");
            render::counters(&counters);
            println!();
            render::inventory_table(&inventory, panel.origins());
            Ok(())
        }
        AdminCommands::Passwd { user, password } => {
            app.auth().change_credentials(&user, &password)?;
            println!("  Credenciales actualizadas.");
            Ok(())
        }
        AdminCommands::Add(fields) => {
            let mut panel = app.panel().await?;
            let mut draft = ListingDraft::default();
            let images = fields.apply(&mut draft);
            draft.images = ingest(app, &images).await;

            let saved = panel.submit(draft, SubmitMode::Create).await?;
            report_saved(&saved, json)
        }
        AdminCommands::Edit { id, fields } => {
            let mut panel = app.panel().await?;
            let mut draft = ListingDraft::from(&panel.find(&id).await?);
            let images = fields.apply(&mut draft);
            draft.id = id;
            if !images.is_empty() {
                draft.images = ingest(app, &images).await;
            }

            let saved = panel.submit(draft, SubmitMode::Edit).await?;
            report_saved(&saved, json)
        }
        AdminCommands::ToggleSold { id } => {
            let mut panel = app.panel().await?;
            let saved = panel.toggle_sold(&id).await?;
            println!("  Estado actualizado: {} → {}", saved.id, saved.status.label());
            Ok(())
        }
        AdminCommands::Delete { id } => {
            let mut panel = app.panel().await?;
            panel.delete(&id).await?;
            println!("  Propiedad eliminada del catálogo público: {}", id);
            Ok(())
        }
        AdminCommands::SetCoords { id, lat, lng, clear } => {
            let mut panel = app.panel().await?;
            let position = if clear { None } else { lat.zip(lng) };
            let saved = panel.set_coordinates(&id, position).await?;
            let view = &app.config.maps.editor_view;
            match saved.coordinates() {
                Some((lat, lng)) => println!("  Ubicación guardada: {:.6}, {:.6}", lat, lng),
                None => println!(
                    "  Ubicación eliminada. El editor abre en {:.6}, {:.6} (zoom {}).",
                    view.lat, view.lng, view.zoom
                ),
            }
            Ok(())
        }
    }
}

async fn ingest(app: &App, sources: &[String]) -> Vec<String> {
    let ingestor = app.ingestor();
    let report = ingestor.ingest(sources).await;
    if !sources.is_empty() {
        eprintln!("  {}", report.summary(ingestor.max_bytes()).replace('\n', "\n  "));
    }
    report.images
}

fn report_saved(saved: &Property, json: bool) -> Result<()> {
    if json {
        return print_json(saved);
    }
    println!("  Propiedad guardada correctamente: {}", saved.id);
    Ok(())
}
