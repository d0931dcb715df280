//! Terminal output

use xarcon_catalog::{format_price, Counters, GeoProperty};
use xarcon_core::{Origin, OriginMap, Property};

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn date(property: &Property) -> String {
    property
        .date_added
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Public listing table
pub fn listing_table(properties: &[&Property]) {
    if properties.is_empty() {
        println!("  No hay propiedades disponibles.");
        return;
    }

    println!(
        "  {:<28} {:<32} {:<16} {:>13}  {:<10} {}",
        "ID", "TITULO", "UBICACION", "PRECIO", "ESTADO", "FECHA"
    );
    for property in properties {
        println!(
            "  {:<28} {:<32} {:<16} {:>13}  {:<10} {}",
            truncate(&property.id, 28),
            truncate(&property.title, 32),
            truncate(&property.location, 16),
            format_price(property.price),
            property.status.label(),
            date(property)
        );
    }
    println!();
    println!("  {} propiedad(es)", properties.len());
}

/// Admin inventory, tagged by origin
pub fn inventory_table(properties: &[Property], origins: &OriginMap) {
    if properties.is_empty() {
        println!("  No hay propiedades disponibles.");
        return;
    }

    for property in properties {
        let origin = match origins.origin(&property.id) {
            Some(Origin::Default) => "default",
            Some(Origin::Custom) => "custom",
            Some(Origin::Shadowing) => "shadow",
            None => "?",
        };
        println!(
            "  [{:<7}] {:<28} {:<32} {:<14} {:>13}  {:<10} {}",
            origin,
            truncate(&property.id, 28),
            truncate(&property.title, 32),
            truncate(&property.agent, 14),
            format_price(property.price),
            property.status.label(),
            date(property)
        );
    }
}

pub fn property_detail(property: &Property) {
    println!("\n  {}", property.title);
    println!("  {}\n", "=".repeat(property.title.chars().count().max(4)));
    println!("  ID:           {}", property.id);
    println!("  Precio:       {}", format_price(property.price));
    println!("  Estado:       {}", property.status.label());
    println!("  Tipo:         {}", property.property_type);
    println!("  Ubicación:    {}", property.location);
    if !property.city.is_empty() {
        println!("  Ciudad:       {}", property.city);
    }
    if !property.address.is_empty() {
        println!("  Dirección:    {}", property.address);
    }
    println!(
        "  Habitaciones: {}   Baños: {}   Área: {} m²",
        property.bedrooms, property.bathrooms, property.area
    );
    if let Some((lat, lng)) = property.coordinates() {
        println!("  Coordenadas:  {:.6}, {:.6}", lat, lng);
    }
    println!("  Agente:       {}", property.agent);
    println!("  Publicada:    {}", date(property));

    let mut tags = Vec::new();
    if property.featured {
        tags.push("destacada");
    }
    if property.opportunity {
        tags.push("oportunidad");
    }
    if !tags.is_empty() {
        println!("  Etiquetas:    {}", tags.join(", "));
    }

    if !property.description.is_empty() {
        println!("\n  {}", property.description);
    }
    println!("\n  Imágenes ({}):", property.images.len());
    for image in &property.images {
        println!("    - {}", truncate(image, 72));
    }
    println!();
}

pub fn counters(counters: &Counters) {
    println!("  Total:       {}", counters.total);
    println!("  Vendidas:    {}", counters.sold);
    println!("  Disponibles: {}", counters.available);
}

/// One row per plotted listing
pub fn map_markers(markers: &[GeoProperty<'_>]) {
    for marker in markers {
        if let Some(position) = marker.coordinates {
            println!(
                "  {:>11.6} {:>11.6}  {:<32} {:<16} {:>13}  {}",
                position.lat,
                position.lng,
                truncate(&marker.property.title, 32),
                truncate(marker.city, 16),
                format_price(marker.property.price),
                marker.detail_href()
            );
        }
    }
}
