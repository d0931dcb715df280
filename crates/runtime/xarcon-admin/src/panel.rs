//! Admin write path
//!
//! Origins are classified once when the panel opens and refreshed after each
//! write. They decide where an edit or delete lands:
//!
//! | origin | edit | delete |
//! |---|---|---|
//! | `Default` | override patch | marker, override stripped |
//! | `Custom` | custom record replaced | custom record removed |
//! | `Shadowing` | custom record replaced, override dropped | both |
//!
//! Creates never reuse a static catalog id, so new writes do not produce
//! shadowing ids; older stored data may still carry them.

use chrono::{Local, NaiveDate};
use std::collections::HashSet;

use xarcon_catalog::{sort_properties, Catalog, Counters, SortOrder};
use xarcon_config::AdminConfig;
use xarcon_core::{normalize, slugify, Origin, OriginMap, Property, RawProperty, Status, DEFAULT_TYPE};

use crate::{generate_unique_id, AdminAuth, AdminError, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Edit,
}

/// The listing form
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    /// Requested id; blank lets the title decide
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub city: String,
    pub address: String,
    pub property_type: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub area: f64,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Status,
    pub featured: bool,
    pub opportunity: bool,
    /// Blank means the configured default agent
    pub agent: String,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            price: 0.0,
            location: String::new(),
            city: String::new(),
            address: String::new(),
            property_type: DEFAULT_TYPE.to_string(),
            bedrooms: 0.0,
            bathrooms: 0.0,
            area: 0.0,
            images: Vec::new(),
            latitude: None,
            longitude: None,
            status: Status::Available,
            featured: false,
            opportunity: false,
            agent: String::new(),
        }
    }
}

impl From<&Property> for ListingDraft {
    /// Prefill for editing
    fn from(property: &Property) -> Self {
        Self {
            id: property.id.clone(),
            title: property.title.clone(),
            description: property.description.clone(),
            price: property.price,
            location: property.location.clone(),
            city: property.city.clone(),
            address: property.address.clone(),
            property_type: property.property_type.clone(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area: property.area,
            images: property.images.clone(),
            latitude: property.latitude,
            longitude: property.longitude,
            status: property.status,
            featured: property.featured,
            opportunity: property.opportunity,
            agent: property.agent.clone(),
        }
    }
}

impl ListingDraft {
    fn into_property(self, id: String, date_added: NaiveDate, default_agent: &str) -> Property {
        let agent = match self.agent.trim() {
            "" => default_agent.to_string(),
            agent => agent.to_string(),
        };
        let mut property = Property {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            location: self.location.trim().to_string(),
            city: self.city.trim().to_string(),
            address: self.address.trim().to_string(),
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            images: self.images,
            latitude: self.latitude,
            longitude: self.longitude,
            date_added: Some(date_added),
            featured: self.featured,
            opportunity: self.opportunity,
            agent,
            ..Property::empty("")
        };
        property.set_status(self.status);
        property
    }
}

/// Authenticated write access to the catalog's stored state
pub struct AdminPanel {
    catalog: Catalog,
    auth: AdminAuth,
    origins: OriginMap,
    default_agent: String,
    today: Option<NaiveDate>,
}

impl AdminPanel {
    /// Requires an open session. Classifies origins up front.
    pub async fn open(catalog: Catalog, auth: AdminAuth, admin: &AdminConfig) -> Result<Self> {
        auth.require_auth()?;
        let origins = catalog.origins().await?;
        tracing::info!("Admin panel opened with {} known listings", origins.len());

        Ok(Self {
            catalog,
            auth,
            origins,
            default_agent: admin.default_agent.clone(),
            today: None,
        })
    }

    /// Stamp new listings with a fixed date instead of the local clock
    pub fn pin_date(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    /// Get the underlying catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Origins as of the last write
    pub fn origins(&self) -> &OriginMap {
        &self.origins
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Inventory, newest first
    pub async fn inventory(&self) -> Result<Vec<Property>> {
        let mut properties = self.catalog.properties().await?;
        sort_properties(&mut properties, SortOrder::Recent);
        Ok(properties)
    }

    /// Dashboard counters
    pub async fn counters(&self) -> Result<Counters> {
        Ok(Counters::of(&self.catalog.properties().await?))
    }

    /// Look up a listing in the merged catalog
    pub async fn find(&self, id: &str) -> Result<Property> {
        self.catalog
            .property(id)
            .await?
            .ok_or_else(|| AdminError::NotFound(id.to_string()))
    }

    /// Validate the form, pick the id and write the listing
    pub async fn submit(&mut self, mut draft: ListingDraft, mode: SubmitMode) -> Result<Property> {
        self.auth.require_auth()?;

        draft.images = draft
            .images
            .iter()
            .map(|image| image.trim())
            .filter(|image| !image.is_empty())
            .map(str::to_string)
            .collect();
        if draft.images.is_empty() {
            return Err(ValidationError::NoImages.into());
        }
        let requested = draft.id.trim().to_string();
        if requested.is_empty() && slugify(&draft.title).is_empty() {
            return Err(ValidationError::MissingId.into());
        }

        let snapshot = self.catalog.snapshot().await?;
        let property = match mode {
            SubmitMode::Create => {
                let used: HashSet<String> = snapshot
                    .properties
                    .iter()
                    .chain(&snapshot.baseline)
                    .chain(&snapshot.stored.custom)
                    .map(|p| p.id.clone())
                    .collect();
                let id = generate_unique_id(&draft.title, &used, &requested);
                if !requested.is_empty() && id != requested {
                    tracing::info!("Id {} is taken, using {}", requested, id);
                }
                let today = self.today();
                draft.into_property(id, today, &self.default_agent)
            }
            SubmitMode::Edit => {
                if requested.is_empty() {
                    return Err(ValidationError::MissingId.into());
                }
                let existing = snapshot
                    .properties
                    .iter()
                    .find(|p| p.id == requested)
                    .ok_or_else(|| AdminError::NotFound(requested.clone()))?;
                let date_added = existing.date_added.unwrap_or_else(|| self.today());
                draft.into_property(requested, date_added, &self.default_agent)
            }
        };

        self.save(property, mode).await
    }

    /// Flip sold/available
    pub async fn toggle_sold(&mut self, id: &str) -> Result<Property> {
        let mut property = self.find(id).await?;
        property.set_status(property.status.toggled());
        self.save(property, SubmitMode::Edit).await
    }

    /// Remove a listing from the public catalog
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.auth.require_auth()?;
        let origin = self
            .origins
            .origin(id)
            .ok_or_else(|| AdminError::NotFound(id.to_string()))?;

        let store = self.catalog.store();
        if origin.has_custom_record() {
            let mut custom = store.custom_properties();
            custom.retain(|p| p.id != id);
            store.set_custom_properties(&custom)?;
        }

        let mut overrides = store.overrides();
        if overrides.remove(id).is_some() {
            store.set_overrides(&overrides)?;
        }

        if origin.has_baseline_record() {
            let mut deleted = store.deleted_ids();
            deleted.insert(id.to_string());
            store.set_deleted_ids(&deleted)?;
        }

        tracing::info!("Deleted {:?} listing {}", origin, id);
        self.refresh_origins().await
    }

    /// Route a normalized record to its slot
    pub(crate) async fn save(&mut self, property: Property, mode: SubmitMode) -> Result<Property> {
        self.auth.require_auth()?;
        let property = normalize(RawProperty::Canonical(property));
        let id = property.id.clone();
        let store = self.catalog.store();

        let mut deleted = store.deleted_ids();
        deleted.remove(&id);

        match (mode, self.origins.origin(&id)) {
            (SubmitMode::Create, _) => {
                let mut custom = store.custom_properties();
                custom.retain(|p| p.id != id);
                custom.insert(0, property.clone());
                store.set_custom_properties(&custom)?;
                tracing::info!("Created listing {}", id);
            }
            (SubmitMode::Edit, Some(Origin::Default)) => {
                let mut overrides = store.overrides();
                overrides.insert(id.clone(), property.to_fields());
                store.set_overrides(&overrides)?;
                tracing::info!("Saved override for listing {}", id);
            }
            (SubmitMode::Edit, _) => {
                let mut custom = store.custom_properties();
                match custom.iter_mut().find(|p| p.id == id) {
                    Some(slot) => *slot = property.clone(),
                    None => custom.insert(0, property.clone()),
                }
                store.set_custom_properties(&custom)?;

                let mut overrides = store.overrides();
                if overrides.remove(&id).is_some() {
                    store.set_overrides(&overrides)?;
                }
                tracing::info!("Updated custom listing {}", id);
            }
        }

        store.set_deleted_ids(&deleted)?;
        self.refresh_origins().await?;
        Ok(property)
    }

    /// Reclassify after a write
    pub async fn refresh_origins(&mut self) -> Result<()> {
        self.origins = self.catalog.origins().await?;
        Ok(())
    }
}

impl std::fmt::Debug for AdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPanel")
            .field("catalog", &self.catalog)
            .field("origins", &self.origins.len())
            .finish()
    }
}
