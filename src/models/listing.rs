//! Property listing records and the typed import boundary.
//!
//! Listings originate from an external provider (Argenprop). The provider
//! payload is deserialized into [`ArgenpropNotice`] with explicit field
//! types before anything touches storage; a payload that does not match the
//! expected shape fails the import instead of leaking a loose JSON value
//! into persistence.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AgentId, ImageId, PropertyId};

/// Visibility status of an imported posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostingStatus {
    Active,
    Inactive,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::Active => "ACTIVE",
            PostingStatus::Inactive => "INACTIVE",
        }
    }
}

/// Imported property listing owned by one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PropertyId,
    /// Listing identifier on the provider side; import dedup key.
    pub source_listing_id: String,
    pub title: String,
    pub operation_type: String,
    pub amount: i64,
    pub amount_currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expensas: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expensas_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub status: PostingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realestate_type_name: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covered_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncovered_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garages: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub has_video: bool,
    pub has_tour: bool,
    pub has_plans: bool,
    pub reserved: bool,
    pub source: String,
    pub publisher_id: AgentId,
}

/// Image attached to a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingImage {
    pub id: ImageId,
    pub listing_id: PropertyId,
    pub url: String,
    pub order_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// Provider media type discriminants.
pub const MEDIA_TYPE_PHOTO: i32 = 1;
pub const MEDIA_TYPE_VIDEO: i32 = 2;
pub const MEDIA_TYPE_TOUR: i32 = 3;
pub const MEDIA_TYPE_PLANS: i32 = 4;

/// One multimedia entry on a provider notice.
#[derive(Debug, Clone, Deserialize)]
pub struct NoticeMedia {
    #[serde(rename = "IdTipoMultimedia")]
    pub media_type: i32,
    #[serde(rename = "Large")]
    pub large: Option<String>,
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(rename = "Orden")]
    pub order: Option<i32>,
}

/// Provider notice payload, field-for-field.
///
/// Required fields here are required on the wire; a notice missing any of
/// them fails deserialization and therefore the whole import.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgenpropNotice {
    #[serde(rename = "IdAviso")]
    pub notice_id: i64,
    #[serde(rename = "Titulo_t")]
    pub title: String,
    #[serde(rename = "TipoOperacion_t")]
    pub operation_type: String,
    #[serde(rename = "MontoOperacion_i")]
    pub amount: i64,
    #[serde(rename = "MonedaSimbolo_t")]
    pub currency: String,
    #[serde(rename = "Expensas_i")]
    pub expensas: Option<i64>,
    #[serde(rename = "MonedaSimboloExpensas_t")]
    pub expensas_currency: Option<String>,
    #[serde(rename = "InformacionAdicional_t")]
    pub additional_info: Option<String>,
    #[serde(rename = "Direccion_NombreCalle_t")]
    pub street_name: Option<String>,
    #[serde(rename = "Direccion_Numero_i")]
    pub street_number: Option<i64>,
    #[serde(rename = "Direccion_Latitud_d")]
    pub latitude: Option<f64>,
    #[serde(rename = "Direccion_Longitud_d")]
    pub longitude: Option<f64>,
    #[serde(rename = "Visible_b")]
    pub visible: bool,
    #[serde(rename = "TipoPropiedad_t")]
    pub property_type: Option<String>,
    #[serde(rename = "DescripcionSeo_t")]
    pub seo_description: String,
    #[serde(rename = "TelefonoContacto_t")]
    pub contact_phone: Option<String>,
    #[serde(rename = "FechaPublicacionAviso_dt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "FechaModificacionAviso_dt")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(rename = "SuperficieCubierta_d")]
    pub covered_area: Option<f64>,
    #[serde(rename = "SuperficieTotal_d")]
    pub total_area: Option<f64>,
    #[serde(rename = "SuperficieDesCubierta_d")]
    pub uncovered_area: Option<f64>,
    #[serde(rename = "CantidadAmbientes_i")]
    pub rooms: Option<i32>,
    #[serde(rename = "CantidadDormitorios_i")]
    pub bedrooms: Option<i32>,
    #[serde(rename = "CantidadBanos_i")]
    pub bathrooms: Option<i32>,
    #[serde(rename = "CantidadCocheras_i")]
    pub garages: Option<i32>,
    #[serde(rename = "Piso_t")]
    pub floor: Option<String>,
    #[serde(rename = "Departamento_t")]
    pub unit: Option<String>,
    #[serde(rename = "Barrio_t")]
    pub neighborhood: Option<String>,
    #[serde(rename = "Partido_t")]
    pub city: Option<String>,
    #[serde(rename = "Provincia_t")]
    pub state: Option<String>,
    #[serde(rename = "Pais_t")]
    pub country: Option<String>,
    #[serde(rename = "Multimedia_s", default)]
    pub media: Vec<NoticeMedia>,
}

/// Parse a provider notice from its JSON body.
pub fn parse_notice_json(body: &str) -> Result<ArgenpropNotice> {
    serde_json::from_str(body).context("Notice payload does not match the expected shape")
}

impl ArgenpropNotice {
    fn has_media_of_type(&self, media_type: i32) -> bool {
        self.media.iter().any(|m| m.media_type == media_type)
    }

    /// Street name and number joined into a display address, if any part is
    /// present.
    fn address(&self) -> Option<String> {
        let street = self.street_name.as_deref().unwrap_or("");
        let number = self
            .street_number
            .map(|n| n.to_string())
            .unwrap_or_default();
        let joined = format!("{} {}", street, number).trim().to_string();
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    /// Map the notice into a posting record for the given publisher.
    pub fn to_posting(
        &self,
        source_listing_id: &str,
        publisher_id: AgentId,
    ) -> Posting {
        let status = if self.visible {
            PostingStatus::Active
        } else {
            PostingStatus::Inactive
        };

        Posting {
            id: PropertyId::generate(),
            source_listing_id: source_listing_id.to_string(),
            title: self.title.clone(),
            operation_type: self.operation_type.clone(),
            amount: self.amount,
            amount_currency: self.currency.clone(),
            expensas: self.expensas,
            expensas_currency: self.expensas_currency.clone(),
            description: self.additional_info.clone(),
            address: self.address(),
            latitude: self.latitude,
            longitude: self.longitude,
            status,
            realestate_type_name: self.property_type.clone(),
            url: format!("https://www.argenprop.com/{}", self.seo_description),
            whatsapp: self.contact_phone.clone(),
            created_date: self.published_at,
            modified_date: self.modified_at,
            covered_area: self.covered_area,
            total_area: self.total_area,
            uncovered_area: self.uncovered_area,
            rooms: self.rooms,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            garages: self.garages,
            floor: self.floor.clone(),
            unit: self.unit.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            has_video: self.has_media_of_type(MEDIA_TYPE_VIDEO),
            has_tour: self.has_media_of_type(MEDIA_TYPE_TOUR),
            has_plans: self.has_media_of_type(MEDIA_TYPE_PLANS),
            reserved: !self.visible,
            source: "argenprop".to_string(),
            publisher_id,
        }
    }

    /// Image rows for a posting: photos only, preferring the large rendition,
    /// ordered by the provider's ordering with the list position as fallback.
    pub fn to_images(&self, listing_id: PropertyId) -> Vec<ListingImage> {
        self.media
            .iter()
            .filter(|m| m.media_type == MEDIA_TYPE_PHOTO)
            .enumerate()
            .map(|(index, media)| ListingImage {
                id: ImageId::generate(),
                listing_id,
                url: media.large.clone().unwrap_or_else(|| media.url.clone()),
                order_index: media.order.unwrap_or(index as i32),
                width: None,
                height: None,
                title: None,
            })
            .collect()
    }
}
