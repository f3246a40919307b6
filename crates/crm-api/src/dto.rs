//! Wire DTOs. Field names follow the original ingestion contract
//! (`firstName`, `number`, `selectedPaket`, ...), so existing callers keep
//! working unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crm_core::{domain::Client, registry::Stats};

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(rename = "selectedPaket", default)]
    pub selected_paket: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientDto {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub number: String,
    #[serde(rename = "selectedPaket")]
    pub selected_paket: String,
    #[serde(rename = "paketPrice")]
    pub paket_price: i64,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "paidDate")]
    pub paid_date: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

impl From<&Client> for ClientDto {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id.as_str().to_string(),
            first_name: c.first_name.clone(),
            number: c.phone.clone(),
            selected_paket: c.package_code.clone(),
            paket_price: c.price,
            status: c.status.as_str().to_string(),
            created_at: c.created_at,
            paid_date: c.paid_at,
            comment: c.comment.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    #[serde(rename = "totalClients")]
    pub total_clients: usize,
    #[serde(rename = "paidClients")]
    pub paid_clients: usize,
    #[serde(rename = "pendingClients")]
    pub pending_clients: usize,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: i64,
    #[serde(rename = "monthRevenue")]
    pub month_revenue: i64,
}

impl From<&Stats> for StatsDto {
    fn from(s: &Stats) -> Self {
        Self {
            total_clients: s.total_clients,
            paid_clients: s.paid_clients,
            pending_clients: s.pending_clients,
            total_revenue: s.total_revenue,
            month_revenue: s.month_revenue,
        }
    }
}
