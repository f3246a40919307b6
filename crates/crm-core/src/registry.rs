use chrono::{DateTime, Datelike, Utc};

use crate::{
    catalog::Catalog,
    domain::{Client, ClientId, ClientStatus},
    errors::Error,
    Result,
};

/// Input for client creation, as received from the ingestion endpoint.
#[derive(Clone, Debug, Default)]
pub struct NewClient {
    pub first_name: String,
    pub phone: String,
    pub package_code: String,
    pub comment: Option<String>,
}

/// Revenue/statistics view derived from the registry.
#[derive(Clone, Debug)]
pub struct Stats {
    pub total_clients: usize,
    pub paid_clients: usize,
    pub pending_clients: usize,
    pub total_revenue: i64,
    pub month_revenue: i64,
    pub per_package: Vec<PackageStats>,
    /// Up to three paid clients by price descending, ties kept in registry order.
    pub top_clients: Vec<Client>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageStats {
    pub code: String,
    pub count: usize,
    pub revenue: i64,
}

/// The authoritative, append-mostly client store.
///
/// Records live in insertion (creation) order and are never deleted. The
/// registry owns the package catalog so price snapshots are taken at the
/// single point of creation.
#[derive(Debug)]
pub struct ClientRegistry {
    catalog: Catalog,
    clients: Vec<Client>,
}

impl ClientRegistry {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            clients: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Append a new pending client. The price is snapshotted from the catalog
    /// now and is immune to later catalog changes.
    pub fn create(&mut self, new: NewClient, now: DateTime<Utc>) -> Result<&Client> {
        if new.first_name.trim().is_empty()
            || new.phone.trim().is_empty()
            || new.package_code.trim().is_empty()
        {
            return Err(Error::Validation(
                "firstName, number and selectedPaket are required".to_string(),
            ));
        }

        let package = self.catalog.get(&new.package_code).ok_or_else(|| {
            Error::Validation(format!(
                "unknown package '{}', available: {}",
                new.package_code,
                self.catalog.codes().join(", ")
            ))
        })?;

        let client = Client {
            id: ClientId::generate(),
            first_name: new.first_name,
            phone: new.phone,
            package_code: package.code.clone(),
            price: package.price,
            status: ClientStatus::Pending,
            created_at: now,
            paid_at: None,
            comment: new.comment.filter(|c| !c.trim().is_empty()),
        };

        self.clients.push(client);
        let idx = self.clients.len() - 1;
        Ok(&self.clients[idx])
    }

    /// All clients in creation order, optionally filtered by status.
    pub fn list(&self, filter: Option<ClientStatus>) -> Vec<&Client> {
        self.clients
            .iter()
            .filter(|c| filter.map_or(true, |f| c.status == f))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn find(&self, id: &ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| &c.id == id)
    }

    /// Set a client's status. Becoming `Paid` stamps `paid_at`; forcing back
    /// to `Pending` clears it (privileged HTTP path only; the chat-driven
    /// protocol never goes backwards). Idempotent: re-paying an already-paid
    /// client keeps the original `paid_at`.
    pub fn set_status(
        &mut self,
        id: &ClientId,
        status: ClientStatus,
        now: DateTime<Utc>,
    ) -> Result<&Client> {
        let client = self
            .clients
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| Error::NotFound(format!("client {id}")))?;

        match status {
            ClientStatus::Paid => {
                if client.status != ClientStatus::Paid {
                    client.status = ClientStatus::Paid;
                    client.paid_at = Some(now);
                }
            }
            ClientStatus::Pending => {
                client.status = ClientStatus::Pending;
                client.paid_at = None;
            }
        }

        Ok(client)
    }

    /// Aggregate revenue statistics.
    ///
    /// `month_revenue` counts paid clients whose `paid_at` (falling back to
    /// `created_at`) lands in the calendar month/year of `as_of`;
    /// `total_revenue` counts every paid client unconditionally.
    pub fn stats(&self, as_of: DateTime<Utc>) -> Stats {
        let paid: Vec<&Client> = self
            .clients
            .iter()
            .filter(|c| c.status == ClientStatus::Paid)
            .collect();

        let total_revenue = paid.iter().map(|c| c.price).sum();

        let month_revenue = paid
            .iter()
            .filter(|c| {
                let date = c.paid_at.unwrap_or(c.created_at);
                date.month() == as_of.month() && date.year() == as_of.year()
            })
            .map(|c| c.price)
            .sum();

        let per_package = self
            .catalog
            .iter()
            .map(|pkg| {
                let sold: Vec<&&Client> =
                    paid.iter().filter(|c| c.package_code == pkg.code).collect();
                PackageStats {
                    code: pkg.code.clone(),
                    count: sold.len(),
                    revenue: sold.iter().map(|c| c.price).sum(),
                }
            })
            .collect();

        // Stable sort keeps registry order for equal prices.
        let mut top: Vec<Client> = paid.iter().map(|c| (*c).clone()).collect();
        top.sort_by(|a, b| b.price.cmp(&a.price));
        top.truncate(3);

        Stats {
            total_clients: self.clients.len(),
            paid_clients: paid.len(),
            pending_clients: self.clients.len() - paid.len(),
            total_revenue,
            month_revenue,
            per_package,
            top_clients: top,
        }
    }
}
