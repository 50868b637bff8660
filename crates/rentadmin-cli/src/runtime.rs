// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rentadmin_api::{Client, ListQuery};
use rentadmin_app::{
    DashboardSnapshot, EntityBackend, Lease, LeaseFormInput, Payment, PaymentFormInput, Property,
    PropertyFormInput, ResourceKind, Tenant, TenantFormInput,
};
use rentadmin_testkit::{MemoryStore, demo_store};
use rentadmin_tui::AppRuntime;
use serde::de::DeserializeOwned;
use time::Date;

/// Talks to the rental HTTP API.
pub struct ApiRuntime {
    client: Client,
    page_size: u32,
}

impl ApiRuntime {
    pub fn new(client: Client, page_size: u32) -> Self {
        Self { client, page_size }
    }

    fn list_all<T: DeserializeOwned>(&self, resource: ResourceKind) -> Result<Vec<T>> {
        let page = self
            .client
            .list::<T>(resource, &ListQuery::first_page(self.page_size))
            .with_context(|| format!("load {} for the dashboard", resource.path()))?;
        Ok(page.items)
    }
}

impl AppRuntime for ApiRuntime {
    fn property_backend(&mut self) -> EntityBackend<Property, PropertyFormInput> {
        rentadmin_api::backend(&self.client, ResourceKind::Properties, self.page_size)
    }

    fn tenant_backend(&mut self) -> EntityBackend<Tenant, TenantFormInput> {
        rentadmin_api::backend(&self.client, ResourceKind::Tenants, self.page_size)
    }

    fn lease_backend(&mut self) -> EntityBackend<Lease, LeaseFormInput> {
        rentadmin_api::backend(&self.client, ResourceKind::Leases, self.page_size)
    }

    fn payment_backend(&mut self) -> EntityBackend<Payment, PaymentFormInput> {
        rentadmin_api::backend(&self.client, ResourceKind::Payments, self.page_size)
    }

    fn load_dashboard(&mut self, today: Date) -> Result<DashboardSnapshot> {
        let properties = self.list_all::<Property>(ResourceKind::Properties)?;
        let tenants = self.list_all::<Tenant>(ResourceKind::Tenants)?;
        let leases = self.list_all::<Lease>(ResourceKind::Leases)?;
        let payments = self.list_all::<Payment>(ResourceKind::Payments)?;
        tracing::debug!(
            properties = properties.len(),
            tenants = tenants.len(),
            leases = leases.len(),
            payments = payments.len(),
            "dashboard loaded"
        );
        Ok(DashboardSnapshot::build(
            &properties,
            tenants.len(),
            &leases,
            &payments,
            today,
        ))
    }
}

/// In-memory portfolio for `--demo`; nothing leaves the process.
pub struct DemoRuntime {
    store: MemoryStore,
}

impl DemoRuntime {
    pub fn new(today: Date) -> Self {
        Self {
            store: demo_store(today),
        }
    }
}

impl AppRuntime for DemoRuntime {
    fn property_backend(&mut self) -> EntityBackend<Property, PropertyFormInput> {
        self.store.backend::<Property>()
    }

    fn tenant_backend(&mut self) -> EntityBackend<Tenant, TenantFormInput> {
        self.store.backend::<Tenant>()
    }

    fn lease_backend(&mut self) -> EntityBackend<Lease, LeaseFormInput> {
        self.store.backend::<Lease>()
    }

    fn payment_backend(&mut self) -> EntityBackend<Payment, PaymentFormInput> {
        self.store.backend::<Payment>()
    }

    fn load_dashboard(&mut self, today: Date) -> Result<DashboardSnapshot> {
        Ok(DashboardSnapshot::build(
            &self.store.all::<Property>(),
            self.store.all::<Tenant>().len(),
            &self.store.all::<Lease>(),
            &self.store.all::<Payment>(),
            today,
        ))
    }
}
