// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rentadmin_app::{
    CollaboratorError, EditableForm, EntityBackend, Lease, LeaseFormInput, LeaseId, LeaseStatus,
    Page, Payment, PaymentFormInput, PaymentId, PaymentMethod, PaymentStatus, Property,
    PropertyFormInput, PropertyId, PropertyKind, PropertyStatus, ResourceKind, Tenant,
    TenantFormInput, TenantId,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;
use time::{Date, Month, OffsetDateTime};

const FIRST_NAMES: [&str; 16] = [
    "Juan", "María", "Lucía", "Carlos", "Ana", "Diego", "Valeria", "Jorge", "Camila", "Luis",
    "Sofía", "Mateo", "Rosa", "Andrés", "Elena", "Pablo",
];
const LAST_NAMES: [&str; 14] = [
    "Pérez", "García", "Rodríguez", "Torres", "Flores", "Ramos", "Castillo", "Vargas",
    "Rojas", "Mendoza", "Salazar", "Quispe", "Herrera", "Chávez",
];
const STREETS: [&str; 12] = [
    "Los Olivos",
    "Las Palmeras",
    "San Martín",
    "Bolognesi",
    "Grau",
    "La Marina",
    "Arequipa",
    "Pardo",
    "Benavides",
    "Angamos",
    "Javier Prado",
    "El Sol",
];
const CITIES: [&str; 6] = ["Lima", "Arequipa", "Cusco", "Trujillo", "Piura", "Chiclayo"];
const PROPERTY_PREFIXES: [(&str, PropertyKind); 4] = [
    ("Casa", PropertyKind::House),
    ("Depto", PropertyKind::Apartment),
    ("Local", PropertyKind::Commercial),
    ("Terreno", PropertyKind::Land),
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible rental records.
#[derive(Debug, Clone)]
pub struct RentalFaker {
    rng: DeterministicRng,
}

impl RentalFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn property_form(&mut self) -> PropertyFormInput {
        let (prefix, kind) = PROPERTY_PREFIXES[self.rng.int_n(PROPERTY_PREFIXES.len())];
        let street = self.pick(&STREETS);
        let number = 100 + self.rng.int_n(900);
        let rooms = match kind {
            PropertyKind::House | PropertyKind::Apartment => Some(1 + self.rng.int_n(4) as i32),
            PropertyKind::Commercial | PropertyKind::Land => None,
        };
        PropertyFormInput {
            name: format!("{prefix} {street}"),
            address: format!("Av. {street} {number}"),
            city: self.pick(&CITIES).to_owned(),
            kind,
            status: PropertyStatus::Available,
            monthly_rent_cents: 50_000 + 10_000 * self.rng.int_n(25) as i64,
            bedrooms: rooms,
            bathrooms: rooms.map(|rooms| (rooms + 1) / 2),
            area_m2: Some(40 + 10 * self.rng.int_n(30) as i64),
            description: String::new(),
        }
    }

    pub fn tenant_form(&mut self) -> TenantFormInput {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        TenantFormInput {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: format!("{}.{}@example.com", ascii_slug(first), ascii_slug(last)),
            phone: format!("9{:08}", self.rng.next_u64() % 100_000_000),
            document_number: format!("{:08}", self.rng.next_u64() % 100_000_000),
            notes: String::new(),
        }
    }

    pub fn lease_form(
        &mut self,
        property_id: PropertyId,
        tenant_id: TenantId,
        start_date: Date,
        monthly_rent_cents: i64,
    ) -> LeaseFormInput {
        LeaseFormInput {
            property_id,
            tenant_id,
            start_date,
            end_date: None,
            monthly_rent_cents,
            deposit_cents: Some(monthly_rent_cents * (1 + self.rng.int_n(2) as i64)),
            status: LeaseStatus::Active,
            notes: String::new(),
        }
    }

    pub fn payment_form(
        &mut self,
        lease_id: LeaseId,
        amount_cents: i64,
        paid_on: Date,
    ) -> PaymentFormInput {
        let method = PaymentMethod::ALL[self.rng.int_n(PaymentMethod::ALL.len())];
        PaymentFormInput {
            lease_id,
            amount_cents,
            paid_on,
            method,
            status: PaymentStatus::Paid,
            reference: format!("OP-{:06}", self.rng.next_u64() % 1_000_000),
            notes: String::new(),
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

fn ascii_slug(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub resource: ResourceKind,
    pub op: &'static str,
    pub id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct Tables {
    properties: Vec<Property>,
    tenants: Vec<Tenant>,
    leases: Vec<Lease>,
    payments: Vec<Payment>,
    high_water: BTreeMap<&'static str, i64>,
    failures: Vec<(ResourceKind, CollaboratorError)>,
    calls: Vec<Call>,
}

impl Tables {
    fn take_failure(&mut self, resource: ResourceKind) -> Option<CollaboratorError> {
        let index = self
            .failures
            .iter()
            .position(|(kind, _)| *kind == resource)?;
        Some(self.failures.remove(index).1)
    }

    fn next_id(&mut self, resource: ResourceKind, current_max: i64) -> i64 {
        let mark = self.high_water.entry(resource.path()).or_insert(0);
        *mark = (*mark).max(current_max) + 1;
        *mark
    }
}

/// A record the in-memory store can hold. Mirrors what the real API does
/// with a form body.
pub trait Stored: Clone + Send + 'static {
    type Form: EditableForm + Send + Sync + 'static;
    const RESOURCE: ResourceKind;

    fn id(&self) -> i64;
    fn build(id: i64, form: &Self::Form, now: OffsetDateTime) -> Self;
    fn apply(&mut self, form: &Self::Form, now: OffsetDateTime);
    fn table(tables: &mut Tables) -> &mut Vec<Self>;

    fn check_references(_tables: &Tables, _form: &Self::Form) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn check_delete(_tables: &Tables, _id: i64) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

impl Stored for Property {
    type Form = PropertyFormInput;
    const RESOURCE: ResourceKind = ResourceKind::Properties;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn build(id: i64, form: &Self::Form, now: OffsetDateTime) -> Self {
        let mut property = Self {
            id: PropertyId::new(id),
            name: String::new(),
            address: String::new(),
            city: String::new(),
            kind: form.kind,
            status: form.status,
            monthly_rent_cents: 0,
            bedrooms: None,
            bathrooms: None,
            area_m2: None,
            description: String::new(),
            created_at: Some(now),
            updated_at: None,
        };
        property.apply(form, now);
        property
    }

    fn apply(&mut self, form: &Self::Form, now: OffsetDateTime) {
        self.name = form.name.clone();
        self.address = form.address.clone();
        self.city = form.city.clone();
        self.kind = form.kind;
        self.status = form.status;
        self.monthly_rent_cents = form.monthly_rent_cents;
        self.bedrooms = form.bedrooms;
        self.bathrooms = form.bathrooms;
        self.area_m2 = form.area_m2;
        self.description = form.description.clone();
        self.updated_at = Some(now);
    }

    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.properties
    }

    fn check_delete(tables: &Tables, id: i64) -> Result<(), CollaboratorError> {
        if tables.leases.iter().any(|lease| lease.property_id.get() == id) {
            return Err(CollaboratorError::Business(format!(
                "property {id} still has leases"
            )));
        }
        Ok(())
    }
}

impl Stored for Tenant {
    type Form = TenantFormInput;
    const RESOURCE: ResourceKind = ResourceKind::Tenants;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn build(id: i64, form: &Self::Form, now: OffsetDateTime) -> Self {
        let mut tenant = Self {
            id: TenantId::new(id),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            document_number: String::new(),
            notes: String::new(),
            created_at: Some(now),
            updated_at: None,
        };
        tenant.apply(form, now);
        tenant
    }

    fn apply(&mut self, form: &Self::Form, now: OffsetDateTime) {
        self.first_name = form.first_name.clone();
        self.last_name = form.last_name.clone();
        self.email = form.email.clone();
        self.phone = form.phone.clone();
        self.document_number = form.document_number.clone();
        self.notes = form.notes.clone();
        self.updated_at = Some(now);
    }

    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.tenants
    }

    fn check_delete(tables: &Tables, id: i64) -> Result<(), CollaboratorError> {
        if tables.leases.iter().any(|lease| lease.tenant_id.get() == id) {
            return Err(CollaboratorError::Business(format!(
                "tenant {id} still has leases"
            )));
        }
        Ok(())
    }
}

impl Stored for Lease {
    type Form = LeaseFormInput;
    const RESOURCE: ResourceKind = ResourceKind::Leases;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn build(id: i64, form: &Self::Form, now: OffsetDateTime) -> Self {
        let mut lease = Self {
            id: LeaseId::new(id),
            property_id: form.property_id,
            tenant_id: form.tenant_id,
            start_date: form.start_date,
            end_date: None,
            monthly_rent_cents: 0,
            deposit_cents: None,
            status: form.status,
            notes: String::new(),
            created_at: Some(now),
            updated_at: None,
        };
        lease.apply(form, now);
        lease
    }

    fn apply(&mut self, form: &Self::Form, now: OffsetDateTime) {
        self.property_id = form.property_id;
        self.tenant_id = form.tenant_id;
        self.start_date = form.start_date;
        self.end_date = form.end_date;
        self.monthly_rent_cents = form.monthly_rent_cents;
        self.deposit_cents = form.deposit_cents;
        self.status = form.status;
        self.notes = form.notes.clone();
        self.updated_at = Some(now);
    }

    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.leases
    }

    fn check_references(tables: &Tables, form: &Self::Form) -> Result<(), CollaboratorError> {
        if !tables.properties.iter().any(|p| p.id == form.property_id) {
            return Err(CollaboratorError::Business(format!(
                "property {} does not exist",
                form.property_id
            )));
        }
        if !tables.tenants.iter().any(|t| t.id == form.tenant_id) {
            return Err(CollaboratorError::Business(format!(
                "tenant {} does not exist",
                form.tenant_id
            )));
        }
        Ok(())
    }

    fn check_delete(tables: &Tables, id: i64) -> Result<(), CollaboratorError> {
        if tables.payments.iter().any(|payment| payment.lease_id.get() == id) {
            return Err(CollaboratorError::Business(format!(
                "lease {id} still has payments"
            )));
        }
        Ok(())
    }
}

impl Stored for Payment {
    type Form = PaymentFormInput;
    const RESOURCE: ResourceKind = ResourceKind::Payments;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn build(id: i64, form: &Self::Form, now: OffsetDateTime) -> Self {
        let mut payment = Self {
            id: PaymentId::new(id),
            lease_id: form.lease_id,
            amount_cents: 0,
            paid_on: form.paid_on,
            method: form.method,
            status: form.status,
            reference: String::new(),
            notes: String::new(),
            created_at: Some(now),
            updated_at: None,
        };
        payment.apply(form, now);
        payment
    }

    fn apply(&mut self, form: &Self::Form, now: OffsetDateTime) {
        self.lease_id = form.lease_id;
        self.amount_cents = form.amount_cents;
        self.paid_on = form.paid_on;
        self.method = form.method;
        self.status = form.status;
        self.reference = form.reference.clone();
        self.notes = form.notes.clone();
        self.updated_at = Some(now);
    }

    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.payments
    }

    fn check_references(tables: &Tables, form: &Self::Form) -> Result<(), CollaboratorError> {
        if !tables.leases.iter().any(|lease| lease.id == form.lease_id) {
            return Err(CollaboratorError::Business(format!(
                "lease {} does not exist",
                form.lease_id
            )));
        }
        Ok(())
    }
}

/// In-memory stand-in for the rental CRUD API.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next request against `resource` fail with `error`.
    pub fn fail_next(&self, resource: ResourceKind, error: CollaboratorError) {
        self.lock().failures.push((resource, error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, resource: ResourceKind, op: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.resource == resource && call.op == op)
            .count()
    }

    pub fn all<T: Stored>(&self) -> Vec<T> {
        T::table(&mut self.lock()).clone()
    }

    /// Insert a record as-is, keeping its id. Existing records with the same
    /// id are kept too, so tests can model a misbehaving server.
    pub fn insert<T: Stored>(&self, entity: T) {
        let mut tables = self.lock();
        let id = entity.id();
        let mark = tables.high_water.entry(T::RESOURCE.path()).or_insert(0);
        *mark = (*mark).max(id);
        T::table(&mut tables).push(entity);
    }

    /// Store a form without validation, returning the new id.
    pub fn seed<T: Stored>(&self, form: &T::Form) -> i64 {
        let mut tables = self.lock();
        let current_max = T::table(&mut tables).iter().map(T::id).max().unwrap_or(0);
        let id = tables.next_id(T::RESOURCE, current_max);
        let entity = T::build(id, form, OffsetDateTime::now_utc());
        T::table(&mut tables).push(entity);
        id
    }

    pub fn list<T: Stored>(&self) -> Result<Page<T>, CollaboratorError> {
        let mut tables = self.begin::<T>("list", None)?;
        Ok(Page::single(T::table(&mut tables).clone()))
    }

    pub fn create<T: Stored>(&self, form: &T::Form) -> Result<T, CollaboratorError> {
        let mut tables = self.begin::<T>("create", None)?;
        validate(form)?;
        T::check_references(&tables, form)?;
        let current_max = T::table(&mut tables).iter().map(T::id).max().unwrap_or(0);
        let id = tables.next_id(T::RESOURCE, current_max);
        let entity = T::build(id, form, OffsetDateTime::now_utc());
        T::table(&mut tables).push(entity.clone());
        Ok(entity)
    }

    pub fn update<T: Stored>(&self, id: i64, form: &T::Form) -> Result<T, CollaboratorError> {
        let mut tables = self.begin::<T>("update", Some(id))?;
        validate(form)?;
        T::check_references(&tables, form)?;
        let entity = T::table(&mut tables)
            .iter_mut()
            .find(|entity| entity.id() == id)
            .ok_or_else(|| not_found(T::RESOURCE, id))?;
        entity.apply(form, OffsetDateTime::now_utc());
        Ok(entity.clone())
    }

    pub fn delete<T: Stored>(&self, id: i64) -> Result<(), CollaboratorError> {
        let mut tables = self.begin::<T>("delete", Some(id))?;
        T::check_delete(&tables, id)?;
        let table = T::table(&mut tables);
        let before = table.len();
        table.retain(|entity| entity.id() != id);
        if table.len() == before {
            return Err(not_found(T::RESOURCE, id));
        }
        Ok(())
    }

    pub fn backend<T: Stored>(&self) -> EntityBackend<T, T::Form> {
        let load = self.clone();
        let create = self.clone();
        let update = self.clone();
        let delete = self.clone();
        EntityBackend {
            load: Arc::new(move || load.list::<T>()),
            create: Arc::new(move |form: &T::Form| create.create::<T>(form)),
            update: Arc::new(move |id, form: &T::Form| update.update::<T>(id, form)),
            delete: Arc::new(move |id| delete.delete::<T>(id)),
        }
    }

    fn begin<T: Stored>(
        &self,
        op: &'static str,
        id: Option<i64>,
    ) -> Result<MutexGuard<'_, Tables>, CollaboratorError> {
        let mut tables = self.lock();
        tables.calls.push(Call {
            resource: T::RESOURCE,
            op,
            id,
        });
        if let Some(error) = tables.take_failure(T::RESOURCE) {
            tracing::debug!(resource = T::RESOURCE.path(), op, %error, "injected failure");
            return Err(error);
        }
        Ok(tables)
    }
}

fn validate<F: EditableForm>(form: &F) -> Result<(), CollaboratorError> {
    form.validate()
        .map_err(|error| CollaboratorError::Business(format!("{error:#}")))
}

fn not_found(resource: ResourceKind, id: i64) -> CollaboratorError {
    CollaboratorError::Business(format!("{} {id} not found", resource.singular()))
}

/// A store populated with a small, stable portfolio: properties, tenants,
/// active leases and a few months of payments ending at `today`.
pub fn demo_store(today: Date) -> MemoryStore {
    let store = MemoryStore::new();
    let mut faker = RentalFaker::new(7);

    let casa_a = store.seed::<Property>(&PropertyFormInput {
        name: "Casa A".to_owned(),
        address: "Av. Los Olivos 120".to_owned(),
        city: "Lima".to_owned(),
        kind: PropertyKind::House,
        status: PropertyStatus::Rented,
        monthly_rent_cents: 180_000,
        bedrooms: Some(3),
        bathrooms: Some(2),
        area_m2: Some(140),
        description: "Two floors, small garden.".to_owned(),
    });
    let mut casa_b = faker.property_form();
    casa_b.name = "Casa B".to_owned();
    casa_b.address = "Calle Grau 455".to_owned();
    casa_b.city = "Arequipa".to_owned();
    casa_b.status = PropertyStatus::Rented;
    casa_b.monthly_rent_cents = 120_000;
    let casa_b = store.seed::<Property>(&casa_b);
    for _ in 0..4 {
        store.seed::<Property>(&faker.property_form());
    }

    let juan = store.seed::<Tenant>(&TenantFormInput {
        first_name: "Juan".to_owned(),
        last_name: "Pérez".to_owned(),
        email: "juan.perez@example.com".to_owned(),
        phone: "987654321".to_owned(),
        document_number: "40112233".to_owned(),
        notes: String::new(),
    });
    let second = store.seed::<Tenant>(&faker.tenant_form());
    for _ in 0..4 {
        store.seed::<Tenant>(&faker.tenant_form());
    }

    let start = months_back(today, 8);
    let leases = [
        (casa_a, juan, 180_000),
        (casa_b, second, 120_000),
    ]
    .map(|(property, tenant, rent)| {
        let form = faker.lease_form(PropertyId::new(property), TenantId::new(tenant), start, rent);
        (store.seed::<Lease>(&form), rent)
    });

    for (lease, rent) in leases {
        for back in (0..8).rev() {
            let mut form = faker.payment_form(LeaseId::new(lease), rent, months_back(today, back));
            if back == 0 {
                form.status = if lease == leases[0].0 {
                    PaymentStatus::Pending
                } else {
                    PaymentStatus::Late
                };
            }
            store.seed::<Payment>(&form);
        }
    }
    store
}

/// Day 5 of the month `back` months before `today`'s month.
fn months_back(today: Date, back: u32) -> Date {
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..back {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    Date::from_calendar_date(year, month, 5).unwrap_or(today)
}

/// Write `contents` to `config.toml` inside a fresh temporary directory.
pub fn temp_config(contents: &str) -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents)
        .with_context(|| format!("write config {}", path.display()))?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, RentalFaker, demo_store, temp_config};
    use rentadmin_app::{
        CollaboratorError, EditableForm, Lease, LeaseFormInput, LeaseId, Payment, PaymentStatus,
        Property, PropertyId, ResourceKind, Tenant, TenantFormInput, TenantId,
    };
    use std::collections::BTreeSet;
    use time::macros::date;

    #[test]
    fn faker_is_deterministic_and_valid() {
        let mut left = RentalFaker::new(3);
        let mut right = RentalFaker::new(3);
        for _ in 0..20 {
            let property = left.property_form();
            assert_eq!(property, right.property_form());
            property.validate().expect("generated property should validate");
            let tenant = left.tenant_form();
            assert_eq!(tenant, right.tenant_form());
            tenant.validate().expect("generated tenant should validate");
            assert!(tenant.email.is_ascii());
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            names.insert(RentalFaker::new(seed).tenant_form().first_name);
        }
        assert!(names.len() >= 5, "got {}", names.len());
    }

    #[test]
    fn create_assigns_increasing_ids_and_logs_calls() {
        let store = MemoryStore::new();
        let first: Tenant = store
            .create(&RentalFaker::new(1).tenant_form())
            .expect("create should succeed");
        let second: Tenant = store
            .create(&RentalFaker::new(2).tenant_form())
            .expect("create should succeed");
        assert_eq!((first.id.get(), second.id.get()), (1, 2));
        assert!(first.created_at.is_some());

        store.delete::<Tenant>(2).expect("delete should succeed");
        let third: Tenant = store
            .create(&RentalFaker::new(3).tenant_form())
            .expect("create should succeed");
        assert_eq!(third.id.get(), 3);
        assert_eq!(store.call_count(ResourceKind::Tenants, "create"), 3);
    }

    #[test]
    fn invalid_forms_and_dangling_references_are_business_errors() {
        let store = MemoryStore::new();
        let blank = store.create::<Tenant>(&TenantFormInput::blank());
        assert!(matches!(blank, Err(CollaboratorError::Business(_))));

        let mut lease = LeaseFormInput::blank();
        lease.property_id = PropertyId::new(9);
        lease.tenant_id = TenantId::new(9);
        lease.monthly_rent_cents = 100_000;
        lease.start_date = date!(2026 - 01 - 01);
        let error = store
            .create::<Lease>(&lease)
            .expect_err("dangling property should be rejected");
        assert!(error.detail().contains("property 9"));
    }

    #[test]
    fn injected_failure_applies_once() {
        let store = MemoryStore::new();
        store.fail_next(
            ResourceKind::Properties,
            CollaboratorError::Transport("connection reset".to_owned()),
        );
        assert!(store.list::<Property>().is_err());
        assert!(store.list::<Property>().is_ok());
        assert!(store.list::<Tenant>().is_ok());
    }

    #[test]
    fn delete_refuses_referenced_rows() {
        let store = demo_store(date!(2026 - 03 - 15));
        let error = store
            .delete::<Tenant>(1)
            .expect_err("tenant with leases cannot be deleted");
        assert!(error.detail().contains("still has leases"));
        assert!(store.delete::<Tenant>(99).is_err());
    }

    #[test]
    fn demo_store_has_known_fixtures() {
        let store = demo_store(date!(2026 - 03 - 15));
        let properties = store.all::<Property>();
        assert_eq!(properties.len(), 6);
        assert_eq!(properties[0].name, "Casa A");
        assert_eq!(properties[1].name, "Casa B");

        let tenants = store.all::<Tenant>();
        assert_eq!(tenants[0].full_name(), "Juan Pérez");

        let payments = store.all::<Payment>();
        assert_eq!(payments.len(), 16);
        assert!(payments.iter().any(|p| p.status == PaymentStatus::Late));
        assert!(
            payments
                .iter()
                .all(|payment| payment.lease_id == LeaseId::new(1)
                    || payment.lease_id == LeaseId::new(2))
        );
        let leases = store.all::<Lease>();
        assert_eq!(leases.len(), 2);
        assert!(leases.iter().all(|lease| lease.start_date == date!(2025 - 07 - 05)));
    }

    #[test]
    fn temp_config_writes_file() -> anyhow::Result<()> {
        let (_dir, path) = temp_config("version = 1\n")?;
        assert_eq!(std::fs::read_to_string(path)?, "version = 1\n");
        Ok(())
    }
}
