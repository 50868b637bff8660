// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::ids::*;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    House,
    Apartment,
    Commercial,
    Land,
}

impl PropertyKind {
    pub const ALL: [Self; 4] = [Self::House, Self::Apartment, Self::Commercial, Self::Land];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Apartment => "apartment",
            Self::Commercial => "commercial",
            Self::Land => "land",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "house" => Some(Self::House),
            "apartment" => Some(Self::Apartment),
            "commercial" => Some(Self::Commercial),
            "land" => Some(Self::Land),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Rented,
    Maintenance,
}

impl PropertyStatus {
    pub const ALL: [Self; 3] = [Self::Available, Self::Rented, Self::Maintenance];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "rented" => Some(Self::Rented),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Active,
    Ended,
    Terminated,
}

impl LeaseStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Ended, Self::Terminated];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Terminated => "terminated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "ended" => Some(Self::Ended),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    Check,
}

impl PaymentMethod {
    pub const ALL: [Self; 4] = [Self::Cash, Self::Transfer, Self::Card, Self::Check];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Card => "card",
            Self::Check => "check",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "card" => Some(Self::Card),
            "check" => Some(Self::Check),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Late,
}

impl PaymentStatus {
    pub const ALL: [Self; 3] = [Self::Paid, Self::Pending, Self::Late];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Late => "late",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "paid" => Some(Self::Paid),
            "pending" => Some(Self::Pending),
            "late" => Some(Self::Late),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Properties,
    Tenants,
    Leases,
    Payments,
}

impl ResourceKind {
    pub const ALL: [Self; 4] = [
        Self::Properties,
        Self::Tenants,
        Self::Leases,
        Self::Payments,
    ];

    /// Path segment under the API base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Tenants => "tenants",
            Self::Leases => "leases",
            Self::Payments => "payments",
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Self::Properties => "property",
            Self::Tenants => "tenant",
            Self::Leases => "lease",
            Self::Payments => "payment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Properties,
    Tenants,
    Leases,
    Payments,
}

impl TabKind {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Properties,
        Self::Tenants,
        Self::Leases,
        Self::Payments,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Properties => "properties",
            Self::Tenants => "tenants",
            Self::Leases => "leases",
            Self::Payments => "payments",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.label() == value)
    }

    pub const fn resource(self) -> Option<ResourceKind> {
        match self {
            Self::Dashboard => None,
            Self::Properties => Some(ResourceKind::Properties),
            Self::Tenants => Some(ResourceKind::Tenants),
            Self::Leases => Some(ResourceKind::Leases),
            Self::Payments => Some(ResourceKind::Payments),
        }
    }
}

/// One page of a list response: `{items, total, page, size}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        let size = items.len() as u32;
        Self {
            items,
            total,
            page: 1,
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    pub kind: PropertyKind,
    pub status: PropertyStatus,
    pub monthly_rent_cents: i64,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub area_m2: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub document_number: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Tenant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub property_id: PropertyId,
    pub tenant_id: TenantId,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
    pub monthly_rent_cents: i64,
    #[serde(default)]
    pub deposit_cents: Option<i64>,
    pub status: LeaseStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub lease_id: LeaseId,
    pub amount_cents: i64,
    #[serde(with = "iso_date")]
    pub paid_on: Date,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = abs / 100;
    let frac = abs % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac:02}")
}

#[cfg(test)]
mod tests {
    use super::{Lease, LeaseStatus, Page, PropertyStatus, TabKind, format_money};
    use crate::{LeaseId, PropertyId, TenantId};
    use time::{Date, Month};

    #[test]
    fn status_round_trips_through_labels() {
        for status in PropertyStatus::ALL {
            assert_eq!(PropertyStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeaseStatus::parse("bogus"), None);
    }

    #[test]
    fn tab_parse_matches_labels() {
        assert_eq!(TabKind::parse("leases"), Some(TabKind::Leases));
        assert_eq!(TabKind::parse("house"), None);
    }

    #[test]
    fn format_money_groups_thousands() {
        assert_eq!(format_money(0), "$0.00");
        assert_eq!(format_money(123_456_78), "$123,456.78");
        assert_eq!(format_money(-5_05), "-$5.05");
    }

    #[test]
    fn lease_decodes_iso_dates_and_optional_fields() {
        let raw = r#"{
            "id": 3,
            "property_id": 1,
            "tenant_id": 2,
            "start_date": "2026-02-01",
            "end_date": null,
            "monthly_rent_cents": 120000,
            "status": "active"
        }"#;
        let lease: Lease = serde_json::from_str(raw).expect("lease should decode");
        assert_eq!(lease.id, LeaseId::new(3));
        assert_eq!(lease.property_id, PropertyId::new(1));
        assert_eq!(lease.tenant_id, TenantId::new(2));
        assert_eq!(
            lease.start_date,
            Date::from_calendar_date(2026, Month::February, 1).expect("valid date")
        );
        assert_eq!(lease.end_date, None);
        assert!(lease.notes.is_empty());
    }

    #[test]
    fn page_tolerates_missing_counters() {
        let page: Page<i64> = serde_json::from_str(r#"{"items":[1,2]}"#).expect("page decodes");
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total, 0);
    }
}
