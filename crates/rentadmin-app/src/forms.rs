// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::{date, format_description};

use crate::{
    LeaseId, LeaseStatus, PaymentMethod, PaymentStatus, PropertyId, PropertyKind, PropertyStatus,
    TenantId,
};

time::serde::format_description!(form_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Money,
    OptionalMoney,
    OptionalInteger,
    Reference,
    Date,
    OptionalDate,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { label, kind }
}

/// A draft that a form screen can edit one field at a time.
pub trait EditableForm: Clone {
    fn fields() -> &'static [FieldSpec];
    fn field_text(&self, index: usize) -> String;
    fn set_field(&mut self, index: usize, raw: &str) -> Result<()>;
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFormInput {
    pub name: String,
    pub address: String,
    pub city: String,
    pub kind: PropertyKind,
    pub status: PropertyStatus,
    pub monthly_rent_cents: i64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_m2: Option<i64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantFormInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseFormInput {
    pub property_id: PropertyId,
    pub tenant_id: TenantId,
    #[serde(with = "form_date")]
    pub start_date: Date,
    #[serde(with = "form_date::option")]
    pub end_date: Option<Date>,
    pub monthly_rent_cents: i64,
    pub deposit_cents: Option<i64>,
    pub status: LeaseStatus,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFormInput {
    pub lease_id: LeaseId,
    pub amount_cents: i64,
    #[serde(with = "form_date")]
    pub paid_on: Date,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: String,
    pub notes: String,
}

impl PropertyFormInput {
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            city: String::new(),
            kind: PropertyKind::House,
            status: PropertyStatus::Available,
            monthly_rent_cents: 0,
            bedrooms: None,
            bathrooms: None,
            area_m2: None,
            description: String::new(),
        }
    }
}

impl TenantFormInput {
    pub fn blank() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            document_number: String::new(),
            notes: String::new(),
        }
    }
}

impl LeaseFormInput {
    pub fn blank() -> Self {
        Self {
            property_id: PropertyId::new(0),
            tenant_id: TenantId::new(0),
            start_date: date!(1970 - 01 - 01),
            end_date: None,
            monthly_rent_cents: 0,
            deposit_cents: None,
            status: LeaseStatus::Active,
            notes: String::new(),
        }
    }
}

impl PaymentFormInput {
    pub fn blank() -> Self {
        Self {
            lease_id: LeaseId::new(0),
            amount_cents: 0,
            paid_on: date!(1970 - 01 - 01),
            method: PaymentMethod::Transfer,
            status: PaymentStatus::Paid,
            reference: String::new(),
            notes: String::new(),
        }
    }
}

const PROPERTY_KINDS: &[&str] = &["house", "apartment", "commercial", "land"];
const PROPERTY_STATUSES: &[&str] = &["available", "rented", "maintenance"];
const LEASE_STATUSES: &[&str] = &["active", "ended", "terminated"];
const PAYMENT_METHODS: &[&str] = &["cash", "transfer", "card", "check"];
const PAYMENT_STATUSES: &[&str] = &["paid", "pending", "late"];

const PROPERTY_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::Text),
    field("address", FieldKind::Text),
    field("city", FieldKind::Text),
    field("kind", FieldKind::Choice(PROPERTY_KINDS)),
    field("status", FieldKind::Choice(PROPERTY_STATUSES)),
    field("monthly rent", FieldKind::Money),
    field("bedrooms", FieldKind::OptionalInteger),
    field("bathrooms", FieldKind::OptionalInteger),
    field("area m2", FieldKind::OptionalInteger),
    field("description", FieldKind::Text),
];

const TENANT_FIELDS: &[FieldSpec] = &[
    field("first name", FieldKind::Text),
    field("last name", FieldKind::Text),
    field("email", FieldKind::Text),
    field("phone", FieldKind::Text),
    field("document", FieldKind::Text),
    field("notes", FieldKind::Text),
];

const LEASE_FIELDS: &[FieldSpec] = &[
    field("property id", FieldKind::Reference),
    field("tenant id", FieldKind::Reference),
    field("start date", FieldKind::Date),
    field("end date", FieldKind::OptionalDate),
    field("monthly rent", FieldKind::Money),
    field("deposit", FieldKind::OptionalMoney),
    field("status", FieldKind::Choice(LEASE_STATUSES)),
    field("notes", FieldKind::Text),
];

const PAYMENT_FIELDS: &[FieldSpec] = &[
    field("lease id", FieldKind::Reference),
    field("amount", FieldKind::Money),
    field("paid on", FieldKind::Date),
    field("method", FieldKind::Choice(PAYMENT_METHODS)),
    field("status", FieldKind::Choice(PAYMENT_STATUSES)),
    field("reference", FieldKind::Text),
    field("notes", FieldKind::Text),
];

impl EditableForm for PropertyFormInput {
    fn fields() -> &'static [FieldSpec] {
        PROPERTY_FIELDS
    }

    fn field_text(&self, index: usize) -> String {
        match index {
            0 => self.name.clone(),
            1 => self.address.clone(),
            2 => self.city.clone(),
            3 => self.kind.as_str().to_owned(),
            4 => self.status.as_str().to_owned(),
            5 => money_input(self.monthly_rent_cents),
            6 => optional_number(self.bedrooms),
            7 => optional_number(self.bathrooms),
            8 => optional_number(self.area_m2),
            9 => self.description.clone(),
            _ => String::new(),
        }
    }

    fn set_field(&mut self, index: usize, raw: &str) -> Result<()> {
        match index {
            0 => self.name = raw.trim().to_owned(),
            1 => self.address = raw.trim().to_owned(),
            2 => self.city = raw.trim().to_owned(),
            3 => {
                self.kind = PropertyKind::parse(raw.trim())
                    .ok_or_else(|| choice_error("kind", raw, PROPERTY_KINDS))?;
            }
            4 => {
                self.status = PropertyStatus::parse(raw.trim())
                    .ok_or_else(|| choice_error("status", raw, PROPERTY_STATUSES))?;
            }
            5 => self.monthly_rent_cents = parse_money(raw)?,
            6 => self.bedrooms = parse_optional_number(raw)?,
            7 => self.bathrooms = parse_optional_number(raw)?,
            8 => self.area_m2 = parse_optional_number(raw)?,
            9 => self.description = raw.to_owned(),
            _ => bail!("property form has no field {index}"),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("property name is required -- enter a name and retry");
        }
        if self.address.trim().is_empty() {
            bail!("property address is required -- enter an address and retry");
        }
        if self.monthly_rent_cents <= 0 {
            bail!("property monthly rent must be positive");
        }
        for count in [self.bedrooms, self.bathrooms].into_iter().flatten() {
            if count < 0 {
                bail!("property room counts cannot be negative");
            }
        }
        if let Some(area) = self.area_m2
            && area <= 0
        {
            bail!("property area must be positive");
        }
        Ok(())
    }
}

impl EditableForm for TenantFormInput {
    fn fields() -> &'static [FieldSpec] {
        TENANT_FIELDS
    }

    fn field_text(&self, index: usize) -> String {
        match index {
            0 => self.first_name.clone(),
            1 => self.last_name.clone(),
            2 => self.email.clone(),
            3 => self.phone.clone(),
            4 => self.document_number.clone(),
            5 => self.notes.clone(),
            _ => String::new(),
        }
    }

    fn set_field(&mut self, index: usize, raw: &str) -> Result<()> {
        match index {
            0 => self.first_name = raw.trim().to_owned(),
            1 => self.last_name = raw.trim().to_owned(),
            2 => self.email = raw.trim().to_owned(),
            3 => self.phone = raw.trim().to_owned(),
            4 => self.document_number = raw.trim().to_owned(),
            5 => self.notes = raw.to_owned(),
            _ => bail!("tenant form has no field {index}"),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            bail!("tenant first and last name are required -- enter both and retry");
        }
        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            bail!("tenant email {email:?} is not an email address");
        }
        Ok(())
    }
}

impl EditableForm for LeaseFormInput {
    fn fields() -> &'static [FieldSpec] {
        LEASE_FIELDS
    }

    fn field_text(&self, index: usize) -> String {
        match index {
            0 => reference_text(self.property_id.get()),
            1 => reference_text(self.tenant_id.get()),
            2 => self.start_date.to_string(),
            3 => self.end_date.map(|date| date.to_string()).unwrap_or_default(),
            4 => money_input(self.monthly_rent_cents),
            5 => self.deposit_cents.map(money_input).unwrap_or_default(),
            6 => self.status.as_str().to_owned(),
            7 => self.notes.clone(),
            _ => String::new(),
        }
    }

    fn set_field(&mut self, index: usize, raw: &str) -> Result<()> {
        match index {
            0 => self.property_id = PropertyId::new(parse_reference(raw)?),
            1 => self.tenant_id = TenantId::new(parse_reference(raw)?),
            2 => self.start_date = parse_date(raw)?,
            3 => self.end_date = parse_optional_date(raw)?,
            4 => self.monthly_rent_cents = parse_money(raw)?,
            5 => self.deposit_cents = parse_optional_money(raw)?,
            6 => {
                self.status = LeaseStatus::parse(raw.trim())
                    .ok_or_else(|| choice_error("status", raw, LEASE_STATUSES))?;
            }
            7 => self.notes = raw.to_owned(),
            _ => bail!("lease form has no field {index}"),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.property_id.get() <= 0 {
            bail!("lease property is required -- enter a property id and retry");
        }
        if self.tenant_id.get() <= 0 {
            bail!("lease tenant is required -- enter a tenant id and retry");
        }
        if let Some(end_date) = self.end_date
            && end_date < self.start_date
        {
            bail!("lease end date must be on/after start date");
        }
        if self.monthly_rent_cents <= 0 {
            bail!("lease monthly rent must be positive");
        }
        if let Some(deposit) = self.deposit_cents
            && deposit < 0
        {
            bail!("lease deposit cannot be negative");
        }
        Ok(())
    }
}

impl EditableForm for PaymentFormInput {
    fn fields() -> &'static [FieldSpec] {
        PAYMENT_FIELDS
    }

    fn field_text(&self, index: usize) -> String {
        match index {
            0 => reference_text(self.lease_id.get()),
            1 => money_input(self.amount_cents),
            2 => self.paid_on.to_string(),
            3 => self.method.as_str().to_owned(),
            4 => self.status.as_str().to_owned(),
            5 => self.reference.clone(),
            6 => self.notes.clone(),
            _ => String::new(),
        }
    }

    fn set_field(&mut self, index: usize, raw: &str) -> Result<()> {
        match index {
            0 => self.lease_id = LeaseId::new(parse_reference(raw)?),
            1 => self.amount_cents = parse_money(raw)?,
            2 => self.paid_on = parse_date(raw)?,
            3 => {
                self.method = PaymentMethod::parse(raw.trim())
                    .ok_or_else(|| choice_error("method", raw, PAYMENT_METHODS))?;
            }
            4 => {
                self.status = PaymentStatus::parse(raw.trim())
                    .ok_or_else(|| choice_error("status", raw, PAYMENT_STATUSES))?;
            }
            5 => self.reference = raw.trim().to_owned(),
            6 => self.notes = raw.to_owned(),
            _ => bail!("payment form has no field {index}"),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.lease_id.get() <= 0 {
            bail!("payment lease is required -- enter a lease id and retry");
        }
        if self.amount_cents <= 0 {
            bail!("payment amount must be positive");
        }
        Ok(())
    }
}

/// Parse a money amount such as `1250`, `1,250.5` or `$1,250.50` into cents.
pub fn parse_money(raw: &str) -> Result<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && *ch != '$')
        .collect();
    if cleaned.is_empty() {
        bail!("amount is required");
    }

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    if unsigned.is_empty() || unsigned == "." {
        bail!("invalid amount {raw:?}");
    }
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if frac.len() > 2 || !frac.chars().all(|ch| ch.is_ascii_digit()) {
        bail!("invalid amount {raw:?}; use at most two decimal places");
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .with_context(|| format!("invalid amount {raw:?}"))?
    };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>()? * 10,
        _ => frac.parse()?,
    };
    let cents = whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(frac))
        .ok_or_else(|| anyhow!("amount {raw:?} is too large"))?;
    Ok(if negative { -cents } else { cents })
}

pub fn parse_optional_money(raw: &str) -> Result<Option<i64>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_money(raw).map(Some)
}

pub fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date {raw:?}; use YYYY-MM-DD"))
}

pub fn parse_optional_date(raw: &str) -> Result<Option<Date>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw).map(Some)
}

fn parse_optional_number<N: std::str::FromStr>(raw: &str) -> Result<Option<N>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| anyhow!("invalid number {raw:?}"))
}

fn parse_reference(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid id {raw:?}; enter the numeric id"))
}

fn reference_text(id: i64) -> String {
    if id > 0 { id.to_string() } else { String::new() }
}

fn money_input(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn optional_number<N: ToString>(value: Option<N>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn choice_error(label: &str, raw: &str, choices: &[&str]) -> anyhow::Error {
    anyhow!("invalid {label} {raw:?}; choose one of: {}", choices.join(", "))
}

#[cfg(test)]
mod tests {
    use super::{
        EditableForm, LeaseFormInput, PaymentFormInput, PropertyFormInput, TenantFormInput,
        parse_date, parse_money, parse_optional_money,
    };
    use crate::{LeaseId, PropertyId, PropertyKind, TenantId};
    use anyhow::Result;
    use time::{Date, Month};

    #[test]
    fn parse_money_accepts_common_shapes() -> Result<()> {
        assert_eq!(parse_money("1250")?, 125_000);
        assert_eq!(parse_money("1,250.5")?, 125_050);
        assert_eq!(parse_money("$1,250.05")?, 125_005);
        assert_eq!(parse_money(".75")?, 75);
        assert_eq!(parse_money("-3.10")?, -310);
        assert_eq!(parse_optional_money("  ")?, None);
        Ok(())
    }

    #[test]
    fn parse_money_rejects_garbage() {
        assert!(parse_money("").is_err());
        assert!(parse_money("12.345").is_err());
        assert!(parse_money("abc").is_err());
    }

    #[test]
    fn parse_date_requires_iso_format() -> Result<()> {
        assert_eq!(
            parse_date("2026-03-09")?,
            Date::from_calendar_date(2026, Month::March, 9)?
        );
        let error = parse_date("09/03/2026").expect_err("non-iso date should fail");
        assert!(error.to_string().contains("YYYY-MM-DD"));
        Ok(())
    }

    #[test]
    fn property_fields_round_trip_through_text() -> Result<()> {
        let mut form = PropertyFormInput::blank();
        form.set_field(0, "  Casa A ")?;
        form.set_field(3, "apartment")?;
        form.set_field(5, "950.00")?;
        form.set_field(6, "3")?;
        assert_eq!(form.name, "Casa A");
        assert_eq!(form.kind, PropertyKind::Apartment);
        assert_eq!(form.monthly_rent_cents, 95_000);
        assert_eq!(form.bedrooms, Some(3));
        assert_eq!(form.field_text(5), "950.00");
        assert_eq!(form.field_text(8), "");
        assert_eq!(PropertyFormInput::fields().len(), 10);
        Ok(())
    }

    #[test]
    fn choice_fields_list_valid_options_on_error() {
        let mut form = PaymentFormInput::blank();
        let error = form.set_field(3, "bitcoin").expect_err("unknown method should fail");
        assert!(error.to_string().contains("cash, transfer, card, check"));
    }

    #[test]
    fn property_validation_requires_name_and_rent() {
        let mut form = PropertyFormInput::blank();
        assert!(form.validate().is_err());
        form.name = "Casa A".to_owned();
        form.address = "Av. Principal 123".to_owned();
        assert!(form.validate().is_err());
        form.monthly_rent_cents = 80_000;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn tenant_validation_checks_email_shape() {
        let mut form = TenantFormInput::blank();
        form.first_name = "Juan".to_owned();
        form.last_name = "Pérez".to_owned();
        form.email = "juan.example.com".to_owned();
        assert!(form.validate().is_err());
        form.email = "juan@example.com".to_owned();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn lease_validation_rejects_bad_date_range() -> Result<()> {
        let form = LeaseFormInput {
            property_id: PropertyId::new(1),
            tenant_id: TenantId::new(2),
            start_date: Date::from_calendar_date(2026, Month::June, 1)?,
            end_date: Some(Date::from_calendar_date(2026, Month::May, 31)?),
            monthly_rent_cents: 90_000,
            deposit_cents: None,
            status: crate::LeaseStatus::Active,
            notes: String::new(),
        };
        assert!(form.validate().is_err());
        Ok(())
    }

    #[test]
    fn payment_validation_requires_lease_and_amount() {
        let mut form = PaymentFormInput::blank();
        assert!(form.validate().is_err());
        form.lease_id = LeaseId::new(4);
        form.amount_cents = 90_000;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn lease_form_serializes_dates_as_iso_strings() -> Result<()> {
        let mut form = LeaseFormInput::blank();
        form.set_field(2, "2026-01-15")?;
        let json = serde_json::to_value(&form)?;
        assert_eq!(json["start_date"], "2026-01-15");
        assert!(json["end_date"].is_null());
        Ok(())
    }
}
