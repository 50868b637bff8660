// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Columns, detail panes and row actions for each resource tab.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use rentadmin_app::resources::{lease_hooks, payment_hooks, property_hooks, tenant_hooks};
use rentadmin_app::{
    EntityBackend, EntityController, Lease, LeaseFormInput, LeaseStatus, Payment,
    PaymentFormInput, PaymentStatus, Property, PropertyFormInput, PropertyStatus, TabKind, Tenant,
    TenantFormInput, format_money,
};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::screen::{CustomAction, ResourceScreen};
use crate::table::{CellValue, Column, EntityTable, RowActionSpec};

pub const MARK_PAID: &str = "mark_paid";
pub const END_LEASE: &str = "end_lease";

fn styled(text: &str, color: Color) -> CellValue {
    CellValue::Styled(Line::from(Span::styled(
        text.to_owned(),
        Style::default().fg(color),
    )))
}

fn property_status_cell(status: PropertyStatus) -> CellValue {
    let color = match status {
        PropertyStatus::Available => Color::Green,
        PropertyStatus::Rented => Color::Blue,
        PropertyStatus::Maintenance => Color::Yellow,
    };
    styled(status.as_str(), color)
}

fn lease_status_cell(status: LeaseStatus) -> CellValue {
    let color = match status {
        LeaseStatus::Active => Color::Green,
        LeaseStatus::Ended => Color::DarkGray,
        LeaseStatus::Terminated => Color::Red,
    };
    styled(status.as_str(), color)
}

fn payment_status_cell(status: PaymentStatus) -> CellValue {
    let color = match status {
        PaymentStatus::Paid => Color::Green,
        PaymentStatus::Pending => Color::Yellow,
        PaymentStatus::Late => Color::Red,
    };
    styled(status.as_str(), color)
}

fn optional_text<N: ToString>(value: Option<N>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn timestamp(value: Option<OffsetDateTime>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    value
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}

pub fn property_screen(
    backend: EntityBackend<Property, PropertyFormInput>,
) -> ResourceScreen<Property, PropertyFormInput> {
    let hooks = property_hooks();
    let table = EntityTable::new(
        vec![
            Column::new("name", "name", |p: &Property| CellValue::text(&p.name)).truncated(24),
            Column::new("address", "address", |p: &Property| CellValue::text(&p.address))
                .truncated(28),
            Column::new("city", "city", |p: &Property| CellValue::text(&p.city)),
            Column::new("kind", "kind", |p: &Property| CellValue::text(p.kind.as_str())),
            Column::new("status", "status", |p: &Property| {
                property_status_cell(p.status)
            }),
            Column::new("rent", "rent", |p: &Property| {
                CellValue::text(format_money(p.monthly_rent_cents))
            })
            .sorted_by(|p| p.monthly_rent_cents),
            Column::new("rooms", "rooms", |p: &Property| {
                CellValue::text(optional_text(p.bedrooms))
            })
            .sorted_by(|p| i64::from(p.bedrooms.unwrap_or(0))),
        ],
        hooks.id,
        hooks.name,
    );
    ResourceScreen::new(
        TabKind::Properties,
        EntityController::new(hooks, backend),
        table,
        |p| {
            vec![
                ("id", p.id.to_string()),
                ("name", p.name.clone()),
                ("address", p.address.clone()),
                ("city", p.city.clone()),
                ("kind", p.kind.as_str().to_owned()),
                ("status", p.status.as_str().to_owned()),
                ("monthly rent", format_money(p.monthly_rent_cents)),
                ("bedrooms", optional_text(p.bedrooms)),
                ("bathrooms", optional_text(p.bathrooms)),
                ("area m2", optional_text(p.area_m2)),
                ("description", p.description.clone()),
                ("created", timestamp(p.created_at)),
                ("updated", timestamp(p.updated_at)),
            ]
        },
    )
}

pub fn tenant_screen(
    backend: EntityBackend<Tenant, TenantFormInput>,
) -> ResourceScreen<Tenant, TenantFormInput> {
    let hooks = tenant_hooks();
    let table = EntityTable::new(
        vec![
            Column::new("name", "name", |t: &Tenant| CellValue::text(t.full_name())).truncated(28),
            Column::new("email", "email", |t: &Tenant| CellValue::text(&t.email)).truncated(30),
            Column::new("phone", "phone", |t: &Tenant| CellValue::text(&t.phone)),
            Column::new("document", "document", |t: &Tenant| {
                CellValue::text(&t.document_number)
            }),
        ],
        hooks.id,
        hooks.name,
    );
    ResourceScreen::new(
        TabKind::Tenants,
        EntityController::new(hooks, backend),
        table,
        |t| {
            vec![
                ("id", t.id.to_string()),
                ("name", t.full_name()),
                ("email", t.email.clone()),
                ("phone", t.phone.clone()),
                ("document", t.document_number.clone()),
                ("notes", t.notes.clone()),
                ("created", timestamp(t.created_at)),
                ("updated", timestamp(t.updated_at)),
            ]
        },
    )
}

pub fn lease_screen(
    backend: EntityBackend<Lease, LeaseFormInput>,
) -> ResourceScreen<Lease, LeaseFormInput> {
    let hooks = lease_hooks();
    let table = EntityTable::new(
        vec![
            Column::new("id", "lease", |l: &Lease| CellValue::text(format!("#{}", l.id)))
                .sorted_by(|l| l.id.get()),
            Column::new("property", "property", |l: &Lease| {
                CellValue::text(l.property_id.to_string())
            })
            .sorted_by(|l| l.property_id.get()),
            Column::new("tenant", "tenant", |l: &Lease| {
                CellValue::text(l.tenant_id.to_string())
            })
            .sorted_by(|l| l.tenant_id.get()),
            Column::new("start", "start", |l: &Lease| {
                CellValue::text(l.start_date.to_string())
            }),
            Column::new("end", "end", |l: &Lease| CellValue::text(optional_text(l.end_date))),
            Column::new("rent", "rent", |l: &Lease| {
                CellValue::text(format_money(l.monthly_rent_cents))
            })
            .sorted_by(|l| l.monthly_rent_cents),
            Column::new("status", "status", |l: &Lease| lease_status_cell(l.status)),
        ],
        hooks.id,
        hooks.name,
    );
    let end_lease = CustomAction {
        spec: RowActionSpec {
            action: END_LEASE,
            label: "End lease",
        },
        apply: |lease: &Lease| LeaseFormInput {
            status: LeaseStatus::Ended,
            ..rentadmin_app::resources::lease_form(lease)
        },
    };
    ResourceScreen::new(
        TabKind::Leases,
        EntityController::new(hooks, backend),
        table,
        |l| {
            vec![
                ("id", l.id.to_string()),
                ("property", l.property_id.to_string()),
                ("tenant", l.tenant_id.to_string()),
                ("start", l.start_date.to_string()),
                ("end", optional_text(l.end_date)),
                ("monthly rent", format_money(l.monthly_rent_cents)),
                (
                    "deposit",
                    l.deposit_cents.map(format_money).unwrap_or_default(),
                ),
                ("status", l.status.as_str().to_owned()),
                ("notes", l.notes.clone()),
                ("created", timestamp(l.created_at)),
                ("updated", timestamp(l.updated_at)),
            ]
        },
    )
    .with_actions(vec![end_lease])
}

pub fn payment_screen(
    backend: EntityBackend<Payment, PaymentFormInput>,
) -> ResourceScreen<Payment, PaymentFormInput> {
    let hooks = payment_hooks();
    let table = EntityTable::new(
        vec![
            Column::new("id", "payment", |p: &Payment| CellValue::text(format!("#{}", p.id)))
                .sorted_by(|p| p.id.get()),
            Column::new("lease", "lease", |p: &Payment| {
                CellValue::text(format!("#{}", p.lease_id))
            })
            .sorted_by(|p| p.lease_id.get()),
            Column::new("amount", "amount", |p: &Payment| {
                CellValue::text(format_money(p.amount_cents))
            })
            .sorted_by(|p| p.amount_cents),
            Column::new("paid_on", "paid on", |p: &Payment| {
                CellValue::text(p.paid_on.to_string())
            }),
            Column::new("method", "method", |p: &Payment| {
                CellValue::text(p.method.as_str())
            }),
            Column::new("status", "status", |p: &Payment| payment_status_cell(p.status)),
            Column::new("reference", "reference", |p: &Payment| {
                CellValue::text(&p.reference)
            })
            .truncated(16)
            .unsortable(),
        ],
        hooks.id,
        hooks.name,
    );
    let mark_paid = CustomAction {
        spec: RowActionSpec {
            action: MARK_PAID,
            label: "Mark paid",
        },
        apply: |payment: &Payment| PaymentFormInput {
            status: PaymentStatus::Paid,
            ..rentadmin_app::resources::payment_form(payment)
        },
    };
    ResourceScreen::new(
        TabKind::Payments,
        EntityController::new(hooks, backend),
        table,
        |p| {
            vec![
                ("id", p.id.to_string()),
                ("lease", p.lease_id.to_string()),
                ("amount", format_money(p.amount_cents)),
                ("paid on", p.paid_on.to_string()),
                ("method", p.method.as_str().to_owned()),
                ("status", p.status.as_str().to_owned()),
                ("reference", p.reference.clone()),
                ("notes", p.notes.clone()),
                ("created", timestamp(p.created_at)),
                ("updated", timestamp(p.updated_at)),
            ]
        },
    )
    .with_actions(vec![mark_paid])
}
